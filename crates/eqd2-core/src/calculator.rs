//! EQD2 conversion engine.
//!
//! Pure functions over the linear-quadratic model: forward conversion from a
//! dose regimen to EQD2 (Equivalent Dose in 2 Gy fractions) and the reverse
//! solve from a target EQD2 back to a total dose. No state, no I/O; safe to
//! call on every input change.
//!
//! Invalid input (non-finite, zero, or negative anywhere) yields `None`
//! rather than a sentinel number, so an invalid result can never leak into
//! further arithmetic unnoticed.

use serde::{Deserialize, Serialize};

/// A dose regimen as entered by the caller.
///
/// Transient engine input; regimens are reconstructed per calculation and
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoseRegimen {
    /// Total radiation dose in Gray.
    pub total_dose: f64,
    /// Number of treatment fractions.
    pub fraction_count: f64,
    /// Alpha/beta ratio for the tissue type, in Gray.
    pub alpha_beta: f64,
}

impl DoseRegimen {
    pub fn new(total_dose: f64, fraction_count: f64, alpha_beta: f64) -> Self {
        Self {
            total_dose,
            fraction_count,
            alpha_beta,
        }
    }

    /// Computes the EQD2 of this regimen. Equivalent to
    /// [`calculate_forward`] on the three fields.
    pub fn eqd2(&self) -> Option<ConversionResult> {
        calculate_forward(self.total_dose, self.fraction_count, self.alpha_beta)
    }
}

/// Outcome of a successful conversion.
///
/// `dose_per_fraction` always refers to the *resolved* regimen: for the
/// forward direction that is the input total dose over the fraction count,
/// for the reverse direction it is the computed total dose over the fraction
/// count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// The converted dose in Gray (EQD2 forward, total dose reverse).
    pub value: f64,
    /// Dose per fraction of the resolved regimen, in Gray.
    pub dose_per_fraction: f64,
}

fn valid_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Calculates EQD2 (Equivalent Dose in 2 Gy fractions).
///
/// Formula: `EQD2 = D × (d + α/β) / (2 + α/β)` where `d = D / n`.
///
/// Returns `None` unless all three inputs are finite and strictly positive.
/// When the dose per fraction is exactly 2 Gy the formula is at its fixed
/// point and the EQD2 equals the total dose.
///
/// # Examples
///
/// ```
/// use eqd2_core::calculator::calculate_forward;
///
/// // 50 Gy in 25 fractions is already 2 Gy per fraction.
/// let result = calculate_forward(50.0, 25.0, 10.0).unwrap();
/// assert!((result.value - 50.0).abs() < 0.01);
/// assert!((result.dose_per_fraction - 2.0).abs() < 1e-9);
/// ```
pub fn calculate_forward(
    total_dose: f64,
    fraction_count: f64,
    alpha_beta: f64,
) -> Option<ConversionResult> {
    if !valid_positive(total_dose) || !valid_positive(fraction_count) || !valid_positive(alpha_beta)
    {
        return None;
    }

    let dose_per_fraction = total_dose / fraction_count;

    let value = total_dose * ((dose_per_fraction + alpha_beta) / (2.0 + alpha_beta));

    Some(ConversionResult {
        value,
        dose_per_fraction,
    })
}

/// Calculates the total dose required to reach a target EQD2.
///
/// Substituting `d = D / n` into the forward formula gives the quadratic
/// `n·d² + n·(α/β)·d − EQD2·(2 + α/β) = 0`; this takes the
/// `(−b + √(b² − 4ac)) / 2a` root. The other root is negative for positive
/// inputs and is discarded.
///
/// Returns `None` for invalid input, a negative discriminant, or a
/// non-positive resolved dose per fraction, the cases where no physical
/// solution exists.
pub fn calculate_reverse(
    target_eqd2: f64,
    fraction_count: f64,
    alpha_beta: f64,
) -> Option<ConversionResult> {
    if !valid_positive(target_eqd2)
        || !valid_positive(fraction_count)
        || !valid_positive(alpha_beta)
    {
        return None;
    }

    let a = fraction_count;
    let b = fraction_count * alpha_beta;
    let c = -target_eqd2 * (2.0 + alpha_beta);

    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let dose_per_fraction = (-b + discriminant.sqrt()) / (2.0 * a);

    if dose_per_fraction <= 0.0 {
        return None;
    }

    Some(ConversionResult {
        value: dose_per_fraction * fraction_count,
        dose_per_fraction,
    })
}

/// Formats a number the way the history summaries expect: no trailing
/// fractional zeros for whole values ("25", not "25.0").
fn fmt_input(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Inputs summary for a forward conversion, e.g. `D=54 Gy, n=3, α/β=10`.
pub fn forward_inputs_summary(total_dose: f64, fraction_count: f64, alpha_beta: f64) -> String {
    format!(
        "D={} Gy, n={}, α/β={}",
        fmt_input(total_dose),
        fmt_input(fraction_count),
        fmt_input(alpha_beta)
    )
}

/// Inputs summary for a reverse conversion, e.g. `EQD2=50 Gy, n=25, α/β=10`.
pub fn reverse_inputs_summary(target_eqd2: f64, fraction_count: f64, alpha_beta: f64) -> String {
    format!(
        "EQD2={} Gy, n={}, α/β={}",
        fmt_input(target_eqd2),
        fmt_input(fraction_count),
        fmt_input(alpha_beta)
    )
}

/// Result summary for either direction, e.g. `151.20 Gy`.
pub fn result_summary(value: f64) -> String {
    format!("{:.2} Gy", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 0.01;

    #[test]
    fn forward_fixed_point_at_two_gray_per_fraction() {
        // 2 Gy per fraction: EQD2 must equal the total dose.
        let result = calculate_forward(50.0, 25.0, 10.0).unwrap();
        assert!((result.value - 50.0).abs() < TOLERANCE);
        assert!((result.dose_per_fraction - 2.0).abs() < 1e-12);

        let result = calculate_forward(60.0, 30.0, 3.0).unwrap();
        assert!((result.value - 60.0).abs() < TOLERANCE);
    }

    #[test]
    fn forward_hypofractionated_case() {
        // 54 Gy in 3 fractions (18 Gy/fx), α/β = 10: EQD2 = 54 * 28 / 12 = 126 Gy.
        let result = calculate_forward(54.0, 3.0, 10.0).unwrap();
        assert!((result.value - 126.0).abs() < 0.1);
        assert!((result.dose_per_fraction - 18.0).abs() < 1e-12);
    }

    #[test]
    fn reverse_concrete_case() {
        let result = calculate_reverse(50.0, 25.0, 10.0).unwrap();
        assert!((result.value - 50.0).abs() < TOLERANCE);
        assert!((result.dose_per_fraction - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn round_trip_forward_then_reverse() {
        let cases = [
            (50.0, 25.0, 10.0),
            (54.0, 3.0, 10.0),
            (60.0, 30.0, 3.0),
            (20.0, 5.0, 1.5),
            (70.0, 35.0, 2.0),
            (36.25, 5.0, 1.5),
        ];
        for (dose, fractions, alpha_beta) in cases {
            let forward = calculate_forward(dose, fractions, alpha_beta).unwrap();
            let reverse = calculate_reverse(forward.value, fractions, alpha_beta).unwrap();
            assert!(
                (reverse.value - dose).abs() < TOLERANCE,
                "round trip failed for D={dose}, n={fractions}, α/β={alpha_beta}: got {}",
                reverse.value
            );
        }
    }

    #[test]
    fn round_trip_reverse_then_forward() {
        let cases = [(50.0, 25.0, 10.0), (100.0, 4.0, 3.0), (30.0, 10.0, 1.5)];
        for (eqd2, fractions, alpha_beta) in cases {
            let reverse = calculate_reverse(eqd2, fractions, alpha_beta).unwrap();
            let forward = calculate_forward(reverse.value, fractions, alpha_beta).unwrap();
            assert!((forward.value - eqd2).abs() < TOLERANCE);
        }
    }

    #[test]
    fn forward_rejects_invalid_arguments_per_position() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(calculate_forward(bad, 25.0, 10.0).is_none());
            assert!(calculate_forward(50.0, bad, 10.0).is_none());
            assert!(calculate_forward(50.0, 25.0, bad).is_none());
        }
    }

    #[test]
    fn reverse_rejects_invalid_arguments_per_position() {
        for bad in [0.0, -3.5, f64::NAN, f64::INFINITY] {
            assert!(calculate_reverse(bad, 25.0, 10.0).is_none());
            assert!(calculate_reverse(50.0, bad, 10.0).is_none());
            assert!(calculate_reverse(50.0, 25.0, bad).is_none());
        }
    }

    #[test]
    fn regimen_convenience_matches_free_function() {
        let regimen = DoseRegimen::new(54.0, 3.0, 10.0);
        assert_eq!(regimen.eqd2(), calculate_forward(54.0, 3.0, 10.0));
    }

    #[test]
    fn summaries_match_legacy_format() {
        assert_eq!(
            forward_inputs_summary(54.0, 3.0, 10.0),
            "D=54 Gy, n=3, α/β=10"
        );
        assert_eq!(
            reverse_inputs_summary(50.0, 25.0, 10.0),
            "EQD2=50 Gy, n=25, α/β=10"
        );
        assert_eq!(
            forward_inputs_summary(36.25, 5.0, 1.5),
            "D=36.25 Gy, n=5, α/β=1.5"
        );
        assert_eq!(result_summary(151.2), "151.20 Gy");
    }
}

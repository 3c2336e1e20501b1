//! Core domain for the EQD2 dose-conversion system.
//!
//! Two responsibilities live here:
//!
//! - [`calculator`]: the pure forward/reverse conversion engine built on
//!   the linear-quadratic model.
//! - [`history`]: a bounded, most-recent-first log of past conversions
//!   with debounced persistence behind the [`history::HistoryRepository`]
//!   trait. Storage backends live in `eqd2-infrastructure`.
//!
//! Presentation layers (mobile/web shells) sit on top of this crate and are
//! intentionally absent.

pub mod calculator;
pub mod error;
pub mod history;

pub use calculator::{calculate_forward, calculate_reverse, ConversionResult, DoseRegimen};
pub use error::{Eqd2Error, Result};
pub use history::{ConversionKind, HistoryEntry, HistoryRepository, HistoryStore};

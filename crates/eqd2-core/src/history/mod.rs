//! Calculation history domain.
//!
//! A bounded, most-recent-first log of past conversions. The store owns the
//! in-memory view and schedules debounced writes through an injected
//! [`HistoryRepository`]; persistence backends live in the infrastructure
//! crate.

pub mod entry;
pub mod repository;
pub mod store;

pub use entry::{ConversionKind, HistoryEntry};
pub use repository::HistoryRepository;
pub use store::{HistoryConfig, HistoryStore, MAX_ENTRIES};

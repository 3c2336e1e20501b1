//! Persistence layer for the EQD2 dose-conversion system.
//!
//! Implements `eqd2_core::history::HistoryRepository` over an atomically
//! updated JSON file, plus the platform path resolution and an in-memory
//! repository for tests and ephemeral sessions.

pub mod json_history_repository;
pub mod memory_history_repository;
pub mod paths;
pub mod storage;

pub use json_history_repository::JsonHistoryRepository;
pub use memory_history_repository::MemoryHistoryRepository;
pub use paths::Eqd2Paths;

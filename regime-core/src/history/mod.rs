//! Monthly history of companies, from which trailing totals are derived.
//!
//! The comparison engine never reads the store; callers aggregate first and
//! pass the resulting profile.

mod memory;
mod repository;
mod trailing;

pub use memory::InMemoryHistoryRepository;
pub use repository::{HistoryRepository, NewPeriodRecord, PeriodRecord, RepositoryError};
pub use trailing::{TrailingTotals, trailing_twelve};

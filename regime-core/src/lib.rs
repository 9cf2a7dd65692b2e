//! Brazilian tax regime calculators and the engine that compares them.
//!
//! Three regimes are covered: the simplified regime (Simples Nacional),
//! presumed profit (Lucro Presumido) and actual profit (Lucro Real).

pub mod calculations;
pub mod comparison;
pub mod config;
pub mod error;
pub mod history;
pub mod models;

pub use comparison::{ComparisonEngine, DiagnosticReport};
pub use config::EngineConfig;
pub use error::RegimeError;
pub use models::*;

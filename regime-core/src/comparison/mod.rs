//! Regime comparison, diagnosis and what-if scenarios.
//!
//! Every regime is computed against the same [`AnnualProjection`] of a
//! profile, so totals are directly comparable.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use regime_core::comparison::ComparisonEngine;
//! use regime_core::{ActivityClassification, FinancialProfile, RegimeName};
//!
//! let profile = FinancialProfile::new(dec!(5000000), ActivityClassification::Commerce).unwrap();
//! let report = ComparisonEngine::default().diagnose(&profile).unwrap();
//!
//! assert!(!report.regimes[0].applicable);
//! assert_eq!(report.comparison.ranked.len(), 2);
//! assert_ne!(report.comparison.best_regime, Some(RegimeName::Simplified));
//! ```

mod engine;
mod projection;
mod recommendations;
mod scenarios;

pub use engine::{ComparisonEngine, ComparisonResult, DiagnosticReport};
pub use projection::{AnnualProjection, RegimeCalculator};
pub use recommendations::{Priority, Recommendation, RecommendationKind};
pub use scenarios::{Perturbation, ScenarioOutcome};

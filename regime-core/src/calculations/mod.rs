//! Regime calculators and the arithmetic they share.

pub mod actual_profit;
pub mod bracket_table;
pub mod common;
pub mod consumption;
pub mod credit;
pub mod payroll_ratio;
pub mod presumed_profit;
pub mod profit_tax;
pub mod simplified;

pub use actual_profit::{ActualProfitCalculator, ActualProfitInput, ActualProfitResult, CreditBasis};
pub use bracket_table::{BracketRate, effective_rate};
pub use consumption::ConsumptionTax;
pub use credit::{CategoryCredit, CreditEngine, CreditSummary};
pub use payroll_ratio::{
    PayrollRatio, PayrollRatioClassifier, PayrollRatioInput, PayrollScenario, PayrollTable,
};
pub use presumed_profit::{PresumedProfitCalculator, PresumedProfitInput, PresumedProfitResult};
pub use simplified::{SimplifiedCalculator, SimplifiedInput, SimplifiedResult};

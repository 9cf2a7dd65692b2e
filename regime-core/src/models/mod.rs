mod activity;
mod bracket;
mod credit_category;
mod period;
mod profile;
mod regime_result;

pub use activity::{ActivityClassification, TableRule};
pub use bracket::{AnnexId, BracketRow, BracketTable};
pub use credit_category::{CreditCategory, CreditCategoryRates};
pub use period::PeriodKind;
pub use profile::{
    FinancialProfile, MAX_MUNICIPAL_TAX_RATE_PCT, ProfileInput, validate_municipal_rate,
};
pub use regime_result::{Breakdown, RegimeName, RegimeResult, TaxKind};

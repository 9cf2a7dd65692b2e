use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculations::common::format_pct;
use crate::{
    ActivityClassification, CreditCategory, FinancialProfile, RegimeError, RegimeName,
    RegimeResult,
};

/// A profile normalised to one year, the common ground on which regimes
/// are compared.
///
/// Revenue and payroll are already trailing twelve months; everything
/// expressed per period is multiplied by the number of periods in a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualProjection {
    pub activity: ActivityClassification,
    pub annual_revenue: Decimal,
    pub trailing12_payroll: Option<Decimal>,
    pub annual_expenses: Decimal,
    pub annual_pis_credit: Option<Decimal>,
    pub annual_cofins_credit: Option<Decimal>,
    pub annual_expenses_by_category: BTreeMap<CreditCategory, Decimal>,
    pub municipal_tax_rate_pct: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipal_tax_rate_formatted: Option<String>,
}

impl AnnualProjection {
    /// A projection with revenue only.
    pub fn new(
        activity: ActivityClassification,
        annual_revenue: Decimal,
    ) -> Self {
        Self {
            activity,
            annual_revenue,
            trailing12_payroll: None,
            annual_expenses: Decimal::ZERO,
            annual_pis_credit: None,
            annual_cofins_credit: None,
            annual_expenses_by_category: BTreeMap::new(),
            municipal_tax_rate_pct: None,
            municipal_tax_rate_formatted: None,
        }
    }

    pub fn from_profile(profile: &FinancialProfile) -> Self {
        let per_year = profile.period_kind().per_year();
        Self {
            activity: profile.activity_classification(),
            annual_revenue: profile.trailing12_revenue(),
            trailing12_payroll: profile.trailing12_payroll(),
            annual_expenses: profile.current_expenses() * per_year,
            annual_pis_credit: profile.pis_credit().map(|v| v * per_year),
            annual_cofins_credit: profile.cofins_credit().map(|v| v * per_year),
            annual_expenses_by_category: profile
                .expenses_by_category()
                .iter()
                .map(|(&category, &amount)| (category, amount * per_year))
                .collect(),
            municipal_tax_rate_pct: profile.municipal_tax_rate_pct(),
            municipal_tax_rate_formatted: profile.municipal_tax_rate_pct().map(format_pct),
        }
    }
}

/// One tax regime, computed against an annual projection.
pub trait RegimeCalculator: Send + Sync {
    fn regime(&self) -> RegimeName;

    /// Annual liability. Ineligibility is reported through
    /// [`RegimeResult::applicable`], not as an error.
    fn compute(
        &self,
        projection: &AnnualProjection,
    ) -> Result<RegimeResult, RegimeError>;
}

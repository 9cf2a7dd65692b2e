use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ActivityClassification, CreditCategory, PeriodKind};
use crate::RegimeError;
use crate::calculations::common::{check_amount, check_revenue};

/// Largest municipal service tax rate the law allows.
pub const MAX_MUNICIPAL_TAX_RATE_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Largest factor [`FinancialProfile::perturbed`] accepts.
pub const MAX_PERTURBATION_FACTOR: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Raw profile as supplied by the caller (JSON body, CSV row, ...).
///
/// Nothing here is validated or defaulted; convert it with
/// `FinancialProfile::try_from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub trailing12_revenue: Decimal,
    #[serde(default)]
    pub current_month_revenue: Option<Decimal>,
    #[serde(default)]
    pub trailing12_payroll: Option<Decimal>,
    #[serde(default)]
    pub current_expenses: Option<Decimal>,
    pub activity_classification: ActivityClassification,
    #[serde(default)]
    pub period_kind: Option<PeriodKind>,
    #[serde(default)]
    pub pis_credit: Option<Decimal>,
    #[serde(default)]
    pub cofins_credit: Option<Decimal>,
    #[serde(default)]
    pub expenses_by_category: Option<BTreeMap<CreditCategory, Decimal>>,
    #[serde(default)]
    pub municipal_tax_rate_pct: Option<Decimal>,
}

impl ProfileInput {
    /// An input with only the required fields set.
    pub fn new(
        trailing12_revenue: Decimal,
        activity_classification: ActivityClassification,
    ) -> Self {
        Self {
            trailing12_revenue,
            current_month_revenue: None,
            trailing12_payroll: None,
            current_expenses: None,
            activity_classification,
            period_kind: None,
            pis_credit: None,
            cofins_credit: None,
            expenses_by_category: None,
            municipal_tax_rate_pct: None,
        }
    }
}

/// Validated, immutable financial profile of a business.
///
/// `current_expenses`, the explicit credits and the category expenses are
/// amounts for one `period_kind`. Revenue and payroll are trailing twelve
/// months. Payroll stays optional: "not supplied" and "zero" differ for
/// activities whose simplified table depends on the payroll ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProfile {
    trailing12_revenue: Decimal,
    current_month_revenue: Decimal,
    trailing12_payroll: Option<Decimal>,
    current_expenses: Decimal,
    activity_classification: ActivityClassification,
    period_kind: PeriodKind,
    pis_credit: Option<Decimal>,
    cofins_credit: Option<Decimal>,
    expenses_by_category: BTreeMap<CreditCategory, Decimal>,
    municipal_tax_rate_pct: Option<Decimal>,
}

fn check_amount_opt(
    field: &str,
    value: Option<Decimal>,
) -> Result<Option<Decimal>, RegimeError> {
    value.map(|v| check_amount(field, v)).transpose()
}

/// Checks a caller-supplied municipal service tax rate (0 to 5 percent).
pub fn validate_municipal_rate(rate: Option<Decimal>) -> Result<Option<Decimal>, RegimeError> {
    match rate {
        Some(r) if r < Decimal::ZERO || r > MAX_MUNICIPAL_TAX_RATE_PCT => Err(RegimeError::invalid(
            format!("municipalTaxRatePct must be between 0 and 5, got {r}"),
        )),
        other => Ok(other),
    }
}

impl TryFrom<ProfileInput> for FinancialProfile {
    type Error = RegimeError;

    /// Resolves defaults and validates the raw input.
    ///
    /// * `currentMonthRevenue` defaults to a twelfth of `trailing12Revenue`.
    /// * `currentExpenses` defaults to zero.
    /// * `periodKind` defaults to monthly.
    ///
    /// # Errors
    ///
    /// [`RegimeError::InvalidInput`] for trailing revenue below one cent, any
    /// negative amount, any amount above
    /// [`MAX_AMOUNT`](crate::calculations::common::MAX_AMOUNT) or a municipal
    /// rate outside 0 to 5%.
    fn try_from(input: ProfileInput) -> Result<Self, Self::Error> {
        check_revenue("trailing12Revenue", input.trailing12_revenue)?;

        let current_month_revenue = match input.current_month_revenue {
            Some(v) => check_amount("currentMonthRevenue", v)?,
            None => input.trailing12_revenue / Decimal::from(12),
        };

        let mut expenses_by_category = BTreeMap::new();
        for (category, amount) in input.expenses_by_category.unwrap_or_default() {
            expenses_by_category.insert(category, check_amount(category.name(), amount)?);
        }

        Ok(Self {
            trailing12_revenue: input.trailing12_revenue,
            current_month_revenue,
            trailing12_payroll: check_amount_opt("trailing12Payroll", input.trailing12_payroll)?,
            current_expenses: check_amount(
                "currentExpenses",
                input.current_expenses.unwrap_or(Decimal::ZERO),
            )?,
            activity_classification: input.activity_classification,
            period_kind: input.period_kind.unwrap_or_default(),
            pis_credit: check_amount_opt("pisCredit", input.pis_credit)?,
            cofins_credit: check_amount_opt("cofinsCredit", input.cofins_credit)?,
            expenses_by_category,
            municipal_tax_rate_pct: validate_municipal_rate(input.municipal_tax_rate_pct)?,
        })
    }
}

impl FinancialProfile {
    /// Shorthand for a profile with only the required fields.
    pub fn new(
        trailing12_revenue: Decimal,
        activity_classification: ActivityClassification,
    ) -> Result<Self, RegimeError> {
        Self::try_from(ProfileInput::new(trailing12_revenue, activity_classification))
    }

    /// Returns the raw input this profile was built from, with defaults filled in.
    pub fn to_input(&self) -> ProfileInput {
        ProfileInput {
            trailing12_revenue: self.trailing12_revenue,
            current_month_revenue: Some(self.current_month_revenue),
            trailing12_payroll: self.trailing12_payroll,
            current_expenses: Some(self.current_expenses),
            activity_classification: self.activity_classification,
            period_kind: Some(self.period_kind),
            pis_credit: self.pis_credit,
            cofins_credit: self.cofins_credit,
            expenses_by_category: if self.expenses_by_category.is_empty() {
                None
            } else {
                Some(self.expenses_by_category.clone())
            },
            municipal_tax_rate_pct: self.municipal_tax_rate_pct,
        }
    }

    /// A new profile with revenue, payroll and expenses scaled by the given
    /// factors. Explicit credits follow the expense factor.
    ///
    /// The result goes through the same validation as any other profile.
    ///
    /// # Errors
    ///
    /// [`RegimeError::InvalidInput`] for a factor outside
    /// `[0, MAX_PERTURBATION_FACTOR]` or an invalid resulting profile.
    pub fn perturbed(
        &self,
        revenue_factor: Decimal,
        payroll_factor: Decimal,
        expense_factor: Decimal,
    ) -> Result<Self, RegimeError> {
        for (name, factor) in [
            ("revenueFactor", revenue_factor),
            ("payrollFactor", payroll_factor),
            ("expenseFactor", expense_factor),
        ] {
            if factor < Decimal::ZERO || factor > MAX_PERTURBATION_FACTOR {
                return Err(RegimeError::invalid(format!(
                    "{name} must be between 0 and {MAX_PERTURBATION_FACTOR}, got {factor}"
                )));
            }
        }
        let input = self.to_input();
        Self::try_from(ProfileInput {
            trailing12_revenue: input.trailing12_revenue * revenue_factor,
            current_month_revenue: input.current_month_revenue.map(|v| v * revenue_factor),
            trailing12_payroll: input.trailing12_payroll.map(|v| v * payroll_factor),
            current_expenses: input.current_expenses.map(|v| v * expense_factor),
            pis_credit: input.pis_credit.map(|v| v * expense_factor),
            cofins_credit: input.cofins_credit.map(|v| v * expense_factor),
            expenses_by_category: input.expenses_by_category.map(|map| {
                map.into_iter()
                    .map(|(category, amount)| (category, amount * expense_factor))
                    .collect()
            }),
            ..input
        })
    }

    pub fn trailing12_revenue(&self) -> Decimal {
        self.trailing12_revenue
    }

    pub fn current_month_revenue(&self) -> Decimal {
        self.current_month_revenue
    }

    pub fn trailing12_payroll(&self) -> Option<Decimal> {
        self.trailing12_payroll
    }

    pub fn current_expenses(&self) -> Decimal {
        self.current_expenses
    }

    pub fn activity_classification(&self) -> ActivityClassification {
        self.activity_classification
    }

    pub fn period_kind(&self) -> PeriodKind {
        self.period_kind
    }

    pub fn pis_credit(&self) -> Option<Decimal> {
        self.pis_credit
    }

    pub fn cofins_credit(&self) -> Option<Decimal> {
        self.cofins_credit
    }

    pub fn expenses_by_category(&self) -> &BTreeMap<CreditCategory, Decimal> {
        &self.expenses_by_category
    }

    pub fn municipal_tax_rate_pct(&self) -> Option<Decimal> {
        self.municipal_tax_rate_pct
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn input() -> ProfileInput {
        ProfileInput::new(dec!(1200000), ActivityClassification::Services)
    }

    #[test]
    fn defaults_are_resolved_explicitly() {
        let profile = FinancialProfile::try_from(input()).unwrap();

        assert_eq!(profile.current_month_revenue(), dec!(100000));
        assert_eq!(profile.current_expenses(), dec!(0));
        assert_eq!(profile.period_kind(), PeriodKind::Monthly);
        assert_eq!(profile.trailing12_payroll(), None);
    }

    #[test]
    fn absent_payroll_differs_from_zero_payroll() {
        let zero = FinancialProfile::try_from(ProfileInput {
            trailing12_payroll: Some(dec!(0)),
            ..input()
        })
        .unwrap();

        assert_eq!(zero.trailing12_payroll(), Some(dec!(0)));
    }

    #[test]
    fn rejects_non_positive_revenue() {
        let result = FinancialProfile::try_from(ProfileInput {
            trailing12_revenue: dec!(0),
            ..input()
        });

        assert_eq!(
            result,
            Err(RegimeError::InvalidInput(
                "trailing12Revenue must be positive, got 0".to_string()
            ))
        );
    }

    #[test]
    fn rejects_negative_expenses() {
        let result = FinancialProfile::try_from(ProfileInput {
            current_expenses: Some(dec!(-1)),
            ..input()
        });

        assert!(matches!(result, Err(RegimeError::InvalidInput(_))));
    }

    #[test]
    fn rejects_revenue_beyond_the_amount_bound() {
        let json = r#"{
            "trailing12Revenue": "70000000000000000000000000000",
            "activityClassification": "commerce"
        }"#;
        let input: ProfileInput = serde_json::from_str(json).unwrap();

        let err = FinancialProfile::try_from(input).unwrap_err();

        assert!(err.to_string().contains("trailing12Revenue must not exceed"));
    }

    #[test]
    fn rejects_oversized_category_expense() {
        let result = FinancialProfile::try_from(ProfileInput {
            expenses_by_category: Some(BTreeMap::from([(
                CreditCategory::ALL[0],
                dec!(2000000000000000),
            )])),
            ..input()
        });

        assert!(matches!(result, Err(RegimeError::InvalidInput(_))));
    }

    #[test]
    fn rejects_municipal_rate_above_five_percent() {
        let result = FinancialProfile::try_from(ProfileInput {
            municipal_tax_rate_pct: Some(dec!(5.5)),
            ..input()
        });

        assert!(matches!(result, Err(RegimeError::InvalidInput(_))));
    }

    #[test]
    fn perturbed_returns_a_new_profile_and_leaves_original_untouched() {
        let profile = FinancialProfile::try_from(ProfileInput {
            trailing12_payroll: Some(dec!(200000)),
            current_expenses: Some(dec!(10000)),
            ..input()
        })
        .unwrap();

        let perturbed = profile.perturbed(dec!(1), dec!(1.2), dec!(0.85)).unwrap();

        assert_eq!(perturbed.trailing12_payroll(), Some(dec!(240000)));
        assert_eq!(perturbed.current_expenses(), dec!(8500));
        assert_eq!(profile.trailing12_payroll(), Some(dec!(200000)));
        assert_eq!(profile.current_expenses(), dec!(10000));
    }

    #[test]
    fn perturbed_rejects_factor_beyond_the_bound() {
        let profile = FinancialProfile::try_from(input()).unwrap();

        let result = profile.perturbed(dec!(100000000000000000000000), dec!(1), dec!(1));

        assert_eq!(
            result,
            Err(RegimeError::InvalidInput(
                "revenueFactor must be between 0 and 1000, got 100000000000000000000000"
                    .to_string()
            ))
        );
    }

    #[test]
    fn perturbed_result_beyond_the_amount_bound_is_invalid() {
        let profile = FinancialProfile::try_from(ProfileInput {
            trailing12_revenue: dec!(900000000000000),
            ..input()
        })
        .unwrap();

        let result = profile.perturbed(dec!(1000), dec!(1), dec!(1));

        assert!(matches!(result, Err(RegimeError::InvalidInput(_))));
    }

    #[test]
    fn deserializes_from_camel_case_json() {
        let json = r#"{
            "trailing12Revenue": "1200000",
            "trailing12Payroll": "200000",
            "activityClassification": "services",
            "periodKind": "quarterly"
        }"#;

        let input: ProfileInput = serde_json::from_str(json).unwrap();
        let profile = FinancialProfile::try_from(input).unwrap();

        assert_eq!(profile.trailing12_payroll(), Some(dec!(200000)));
        assert_eq!(profile.period_kind(), PeriodKind::Quarterly);
    }
}

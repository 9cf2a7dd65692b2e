//! Simplified regime (Simples Nacional) liability.
//!
//! 1. Revenue above the national ceiling makes the regime inapplicable.
//! 2. The annex comes from the activity, or from the payroll ratio for
//!    Fator R activities.
//! 3. The effective rate of the annex row for RBT12 is applied to the
//!    period revenue.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::bracket_table::effective_rate;
use crate::calculations::common::{
    check_amount, check_revenue, format_pct, percent_of, serialize_money,
};
use crate::calculations::payroll_ratio::{PayrollRatio, PayrollRatioClassifier};
use crate::comparison::{AnnualProjection, RegimeCalculator};
use crate::config::SimplifiedConfig;
use crate::{
    ActivityClassification, AnnexId, Breakdown, BracketTable, RegimeError, RegimeName,
    RegimeResult, TableRule, TaxKind,
};

pub const REVENUE_CEILING_REASON: &str = "revenue exceeds regime ceiling";

/// Request shape of the simplified-regime operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedInput {
    pub trailing12_revenue: Decimal,
    pub current_month_revenue: Decimal,
    pub activity_classification: ActivityClassification,
    #[serde(default)]
    pub trailing12_payroll: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedResult {
    pub applicable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inapplicability_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annex: Option<AnnexId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket: Option<usize>,
    pub nominal_rate_pct: Decimal,
    pub nominal_rate_formatted: String,
    #[serde(serialize_with = "serialize_money")]
    pub deduction_parcel: Decimal,
    pub effective_rate_pct: Decimal,
    pub effective_rate_formatted: String,
    #[serde(serialize_with = "serialize_money")]
    pub total_tax: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payroll_ratio: Option<PayrollRatio>,
}

impl SimplifiedResult {
    fn inapplicable(payroll_ratio: Option<PayrollRatio>) -> Self {
        Self {
            applicable: false,
            inapplicability_reason: Some(REVENUE_CEILING_REASON.to_string()),
            annex: None,
            bracket: None,
            nominal_rate_pct: Decimal::ZERO,
            nominal_rate_formatted: format_pct(Decimal::ZERO),
            deduction_parcel: Decimal::ZERO,
            effective_rate_pct: Decimal::ZERO,
            effective_rate_formatted: format_pct(Decimal::ZERO),
            total_tax: Decimal::ZERO,
            payroll_ratio,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimplifiedCalculator {
    config: SimplifiedConfig,
}

impl SimplifiedCalculator {
    pub fn new(config: SimplifiedConfig) -> Self {
        Self { config }
    }

    /// Computes the liability for the month described by `input`.
    ///
    /// # Errors
    ///
    /// [`RegimeError::InvalidInput`] for non-positive RBT12, negative amounts,
    /// or a Fator R activity without payroll data.
    pub fn calculate(
        &self,
        input: &SimplifiedInput,
    ) -> Result<SimplifiedResult, RegimeError> {
        check_amount("currentMonthRevenue", input.current_month_revenue)?;
        self.assess(input, input.current_month_revenue)
    }

    /// Shared path for monthly and projected liabilities: the effective rate
    /// is always taken from RBT12 and applied to `liability_base`.
    fn assess(
        &self,
        input: &SimplifiedInput,
        liability_base: Decimal,
    ) -> Result<SimplifiedResult, RegimeError> {
        let revenue12 = check_revenue("trailing12Revenue", input.trailing12_revenue)?;

        if revenue12 > self.config.revenue_cap {
            warn!(
                revenue12 = %revenue12,
                cap = %self.config.revenue_cap,
                "revenue above simplified-regime ceiling"
            );
            return Ok(SimplifiedResult::inapplicable(self.supplied_ratio(input)?));
        }

        let (annex, payroll_ratio) = self.resolve_annex(input)?;

        let table = BracketTable::statutory(annex)?;
        let Some(rate) = effective_rate(revenue12, &table)? else {
            warn!(
                revenue12 = %revenue12,
                table_cap = %table.cap(),
                %annex,
                "revenue above the annex table cap"
            );
            return Ok(SimplifiedResult::inapplicable(payroll_ratio));
        };

        debug!(
            %annex,
            bracket = rate.bracket,
            effective_rate_pct = %rate.effective_rate_pct,
            "simplified bracket selected"
        );

        Ok(SimplifiedResult {
            applicable: true,
            inapplicability_reason: None,
            annex: Some(annex),
            bracket: Some(rate.bracket),
            nominal_rate_pct: rate.nominal_rate_pct,
            nominal_rate_formatted: format_pct(rate.nominal_rate_pct),
            deduction_parcel: rate.deduction_parcel,
            effective_rate_pct: rate.effective_rate_pct,
            effective_rate_formatted: format_pct(rate.effective_rate_pct),
            total_tax: percent_of(liability_base, rate.effective_rate_pct),
            payroll_ratio,
        })
    }

    fn classifier(&self) -> PayrollRatioClassifier {
        PayrollRatioClassifier::new(self.config.payroll_ratio_threshold_pct)
    }

    /// The payroll ratio of a Fator R activity, when payroll was supplied.
    fn supplied_ratio(
        &self,
        input: &SimplifiedInput,
    ) -> Result<Option<PayrollRatio>, RegimeError> {
        match (input.activity_classification.table_rule(), input.trailing12_payroll) {
            (TableRule::PayrollRatio, Some(payroll)) => self
                .classifier()
                .classify(payroll, input.trailing12_revenue)
                .map(Some),
            _ => Ok(None),
        }
    }

    fn resolve_annex(
        &self,
        input: &SimplifiedInput,
    ) -> Result<(AnnexId, Option<PayrollRatio>), RegimeError> {
        match input.activity_classification.table_rule() {
            TableRule::Fixed(annex) => Ok((annex, None)),
            TableRule::PayrollRatio => {
                let payroll = input.trailing12_payroll.ok_or_else(|| {
                    RegimeError::invalid(format!(
                        "trailing12Payroll is required for {} activities",
                        input.activity_classification
                    ))
                })?;
                let ratio = self
                    .classifier()
                    .classify(payroll, input.trailing12_revenue)?;
                Ok((ratio.selected_table.annex(), Some(ratio)))
            }
        }
    }
}

impl RegimeCalculator for SimplifiedCalculator {
    fn regime(&self) -> RegimeName {
        RegimeName::Simplified
    }

    fn compute(
        &self,
        projection: &AnnualProjection,
    ) -> Result<RegimeResult, RegimeError> {
        let input = SimplifiedInput {
            trailing12_revenue: projection.annual_revenue,
            current_month_revenue: projection.annual_revenue / Decimal::from(12),
            activity_classification: projection.activity,
            trailing12_payroll: projection.trailing12_payroll,
        };
        let result = self.assess(&input, projection.annual_revenue)?;

        if !result.applicable {
            return Ok(RegimeResult::inapplicable(
                self.regime(),
                result
                    .inapplicability_reason
                    .unwrap_or_else(|| REVENUE_CEILING_REASON.to_string()),
            ));
        }

        let mut notes = Vec::new();
        if let (Some(annex), Some(bracket)) = (result.annex, result.bracket) {
            notes.push(format!("{annex}, bracket {bracket}"));
        }
        if let Some(ratio) = &result.payroll_ratio {
            notes.push(format!(
                "payroll ratio {} selects table {:?}",
                ratio.ratio_formatted, ratio.selected_table
            ));
        }

        let breakdown = Breakdown::from([(TaxKind::SimplifiedDas, result.total_tax)]);
        Ok(RegimeResult::applicable(self.regime(), projection.annual_revenue, breakdown)
            .with_notes(notes))
    }
}

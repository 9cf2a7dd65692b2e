//! Presumed-profit regime (Lucro Presumido).
//!
//! A statutory share of revenue stands in for profit. PIS and COFINS are
//! cumulative, so expenses play no part.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{
    check_revenue, clamp_rate_pct, format_pct, percent_of, ratio_pct, serialize_money,
};
use crate::calculations::consumption::{ConsumptionTax, municipal_tax};
use crate::calculations::profit_tax::profit_taxes;
use crate::comparison::{AnnualProjection, RegimeCalculator};
use crate::config::{MunicipalTaxPolicy, PresumedProfitConfig};
use crate::{
    ActivityClassification, Breakdown, PeriodKind, RegimeError, RegimeName, RegimeResult,
    TaxKind, validate_municipal_rate,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresumedProfitInput {
    pub revenue: Decimal,
    pub activity_classification: ActivityClassification,
    #[serde(default)]
    pub period: PeriodKind,
    #[serde(default)]
    pub municipal_tax_rate_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresumedProfitResult {
    #[serde(serialize_with = "serialize_money")]
    pub profit_tax_base: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub social_contribution_base: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub profit_tax: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub profit_tax_surtax: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub profit_tax_total: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub social_contribution_tax: Decimal,
    pub consumption_taxes: Vec<ConsumptionTax>,
    #[serde(serialize_with = "serialize_money")]
    pub municipal_tax: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub total_tax: Decimal,
    pub effective_rate_pct: Decimal,
    pub effective_rate_formatted: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl PresumedProfitResult {
    pub fn breakdown(&self) -> Breakdown {
        let mut breakdown = Breakdown::from([
            (TaxKind::Irpj, self.profit_tax),
            (TaxKind::IrpjSurtax, self.profit_tax_surtax),
            (TaxKind::Csll, self.social_contribution_tax),
            (TaxKind::Iss, self.municipal_tax),
        ]);
        for tax in &self.consumption_taxes {
            breakdown.insert(tax.kind, tax.payable);
        }
        breakdown
    }
}

#[derive(Debug, Clone, Default)]
pub struct PresumedProfitCalculator {
    config: PresumedProfitConfig,
    municipal_tax: MunicipalTaxPolicy,
}

impl PresumedProfitCalculator {
    pub fn new(
        config: PresumedProfitConfig,
        municipal_tax: MunicipalTaxPolicy,
    ) -> Self {
        Self {
            config,
            municipal_tax,
        }
    }

    /// Computes the presumed-profit liability for one period.
    ///
    /// # Errors
    ///
    /// [`RegimeError::InvalidInput`] when revenue is not positive or the
    /// municipal rate is outside 0 to 5 percent.
    pub fn calculate(
        &self,
        input: &PresumedProfitInput,
    ) -> Result<PresumedProfitResult, RegimeError> {
        let revenue = check_revenue("revenue", input.revenue)?;
        let municipal_rate = validate_municipal_rate(input.municipal_tax_rate_pct)?;
        let activity = input.activity_classification;

        let profit_tax_base = percent_of(revenue, activity.profit_presumption_pct());
        let social_contribution_base =
            percent_of(revenue, activity.social_contribution_presumption_pct());
        let taxes = profit_taxes(
            &self.config.profit_tax,
            profit_tax_base,
            social_contribution_base,
            input.period,
        );
        debug!(
            %activity,
            profit_tax_base = %profit_tax_base,
            surtax = %taxes.surtax,
            "presumed bases computed"
        );

        let consumption_taxes = vec![
            ConsumptionTax::cumulative(TaxKind::Pis, revenue, self.config.pis_rate_pct),
            ConsumptionTax::cumulative(TaxKind::Cofins, revenue, self.config.cofins_rate_pct),
        ];

        let mut notes = Vec::new();
        let (municipal, note) =
            municipal_tax(self.municipal_tax, activity, revenue, municipal_rate);
        notes.extend(note);

        let total_tax = taxes.profit_tax_total()
            + taxes.social_contribution
            + consumption_taxes.iter().map(|t| t.payable).sum::<Decimal>()
            + municipal;
        let effective_rate_pct = clamp_rate_pct(ratio_pct(total_tax, revenue));

        Ok(PresumedProfitResult {
            profit_tax_base,
            social_contribution_base,
            profit_tax: taxes.profit_tax,
            profit_tax_surtax: taxes.surtax,
            profit_tax_total: taxes.profit_tax_total(),
            social_contribution_tax: taxes.social_contribution,
            consumption_taxes,
            municipal_tax: municipal,
            total_tax,
            effective_rate_pct,
            effective_rate_formatted: format_pct(effective_rate_pct),
            notes,
        })
    }
}

impl RegimeCalculator for PresumedProfitCalculator {
    fn regime(&self) -> RegimeName {
        RegimeName::PresumedProfit
    }

    fn compute(
        &self,
        projection: &AnnualProjection,
    ) -> Result<RegimeResult, RegimeError> {
        if projection.annual_revenue > self.config.revenue_cap {
            warn!(
                revenue = %projection.annual_revenue,
                cap = %self.config.revenue_cap,
                "revenue above presumed-profit ceiling"
            );
            return Ok(RegimeResult::inapplicable(
                self.regime(),
                "revenue exceeds presumed-profit ceiling",
            ));
        }

        let result = self.calculate(&PresumedProfitInput {
            revenue: projection.annual_revenue,
            activity_classification: projection.activity,
            period: PeriodKind::Annual,
            municipal_tax_rate_pct: projection.municipal_tax_rate_pct,
        })?;

        let breakdown = result.breakdown();
        Ok(
            RegimeResult::applicable(self.regime(), projection.annual_revenue, breakdown)
                .with_notes(result.notes),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn input(
        revenue: Decimal,
        activity: ActivityClassification,
        municipal: Option<Decimal>,
    ) -> PresumedProfitInput {
        PresumedProfitInput {
            revenue,
            activity_classification: activity,
            period: PeriodKind::Monthly,
            municipal_tax_rate_pct: municipal,
        }
    }

    #[test]
    fn commerce_300k_monthly() {
        let result = PresumedProfitCalculator::default()
            .calculate(&input(dec!(300000), ActivityClassification::Commerce, None))
            .unwrap();

        assert_eq!(result.profit_tax_base, dec!(24000));
        assert_eq!(result.profit_tax, dec!(3600));
        assert_eq!(result.profit_tax_surtax, dec!(400));
        assert_eq!(result.profit_tax_total, dec!(4000));
        assert_eq!(result.social_contribution_base, dec!(36000));
        assert_eq!(result.social_contribution_tax, dec!(3240));

        let payable: Vec<_> = result
            .consumption_taxes
            .iter()
            .map(|t| (t.kind, t.payable))
            .collect();
        assert_eq!(
            payable,
            vec![(TaxKind::Pis, dec!(1950)), (TaxKind::Cofins, dec!(9000))]
        );

        assert_eq!(result.municipal_tax, dec!(0));
        assert_eq!(result.total_tax, dec!(18190));
        assert!(result.notes.is_empty());
    }

    #[test]
    fn specific_services_bases_differ_from_general_services() {
        let calculator = PresumedProfitCalculator::default();

        let specific = calculator
            .calculate(&input(
                dec!(100000),
                ActivityClassification::SpecificServices,
                Some(dec!(2)),
            ))
            .unwrap();
        let general = calculator
            .calculate(&input(dec!(100000), ActivityClassification::Services, Some(dec!(2))))
            .unwrap();

        assert_eq!(specific.profit_tax_base, dec!(8000));
        assert_eq!(specific.social_contribution_base, dec!(12000));
        assert_eq!(general.profit_tax_base, dec!(32000));
        assert_eq!(general.social_contribution_base, dec!(32000));
        assert!(specific.total_tax < general.total_tax);
    }

    #[test]
    fn services_pay_municipal_tax_at_caller_rate() {
        let result = PresumedProfitCalculator::default()
            .calculate(&input(dec!(100000), ActivityClassification::Services, Some(dec!(5))))
            .unwrap();

        assert_eq!(result.municipal_tax, dec!(5000));
        assert_eq!(result.breakdown()[&TaxKind::Iss], dec!(5000));
    }

    #[test]
    fn zero_municipal_rate_is_reported_not_omitted() {
        let result = PresumedProfitCalculator::default()
            .calculate(&input(dec!(100000), ActivityClassification::Services, Some(dec!(0))))
            .unwrap();

        assert_eq!(result.breakdown().get(&TaxKind::Iss), Some(&dec!(0)));
        assert_eq!(result.notes.len(), 1);
    }

    #[test]
    fn municipal_rate_above_five_is_invalid() {
        let result = PresumedProfitCalculator::default().calculate(&input(
            dec!(100000),
            ActivityClassification::Services,
            Some(dec!(5.01)),
        ));

        assert!(matches!(result, Err(RegimeError::InvalidInput(_))));
    }

    #[test]
    fn quarterly_period_raises_surtax_threshold() {
        let calculator = PresumedProfitCalculator::default();
        let mut request = input(dec!(300000), ActivityClassification::Commerce, None);
        request.period = PeriodKind::Quarterly;

        let result = calculator.calculate(&request).unwrap();

        assert_eq!(result.profit_tax_surtax, dec!(0));
    }

    #[test]
    fn revenue_beyond_the_amount_bound_is_invalid() {
        let result = PresumedProfitCalculator::default().calculate(&input(
            dec!(70000000000000000000000000000),
            ActivityClassification::Commerce,
            None,
        ));

        assert!(matches!(result, Err(RegimeError::InvalidInput(_))));
    }

    #[test]
    fn non_positive_revenue_is_invalid() {
        let result = PresumedProfitCalculator::default()
            .calculate(&input(dec!(0), ActivityClassification::Commerce, None));

        assert_eq!(
            result,
            Err(RegimeError::InvalidInput("revenue must be positive, got 0".to_string()))
        );
    }

    #[test]
    fn projection_above_cap_is_inapplicable() {
        let projection = AnnualProjection::new(ActivityClassification::Commerce, dec!(80000000));

        let result = PresumedProfitCalculator::default().compute(&projection).unwrap();

        assert!(!result.applicable);
        assert_eq!(result.total_tax, dec!(0));
    }
}

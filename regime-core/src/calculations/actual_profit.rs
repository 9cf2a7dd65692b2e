//! Actual-profit regime (Lucro Real).
//!
//! Profit taxes apply to accounting profit. PIS and COFINS are
//! non-cumulative: the debit on revenue is reduced by credits, and credit
//! above the debit is discarded.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{
    check_amount, check_revenue, clamp_rate_pct, format_pct, percent_of, ratio_pct,
    serialize_money,
};
use crate::calculations::consumption::{ConsumptionTax, municipal_tax};
use crate::calculations::credit::{CreditEngine, CreditSummary};
use crate::calculations::profit_tax::{ProfitTaxes, profit_taxes};
use crate::comparison::{AnnualProjection, RegimeCalculator};
use crate::config::{ActualProfitConfig, MunicipalTaxPolicy};
use crate::{
    ActivityClassification, Breakdown, CreditCategory, PeriodKind, RegimeError, RegimeName,
    RegimeResult, TaxKind, validate_municipal_rate,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualProfitInput {
    pub revenue: Decimal,
    #[serde(default)]
    pub expenses: Decimal,
    #[serde(default)]
    pub payroll: Decimal,
    #[serde(default)]
    pub pis_credit: Option<Decimal>,
    #[serde(default)]
    pub cofins_credit: Option<Decimal>,
    #[serde(default)]
    pub period: PeriodKind,
    #[serde(default)]
    pub activity_classification: Option<ActivityClassification>,
    #[serde(default)]
    pub expenses_by_category: Option<BTreeMap<CreditCategory, Decimal>>,
    #[serde(default)]
    pub municipal_tax_rate_pct: Option<Decimal>,
}

/// Where the PIS/COFINS credits came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditBasis {
    /// Amounts supplied by the caller.
    Explicit,
    /// Computed from categorised expenses.
    Categories,
    /// Estimated from total expenses and the activity's credit fraction.
    Heuristic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualProfitResult {
    #[serde(serialize_with = "serialize_money")]
    pub taxable_profit: Decimal,
    pub loss: bool,
    #[serde(serialize_with = "serialize_money")]
    pub profit_tax: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub profit_tax_surtax: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub profit_tax_total: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub social_contribution_tax: Decimal,
    pub consumption_taxes: Vec<ConsumptionTax>,
    pub credit_basis: CreditBasis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_credits: Option<CreditSummary>,
    #[serde(serialize_with = "serialize_money")]
    pub municipal_tax: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub total_tax: Decimal,
    pub effective_rate_pct: Decimal,
    pub effective_rate_formatted: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl ActualProfitResult {
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

struct Credits {
    basis: CreditBasis,
    pis: Decimal,
    cofins: Decimal,
    summary: Option<CreditSummary>,
}

#[derive(Debug, Clone, Default)]
pub struct ActualProfitCalculator {
    config: ActualProfitConfig,
    municipal_tax: MunicipalTaxPolicy,
    credits: CreditEngine,
}

impl ActualProfitCalculator {
    pub fn new(
        config: ActualProfitConfig,
        municipal_tax: MunicipalTaxPolicy,
    ) -> Self {
        Self {
            config,
            municipal_tax,
            credits: CreditEngine,
        }
    }

    /// Computes the actual-profit liability for one period.
    ///
    /// # Errors
    ///
    /// [`RegimeError::InvalidInput`] when revenue is not positive, any amount
    /// is negative, or the categorised expenses are all zero.
    pub fn calculate(
        &self,
        input: &ActualProfitInput,
    ) -> Result<ActualProfitResult, RegimeError> {
        validate(input)?;
        let municipal_rate = validate_municipal_rate(input.municipal_tax_rate_pct)?;
        let revenue = input.revenue;
        let mut notes = Vec::new();

        let taxable_profit = revenue - input.expenses - input.payroll;
        let loss = taxable_profit <= Decimal::ZERO;
        let taxes = if loss {
            warn!(taxable_profit = %taxable_profit, "no taxable profit in period");
            notes.push(
                "no taxable profit: profit tax and social contribution are zero".to_string(),
            );
            ProfitTaxes::ZERO
        } else {
            profit_taxes(&self.config.profit_tax, taxable_profit, taxable_profit, input.period)
        };

        let credits = self.resolve_credits(input, &mut notes)?;
        let consumption_taxes = vec![
            ConsumptionTax::non_cumulative(
                TaxKind::Pis,
                revenue,
                self.config.pis_rate_pct,
                credits.pis,
            ),
            ConsumptionTax::non_cumulative(
                TaxKind::Cofins,
                revenue,
                self.config.cofins_rate_pct,
                credits.cofins,
            ),
        ];
        for tax in &consumption_taxes {
            let excess = tax.excess_credit();
            if excess > Decimal::ZERO {
                warn!(kind = ?tax.kind, excess = %excess, "excess credit discarded");
                notes.push(format!("{:?} credit above debit discarded", tax.kind));
            }
        }

        let municipal = match input.activity_classification {
            Some(activity) => {
                let (amount, note) =
                    municipal_tax(self.municipal_tax, activity, revenue, municipal_rate);
                notes.extend(note);
                amount
            }
            None => Decimal::ZERO,
        };

        let total_tax = taxes.profit_tax_total()
            + taxes.social_contribution
            + consumption_taxes.iter().map(|t| t.payable).sum::<Decimal>()
            + municipal;
        let effective_rate_pct = clamp_rate_pct(ratio_pct(total_tax, revenue));

        Ok(ActualProfitResult {
            taxable_profit,
            loss,
            profit_tax: taxes.profit_tax,
            profit_tax_surtax: taxes.surtax,
            profit_tax_total: taxes.profit_tax_total(),
            social_contribution_tax: taxes.social_contribution,
            consumption_taxes,
            credit_basis: credits.basis,
            category_credits: credits.summary,
            municipal_tax: municipal,
            total_tax,
            effective_rate_pct,
            effective_rate_formatted: format_pct(effective_rate_pct),
            notes,
        })
    }

    /// Explicit amounts win, then categorised expenses, then the heuristic.
    fn resolve_credits(
        &self,
        input: &ActualProfitInput,
        notes: &mut Vec<String>,
    ) -> Result<Credits, RegimeError> {
        if input.pis_credit.is_some() || input.cofins_credit.is_some() {
            return Ok(Credits {
                basis: CreditBasis::Explicit,
                pis: input.pis_credit.unwrap_or(Decimal::ZERO),
                cofins: input.cofins_credit.unwrap_or(Decimal::ZERO),
                summary: None,
            });
        }

        if let Some(expenses) = &input.expenses_by_category {
            let summary = self.credits.credits_for(expenses)?;
            return Ok(Credits {
                basis: CreditBasis::Categories,
                pis: summary.total_pis,
                cofins: summary.total_cofins,
                summary: Some(summary),
            });
        }

        let fraction_pct = input
            .activity_classification
            .unwrap_or(ActivityClassification::Services)
            .heuristic_credit_fraction_pct();
        let creditable = percent_of(input.expenses, fraction_pct);
        debug!(fraction_pct = %fraction_pct, creditable = %creditable, "heuristic credit basis");
        if creditable > Decimal::ZERO {
            notes.push(format!(
                "credits are an approximation: {fraction_pct}% of expenses assumed creditable"
            ));
        }
        Ok(Credits {
            basis: CreditBasis::Heuristic,
            pis: percent_of(creditable, self.config.pis_rate_pct),
            cofins: percent_of(creditable, self.config.cofins_rate_pct),
            summary: None,
        })
    }
}

fn validate(input: &ActualProfitInput) -> Result<(), RegimeError> {
    check_revenue("revenue", input.revenue)?;
    let amounts = [
        ("expenses", Some(input.expenses)),
        ("payroll", Some(input.payroll)),
        ("pisCredit", input.pis_credit),
        ("cofinsCredit", input.cofins_credit),
    ];
    for (field, value) in amounts {
        if let Some(v) = value {
            check_amount(field, v)?;
        }
    }
    Ok(())
}

impl RegimeCalculator for ActualProfitCalculator {
    fn regime(&self) -> RegimeName {
        RegimeName::ActualProfit
    }

    fn compute(
        &self,
        projection: &AnnualProjection,
    ) -> Result<RegimeResult, RegimeError> {
        let result = self.calculate(&ActualProfitInput {
            revenue: projection.annual_revenue,
            expenses: projection.annual_expenses,
            payroll: projection.trailing12_payroll.unwrap_or(Decimal::ZERO),
            pis_credit: projection.annual_pis_credit,
            cofins_credit: projection.annual_cofins_credit,
            period: PeriodKind::Annual,
            activity_classification: Some(projection.activity),
            expenses_by_category: if projection.annual_expenses_by_category.is_empty() {
                None
            } else {
                Some(projection.annual_expenses_by_category.clone())
            },
            municipal_tax_rate_pct: projection.municipal_tax_rate_pct,
        })?;

        let breakdown = result.breakdown();
        Ok(
            RegimeResult::applicable(self.regime(), projection.annual_revenue, breakdown)
                .with_loss(result.loss)
                .with_notes(result.notes),
        )
    }
}

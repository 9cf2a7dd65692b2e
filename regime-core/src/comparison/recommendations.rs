//! Rule-based advice attached to a diagnostic report.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculations::bracket_table::effective_rate;
use crate::calculations::common::{percent_of, serialize_opt_money, to_money};
use crate::calculations::payroll_ratio::PayrollRatio;
use crate::calculations::simplified::REVENUE_CEILING_REASON;
use crate::comparison::{AnnualProjection, ComparisonResult};
use crate::config::SimplifiedConfig;
use crate::{AnnexId, BracketTable, RegimeName, RegimeResult, TableRule};

/// Ratio below which raising payroll to the threshold is not suggested.
const PAYROLL_ADVICE_FLOOR_PCT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    RaisePayroll,
    LossFavoursActualProfit,
    SimplifiedCeilingExceeded,
    ApproachingSimplifiedCeiling,
    AdoptRegime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub message: String,
    /// Annual tax difference the advice is expected to make, when known.
    #[serde(serialize_with = "serialize_opt_money", skip_serializing_if = "Option::is_none")]
    pub estimated_impact: Option<Decimal>,
}

pub(crate) struct Findings<'a> {
    pub projection: &'a AnnualProjection,
    pub config: &'a SimplifiedConfig,
    pub payroll_ratio: Option<&'a PayrollRatio>,
    pub regimes: &'a [RegimeResult],
    pub comparison: &'a ComparisonResult,
}

impl Findings<'_> {
    fn regime(
        &self,
        name: RegimeName,
    ) -> Option<&RegimeResult> {
        self.regimes.iter().find(|r| r.regime_name == name)
    }
}

/// Applies every rule in order; each contributes at most one recommendation.
pub(crate) fn recommend(findings: &Findings<'_>) -> Vec<Recommendation> {
    [
        raise_payroll(findings),
        loss_favours_actual_profit(findings),
        simplified_ceiling_exceeded(findings),
        approaching_simplified_ceiling(findings),
        adopt_best_regime(findings),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn raise_payroll(findings: &Findings<'_>) -> Option<Recommendation> {
    if findings.projection.activity.table_rule() != TableRule::PayrollRatio {
        return None;
    }
    let ratio = findings.payroll_ratio?;
    let threshold = findings.config.payroll_ratio_threshold_pct;
    if ratio.ratio_pct <= PAYROLL_ADVICE_FLOOR_PCT || ratio.ratio_pct >= threshold {
        return None;
    }

    let current = findings.projection.trailing12_payroll.unwrap_or(Decimal::ZERO);
    let required = ratio.required_payroll_for_threshold;
    Some(Recommendation {
        kind: RecommendationKind::RaisePayroll,
        priority: Priority::High,
        message: format!(
            "raise payroll toward {threshold}%: payroll ratio is {}, \
             reaching the threshold needs {} in trailing payroll ({} more)",
            ratio.ratio_formatted,
            to_money(required),
            to_money(required - current),
        ),
        estimated_impact: annex_switch_saving(findings.projection.annual_revenue),
    })
}

/// Tax difference between annex V and annex III at the same revenue.
fn annex_switch_saving(revenue: Decimal) -> Option<Decimal> {
    let high = BracketTable::statutory(AnnexId::V).ok()?;
    let low = BracketTable::statutory(AnnexId::III).ok()?;
    let high_rate = effective_rate(revenue, &high).ok()??;
    let low_rate = effective_rate(revenue, &low).ok()??;
    Some(percent_of(
        revenue,
        high_rate.effective_rate_pct - low_rate.effective_rate_pct,
    ))
}

fn loss_favours_actual_profit(findings: &Findings<'_>) -> Option<Recommendation> {
    let actual = findings.regime(RegimeName::ActualProfit)?;
    if !actual.applicable || !actual.loss {
        return None;
    }
    Some(Recommendation {
        kind: RecommendationKind::LossFavoursActualProfit,
        priority: Priority::Medium,
        message: "actual profit avoids profit tax while in a loss".to_string(),
        estimated_impact: None,
    })
}

fn simplified_ceiling_exceeded(findings: &Findings<'_>) -> Option<Recommendation> {
    let simplified = findings.regime(RegimeName::Simplified)?;
    if simplified.applicable
        || simplified.inapplicability_reason.as_deref() != Some(REVENUE_CEILING_REASON)
    {
        return None;
    }
    Some(Recommendation {
        kind: RecommendationKind::SimplifiedCeilingExceeded,
        priority: Priority::High,
        message: format!(
            "revenue exceeds simplified ceiling of {}",
            to_money(findings.config.revenue_cap)
        ),
        estimated_impact: None,
    })
}

fn approaching_simplified_ceiling(findings: &Findings<'_>) -> Option<Recommendation> {
    let simplified = findings.regime(RegimeName::Simplified)?;
    let warning_level = percent_of(
        findings.config.revenue_cap,
        findings.config.ceiling_warning_pct,
    );
    if !simplified.applicable || findings.projection.annual_revenue < warning_level {
        return None;
    }
    Some(Recommendation {
        kind: RecommendationKind::ApproachingSimplifiedCeiling,
        priority: Priority::Medium,
        message: format!(
            "approaching simplified ceiling: revenue is within {}% of {}",
            Decimal::ONE_HUNDRED - findings.config.ceiling_warning_pct,
            to_money(findings.config.revenue_cap)
        ),
        estimated_impact: None,
    })
}

fn adopt_best_regime(findings: &Findings<'_>) -> Option<Recommendation> {
    let best = findings.comparison.best_regime?;
    if findings.comparison.savings <= Decimal::ZERO {
        return None;
    }
    Some(Recommendation {
        kind: RecommendationKind::AdoptRegime,
        priority: Priority::Low,
        message: format!(
            "adopt {}: saves {} a year against the most expensive regime",
            best.label(),
            to_money(findings.comparison.savings)
        ),
        estimated_impact: Some(findings.comparison.savings),
    })
}

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use super::projection::{AnnualProjection, RegimeCalculator};
use super::recommendations::{Findings, Recommendation, recommend};
use crate::calculations::actual_profit::ActualProfitCalculator;
use crate::calculations::common::serialize_money;
use crate::calculations::payroll_ratio::{PayrollRatio, PayrollRatioClassifier};
use crate::calculations::presumed_profit::PresumedProfitCalculator;
use crate::calculations::simplified::{REVENUE_CEILING_REASON, SimplifiedCalculator};
use crate::config::{ConfigError, EngineConfig};
use crate::{FinancialProfile, RegimeError, RegimeName, RegimeResult, TableRule};

/// Applicable regimes ordered by ascending total tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub ranked: Vec<RegimeResult>,
    pub best_regime: Option<RegimeName>,
    pub worst_regime: Option<RegimeName>,
    /// Worst minus best total; zero with fewer than two applicable regimes.
    #[serde(serialize_with = "serialize_money")]
    pub savings: Decimal,
}

impl ComparisonResult {
    /// Ranks the applicable results. The sort is stable, so ties keep the
    /// order of `results`.
    pub fn rank(results: &[RegimeResult]) -> Self {
        let mut ranked: Vec<RegimeResult> =
            results.iter().filter(|r| r.applicable).cloned().collect();
        ranked.sort_by(|a, b| a.total_tax.cmp(&b.total_tax));

        let best = ranked.first();
        let worst = ranked.last();
        let savings = match (best, worst) {
            (Some(best), Some(worst)) if ranked.len() >= 2 => worst.total_tax - best.total_tax,
            _ => Decimal::ZERO,
        };

        Self {
            best_regime: best.map(|r| r.regime_name),
            worst_regime: worst.map(|r| r.regime_name),
            savings,
            ranked,
        }
    }

    pub fn best(&self) -> Option<&RegimeResult> {
        self.ranked.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub projection: AnnualProjection,
    /// Every regime, applicable or not, in fixed order.
    pub regimes: Vec<RegimeResult>,
    #[serde(flatten)]
    pub comparison: ComparisonResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payroll_ratio: Option<PayrollRatio>,
    pub recommendations: Vec<Recommendation>,
}

/// Runs all regimes over one profile and compares them.
pub struct ComparisonEngine {
    config: EngineConfig,
    simplified: SimplifiedCalculator,
    presumed: PresumedProfitCalculator,
    actual: ActualProfitCalculator,
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl ComparisonEngine {
    /// # Errors
    ///
    /// [`ConfigError`] when a rate or ceiling in `config` is out of range.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            simplified: SimplifiedCalculator::new(config.simplified.clone()),
            presumed: PresumedProfitCalculator::new(config.presumed.clone(), config.municipal_tax),
            actual: ActualProfitCalculator::new(config.actual.clone(), config.municipal_tax),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn simplified(&self) -> &SimplifiedCalculator {
        &self.simplified
    }

    pub fn presumed(&self) -> &PresumedProfitCalculator {
        &self.presumed
    }

    pub fn actual(&self) -> &ActualProfitCalculator {
        &self.actual
    }

    pub fn payroll_classifier(&self) -> PayrollRatioClassifier {
        PayrollRatioClassifier::new(self.config.simplified.payroll_ratio_threshold_pct)
    }

    fn calculators(&self) -> [&dyn RegimeCalculator; 3] {
        [&self.simplified, &self.presumed, &self.actual]
    }

    /// Computes, ranks and comments on every regime for `profile`.
    ///
    /// A failing calculator does not fail the diagnosis: its regime is
    /// reported inapplicable with the error as the reason.
    ///
    /// # Errors
    ///
    /// Currently none; the `Result` leaves room for preconditions on the
    /// whole profile.
    pub fn diagnose(
        &self,
        profile: &FinancialProfile,
    ) -> Result<DiagnosticReport, RegimeError> {
        let projection = AnnualProjection::from_profile(profile);

        let regimes: Vec<RegimeResult> = self
            .calculators()
            .into_iter()
            .map(|calculator| self.run(calculator, &projection))
            .collect();

        let comparison = ComparisonResult::rank(&regimes);
        let payroll_ratio = self.payroll_ratio(&projection);
        let recommendations = recommend(&Findings {
            projection: &projection,
            config: &self.config.simplified,
            payroll_ratio: payroll_ratio.as_ref(),
            regimes: &regimes,
            comparison: &comparison,
        });

        debug!(
            best = ?comparison.best_regime,
            savings = %comparison.savings,
            recommendations = recommendations.len(),
            "diagnosis complete"
        );

        Ok(DiagnosticReport {
            projection,
            regimes,
            comparison,
            payroll_ratio,
            recommendations,
        })
    }

    fn run(
        &self,
        calculator: &dyn RegimeCalculator,
        projection: &AnnualProjection,
    ) -> RegimeResult {
        let regime = calculator.regime();
        if regime == RegimeName::Simplified
            && projection.annual_revenue > self.config.simplified.revenue_cap
        {
            return RegimeResult::inapplicable(regime, REVENUE_CEILING_REASON);
        }

        calculator.compute(projection).unwrap_or_else(|err| {
            warn!(%regime, error = %err, "regime calculation failed");
            RegimeResult::inapplicable(regime, err.to_string())
        })
    }

    fn payroll_ratio(
        &self,
        projection: &AnnualProjection,
    ) -> Option<PayrollRatio> {
        if projection.activity.table_rule() != TableRule::PayrollRatio {
            return None;
        }
        let payroll = projection.trailing12_payroll?;
        self.payroll_classifier()
            .classify(payroll, projection.annual_revenue)
            .ok()
    }
}

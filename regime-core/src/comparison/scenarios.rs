//! What-if simulation: perturb a profile and diagnose it again.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::{ComparisonEngine, DiagnosticReport};
use crate::calculations::common::serialize_money;
use crate::{FinancialProfile, RegimeError, RegimeName};

/// Multiplicative changes applied to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perturbation {
    pub name: String,
    #[serde(default = "unit")]
    pub revenue_factor: Decimal,
    #[serde(default = "unit")]
    pub payroll_factor: Decimal,
    #[serde(default = "unit")]
    pub expense_factor: Decimal,
}

fn unit() -> Decimal {
    Decimal::ONE
}

fn factor(change_pct: i64) -> Decimal {
    Decimal::ONE + Decimal::new(change_pct, 2)
}

impl Perturbation {
    pub fn payroll_change(change_pct: i64) -> Self {
        Self {
            name: format!("payroll {change_pct:+}%"),
            revenue_factor: Decimal::ONE,
            payroll_factor: factor(change_pct),
            expense_factor: Decimal::ONE,
        }
    }

    pub fn expense_change(change_pct: i64) -> Self {
        Self {
            name: format!("expenses {change_pct:+}%"),
            revenue_factor: Decimal::ONE,
            payroll_factor: Decimal::ONE,
            expense_factor: factor(change_pct),
        }
    }

    pub fn revenue_change(change_pct: i64) -> Self {
        Self {
            name: format!("revenue {change_pct:+}%"),
            revenue_factor: factor(change_pct),
            payroll_factor: Decimal::ONE,
            expense_factor: Decimal::ONE,
        }
    }

    /// Payroll +20%, expenses −15%, revenue +10% and revenue −10%.
    pub fn standard_set() -> Vec<Self> {
        vec![
            Self::payroll_change(20),
            Self::expense_change(-15),
            Self::revenue_change(10),
            Self::revenue_change(-10),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    pub scenario: Perturbation,
    pub baseline: DiagnosticReport,
    pub perturbed: DiagnosticReport,
    pub baseline_regime: Option<RegimeName>,
    pub perturbed_regime: Option<RegimeName>,
    /// Perturbed best total minus baseline best total.
    #[serde(serialize_with = "serialize_money")]
    pub delta: Decimal,
    /// The change lowers the best achievable tax.
    pub worthwhile: bool,
}

fn best_total(report: &DiagnosticReport) -> Option<Decimal> {
    report.comparison.best().map(|r| r.total_tax)
}

impl ComparisonEngine {
    /// Diagnoses `profile` and its perturbed copy with the same engine.
    ///
    /// # Errors
    ///
    /// [`RegimeError::InvalidInput`] when the perturbation produces an
    /// invalid profile (for example non-positive revenue).
    pub fn simulate_scenario(
        &self,
        profile: &FinancialProfile,
        scenario: &Perturbation,
    ) -> Result<ScenarioOutcome, RegimeError> {
        let baseline = self.diagnose(profile)?;
        self.simulate_against(profile, baseline, scenario)
    }

    /// Runs every perturbation of [`Perturbation::standard_set`]
    /// independently against the same baseline.
    ///
    /// # Errors
    ///
    /// Same as [`ComparisonEngine::simulate_scenario`].
    pub fn simulate_scenarios(
        &self,
        profile: &FinancialProfile,
    ) -> Result<Vec<ScenarioOutcome>, RegimeError> {
        let baseline = self.diagnose(profile)?;
        Perturbation::standard_set()
            .iter()
            .map(|scenario| self.simulate_against(profile, baseline.clone(), scenario))
            .collect()
    }

    fn simulate_against(
        &self,
        profile: &FinancialProfile,
        baseline: DiagnosticReport,
        scenario: &Perturbation,
    ) -> Result<ScenarioOutcome, RegimeError> {
        let changed = profile.perturbed(
            scenario.revenue_factor,
            scenario.payroll_factor,
            scenario.expense_factor,
        )?;
        let perturbed = self.diagnose(&changed)?;

        let delta = match (best_total(&baseline), best_total(&perturbed)) {
            (Some(before), Some(after)) => after - before,
            _ => Decimal::ZERO,
        };
        debug!(scenario = %scenario.name, delta = %delta, "scenario simulated");

        Ok(ScenarioOutcome {
            scenario: scenario.clone(),
            baseline_regime: baseline.comparison.best_regime,
            perturbed_regime: perturbed.comparison.best_regime,
            baseline,
            perturbed,
            delta,
            worthwhile: delta < Decimal::ZERO,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{ActivityClassification, ProfileInput};

    fn services_profile() -> FinancialProfile {
        let mut input = ProfileInput::new(dec!(600000), ActivityClassification::Services);
        input.trailing12_payroll = Some(dec!(150000));
        input.current_expenses = Some(dec!(10000));
        FinancialProfile::try_from(input).unwrap()
    }

    #[test]
    fn standard_set_names() {
        let names: Vec<String> = Perturbation::standard_set().into_iter().map(|p| p.name).collect();

        assert_eq!(
            names,
            vec!["payroll +20%", "expenses -15%", "revenue +10%", "revenue -10%"]
        );
    }

    #[test]
    fn factors_are_exact() {
        assert_eq!(Perturbation::payroll_change(20).payroll_factor, dec!(1.20));
        assert_eq!(Perturbation::expense_change(-15).expense_factor, dec!(0.85));
    }

    #[test]
    fn identity_scenario_has_zero_delta() {
        let engine = ComparisonEngine::default();
        let identity = Perturbation {
            name: "none".to_string(),
            revenue_factor: dec!(1),
            payroll_factor: dec!(1),
            expense_factor: dec!(1),
        };

        let outcome = engine.simulate_scenario(&services_profile(), &identity).unwrap();

        assert_eq!(outcome.delta, dec!(0));
        assert!(!outcome.worthwhile);
        assert_eq!(outcome.baseline, outcome.perturbed);
    }

    #[test]
    fn payroll_increase_crossing_threshold_is_worthwhile() {
        // 150k / 600k = 25% (annex V); +20% payroll gives 30% (annex III).
        let engine = ComparisonEngine::default();

        let outcome = engine
            .simulate_scenario(&services_profile(), &Perturbation::payroll_change(20))
            .unwrap();

        // presumed 67,980 before; simplified at 10.56% (63,360) after
        assert_eq!(outcome.baseline_regime, Some(RegimeName::PresumedProfit));
        assert_eq!(outcome.perturbed_regime, Some(RegimeName::Simplified));
        assert_eq!(outcome.delta, dec!(-4620));
        assert!(outcome.worthwhile);
    }

    #[test]
    fn baseline_is_identical_across_scenarios() {
        let outcomes = ComparisonEngine::default()
            .simulate_scenarios(&services_profile())
            .unwrap();

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.windows(2).all(|w| w[0].baseline == w[1].baseline));
    }

    #[test]
    fn oversized_factor_is_invalid_not_a_panic() {
        let explosive: Perturbation = serde_json::from_str(
            r#"{ "name": "explosive", "revenueFactor": "100000000000000000000000" }"#,
        )
        .unwrap();

        let result = ComparisonEngine::default().simulate_scenario(&services_profile(), &explosive);

        assert!(matches!(result, Err(RegimeError::InvalidInput(_))));
    }

    #[test]
    fn perturbation_to_zero_revenue_is_invalid() {
        let wipe_out = Perturbation {
            name: "wipe out".to_string(),
            revenue_factor: dec!(0),
            payroll_factor: dec!(1),
            expense_factor: dec!(1),
        };

        let result = ComparisonEngine::default().simulate_scenario(&services_profile(), &wipe_out);

        assert!(matches!(result, Err(RegimeError::InvalidInput(_))));
    }
}

//! One function per subcommand. Each takes the parsed request and returns a
//! serialisable response; `main` only does I/O.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regime_core::calculations::common::{format_pct, serialize_opt_money};
use regime_core::calculations::{
    ActualProfitInput, ActualProfitResult, PayrollRatio, PayrollRatioInput, PayrollScenario,
    PresumedProfitInput, PresumedProfitResult, SimplifiedInput, SimplifiedResult,
};
use regime_core::comparison::{Perturbation, ScenarioOutcome};
use regime_core::history::{InMemoryHistoryRepository, TrailingTotals, trailing_twelve};
use regime_core::{
    ActivityClassification, ComparisonEngine, DiagnosticReport, FinancialProfile, ProfileInput,
    RegimeName, TableRule,
};
use regime_data::{ActivityCode, ActivityCodeTable, HistoryLoader};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub fn simplified(
    engine: &ComparisonEngine,
    input: &SimplifiedInput,
) -> Result<SimplifiedResult> {
    Ok(engine.simplified().calculate(input)?)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRatioReport {
    #[serde(flatten)]
    pub ratio: PayrollRatio,
    pub scenarios: Vec<PayrollScenario>,
}

pub fn payroll_ratio(
    engine: &ComparisonEngine,
    input: &PayrollRatioInput,
) -> Result<PayrollRatioReport> {
    let classifier = engine.payroll_classifier();
    let ratio = classifier.classify(input.trailing12_payroll, input.trailing12_revenue)?;
    let scenarios = classifier.scenarios(input.trailing12_revenue, input.trailing12_payroll)?;
    Ok(PayrollRatioReport { ratio, scenarios })
}

pub fn presumed(
    engine: &ComparisonEngine,
    input: &PresumedProfitInput,
) -> Result<PresumedProfitResult> {
    Ok(engine.presumed().calculate(input)?)
}

pub fn actual(
    engine: &ComparisonEngine,
    input: &ActualProfitInput,
) -> Result<ActualProfitResult> {
    Ok(engine.actual().calculate(input)?)
}

pub fn diagnose(
    engine: &ComparisonEngine,
    input: ProfileInput,
) -> Result<DiagnosticReport> {
    let profile = FinancialProfile::try_from(input)?;
    Ok(engine.diagnose(&profile)?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub profile: ProfileInput,
    /// Falls back to the standard set when empty.
    #[serde(default)]
    pub scenarios: Vec<Perturbation>,
}

pub fn simulate(
    engine: &ComparisonEngine,
    request: SimulateRequest,
) -> Result<Vec<ScenarioOutcome>> {
    let profile = FinancialProfile::try_from(request.profile)?;
    if request.scenarios.is_empty() {
        return Ok(engine.simulate_scenarios(&profile)?);
    }
    request
        .scenarios
        .iter()
        .map(|scenario| {
            engine
                .simulate_scenario(&profile, scenario)
                .with_context(|| format!("scenario '{}'", scenario.name))
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub company_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_regime: Option<RegimeName>,
    #[serde(serialize_with = "serialize_opt_money", skip_serializing_if = "Option::is_none")]
    pub best_total_tax: Option<Decimal>,
    #[serde(serialize_with = "serialize_opt_money", skip_serializing_if = "Option::is_none")]
    pub savings: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Diagnoses every profile of a CSV file. A profile that fails to diagnose
/// is reported in its entry and does not stop the batch.
pub fn batch(
    engine: &ComparisonEngine,
    path: &Path,
) -> Result<Vec<BatchEntry>> {
    let loaded = regime_data::load_from_file(path)
        .with_context(|| format!("cannot load profiles from {}", path.display()))?;
    info!(profiles = loaded.len(), "batch loaded");

    Ok(loaded
        .into_iter()
        .map(|entry| match engine.diagnose(&entry.profile) {
            Ok(report) => BatchEntry {
                best_total_tax: report.comparison.best().map(|r| r.total_tax),
                best_regime: report.comparison.best_regime,
                savings: Some(report.comparison.savings),
                error: None,
                company_id: entry.company_id,
            },
            Err(err) => {
                warn!(company_id = %entry.company_id, error = %err, "diagnosis failed");
                BatchEntry {
                    company_id: entry.company_id,
                    best_regime: None,
                    best_total_tax: None,
                    savings: None,
                    error: Some(err.to_string()),
                }
            }
        })
        .collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLookup {
    #[serde(flatten)]
    pub code: ActivityCode,
    pub profit_presumption_pct: Decimal,
    pub profit_presumption_formatted: String,
    pub social_contribution_presumption_pct: Decimal,
    pub social_contribution_presumption_formatted: String,
    pub simplified_table: String,
}

pub fn activity(code: &str) -> Result<ActivityLookup> {
    let table = ActivityCodeTable::bundled().context("bundled activity table is invalid")?;
    let found = table
        .lookup(code)
        .cloned()
        .with_context(|| format!("unknown activity code '{code}'"))?;
    let activity = found.activity;

    Ok(ActivityLookup {
        profit_presumption_pct: activity.profit_presumption_pct(),
        profit_presumption_formatted: format_pct(activity.profit_presumption_pct()),
        social_contribution_presumption_pct: activity.social_contribution_presumption_pct(),
        social_contribution_presumption_formatted: format_pct(
            activity.social_contribution_presumption_pct(),
        ),
        simplified_table: match activity.table_rule() {
            TableRule::Fixed(annex) => annex.to_string(),
            TableRule::PayrollRatio => "annex III or V by payroll ratio".to_string(),
        },
        code: found,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryReport {
    pub totals: TrailingTotals,
    pub report: DiagnosticReport,
}

/// Loads monthly history, aggregates the trailing twelve months up to
/// `as_of` and diagnoses the resulting profile.
pub async fn history(
    engine: &ComparisonEngine,
    path: &Path,
    company_id: &str,
    as_of: NaiveDate,
    activity: ActivityClassification,
) -> Result<HistoryReport> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("cannot open history file {}", path.display()))?;
    let records = HistoryLoader::parse(file)?;

    let repository = InMemoryHistoryRepository::new();
    HistoryLoader::load(&repository, records).await?;

    let totals = trailing_twelve(&repository, company_id, as_of).await?;
    if totals.months_covered == 0 {
        anyhow::bail!("no history for company '{company_id}' in the twelve months up to {as_of}");
    }
    let profile = FinancialProfile::try_from(totals.to_profile_input(activity))
        .context("trailing totals do not form a valid profile")?;
    let report = engine.diagnose(&profile)?;

    Ok(HistoryReport { totals, report })
}

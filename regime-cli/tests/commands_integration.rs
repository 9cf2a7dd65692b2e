//! Exercises the subcommand functions and config parsing without spawning
//! the binary.

use std::path::PathBuf;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use regime_cli::AppConfig;
use regime_cli::commands::{self, SimulateRequest};
use regime_core::calculations::{PayrollRatioInput, PayrollTable, SimplifiedInput};
use regime_core::config::MunicipalTaxPolicy;
use regime_core::{ActivityClassification, ComparisonEngine, ProfileInput, RegimeName};
use rust_decimal_macros::dec;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../regime-data/tests/fixtures")
        .join(name)
}

#[test]
fn empty_config_keeps_defaults() {
    let config = AppConfig::from_toml_str("").unwrap();

    assert_eq!(config, AppConfig::default());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn config_overrides_engine_and_logging() {
    let toml = r#"
[engine]
municipal_tax = "excluded"

[engine.simplified]
revenue_cap = "3600000"

[logging]
level = "debug"
file = "regime.log"
"#;

    let config = AppConfig::from_toml_str(toml).unwrap();

    assert_eq!(config.engine.municipal_tax, MunicipalTaxPolicy::Excluded);
    assert_eq!(config.engine.simplified.revenue_cap, dec!(3600000));
    assert_eq!(config.logging.file, Some(PathBuf::from("regime.log")));
    // untouched keys keep their statutory values
    assert_eq!(config.engine.presumed.revenue_cap, dec!(78000000));
}

#[test]
fn non_positive_cap_is_rejected() {
    let toml = "[engine.simplified]\nrevenue_cap = \"0\"\n";

    assert!(AppConfig::from_toml_str(toml).is_err());
}

#[test]
fn missing_config_file_is_an_error() {
    let result = AppConfig::load(Some(std::path::Path::new("/nonexistent/regime.toml")));

    assert!(result.is_err());
    assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
}

#[test]
fn simplified_command_formats_rate() {
    let input: SimplifiedInput = serde_json::from_str(
        r#"{ "trailing12Revenue": "180000", "currentMonthRevenue": "15000",
             "activityClassification": "commerce" }"#,
    )
    .unwrap();

    let result = commands::simplified(&ComparisonEngine::default(), &input).unwrap();

    assert!(result.applicable);
    assert_eq!(result.effective_rate_formatted, "4.00%");
    assert_eq!(result.nominal_rate_formatted, "4.00%");
}

#[test]
fn payroll_ratio_command_returns_checkpoints() {
    let input = PayrollRatioInput {
        trailing12_payroll: dec!(336000),
        trailing12_revenue: dec!(1200000),
    };

    let report = commands::payroll_ratio(&ComparisonEngine::default(), &input).unwrap();

    assert_eq!(report.ratio.selected_table, PayrollTable::A);
    assert_eq!(report.scenarios.len(), 5);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["ratioFormatted"], "28.00%");
}

#[test]
fn diagnose_command_rejects_invalid_profile() {
    let input = ProfileInput::new(dec!(-1), ActivityClassification::Commerce);

    assert!(commands::diagnose(&ComparisonEngine::default(), input).is_err());
}

#[test]
fn simulate_without_scenarios_runs_standard_set() {
    let mut profile = ProfileInput::new(dec!(600000), ActivityClassification::Services);
    profile.trailing12_payroll = Some(dec!(150000));
    let request = SimulateRequest {
        profile,
        scenarios: Vec::new(),
    };

    let outcomes = commands::simulate(&ComparisonEngine::default(), request).unwrap();

    assert_eq!(outcomes.len(), 4);
}

#[test]
fn batch_reports_every_company() {
    let entries = commands::batch(&ComparisonEngine::default(), &fixture("profiles.csv")).unwrap();

    let companies: Vec<&str> = entries.iter().map(|e| e.company_id.as_str()).collect();
    assert_eq!(companies, vec!["padaria", "software", "atacado", "consultoria"]);
    assert!(entries.iter().all(|e| e.error.is_none() && e.best_regime.is_some()));
    let atacado = &entries[2];
    assert_ne!(atacado.best_regime, Some(RegimeName::Simplified));
}

#[test]
fn batch_money_is_serialised_with_two_places() {
    let entries = commands::batch(&ComparisonEngine::default(), &fixture("profiles.csv")).unwrap();

    let json = serde_json::to_value(&entries).unwrap();
    for entry in json.as_array().unwrap() {
        for field in ["bestTotalTax", "savings"] {
            let value = entry[field].as_str().unwrap();
            let (_, places) = value.split_once('.').unwrap();
            assert_eq!(places.len(), 2, "{field} = {value}");
        }
    }
}

#[test]
fn activity_command_describes_the_code() {
    let lookup = commands::activity("6201501").unwrap();

    assert_eq!(lookup.code.code, "6201-5/01");
    assert_eq!(lookup.code.activity, ActivityClassification::Services);
    assert_eq!(lookup.profit_presumption_pct, dec!(32));
    assert_eq!(lookup.simplified_table, "annex III or V by payroll ratio");
    let json = serde_json::to_value(&lookup).unwrap();
    assert_eq!(json["profitPresumptionPct"], "32");
    assert_eq!(json["profitPresumptionFormatted"], "32.00%");
    assert_eq!(json["socialContributionPresumptionFormatted"], "32.00%");

    assert!(commands::activity("0000-0/00").is_err());
}

#[tokio::test]
async fn history_command_diagnoses_trailing_year() {
    let report = commands::history(
        &ComparisonEngine::default(),
        &fixture("history.csv"),
        "software",
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
        ActivityClassification::Services,
    )
    .await
    .unwrap();

    assert_eq!(report.totals.months_covered, 12);
    assert_eq!(report.totals.revenue, dec!(1200000));
    assert_eq!(report.report.regimes.len(), 3);
}

#[tokio::test]
async fn history_command_without_data_fails() {
    let result = commands::history(
        &ComparisonEngine::default(),
        &fixture("history.csv"),
        "unknown",
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        ActivityClassification::Services,
    )
    .await;

    assert!(result.is_err());
}

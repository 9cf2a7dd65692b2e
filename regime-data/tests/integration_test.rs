//! Loads the fixtures end to end and runs them through the comparison engine.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use regime_core::history::{InMemoryHistoryRepository, trailing_twelve};
use regime_core::{ActivityClassification, ComparisonEngine, FinancialProfile, RegimeName};
use regime_data::{ActivityCodeTable, HistoryLoader, load_from_str};
use rust_decimal_macros::dec;

const PROFILES_CSV: &str = include_str!("fixtures/profiles.csv");
const HISTORY_CSV: &str = include_str!("fixtures/history.csv");

#[test]
fn every_fixture_profile_diagnoses() {
    let engine = ComparisonEngine::default();
    let loaded = load_from_str(PROFILES_CSV).unwrap();

    let companies: Vec<&str> = loaded.iter().map(|l| l.company_id.as_str()).collect();
    assert_eq!(companies, vec!["padaria", "software", "atacado", "consultoria"]);

    for entry in &loaded {
        let report = engine.diagnose(&entry.profile).unwrap();
        assert_eq!(report.regimes.len(), 3, "{}", entry.company_id);
        assert!(report.comparison.best_regime.is_some(), "{}", entry.company_id);
    }
}

#[test]
fn wholesale_fixture_is_above_simplified_ceiling() {
    let loaded = load_from_str(PROFILES_CSV).unwrap();
    let atacado = loaded.iter().find(|l| l.company_id == "atacado").unwrap();

    let report = ComparisonEngine::default().diagnose(&atacado.profile).unwrap();

    assert!(!report.regimes[0].applicable);
    assert_eq!(report.comparison.ranked.len(), 2);
    // quarterly expenses are projected to a year
    assert_eq!(report.projection.annual_expenses, dec!(2400000));
}

#[tokio::test]
async fn history_feeds_a_trailing_twelve_profile() {
    let repo = InMemoryHistoryRepository::new();
    let records = HistoryLoader::parse(HISTORY_CSV.as_bytes()).unwrap();
    assert_eq!(HistoryLoader::load(&repo, records).await.unwrap(), 15);

    let totals = trailing_twelve(&repo, "software", NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
        .await
        .unwrap();
    let activity = ActivityCodeTable::bundled()
        .unwrap()
        .lookup("6201-5/01")
        .map(|c| c.activity)
        .unwrap();
    let profile = FinancialProfile::try_from(totals.to_profile_input(activity)).unwrap();

    assert_eq!(activity, ActivityClassification::Services);
    assert_eq!(profile.trailing12_revenue(), dec!(1200000));

    // 360k / 1.2M = 30%: annex III
    let report = ComparisonEngine::default().diagnose(&profile).unwrap();
    let simplified = &report.regimes[0];
    assert_eq!(simplified.regime_name, RegimeName::Simplified);
    assert_eq!(simplified.effective_rate_pct, dec!(13.03));
}

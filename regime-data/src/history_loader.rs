//! Loads monthly company figures from CSV into a history repository.
//!
//! ```csv
//! company_id,period,revenue,payroll,expenses
//! acme,2026-03,100000.00,28000.00,45000.00
//! ```
//!
//! `period` is `YYYY-MM`.

use std::io::Read;

use chrono::NaiveDate;
use regime_core::history::{HistoryRepository, NewPeriodRecord, RepositoryError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum HistoryLoadError {
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("invalid period '{value}' on row {row} (expected YYYY-MM)")]
    InvalidPeriod { value: String, row: usize },

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryRow {
    pub company_id: String,
    pub period: String,
    pub revenue: Decimal,
    pub payroll: Decimal,
    pub expenses: Decimal,
}

fn parse_period(
    value: &str,
    row: usize,
) -> Result<NaiveDate, HistoryLoadError> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d").map_err(|_| {
        HistoryLoadError::InvalidPeriod {
            value: value.to_string(),
            row,
        }
    })
}

pub struct HistoryLoader;

impl HistoryLoader {
    /// Parses rows into records ready for the repository, in file order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<NewPeriodRecord>, HistoryLoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        reader
            .deserialize::<HistoryRow>()
            .enumerate()
            .map(|(idx, result)| {
                let row = result?;
                Ok(NewPeriodRecord {
                    period: parse_period(&row.period, idx + 1)?,
                    company_id: row.company_id,
                    revenue: row.revenue,
                    payroll: row.payroll,
                    expenses: row.expenses,
                })
            })
            .collect()
    }

    /// Stores every record. A month that is already recorded is replaced,
    /// so loading the same file twice leaves the store unchanged.
    pub async fn load(
        repository: &dyn HistoryRepository,
        records: Vec<NewPeriodRecord>,
    ) -> Result<usize, HistoryLoadError> {
        let mut stored = 0;
        for record in records {
            match repository.record_period(record.clone()).await {
                Ok(_) => {}
                Err(RepositoryError::Conflict { .. }) => {
                    repository.replace_period(record).await?;
                }
                Err(other) => return Err(other.into()),
            }
            stored += 1;
        }
        info!(stored, "history loaded");
        Ok(stored)
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::check_amount;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("no record for company '{company_id}' in {period}")]
    NotFound { company_id: String, period: NaiveDate },

    #[error("company '{company_id}' already has a record for {period}")]
    Conflict { company_id: String, period: NaiveDate },

    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Monthly figures of one company as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    pub company_id: String,
    /// First day of the month the figures belong to.
    pub period: NaiveDate,
    pub revenue: Decimal,
    pub payroll: Decimal,
    pub expenses: Decimal,
    pub recorded_at: DateTime<Utc>,
}

/// For recording a month (no timestamp).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPeriodRecord {
    pub company_id: String,
    pub period: NaiveDate,
    pub revenue: Decimal,
    pub payroll: Decimal,
    pub expenses: Decimal,
}

impl NewPeriodRecord {
    pub fn validate(&self) -> Result<(), RepositoryError> {
        if self.company_id.trim().is_empty() {
            return Err(RepositoryError::InvalidRecord("companyId is empty".to_string()));
        }
        if self.period.day() != 1 {
            return Err(RepositoryError::InvalidRecord(format!(
                "period must be the first day of a month, got {}",
                self.period
            )));
        }
        for (field, value) in [
            ("revenue", self.revenue),
            ("payroll", self.payroll),
            ("expenses", self.expenses),
        ] {
            check_amount(field, value)
                .map_err(|err| RepositoryError::InvalidRecord(err.to_string()))?;
        }
        Ok(())
    }

    pub fn into_record(
        self,
        recorded_at: DateTime<Utc>,
    ) -> PeriodRecord {
        PeriodRecord {
            company_id: self.company_id,
            period: self.period,
            revenue: self.revenue,
            payroll: self.payroll,
            expenses: self.expenses,
            recorded_at,
        }
    }
}

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Stores a new month; `Conflict` if the month is already recorded.
    async fn record_period(
        &self,
        record: NewPeriodRecord,
    ) -> Result<PeriodRecord, RepositoryError>;

    /// Overwrites an existing month; `NotFound` if there is none.
    async fn replace_period(
        &self,
        record: NewPeriodRecord,
    ) -> Result<PeriodRecord, RepositoryError>;

    async fn get_period(
        &self,
        company_id: &str,
        period: NaiveDate,
    ) -> Result<PeriodRecord, RepositoryError>;

    /// All months of a company, oldest first.
    async fn list_periods(
        &self,
        company_id: &str,
    ) -> Result<Vec<PeriodRecord>, RepositoryError>;

    async fn delete_period(
        &self,
        company_id: &str,
        period: NaiveDate,
    ) -> Result<(), RepositoryError>;
}

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::repository::{HistoryRepository, NewPeriodRecord, PeriodRecord, RepositoryError};

type Key = (String, NaiveDate);

/// Process-local history store. Keys sort by company, then month, so a
/// company's records come out oldest first.
#[derive(Debug, Default)]
pub struct InMemoryHistoryRepository {
    records: RwLock<BTreeMap<Key, PeriodRecord>>,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(
    company_id: &str,
    period: NaiveDate,
) -> RepositoryError {
    RepositoryError::NotFound {
        company_id: company_id.to_string(),
        period,
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn record_period(
        &self,
        record: NewPeriodRecord,
    ) -> Result<PeriodRecord, RepositoryError> {
        record.validate()?;
        let key = (record.company_id.clone(), record.period);

        let mut records = self.records.write().await;
        if records.contains_key(&key) {
            return Err(RepositoryError::Conflict {
                company_id: key.0,
                period: key.1,
            });
        }
        let stored = record.into_record(Utc::now());
        debug!(company_id = %stored.company_id, period = %stored.period, "period recorded");
        records.insert(key, stored.clone());
        Ok(stored)
    }

    async fn replace_period(
        &self,
        record: NewPeriodRecord,
    ) -> Result<PeriodRecord, RepositoryError> {
        record.validate()?;
        let key = (record.company_id.clone(), record.period);

        let mut records = self.records.write().await;
        let Some(slot) = records.get_mut(&key) else {
            return Err(not_found(&key.0, key.1));
        };
        *slot = record.into_record(Utc::now());
        Ok(slot.clone())
    }

    async fn get_period(
        &self,
        company_id: &str,
        period: NaiveDate,
    ) -> Result<PeriodRecord, RepositoryError> {
        self.records
            .read()
            .await
            .get(&(company_id.to_string(), period))
            .cloned()
            .ok_or_else(|| not_found(company_id, period))
    }

    async fn list_periods(
        &self,
        company_id: &str,
    ) -> Result<Vec<PeriodRecord>, RepositoryError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn delete_period(
        &self,
        company_id: &str,
        period: NaiveDate,
    ) -> Result<(), RepositoryError> {
        self.records
            .write()
            .await
            .remove(&(company_id.to_string(), period))
            .map(|_| ())
            .ok_or_else(|| not_found(company_id, period))
    }
}

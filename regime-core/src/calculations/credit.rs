//! Non-cumulative PIS/COFINS credits from categorised expenses.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::calculations::common::{check_amount, percent_of, serialize_money};
use crate::{CreditCategory, RegimeError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCredit {
    pub category: CreditCategory,
    pub name: &'static str,
    #[serde(serialize_with = "serialize_money")]
    pub amount: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub pis_credit: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub cofins_credit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSummary {
    pub per_category: Vec<CategoryCredit>,
    #[serde(serialize_with = "serialize_money")]
    pub total_pis: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub total_cofins: Decimal,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CreditEngine;

impl CreditEngine {
    /// Credits generated by each expense category, in category order.
    ///
    /// # Errors
    ///
    /// [`RegimeError::InvalidInput`] for a negative amount, or when no
    /// category has a positive amount.
    pub fn credits_for(
        &self,
        expenses: &BTreeMap<CreditCategory, Decimal>,
    ) -> Result<CreditSummary, RegimeError> {
        for (category, &amount) in expenses {
            check_amount(&format!("{} expense", category.name()), amount)?;
        }
        if expenses.values().all(|a| a.is_zero()) {
            return Err(RegimeError::invalid("must supply at least one expense"));
        }

        let per_category: Vec<CategoryCredit> = expenses
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(&category, &amount)| {
                let rates = category.rates();
                CategoryCredit {
                    category,
                    name: rates.name,
                    amount,
                    pis_credit: percent_of(amount, rates.pis_rate_pct),
                    cofins_credit: percent_of(amount, rates.cofins_rate_pct),
                }
            })
            .collect();

        let total_pis = per_category.iter().map(|c| c.pis_credit).sum();
        let total_cofins = per_category.iter().map(|c| c.cofins_credit).sum();
        debug!(
            categories = per_category.len(),
            total_pis = %total_pis,
            total_cofins = %total_cofins,
            "category credits computed"
        );

        Ok(CreditSummary {
            per_category,
            total_pis,
            total_cofins,
        })
    }
}

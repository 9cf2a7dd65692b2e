//! Payroll ratio ("Fator R") classification.
//!
//! For service activities under Fator R, the simplified-regime annex depends
//! on trailing-twelve-month payroll divided by trailing-twelve-month revenue.
//! The boundary is inclusive on the low-rate side:
//!
//! | ratio      | table | annex |
//! |------------|-------|-------|
//! | `>= 28%`   | A     | III   |
//! | `< 28%`    | B     | V     |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use regime_core::calculations::{PayrollRatioClassifier, PayrollTable};
//!
//! let classifier = PayrollRatioClassifier::default();
//! let ratio = classifier.classify(dec!(28000), dec!(100000)).unwrap();
//!
//! assert_eq!(ratio.selected_table, PayrollTable::A);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{
    check_amount, check_revenue, format_pct, percent_of, ratio_pct, serialize_money,
};
use crate::{AnnexId, RegimeError};

/// Ratio checkpoints used for payroll guidance.
pub const SCENARIO_CHECKPOINTS_PCT: [u32; 5] = [20, 24, 28, 32, 36];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayrollTable {
    /// Lower rates (annex III).
    A,
    /// Higher rates (annex V).
    B,
}

impl PayrollTable {
    pub fn annex(&self) -> AnnexId {
        match self {
            Self::A => AnnexId::III,
            Self::B => AnnexId::V,
        }
    }
}

/// Request shape of the payroll-ratio operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRatioInput {
    pub trailing12_payroll: Decimal,
    pub trailing12_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRatio {
    pub ratio_pct: Decimal,
    pub ratio_formatted: String,
    pub selected_table: PayrollTable,
    /// Payroll that would put the ratio exactly on the threshold.
    #[serde(serialize_with = "serialize_money")]
    pub required_payroll_for_threshold: Decimal,
}

/// One guidance row: payroll needed to reach a given ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollScenario {
    pub ratio_pct: Decimal,
    pub ratio_formatted: String,
    #[serde(serialize_with = "serialize_money")]
    pub required_payroll: Decimal,
    /// Signed difference from the current payroll.
    #[serde(serialize_with = "serialize_money")]
    pub delta_from_current: Decimal,
    pub table: PayrollTable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollRatioClassifier {
    threshold_pct: Decimal,
}

impl Default for PayrollRatioClassifier {
    fn default() -> Self {
        Self::new(Decimal::from(28))
    }
}

impl PayrollRatioClassifier {
    pub fn new(threshold_pct: Decimal) -> Self {
        Self { threshold_pct }
    }

    pub fn threshold_pct(&self) -> Decimal {
        self.threshold_pct
    }

    /// The single decision point: `ratio >= threshold` selects table A.
    pub fn select_table(
        &self,
        ratio_pct: Decimal,
    ) -> PayrollTable {
        if ratio_pct >= self.threshold_pct {
            PayrollTable::A
        } else {
            PayrollTable::B
        }
    }

    /// Computes the payroll ratio and the table it selects.
    ///
    /// # Errors
    ///
    /// [`RegimeError::InvalidInput`] when revenue is not positive or payroll
    /// is negative.
    pub fn classify(
        &self,
        trailing12_payroll: Decimal,
        trailing12_revenue: Decimal,
    ) -> Result<PayrollRatio, RegimeError> {
        validate(trailing12_payroll, trailing12_revenue)?;

        let ratio_pct = ratio_pct(trailing12_payroll, trailing12_revenue);
        let selected_table = self.select_table(ratio_pct);
        debug!(
            ratio_pct = %ratio_pct,
            threshold_pct = %self.threshold_pct,
            table = ?selected_table,
            "payroll ratio classified"
        );

        Ok(PayrollRatio {
            ratio_pct,
            ratio_formatted: format_pct(ratio_pct),
            selected_table,
            required_payroll_for_threshold: percent_of(trailing12_revenue, self.threshold_pct),
        })
    }

    /// Payroll required to hit each checkpoint ratio, with the signed delta
    /// from `current_payroll`. Guidance only; not used by any calculator.
    ///
    /// # Errors
    ///
    /// Same as [`PayrollRatioClassifier::classify`].
    pub fn scenarios(
        &self,
        trailing12_revenue: Decimal,
        current_payroll: Decimal,
    ) -> Result<Vec<PayrollScenario>, RegimeError> {
        validate(current_payroll, trailing12_revenue)?;

        Ok(SCENARIO_CHECKPOINTS_PCT
            .iter()
            .map(|&checkpoint| {
                let ratio_pct = Decimal::from(checkpoint);
                let required_payroll = percent_of(trailing12_revenue, ratio_pct);
                PayrollScenario {
                    ratio_pct,
                    ratio_formatted: format_pct(ratio_pct),
                    required_payroll,
                    delta_from_current: required_payroll - current_payroll,
                    table: self.select_table(ratio_pct),
                }
            })
            .collect())
    }
}

fn validate(
    payroll: Decimal,
    revenue: Decimal,
) -> Result<(), RegimeError> {
    check_revenue("trailing12Revenue", revenue)?;
    check_amount("trailing12Payroll", payroll)?;
    Ok(())
}

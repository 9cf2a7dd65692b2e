//! Progressive-bracket effective rate of the simplified regime.
//!
//! The nominal rate of the selected row is applied to the whole trailing
//! revenue and the row's deduction parcel is subtracted, which yields a
//! continuous effective rate without splitting revenue across brackets:
//!
//! ```text
//! effective = ((RBT12 × nominal / 100) − parcel) / RBT12 × 100
//! ```
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use regime_core::calculations::effective_rate;
//! use regime_core::{AnnexId, BracketTable};
//!
//! let table = BracketTable::statutory(AnnexId::I).unwrap();
//! let rate = effective_rate(dec!(200000), &table).unwrap().unwrap();
//!
//! assert_eq!(rate.bracket, 2);
//! assert_eq!(rate.nominal_rate_pct, dec!(7.30));
//! assert_eq!(rate.effective_rate_pct, dec!(4.33));
//! ```

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculations::common::{percent_of, ratio_pct, serialize_money};
use crate::{BracketTable, RegimeError};

/// Rate information for the row a revenue falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketRate {
    /// 1-based position of the row in its table.
    pub bracket: usize,
    pub nominal_rate_pct: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub deduction_parcel: Decimal,
    pub effective_rate_pct: Decimal,
}

/// Looks up the row for `revenue12` and computes the effective rate.
///
/// Returns `Ok(None)` when the revenue is above the table's legal cap; the
/// caller decides what inapplicability means for it. There is no fallback to
/// the last row.
///
/// # Errors
///
/// [`RegimeError::ComputationPrecondition`] when `revenue12` is not
/// positive. Callers validate revenue before getting here.
pub fn effective_rate(
    revenue12: Decimal,
    table: &BracketTable,
) -> Result<Option<BracketRate>, RegimeError> {
    if revenue12 <= Decimal::ZERO {
        return Err(RegimeError::ComputationPrecondition(format!(
            "effective rate requires positive revenue, got {revenue12}"
        )));
    }

    let Some((index, row)) = table
        .rows()
        .iter()
        .enumerate()
        .find(|(_, row)| row.ceiling >= revenue12)
    else {
        return Ok(None);
    };

    let gross = percent_of(revenue12, row.nominal_rate_pct) - row.deduction_parcel;
    let effective_rate_pct = ratio_pct(gross, revenue12).max(Decimal::ZERO);

    Ok(Some(BracketRate {
        bracket: index + 1,
        nominal_rate_pct: row.nominal_rate_pct,
        deduction_parcel: row.deduction_parcel,
        effective_rate_pct,
    }))
}

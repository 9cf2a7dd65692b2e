//! CSV loader for batches of financial profiles.
//!
//! ## CSV Format
//!
//! Column order does not matter; headers are matched by name.
//!
//! | Column                   | Required | Type    | Notes                                  |
//! |--------------------------|----------|---------|----------------------------------------|
//! | `company_id`             | yes      | string  |                                        |
//! | `trailing12_revenue`     | yes      | decimal | must be positive                       |
//! | `activity`               | yes      | string  | activity tag or Portuguese alias       |
//! | `current_month_revenue`  | no       | decimal | defaults to a twelfth of the revenue   |
//! | `trailing12_payroll`     | no       | decimal | required by Fator R activities         |
//! | `current_expenses`       | no       | decimal | per period                             |
//! | `period_kind`            | no       | string  | `monthly`, `quarterly` or `annual`     |
//! | `pis_credit`             | no       | decimal | per period                             |
//! | `cofins_credit`          | no       | decimal | per period                             |
//! | `municipal_tax_rate_pct` | no       | decimal | 0 to 5                                 |
//!
//! ### Minimal example
//!
//! ```csv
//! company_id,trailing12_revenue,activity
//! acme,1200000.00,commerce
//! ```

use std::path::Path;

use regime_core::{ActivityClassification, FinancialProfile, PeriodKind, ProfileInput, RegimeError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize)]
struct CsvRow {
    company_id: String,
    trailing12_revenue: Decimal,
    activity: String,
    current_month_revenue: Option<Decimal>,
    trailing12_payroll: Option<Decimal>,
    current_expenses: Option<Decimal>,
    period_kind: Option<String>,
    pis_credit: Option<Decimal>,
    cofins_credit: Option<Decimal>,
    municipal_tax_rate_pct: Option<Decimal>,
}

#[derive(Debug, Error)]
pub enum ProfileLoadError {
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The row is well-formed CSV but not a valid profile. `row` is 1-based,
    /// header excluded.
    #[error("row {row}: {source}")]
    InvalidProfile {
        row: usize,
        #[source]
        source: RegimeError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedProfile {
    pub company_id: String,
    pub profile: FinancialProfile,
}

fn convert_row(row: CsvRow) -> Result<LoadedProfile, RegimeError> {
    let activity: ActivityClassification = row.activity.parse()?;
    let period_kind = row
        .period_kind
        .filter(|p| !p.trim().is_empty())
        .map(|p| p.parse::<PeriodKind>())
        .transpose()?;

    let mut input = ProfileInput::new(row.trailing12_revenue, activity);
    input.current_month_revenue = row.current_month_revenue;
    input.trailing12_payroll = row.trailing12_payroll;
    input.current_expenses = row.current_expenses;
    input.period_kind = period_kind;
    input.pis_credit = row.pis_credit;
    input.cofins_credit = row.cofins_credit;
    input.municipal_tax_rate_pct = row.municipal_tax_rate_pct;

    Ok(LoadedProfile {
        company_id: row.company_id,
        profile: FinancialProfile::try_from(input)?,
    })
}

/// Parses CSV text into validated profiles, in file order.
///
/// # Errors
///
/// * [`ProfileLoadError::Parse`] when the CSV is structurally invalid or a
///   required field cannot be deserialised.
/// * [`ProfileLoadError::InvalidProfile`] when a row fails profile validation.
pub fn load_from_str(input: &str) -> Result<Vec<LoadedProfile>, ProfileLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row).map_err(|source| ProfileLoadError::InvalidProfile {
                row: idx + 1,
                source,
            })
        })
        .collect()
}

/// Reads a file from disk and delegates to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<LoadedProfile>, ProfileLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ProfileLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&contents)
}

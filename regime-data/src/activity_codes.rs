//! CNAE activity-code lookup table.
//!
//! ## CSV Format
//!
//! | Column        | Required | Notes                                          |
//! |---------------|----------|------------------------------------------------|
//! | `code`        | yes      | `NNNN-N/NN`, e.g. `6201-5/01`                  |
//! | `description` | yes      | free text                                      |
//! | `activity`    | yes      | an activity tag, e.g. `services`, `commerce`   |
//!
//! A copy of the table ships with the crate, see [`ActivityCodeTable::bundled`].

use std::collections::BTreeMap;
use std::io::Read;

use regex::Regex;
use regime_core::ActivityClassification;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const BUNDLED_CSV: &str = include_str!("../data/activity_codes.csv");
const CODE_PATTERN: &str = r"^\d{4}-\d/\d{2}$";

#[derive(Debug, Error)]
pub enum ActivityCodeLoaderError {
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("code pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("malformed activity code '{code}' on row {row}")]
    InvalidCode { code: String, row: usize },

    #[error("unknown activity '{value}' on row {row}")]
    UnknownActivity { value: String, row: usize },

    #[error("duplicate activity code '{code}' on row {row}")]
    DuplicateCode { code: String, row: usize },
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    code: String,
    description: String,
    activity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCode {
    pub code: String,
    pub description: String,
    pub activity: ActivityClassification,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityCodeTable {
    entries: BTreeMap<String, ActivityCode>,
}

/// Accepts `6201-5/01` as well as the bare digits `6201501`.
fn normalize(code: &str) -> String {
    let code = code.trim();
    let digits: String = code.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 7 && digits.len() == code.len() {
        format!("{}-{}/{}", &digits[..4], &digits[4..5], &digits[5..])
    } else {
        code.to_string()
    }
}

impl ActivityCodeTable {
    /// Parses a CSV table. Rows are numbered from 1, header excluded.
    ///
    /// # Errors
    ///
    /// [`ActivityCodeLoaderError`] for structural CSV errors, malformed or
    /// duplicate codes, and unknown activity tags.
    pub fn parse<R: Read>(reader: R) -> Result<Self, ActivityCodeLoaderError> {
        let pattern = Regex::new(CODE_PATTERN)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = BTreeMap::new();
        for (idx, result) in reader.deserialize::<CsvRow>().enumerate() {
            let row = result?;
            let row_number = idx + 1;

            let code = normalize(&row.code);
            if !pattern.is_match(&code) {
                return Err(ActivityCodeLoaderError::InvalidCode {
                    code: row.code,
                    row: row_number,
                });
            }
            let activity = ActivityClassification::parse(&row.activity).ok_or_else(|| {
                ActivityCodeLoaderError::UnknownActivity {
                    value: row.activity.clone(),
                    row: row_number,
                }
            })?;
            if entries.contains_key(&code) {
                return Err(ActivityCodeLoaderError::DuplicateCode {
                    code,
                    row: row_number,
                });
            }

            entries.insert(
                code.clone(),
                ActivityCode {
                    code,
                    description: row.description,
                    activity,
                },
            );
        }

        debug!(codes = entries.len(), "activity code table loaded");
        Ok(Self { entries })
    }

    /// The table shipped with the crate.
    pub fn bundled() -> Result<Self, ActivityCodeLoaderError> {
        Self::parse(BUNDLED_CSV.as_bytes())
    }

    pub fn lookup(
        &self,
        code: &str,
    ) -> Option<&ActivityCode> {
        self.entries.get(&normalize(code))
    }

    /// Codes mapped to `activity`, in code order.
    pub fn codes_for(
        &self,
        activity: ActivityClassification,
    ) -> impl Iterator<Item = &ActivityCode> {
        self.entries.values().filter(move |c| c.activity == activity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SMALL_CSV: &str = "\
code,description,activity
6201-5/01,Desenvolvimento de software,services
4711-3/02,Minimercados,comercio
";

    #[test]
    fn parses_rows_and_aliases() {
        let table = ActivityCodeTable::parse(SMALL_CSV.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.lookup("4711-3/02").map(|c| c.activity),
            Some(ActivityClassification::Commerce)
        );
    }

    #[test]
    fn lookup_accepts_bare_digits() {
        let table = ActivityCodeTable::parse(SMALL_CSV.as_bytes()).unwrap();

        assert_eq!(
            table.lookup("6201501").map(|c| c.code.as_str()),
            Some("6201-5/01")
        );
        assert!(table.lookup("9999999").is_none());
    }

    #[test]
    fn malformed_code_reports_row() {
        let csv = "code,description,activity\n6201-5/01,ok,services\n62.01,bad,services\n";

        let err = ActivityCodeTable::parse(csv.as_bytes()).unwrap_err();

        assert!(matches!(
            err,
            ActivityCodeLoaderError::InvalidCode { ref code, row: 2 } if code == "62.01"
        ));
    }

    #[test]
    fn unknown_activity_is_rejected() {
        let csv = "code,description,activity\n0111-3/01,Cultivo de arroz,agriculture\n";

        let err = ActivityCodeTable::parse(csv.as_bytes()).unwrap_err();

        assert_eq!(err.to_string(), "unknown activity 'agriculture' on row 1");
    }

    #[test]
    fn duplicate_code_is_rejected() {
        let csv = "code,description,activity\n6201-5/01,a,services\n6201501,b,services\n";

        let err = ActivityCodeTable::parse(csv.as_bytes()).unwrap_err();

        assert!(matches!(err, ActivityCodeLoaderError::DuplicateCode { row: 2, .. }));
    }

    #[test]
    fn bundled_table_covers_every_activity() {
        let table = ActivityCodeTable::bundled().unwrap();

        for activity in ActivityClassification::ALL {
            assert!(table.codes_for(activity).next().is_some(), "{activity}");
        }
    }
}

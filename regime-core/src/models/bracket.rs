use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::RegimeError;

/// Simplified-regime annex tables (2018 onward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnexId {
    I,
    II,
    III,
    IV,
    V,
}

impl AnnexId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I => "I",
            Self::II => "II",
            Self::III => "III",
            Self::IV => "IV",
            Self::V => "V",
        }
    }
}

impl fmt::Display for AnnexId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "annex {}", self.as_str())
    }
}

/// One row of a bracket table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketRow {
    /// Upper bound (inclusive) of trailing-twelve-month revenue for this row.
    pub ceiling: Decimal,
    pub nominal_rate_pct: Decimal,
    pub deduction_parcel: Decimal,
}

// (ceiling, nominal rate in hundredths of a percent, deduction parcel)
type StaticRow = (i64, i64, i64);

const ANNEX_I: [StaticRow; 6] = [
    (180_000, 400, 0),
    (360_000, 730, 5_940),
    (720_000, 950, 13_860),
    (1_800_000, 1070, 22_500),
    (3_600_000, 1430, 87_300),
    (4_800_000, 1900, 378_000),
];

const ANNEX_II: [StaticRow; 6] = [
    (180_000, 450, 0),
    (360_000, 780, 5_940),
    (720_000, 1000, 13_860),
    (1_800_000, 1120, 22_500),
    (3_600_000, 1470, 85_500),
    (4_800_000, 3000, 720_000),
];

const ANNEX_III: [StaticRow; 6] = [
    (180_000, 600, 0),
    (360_000, 1120, 9_360),
    (720_000, 1350, 17_640),
    (1_800_000, 1600, 35_640),
    (3_600_000, 2100, 125_640),
    (4_800_000, 3300, 648_000),
];

const ANNEX_IV: [StaticRow; 6] = [
    (180_000, 450, 0),
    (360_000, 900, 8_100),
    (720_000, 1020, 12_420),
    (1_800_000, 1400, 39_780),
    (3_600_000, 2200, 183_780),
    (4_800_000, 3300, 828_000),
];

const ANNEX_V: [StaticRow; 6] = [
    (180_000, 1550, 0),
    (360_000, 1800, 4_500),
    (720_000, 1950, 9_900),
    (1_800_000, 2050, 17_100),
    (3_600_000, 2300, 62_100),
    (4_800_000, 3050, 540_000),
];

/// An ordered, validated bracket table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketTable {
    annex: AnnexId,
    rows: Vec<BracketRow>,
}

impl BracketTable {
    /// Builds a table, checking that ceilings strictly increase and that
    /// rates and parcels are non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`RegimeError::ComputationPrecondition`] when the rows break
    /// any of those invariants.
    pub fn new(
        annex: AnnexId,
        rows: Vec<BracketRow>,
    ) -> Result<Self, RegimeError> {
        if rows.is_empty() {
            return Err(RegimeError::ComputationPrecondition(format!(
                "{annex} has no rows"
            )));
        }
        for pair in rows.windows(2) {
            if pair[1].ceiling <= pair[0].ceiling {
                return Err(RegimeError::ComputationPrecondition(format!(
                    "{annex} ceilings must strictly increase ({} then {})",
                    pair[0].ceiling, pair[1].ceiling
                )));
            }
        }
        if let Some(row) = rows
            .iter()
            .find(|r| r.nominal_rate_pct < Decimal::ZERO || r.deduction_parcel < Decimal::ZERO)
        {
            return Err(RegimeError::ComputationPrecondition(format!(
                "{annex} row with ceiling {} has a negative rate or parcel",
                row.ceiling
            )));
        }
        Ok(Self { annex, rows })
    }

    /// The statutory table for `annex`.
    pub fn statutory(annex: AnnexId) -> Result<Self, RegimeError> {
        let rows = match annex {
            AnnexId::I => &ANNEX_I,
            AnnexId::II => &ANNEX_II,
            AnnexId::III => &ANNEX_III,
            AnnexId::IV => &ANNEX_IV,
            AnnexId::V => &ANNEX_V,
        };
        let rows = rows
            .iter()
            .map(|&(ceiling, rate, parcel)| BracketRow {
                ceiling: Decimal::from(ceiling),
                nominal_rate_pct: Decimal::new(rate, 2),
                deduction_parcel: Decimal::from(parcel),
            })
            .collect();
        Self::new(annex, rows)
    }

    pub fn annex(&self) -> AnnexId {
        self.annex
    }

    pub fn rows(&self) -> &[BracketRow] {
        &self.rows
    }

    /// The legal revenue cap of the table (ceiling of its last row).
    pub fn cap(&self) -> Decimal {
        self.rows
            .last()
            .map(|r| r.ceiling)
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const ALL_ANNEXES: [AnnexId; 5] = [
        AnnexId::I,
        AnnexId::II,
        AnnexId::III,
        AnnexId::IV,
        AnnexId::V,
    ];

    #[test]
    fn statutory_tables_are_valid_and_capped_at_national_ceiling() {
        for annex in ALL_ANNEXES {
            let table = BracketTable::statutory(annex).expect("statutory table must validate");

            assert_eq!(table.rows().len(), 6);
            assert_eq!(table.cap(), dec!(4800000));
        }
    }

    #[test]
    fn statutory_annex_i_first_row() {
        let table = BracketTable::statutory(AnnexId::I).unwrap();

        assert_eq!(
            table.rows()[0],
            BracketRow {
                ceiling: dec!(180000),
                nominal_rate_pct: dec!(4.00),
                deduction_parcel: dec!(0),
            }
        );
    }

    #[test]
    fn new_rejects_non_increasing_ceilings() {
        let rows = vec![
            BracketRow {
                ceiling: dec!(360000),
                nominal_rate_pct: dec!(4),
                deduction_parcel: dec!(0),
            },
            BracketRow {
                ceiling: dec!(360000),
                nominal_rate_pct: dec!(7.3),
                deduction_parcel: dec!(5940),
            },
        ];

        let result = BracketTable::new(AnnexId::I, rows);

        assert!(matches!(result, Err(RegimeError::ComputationPrecondition(_))));
    }

    #[test]
    fn new_rejects_empty_table() {
        let result = BracketTable::new(AnnexId::III, vec![]);

        assert_eq!(
            result,
            Err(RegimeError::ComputationPrecondition(
                "annex III has no rows".to_string()
            ))
        );
    }

    #[test]
    fn new_rejects_negative_parcel() {
        let rows = vec![BracketRow {
            ceiling: dec!(180000),
            nominal_rate_pct: dec!(4),
            deduction_parcel: dec!(-1),
        }];

        let result = BracketTable::new(AnnexId::I, rows);

        assert!(matches!(result, Err(RegimeError::ComputationPrecondition(_))));
    }
}

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::RegimeError;

/// Length of the assessment period a set of amounts refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PeriodKind {
    #[default]
    Monthly,
    Quarterly,
    Annual,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "mensal" => Some(Self::Monthly),
            "quarterly" | "trimestral" => Some(Self::Quarterly),
            "annual" | "anual" => Some(Self::Annual),
            _ => None,
        }
    }

    /// Number of months covered by one period.
    pub fn months(&self) -> Decimal {
        match self {
            Self::Monthly => Decimal::ONE,
            Self::Quarterly => Decimal::from(3),
            Self::Annual => Decimal::from(12),
        }
    }

    /// Number of periods in a year.
    pub fn per_year(&self) -> Decimal {
        match self {
            Self::Monthly => Decimal::from(12),
            Self::Quarterly => Decimal::from(4),
            Self::Annual => Decimal::ONE,
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKind {
    type Err = RegimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| RegimeError::invalid(format!("malformed period '{s}'")))
    }
}

impl TryFrom<String> for PeriodKind {
    type Error = RegimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

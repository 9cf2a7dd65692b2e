use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Expense categories that generate non-cumulative PIS/COFINS credit.
///
/// The rates are fixed by law and not user-editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CreditCategory {
    GoodsForResale,
    RawMaterials,
    Packaging,
    Electricity,
    Rent,
    EquipmentDepreciation,
    Freight,
    Fuel,
}

/// Credit rates attached to a [`CreditCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCategoryRates {
    pub name: &'static str,
    pub pis_rate_pct: Decimal,
    pub cofins_rate_pct: Decimal,
}

impl CreditCategory {
    pub const ALL: [CreditCategory; 8] = [
        Self::GoodsForResale,
        Self::RawMaterials,
        Self::Packaging,
        Self::Electricity,
        Self::Rent,
        Self::EquipmentDepreciation,
        Self::Freight,
        Self::Fuel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::GoodsForResale => "goods for resale",
            Self::RawMaterials => "raw materials",
            Self::Packaging => "packaging",
            Self::Electricity => "electricity",
            Self::Rent => "rent",
            Self::EquipmentDepreciation => "equipment depreciation",
            Self::Freight => "freight",
            Self::Fuel => "fuel and lubricants",
        }
    }

    /// Every category credits at the standard non-cumulative rates
    /// (1.65% PIS, 7.6% COFINS).
    pub fn rates(&self) -> CreditCategoryRates {
        CreditCategoryRates {
            name: self.name(),
            pis_rate_pct: Decimal::new(165, 2),
            cofins_rate_pct: Decimal::new(760, 2),
        }
    }
}

impl fmt::Display for CreditCategory {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use crate::calculations::common::{clamp_rate_pct, format_pct, ratio_pct, serialize_money, to_money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegimeName {
    Simplified,
    PresumedProfit,
    ActualProfit,
}

impl RegimeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simplified => "simplified",
            Self::PresumedProfit => "presumed-profit",
            Self::ActualProfit => "actual-profit",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Simplified => "Simples Nacional",
            Self::PresumedProfit => "Lucro Presumido",
            Self::ActualProfit => "Lucro Real",
        }
    }
}

impl fmt::Display for RegimeName {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Individual taxes that make up a regime's liability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxKind {
    /// Unified simplified-regime payment (DAS).
    SimplifiedDas,
    /// Corporate income tax, base portion.
    Irpj,
    /// Corporate income tax surtax above the period threshold.
    IrpjSurtax,
    /// Social contribution on net profit.
    Csll,
    Pis,
    Cofins,
    /// Municipal service tax.
    Iss,
}

pub type Breakdown = BTreeMap<TaxKind, Decimal>;

fn serialize_breakdown<S>(
    breakdown: &Breakdown,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(breakdown.len()))?;
    for (kind, amount) in breakdown {
        map.serialize_entry(kind, &to_money(*amount))?;
    }
    map.end()
}

/// Outcome of one regime for one (projected) profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegimeResult {
    pub regime_name: RegimeName,
    #[serde(serialize_with = "serialize_money")]
    pub total_tax: Decimal,
    pub effective_rate_pct: Decimal,
    pub effective_rate_formatted: String,
    #[serde(serialize_with = "serialize_breakdown")]
    pub breakdown: Breakdown,
    pub applicable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inapplicability_reason: Option<String>,
    /// Taxable profit was zero or negative (actual-profit regime only).
    pub loss: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl RegimeResult {
    /// An applicable result whose total is the sum of `breakdown`.
    ///
    /// The effective rate is computed against `revenue` and clamped to `[0, 100)`.
    pub fn applicable(
        regime_name: RegimeName,
        revenue: Decimal,
        breakdown: Breakdown,
    ) -> Self {
        let total_tax = breakdown
            .values()
            .copied()
            .sum::<Decimal>()
            .max(Decimal::ZERO);
        let effective_rate_pct = clamp_rate_pct(ratio_pct(total_tax, revenue));
        Self {
            regime_name,
            total_tax,
            effective_rate_pct,
            effective_rate_formatted: format_pct(effective_rate_pct),
            breakdown,
            applicable: true,
            inapplicability_reason: None,
            loss: false,
            notes: Vec::new(),
        }
    }

    /// A result for a regime the business cannot opt into.
    pub fn inapplicable(
        regime_name: RegimeName,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            regime_name,
            total_tax: Decimal::ZERO,
            effective_rate_pct: Decimal::ZERO,
            effective_rate_formatted: format_pct(Decimal::ZERO),
            breakdown: Breakdown::new(),
            applicable: false,
            inapplicability_reason: Some(reason.into()),
            loss: false,
            notes: Vec::new(),
        }
    }

    pub fn with_loss(
        mut self,
        loss: bool,
    ) -> Self {
        self.loss = loss;
        self
    }

    pub fn with_notes(
        mut self,
        notes: Vec<String>,
    ) -> Self {
        self.notes = notes;
        self
    }

    pub fn tax_of(
        &self,
        kind: TaxKind,
    ) -> Decimal {
        self.breakdown.get(&kind).copied().unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn applicable_sums_breakdown_and_rates_against_revenue() {
        let breakdown = Breakdown::from([(TaxKind::Pis, dec!(650)), (TaxKind::Cofins, dec!(3000))]);

        let result = RegimeResult::applicable(RegimeName::PresumedProfit, dec!(100000), breakdown);

        assert_eq!(result.total_tax, dec!(3650));
        assert_eq!(result.effective_rate_pct, dec!(3.65));
        assert_eq!(result.effective_rate_formatted, "3.65%");
        assert!(result.applicable);
    }

    #[test]
    fn inapplicable_carries_reason_and_zero_tax() {
        let result =
            RegimeResult::inapplicable(RegimeName::Simplified, "revenue exceeds regime ceiling");

        assert!(!result.applicable);
        assert_eq!(result.total_tax, dec!(0));
        assert_eq!(
            result.inapplicability_reason.as_deref(),
            Some("revenue exceeds regime ceiling")
        );
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let breakdown = Breakdown::from([(TaxKind::SimplifiedDas, dec!(8660))]);
        let result = RegimeResult::applicable(RegimeName::Simplified, dec!(200000), breakdown);

        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["regimeName"], "simplified");
        assert_eq!(json["totalTax"], "8660.00");
        assert_eq!(json["effectiveRateFormatted"], "4.33%");
        assert_eq!(json["breakdown"]["simplified-das"], "8660.00");
        assert_eq!(json["applicable"], true);
        assert!(json.get("inapplicabilityReason").is_none());
    }
}

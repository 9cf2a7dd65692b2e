//! Consumption taxes (PIS, COFINS) and the municipal service tax (ISS).

use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculations::common::{format_pct, percent_of, serialize_money};
use crate::config::MunicipalTaxPolicy;
use crate::{ActivityClassification, TaxKind};

/// One consumption tax line: debit on revenue, credit, and what is payable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionTax {
    pub kind: TaxKind,
    pub rate_pct: Decimal,
    pub rate_formatted: String,
    #[serde(serialize_with = "serialize_money")]
    pub debit: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub credit: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub payable: Decimal,
}

impl ConsumptionTax {
    /// Cumulative tax: no credits.
    pub fn cumulative(
        kind: TaxKind,
        revenue: Decimal,
        rate_pct: Decimal,
    ) -> Self {
        Self::non_cumulative(kind, revenue, rate_pct, Decimal::ZERO)
    }

    /// Non-cumulative tax: the payable amount is the debit minus the credit,
    /// never negative.
    pub fn non_cumulative(
        kind: TaxKind,
        revenue: Decimal,
        rate_pct: Decimal,
        credit: Decimal,
    ) -> Self {
        let debit = percent_of(revenue, rate_pct);
        Self {
            kind,
            rate_pct,
            rate_formatted: format_pct(rate_pct),
            debit,
            credit,
            payable: (debit - credit).max(Decimal::ZERO),
        }
    }

    /// Credit that exceeds the debit. It is discarded, not carried forward.
    pub fn excess_credit(&self) -> Decimal {
        (self.credit - self.debit).max(Decimal::ZERO)
    }
}

/// Municipal service tax for one period, with a note when it is reported as
/// zero.
pub(crate) fn municipal_tax(
    policy: MunicipalTaxPolicy,
    activity: ActivityClassification,
    revenue: Decimal,
    rate_pct: Option<Decimal>,
) -> (Decimal, Option<String>) {
    if !activity.is_service() {
        return (Decimal::ZERO, None);
    }
    if policy == MunicipalTaxPolicy::Excluded {
        return (
            Decimal::ZERO,
            Some("municipal service tax excluded from the comparison".to_string()),
        );
    }
    match rate_pct {
        Some(rate) if rate > Decimal::ZERO => (percent_of(revenue, rate), None),
        _ => (
            Decimal::ZERO,
            Some("municipal service tax rate not supplied; ISS reported as 0".to_string()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn payable_never_goes_negative() {
        let tax = ConsumptionTax::non_cumulative(TaxKind::Pis, dec!(1000), dec!(1.65), dec!(50));

        assert_eq!(tax.debit, dec!(16.5));
        assert_eq!(tax.payable, dec!(0));
        assert_eq!(tax.excess_credit(), dec!(33.5));
    }

    #[test]
    fn rate_serialises_with_formatted_sibling() {
        let tax = ConsumptionTax::cumulative(TaxKind::Cofins, dec!(1000), dec!(3));

        let json = serde_json::to_value(&tax).unwrap();

        assert_eq!(json["ratePct"], "3");
        assert_eq!(json["rateFormatted"], "3.00%");
        assert_eq!(json["payable"], "30.00");
    }

    #[test]
    fn municipal_tax_only_for_services() {
        let (commerce, note) = municipal_tax(
            MunicipalTaxPolicy::Included,
            ActivityClassification::Commerce,
            dec!(10000),
            Some(dec!(5)),
        );
        assert_eq!(commerce, dec!(0));
        assert_eq!(note, None);

        let (services, _) = municipal_tax(
            MunicipalTaxPolicy::Included,
            ActivityClassification::Services,
            dec!(10000),
            Some(dec!(5)),
        );
        assert_eq!(services, dec!(500));
    }

    #[test]
    fn missing_rate_reports_zero_with_note() {
        let (amount, note) = municipal_tax(
            MunicipalTaxPolicy::Included,
            ActivityClassification::Services,
            dec!(10000),
            Some(dec!(0)),
        );

        assert_eq!(amount, dec!(0));
        assert!(note.unwrap().contains("ISS reported as 0"));
    }

    #[test]
    fn excluded_policy_zeroes_the_tax() {
        let (amount, note) = municipal_tax(
            MunicipalTaxPolicy::Excluded,
            ActivityClassification::Services,
            dec!(10000),
            Some(dec!(3)),
        );

        assert_eq!(amount, dec!(0));
        assert!(note.is_some());
    }
}

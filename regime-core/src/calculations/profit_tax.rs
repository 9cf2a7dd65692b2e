//! Profit tax (IRPJ) with its surtax, and the social contribution (CSLL).
//!
//! Both profit-based regimes apply the same pattern; they only differ in
//! how the bases are derived.

use rust_decimal::Decimal;

use crate::PeriodKind;
use crate::calculations::common::percent_of;
use crate::config::ProfitTaxConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfitTaxes {
    pub profit_tax: Decimal,
    pub surtax: Decimal,
    pub social_contribution: Decimal,
}

impl ProfitTaxes {
    pub const ZERO: Self = Self {
        profit_tax: Decimal::ZERO,
        surtax: Decimal::ZERO,
        social_contribution: Decimal::ZERO,
    };

    /// Profit tax including surtax.
    pub fn profit_tax_total(&self) -> Decimal {
        self.profit_tax + self.surtax
    }
}

/// Surtax threshold for one period: the monthly threshold times the months
/// in the period.
pub fn surtax_threshold(
    config: &ProfitTaxConfig,
    period: PeriodKind,
) -> Decimal {
    config.surtax_monthly_threshold * period.months()
}

/// Surtax on the part of `base` above the period threshold; zero at or
/// below it.
pub fn surtax(
    config: &ProfitTaxConfig,
    base: Decimal,
    period: PeriodKind,
) -> Decimal {
    let excess = base - surtax_threshold(config, period);
    if excess <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    percent_of(excess, config.surtax_rate_pct)
}

/// Applies the flat rates and the surtax to the two bases.
///
/// Non-positive bases produce zero taxes.
pub fn profit_taxes(
    config: &ProfitTaxConfig,
    profit_tax_base: Decimal,
    social_contribution_base: Decimal,
    period: PeriodKind,
) -> ProfitTaxes {
    let profit_tax_base = profit_tax_base.max(Decimal::ZERO);
    let social_contribution_base = social_contribution_base.max(Decimal::ZERO);

    ProfitTaxes {
        profit_tax: percent_of(profit_tax_base, config.profit_tax_rate_pct),
        surtax: surtax(config, profit_tax_base, period),
        social_contribution: percent_of(
            social_contribution_base,
            config.social_contribution_rate_pct,
        ),
    }
}

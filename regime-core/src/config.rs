//! Rates, ceilings and policy switches used by the calculators.
//!
//! [`EngineConfig::default`] holds the statutory values. Every struct
//! deserialises with per-field defaults, so a configuration file only has to
//! name what it overrides.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use regime_core::config::{EngineConfig, MunicipalTaxPolicy};
//!
//! let config = EngineConfig::default();
//!
//! assert_eq!(config.simplified.revenue_cap, dec!(4800000));
//! assert_eq!(config.municipal_tax, MunicipalTaxPolicy::Included);
//! assert_eq!(config.validate(), Ok(()));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by [`EngineConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A percentage is outside `[0, 100]`.
    #[error("{field} must be between 0 and 100, got {value}")]
    RateOutOfRange { field: &'static str, value: Decimal },

    /// A ceiling or threshold is not positive.
    #[error("{field} must be positive, got {value}")]
    NonPositiveAmount { field: &'static str, value: Decimal },
}

/// Whether the municipal service tax takes part in the regime comparison.
///
/// The simplified regime already includes it in the unified payment; the
/// other two regimes pay it separately. `Excluded` reports it as zero in both
/// profit regimes so the comparison looks at federal taxes only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MunicipalTaxPolicy {
    #[default]
    Included,
    Excluded,
}

/// Profit tax (IRPJ) and social contribution (CSLL) rates shared by the two
/// profit-based regimes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfitTaxConfig {
    pub profit_tax_rate_pct: Decimal,
    pub surtax_rate_pct: Decimal,
    /// Surtax threshold for one month; multiplied by the months in the period.
    pub surtax_monthly_threshold: Decimal,
    pub social_contribution_rate_pct: Decimal,
}

impl Default for ProfitTaxConfig {
    fn default() -> Self {
        Self {
            profit_tax_rate_pct: Decimal::from(15),
            surtax_rate_pct: Decimal::from(10),
            surtax_monthly_threshold: Decimal::from(20_000),
            social_contribution_rate_pct: Decimal::from(9),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifiedConfig {
    /// National revenue ceiling of the simplified regime.
    pub revenue_cap: Decimal,
    /// Payroll ratio at or above which service activities use annex III.
    pub payroll_ratio_threshold_pct: Decimal,
    /// Share of the ceiling above which a warning recommendation is issued.
    pub ceiling_warning_pct: Decimal,
}

impl Default for SimplifiedConfig {
    fn default() -> Self {
        Self {
            revenue_cap: Decimal::from(4_800_000),
            payroll_ratio_threshold_pct: Decimal::from(28),
            ceiling_warning_pct: Decimal::from(90),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresumedProfitConfig {
    pub profit_tax: ProfitTaxConfig,
    /// Cumulative PIS rate on revenue.
    pub pis_rate_pct: Decimal,
    /// Cumulative COFINS rate on revenue.
    pub cofins_rate_pct: Decimal,
    /// Annual revenue above which the regime cannot be elected.
    pub revenue_cap: Decimal,
}

impl Default for PresumedProfitConfig {
    fn default() -> Self {
        Self {
            profit_tax: ProfitTaxConfig::default(),
            pis_rate_pct: Decimal::new(65, 2),
            cofins_rate_pct: Decimal::from(3),
            revenue_cap: Decimal::from(78_000_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActualProfitConfig {
    pub profit_tax: ProfitTaxConfig,
    /// Non-cumulative PIS debit rate on revenue.
    pub pis_rate_pct: Decimal,
    /// Non-cumulative COFINS debit rate on revenue.
    pub cofins_rate_pct: Decimal,
}

impl Default for ActualProfitConfig {
    fn default() -> Self {
        Self {
            profit_tax: ProfitTaxConfig::default(),
            pis_rate_pct: Decimal::new(165, 2),
            cofins_rate_pct: Decimal::new(760, 2),
        }
    }
}

/// Complete configuration of the comparison engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub simplified: SimplifiedConfig,
    pub presumed: PresumedProfitConfig,
    pub actual: ActualProfitConfig,
    pub municipal_tax: MunicipalTaxPolicy,
}

fn check_rate(
    field: &'static str,
    value: Decimal,
) -> Result<(), ConfigError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ConfigError::RateOutOfRange { field, value });
    }
    Ok(())
}

fn check_positive(
    field: &'static str,
    value: Decimal,
) -> Result<(), ConfigError> {
    if value <= Decimal::ZERO {
        return Err(ConfigError::NonPositiveAmount { field, value });
    }
    Ok(())
}

impl ProfitTaxConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_rate("profit_tax_rate_pct", self.profit_tax_rate_pct)?;
        check_rate("surtax_rate_pct", self.surtax_rate_pct)?;
        check_positive("surtax_monthly_threshold", self.surtax_monthly_threshold)?;
        check_rate(
            "social_contribution_rate_pct",
            self.social_contribution_rate_pct,
        )
    }
}

impl EngineConfig {
    /// Validates every rate and ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for the first value out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("simplified.revenue_cap", self.simplified.revenue_cap)?;
        check_rate(
            "simplified.payroll_ratio_threshold_pct",
            self.simplified.payroll_ratio_threshold_pct,
        )?;
        check_rate(
            "simplified.ceiling_warning_pct",
            self.simplified.ceiling_warning_pct,
        )?;

        self.presumed.profit_tax.validate()?;
        check_rate("presumed.pis_rate_pct", self.presumed.pis_rate_pct)?;
        check_rate("presumed.cofins_rate_pct", self.presumed.cofins_rate_pct)?;
        check_positive("presumed.revenue_cap", self.presumed.revenue_cap)?;

        self.actual.profit_tax.validate()?;
        check_rate("actual.pis_rate_pct", self.actual.pis_rate_pct)?;
        check_rate("actual.cofins_rate_pct", self.actual.cofins_rate_pct)
    }
}

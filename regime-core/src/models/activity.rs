use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::bracket::AnnexId;
use crate::RegimeError;

/// Activity classification of the business.
///
/// Every tag has a total mapping to its presumption percentages, its
/// simplified-regime table rule and its credit heuristic, so a new tag
/// cannot be added without deciding all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum ActivityClassification {
    Commerce,
    Industry,
    Services,
    SpecificServices,
    ProfessionalServices,
    Intermediation,
}

/// How the simplified regime picks a bracket table for an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRule {
    /// The annex is fixed by the activity itself.
    Fixed(AnnexId),
    /// The annex is selected by the payroll ratio (annex III or V).
    PayrollRatio,
}

impl ActivityClassification {
    pub const ALL: [ActivityClassification; 6] = [
        Self::Commerce,
        Self::Industry,
        Self::Services,
        Self::SpecificServices,
        Self::ProfessionalServices,
        Self::Intermediation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commerce => "commerce",
            Self::Industry => "industry",
            Self::Services => "services",
            Self::SpecificServices => "specific-services",
            Self::ProfessionalServices => "professional-services",
            Self::Intermediation => "intermediation",
        }
    }

    /// Parses a tag, accepting the Portuguese names used by older callers.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "commerce" | "comercio" => Some(Self::Commerce),
            "industry" | "industria" => Some(Self::Industry),
            "services" | "servicos" => Some(Self::Services),
            "specific-services" | "servicos-especificos" => Some(Self::SpecificServices),
            "professional-services" | "servicos-profissionais" => {
                Some(Self::ProfessionalServices)
            }
            "intermediation" | "intermediacao" => Some(Self::Intermediation),
            _ => None,
        }
    }

    /// Percentage of revenue presumed as profit for the profit tax (IRPJ).
    pub fn profit_presumption_pct(&self) -> Decimal {
        match self {
            Self::Commerce | Self::Industry | Self::SpecificServices => Decimal::from(8),
            Self::Services | Self::ProfessionalServices | Self::Intermediation => {
                Decimal::from(32)
            }
        }
    }

    /// Percentage of revenue presumed as profit for the social contribution (CSLL).
    pub fn social_contribution_presumption_pct(&self) -> Decimal {
        match self {
            Self::Commerce | Self::Industry | Self::SpecificServices => Decimal::from(12),
            Self::Services | Self::ProfessionalServices | Self::Intermediation => {
                Decimal::from(32)
            }
        }
    }

    pub fn table_rule(&self) -> TableRule {
        match self {
            Self::Commerce => TableRule::Fixed(AnnexId::I),
            Self::Industry => TableRule::Fixed(AnnexId::II),
            Self::SpecificServices => TableRule::Fixed(AnnexId::IV),
            Self::Services | Self::ProfessionalServices | Self::Intermediation => {
                TableRule::PayrollRatio
            }
        }
    }

    /// Service activities pay the municipal service tax outside the simplified regime.
    pub fn is_service(&self) -> bool {
        !matches!(self, Self::Commerce | Self::Industry)
    }

    /// Share of expenses assumed to generate PIS/COFINS credit when no real
    /// expense breakdown is available. This is an approximation.
    pub fn heuristic_credit_fraction_pct(&self) -> Decimal {
        match self {
            Self::Industry => Decimal::from(90),
            Self::Commerce => Decimal::from(70),
            _ => Decimal::from(50),
        }
    }
}

impl fmt::Display for ActivityClassification {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityClassification {
    type Err = RegimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| RegimeError::UnsupportedActivity(s.to_string()))
    }
}

impl TryFrom<String> for ActivityClassification {
    type Error = RegimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_round_trips_every_tag() {
        for activity in ActivityClassification::ALL {
            assert_eq!(ActivityClassification::parse(activity.as_str()), Some(activity));
        }
    }

    #[test]
    fn parse_accepts_portuguese_aliases() {
        assert_eq!(
            ActivityClassification::parse("Comercio"),
            Some(ActivityClassification::Commerce)
        );
        assert_eq!(
            ActivityClassification::parse("servicos"),
            Some(ActivityClassification::Services)
        );
    }

    #[test]
    fn unknown_tag_is_unsupported_activity() {
        let result = "agriculture".parse::<ActivityClassification>();

        assert_eq!(
            result,
            Err(RegimeError::UnsupportedActivity("agriculture".to_string()))
        );
    }

    #[test]
    fn deserialize_rejects_unknown_tag() {
        let result = serde_json::from_str::<ActivityClassification>("\"mining\"");

        let message = result.unwrap_err().to_string();
        assert!(message.contains("unsupported activity classification 'mining'"));
    }

    #[test]
    fn serialize_uses_kebab_case() {
        let json = serde_json::to_string(&ActivityClassification::SpecificServices).unwrap();

        assert_eq!(json, "\"specific-services\"");
    }

    #[test]
    fn specific_services_use_different_presumption_bases() {
        let activity = ActivityClassification::SpecificServices;

        assert_eq!(activity.profit_presumption_pct(), dec!(8));
        assert_eq!(activity.social_contribution_presumption_pct(), dec!(12));
    }

    #[test]
    fn commerce_and_industry_have_fixed_tables() {
        assert_eq!(
            ActivityClassification::Commerce.table_rule(),
            TableRule::Fixed(AnnexId::I)
        );
        assert_eq!(
            ActivityClassification::Industry.table_rule(),
            TableRule::Fixed(AnnexId::II)
        );
        assert_eq!(
            ActivityClassification::Services.table_rule(),
            TableRule::PayrollRatio
        );
    }

    #[test]
    fn services_have_lower_credit_fraction() {
        assert!(
            ActivityClassification::Services.heuristic_credit_fraction_pct()
                < ActivityClassification::Commerce.heuristic_credit_fraction_pct()
        );
    }
}

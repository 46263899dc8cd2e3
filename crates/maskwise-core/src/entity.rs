//! Entity type enumeration shared by detectors, the engine and the wire format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Kinds of sensitive entity a detector may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Person,
    EmailAddress,
    CreditCard,
    DateTime,
    Location,
    PhoneNumber,
    /// Nationality, religious or political group.
    Nrp,
    Money,
    VehicleId,
    MedicalCode,
    Url,
    IpAddress,
}

impl EntityType {
    /// Wire identifier, also used as the `TYPE` part of a placeholder token.
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::EmailAddress => "EMAIL_ADDRESS",
            EntityType::CreditCard => "CREDIT_CARD",
            EntityType::DateTime => "DATE_TIME",
            EntityType::Location => "LOCATION",
            EntityType::PhoneNumber => "PHONE_NUMBER",
            EntityType::Nrp => "NRP",
            EntityType::Money => "MONEY",
            EntityType::VehicleId => "VEHICLE_ID",
            EntityType::MedicalCode => "MEDICAL_CODE",
            EntityType::Url => "URL",
            EntityType::IpAddress => "IP_ADDRESS",
        }
    }

    pub fn all() -> &'static [EntityType] {
        &[
            Self::Person,
            Self::EmailAddress,
            Self::CreditCard,
            Self::DateTime,
            Self::Location,
            Self::PhoneNumber,
            Self::Nrp,
            Self::Money,
            Self::VehicleId,
            Self::MedicalCode,
            Self::Url,
            Self::IpAddress,
        ]
    }

    /// Types requested from the detector when nothing else is configured.
    pub fn default_requested() -> &'static [EntityType] {
        &[
            Self::Person,
            Self::EmailAddress,
            Self::CreditCard,
            Self::DateTime,
            Self::Location,
            Self::PhoneNumber,
            Self::Nrp,
            Self::Money,
        ]
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::Config(format!("Unknown entity type: {}", wanted)))
    }
}

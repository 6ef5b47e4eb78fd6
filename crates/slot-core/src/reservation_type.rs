//! Reservation type enum as the single source of truth for the API's type strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of reservation the API distinguishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReservationType {
    /// A regular customer reservation.
    #[default]
    Normal,
    /// Made by staff for internal use.
    Staff,
    /// Made by staff on behalf of a customer.
    Behalf,
    /// Created from a seasonal allocation.
    Seasonal,
    /// Maintenance or closure block. Never padded with buffers.
    Blocked,
}

impl ReservationType {
    /// Whether buffers are suppressed for this type.
    #[must_use]
    pub const fn is_blocked(self) -> bool {
        matches!(self, Self::Blocked)
    }
}

impl fmt::Display for ReservationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normal => "NORMAL",
            Self::Staff => "STAFF",
            Self::Behalf => "BEHALF",
            Self::Seasonal => "SEASONAL",
            Self::Blocked => "BLOCKED",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ReservationType {
    type Err = UnknownReservationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NORMAL" => Ok(Self::Normal),
            "STAFF" => Ok(Self::Staff),
            "BEHALF" => Ok(Self::Behalf),
            "SEASONAL" => Ok(Self::Seasonal),
            "BLOCKED" => Ok(Self::Blocked),
            _ => Err(UnknownReservationType(s.to_string())),
        }
    }
}

impl Serialize for ReservationType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ReservationType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown reservation type strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReservationType(String);

impl fmt::Display for UnknownReservationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown reservation type: {}", self.0)
    }
}

impl std::error::Error for UnknownReservationType {}

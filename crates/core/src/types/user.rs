//! User account types.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown user type string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid user type: {0}")]
pub struct UserTypeError(pub String);

/// Account role on the marketplace.
///
/// This is a closed set: the backend rejects anything else, so a parse
/// failure here means the stored session is stale or hand-edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Sells produce and farm supplies.
    #[default]
    Farmer,
    /// Buys from the marketplace.
    Consumer,
    /// Sells supplies and equipment.
    Vendor,
    /// Platform administration.
    Admin,
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Farmer => write!(f, "farmer"),
            Self::Consumer => write!(f, "consumer"),
            Self::Vendor => write!(f, "vendor"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserType {
    type Err = UserTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(Self::Farmer),
            "consumer" => Ok(Self::Consumer),
            "vendor" => Ok(Self::Vendor),
            "admin" => Ok(Self::Admin),
            _ => Err(UserTypeError(s.to_owned())),
        }
    }
}

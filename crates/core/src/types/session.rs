//! Session types.
//!
//! The session record mirrors the backend's login/registration response and
//! is persisted as-is so a reload stays logged in.

use serde::{Deserialize, Serialize};

use crate::types::id::UserId;
use crate::types::user::UserType;

/// The logged-in user's identity and bearer credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Backend-issued user ID.
    pub user_id: UserId,
    pub username: String,
    pub full_name: String,
    pub user_type: UserType,
    /// Opaque bearer credential. An empty token means not authenticated.
    pub access_token: String,
    /// Token scheme, "bearer" in practice.
    pub token_type: String,
}

impl SessionRecord {
    /// Whether this record carries a usable credential.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record() -> SessionRecord {
        SessionRecord {
            user_id: UserId::new("u-1"),
            username: "ram".to_owned(),
            full_name: "Ram Singh".to_owned(),
            user_type: UserType::Farmer,
            access_token: "tok-abc".to_owned(),
            token_type: "bearer".to_owned(),
        }
    }

    #[test]
    fn test_is_authenticated() {
        assert!(record().is_authenticated());

        let mut rec = record();
        rec.access_token = String::new();
        assert!(!rec.is_authenticated());
    }

    #[test]
    fn test_serde_field_names_match_backend() {
        let json = serde_json::to_value(record()).unwrap();
        assert!(json.get("access_token").is_some());
        assert!(json.get("token_type").is_some());
        assert_eq!(json.get("user_type").unwrap(), "farmer");
    }
}

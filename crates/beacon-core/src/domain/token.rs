//! Recipient tokens and registry queries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque push-notification destination (one per registered device/session).
///
/// Doubles as the registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PushToken(String);

impl PushToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PushToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for PushToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl fmt::Display for PushToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role a device registered under.
///
/// Unknown role strings are kept verbatim in `Other` so that queries on
/// the known roles never match them by accident.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Aligner,
    Manager,
    #[serde(alias = "mecanico")]
    Mechanic,
    #[serde(untagged)]
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Aligner => "aligner",
            Role::Manager => "manager",
            Role::Mechanic => "mechanic",
            Role::Other(name) => name,
        }
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "aligner" => Role::Aligner,
            "manager" => Role::Manager,
            "mechanic" | "mecanico" => Role::Mechanic,
            other => Role::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registry entry.
///
/// Written by client registration (upsert), deleted by the reconciler or
/// by the client re-registering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientToken {
    pub token: PushToken,
    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RecipientToken {
    pub fn new(token: impl Into<PushToken>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
            username: None,
            platform: None,
            user_agent: None,
            updated_at: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// Lookup against the token registry.
///
/// - `roles`: membership filter (the entry's role must be one of these)
/// - `username`: optional equality filter on the assigned identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientQuery {
    pub roles: Vec<Role>,
    pub username: Option<String>,
}

impl RecipientQuery {
    /// Role-group query, independent of individual identity.
    pub fn broadcast(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
            username: None,
        }
    }

    /// Single-identity query.
    pub fn targeted(username: impl Into<String>, role: Role) -> Self {
        Self {
            roles: vec![role],
            username: Some(username.into()),
        }
    }

    pub fn is_targeted(&self) -> bool {
        self.username.is_some()
    }

    pub fn matches(&self, entry: &RecipientToken) -> bool {
        if !self.roles.contains(&entry.role) {
            return false;
        }
        match &self.username {
            Some(username) => entry.username.as_deref() == Some(username.as_str()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_mechanic_spelling_is_accepted() {
        let entry: RecipientToken = serde_json::from_value(json!({
            "token": "tok-1",
            "role": "mecanico",
            "username": "maria",
            "platform": "web_pwa"
        }))
        .unwrap();

        assert_eq!(entry.role, Role::Mechanic);
        assert_eq!(entry.token.as_str(), "tok-1");
    }

    #[test]
    fn unknown_role_is_kept_verbatim() {
        let entry: RecipientToken =
            serde_json::from_value(json!({ "token": "tok-2", "role": "cashier" })).unwrap();
        assert_eq!(entry.role, Role::Other("cashier".to_string()));
        assert_eq!("cashier".parse::<Role>().unwrap(), entry.role);
    }

    #[test]
    fn broadcast_query_ignores_username() {
        let query = RecipientQuery::broadcast([Role::Aligner, Role::Manager]);

        assert!(query.matches(&RecipientToken::new("a", Role::Aligner).with_username("ana")));
        assert!(query.matches(&RecipientToken::new("b", Role::Manager)));
        assert!(!query.matches(&RecipientToken::new("c", Role::Mechanic)));
    }

    #[test]
    fn targeted_query_requires_role_and_username() {
        let query = RecipientQuery::targeted("maria", Role::Mechanic);

        assert!(query.matches(&RecipientToken::new("m", Role::Mechanic).with_username("maria")));
        assert!(!query.matches(&RecipientToken::new("j", Role::Mechanic).with_username("joao")));
        assert!(!query.matches(&RecipientToken::new("x", Role::Manager).with_username("maria")));
        assert!(!query.matches(&RecipientToken::new("y", Role::Mechanic)));
    }
}

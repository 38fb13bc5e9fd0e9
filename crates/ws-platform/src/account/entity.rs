//! Account Entity
//!
//! Identity record: unique username, unique email, password hash, role.
//! Owns zero-or-one customer profile and many refresh tokens (by reference).

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use utoipa::ToSchema;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
    /// Back-office administrator
    Admin,
    /// Storefront customer
    Customer,
}

impl Default for AccountRole {
    fn default() -> Self {
        Self::Customer
    }
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Customer => "CUSTOMER",
        }
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "CUSTOMER" => Ok(Self::Customer),
            other => Err(format!("Unknown account role: {}", other)),
        }
    }
}

/// Account entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Login name (unique)
    pub username: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2id PHC-format hash; the plaintext password is never stored
    pub password_hash: String,

    /// Account role
    #[serde(default)]
    pub role: AccountRole,

    /// Audit fields
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl Account {
    /// Create a new customer account with an already-hashed password
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role: AccountRole::Customer,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn with_role(mut self, role: AccountRole) -> Self {
        self.role = role;
        self
    }

    /// Apply profile updates and bump the modified timestamp
    pub fn update(&mut self, username: Option<String>, email: Option<String>, role: Option<AccountRole>) {
        if let Some(username) = username {
            self.username = username;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(role) = role {
            self.role = role;
        }
        self.modified_at = Utc::now();
    }

    pub fn is_admin(&self) -> bool {
        self.role == AccountRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_defaults_to_customer() {
        let account = Account::new("alex42", "alex@example.com", "$argon2id$fake");
        assert_eq!(account.role, AccountRole::Customer);
        assert!(!account.is_admin());
        assert_eq!(account.id.len(), 13);
    }

    #[test]
    fn test_with_role() {
        let account = Account::new("admin1", "admin@example.com", "$argon2id$fake")
            .with_role(AccountRole::Admin);
        assert!(account.is_admin());
    }

    #[test]
    fn test_update_bumps_modified_at() {
        let mut account = Account::new("alex42", "alex@example.com", "$argon2id$fake");
        let before = account.modified_at;
        std::thread::sleep(std::time::Duration::from_millis(2));

        account.update(Some("alex43".to_string()), None, None);

        assert_eq!(account.username, "alex43");
        assert_eq!(account.email, "alex@example.com");
        assert!(account.modified_at > before);
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("ADMIN".parse::<AccountRole>().unwrap(), AccountRole::Admin);
        assert_eq!(AccountRole::Customer.to_string(), "CUSTOMER");
        assert!("Manager".parse::<AccountRole>().is_err());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&AccountRole::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(serde_json::to_string(&AccountRole::Customer).unwrap(), "\"CUSTOMER\"");
    }
}

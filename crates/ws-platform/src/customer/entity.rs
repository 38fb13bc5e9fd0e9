//! Customer Entity
//!
//! Contact/shipping profile, 1:1 with an account.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// Customer profile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Owning account (unique - one profile per account)
    pub account_id: String,

    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,

    /// Country name as entered
    pub country: String,

    pub zip_code: i32,
    pub gender: String,

    /// Audit fields
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(
        account_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            account_id: account_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone_number: String::new(),
            country: String::new(),
            zip_code: 0,
            gender: String::new(),
            created_at: now,
            modified_at: now,
        }
    }

    pub fn with_contact(mut self, phone_number: impl Into<String>, country: impl Into<String>, zip_code: i32) -> Self {
        self.phone_number = phone_number.into();
        self.country = country.into();
        self.zip_code = zip_code;
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    /// Name shown in UIs and stamped into access tokens
    pub fn display_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }

    /// Apply profile updates and bump the modified timestamp
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        first_name: Option<String>,
        last_name: Option<String>,
        phone_number: Option<String>,
        country: Option<String>,
        zip_code: Option<i32>,
        gender: Option<String>,
    ) {
        if let Some(first_name) = first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            self.last_name = last_name;
        }
        if let Some(phone_number) = phone_number {
            self.phone_number = phone_number;
        }
        if let Some(country) = country {
            self.country = country;
        }
        if let Some(zip_code) = zip_code {
            self.zip_code = zip_code;
        }
        if let Some(gender) = gender {
            self.gender = gender;
        }
        self.modified_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let customer = Customer::new("0HZXEQ5Y8JY5Z", "Alex", "Example");
        assert_eq!(customer.display_name(), "Alex Example");
    }

    #[test]
    fn test_display_name_partial() {
        let customer = Customer::new("0HZXEQ5Y8JY5Z", "Alex", "");
        assert_eq!(customer.display_name(), "Alex");

        let customer = Customer::new("0HZXEQ5Y8JY5Z", "", "Example");
        assert_eq!(customer.display_name(), "Example");
    }

    #[test]
    fn test_update_bumps_modified_at() {
        let mut customer = Customer::new("0HZXEQ5Y8JY5Z", "Alex", "Example")
            .with_contact("42483787", "Danmark", 2620);
        let before = customer.modified_at;
        std::thread::sleep(std::time::Duration::from_millis(2));

        customer.update(None, None, Some("11111111".to_string()), None, None, None);

        assert_eq!(customer.phone_number, "11111111");
        assert_eq!(customer.country, "Danmark");
        assert!(customer.modified_at > before);
    }
}

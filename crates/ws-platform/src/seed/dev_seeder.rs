//! Development Data Seeder
//!
//! Seeds development data on application startup.
//!
//! Default credentials:
//!   Admin:    admin / DevPassword123
//!   Customer: alexcustomer / DevPassword123

use mongodb::Database;
use tracing::info;

use crate::account::entity::{Account, AccountRole};
use crate::account::repository::AccountRepository;
use crate::auth::password_service::{Argon2Config, PasswordPolicy, PasswordService};
use crate::customer::entity::Customer;
use crate::customer::repository::CustomerRepository;

const DEV_PASSWORD: &str = "DevPassword123";

/// Development data seeder
pub struct DevDataSeeder {
    db: Database,
    password_service: PasswordService,
}

impl DevDataSeeder {
    pub fn new(db: Database) -> Self {
        // Use testing config for faster seeding, but still Argon2id
        let password_service = PasswordService::new(
            Argon2Config::testing(),
            PasswordPolicy::lenient(),
        );
        Self { db, password_service }
    }

    /// Seed all development data
    pub async fn seed(&self) -> Result<(), Box<dyn std::error::Error>> {
        info!("=== DEV DATA SEEDER ===");
        info!("Seeding development data...");

        let admin = self
            .seed_account("admin", "admin@webshop.local", AccountRole::Admin)
            .await?;
        let customer = self
            .seed_account("alexcustomer", "alex@example.com", AccountRole::Customer)
            .await?;

        if let Some(account) = &customer {
            self.seed_profile(account, "Alex", "Example", "42483787", "Danmark", 2620).await?;
        }
        if let Some(account) = &admin {
            self.seed_profile(account, "Ada", "Admin", "11111111", "Danmark", 2100).await?;
        }

        info!("Development data seeded successfully!");
        info!("");
        info!("Default logins:");
        info!("  Admin:    admin / {}", DEV_PASSWORD);
        info!("  Customer: alexcustomer / {}", DEV_PASSWORD);
        info!("=======================");

        Ok(())
    }

    async fn seed_account(
        &self,
        username: &str,
        email: &str,
        role: AccountRole,
    ) -> Result<Option<Account>, Box<dyn std::error::Error>> {
        let repo = AccountRepository::new(&self.db);

        if let Some(existing) = repo.find_by_username(username).await? {
            return Ok(Some(existing));
        }

        let password_hash = self.password_service.hash_password(DEV_PASSWORD)?;
        let account = Account::new(username, email, password_hash).with_role(role);
        repo.insert(&account).await?;
        info!("Created account: {} ({})", username, account.role);

        Ok(Some(account))
    }

    async fn seed_profile(
        &self,
        account: &Account,
        first_name: &str,
        last_name: &str,
        phone_number: &str,
        country: &str,
        zip_code: i32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let repo = CustomerRepository::new(&self.db);

        if repo.find_by_account(&account.id).await?.is_some() {
            return Ok(());
        }

        let customer = Customer::new(&account.id, first_name, last_name)
            .with_contact(phone_number, country, zip_code);
        repo.insert(&customer).await?;
        info!("Created customer profile: {} {}", first_name, last_name);

        Ok(())
    }
}

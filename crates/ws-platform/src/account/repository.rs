//! Account Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::account::entity::Account;
use crate::shared::error::Result;

pub struct AccountRepository {
    collection: Collection<Account>,
}

impl AccountRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("accounts"),
        }
    }

    pub async fn insert(&self, account: &Account) -> Result<()> {
        self.collection.insert_one(account).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// Login lookup: the identifier may be either the username or the email.
    /// Matches are case-sensitive, exactly as stored.
    pub async fn find_by_username_or_email(&self, identifier: &str) -> Result<Option<Account>> {
        Ok(self.collection
            .find_one(doc! {
                "$or": [
                    { "username": identifier },
                    { "email": identifier }
                ]
            })
            .await?)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        Ok(self.collection.find_one(doc! { "username": username }).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    pub async fn find_page(&self, offset: u64, limit: i64) -> Result<Vec<Account>> {
        let options = FindOptions::builder()
            .sort(doc! { "_id": 1 })
            .skip(offset)
            .limit(limit)
            .build();

        let cursor = self.collection
            .find(doc! {})
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, account: &Account) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &account.id }, account)
            .await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}

#[cfg(test)]
mod tests {
    // Repository tests require a MongoDB connection
    // These would typically be integration tests
}

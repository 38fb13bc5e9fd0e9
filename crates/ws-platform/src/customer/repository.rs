//! Customer Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::customer::entity::Customer;
use crate::shared::error::Result;

pub struct CustomerRepository {
    collection: Collection<Customer>,
}

impl CustomerRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("customers"),
        }
    }

    pub async fn insert(&self, customer: &Customer) -> Result<()> {
        self.collection.insert_one(customer).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Customer>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_account(&self, account_id: &str) -> Result<Option<Customer>> {
        Ok(self.collection.find_one(doc! { "accountId": account_id }).await?)
    }

    pub async fn find_page(&self, offset: u64, limit: i64) -> Result<Vec<Customer>> {
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

    pub async fn update(&self, customer: &Customer) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &customer.id }, customer)
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

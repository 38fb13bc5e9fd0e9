//! MongoDB Index Initialization
//!
//! Creates indexes for all collections on application startup.

use mongodb::{Database, IndexModel, bson::doc, options::IndexOptions};
use tracing::info;

/// Initialize all MongoDB indexes
pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_account_indexes(db).await?;
    create_customer_indexes(db).await?;
    create_refresh_token_indexes(db).await?;

    info!("MongoDB indexes initialized successfully");
    Ok(())
}

async fn create_account_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let accounts = db.collection::<mongodb::bson::Document>("accounts");

    // Username lookup (unique)
    accounts.create_index(
        IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .background(true)
                .build())
            .build(),
    ).await?;

    // Email lookup (unique)
    accounts.create_index(
        IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .background(true)
                .build())
            .build(),
    ).await?;

    // Role filtering
    accounts.create_index(
        IndexModel::builder()
            .keys(doc! { "role": 1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    info!("Created indexes on accounts");
    Ok(())
}

async fn create_customer_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let customers = db.collection::<mongodb::bson::Document>("customers");

    // One profile per account (unique)
    customers.create_index(
        IndexModel::builder()
            .keys(doc! { "accountId": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .background(true)
                .build())
            .build(),
    ).await?;

    info!("Created indexes on customers");
    Ok(())
}

async fn create_refresh_token_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let refresh_tokens = db.collection::<mongodb::bson::Document>("refresh_tokens");

    // Token value lookup (unique)
    refresh_tokens.create_index(
        IndexModel::builder()
            .keys(doc! { "token": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .background(true)
                .build())
            .build(),
    ).await?;

    // Per-account listing
    refresh_tokens.create_index(
        IndexModel::builder()
            .keys(doc! { "accountId": 1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    // Expiry scans (active-token queries and cleanup)
    refresh_tokens.create_index(
        IndexModel::builder()
            .keys(doc! { "expiresAt": 1 })
            .options(IndexOptions::builder().background(true).build())
            .build(),
    ).await?;

    info!("Created indexes on refresh_tokens");
    Ok(())
}

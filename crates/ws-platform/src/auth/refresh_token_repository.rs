//! Refresh Token Repository
//!
//! Repository for managing refresh tokens in MongoDB.
//! Supports token lookup, rotation, and revocation. Revocation goes through
//! a single conditional update so that two concurrent rotations of the same
//! token cannot both succeed.

use mongodb::{Collection, Database, bson::doc};
use futures::TryStreamExt;
use chrono::Utc;
use crate::RefreshToken;
use crate::shared::error::Result;

/// Repository for refresh token management
pub struct RefreshTokenRepository {
    collection: Collection<RefreshToken>,
}

impl RefreshTokenRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("refresh_tokens"),
        }
    }

    /// Insert a new refresh token
    pub async fn insert(&self, token: &RefreshToken) -> Result<()> {
        self.collection.insert_one(token).await?;
        Ok(())
    }

    /// Find a refresh token by its value
    ///
    /// This is the primary lookup method for rotation and revocation.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        Ok(self.collection.find_one(doc! { "token": token }).await?)
    }

    /// Find all tokens for an account (rotation chains included)
    pub async fn find_by_account(&self, account_id: &str) -> Result<Vec<RefreshToken>> {
        let cursor = self.collection
            .find(doc! { "accountId": account_id })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Atomically revoke a token that is still active.
    ///
    /// The filter requires the token to be unrevoked and unexpired, so only
    /// one of any number of concurrent rotations/revocations can win; the
    /// losers observe `false`. `replaced_by` is set on rotation and left
    /// unset on explicit revoke.
    pub async fn revoke_active(
        &self,
        token: &str,
        ip_address: &str,
        replaced_by: Option<&str>,
    ) -> Result<bool> {
        let now = mongodb::bson::DateTime::from_chrono(Utc::now());

        let mut set = doc! {
            "revokedAt": now,
            "revokedByIp": ip_address,
        };
        if let Some(successor) = replaced_by {
            set.insert("replacedByToken", successor);
        }

        let result = self.collection
            .update_one(
                doc! {
                    "token": token,
                    "revokedAt": { "$exists": false },
                    "expiresAt": { "$gt": now }
                },
                doc! { "$set": set },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    /// Count active tokens for an account (for monitoring)
    pub async fn count_active_for_account(&self, account_id: &str) -> Result<u64> {
        let now = mongodb::bson::DateTime::from_chrono(Utc::now());
        Ok(self.collection
            .count_documents(doc! {
                "accountId": account_id,
                "revokedAt": { "$exists": false },
                "expiresAt": { "$gt": now }
            })
            .await?)
    }
}

#[cfg(test)]
mod tests {
    // Repository tests require a MongoDB connection
    // These would typically be integration tests
}

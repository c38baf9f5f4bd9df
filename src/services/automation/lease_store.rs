//! Automation Lease Store (C2)
//!
//! Keys a TTL'd, encrypted signing-key record in Redis under
//! `snipe:lease:{userId}`. The lease is write-once-per-lifetime: storing
//! always re-encrypts under the process-global master key and resets the
//! TTL. Reading decrypts and returns the raw key material, which the caller
//! must zeroise after use.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::core::sniping::{DecryptedLease, UserId, WalletId};
use crate::core::types::Timestamp;
use crate::infrastructure::database::redis::RedisService;
use crate::utils::crypto::{self, EncryptedData, SecureKey};

/// Wire format of a lease record as stored in Redis.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredLease {
    wallet_id: WalletId,
    ciphertext: Vec<u8>,
    nonce: [u8; crypto::NONCE_SIZE],
    expires_at: chrono::DateTime<chrono::Utc>,
}

fn lease_key(user_id: UserId) -> String {
    format!("snipe:lease:{}", user_id.0)
}

/// Automation Lease Store: TTL'd, encrypted signing-key entries in Redis.
pub struct AutomationLeaseStore {
    redis: Arc<RedisService>,
    master_key: SecureKey,
    default_ttl: Duration,
}

impl AutomationLeaseStore {
    /// Construct a lease store. `master_secret` must already have passed
    /// [`crypto::validate_master_secret`] at startup.
    pub fn new(redis: Arc<RedisService>, master_secret: &str, default_ttl: Duration) -> Self {
        Self {
            redis,
            master_key: crypto::derive_automation_master_key(master_secret),
            default_ttl,
        }
    }

    /// Store (or re-arm) a user's automation lease. Always re-encrypts and
    /// resets the TTL, even if a lease already exists.
    #[instrument(skip(self, secret))]
    pub async fn store(
        &self,
        user_id: UserId,
        wallet_id: WalletId,
        secret: &[u8],
        ttl: Option<Duration>,
    ) -> AppResult<Timestamp> {
        let ttl = ttl.unwrap_or(self.default_ttl);

        let encrypted = crypto::encrypt_data(&self.master_key, secret)
            .map_err(|e| AppError::security(format!("lease encryption failed: {e}")))?;

        let expires_at = chrono::Utc::now() + chrono::Duration::seconds(ttl.as_secs() as i64);

        let record = StoredLease {
            wallet_id,
            ciphertext: encrypted.ciphertext,
            nonce: encrypted.nonce,
            expires_at,
        };

        let payload = serde_json::to_string(&record)
            .map_err(|e| AppError::internal(format!("failed to serialize lease: {e}")))?;

        self.redis.set(&lease_key(user_id), payload, Some(ttl)).await?;

        Ok(Timestamp::from_datetime(expires_at))
    }

    /// Load and decrypt a user's lease. Proactively deletes expired records
    /// on read and returns a not-found error.
    #[instrument(skip(self))]
    pub async fn load(&self, user_id: UserId) -> AppResult<DecryptedLease> {
        let key = lease_key(user_id);
        let record: Option<String> = self.redis.get(&key).await?;

        let record = record.ok_or_else(|| AppError::security(format!(
            "automation lease not found for user {user_id}"
        )))?;

        let record: StoredLease = serde_json::from_str(&record)
            .map_err(|e| AppError::security(format!("corrupt lease record: {e}")))?;

        if record.expires_at <= chrono::Utc::now() {
            let _ = self.redis.delete(&key).await;
            return Err(AppError::security(format!(
                "automation lease expired for user {user_id}"
            )));
        }

        let encrypted = EncryptedData {
            ciphertext: record.ciphertext,
            nonce: record.nonce,
            salt: None,
        };

        let secret = crypto::decrypt_data(&self.master_key, &encrypted).map_err(|e| {
            warn!("lease decryption failed for user {}: {}", user_id, e);
            AppError::security(format!("lease decryption failed (tampered or wrong master key): {e}"))
        })?;

        Ok(DecryptedLease {
            wallet_id: record.wallet_id,
            secret,
            expires_at: Timestamp::from_datetime(record.expires_at),
        })
    }

    /// Answer presence for a batch of users with a single round trip,
    /// preserving input order.
    #[instrument(skip(self))]
    pub async fn batch_presence(&self, user_ids: &[UserId]) -> AppResult<Vec<bool>> {
        let keys: Vec<String> = user_ids.iter().map(|u| lease_key(*u)).collect();
        self.redis.mget_exists(&keys).await
    }

    /// Explicitly revoke a user's lease ahead of its TTL.
    #[instrument(skip(self))]
    pub async fn revoke(&self, user_id: UserId) -> AppResult<bool> {
        self.redis.delete(&lease_key(user_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lease_key_format() {
        assert_eq!(lease_key(UserId(42)), "snipe:lease:42");
    }
}

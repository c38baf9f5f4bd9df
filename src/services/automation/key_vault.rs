//! Key Vault & Encryption (C1)
//!
//! Derives a per-wallet encryption key with Argon2id from the user's
//! password and a stored salt, then encrypts/decrypts the 64-byte Ed25519
//! secret key with AES-256-GCM. Argon2 hashing is CPU-bound and is offloaded
//! to `spawn_blocking` so it never runs on an async task's executor thread.

use tracing::{instrument, warn};
use zeroize::Zeroize;

use crate::core::error::AppError;
use crate::core::result::AppResult;
use crate::utils::crypto::{self, EncryptedData, SecureKey, NONCE_SIZE, SALT_SIZE};

/// A self-contained, storable encrypted blob: salt + nonce + ciphertext (with
/// appended GCM tag).
#[derive(Debug, Clone)]
pub struct EncryptedSecret {
    /// The salt used to derive the wrapping key from the user's password
    pub salt: [u8; SALT_SIZE],
    /// The AES-GCM nonce/IV
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext with the 16-byte GCM tag appended
    pub ciphertext: Vec<u8>,
}

impl EncryptedSecret {
    /// Encode to a single base64 string suitable for storage in `wallets.encrypted_private_key`.
    pub fn encode(&self) -> String {
        crypto::encode_encrypted_data(&EncryptedData {
            ciphertext: self.ciphertext.clone(),
            nonce: self.nonce,
            salt: Some(self.salt),
        })
    }

    /// Decode a previously-encoded blob.
    pub fn decode(encoded: &str) -> AppResult<Self> {
        let data = crypto::decode_encrypted_data(encoded)
            .map_err(|e| AppError::security(format!("DECRYPTION_FAILED: malformed blob: {e}")))?;
        let salt = data.salt.ok_or_else(|| {
            AppError::security("DECRYPTION_FAILED: blob missing salt")
        })?;
        Ok(Self { salt, nonce: data.nonce, ciphertext: data.ciphertext })
    }
}

/// Key Vault: per-wallet Argon2id + AES-256-GCM encryption of signing keys.
#[derive(Debug, Clone, Default)]
pub struct KeyVault;

impl KeyVault {
    /// Create a new key vault. Stateless beyond the Argon2id parameters
    /// baked into [`crate::utils::crypto`].
    pub fn new() -> Self {
        Self
    }

    /// Encrypt a 64-byte Ed25519 secret key under a key derived from `password`.
    ///
    /// Zeroises the plaintext `secret` buffer before returning on every
    /// exit path.
    #[instrument(skip(self, secret, password))]
    pub async fn encrypt(&self, secret: &[u8], password: &str) -> AppResult<EncryptedSecret> {
        if secret.len() != 64 {
            return Err(AppError::validation(format!(
                "expected a 64-byte Ed25519 secret key, got {} bytes",
                secret.len()
            )));
        }

        let salt = crypto::generate_salt()
            .map_err(|e| AppError::security(format!("failed to generate salt: {e}")))?;

        let password = password.to_string();
        let mut secret_owned = secret.to_vec();

        let result = {
            let salt = salt;
            let secret_for_blocking = secret_owned.clone();
            tokio::task::spawn_blocking(move || -> Result<EncryptedData, AppError> {
                let key = SecureKey::from_password_argon2id(&password, &salt)
                    .map_err(|e| AppError::security(format!("Argon2id derivation failed: {e}")))?;
                crypto::encrypt_data(&key, &secret_for_blocking)
                    .map_err(|e| AppError::security(format!("encryption failed: {e}")))
            })
            .await
            .map_err(|e| AppError::internal(format!("key vault worker panicked: {e}")))?
        };

        secret_owned.zeroize();

        let encrypted = result?;
        Ok(EncryptedSecret {
            salt,
            nonce: encrypted.nonce,
            ciphertext: encrypted.ciphertext,
        })
    }

    /// Decrypt a blob previously produced by [`Self::encrypt`].
    ///
    /// Fails with a security error classified as `INVALID_PASSWORD` (GCM
    /// tag mismatch) or `DECRYPTION_FAILED` (malformed blob). The caller is
    /// responsible for zeroising the returned plaintext after use.
    #[instrument(skip(self, blob, password))]
    pub async fn decrypt(&self, blob: &EncryptedSecret, password: &str) -> AppResult<Vec<u8>> {
        let password = password.to_string();
        let salt = blob.salt;
        let encrypted = EncryptedData {
            ciphertext: blob.ciphertext.clone(),
            nonce: blob.nonce,
            salt: Some(salt),
        };

        let plaintext = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, AppError> {
            let key = SecureKey::from_password_argon2id(&password, &salt)
                .map_err(|e| AppError::security(format!("Argon2id derivation failed: {e}")))?;
            crypto::decrypt_data(&key, &encrypted).map_err(|_| {
                AppError::security("INVALID_PASSWORD: AES-GCM authentication failed")
            })
        })
        .await
        .map_err(|e| AppError::internal(format!("key vault worker panicked: {e}")))??;

        if plaintext.len() != 64 {
            warn!("decrypted secret has unexpected length {}", plaintext.len());
        }

        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_encrypt_decrypt_round_trip() {
        let vault = KeyVault::new();
        let secret = [42u8; 64];

        let blob = vault.encrypt(&secret, "a reasonably strong password").await.unwrap();
        let decrypted = vault.decrypt(&blob, "a reasonably strong password").await.unwrap();

        assert_eq!(secret.as_slice(), decrypted.as_slice());
    }

    #[tokio::test]
    async fn test_wrong_password_fails() {
        let vault = KeyVault::new();
        let secret = [7u8; 64];

        let blob = vault.encrypt(&secret, "correct password").await.unwrap();
        let result = vault.decrypt(&blob, "incorrect password").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_encode_decode_blob() {
        let vault = KeyVault::new();
        let secret = [1u8; 64];

        let blob = vault.encrypt(&secret, "password123password123").await.unwrap();
        let encoded = blob.encode();
        let decoded = EncryptedSecret::decode(&encoded).unwrap();

        let decrypted = vault.decrypt(&decoded, "password123password123").await.unwrap();
        assert_eq!(secret.as_slice(), decrypted.as_slice());
    }

    #[tokio::test]
    async fn test_rejects_wrong_length_secret() {
        let vault = KeyVault::new();
        let result = vault.encrypt(&[0u8; 32], "password123password123").await;
        assert!(result.is_err());
    }
}

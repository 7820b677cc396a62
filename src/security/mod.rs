//! Application-layer encryption for OAuth tokens at rest.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;

use crate::config;

const KEY_SIZE: usize = 32;
const FORMAT_VERSION: &str = "v1";

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid token key: expected {KEY_SIZE} base64-encoded bytes")]
    InvalidKey,

    #[error("Encryption failed")]
    EncryptFailed,

    #[error("Invalid ciphertext")]
    InvalidCiphertext,
}

/// AES-256-GCM cipher for token columns. Stored form is the compact
/// `v1:<nonce>:<ciphertext>` string with both parts base64-encoded.
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl TokenCipher {
    pub fn new(key_b64: &str) -> Result<Self, CryptoError> {
        let key_bytes = BASE64.decode(key_b64).map_err(|_| CryptoError::InvalidKey)?;
        if key_bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKey);
        }
        let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    pub fn from_config() -> Result<Self, CryptoError> {
        Self::new(&config::config().security.token_key)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptFailed)?;
        Ok(format!(
            "{FORMAT_VERSION}:{}:{}",
            BASE64.encode(nonce),
            BASE64.encode(ciphertext)
        ))
    }

    pub fn decrypt(&self, stored: &str) -> Result<String, CryptoError> {
        let mut parts = stored.splitn(3, ':');
        let (version, nonce_b64, ct_b64) = match (parts.next(), parts.next(), parts.next()) {
            (Some(v), Some(n), Some(c)) => (v, n, c),
            _ => return Err(CryptoError::InvalidCiphertext),
        };
        if version != FORMAT_VERSION {
            return Err(CryptoError::InvalidCiphertext);
        }

        let nonce_bytes = BASE64
            .decode(nonce_b64)
            .map_err(|_| CryptoError::InvalidCiphertext)?;
        if nonce_bytes.len() != 12 {
            return Err(CryptoError::InvalidCiphertext);
        }
        let ciphertext = BASE64
            .decode(ct_b64)
            .map_err(|_| CryptoError::InvalidCiphertext)?;

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| CryptoError::InvalidCiphertext)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidCiphertext)
    }
}

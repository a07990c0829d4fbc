//! Symmetric encryption primitives.
//!
//! [`SceneCipher`] is the seam where an embedding application can plug in
//! the primitives its other clients use. [`ChaChaCipher`] is the default.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};

use crate::error::{CryptoError, Result};
use crate::key::{Iv, RoomKey};

/// Output of an encryption: ciphertext plus the IV needed to decrypt it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedData {
    /// The encrypted data (includes authentication tag).
    pub ciphertext: Vec<u8>,
    /// IV used for encryption (unique per encryption).
    pub iv: Iv,
}

/// Encrypt/decrypt pair keyed by a room key. Both directions are fallible.
pub trait SceneCipher: Send + Sync {
    /// Encrypt `plaintext`, choosing a fresh IV.
    fn encrypt(&self, key: &RoomKey, plaintext: &[u8]) -> Result<EncryptedData>;

    /// Decrypt `ciphertext` that was produced with `iv` and `key`.
    fn decrypt(&self, iv: &Iv, ciphertext: &[u8], key: &RoomKey) -> Result<Vec<u8>>;
}

/// ChaCha20-Poly1305 with a random 96-bit IV per encryption.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChaChaCipher;

impl ChaChaCipher {
    fn cipher(key: &RoomKey) -> Result<ChaCha20Poly1305> {
        ChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }
}

impl SceneCipher for ChaChaCipher {
    fn encrypt(&self, key: &RoomKey, plaintext: &[u8]) -> Result<EncryptedData> {
        let iv = Iv::generate();
        let ciphertext = Self::cipher(key)?
            .encrypt(Nonce::from_slice(iv.as_bytes()), plaintext)
            .map_err(|e| CryptoError::EncryptionError(e.to_string()))?;

        Ok(EncryptedData { ciphertext, iv })
    }

    fn decrypt(&self, iv: &Iv, ciphertext: &[u8], key: &RoomKey) -> Result<Vec<u8>> {
        Self::cipher(key)?
            .decrypt(Nonce::from_slice(iv.as_bytes()), ciphertext)
            .map_err(|e| CryptoError::DecryptionError(e.to_string()))
    }
}

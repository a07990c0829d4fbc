//! # SceneSync Crypto
//!
//! Room-key encryption for scenes and attachments.
//!
//! ## Overview
//!
//! Every room has one symmetric [`RoomKey`], shared among collaborators and
//! never sent to the storage backend. Scenes are serialized to JSON and
//! encrypted as a whole; attachments are wrapped in an encrypted envelope
//! that also carries their metadata.
//!
//! ## Key Types
//!
//! - [`SceneCipher`] - Encrypt/decrypt primitives (default: [`ChaChaCipher`])
//! - [`FileCodec`] - Attachment payload format (default: [`EnvelopeFileCodec`])
//! - [`RoomKey`], [`Iv`] - Key material
//!
//! ## Usage
//!
//! ```rust
//! use scenesync_core::Element;
//! use scenesync_crypto::{decrypt_elements, encrypt_elements, ChaChaCipher, RoomKey};
//!
//! let key = RoomKey::generate();
//! let scene = vec![Element::new("a", "rectangle")];
//!
//! let encrypted = encrypt_elements(&ChaChaCipher, &key, &scene).unwrap();
//! let raw = decrypt_elements(&ChaChaCipher, &key, encrypted.iv.as_bytes(), &encrypted.ciphertext)
//!     .unwrap();
//! assert_eq!(raw.len(), 1);
//! ```

pub mod cipher;
pub mod error;
pub mod file_codec;
pub mod key;
pub mod scene;

pub use cipher::{ChaChaCipher, EncryptedData, SceneCipher};
pub use error::{CryptoError, Result};
pub use file_codec::{DecodedFile, EnvelopeFileCodec, FileCodec, FileMetadata};
pub use key::{Iv, RoomKey};
pub use scene::{decrypt_elements, encrypt_elements};

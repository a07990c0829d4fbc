//! Document-shaped encryption: serialize → encrypt, decrypt → deserialize.

use serde_json::Value;

use scenesync_core::{scene_from_json, scene_to_json, Element};

use crate::cipher::{EncryptedData, SceneCipher};
use crate::error::Result;
use crate::key::{Iv, RoomKey};

/// Serialize and encrypt a whole scene with the room key.
pub fn encrypt_elements(
    cipher: &dyn SceneCipher,
    key: &RoomKey,
    elements: &[Element],
) -> Result<EncryptedData> {
    let json = scene_to_json(elements)?;
    cipher.encrypt(key, &json)
}

/// Decrypt a stored scene into raw element values.
///
/// `iv` comes straight from storage, so its length is checked here. The
/// returned values still need [`scenesync_core::restore_elements`].
pub fn decrypt_elements(
    cipher: &dyn SceneCipher,
    key: &RoomKey,
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<Value>> {
    let iv = Iv::try_from(iv)?;
    let plaintext = cipher.decrypt(&iv, ciphertext, key)?;
    Ok(scene_from_json(&plaintext)?)
}

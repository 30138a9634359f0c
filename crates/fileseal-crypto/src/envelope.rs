//! Envelope binary layout
//!
//! ```text
//! offset 0      u32 LE  metadata length (L)
//! offset 4      L bytes  UTF-8 JSON {"name": string, "type": string}
//! offset 4+L    16 bytes salt
//! offset 20+L   12 bytes nonce
//! offset 32+L   rest     AES-GCM ciphertext (plaintext length + 16-byte tag)
//! ```
//!
//! Salt and nonce are fixed width and the ciphertext runs to the end of the
//! buffer, so the metadata length is the only length field.

use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, CryptoResult};
use crate::{LENGTH_PREFIX_SIZE, MIN_ENVELOPE_SIZE, NONCE_SIZE, SALT_SIZE, TAG_SIZE};

/// Original file name and MIME type, stored in cleartext ahead of the
/// ciphertext. Not authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

impl FileMetadata {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
        }
    }

    /// Serialize to the JSON record stored in the envelope
    pub fn to_bytes(&self) -> CryptoResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| CryptoError::MalformedEnvelope(format!("metadata serialization: {e}")))
    }

    /// Parse the JSON record stored in the envelope
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            CryptoError::MalformedEnvelope(format!("metadata is not a name/type record: {e}"))
        })
    }
}

/// A decoded envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub metadata: FileMetadata,
    pub salt: [u8; SALT_SIZE],
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext with the GCM tag appended
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Serialize to the on-disk byte layout.
    pub fn encode(&self) -> CryptoResult<Vec<u8>> {
        let metadata = self.metadata.to_bytes()?;
        let metadata_len = u32::try_from(metadata.len()).map_err(|_| {
            CryptoError::MalformedEnvelope(format!(
                "metadata too large: {} bytes",
                metadata.len()
            ))
        })?;

        let mut out =
            Vec::with_capacity(MIN_ENVELOPE_SIZE + metadata.len() + self.ciphertext.len());
        out.extend_from_slice(&metadata_len.to_le_bytes());
        out.extend_from_slice(&metadata);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        Ok(out)
    }

    /// Parse the on-disk byte layout.
    ///
    /// Only structure is checked here; the ciphertext is authenticated
    /// during decryption.
    pub fn decode(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < MIN_ENVELOPE_SIZE {
            return Err(CryptoError::MalformedEnvelope(format!(
                "envelope too short: {} bytes (minimum {})",
                bytes.len(),
                MIN_ENVELOPE_SIZE
            )));
        }

        let (prefix, rest) = bytes.split_at(LENGTH_PREFIX_SIZE);
        let mut len_bytes = [0u8; LENGTH_PREFIX_SIZE];
        len_bytes.copy_from_slice(prefix);
        let metadata_len = u32::from_le_bytes(len_bytes) as usize;

        // rest.len() >= SALT_SIZE + NONCE_SIZE after the minimum-size check
        let available = rest.len() - SALT_SIZE - NONCE_SIZE;
        if metadata_len > available {
            return Err(CryptoError::MalformedEnvelope(format!(
                "metadata length {metadata_len} exceeds the {available} bytes available"
            )));
        }

        let (metadata_bytes, rest) = rest.split_at(metadata_len);
        let metadata = FileMetadata::from_bytes(metadata_bytes)?;

        let (salt_bytes, rest) = rest.split_at(SALT_SIZE);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(salt_bytes);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self {
            metadata,
            salt,
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Length of the plaintext this envelope decrypts to (ciphertext minus tag).
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(TAG_SIZE)
    }
}

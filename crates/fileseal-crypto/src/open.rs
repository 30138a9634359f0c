//! Decryptor: password + envelope bytes → plaintext + metadata
//!
//! GCM tag verification is the only integrity check. A wrong password and a
//! flipped bit anywhere in salt, nonce, ciphertext or tag all surface as the
//! same [`CryptoError::DecryptionFailed`], and no plaintext is returned.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use secrecy::SecretString;
use tracing::debug;

use crate::envelope::{Envelope, FileMetadata};
use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{derive_key, KdfParams};

/// Result of a successful decryption
#[derive(Clone, PartialEq, Eq)]
pub struct Decrypted {
    pub plaintext: Vec<u8>,
    /// Taken verbatim from the unauthenticated cleartext prefix
    pub metadata: FileMetadata,
}

impl std::fmt::Debug for Decrypted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decrypted")
            .field("plaintext", &format_args!("<{} bytes>", self.plaintext.len()))
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Decrypt an envelope produced by [`crate::encrypt`].
///
/// One derive + decrypt attempt per call; retrying is up to the caller.
pub fn decrypt(
    password: &SecretString,
    envelope: &[u8],
    params: &KdfParams,
) -> CryptoResult<Decrypted> {
    let Envelope {
        metadata,
        salt,
        nonce,
        ciphertext,
    } = Envelope::decode(envelope)?;

    debug!(stage = "deriving", iterations = params.iterations, "deriving envelope key");
    let key = derive_key(password, &salt, params)?;

    debug!(stage = "transforming", bytes = ciphertext.len(), "decrypting payload");
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
        .map_err(|_| {
            debug!(stage = "failed", "envelope authentication failed");
            CryptoError::DecryptionFailed
        })?;

    debug!(stage = "success", bytes = plaintext.len(), "payload opened");
    Ok(Decrypted {
        plaintext,
        metadata,
    })
}

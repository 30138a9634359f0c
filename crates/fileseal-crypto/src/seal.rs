//! Encryptor: password + plaintext + metadata → envelope bytes

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::SecretString;
use tracing::debug;

use crate::envelope::{Envelope, FileMetadata};
use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{derive_key, KdfParams};
use crate::{NONCE_SIZE, SALT_SIZE};

/// Encrypt `plaintext` under a key derived from `password` and wrap the
/// result in an envelope.
///
/// Salt and nonce are drawn from the OS CSPRNG on every call, so encrypting
/// the same input twice yields different envelopes. Password strength is the
/// caller's concern.
pub fn encrypt(
    password: &SecretString,
    plaintext: &[u8],
    metadata: &FileMetadata,
    params: &KdfParams,
) -> CryptoResult<Vec<u8>> {
    let mut salt = [0u8; SALT_SIZE];
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut salt)
        .and_then(|_| OsRng.try_fill_bytes(&mut nonce))
        .map_err(|e| CryptoError::ProviderFailure(format!("OS random source: {e}")))?;

    debug!(stage = "deriving", iterations = params.iterations, "deriving envelope key");
    let key = derive_key(password, &salt, params)?;

    debug!(stage = "transforming", bytes = plaintext.len(), "encrypting payload");
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::ProviderFailure(format!("AES-GCM encryption failed: {e}")))?;

    let envelope = Envelope {
        metadata: metadata.clone(),
        salt,
        nonce,
        ciphertext,
    }
    .encode()?;

    debug!(stage = "success", envelope_bytes = envelope.len(), "payload sealed");
    Ok(envelope)
}

//! Async entry points
//!
//! Key derivation and AES-GCM are CPU-bound, so these wrappers move the work
//! onto tokio's blocking pool and the calling task just awaits the result.
//! Each call owns its inputs; concurrent calls share nothing.

use secrecy::SecretString;

use crate::envelope::FileMetadata;
use crate::error::{CryptoError, CryptoResult};
use crate::kdf::KdfParams;
use crate::open::{self, Decrypted};
use crate::seal;

/// Async form of [`crate::encrypt`].
pub async fn encrypt(
    password: SecretString,
    plaintext: Vec<u8>,
    metadata: FileMetadata,
    params: KdfParams,
) -> CryptoResult<Vec<u8>> {
    run_blocking(move || seal::encrypt(&password, &plaintext, &metadata, &params)).await
}

/// Async form of [`crate::decrypt`].
pub async fn decrypt(
    password: SecretString,
    envelope: Vec<u8>,
    params: KdfParams,
) -> CryptoResult<Decrypted> {
    run_blocking(move || open::decrypt(&password, &envelope, &params)).await
}

async fn run_blocking<T, F>(work: F) -> CryptoResult<T>
where
    F: FnOnce() -> CryptoResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CryptoError::ProviderFailure(format!("crypto task did not complete: {e}")))?
}

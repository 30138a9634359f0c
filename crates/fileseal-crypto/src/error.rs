use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// The buffer does not have the envelope layout
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// GCM tag verification failed. A wrong password and a corrupted
    /// envelope are reported identically.
    #[error("decryption failed: wrong password or corrupted data")]
    DecryptionFailed,

    #[error("crypto provider failure: {0}")]
    ProviderFailure(String),
}

impl CryptoError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedEnvelope(_))
    }

    pub fn is_decryption_failed(&self) -> bool {
        matches!(self, Self::DecryptionFailed)
    }
}

use std::path::PathBuf;

use fileseal_crypto::CryptoError;
use thiserror::Error;

pub type FilesealResult<T> = Result<T, FilesealError>;

#[derive(Debug, Error)]
pub enum FilesealError {
    #[error("no input: {0}")]
    NoInput(String),

    #[error("password must be at least {min_len} characters")]
    WeakPassword { min_len: usize },

    /// Advisory only: based on the file extension, not on content
    #[error("wrong artifact kind: {0}")]
    WrongArtifactKind(String),

    #[error("output already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("output would overwrite the input: {}", .0.display())]
    OutputIsInput(PathBuf),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

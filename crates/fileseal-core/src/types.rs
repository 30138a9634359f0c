use fileseal_crypto::FileMetadata;
use std::path::{Path, PathBuf};

/// Whether a file looks like a sealed envelope, judged by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Ordinary file, candidate for encryption
    Plain,
    /// Carries the encrypted extension (e.g. `report.pdf.enc`)
    Encrypted,
}

impl ArtifactKind {
    /// Classify `path` by its extension (case-insensitive, no leading dot).
    pub fn of(path: &Path, encrypted_extension: &str) -> Self {
        let sealed = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(encrypted_extension));
        if sealed {
            Self::Encrypted
        } else {
            Self::Plain
        }
    }
}

/// Outcome of sealing one file
#[derive(Debug, Clone)]
pub struct SealReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub metadata: FileMetadata,
    pub plaintext_bytes: u64,
    pub envelope_bytes: u64,
}

/// Outcome of opening one envelope
#[derive(Debug, Clone)]
pub struct OpenReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub metadata: FileMetadata,
    pub plaintext_bytes: u64,
}

/// Cleartext view of an envelope, available without the password
#[derive(Debug, Clone)]
pub struct InspectReport {
    pub metadata: FileMetadata,
    pub envelope_bytes: u64,
    pub payload_bytes: u64,
}

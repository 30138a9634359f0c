//! Caller-side input policy
//!
//! These checks sit in front of the envelope code, which itself accepts any
//! password and any payload. They are advisory guards for the file workflow,
//! not a security boundary.

use secrecy::{ExposeSecret, SecretString};
use std::path::Path;

use crate::error::{FilesealError, FilesealResult};
use crate::types::ArtifactKind;

/// Reject passwords shorter than `min_len` characters.
pub fn check_password(password: &SecretString, min_len: usize) -> FilesealResult<()> {
    if password.expose_secret().chars().count() < min_len {
        return Err(FilesealError::WeakPassword { min_len });
    }
    Ok(())
}

/// Require that `path` names an existing regular file.
///
/// An empty file is a valid payload; only a missing input is rejected.
pub async fn require_input(path: &Path) -> FilesealResult<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(FilesealError::NoInput(format!(
            "{} is not a regular file",
            path.display()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FilesealError::NoInput(
            format!("{} does not exist", path.display()),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Require that `path` is classified as `expected`.
pub fn require_kind(
    path: &Path,
    expected: ArtifactKind,
    encrypted_extension: &str,
) -> FilesealResult<()> {
    if ArtifactKind::of(path, encrypted_extension) == expected {
        return Ok(());
    }
    let reason = match expected {
        ArtifactKind::Plain => format!("{} is already encrypted", path.display()),
        ArtifactKind::Encrypted => {
            format!("{} is not a .{encrypted_extension} file", path.display())
        }
    };
    Err(FilesealError::WrongArtifactKind(reason))
}

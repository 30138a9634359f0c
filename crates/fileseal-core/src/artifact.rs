//! File-level seal/open
//!
//! - `seal_file`: policy checks → read → envelope encrypt → write `<input>.enc`
//! - `open_file`: policy checks → read → envelope decrypt → write original name
//! - `inspect_file`: decode the cleartext prefix, no password needed
//!
//! The envelope metadata name is untrusted input: when it is used to pick an
//! output path, only its final path component is kept, and it may never
//! resolve to the envelope being read.
//!
//! Outputs are written to a hidden sibling temp file and renamed into place,
//! so a failed run leaves no partial file under the destination name.

use fileseal_crypto::{provider, Envelope, FileMetadata};
use secrecy::SecretString;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::FilesealConfig;
use crate::error::{FilesealError, FilesealResult};
use crate::policy;
use crate::types::{ArtifactKind, InspectReport, OpenReport, SealReport};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
const FALLBACK_OUTPUT_NAME: &str = "decrypted";
const TEMP_SUFFIX: &str = ".fileseal_tmp";

/// Encrypt `input` into an envelope file.
///
/// Output defaults to `<input>.<encrypted_extension>`. An existing output is
/// only replaced when `force` is set.
pub async fn seal_file(
    config: &FilesealConfig,
    input: &Path,
    output: Option<&Path>,
    password: SecretString,
    force: bool,
) -> FilesealResult<SealReport> {
    let ext = &config.policy.encrypted_extension;
    policy::require_input(input).await?;
    policy::require_kind(input, ArtifactKind::Plain, ext)?;
    policy::check_password(&password, config.policy.min_password_len)?;

    let metadata = metadata_for(input)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sealed_path(input, ext));
    check_destination(input, &output, force).await?;

    let plaintext = tokio::fs::read(input).await?;
    let plaintext_bytes = plaintext.len() as u64;
    debug!(
        input = %input.display(),
        name = %metadata.name,
        content_type = %metadata.content_type,
        "sealing file"
    );

    let envelope = provider::encrypt(
        password,
        plaintext,
        metadata.clone(),
        config.crypto.kdf_params(),
    )
    .await?;
    write_output(&output, &envelope, force).await?;

    info!(
        input = %input.display(),
        output = %output.display(),
        bytes = plaintext_bytes,
        "sealed"
    );

    Ok(SealReport {
        input: input.to_path_buf(),
        output,
        metadata,
        plaintext_bytes,
        envelope_bytes: envelope.len() as u64,
    })
}

/// Decrypt an envelope file back to its original bytes.
///
/// Output defaults to the stored file name, placed next to `input`.
pub async fn open_file(
    config: &FilesealConfig,
    input: &Path,
    output: Option<&Path>,
    password: SecretString,
    force: bool,
) -> FilesealResult<OpenReport> {
    policy::require_input(input).await?;
    policy::require_kind(
        input,
        ArtifactKind::Encrypted,
        &config.policy.encrypted_extension,
    )?;
    policy::check_password(&password, config.policy.min_password_len)?;
    if let Some(path) = output {
        check_destination(input, path, force).await?;
    }

    let envelope = tokio::fs::read(input).await?;
    let decrypted = provider::decrypt(password, envelope, config.crypto.kdf_params()).await?;

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let path = restored_path(input, &decrypted.metadata);
            check_destination(input, &path, force).await?;
            path
        }
    };

    write_output(&output, &decrypted.plaintext, force).await?;
    let plaintext_bytes = decrypted.plaintext.len() as u64;

    info!(
        input = %input.display(),
        output = %output.display(),
        bytes = plaintext_bytes,
        "opened"
    );

    Ok(OpenReport {
        input: input.to_path_buf(),
        output,
        metadata: decrypted.metadata,
        plaintext_bytes,
    })
}

/// Read the cleartext metadata and sizes of an envelope file.
pub async fn inspect_file(input: &Path) -> FilesealResult<InspectReport> {
    policy::require_input(input).await?;
    let bytes = tokio::fs::read(input).await?;
    let envelope = Envelope::decode(&bytes)?;

    Ok(InspectReport {
        payload_bytes: envelope.plaintext_len() as u64,
        envelope_bytes: bytes.len() as u64,
        metadata: envelope.metadata,
    })
}

/// `<input>.<ext>`, keeping the original extension in place
pub fn sealed_path(input: &Path, encrypted_extension: &str) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".");
    name.push(encrypted_extension);
    PathBuf::from(name)
}

/// Where `open_file` writes by default: the stored name, reduced to a bare
/// file name, in the directory of `input`.
pub fn restored_path(input: &Path, metadata: &FileMetadata) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    let name = Path::new(&metadata.name)
        .file_name()
        .map(|n| n.to_os_string())
        .or_else(|| input.file_stem().map(|s| s.to_os_string()))
        .unwrap_or_else(|| OsString::from(FALLBACK_OUTPUT_NAME));
    dir.join(name)
}

/// Stored name and guessed type for `input`.
///
/// The name is stored as JSON text, so a file name that is not valid UTF-8
/// is refused rather than rewritten.
fn metadata_for(input: &Path) -> FilesealResult<FileMetadata> {
    let name = input.file_name().and_then(OsStr::to_str).ok_or_else(|| {
        FilesealError::NoInput(format!(
            "{}: file name is not valid UTF-8",
            input.display()
        ))
    })?;
    let content_type = mime_guess::from_path(input)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
    Ok(FileMetadata::new(name, content_type))
}

/// Reject a destination that resolves to `input`, even with `force`, and an
/// existing destination without `force`.
async fn check_destination(input: &Path, output: &Path, force: bool) -> FilesealResult<()> {
    if !tokio::fs::try_exists(output).await? {
        return Ok(());
    }
    if tokio::fs::canonicalize(output).await? == tokio::fs::canonicalize(input).await? {
        return Err(FilesealError::OutputIsInput(output.to_path_buf()));
    }
    if !force {
        return Err(FilesealError::OutputExists(output.to_path_buf()));
    }
    Ok(())
}

/// `.<name>.fileseal_tmp` next to `output`
fn temp_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(
        output
            .file_name()
            .unwrap_or_else(|| OsStr::new(FALLBACK_OUTPUT_NAME)),
    );
    name.push(TEMP_SUFFIX);
    output.with_file_name(name)
}

/// Atomic write: temp file, then rename over `output`.
///
/// Without `force` the destination is claimed with `create_new` first, so a
/// file that appeared after `check_destination` is still never replaced.
/// On failure the temp file and any claimed destination are removed.
async fn write_output(output: &Path, bytes: &[u8], force: bool) -> FilesealResult<()> {
    let claimed = if force {
        false
    } else {
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(output)
            .await
        {
            Ok(_) => true,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(FilesealError::OutputExists(output.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        }
    };

    let tmp = temp_path(output);
    let mut written = tokio::fs::write(&tmp, bytes).await;
    if written.is_ok() {
        written = tokio::fs::rename(&tmp, output).await;
    }

    if let Err(e) = written {
        debug!(output = %output.display(), error = %e, "write failed, discarding");
        let _ = tokio::fs::remove_file(&tmp).await;
        if claimed {
            let _ = tokio::fs::remove_file(output).await;
        }
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sealed_path_appends_extension() {
        assert_eq!(
            sealed_path(Path::new("/data/photo.png"), "enc"),
            PathBuf::from("/data/photo.png.enc")
        );
        assert_eq!(sealed_path(Path::new("README"), "enc"), PathBuf::from("README.enc"));
    }

    #[test]
    fn test_restored_path_uses_stored_name() {
        let meta = FileMetadata::new("photo.png", "image/png");
        assert_eq!(
            restored_path(Path::new("/data/blob.enc"), &meta),
            PathBuf::from("/data/photo.png")
        );
    }

    #[test]
    fn test_restored_path_strips_directories() {
        let meta = FileMetadata::new("../../etc/passwd", "text/plain");
        assert_eq!(
            restored_path(Path::new("/data/blob.enc"), &meta),
            PathBuf::from("/data/passwd")
        );

        let meta = FileMetadata::new("/abs/path/x.txt", "text/plain");
        assert_eq!(
            restored_path(Path::new("/data/blob.enc"), &meta),
            PathBuf::from("/data/x.txt")
        );
    }

    #[test]
    fn test_restored_path_falls_back_to_input_stem() {
        for bad in ["", ".", ".."] {
            let meta = FileMetadata::new(bad, "text/plain");
            assert_eq!(
                restored_path(Path::new("/data/notes.txt.enc"), &meta),
                PathBuf::from("/data/notes.txt"),
                "stored name {bad:?} must not be used"
            );
        }
    }

    #[test]
    fn test_metadata_for_guesses_type() {
        let meta = metadata_for(Path::new("/data/photo.png")).unwrap();
        assert_eq!(meta.name, "photo.png");
        assert_eq!(meta.content_type, "image/png");

        let meta = metadata_for(Path::new("/data/blob.unknownext")).unwrap();
        assert_eq!(meta.content_type, "application/octet-stream");
    }

    #[cfg(unix)]
    #[test]
    fn test_metadata_for_rejects_non_utf8_name() {
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/data/bad\xff.txt"));
        assert!(matches!(
            metadata_for(path),
            Err(FilesealError::NoInput(_))
        ));
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        assert_eq!(
            temp_path(Path::new("/data/a.txt.enc")),
            PathBuf::from("/data/.a.txt.enc.fileseal_tmp")
        );
    }

    #[tokio::test]
    async fn test_write_output_refuses_existing_without_force() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("out.bin");
        std::fs::write(&out, b"old").unwrap();

        let err = write_output(&out, b"new", false).await.unwrap_err();
        assert!(matches!(err, FilesealError::OutputExists(_)));
        assert_eq!(std::fs::read(&out).unwrap(), b"old");

        write_output(&out, b"new", true).await.unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"new");
        assert!(!temp_path(&out).exists());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("out.bin");
        // A directory in the temp file's place makes the write fail
        std::fs::create_dir(temp_path(&out)).unwrap();

        let err = write_output(&out, b"data", false).await.unwrap_err();
        assert!(matches!(err, FilesealError::Io(_)));
        assert!(!out.exists(), "claimed destination must be released");
    }

    #[tokio::test]
    async fn test_failed_forced_write_keeps_previous_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("out.bin");
        std::fs::write(&out, b"previous").unwrap();
        std::fs::create_dir(temp_path(&out)).unwrap();

        write_output(&out, b"data", true).await.unwrap_err();
        assert_eq!(std::fs::read(&out).unwrap(), b"previous");
    }

    #[tokio::test]
    async fn test_seal_file_failure_leaves_no_envelope() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = FilesealConfig {
            crypto: crate::config::CryptoConfig {
                pbkdf2_iterations: 1_000,
            },
            ..Default::default()
        };
        let src = tmp.path().join("a.txt");
        std::fs::write(&src, b"hello world").unwrap();
        let sealed = sealed_path(&src, "enc");
        std::fs::create_dir(temp_path(&sealed)).unwrap();

        let err = seal_file(&config, &src, None, SecretString::from("secret1"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, FilesealError::Io(_)));
        assert!(!sealed.exists());
    }
}

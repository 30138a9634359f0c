use fileseal_crypto::{KdfParams, DEFAULT_ITERATIONS};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FilesealError, FilesealResult};

/// Top-level configuration (loaded from fileseal.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesealConfig {
    pub crypto: CryptoConfig,
    pub policy: PolicyConfig,
    pub log: LogConfig,
}

/// Envelope key derivation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// PBKDF2-HMAC-SHA256 iterations (default: 100000).
    /// Not stored in the envelope: changing it makes existing files unreadable.
    pub pbkdf2_iterations: u32,
}

/// Caller-side input policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Minimum password length in characters (default: 6)
    pub min_password_len: usize,
    /// Extension marking encrypted artifacts, without the dot (default: "enc")
    pub encrypted_extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: warn)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_password_len: 6,
            encrypted_extension: "enc".into(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

impl CryptoConfig {
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            iterations: self.pbkdf2_iterations,
        }
    }
}

impl FilesealConfig {
    /// Load from a TOML file, falling back to defaults when the file is absent.
    pub async fn load(path: &Path) -> FilesealResult<Self> {
        if !path.exists() {
            tracing::debug!("config file not found: {}  (using defaults)", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        Self::from_toml(&content)
            .map_err(|e| FilesealError::Config(format!("{}: {e}", path.display())))
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> FilesealResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| FilesealError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FilesealResult<()> {
        if self.crypto.pbkdf2_iterations == 0 {
            return Err(FilesealError::Config(
                "crypto.pbkdf2_iterations must be at least 1".into(),
            ));
        }
        let ext = &self.policy.encrypted_extension;
        if ext.is_empty() || ext.contains('.') || ext.contains('/') {
            return Err(FilesealError::Config(format!(
                "policy.encrypted_extension must be a bare extension, got {ext:?}"
            )));
        }
        Ok(())
    }
}

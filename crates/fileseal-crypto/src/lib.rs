//! fileseal-crypto: password-based file envelope
//!
//! Pipeline: password + random salt → PBKDF2-HMAC-SHA256 → AES-256-GCM(random nonce) → envelope
//!
//! Envelope layout (binary, little-endian):
//! ```text
//! [4 bytes: metadata length L][L bytes: {"name","type"} JSON]
//! [16 bytes: salt][12 bytes: nonce][ciphertext + 16-byte GCM tag]
//! ```
//!
//! The envelope is self-describing: given the password, nothing else is
//! needed to decrypt it. The metadata prefix is cleartext and is not covered
//! by the GCM tag.

pub mod envelope;
pub mod error;
pub mod kdf;
pub mod open;
pub mod provider;
pub mod seal;

pub use envelope::{Envelope, FileMetadata};
pub use error::{CryptoError, CryptoResult};
pub use kdf::{derive_key, EnvelopeKey, KdfParams, DEFAULT_ITERATIONS};
pub use open::{decrypt, Decrypted};
pub use seal::encrypt;

/// Size of a derived AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of the PBKDF2 salt
pub const SALT_SIZE: usize = 16;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Size of the little-endian metadata length prefix
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Smallest buffer that can possibly be an envelope (prefix + salt + nonce)
pub const MIN_ENVELOPE_SIZE: usize = LENGTH_PREFIX_SIZE + SALT_SIZE + NONCE_SIZE;

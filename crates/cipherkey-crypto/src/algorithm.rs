//! Cipher algorithm resolution.
//!
//! Key material never talks to a cipher implementation directly. It asks an
//! [`AlgorithmRegistry`] for the sizes and chaining mode of a named cipher and
//! caches the answer in a [`CipherSpec`] for the rest of its lifetime.
//!
//! [`BuiltinRegistry`] carries the OpenSSL names and parameters for the common
//! block and stream ciphers.

use crate::{Error, Result};

/// Cipher mode of operation.
///
/// Determines how successive blocks are chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    /// Stream cipher, no block chaining.
    StreamCipher,
    /// Electronic codebook (plain concatenation).
    Ecb,
    /// Cipher block chaining.
    Cbc,
    /// Cipher feedback.
    Cfb,
    /// Output feedback.
    Ofb,
}

impl CipherMode {
    /// Check if this mode chains blocks through an IV.
    ///
    /// Stream ciphers may still take a nonce; that is reported through
    /// [`CipherSpec::iv_size`], not here.
    pub fn requires_iv(&self) -> bool {
        matches!(self, Self::Cbc | Self::Cfb | Self::Ofb)
    }

    /// Short lowercase name, as used in OpenSSL cipher names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StreamCipher => "stream",
            Self::Ecb => "ecb",
            Self::Cbc => "cbc",
            Self::Cfb => "cfb",
            Self::Ofb => "ofb",
        }
    }
}

/// Resolved parameters of one cipher algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherSpec {
    /// Canonical algorithm name.
    pub name: String,
    /// Key size in bytes.
    pub key_size: usize,
    /// IV size in bytes (0 when the cipher takes none).
    pub iv_size: usize,
    /// Block size in bytes (1 for stream ciphers and stream-like modes).
    pub block_size: usize,
    /// Mode of operation.
    pub mode: CipherMode,
}

impl CipherSpec {
    /// Total bytes of keying material this cipher consumes (key + IV).
    pub fn material_len(&self) -> usize {
        self.key_size + self.iv_size
    }
}

/// Resolves cipher names to their parameters.
///
/// Implementations must be deterministic for the lifetime of any key material
/// built from them; key material resolves exactly once and never asks again.
pub trait AlgorithmRegistry {
    /// Looks up `name`.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownAlgorithm` if the name is not known to this registry
    fn resolve(&self, name: &str) -> Result<CipherSpec>;
}

impl<T: AlgorithmRegistry + ?Sized> AlgorithmRegistry for &T {
    fn resolve(&self, name: &str) -> Result<CipherSpec> {
        (**self).resolve(name)
    }
}

// name, key, iv, block, mode
const BUILTIN_CIPHERS: &[(&str, usize, usize, usize, CipherMode)] = &[
    ("aes-128-ecb", 16, 0, 16, CipherMode::Ecb),
    ("aes-128-cbc", 16, 16, 16, CipherMode::Cbc),
    ("aes-128-cfb", 16, 16, 1, CipherMode::Cfb),
    ("aes-128-ofb", 16, 16, 1, CipherMode::Ofb),
    ("aes-192-ecb", 24, 0, 16, CipherMode::Ecb),
    ("aes-192-cbc", 24, 16, 16, CipherMode::Cbc),
    ("aes-192-cfb", 24, 16, 1, CipherMode::Cfb),
    ("aes-192-ofb", 24, 16, 1, CipherMode::Ofb),
    ("aes-256-ecb", 32, 0, 16, CipherMode::Ecb),
    ("aes-256-cbc", 32, 16, 16, CipherMode::Cbc),
    ("aes-256-cfb", 32, 16, 1, CipherMode::Cfb),
    ("aes-256-ofb", 32, 16, 1, CipherMode::Ofb),
    ("camellia-128-cbc", 16, 16, 16, CipherMode::Cbc),
    ("camellia-256-cbc", 32, 16, 16, CipherMode::Cbc),
    ("des-ecb", 8, 0, 8, CipherMode::Ecb),
    ("des-cbc", 8, 8, 8, CipherMode::Cbc),
    ("des-ede3", 24, 0, 8, CipherMode::Ecb),
    ("des-ede3-cbc", 24, 8, 8, CipherMode::Cbc),
    ("bf-ecb", 16, 0, 8, CipherMode::Ecb),
    ("bf-cbc", 16, 8, 8, CipherMode::Cbc),
    ("bf-cfb", 16, 8, 1, CipherMode::Cfb),
    ("bf-ofb", 16, 8, 1, CipherMode::Ofb),
    ("chacha20", 32, 16, 1, CipherMode::StreamCipher),
    ("rc4", 16, 0, 1, CipherMode::StreamCipher),
];

/// Static registry of common OpenSSL cipher names.
///
/// Lookup ignores ASCII case, so `AES-256-CBC` and `aes-256-cbc` resolve to
/// the same entry.
///
/// # Example
///
/// ```
/// use cipherkey_crypto::algorithm::{AlgorithmRegistry, BuiltinRegistry, CipherMode};
///
/// let spec = BuiltinRegistry.resolve("AES-256-CBC").unwrap();
/// assert_eq!(spec.key_size, 32);
/// assert_eq!(spec.iv_size, 16);
/// assert_eq!(spec.mode, CipherMode::Cbc);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRegistry;

impl BuiltinRegistry {
    /// All canonical names known to this registry.
    pub fn names() -> impl Iterator<Item = &'static str> {
        BUILTIN_CIPHERS.iter().map(|entry| entry.0)
    }
}

impl AlgorithmRegistry for BuiltinRegistry {
    fn resolve(&self, name: &str) -> Result<CipherSpec> {
        BUILTIN_CIPHERS
            .iter()
            .find(|entry| entry.0.eq_ignore_ascii_case(name))
            .map(|&(canonical, key_size, iv_size, block_size, mode)| CipherSpec {
                name: canonical.to_string(),
                key_size,
                iv_size,
                block_size,
                mode,
            })
            .ok_or_else(|| Error::UnknownAlgorithm(name.to_string()))
    }
}

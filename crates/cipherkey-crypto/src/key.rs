//! Cipher key material: algorithm parameters plus key and IV bytes.

use crate::algorithm::{AlgorithmRegistry, BuiltinRegistry, CipherMode, CipherSpec};
use crate::kdf::{KdfParams, PassphraseKeyDeriver};
use crate::library::LibraryGuard;
use crate::random::RandomKeyGenerator;
use crate::{Error, Result};
use rand::{CryptoRng, RngCore};
use std::fmt;
use zeroize::Zeroizing;

/// Key and IV for one named cipher.
///
/// The cipher is resolved once at construction and its sizes never change
/// afterwards. Key and IV always match those sizes: every constructor and
/// mutator checks lengths and rejects mismatches without touching the
/// current state.
///
/// Key material has a single owner and is passed by move. Both buffers are
/// wiped on drop.
///
/// # Example
///
/// ```
/// use cipherkey_crypto::{CipherMode, KeyMaterial};
///
/// let km = KeyMaterial::from_passphrase("aes-256-cbc", "correct horse", "battery", 1000).unwrap();
/// assert_eq!(km.mode(), CipherMode::Cbc);
/// assert_eq!(km.key().len(), km.key_size());
/// assert_eq!(km.iv().len(), km.iv_size());
/// ```
pub struct KeyMaterial {
    name: String,
    spec: CipherSpec,
    key: Zeroizing<Vec<u8>>,
    iv: Zeroizing<Vec<u8>>,
    _library: LibraryGuard,
}

impl KeyMaterial {
    /// Derives key and IV from a passphrase using the built-in registry and
    /// the default digest and salt format.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownAlgorithm` if `name` does not resolve
    /// - `Error::InvalidIterationCount` if `iterations` is 0
    pub fn from_passphrase(
        name: &str,
        passphrase: impl AsRef<[u8]>,
        salt: impl AsRef<[u8]>,
        iterations: u32,
    ) -> Result<Self> {
        Self::from_passphrase_with(
            &BuiltinRegistry,
            name,
            passphrase,
            salt,
            KdfParams::with_iterations(iterations),
        )
    }

    /// Derives key and IV from a passphrase with explicit registry and
    /// derivation parameters.
    pub fn from_passphrase_with(
        registry: &dyn AlgorithmRegistry,
        name: &str,
        passphrase: impl AsRef<[u8]>,
        salt: impl AsRef<[u8]>,
        params: KdfParams,
    ) -> Result<Self> {
        let deriver = PassphraseKeyDeriver::new(params)?;
        let spec = registry.resolve(name)?;
        let library = LibraryGuard::acquire();
        let (key, iv) = deriver.derive(&spec, passphrase.as_ref(), salt.as_ref())?;
        Ok(Self::assemble(name, spec, key, iv, library))
    }

    /// Wraps caller-supplied key and IV bytes for the named cipher.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownAlgorithm` if `name` does not resolve
    /// - `Error::InvalidKeyLength` / `Error::InvalidIvLength` on size mismatch
    pub fn from_parts(name: &str, key: &[u8], iv: &[u8]) -> Result<Self> {
        Self::from_parts_with(&BuiltinRegistry, name, key, iv)
    }

    /// Same as [`KeyMaterial::from_parts`] with an explicit registry.
    pub fn from_parts_with(
        registry: &dyn AlgorithmRegistry,
        name: &str,
        key: &[u8],
        iv: &[u8],
    ) -> Result<Self> {
        let spec = registry.resolve(name)?;
        check_len(key, spec.key_size).map_err(|actual| Error::InvalidKeyLength {
            expected: spec.key_size,
            actual,
        })?;
        check_len(iv, spec.iv_size).map_err(|actual| Error::InvalidIvLength {
            expected: spec.iv_size,
            actual,
        })?;
        let library = LibraryGuard::acquire();
        Ok(Self::assemble(
            name,
            spec,
            Zeroizing::new(key.to_vec()),
            Zeroizing::new(iv.to_vec()),
            library,
        ))
    }

    /// Generates key and IV from the operating system RNG.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownAlgorithm` if `name` does not resolve
    /// - `Error::RandomSourceUnavailable` if the RNG fails
    pub fn random(name: &str) -> Result<Self> {
        Self::random_with(&BuiltinRegistry, name, &mut RandomKeyGenerator::new())
    }

    /// Generates key and IV with an explicit registry and random source.
    pub fn random_with<R: RngCore + CryptoRng>(
        registry: &dyn AlgorithmRegistry,
        name: &str,
        generator: &mut RandomKeyGenerator<R>,
    ) -> Result<Self> {
        let spec = registry.resolve(name)?;
        let library = LibraryGuard::acquire();
        let (key, iv) = generator.generate(&spec)?;
        Ok(Self::assemble(name, spec, key, iv, library))
    }

    fn assemble(
        name: &str,
        spec: CipherSpec,
        key: Zeroizing<Vec<u8>>,
        iv: Zeroizing<Vec<u8>>,
        library: LibraryGuard,
    ) -> Self {
        debug_assert_eq!(key.len(), spec.key_size);
        debug_assert_eq!(iv.len(), spec.iv_size);
        tracing::debug!(
            cipher = %spec.name,
            mode = spec.mode.as_str(),
            key_size = spec.key_size,
            iv_size = spec.iv_size,
            "Key material ready"
        );
        Self {
            name: name.to_string(),
            spec,
            key,
            iv,
            _library: library,
        }
    }

    /// Cipher name exactly as given at construction.
    ///
    /// The registry's canonical spelling is available as `spec().name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mode of operation.
    pub fn mode(&self) -> CipherMode {
        self.spec.mode
    }

    /// Key size in bytes.
    pub fn key_size(&self) -> usize {
        self.spec.key_size
    }

    /// IV size in bytes.
    pub fn iv_size(&self) -> usize {
        self.spec.iv_size
    }

    /// Block size in bytes.
    pub fn block_size(&self) -> usize {
        self.spec.block_size
    }

    /// Cached resolution result.
    pub fn spec(&self) -> &CipherSpec {
        &self.spec
    }

    /// Current key.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Current IV.
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// Replaces the key.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidKeyLength` if `key.len() != self.key_size()`; the
    ///   previous key is kept
    pub fn set_key(&mut self, key: &[u8]) -> Result<()> {
        check_len(key, self.spec.key_size).map_err(|actual| Error::InvalidKeyLength {
            expected: self.spec.key_size,
            actual,
        })?;
        self.key = Zeroizing::new(key.to_vec());
        Ok(())
    }

    /// Replaces the IV.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidIvLength` if `iv.len() != self.iv_size()`; the
    ///   previous IV is kept
    pub fn set_iv(&mut self, iv: &[u8]) -> Result<()> {
        check_len(iv, self.spec.iv_size).map_err(|actual| Error::InvalidIvLength {
            expected: self.spec.iv_size,
            actual,
        })?;
        self.iv = Zeroizing::new(iv.to_vec());
        Ok(())
    }
}

fn check_len(buf: &[u8], expected: usize) -> core::result::Result<(), usize> {
    if buf.len() == expected {
        Ok(())
    } else {
        Err(buf.len())
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("name", &self.name)
            .field("spec", &self.spec)
            .field("key", &"<redacted>")
            .field("iv", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::{DigestAlgorithm, SaltFormat};
    use crate::library;

    #[test]
    fn test_from_parts_roundtrip() {
        let key = [0x11u8; 16];
        let iv = [0x22u8; 16];
        let km = KeyMaterial::from_parts("aes-128-cbc", &key, &iv).unwrap();
        assert_eq!(km.key(), &key);
        assert_eq!(km.iv(), &iv);
        assert_eq!(km.name(), "aes-128-cbc");
        assert_eq!(km.block_size(), 16);
    }

    #[test]
    fn test_name_kept_as_given() {
        let km = KeyMaterial::from_parts("AES-128-CBC", &[0u8; 16], &[0u8; 16]).unwrap();
        assert_eq!(km.name(), "AES-128-CBC");
        assert_eq!(km.spec().name, "aes-128-cbc");
    }

    #[test]
    fn test_from_parts_short_key() {
        let err = KeyMaterial::from_parts("aes-256-cbc", &[0u8; 31], &[0u8; 16]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidKeyLength {
                expected: 32,
                actual: 31
            }
        );
    }

    #[test]
    fn test_from_parts_wrong_iv() {
        let err = KeyMaterial::from_parts("aes-256-ecb", &[0u8; 32], &[0u8; 16]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidIvLength {
                expected: 0,
                actual: 16
            }
        );
    }

    #[test]
    fn test_unknown_algorithm() {
        let err = KeyMaterial::random("twofish-9000").unwrap_err();
        assert_eq!(err, Error::UnknownAlgorithm("twofish-9000".into()));
    }

    #[test]
    fn test_set_key_rejects_wrong_length() {
        let mut km = KeyMaterial::from_parts("des-cbc", &[1u8; 8], &[2u8; 8]).unwrap();
        let err = km.set_key(&[9u8; 7]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidKeyLength {
                expected: 8,
                actual: 7
            }
        );
        assert_eq!(km.key(), &[1u8; 8]);

        km.set_key(&[3u8; 8]).unwrap();
        assert_eq!(km.key(), &[3u8; 8]);
    }

    #[test]
    fn test_set_iv_rejects_wrong_length() {
        let mut km = KeyMaterial::from_parts("des-cbc", &[1u8; 8], &[2u8; 8]).unwrap();
        assert!(km.set_iv(&[]).is_err());
        assert!(km.set_iv(&[5u8; 9]).is_err());
        assert_eq!(km.iv(), &[2u8; 8]);

        km.set_iv(&[4u8; 8]).unwrap();
        assert_eq!(km.iv(), &[4u8; 8]);
    }

    #[test]
    fn test_from_passphrase_with_params() {
        let params = KdfParams {
            digest: DigestAlgorithm::Sha512,
            salt_format: SaltFormat::Raw,
            iterations: 1000,
        };
        let km = KeyMaterial::from_passphrase_with(
            &BuiltinRegistry,
            "aes-256-cbc",
            "correct horse",
            "battery",
            params,
        )
        .unwrap();
        assert_eq!(
            hex::encode(km.key()),
            "5369989461e110a068ce1d05cda12ccdd64b36660bcfd13bf5f795dd52792844"
        );
        assert_eq!(hex::encode(km.iv()), "6a7b8fda69178885ad9ead62e1df39d3");
    }

    #[test]
    fn test_zero_iterations() {
        let err = KeyMaterial::from_passphrase("aes-256-cbc", "pw", "salt", 0).unwrap_err();
        assert_eq!(err, Error::InvalidIterationCount(0));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let km = KeyMaterial::from_parts("rc4", &[0xabu8; 16], &[]).unwrap();
        let debug = format!("{:?}", km);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("171"));
        assert!(!debug.to_lowercase().contains("abab"));
    }

    #[test]
    fn test_holds_library_reference() {
        let km = KeyMaterial::random("aes-128-cbc").unwrap();
        assert!(library::is_initialized());
        drop(km);
    }
}

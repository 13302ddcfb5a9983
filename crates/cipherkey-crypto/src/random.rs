//! Secure random key and IV generation.

use crate::algorithm::CipherSpec;
use crate::kdf::KeyIvPair;
use crate::{Error, Result};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// Fills key and IV buffers from a cryptographically secure source.
///
/// Defaults to the operating system RNG. Any source failure is reported as
/// `Error::RandomSourceUnavailable`; there is no fallback source.
///
/// # Example
///
/// ```
/// use cipherkey_crypto::algorithm::{AlgorithmRegistry, BuiltinRegistry};
/// use cipherkey_crypto::random::RandomKeyGenerator;
///
/// let spec = BuiltinRegistry.resolve("chacha20").unwrap();
/// let (key, iv) = RandomKeyGenerator::new().generate(&spec).unwrap();
/// assert_eq!(key.len(), 32);
/// assert_eq!(iv.len(), 16);
/// ```
///
/// Generators cannot be cloned, so one seeded source never feeds two owners:
///
/// ```compile_fail
/// use cipherkey_crypto::random::RandomKeyGenerator;
///
/// let generator = RandomKeyGenerator::new();
/// let _copy = generator.clone();
/// ```
#[derive(Debug, Default)]
pub struct RandomKeyGenerator<R = OsRng> {
    rng: R,
}

impl RandomKeyGenerator<OsRng> {
    /// Creates a generator backed by `OsRng`.
    pub fn new() -> Self {
        Self { rng: OsRng }
    }
}

impl<R: RngCore + CryptoRng> RandomKeyGenerator<R> {
    /// Creates a generator backed by `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Draws `spec.key_size` key bytes and `spec.iv_size` IV bytes.
    ///
    /// # Errors
    ///
    /// - `Error::RandomSourceUnavailable` if the source cannot supply bytes
    pub fn generate(&mut self, spec: &CipherSpec) -> Result<KeyIvPair> {
        let key = self.random_bytes(spec.key_size)?;
        let iv = self.random_bytes(spec.iv_size)?;

        tracing::debug!(
            cipher = %spec.name,
            "Generated {} random key bytes and {} random IV bytes",
            spec.key_size,
            spec.iv_size
        );

        Ok((key, iv))
    }

    fn random_bytes(&mut self, count: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut buf = Zeroizing::new(vec![0u8; count]);
        self.rng.try_fill_bytes(&mut buf).map_err(|e| {
            tracing::warn!("Secure random source failed: {}", e);
            Error::RandomSourceUnavailable(e.to_string())
        })?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{AlgorithmRegistry, BuiltinRegistry};

    struct ExhaustedRng;

    impl RngCore for ExhaustedRng {
        fn next_u32(&mut self) -> u32 {
            unreachable!("only try_fill_bytes is used")
        }

        fn next_u64(&mut self) -> u64 {
            unreachable!("only try_fill_bytes is used")
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            unreachable!("only try_fill_bytes is used")
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> core::result::Result<(), rand::Error> {
            Err(rand::Error::new("entropy exhausted"))
        }
    }

    impl CryptoRng for ExhaustedRng {}

    #[test]
    fn test_generate_sizes() {
        let mut generator = RandomKeyGenerator::new();
        for name in BuiltinRegistry::names() {
            let spec = BuiltinRegistry.resolve(name).unwrap();
            let (key, iv) = generator.generate(&spec).unwrap();
            assert_eq!(key.len(), spec.key_size, "{}", name);
            assert_eq!(iv.len(), spec.iv_size, "{}", name);
        }
    }

    #[test]
    fn test_key_and_iv_independent() {
        let spec = BuiltinRegistry.resolve("aes-128-cbc").unwrap();
        let (key, iv) = RandomKeyGenerator::new().generate(&spec).unwrap();
        assert_ne!(&*key, &*iv);
    }

    #[test]
    fn test_source_failure_is_reported() {
        let spec = BuiltinRegistry.resolve("aes-256-cbc").unwrap();
        let err = RandomKeyGenerator::with_rng(ExhaustedRng)
            .generate(&spec)
            .unwrap_err();
        assert!(matches!(err, Error::RandomSourceUnavailable(_)));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let spec = BuiltinRegistry.resolve("aes-256-cbc").unwrap();
        let (key1, iv1) = RandomKeyGenerator::with_rng(StdRng::seed_from_u64(7))
            .generate(&spec)
            .unwrap();
        let (key2, iv2) = RandomKeyGenerator::with_rng(StdRng::seed_from_u64(7))
            .generate(&spec)
            .unwrap();
        assert_eq!(&*key1, &*key2);
        assert_eq!(&*iv1, &*iv2);
    }
}

//! Key and IV material for symmetric ciphers.
//!
//! This crate produces the key and initialization vector a block or stream
//! cipher needs, always sized exactly to what the cipher declares:
//! - Passphrase derivation (iterated SHA-2, `EVP_BytesToKey` construction)
//! - Secure random generation (`OsRng` by default)
//! - Caller-supplied key and IV, length-checked
//!
//! Cipher sizes come from an [`AlgorithmRegistry`]; [`BuiltinRegistry`] covers
//! the common OpenSSL cipher names.
//!
//! Security notes:
//! - All key and IV buffers use Zeroizing wrappers
//! - No logging of key material
//! - No fallback to non-secure randomness

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod algorithm;
pub mod error;
pub mod kdf;
pub mod key;
pub mod library;
pub mod random;

pub use algorithm::{AlgorithmRegistry, BuiltinRegistry, CipherMode, CipherSpec};
pub use error::{Error, Result};
pub use kdf::{KdfParams, PassphraseKeyDeriver, DEFAULT_ITERATION_COUNT};
pub use key::KeyMaterial;
pub use random::RandomKeyGenerator;

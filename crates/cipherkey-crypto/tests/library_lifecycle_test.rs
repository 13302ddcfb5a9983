//! Library reference counting across KeyMaterial lifetimes.
//!
//! Kept as the only test in this binary: the reference count is process-wide
//! and other tests running in parallel would hold references of their own.

use cipherkey_crypto::library::{active_references, is_initialized};
use cipherkey_crypto::{Error, KeyMaterial};

#[test]
fn test_library_lives_exactly_as_long_as_key_material() {
    assert!(!is_initialized(), "nothing holds the library yet");

    // Failed constructions never initialize the library.
    let err = KeyMaterial::random("no-such-cipher").unwrap_err();
    assert!(matches!(err, Error::UnknownAlgorithm(_)));
    let err = KeyMaterial::from_parts("aes-128-cbc", &[0u8; 15], &[0u8; 16]).unwrap_err();
    assert!(matches!(err, Error::InvalidKeyLength { .. }));
    assert_eq!(active_references(), 0);

    let first = KeyMaterial::random("aes-128-cbc").unwrap();
    let second = KeyMaterial::from_passphrase("des-cbc", "pw", "salt", 10).unwrap();
    assert_eq!(active_references(), 2);

    // Release order does not matter.
    drop(first);
    assert!(is_initialized());
    assert_eq!(active_references(), 1);

    drop(second);
    assert!(!is_initialized(), "last key material released the library");
    assert_eq!(active_references(), 0);
}

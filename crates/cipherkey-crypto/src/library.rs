//! Process-wide crypto library lifecycle.
//!
//! The library is considered initialized while at least one [`LibraryGuard`]
//! is alive. Guards are reference counted; the first acquisition runs
//! initialization and dropping the last one runs teardown. Independent guards
//! may be created and dropped in any order.
//!
//! Every [`KeyMaterial`](crate::KeyMaterial) holds one guard, so the library
//! stays up exactly as long as some key material exists.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

static REFERENCES: AtomicUsize = AtomicUsize::new(0);

// Serializes the 0 <-> 1 transitions so init and teardown never interleave.
static TRANSITION: Mutex<()> = Mutex::new(());

/// Scoped reference to the crypto library.
///
/// # Example
///
/// ```
/// use cipherkey_crypto::library::{self, LibraryGuard};
///
/// let guard = LibraryGuard::acquire();
/// assert!(library::is_initialized());
/// drop(guard);
/// ```
#[derive(Debug)]
#[must_use = "the library is released as soon as the guard is dropped"]
pub struct LibraryGuard {
    _private: (),
}

impl LibraryGuard {
    /// Takes a reference, initializing the library if this is the first one.
    pub fn acquire() -> Self {
        let _lock = TRANSITION.lock().unwrap_or_else(|e| e.into_inner());
        if REFERENCES.fetch_add(1, Ordering::AcqRel) == 0 {
            tracing::info!("Crypto library initialized");
        }
        Self { _private: () }
    }
}

impl Drop for LibraryGuard {
    fn drop(&mut self) {
        let _lock = TRANSITION.lock().unwrap_or_else(|e| e.into_inner());
        if REFERENCES.fetch_sub(1, Ordering::AcqRel) == 1 {
            tracing::info!("Crypto library torn down");
        }
    }
}

/// Returns true while at least one guard is alive.
pub fn is_initialized() -> bool {
    active_references() > 0
}

/// Number of live guards.
pub fn active_references() -> usize {
    REFERENCES.load(Ordering::Acquire)
}

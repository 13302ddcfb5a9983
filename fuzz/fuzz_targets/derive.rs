#![no_main]

use cipherkey_crypto::{BuiltinRegistry, KeyMaterial};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the cipher, second the iteration count, rest splits
    // into passphrase and salt. Sizes must always match the cipher.
    if data.len() < 2 {
        return;
    }
    let names: Vec<_> = BuiltinRegistry::names().collect();
    let name = names[data[0] as usize % names.len()];
    let iterations = u32::from(data[1] % 8);
    let (passphrase, salt) = data[2..].split_at((data.len() - 2) / 2);

    match KeyMaterial::from_passphrase(name, passphrase, salt, iterations) {
        Ok(km) => {
            assert_eq!(km.key().len(), km.key_size());
            assert_eq!(km.iv().len(), km.iv_size());
        }
        Err(_) => assert_eq!(iterations, 0),
    }
});

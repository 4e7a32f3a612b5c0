//! Random material for human-transcribable tokens.
//!
//! Always drawn from the operating system CSPRNG; license keys and recovery
//! codes are bearer credentials.

use rand::rngs::OsRng;
use rand::{Rng, RngCore};

/// `n_bytes` random bytes rendered as upper-case hex (`2 * n_bytes` chars).
pub fn random_hex_upper(n_bytes: usize) -> String {
    let mut bytes = vec![0u8; n_bytes];
    OsRng.fill_bytes(&mut bytes);
    hex::encode_upper(bytes)
}

/// `count` symbols drawn uniformly from `alphabet`.
///
/// Returns an empty string for an empty alphabet.
pub fn random_symbols(alphabet: &[u8], count: usize) -> String {
    if alphabet.is_empty() {
        return String::new();
    }
    (0..count)
        .map(|_| char::from(alphabet[OsRng.gen_range(0..alphabet.len())]))
        .collect()
}

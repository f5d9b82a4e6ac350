//! # Auth Secrets
//!
//! Secrets are opaque byte strings. Generated ones are alphanumeric so they
//! survive JSON and header transport unescaped.

use rand::distributions::Alphanumeric;
use rand::Rng;
use subtle::ConstantTimeEq;

/// Length of a generated secret.
pub const SECRET_LEN: usize = 50;

/// Generate a fresh secret from the thread-local CSPRNG.
pub fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LEN)
        .map(char::from)
        .collect()
}

/// Constant-time comparison of two secrets.
///
/// Both sides are padded to the longer length with distinct fill bytes so
/// the content comparison never short-circuits on a length mismatch.
pub fn secrets_match(stored: &[u8], supplied: &[u8]) -> bool {
    let max_len = std::cmp::max(stored.len(), supplied.len());

    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..stored.len()].copy_from_slice(stored);
    b_padded[..supplied.len()].copy_from_slice(supplied);

    let lengths_equal = stored.len().ct_eq(&supplied.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}

//! Secure random number generation.
//!
//! Every random value in the crate (X25519 private keys, P-256 scalars, CTR
//! nonces) comes from the operating system's entropy source through
//! [`SecureRandom`].

use num_bigint::{BigUint, RandBigInt};
use rand::RngCore;
use rand_core::OsRng;

/// Cryptographically secure random number generator.
///
/// Wraps the OS-provided entropy source (e.g., /dev/urandom on Unix,
/// BCryptGenRandom on Windows).
pub struct SecureRandom;

impl SecureRandom {
    /// Fill a buffer with cryptographically secure random bytes.
    pub fn fill(dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }

    /// Generate a fixed-size array of random bytes.
    pub fn bytes<const N: usize>() -> [u8; N] {
        let mut buf = [0u8; N];
        OsRng.fill_bytes(&mut buf);
        buf
    }

    /// Generate a random u64.
    pub fn u64() -> u64 {
        OsRng.next_u64()
    }

    /// Draw an integer uniformly from `[low, high)`.
    ///
    /// Panics if `low >= high`; callers pass fixed curve bounds.
    pub fn biguint_range(low: &BigUint, high: &BigUint) -> BigUint {
        OsRng.gen_biguint_range(low, high)
    }
}

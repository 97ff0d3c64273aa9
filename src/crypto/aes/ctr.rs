//! Counter mode.
//!
//! The counter block is `nonce (8 bytes) || counter (8 bytes, big-endian)`.
//! The counter wraps modulo 2^64 and never carries into the nonce half.
//! Encryption and decryption are the same keystream XOR, and no padding is
//! applied.

use super::{Aes128, Block, BLOCK_SIZE, NONCE_SIZE};
use crate::error::Result;

/// AES-128 in counter mode bound to one key and nonce.
///
/// Every call to [`apply_keystream`](Self::apply_keystream) restarts from the
/// initial counter, so reusing an `AesCtr` for two different messages reuses
/// keystream.
#[derive(Debug, Clone)]
pub struct AesCtr {
    cipher: Aes128,
    nonce: [u8; NONCE_SIZE],
    initial_counter: u64,
}

impl AesCtr {
    /// Bind a 16-byte key and an 8-byte nonce. The counter starts at zero.
    pub fn new(key: &[u8], nonce: &[u8; NONCE_SIZE]) -> Result<Self> {
        Ok(Self {
            cipher: Aes128::new(key)?,
            nonce: *nonce,
            initial_counter: 0,
        })
    }

    /// Start the counter at `counter` instead of zero.
    pub fn with_initial_counter(mut self, counter: u64) -> Self {
        self.initial_counter = counter;
        self
    }

    /// The nonce half of the counter block.
    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    /// Encrypt the counter block for `counter`.
    pub fn keystream_block(&self, counter: u64) -> Block {
        let mut block = [0u8; BLOCK_SIZE];
        block[..NONCE_SIZE].copy_from_slice(&self.nonce);
        block[NONCE_SIZE..].copy_from_slice(&counter.to_be_bytes());
        self.cipher.encrypt_block(&mut block);
        block
    }

    /// XOR the keystream into `data`. The final partial block uses a
    /// truncated keystream block.
    pub fn apply_keystream(&self, data: &mut [u8]) {
        let mut counter = self.initial_counter;
        for chunk in data.chunks_mut(BLOCK_SIZE) {
            let keystream = self.keystream_block(counter);
            for (byte, key) in chunk.iter_mut().zip(keystream.iter()) {
                *byte ^= key;
            }
            counter = counter.wrapping_add(1);
        }
    }

    /// Return `data` XORed with the keystream.
    pub fn process(&self, data: &[u8]) -> Vec<u8> {
        let mut output = data.to_vec();
        self.apply_keystream(&mut output);
        output
    }
}

/// Encrypt `plaintext` with the counter starting at zero.
pub fn encrypt(plaintext: &[u8], key: &[u8], nonce: &[u8; NONCE_SIZE]) -> Result<Vec<u8>> {
    Ok(AesCtr::new(key, nonce)?.process(plaintext))
}

/// Decrypt `ciphertext`; identical to [`encrypt`].
pub fn decrypt(ciphertext: &[u8], key: &[u8], nonce: &[u8; NONCE_SIZE]) -> Result<Vec<u8>> {
    encrypt(ciphertext, key, nonce)
}

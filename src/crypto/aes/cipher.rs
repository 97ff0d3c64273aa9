//! AES-128 round transforms and key schedule.
//!
//! The state is a 16-byte block read as a 4x4 matrix in column-major order:
//! byte `4 * c + r` sits in row `r`, column `c`.

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::tables::{gf_mul, INV_SBOX, MUL2, MUL3, RCON, SBOX};
use super::{Block, BLOCK_SIZE, KEY_SIZE, ROUNDS};
use crate::error::{Error, Result};

/// Expanded key schedule: one 16-byte round key per round plus the initial one.
pub type RoundKeys = [[u8; BLOCK_SIZE]; ROUNDS + 1];

/// Apply the S-box to every byte of the state.
pub fn substitute_bytes(state: &mut Block) {
    for byte in state.iter_mut() {
        *byte = SBOX[*byte as usize];
    }
}

/// Apply the inverse S-box to every byte of the state.
pub fn inverse_substitute_bytes(state: &mut Block) {
    for byte in state.iter_mut() {
        *byte = INV_SBOX[*byte as usize];
    }
}

/// Rotate row `r` left by `r` positions.
pub fn shift_rows(state: &mut Block) {
    let input = *state;
    for c in 0..4 {
        for r in 0..4 {
            state[4 * c + r] = input[4 * ((c + r) % 4) + r];
        }
    }
}

/// Rotate row `r` right by `r` positions.
pub fn inverse_shift_rows(state: &mut Block) {
    let input = *state;
    for c in 0..4 {
        for r in 0..4 {
            state[4 * c + r] = input[4 * ((c + 4 - r) % 4) + r];
        }
    }
}

/// Multiply every column by `{02}x^0 + {01}x^1 + {01}x^2 + {03}x^3` modulo `x^4 + 1`.
pub fn mix_columns(state: &mut Block) {
    for column in state.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [column[0], column[1], column[2], column[3]];
        let (m0, m1, m2, m3) = (a0 as usize, a1 as usize, a2 as usize, a3 as usize);
        column[0] = MUL2[m0] ^ MUL3[m1] ^ a2 ^ a3;
        column[1] = a0 ^ MUL2[m1] ^ MUL3[m2] ^ a3;
        column[2] = a0 ^ a1 ^ MUL2[m2] ^ MUL3[m3];
        column[3] = MUL3[m0] ^ a1 ^ a2 ^ MUL2[m3];
    }
}

/// Inverse of [`mix_columns`], using the `{0e, 0b, 0d, 09}` matrix.
pub fn inverse_mix_columns(state: &mut Block) {
    for column in state.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [column[0], column[1], column[2], column[3]];
        column[0] = gf_mul(a0, 14) ^ gf_mul(a1, 11) ^ gf_mul(a2, 13) ^ gf_mul(a3, 9);
        column[1] = gf_mul(a0, 9) ^ gf_mul(a1, 14) ^ gf_mul(a2, 11) ^ gf_mul(a3, 13);
        column[2] = gf_mul(a0, 13) ^ gf_mul(a1, 9) ^ gf_mul(a2, 14) ^ gf_mul(a3, 11);
        column[3] = gf_mul(a0, 11) ^ gf_mul(a1, 13) ^ gf_mul(a2, 9) ^ gf_mul(a3, 14);
    }
}

/// XOR a round key into the state.
pub fn add_round_key(state: &mut Block, round_key: &[u8; BLOCK_SIZE]) {
    for (byte, key) in state.iter_mut().zip(round_key.iter()) {
        *byte ^= key;
    }
}

/// Rijndael key schedule for a 128-bit key.
///
/// Produces 44 four-byte words grouped into 11 round keys. Every fourth word
/// is rotated, run through the S-box and XORed with the round constant before
/// being combined with the word four positions back.
pub fn expand_key(key: &[u8; KEY_SIZE]) -> RoundKeys {
    let mut words = [[0u8; 4]; 4 * (ROUNDS + 1)];
    for (i, word) in words.iter_mut().take(4).enumerate() {
        word.copy_from_slice(&key[4 * i..4 * i + 4]);
    }

    for i in 4..words.len() {
        let mut temp = words[i - 1];
        if i % 4 == 0 {
            temp.rotate_left(1);
            for byte in temp.iter_mut() {
                *byte = SBOX[*byte as usize];
            }
            temp[0] ^= RCON[i / 4];
        }
        for j in 0..4 {
            words[i][j] = words[i - 4][j] ^ temp[j];
        }
    }

    let mut round_keys = [[0u8; BLOCK_SIZE]; ROUNDS + 1];
    for (round, round_key) in round_keys.iter_mut().enumerate() {
        for w in 0..4 {
            round_key[4 * w..4 * w + 4].copy_from_slice(&words[4 * round + w]);
        }
    }
    words.zeroize();
    round_keys
}

/// Encrypt a single block in place with an expanded key.
pub fn encrypt_block(state: &mut Block, round_keys: &RoundKeys) {
    add_round_key(state, &round_keys[0]);
    for round_key in &round_keys[1..ROUNDS] {
        substitute_bytes(state);
        shift_rows(state);
        mix_columns(state);
        add_round_key(state, round_key);
    }
    substitute_bytes(state);
    shift_rows(state);
    add_round_key(state, &round_keys[ROUNDS]);
}

/// Decrypt a single block in place with an expanded key.
pub fn decrypt_block(state: &mut Block, round_keys: &RoundKeys) {
    add_round_key(state, &round_keys[ROUNDS]);
    for round_key in round_keys[1..ROUNDS].iter().rev() {
        inverse_shift_rows(state);
        inverse_substitute_bytes(state);
        add_round_key(state, round_key);
        inverse_mix_columns(state);
    }
    inverse_shift_rows(state);
    inverse_substitute_bytes(state);
    add_round_key(state, &round_keys[0]);
}

/// AES-128 block cipher with its key schedule expanded once.
///
/// The schedule is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Aes128 {
    round_keys: RoundKeys,
}

impl Aes128 {
    /// Create a cipher from a 16-byte key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Length`] if `key` is not exactly 16 bytes.
    pub fn new(key: &[u8]) -> Result<Self> {
        let key: &[u8; KEY_SIZE] = key
            .try_into()
            .map_err(|_| Error::length("AES key", KEY_SIZE, key.len()))?;
        Ok(Self {
            round_keys: expand_key(key),
        })
    }

    /// Encrypt one block in place.
    pub fn encrypt_block(&self, block: &mut Block) {
        encrypt_block(block, &self.round_keys);
    }

    /// Decrypt one block in place.
    pub fn decrypt_block(&self, block: &mut Block) {
        decrypt_block(block, &self.round_keys);
    }

    /// Access the expanded schedule (for diagnostics and tests).
    pub fn round_keys(&self) -> &RoundKeys {
        &self.round_keys
    }
}

impl std::fmt::Debug for Aes128 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aes128").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(hex_str: &str) -> Block {
        hex::decode(hex_str).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_key_expansion_fips197_a1() {
        let key = block("2b7e151628aed2a6abf7158809cf4f3c");
        let round_keys = expand_key(&key);

        assert_eq!(round_keys[0], key);
        assert_eq!(round_keys[1], block("a0fafe1788542cb123a339392a6c7605"));
        assert_eq!(round_keys[10], block("d014f9a8c9ee2589e13f0cc8b6630ca6"));
    }

    #[test]
    fn test_shift_rows_layout() {
        let identity: Block = std::array::from_fn(|i| i as u8);
        let mut state = identity;
        shift_rows(&mut state);
        assert_eq!(
            state,
            [0, 5, 10, 15, 4, 9, 14, 3, 8, 13, 2, 7, 12, 1, 6, 11]
        );

        inverse_shift_rows(&mut state);
        assert_eq!(state, identity);
    }

    #[test]
    fn test_mix_columns_known_column() {
        // Standard MixColumns example column: db 13 53 45 -> 8e 4d a1 bc
        let mut state = block("db135345f20a225c01010101c6c6c6c6");
        mix_columns(&mut state);
        assert_eq!(state, block("8e4da1bc9fdc589d01010101c6c6c6c6"));

        inverse_mix_columns(&mut state);
        assert_eq!(state, block("db135345f20a225c01010101c6c6c6c6"));
    }

    #[test]
    fn test_substitute_bytes_inverse() {
        let original: Block = std::array::from_fn(|i| (i * 17) as u8);
        let mut state = original;
        substitute_bytes(&mut state);
        assert_ne!(state, original);
        inverse_substitute_bytes(&mut state);
        assert_eq!(state, original);
    }

    #[test]
    fn test_fips197_appendix_c1() {
        let cipher = Aes128::new(&block("000102030405060708090a0b0c0d0e0f")).unwrap();
        let mut state = block("00112233445566778899aabbccddeeff");

        cipher.encrypt_block(&mut state);
        assert_eq!(state, block("69c4e0d86a7b0430d8cdb78070b4c55a"));

        cipher.decrypt_block(&mut state);
        assert_eq!(state, block("00112233445566778899aabbccddeeff"));
    }

    #[test]
    fn test_fips197_appendix_b() {
        let cipher = Aes128::new(&block("2b7e151628aed2a6abf7158809cf4f3c")).unwrap();
        let mut state = block("3243f6a8885a308d313198a2e0370734");

        cipher.encrypt_block(&mut state);
        assert_eq!(state, block("3925841d02dc09fbdc118597196a0b32"));
    }

    #[test]
    fn test_rejects_wrong_key_length() {
        for len in [0usize, 15, 17, 24, 32] {
            let err = Aes128::new(&vec![0u8; len]).unwrap_err();
            assert_eq!(err, Error::length("AES key", 16, len));
        }
    }
}

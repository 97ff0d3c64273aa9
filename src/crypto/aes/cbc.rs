//! Cipher Block Chaining mode.
//!
//! Each padded plaintext block is XORed with the previous ciphertext block
//! (the IV for the first one) before encryption. Corrupting one ciphertext
//! block garbles that plaintext block and flips the same bits in the next.

use super::padding::{pad, unpad};
use super::{load_block, xor_block, Aes128, Block, BLOCK_SIZE};
use crate::error::{Error, Result};

/// PKCS#7-pad and encrypt `plaintext` under `key` with the given IV.
pub fn encrypt(plaintext: &[u8], key: &[u8], iv: &Block) -> Result<Vec<u8>> {
    let cipher = Aes128::new(key)?;
    let mut data = pad(plaintext);
    let mut previous = *iv;

    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        let mut block = load_block(chunk);
        xor_block(&mut block, &previous);
        cipher.encrypt_block(&mut block);
        chunk.copy_from_slice(&block);
        previous = block;
    }
    Ok(data)
}

/// Decrypt `ciphertext` and strip the padding.
///
/// # Errors
///
/// [`Error::Length`] for a key that is not 16 bytes, [`Error::Alignment`] when
/// the ciphertext is not a whole number of blocks.
pub fn decrypt(ciphertext: &[u8], key: &[u8], iv: &Block) -> Result<Vec<u8>> {
    let cipher = Aes128::new(key)?;
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::Alignment {
            block: BLOCK_SIZE,
            actual: ciphertext.len(),
        });
    }

    let mut data = Vec::with_capacity(ciphertext.len());
    let mut previous = *iv;

    for chunk in ciphertext.chunks_exact(BLOCK_SIZE) {
        let encrypted = load_block(chunk);
        let mut block = encrypted;
        cipher.decrypt_block(&mut block);
        xor_block(&mut block, &previous);
        data.extend_from_slice(&block);
        previous = encrypted;
    }
    Ok(unpad(&data))
}

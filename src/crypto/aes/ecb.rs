//! Electronic Codebook mode.
//!
//! Every padded block is encrypted independently, so equal plaintext blocks
//! give equal ciphertext blocks. Kept for interoperability and testing.

use super::padding::{pad, unpad};
use super::{load_block, Aes128, BLOCK_SIZE};
use crate::error::{Error, Result};

/// PKCS#7-pad `plaintext` and encrypt it block by block.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes128::new(key)?;
    let mut data = pad(plaintext);
    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        let mut block = load_block(chunk);
        cipher.encrypt_block(&mut block);
        chunk.copy_from_slice(&block);
    }
    Ok(data)
}

/// Decrypt block by block and strip the padding.
///
/// # Errors
///
/// [`Error::Length`] for a key that is not 16 bytes, [`Error::Alignment`] when
/// the ciphertext is not a whole number of blocks.
pub fn decrypt(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes128::new(key)?;
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::Alignment {
            block: BLOCK_SIZE,
            actual: ciphertext.len(),
        });
    }

    let mut data = ciphertext.to_vec();
    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        let mut block = load_block(chunk);
        cipher.decrypt_block(&mut block);
        chunk.copy_from_slice(&block);
    }
    Ok(unpad(&data))
}

//! AES-128 block cipher and the ECB, CBC and CTR modes built on it.

mod cipher;
pub mod cbc;
pub mod ctr;
pub mod ecb;
mod padding;
mod tables;

pub use cipher::{
    add_round_key, decrypt_block, encrypt_block, expand_key, inverse_mix_columns,
    inverse_shift_rows, inverse_substitute_bytes, mix_columns, shift_rows, substitute_bytes,
    Aes128, RoundKeys,
};
pub use ctr::AesCtr;
pub use padding::{pad, unpad};
pub use tables::{gf_mul, INV_SBOX, SBOX};

/// Block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// AES-128 key size in bytes.
pub const KEY_SIZE: usize = 16;

/// Number of rounds for a 128-bit key.
pub const ROUNDS: usize = 10;

/// CTR nonce size in bytes; the other half of the counter block is the counter.
pub const NONCE_SIZE: usize = 8;

/// One 16-byte cipher block.
pub type Block = [u8; BLOCK_SIZE];

/// Copy a block-sized chunk into an owned block.
///
/// Callers pass chunks from `chunks_exact(BLOCK_SIZE)`; a shorter chunk is
/// zero-extended.
pub(crate) fn load_block(chunk: &[u8]) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    let len = chunk.len().min(BLOCK_SIZE);
    block[..len].copy_from_slice(&chunk[..len]);
    block
}

pub(crate) fn xor_block(block: &mut Block, other: &Block) {
    for (a, b) in block.iter_mut().zip(other) {
        *a ^= b;
    }
}

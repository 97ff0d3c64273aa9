//! PKCS#7 padding for the block modes.
//!
//! Unpadding is lenient: malformed padding leaves the data untouched and is
//! never reported as an error. There is no integrity check behind ECB/CBC, so
//! callers must not treat a successful unpad as proof of anything.

use super::BLOCK_SIZE;

/// Append PKCS#7 padding, always adding between 1 and 16 bytes.
pub fn pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - (data.len() % BLOCK_SIZE);
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad_len, pad_len as u8);
    padded
}

/// Strip PKCS#7 padding.
///
/// Returns the input unchanged when the final byte is 0, exceeds 16, exceeds
/// the data length, or when the claimed padding bytes are not all equal.
pub fn unpad(data: &[u8]) -> Vec<u8> {
    match padding_len(data) {
        Some(len) => data[..data.len() - len].to_vec(),
        None => {
            if !data.is_empty() {
                tracing::warn!(
                    len = data.len(),
                    "malformed PKCS#7 padding, returning data unchanged"
                );
            }
            data.to_vec()
        }
    }
}

fn padding_len(data: &[u8]) -> Option<usize> {
    let last = *data.last()?;
    let len = last as usize;
    if len == 0 || len > BLOCK_SIZE || len > data.len() {
        return None;
    }
    data[data.len() - len..]
        .iter()
        .all(|&b| b == last)
        .then_some(len)
}

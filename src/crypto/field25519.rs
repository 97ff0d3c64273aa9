//! Arithmetic in GF(2^255 - 19).
//!
//! Elements are five unsigned 51-bit limbs, little-endian:
//! `value = l0 + l1*2^51 + l2*2^102 + l3*2^153 + l4*2^204`.
//! Limbs may exceed 51 bits by a few bits between operations; every
//! operation leaves them below 2^52. Only [`FieldElement::to_bytes`]
//! produces the canonical value in `[0, p)`.
//!
//! No operation branches on secret data.

use zeroize::Zeroize;

const MASK51: u64 = (1 << 51) - 1;

/// `2 * p` split into limbs, added before subtracting so limbs stay non-negative.
const TWO_P: [u64; 5] = [
    0xF_FFFF_FFFF_FFDA,
    0xF_FFFF_FFFF_FFFE,
    0xF_FFFF_FFFF_FFFE,
    0xF_FFFF_FFFF_FFFE,
    0xF_FFFF_FFFF_FFFE,
];

/// `p - 2` as little-endian bytes, the Fermat inversion exponent.
const P_MINUS_2: [u8; 32] = [
    0xeb, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f,
];

/// An element of GF(2^255 - 19).
#[derive(Clone, Copy, Debug, Default, Zeroize)]
pub struct FieldElement([u64; 5]);

impl FieldElement {
    pub const ZERO: Self = Self([0; 5]);
    pub const ONE: Self = Self([1, 0, 0, 0, 0]);

    /// Decode 32 little-endian bytes. Bit 255 is ignored.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        let load = |offset: usize| -> u64 {
            let mut word = [0u8; 8];
            word.copy_from_slice(&bytes[offset..offset + 8]);
            u64::from_le_bytes(word)
        };

        Self([
            load(0) & MASK51,
            (load(6) >> 3) & MASK51,
            (load(12) >> 6) & MASK51,
            (load(19) >> 1) & MASK51,
            (load(24) >> 12) & MASK51,
        ])
    }

    /// Encode the canonical representative as 32 little-endian bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut h = carry(self.0);

        // q = 1 iff h >= p, found by propagating the carry of h + 19.
        let mut q = (h[0] + 19) >> 51;
        for limb in &h[1..] {
            q = (limb + q) >> 51;
        }

        h[0] += 19 * q;
        for i in 0..4 {
            h[i + 1] += h[i] >> 51;
            h[i] &= MASK51;
        }
        h[4] &= MASK51;

        let words = [
            h[0] | (h[1] << 51),
            (h[1] >> 13) | (h[2] << 38),
            (h[2] >> 26) | (h[3] << 25),
            (h[3] >> 39) | (h[4] << 12),
        ];

        let mut out = [0u8; 32];
        for (chunk, word) in out.chunks_exact_mut(8).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }

    pub fn add(&self, other: &Self) -> Self {
        let mut h = [0u64; 5];
        for (i, limb) in h.iter_mut().enumerate() {
            *limb = self.0[i] + other.0[i];
        }
        Self(carry(h))
    }

    pub fn sub(&self, other: &Self) -> Self {
        let mut h = [0u64; 5];
        for (i, limb) in h.iter_mut().enumerate() {
            *limb = (self.0[i] + TWO_P[i]) - other.0[i];
        }
        Self(carry(h))
    }

    /// Schoolbook product; terms landing past limb 4 wrap around times 19.
    pub fn mul(&self, other: &Self) -> Self {
        let a = self.0.map(u128::from);
        let b = other.0.map(u128::from);
        let b19 = other.0.map(|limb| u128::from(limb * 19));

        let t = [
            a[0] * b[0] + a[1] * b19[4] + a[2] * b19[3] + a[3] * b19[2] + a[4] * b19[1],
            a[0] * b[1] + a[1] * b[0] + a[2] * b19[4] + a[3] * b19[3] + a[4] * b19[2],
            a[0] * b[2] + a[1] * b[1] + a[2] * b[0] + a[3] * b19[4] + a[4] * b19[3],
            a[0] * b[3] + a[1] * b[2] + a[2] * b[1] + a[3] * b[0] + a[4] * b19[4],
            a[0] * b[4] + a[1] * b[3] + a[2] * b[2] + a[3] * b[1] + a[4] * b[0],
        ];
        Self(carry_wide(t))
    }

    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Multiply by a small constant such as `a24 = 121665`.
    pub fn mul_small(&self, k: u32) -> Self {
        let t = self.0.map(|limb| u128::from(limb) * u128::from(k));
        Self(carry_wide(t))
    }

    /// `self^(p-2)`, which is the inverse for non-zero elements and zero for zero.
    ///
    /// The exponent is public, so the square-and-multiply schedule is fixed.
    pub fn invert(&self) -> Self {
        let mut result = Self::ONE;
        for bit in (0..255).rev() {
            result = result.square();
            if (P_MINUS_2[bit / 8] >> (bit % 8)) & 1 == 1 {
                result = result.mul(self);
            }
        }
        result
    }

    /// Swap `a` and `b` when `choice` is 1, leave them when it is 0.
    ///
    /// The swap is `dummy = mask & (a ^ b)` applied to both sides, so the
    /// same instructions run either way.
    pub fn conditional_swap(a: &mut Self, b: &mut Self, choice: u8) {
        let mask = 0u64.wrapping_sub(u64::from(choice & 1));
        for i in 0..5 {
            let dummy = mask & (a.0[i] ^ b.0[i]);
            a.0[i] ^= dummy;
            b.0[i] ^= dummy;
        }
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for FieldElement {}

fn carry(mut h: [u64; 5]) -> [u64; 5] {
    for i in 0..4 {
        h[i + 1] += h[i] >> 51;
        h[i] &= MASK51;
    }
    h[0] += 19 * (h[4] >> 51);
    h[4] &= MASK51;
    h[1] += h[0] >> 51;
    h[0] &= MASK51;
    h
}

fn carry_wide(mut t: [u128; 5]) -> [u64; 5] {
    for i in 0..4 {
        t[i + 1] += t[i] >> 51;
        t[i] &= u128::from(MASK51);
    }
    let overflow = t[4] >> 51;
    t[4] &= u128::from(MASK51);
    t[0] += overflow * 19;
    t[1] += t[0] >> 51;
    t[0] &= u128::from(MASK51);

    t.map(|limb| limb as u64)
}

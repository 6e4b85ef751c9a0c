//! Packed bit vectors for GF(2) arithmetic.
//!
//! Stores bits in u64 words so that vector addition is a word-wise XOR and
//! Hamming weight is a popcount. Converts to and from the sparse supports used
//! by the elimination engine.

/// Fixed-length bit vector packed into u64 words.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PackedBits {
    words: Vec<u64>,
    len: usize,
}

impl PackedBits {
    /// Creates an all-zero vector of `len` bits.
    pub fn zeros(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// Creates a vector with ones exactly at the given indices.
    ///
    /// Indices are toggled, so an index listed twice cancels out.
    pub fn from_support(len: usize, support: &[usize]) -> Self {
        let mut bits = Self::zeros(len);
        for &idx in support {
            bits.toggle(idx);
        }
        bits
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn get(&self, index: usize) -> bool {
        let word = self.words[index / 64];
        let bit = index % 64;
        (word >> bit) & 1 == 1
    }

    #[inline(always)]
    pub fn toggle(&mut self, index: usize) {
        let word_idx = index / 64;
        let bit_idx = index % 64;
        self.words[word_idx] ^= 1 << bit_idx;
    }

    #[inline(always)]
    pub fn set(&mut self, index: usize, val: bool) {
        let word_idx = index / 64;
        let bit_idx = index % 64;
        if val {
            self.words[word_idx] |= 1 << bit_idx;
        } else {
            self.words[word_idx] &= !(1 << bit_idx);
        }
    }

    /// Adds `other` into `self` over GF(2).
    ///
    /// Both vectors must have the same length.
    #[inline]
    pub fn xor_assign(&mut self, other: &PackedBits) {
        debug_assert_eq!(self.len, other.len);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a ^= *b;
        }
    }

    /// Hamming weight.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Hamming weight of `self + other` without allocating.
    #[inline]
    pub fn xor_count(&self, other: &PackedBits) -> usize {
        self.words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a ^ b).count_ones() as usize)
            .sum()
    }

    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Indices of the set bits in increasing order.
    pub fn to_support(&self) -> Vec<usize> {
        let mut support = Vec::with_capacity(self.count_ones());
        for (w, &word) in self.words.iter().enumerate() {
            let mut rest = word;
            while rest != 0 {
                let bit = rest.trailing_zeros() as usize;
                support.push(w * 64 + bit);
                rest &= rest - 1;
            }
        }
        support
    }
}

//! Decoding oracles consulted by the distance estimator.
//!
//! An oracle answers a single question: given a syndrome `s`, propose a
//! vector `x` with `H · x = s`. The estimator perturbs the zero codeword by a
//! random low-weight error, asks the oracle to explain the resulting
//! syndrome, and adds the answer back onto the perturbation. Whenever the
//! oracle returns something other than the perturbation itself, the sum is a
//! nonzero codeword.

use crate::bit_utils::PackedBits;
use crate::echelon::{RowEchelon, row_reduce_tracked};
use crate::sparse::{BinVector, SparseBinMatrix};
use crate::{CodeError, CodeResult};
use ecc_common::decoder::{DecoderConfig, OsdMethod};

/// Largest order accepted for exhaustive post-processing.
const MAX_EXHAUSTIVE_ORDER: usize = 24;

/// Syndrome decoding capability.
///
/// Implementations must be shareable across estimator workers. Returning a
/// vector that does not satisfy the syndrome is tolerated; the estimator
/// verifies every candidate before using it.
pub trait DecodingOracle: Send + Sync {
    /// Proposes `x` with `H · x = syndrome`, or `None` to decline.
    fn decode(&self, syndrome: &BinVector) -> Option<BinVector>;
}

impl<F> DecodingOracle for F
where
    F: Fn(&BinVector) -> Option<BinVector> + Send + Sync,
{
    fn decode(&self, syndrome: &BinVector) -> Option<BinVector> {
        self(syndrome)
    }
}

/// Ordered-statistics post-processing over a fixed column reliability order.
///
/// The parity-check matrix is reduced once, preferring the columns listed
/// first. Decoding solves for the pivot-supported explanation of the
/// syndrome and then, depending on the configured method, searches the
/// lightest correction among combinations of free columns.
pub struct OsdOracle {
    echelon: RowEchelon,
    basis: Vec<PackedBits>,
    method: OsdMethod,
    order: usize,
}

impl OsdOracle {
    /// Builds the oracle with columns ranked in natural order.
    pub fn new(h: &SparseBinMatrix, config: &DecoderConfig) -> CodeResult<Self> {
        let order: Vec<usize> = (0..h.cols()).collect();
        Self::with_column_order(h, &order, config)
    }

    /// Builds the oracle with an explicit column ranking, most reliable first.
    pub fn with_column_order(
        h: &SparseBinMatrix,
        column_order: &[usize],
        config: &DecoderConfig,
    ) -> CodeResult<Self> {
        if config.method == OsdMethod::OsdE && config.order > MAX_EXHAUSTIVE_ORDER {
            return Err(CodeError::InvalidConfig(format!(
                "exhaustive post-processing order {} exceeds {MAX_EXHAUSTIVE_ORDER}",
                config.order
            )));
        }
        let echelon = row_reduce_tracked(h, column_order)?;
        let basis = echelon
            .null_space_basis()
            .iter()
            .map(BinVector::to_packed)
            .collect();
        Ok(Self {
            echelon,
            basis,
            method: config.method,
            order: config.order,
        })
    }

    /// Number of free columns available to the post-processing search.
    pub fn information_set_size(&self) -> usize {
        self.basis.len()
    }

    fn exhaustive(&self, x0: PackedBits) -> PackedBits {
        let span = self.order.min(self.basis.len());
        let mut best = x0.clone();
        let mut best_weight = best.count_ones();
        let mut current = x0;
        for step in 1u64..(1u64 << span) {
            current.xor_assign(&self.basis[step.trailing_zeros() as usize]);
            let w = current.count_ones();
            if w < best_weight {
                best_weight = w;
                best = current.clone();
            }
        }
        best
    }

    fn combination_sweep(&self, x0: PackedBits) -> PackedBits {
        let mut best_weight = x0.count_ones();
        let mut best_flips: (Option<usize>, Option<usize>) = (None, None);

        for (i, b) in self.basis.iter().enumerate() {
            let w = x0.xor_count(b);
            if w < best_weight {
                best_weight = w;
                best_flips = (Some(i), None);
            }
        }

        let span = self.order.min(self.basis.len());
        for i in 0..span {
            let mut partial = x0.clone();
            partial.xor_assign(&self.basis[i]);
            for j in (i + 1)..span {
                let w = partial.xor_count(&self.basis[j]);
                if w < best_weight {
                    best_weight = w;
                    best_flips = (Some(i), Some(j));
                }
            }
        }

        let mut best = x0;
        for flip in [best_flips.0, best_flips.1].into_iter().flatten() {
            best.xor_assign(&self.basis[flip]);
        }
        best
    }
}

impl DecodingOracle for OsdOracle {
    fn decode(&self, syndrome: &BinVector) -> Option<BinVector> {
        let x0 = self.echelon.solve(syndrome).ok()??;
        let best = match self.method {
            OsdMethod::Osd0 => return Some(x0),
            OsdMethod::OsdE => self.exhaustive(x0.to_packed()),
            OsdMethod::OsdCs => self.combination_sweep(x0.to_packed()),
        };
        Some(BinVector::from_packed(&best))
    }
}

//! Code-level operations on a parity-check matrix.
//!
//! Each function derives one property of the code defined as the null space
//! of `H`: its dimension, a generator matrix, or the full `(n, k, d)`
//! parameter triple.

use crate::distance::{DistanceEstimate, DistanceEstimator, EstimatorConfig};
use crate::echelon::row_reduce;
use crate::sparse::SparseBinMatrix;
use crate::CodeResult;
use core::fmt;
use tracing::debug;

/// Parameters `[n, k, d]` of a binary linear code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeParameters {
    /// Block length, the number of columns of `H`.
    pub n: usize,
    /// Dimension of the code.
    pub k: usize,
    /// Estimated minimum distance.
    pub d: usize,
}

impl fmt::Display for CodeParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.n, self.k, self.d)
    }
}

/// Builds a generator matrix whose rows span the null space of `h`.
///
/// Rows appear in free-column order of the natural-order reduction. A matrix
/// of full column rank yields the empty `0 × n` matrix.
pub fn construct_generator_matrix(h: &SparseBinMatrix) -> SparseBinMatrix {
    let echelon = row_reduce(h);
    let basis = echelon.null_space_basis();
    debug!(
        n = h.cols(),
        k = basis.len(),
        "generator matrix constructed"
    );
    SparseBinMatrix::from_supports_unchecked(
        h.cols(),
        basis.into_iter().map(|v| v.support().to_vec()).collect(),
    )
}

/// Dimension `k = n - rank(h)` of the code.
pub fn compute_code_dimension(h: &SparseBinMatrix) -> usize {
    row_reduce(h).nullity()
}

/// Computes `(n, k, d)` with the default estimator configuration.
pub fn compute_code_parameters(h: &SparseBinMatrix) -> CodeResult<CodeParameters> {
    compute_code_parameters_with(h, &EstimatorConfig::default())
}

/// Computes `(n, k, d)` with an explicit estimator configuration.
///
/// Fixing `config.seed` makes repeated calls return identical results.
pub fn compute_code_parameters_with(
    h: &SparseBinMatrix,
    config: &EstimatorConfig,
) -> CodeResult<CodeParameters> {
    let estimator = DistanceEstimator::new(config.clone());
    compute_code_parameters_using(h, &estimator).map(|(params, _)| params)
}

/// Computes `(n, k, d)` with a prepared estimator, keeping the full estimate.
///
/// `h` is reduced once; the dimension comes from the same reduction that
/// drives the search.
pub fn compute_code_parameters_using(
    h: &SparseBinMatrix,
    estimator: &DistanceEstimator,
) -> CodeResult<(CodeParameters, DistanceEstimate)> {
    let estimate = estimator.estimate(h)?;
    let params = CodeParameters {
        n: h.cols(),
        k: estimate.dimension,
        d: estimate.distance,
    };
    Ok((params, estimate))
}

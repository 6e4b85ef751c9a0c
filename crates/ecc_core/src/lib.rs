//! Core algorithms for analysing binary linear codes.
//!
//! This crate provides a sparse GF(2) linear-algebra engine together with the
//! code-level operations built on it: dimension, generator matrix, and a
//! randomized minimum-distance estimator with a statistical stopping rule.
//! The estimator can optionally consult a pluggable decoding oracle.

use thiserror::Error;

/// Packed bit vectors over u64 words.
///
/// Dense companion to the sparse row supports. Used wherever many XORs and
/// popcounts over short vectors dominate, such as Gray-code enumeration of
/// small codes and pair scoring inside an information-set trial.
pub mod bit_utils;

/// Code-level operations: dimension, generator matrix, and (n, k, d).
///
/// Thin compositions over the row-reduction engine and the distance
/// estimator. All functions are pure and leave the input matrix untouched.
pub mod code;

/// Randomized minimum-distance estimation.
///
/// Samples random information sets, scores the low-weight codewords each one
/// exposes, and stops once the probability of having missed a lighter
/// codeword drops below the requested miss-probability. Small codes are
/// enumerated exhaustively instead.
pub mod distance;

/// Gaussian elimination over GF(2) on sparse row supports.
///
/// Produces the reduced row-echelon form, rank, pivot columns and a
/// null-space basis. Supports an explicit column priority, which is how the
/// estimator realizes random information sets, and optional tracking of the
/// row transform for solving syndrome equations.
pub mod echelon;

/// Parity-check matrices of well-known code families.
///
/// Hamming, repetition, ring and random fixed-row-weight codes with known
/// parameters. Used as fixtures and by the command-line generator.
pub mod families;

/// Decoding oracle capability and an ordered-statistics implementation.
///
/// The estimator treats a decoder as a single operation mapping a syndrome to
/// a candidate vector, so belief-propagation style decoders stay pluggable.
pub mod oracle;

/// Sparse binary matrices and vectors.
///
/// Rows are stored as strictly increasing column supports so that addition
/// is a merge-based symmetric difference and costs scale with nonzeros.
pub mod sparse;

pub use code::{
    CodeParameters, compute_code_dimension, compute_code_parameters,
    compute_code_parameters_using, compute_code_parameters_with, construct_generator_matrix,
};
pub use distance::{
    DistanceEstimate, DistanceEstimator, EstimatorConfig, SearchOutcome, estimate_min_distance,
};
pub use echelon::{RowEchelon, row_reduce};
pub use oracle::{DecodingOracle, OsdOracle};
pub use sparse::{BinVector, SparseBinMatrix};

/// Error types returned by code analysis operations.
///
/// Every failure is local to the call that produced it. Partial results are
/// never returned alongside an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodeError {
    /// The matrix data is not a valid binary matrix.
    ///
    /// Raised for entries outside {0, 1}, indices beyond the declared shape,
    /// or ragged dense rows. Detected when the matrix is constructed.
    #[error("invalid matrix: {0}")]
    InvalidMatrix(String),

    /// The code has no nonzero codeword.
    ///
    /// The parity-check matrix has full column rank, so the code dimension is
    /// zero and there is nothing for the distance search to find.
    #[error("degenerate code: parity-check matrix of {cols} columns has full column rank")]
    DegenerateCode { cols: usize },

    /// A miss-probability outside the open interval (0, 1).
    #[error("miss-probability must lie in (0, 1), got {0}")]
    InvalidProbability(f64),

    /// Two operands have incompatible shapes.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A decoder configuration that the oracle cannot honour.
    #[error("invalid decoder configuration: {0}")]
    InvalidConfig(String),
}

impl From<ecc_common::decoder::ConfigError> for CodeError {
    fn from(err: ecc_common::decoder::ConfigError) -> Self {
        CodeError::InvalidConfig(err.to_string())
    }
}

/// Result alias for code analysis operations.
pub type CodeResult<T> = Result<T, CodeError>;

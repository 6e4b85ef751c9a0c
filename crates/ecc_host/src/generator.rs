//! Writes parity-check matrices of standard code families to disk.

use anyhow::{Result, ensure};
use clap::ValueEnum;
use ecc_core::families;
use ecc_core::{SparseBinMatrix, compute_code_dimension};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use tracing::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Family {
    /// Hamming code of rank `size`.
    Hamming,
    /// Repetition code of length `size`.
    Rep,
    /// Cyclic repetition code of length `size`.
    Ring,
    /// Random checks of fixed weight over `size` bits.
    Random,
}

/// Shape of a random family member.
#[derive(Clone, Copy, Debug)]
pub struct RandomShape {
    pub rows: usize,
    pub row_weight: usize,
    pub seed: u64,
}

pub fn build_family(family: Family, size: usize, shape: RandomShape) -> Result<SparseBinMatrix> {
    ensure!(size > 0, "family size must be positive");
    let h = match family {
        Family::Hamming => {
            ensure!((2..=20).contains(&size), "Hamming rank must lie in 2..=20");
            families::hamming_code(size)
        }
        Family::Rep => families::rep_code(size),
        Family::Ring => families::ring_code(size),
        Family::Random => {
            let mut rng = ChaCha8Rng::seed_from_u64(shape.seed);
            families::random_code(shape.rows, size, shape.row_weight, &mut rng)
        }
    };
    Ok(h)
}

/// Builds a family member and saves it in the format implied by `path`.
pub fn generate_family(family: Family, size: usize, shape: RandomShape, path: &Path) -> Result<()> {
    let h = build_family(family, size, shape)?;
    ecc_io::save_matrix_file(&h, path)?;
    info!(
        family = ?family,
        rows = h.rows(),
        cols = h.cols(),
        k = compute_code_dimension(&h),
        path = %path.display(),
        "wrote parity-check matrix"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: RandomShape = RandomShape {
        rows: 6,
        row_weight: 3,
        seed: 1,
    };

    #[test]
    fn builds_each_family() {
        assert_eq!(build_family(Family::Hamming, 3, SHAPE).unwrap().cols(), 7);
        assert_eq!(build_family(Family::Rep, 5, SHAPE).unwrap().rows(), 4);
        assert_eq!(build_family(Family::Ring, 5, SHAPE).unwrap().rows(), 5);
        let random = build_family(Family::Random, 12, SHAPE).unwrap();
        assert_eq!((random.rows(), random.cols()), (6, 12));
        assert_eq!(random, build_family(Family::Random, 12, SHAPE).unwrap());
    }

    #[test]
    fn rejects_bad_sizes() {
        assert!(build_family(Family::Ring, 0, SHAPE).is_err());
        assert!(build_family(Family::Hamming, 40, SHAPE).is_err());
    }
}

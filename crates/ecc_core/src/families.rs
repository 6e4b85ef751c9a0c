//! Parity-check matrices of standard binary code families.

use crate::sparse::SparseBinMatrix;
use rand::Rng;
use rand::seq::index;

/// Hamming code of rank `r`, a `[2^r - 1, 2^r - 1 - r, 3]` code.
///
/// Column `i` holds the binary expansion of `i + 1`.
pub fn hamming_code(r: usize) -> SparseBinMatrix {
    let n = (1 << r) - 1;
    let mut pcm = SparseBinMatrix::new(r, n);
    for i in 0..n {
        let binary = i + 1;
        for j in 0..r {
            if binary & (1 << j) != 0 {
                pcm.insert(j, i);
            }
        }
    }
    pcm
}

/// Repetition code of length `n`, an `[n, 1, n]` code.
///
/// Row `i` checks bits `i` and `i + 1`.
pub fn rep_code(n: usize) -> SparseBinMatrix {
    let mut pcm = SparseBinMatrix::new(n.saturating_sub(1), n);
    for i in 0..n.saturating_sub(1) {
        pcm.insert(i, i);
        pcm.insert(i, i + 1);
    }
    pcm
}

/// Cyclic repetition code of length `n`, an `[n, 1, n]` code.
///
/// Like [`rep_code`] with an extra check closing the ring, so the matrix is
/// square and one row is redundant.
pub fn ring_code(n: usize) -> SparseBinMatrix {
    let mut pcm = SparseBinMatrix::new(n, n);
    for i in 0..n {
        pcm.insert(i, i);
        pcm.insert(i, (i + 1) % n);
    }
    pcm
}

/// Random code whose checks each touch `row_weight` distinct bits.
pub fn random_code<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    row_weight: usize,
    rng: &mut R,
) -> SparseBinMatrix {
    let weight = row_weight.min(cols);
    let mut pcm = SparseBinMatrix::new(rows, cols);
    for r in 0..rows {
        for c in index::sample(rng, cols, weight) {
            pcm.insert(r, c);
        }
    }
    pcm
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn hamming_columns_are_distinct_and_nonzero() {
        let h = hamming_code(4);
        assert_eq!((h.rows(), h.cols()), (4, 15));
        let mut cols = h.column_supports();
        assert!(cols.iter().all(|c| !c.is_empty()));
        cols.sort();
        cols.dedup();
        assert_eq!(cols.len(), 15);
    }

    #[test]
    fn repetition_and_ring_shapes() {
        let rep = rep_code(5);
        assert_eq!((rep.rows(), rep.cols(), rep.nnz()), (4, 5, 8));
        let ring = ring_code(5);
        assert_eq!((ring.rows(), ring.cols(), ring.nnz()), (5, 5, 10));
        assert_eq!(ring.row(4), &[0, 4]);
    }

    #[test]
    fn random_code_has_fixed_row_weight() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let h = random_code(20, 30, 4, &mut rng);
        assert_eq!((h.rows(), h.cols()), (20, 30));
        assert!(h.row_supports().iter().all(|row| row.len() == 4));
    }
}

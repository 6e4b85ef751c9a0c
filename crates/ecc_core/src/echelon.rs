//! Gaussian elimination over GF(2) on sparse row supports.
//!
//! Columns are visited in a given priority order. For each column the
//! lowest-index row not yet holding a pivot is chosen and XORed into every
//! other row with a 1 in that column, which yields the reduced row-echelon
//! form. A column-to-rows index is kept in step with the row supports so
//! that finding pivot candidates and elimination targets never scans the full
//! matrix.

use crate::sparse::{BinVector, SparseBinMatrix, xor_sorted};
use crate::{CodeError, CodeResult};
use std::collections::BTreeSet;
use tracing::trace;

/// Reduced row-echelon form of a binary matrix.
///
/// Holds only the nonzero reduced rows, each paired with its pivot column.
/// The pivot columns appear in the order the columns were visited, which is
/// strictly increasing for the natural order.
#[derive(Clone, Debug)]
pub struct RowEchelon {
    cols: usize,

    /// Reduced pivot rows, one per pivot, in pivot order.
    rows: Vec<Vec<usize>>,

    /// Pivot column of each reduced row.
    pivots: Vec<usize>,

    /// Non-pivot columns in visiting order.
    free: Vec<usize>,

    /// Original rows summed into each reduced row, when tracked.
    transform: Option<Transform>,
}

#[derive(Clone, Debug)]
struct Transform {
    pivot_ops: Vec<Vec<usize>>,
    zero_ops: Vec<Vec<usize>>,
}

/// Reduces `m` visiting columns in natural order.
pub fn row_reduce(m: &SparseBinMatrix) -> RowEchelon {
    let order: Vec<usize> = (0..m.cols()).collect();
    eliminate(m, &order, false)
}

/// Reduces `m` visiting columns in the given priority order.
///
/// `order` must be a permutation of `0..m.cols()`. The pivots then form the
/// earliest independent columns with respect to that order and the free
/// columns form an information set.
pub fn row_reduce_with_order(m: &SparseBinMatrix, order: &[usize]) -> CodeResult<RowEchelon> {
    check_permutation(order, m.cols())?;
    Ok(eliminate(m, order, false))
}

/// Like [`row_reduce_with_order`], additionally recording the row operations
/// so the result can solve `m · x = s` through [`RowEchelon::solve`].
pub fn row_reduce_tracked(m: &SparseBinMatrix, order: &[usize]) -> CodeResult<RowEchelon> {
    check_permutation(order, m.cols())?;
    Ok(eliminate(m, order, true))
}

fn check_permutation(order: &[usize], cols: usize) -> CodeResult<()> {
    if order.len() != cols {
        return Err(CodeError::DimensionMismatch {
            context: "column order",
            expected: cols,
            actual: order.len(),
        });
    }
    let mut seen = vec![false; cols];
    for &c in order {
        if c >= cols || seen[c] {
            return Err(CodeError::InvalidMatrix(format!(
                "column order is not a permutation of 0..{cols}"
            )));
        }
        seen[c] = true;
    }
    Ok(())
}

#[inline]
fn toggle(set: &mut BTreeSet<usize>, r: usize) {
    if !set.remove(&r) {
        set.insert(r);
    }
}

fn eliminate(m: &SparseBinMatrix, order: &[usize], track: bool) -> RowEchelon {
    let num_rows = m.rows();
    let mut rows: Vec<Vec<usize>> = m.row_supports().to_vec();
    let mut ops: Vec<Vec<usize>> = if track {
        (0..num_rows).map(|r| vec![r]).collect()
    } else {
        Vec::new()
    };

    let mut col_rows: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); m.cols()];
    for (r, c) in m.entries() {
        col_rows[c].insert(r);
    }

    let mut assigned = vec![false; num_rows];
    let mut pivot_rows = Vec::with_capacity(num_rows.min(m.cols()));
    let mut pivots = Vec::with_capacity(pivot_rows.capacity());
    let mut free = Vec::new();

    for (pos, &c) in order.iter().enumerate() {
        if pivot_rows.len() == num_rows {
            free.extend_from_slice(&order[pos..]);
            break;
        }

        let Some(p) = col_rows[c].iter().copied().find(|&r| !assigned[r]) else {
            free.push(c);
            continue;
        };
        assigned[p] = true;

        let targets: Vec<usize> = col_rows[c].iter().copied().filter(|&r| r != p).collect();
        let pivot_support = rows[p].clone();
        let pivot_ops = if track { ops[p].clone() } else { Vec::new() };
        for t in targets {
            for &col in &pivot_support {
                toggle(&mut col_rows[col], t);
            }
            rows[t] = xor_sorted(&rows[t], &pivot_support);
            if track {
                ops[t] = xor_sorted(&ops[t], &pivot_ops);
            }
        }

        pivot_rows.push(p);
        pivots.push(c);
    }

    let transform = track.then(|| Transform {
        pivot_ops: pivot_rows.iter().map(|&p| ops[p].clone()).collect(),
        zero_ops: (0..num_rows)
            .filter(|&r| !assigned[r])
            .map(|r| ops[r].clone())
            .collect(),
    });
    let reduced: Vec<Vec<usize>> = pivot_rows.iter().map(|&p| rows[p].clone()).collect();

    trace!(
        rows = num_rows,
        cols = m.cols(),
        rank = pivots.len(),
        "row reduction finished"
    );

    RowEchelon {
        cols: m.cols(),
        rows: reduced,
        pivots,
        free,
        transform,
    }
}

impl RowEchelon {
    pub fn rank(&self) -> usize {
        self.pivots.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Dimension of the null space, `cols - rank`.
    pub fn nullity(&self) -> usize {
        self.cols - self.rank()
    }

    /// Pivot column of each reduced row.
    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    /// Columns without a pivot, in visiting order.
    pub fn free_columns(&self) -> &[usize] {
        &self.free
    }

    /// Reduced pivot rows as column supports.
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    /// For every column, the indices of the reduced rows containing it.
    pub fn column_pivot_rows(&self) -> Vec<Vec<usize>> {
        let mut by_col = vec![Vec::new(); self.cols];
        for (i, row) in self.rows.iter().enumerate() {
            for &c in row {
                by_col[c].push(i);
            }
        }
        by_col
    }

    /// Builds the vector with ones at `free_bits` and at the pivots of the
    /// reduced rows listed in `pivot_rows`.
    pub(crate) fn assemble(&self, free_bits: &[usize], pivot_rows: &[usize]) -> BinVector {
        let mut support: Vec<usize> = free_bits
            .iter()
            .copied()
            .chain(pivot_rows.iter().map(|&i| self.pivots[i]))
            .collect();
        support.sort_unstable();
        BinVector::from_sorted_unchecked(self.cols, support)
    }

    /// Basis of the null space, one vector per free column in visiting order.
    ///
    /// The vector for free column `f` has a 1 at `f` and a 1 at the pivot of
    /// every reduced row that contains `f`.
    pub fn null_space_basis(&self) -> Vec<BinVector> {
        let by_col = self.column_pivot_rows();
        self.free
            .iter()
            .map(|&f| self.assemble(&[f], &by_col[f]))
            .collect()
    }

    /// Solves `m · x = s` with `x` supported on the pivot columns.
    ///
    /// Returns `Ok(None)` when the syndrome lies outside the column space.
    /// Requires the form to come from [`row_reduce_tracked`].
    pub fn solve(&self, syndrome: &BinVector) -> CodeResult<Option<BinVector>> {
        let transform = self.transform.as_ref().ok_or_else(|| {
            CodeError::InvalidConfig("row transform was not tracked during reduction".into())
        })?;
        let num_rows = transform.pivot_ops.len() + transform.zero_ops.len();
        if syndrome.len() != num_rows {
            return Err(CodeError::DimensionMismatch {
                context: "syndrome length",
                expected: num_rows,
                actual: syndrome.len(),
            });
        }

        let parity = |ops: &[usize]| ops.iter().filter(|&&r| syndrome.get(r)).count() % 2 == 1;

        if transform.zero_ops.iter().any(|ops| parity(ops)) {
            return Ok(None);
        }

        let mut support: Vec<usize> = transform
            .pivot_ops
            .iter()
            .zip(&self.pivots)
            .filter(|(ops, _)| parity(ops))
            .map(|(_, &c)| c)
            .collect();
        support.sort_unstable();
        Ok(Some(BinVector::from_sorted_unchecked(self.cols, support)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hamming_7_4() -> SparseBinMatrix {
        SparseBinMatrix::from_dense(&[
            vec![1, 0, 1, 0, 1, 0, 1],
            vec![0, 1, 1, 0, 0, 1, 1],
            vec![0, 0, 0, 1, 1, 1, 1],
        ])
        .unwrap()
    }

    #[test]
    fn reduces_hamming_matrix() {
        let ech = row_reduce(&hamming_7_4());
        assert_eq!(ech.rank(), 3);
        assert_eq!(ech.pivots(), &[0, 1, 3]);
        assert_eq!(ech.free_columns(), &[2, 4, 5, 6]);
        assert_eq!(
            ech.rows(),
            &[vec![0, 2, 4, 6], vec![1, 2, 5, 6], vec![3, 4, 5, 6]]
        );
    }

    #[test]
    fn null_space_follows_free_columns() {
        let h = hamming_7_4();
        let basis = row_reduce(&h).null_space_basis();
        let supports: Vec<&[usize]> = basis.iter().map(BinVector::support).collect();
        assert_eq!(
            supports,
            vec![&[0, 1, 2][..], &[0, 3, 4], &[1, 3, 5], &[0, 1, 3, 6]]
        );
        for v in &basis {
            assert!(h.is_codeword(v).unwrap());
        }
    }

    #[test]
    fn dependent_rows_lower_the_rank() {
        let m = SparseBinMatrix::from_dense(&[
            vec![1, 1, 0, 0],
            vec![0, 1, 1, 0],
            vec![1, 0, 1, 0],
            vec![0, 0, 0, 0],
        ])
        .unwrap();
        let ech = row_reduce(&m);
        assert_eq!(ech.rank(), 2);
        assert_eq!(ech.pivots(), &[0, 1]);
        assert_eq!(ech.free_columns(), &[2, 3]);
        assert_eq!(ech.nullity(), 2);
    }

    #[test]
    fn lowest_unassigned_row_becomes_pivot() {
        let m = SparseBinMatrix::from_dense(&[vec![0, 1], vec![1, 1], vec![1, 0]]).unwrap();
        let ech = row_reduce(&m);
        // Row 1 is the first row with a 1 in column 0.
        assert_eq!(ech.rows()[0], vec![0]);
        assert_eq!(ech.rank(), 2);
    }

    #[test]
    fn custom_order_changes_information_set() {
        let h = hamming_7_4();
        let order = [6, 5, 4, 3, 2, 1, 0];
        let ech = row_reduce_with_order(&h, &order).unwrap();
        assert_eq!(ech.pivots(), &[6, 5, 4]);
        assert_eq!(ech.free_columns(), &[3, 2, 1, 0]);
        for v in ech.null_space_basis() {
            assert!(h.is_codeword(&v).unwrap());
        }
    }

    #[test]
    fn rejects_bad_order() {
        let h = hamming_7_4();
        assert!(row_reduce_with_order(&h, &[0, 1, 2]).is_err());
        assert!(row_reduce_with_order(&h, &[0, 0, 1, 2, 3, 4, 5]).is_err());
    }

    #[test]
    fn solve_recovers_single_errors() {
        let h = hamming_7_4();
        let order: Vec<usize> = (0..7).collect();
        let ech = row_reduce_tracked(&h, &order).unwrap();
        for c in 0..7 {
            let s = h.mul_vec(&BinVector::unit(7, c).unwrap()).unwrap();
            let x = ech.solve(&s).unwrap().unwrap();
            assert_eq!(h.mul_vec(&x).unwrap(), s);
            assert!(x.support().iter().all(|col| ech.pivots().contains(col)));
        }
    }

    #[test]
    fn solve_detects_inconsistent_syndrome() {
        let m = SparseBinMatrix::from_dense(&[vec![1, 1], vec![1, 1]]).unwrap();
        let ech = row_reduce_tracked(&m, &[0, 1]).unwrap();
        let s = BinVector::unit(2, 0).unwrap();
        assert_eq!(ech.solve(&s).unwrap(), None);
        assert!(row_reduce(&m).solve(&s).is_err());
    }

    fn arb_matrix() -> impl Strategy<Value = SparseBinMatrix> {
        (1usize..8, 1usize..12).prop_flat_map(|(rows, cols)| {
            proptest::collection::vec(proptest::collection::vec(0u8..2, cols), rows)
                .prop_map(|dense| SparseBinMatrix::from_dense(&dense).unwrap())
        })
    }

    proptest! {
        #[test]
        fn prop_rank_and_pivots_are_well_formed(m in arb_matrix()) {
            let ech = row_reduce(&m);
            prop_assert!(ech.rank() <= m.rows().min(m.cols()));
            prop_assert!(ech.pivots().windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(ech.rank() + ech.free_columns().len(), m.cols());
        }

        #[test]
        fn prop_null_space_basis_is_independent_and_annihilated(m in arb_matrix()) {
            let ech = row_reduce(&m);
            let basis = ech.null_space_basis();
            prop_assert_eq!(basis.len(), m.cols() - ech.rank());
            for v in &basis {
                prop_assert!(m.is_codeword(v).unwrap());
            }
            let g = SparseBinMatrix::from_rows(m.cols(), &basis).unwrap();
            prop_assert_eq!(row_reduce(&g).rank(), basis.len());
        }
    }
}

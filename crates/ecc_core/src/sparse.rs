//! Sparse binary matrices and vectors over GF(2).
//!
//! A parity-check matrix is stored row by row, each row as the strictly
//! increasing list of columns holding a 1. Adding two rows is the symmetric
//! difference of their supports, computed with a linear merge, so the cost of
//! every operation scales with the number of nonzeros rather than with the
//! matrix area.

use crate::bit_utils::PackedBits;
use crate::{CodeError, CodeResult};
use core::fmt;

/// Adds two sorted supports over GF(2).
///
/// Both inputs must be strictly increasing. The result is strictly increasing
/// and contains the columns present in exactly one of the inputs.
pub fn xor_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            core::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            core::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            core::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Sorts a list of indices and cancels pairs, leaving a GF(2) support.
fn normalize_support(mut indices: Vec<usize>) -> Vec<usize> {
    indices.sort_unstable();
    let mut out: Vec<usize> = Vec::with_capacity(indices.len());
    for idx in indices {
        if out.last() == Some(&idx) {
            out.pop();
        } else {
            out.push(idx);
        }
    }
    out
}

/// Binary vector of fixed length stored as its support.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BinVector {
    len: usize,
    support: Vec<usize>,
}

impl BinVector {
    /// The all-zero vector of length `len`.
    pub fn zeros(len: usize) -> Self {
        Self {
            len,
            support: Vec::new(),
        }
    }

    /// The vector with a single 1 at `index`.
    pub fn unit(len: usize, index: usize) -> CodeResult<Self> {
        Self::from_support(len, vec![index])
    }

    /// Builds a vector from a list of one positions.
    ///
    /// Positions are summed mod 2, so a repeated index cancels.
    pub fn from_support(len: usize, support: Vec<usize>) -> CodeResult<Self> {
        if let Some(&bad) = support.iter().find(|&&idx| idx >= len) {
            return Err(CodeError::InvalidMatrix(format!(
                "index {bad} out of range for vector of length {len}"
            )));
        }
        Ok(Self {
            len,
            support: normalize_support(support),
        })
    }

    /// Builds a vector from dense 0/1 entries.
    pub fn from_dense(entries: &[u8]) -> CodeResult<Self> {
        let mut support = Vec::new();
        for (i, &v) in entries.iter().enumerate() {
            match v {
                0 => {}
                1 => support.push(i),
                _ => {
                    return Err(CodeError::InvalidMatrix(format!(
                        "non-binary entry {v} at position {i}"
                    )));
                }
            }
        }
        Ok(Self {
            len: entries.len(),
            support,
        })
    }

    pub(crate) fn from_sorted_unchecked(len: usize, support: Vec<usize>) -> Self {
        debug_assert!(support.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(support.last().is_none_or(|&c| c < len));
        Self { len, support }
    }

    pub(crate) fn from_packed(bits: &PackedBits) -> Self {
        Self {
            len: bits.len(),
            support: bits.to_support(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Hamming weight.
    pub fn weight(&self) -> usize {
        self.support.len()
    }

    pub fn is_zero(&self) -> bool {
        self.support.is_empty()
    }

    /// Positions of the ones, strictly increasing.
    pub fn support(&self) -> &[usize] {
        &self.support
    }

    pub fn get(&self, index: usize) -> bool {
        self.support.binary_search(&index).is_ok()
    }

    /// Sum of two vectors over GF(2).
    pub fn add(&self, other: &BinVector) -> CodeResult<BinVector> {
        if self.len != other.len {
            return Err(CodeError::DimensionMismatch {
                context: "vector addition",
                expected: self.len,
                actual: other.len,
            });
        }
        Ok(Self {
            len: self.len,
            support: xor_sorted(&self.support, &other.support),
        })
    }

    pub fn to_dense(&self) -> Vec<u8> {
        let mut dense = vec![0u8; self.len];
        for &idx in &self.support {
            dense[idx] = 1;
        }
        dense
    }

    pub fn to_packed(&self) -> PackedBits {
        PackedBits::from_support(self.len, &self.support)
    }
}

impl fmt::Display for BinVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.to_dense() {
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

/// Sparse binary matrix in row-support form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseBinMatrix {
    rows: usize,
    cols: usize,
    row_supports: Vec<Vec<usize>>,
}

impl SparseBinMatrix {
    /// The all-zero matrix of the given shape.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_supports: vec![Vec::new(); rows],
        }
    }

    /// Builds a matrix from one support per row.
    ///
    /// The number of rows is the number of supports. Repeated column indices
    /// within a row cancel mod 2.
    pub fn from_row_supports(cols: usize, supports: Vec<Vec<usize>>) -> CodeResult<Self> {
        let rows = supports.len();
        let mut row_supports = Vec::with_capacity(rows);
        for (r, support) in supports.into_iter().enumerate() {
            if let Some(&bad) = support.iter().find(|&&c| c >= cols) {
                return Err(CodeError::InvalidMatrix(format!(
                    "column {bad} in row {r} exceeds width {cols}"
                )));
            }
            row_supports.push(normalize_support(support));
        }
        Ok(Self {
            rows,
            cols,
            row_supports,
        })
    }

    /// Builds a matrix from coordinate entries `(row, col, value)`.
    ///
    /// Zero values are ignored; any value other than 0 or 1 is rejected.
    /// Entries listed more than once are summed mod 2.
    pub fn from_entries<I>(rows: usize, cols: usize, entries: I) -> CodeResult<Self>
    where
        I: IntoIterator<Item = (usize, usize, u8)>,
    {
        let mut supports = vec![Vec::new(); rows];
        for (r, c, v) in entries {
            if r >= rows || c >= cols {
                return Err(CodeError::InvalidMatrix(format!(
                    "entry ({r}, {c}) outside a {rows}x{cols} matrix"
                )));
            }
            match v {
                0 => {}
                1 => supports[r].push(c),
                _ => {
                    return Err(CodeError::InvalidMatrix(format!(
                        "non-binary entry {v} at ({r}, {c})"
                    )));
                }
            }
        }
        Self::from_row_supports(cols, supports)
    }

    /// Builds a matrix from dense rows of 0/1 entries.
    pub fn from_dense(dense: &[Vec<u8>]) -> CodeResult<Self> {
        let cols = dense.first().map_or(0, |row| row.len());
        let mut supports = Vec::with_capacity(dense.len());
        for (r, row) in dense.iter().enumerate() {
            if row.len() != cols {
                return Err(CodeError::InvalidMatrix(format!(
                    "row {r} has {} entries, expected {cols}",
                    row.len()
                )));
            }
            let v = BinVector::from_dense(row)
                .map_err(|e| CodeError::InvalidMatrix(format!("row {r}: {e}")))?;
            supports.push(v.support);
        }
        Ok(Self {
            rows: dense.len(),
            cols,
            row_supports: supports,
        })
    }

    pub(crate) fn from_supports_unchecked(cols: usize, row_supports: Vec<Vec<usize>>) -> Self {
        Self {
            rows: row_supports.len(),
            cols,
            row_supports,
        }
    }

    /// Builds a matrix whose rows are the given vectors.
    pub fn from_rows(cols: usize, rows: &[BinVector]) -> CodeResult<Self> {
        if let Some(bad) = rows.iter().find(|v| v.len() != cols) {
            return Err(CodeError::DimensionMismatch {
                context: "matrix rows",
                expected: cols,
                actual: bad.len(),
            });
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            row_supports: rows.iter().map(|v| v.support.clone()).collect(),
        })
    }

    /// Sets entry `(r, c)` to 1.
    ///
    /// # Panics
    ///
    /// Panics if the position lies outside the matrix.
    pub fn insert(&mut self, r: usize, c: usize) {
        assert!(r < self.rows && c < self.cols, "entry ({r}, {c}) out of bounds");
        let row = &mut self.row_supports[r];
        if let Err(pos) = row.binary_search(&c) {
            row.insert(pos, c);
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of nonzero entries.
    pub fn nnz(&self) -> usize {
        self.row_supports.iter().map(Vec::len).sum()
    }

    /// Support of row `r`.
    pub fn row(&self, r: usize) -> &[usize] {
        &self.row_supports[r]
    }

    pub fn row_supports(&self) -> &[Vec<usize>] {
        &self.row_supports
    }

    pub fn row_vector(&self, r: usize) -> BinVector {
        BinVector::from_sorted_unchecked(self.cols, self.row_supports[r].clone())
    }

    pub fn get(&self, r: usize, c: usize) -> bool {
        self.row_supports[r].binary_search(&c).is_ok()
    }

    pub fn is_zero(&self) -> bool {
        self.row_supports.iter().all(Vec::is_empty)
    }

    /// Iterates over the `(row, col)` positions of all ones, row-major.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.row_supports
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().map(move |&c| (r, c)))
    }

    /// Row indices holding a 1, per column.
    pub fn column_supports(&self) -> Vec<Vec<usize>> {
        let mut cols = vec![Vec::new(); self.cols];
        for (r, c) in self.entries() {
            cols[c].push(r);
        }
        cols
    }

    pub fn transpose(&self) -> SparseBinMatrix {
        SparseBinMatrix {
            rows: self.cols,
            cols: self.rows,
            row_supports: self.column_supports(),
        }
    }

    pub fn to_dense(&self) -> Vec<Vec<u8>> {
        self.row_supports
            .iter()
            .map(|row| BinVector::from_sorted_unchecked(self.cols, row.clone()).to_dense())
            .collect()
    }

    /// Matrix-vector product `self · x` over GF(2).
    pub fn mul_vec(&self, x: &BinVector) -> CodeResult<BinVector> {
        if x.len() != self.cols {
            return Err(CodeError::DimensionMismatch {
                context: "matrix-vector product",
                expected: self.cols,
                actual: x.len(),
            });
        }
        let packed = x.to_packed();
        let support = self
            .row_supports
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().filter(|&&c| packed.get(c)).count() % 2 == 1)
            .map(|(r, _)| r)
            .collect();
        Ok(BinVector::from_sorted_unchecked(self.rows, support))
    }

    /// Product `self · otherᵗ` over GF(2).
    ///
    /// With `self` of shape m×n and `other` of shape k×n the result is m×k.
    /// Used to check `H · Gᵗ = 0`.
    pub fn mul_transpose(&self, other: &SparseBinMatrix) -> CodeResult<SparseBinMatrix> {
        if other.cols != self.cols {
            return Err(CodeError::DimensionMismatch {
                context: "matrix-transpose product",
                expected: self.cols,
                actual: other.cols,
            });
        }
        let mut out = SparseBinMatrix::new(self.rows, other.rows);
        for (j, other_row) in other.row_supports.iter().enumerate() {
            let packed = PackedBits::from_support(self.cols, other_row);
            for (i, row) in self.row_supports.iter().enumerate() {
                if row.iter().filter(|&&c| packed.get(c)).count() % 2 == 1 {
                    out.row_supports[i].push(j);
                }
            }
        }
        Ok(out)
    }

    /// Checks `self · x = 0`.
    pub fn is_codeword(&self, x: &BinVector) -> CodeResult<bool> {
        Ok(self.mul_vec(x)?.is_zero())
    }
}

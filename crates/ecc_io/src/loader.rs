use anyhow::{Context, Result, ensure};
use bitvec::prelude::*;
use ecc_core::{BinVector, CodeError, SparseBinMatrix};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Parses a dense matrix written as rows of `0`/`1` characters.
///
/// Blank lines and lines starting with `#` are skipped. Whitespace between
/// entries is ignored, so both `0110` and `0 1 1 0` are accepted.
pub fn parse_dense(input: &str) -> Result<SparseBinMatrix> {
    let mut rows: Vec<BitVec<u8, Lsb0>> = Vec::new();
    for (i, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut bits = BitVec::<u8, Lsb0>::with_capacity(trimmed.len());
        for ch in trimmed.chars().filter(|ch| !ch.is_whitespace()) {
            match ch {
                '0' => bits.push(false),
                '1' => bits.push(true),
                _ => {
                    return Err(CodeError::InvalidMatrix(format!(
                        "line {}: unexpected character {ch:?}",
                        i + 1
                    ))
                    .into());
                }
            }
        }
        rows.push(bits);
    }

    let cols = rows.first().map_or(0, |row| row.len());
    if let Some(r) = rows.iter().position(|row| row.len() != cols) {
        return Err(CodeError::InvalidMatrix(format!(
            "row {r} has {} entries, expected {cols}",
            rows[r].len()
        ))
        .into());
    }
    let supports = rows.iter().map(|row| row.iter_ones().collect()).collect();
    Ok(SparseBinMatrix::from_row_supports(cols, supports)?)
}

/// Writes a matrix as dense `0`/`1` rows.
pub fn write_dense<W: Write>(h: &SparseBinMatrix, out: &mut W) -> Result<()> {
    for r in 0..h.rows() {
        writeln!(out, "{}", h.row_vector(r))?;
    }
    Ok(())
}

/// Packs a vector into bytes, least significant bit first.
///
/// Every vector occupies a whole number of bytes so that records can be
/// concatenated and sliced back apart.
pub fn pack_vector(v: &BinVector) -> Vec<u8> {
    let mut bits = bitvec![u8, Lsb0; 0; v.len()];
    for &i in v.support() {
        bits.set(i, true);
    }
    bits.into_vec()
}

/// Writes vectors of a common length as consecutive packed records.
pub fn save_vectors<P: AsRef<Path>>(path: P, vectors: &[BinVector]) -> Result<()> {
    let mut file = File::create(path).context("Failed to create vector file")?;
    for v in vectors {
        file.write_all(&pack_vector(v))?;
    }
    Ok(())
}

/// Reads packed records of `bits_per_vector` bits each.
pub fn load_vectors<P: AsRef<Path>>(path: P, bits_per_vector: usize) -> Result<Vec<BinVector>> {
    let mut file = File::open(path).context("Failed to open vector file")?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    let raw = BitVec::<u8, Lsb0>::from_vec(buffer);

    let stride = bits_per_vector.div_ceil(8) * 8;
    ensure!(stride > 0, "vector length must be positive");
    ensure!(
        raw.len() % stride == 0,
        "file holds {} bits, not a multiple of the {stride}-bit record size",
        raw.len()
    );

    raw.chunks(stride)
        .map(|record| -> Result<BinVector> {
            let support = record[..bits_per_vector].iter_ones().collect();
            Ok(BinVector::from_support(bits_per_vector, support)?)
        })
        .collect()
}

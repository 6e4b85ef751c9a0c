//! Parsers and writers for sparse parity-check matrix files.
//!
//! Two interchange formats are understood: MatrixMarket coordinate files
//! (`.mtx`) and MacKay's alist format (`.alist`). Both use 1-based indices on
//! disk. Anything else is read as dense 0/1 text by [`crate::loader`].

use anyhow::{Context, Result, anyhow, bail, ensure};
use ecc_core::{CodeError, SparseBinMatrix};
use nom::IResult;
use nom::bytes::complete::{tag_no_case, take_till1};
use nom::character::complete::{alpha1, digit1, space0, space1};
use nom::combinator::{all_consuming, map_res, opt};
use nom::multi::separated_list1;
use nom::sequence::{delimited, preceded, tuple};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Value field declared in a MatrixMarket banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Pattern,
    Integer,
    Real,
}

fn index(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

fn index_list(input: &str) -> IResult<&str, Vec<usize>> {
    delimited(space0, separated_list1(space1, index), space0)(input)
}

fn banner(input: &str) -> IResult<&str, (&str, &str)> {
    let (rest, (_, _, _, _, _, _, field, _, symmetry)) = tuple((
        tag_no_case("%%MatrixMarket"),
        space1,
        tag_no_case("matrix"),
        space1,
        tag_no_case("coordinate"),
        space1,
        alpha1,
        space1,
        alpha1,
    ))(input)?;
    Ok((rest, (field, symmetry)))
}

/// One coordinate line: `row col [value]`.
fn entry(input: &str) -> IResult<&str, (usize, usize, Option<&str>)> {
    let (rest, (r, _, c, value)) = delimited(
        space0,
        tuple((
            index,
            space1,
            index,
            opt(preceded(space1, take_till1(char::is_whitespace))),
        )),
        space0,
    )(input)?;
    Ok((rest, (r, c, value)))
}

fn parse_line<'a, T>(
    line: &'a str,
    lineno: usize,
    parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
) -> Result<T> {
    all_consuming(parser)(line)
        .map(|(_, out)| out)
        .map_err(|e| anyhow!("line {lineno}: {e}"))
}

fn binary_value(field: Field, raw: Option<&str>, lineno: usize) -> Result<u8> {
    let value = match (field, raw) {
        (Field::Pattern, None) => return Ok(1),
        (Field::Pattern, Some(_)) => bail!("line {lineno}: pattern matrix entry carries a value"),
        (_, None) => bail!("line {lineno}: missing value"),
        (Field::Integer, Some(raw)) => raw
            .parse::<i64>()
            .with_context(|| format!("line {lineno}: bad integer {raw:?}"))?
            as f64,
        (Field::Real, Some(raw)) => raw
            .parse::<f64>()
            .with_context(|| format!("line {lineno}: bad real {raw:?}"))?,
    };
    if value == 0.0 {
        Ok(0)
    } else if value == 1.0 {
        Ok(1)
    } else {
        Err(CodeError::InvalidMatrix(format!("line {lineno}: non-binary value {value}")).into())
    }
}

/// Parses a MatrixMarket coordinate matrix.
///
/// Accepts `pattern`, `integer` and `real` fields with `general` symmetry.
/// Explicit zeros are dropped, and any value other than 0 or 1 is rejected
/// with [`CodeError::InvalidMatrix`].
pub fn parse_matrix_market(input: &str) -> Result<SparseBinMatrix> {
    let mut lines = input.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));

    let (lineno, first) = lines.next().context("empty MatrixMarket input")?;
    let (field, symmetry) = parse_line(first, lineno, banner)?;
    let field = match field.to_ascii_lowercase().as_str() {
        "pattern" => Field::Pattern,
        "integer" => Field::Integer,
        "real" => Field::Real,
        other => bail!("unsupported MatrixMarket field {other:?}"),
    };
    ensure!(
        symmetry.eq_ignore_ascii_case("general"),
        "unsupported MatrixMarket symmetry {symmetry:?}"
    );

    let mut body = lines.filter(|(_, l)| !l.is_empty() && !l.starts_with('%'));
    let (lineno, size) = body.next().context("missing MatrixMarket size line")?;
    let size = parse_line(size, lineno, index_list)?;
    let [rows, cols, nnz] = size[..] else {
        bail!("line {lineno}: expected `rows cols entries`");
    };

    let mut entries = Vec::with_capacity(nnz);
    for (lineno, line) in body {
        let (r, c, raw) = parse_line(line, lineno, entry)?;
        ensure!(
            (1..=rows).contains(&r) && (1..=cols).contains(&c),
            "line {lineno}: entry ({r}, {c}) outside a {rows}x{cols} matrix"
        );
        entries.push((r - 1, c - 1, binary_value(field, raw, lineno)?));
    }
    ensure!(
        entries.len() == nnz,
        "size line declares {nnz} entries, found {}",
        entries.len()
    );

    Ok(SparseBinMatrix::from_entries(rows, cols, entries)?)
}

/// Parses a matrix in alist format.
///
/// The header gives `cols rows`, then the maximum column and row weights,
/// then every column weight and every row weight. One adjacency line per
/// column follows, then one per row. Lists may be padded with zeros up to
/// the maximum weight or left unpadded. The row lists are redundant and are
/// checked against the columns when present.
pub fn parse_alist(input: &str) -> Result<SparseBinMatrix> {
    let lines: Vec<(usize, &str)> = input
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
        .collect();
    let mut pos = 0;
    let mut next_list = |what: &str| -> Result<Vec<usize>> {
        let &(lineno, line) = lines
            .get(pos)
            .with_context(|| format!("alist: missing {what}"))?;
        pos += 1;
        parse_line(line, lineno, index_list)
    };

    let header = next_list("size line")?;
    let [cols, rows] = header[..] else {
        bail!("alist: expected `cols rows` on the first line");
    };
    let limits = next_list("maximum weights")?;
    let [max_col_weight, max_row_weight] = limits[..] else {
        bail!("alist: expected two maximum weights");
    };
    let col_weights = next_list("column weights")?;
    let row_weights = next_list("row weights")?;
    ensure!(col_weights.len() == cols, "alist: expected {cols} column weights");
    ensure!(row_weights.len() == rows, "alist: expected {rows} row weights");

    let mut supports = vec![Vec::new(); rows];
    if max_col_weight > 0 {
        for (c, &weight) in col_weights.iter().enumerate() {
            let listed = adjacency(next_list("column list")?, weight, max_col_weight, rows)
                .with_context(|| format!("alist: column {c}"))?;
            for r in listed {
                supports[r].push(c);
            }
        }
    }
    let h = SparseBinMatrix::from_row_supports(cols, supports)?;

    let column_lines = if max_col_weight > 0 { cols } else { 0 };
    if max_row_weight == 0 || lines.len() == 4 + column_lines {
        return Ok(h);
    }
    for (r, &weight) in row_weights.iter().enumerate() {
        let mut listed = adjacency(next_list("row list")?, weight, max_row_weight, cols)
            .with_context(|| format!("alist: row {r}"))?;
        listed.sort_unstable();
        ensure!(
            listed == h.row(r),
            "alist: row {r} disagrees with the column lists"
        );
    }
    Ok(h)
}

/// Strips zero padding from a 1-based adjacency list and converts to 0-based.
fn adjacency(
    list: Vec<usize>,
    weight: usize,
    max_weight: usize,
    bound: usize,
) -> Result<Vec<usize>> {
    ensure!(weight <= max_weight, "weight {weight} exceeds maximum {max_weight}");
    ensure!(list.len() <= max_weight, "more than {max_weight} entries");
    let (entries, padding) = list.split_at(weight.min(list.len()));
    ensure!(entries.len() == weight, "expected {weight} entries");
    ensure!(padding.iter().all(|&p| p == 0), "nonzero padding");
    entries
        .iter()
        .map(|&i| {
            ensure!((1..=bound).contains(&i), "index {i} out of range 1..={bound}");
            Ok(i - 1)
        })
        .collect()
}

/// Writes a matrix as a MatrixMarket `pattern general` coordinate file.
pub fn write_matrix_market<W: Write>(h: &SparseBinMatrix, out: &mut W) -> Result<()> {
    writeln!(out, "%%MatrixMarket matrix coordinate pattern general")?;
    writeln!(out, "{} {} {}", h.rows(), h.cols(), h.nnz())?;
    for (r, c) in h.entries() {
        writeln!(out, "{} {}", r + 1, c + 1)?;
    }
    Ok(())
}

/// Writes a matrix in alist format, including the row lists.
pub fn write_alist<W: Write>(h: &SparseBinMatrix, out: &mut W) -> Result<()> {
    let columns = h.column_supports();
    let max_col = columns.iter().map(Vec::len).max().unwrap_or(0);
    let max_row = h.row_supports().iter().map(Vec::len).max().unwrap_or(0);

    writeln!(out, "{} {}", h.cols(), h.rows())?;
    writeln!(out, "{max_col} {max_row}")?;
    writeln!(out, "{}", join(columns.iter().map(Vec::len)))?;
    writeln!(out, "{}", join(h.row_supports().iter().map(Vec::len)))?;
    if max_col > 0 {
        for list in &columns {
            writeln!(out, "{}", join(padded(list, max_col)))?;
        }
    }
    if max_row > 0 {
        for list in h.row_supports() {
            writeln!(out, "{}", join(padded(list, max_row)))?;
        }
    }
    Ok(())
}

fn padded(list: &[usize], width: usize) -> impl Iterator<Item = usize> + '_ {
    list.iter()
        .map(|i| i + 1)
        .chain(std::iter::repeat(0))
        .take(width)
}

fn join(values: impl Iterator<Item = usize>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

/// Loads a parity-check matrix, choosing the format from the extension.
///
/// `.mtx` is MatrixMarket and `.alist` is alist. Everything else is
/// treated as dense 0/1 text.
pub fn load_matrix_file<P: AsRef<Path>>(path: P) -> Result<SparseBinMatrix> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read matrix file {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parsed = match ext.to_ascii_lowercase().as_str() {
        "mtx" => parse_matrix_market(&text),
        "alist" => parse_alist(&text),
        _ => crate::loader::parse_dense(&text),
    };
    parsed.with_context(|| format!("Failed to parse {}", path.display()))
}

/// Saves a parity-check matrix, choosing the format from the extension.
pub fn save_matrix_file<P: AsRef<Path>>(h: &SparseBinMatrix, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create matrix file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("mtx") => write_matrix_market(h, &mut out)?,
        Some(ext) if ext.eq_ignore_ascii_case("alist") => write_alist(h, &mut out)?,
        _ => crate::loader::write_dense(h, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecc_core::families;

    const HAMMING_MTX: &str = "\
%%MatrixMarket matrix coordinate integer general
% [7, 4, 3] Hamming code
3 7 12
1 1 1
1 3 1
1 5 1
1 7 1
2 2 1
2 3 1
2 6 1
2 7 1
3 4 1
3 5 1
3 6 1
3 7 1
";

    #[test]
    fn reads_integer_coordinate_file() {
        let h = parse_matrix_market(HAMMING_MTX).unwrap();
        assert_eq!((h.rows(), h.cols(), h.nnz()), (3, 7, 12));
        assert_eq!(h.row(0), &[0, 2, 4, 6]);
        assert_eq!(h, families::hamming_code(3));
    }

    #[test]
    fn rejects_non_binary_values() {
        let input = "%%MatrixMarket matrix coordinate integer general\n2 2 2\n1 1 1\n2 2 2\n";
        let err = parse_matrix_market(input).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodeError>(),
            Some(CodeError::InvalidMatrix(_))
        ));

        let input = "%%MatrixMarket matrix coordinate real general\n1 2 1\n1 2 0.5\n";
        assert!(parse_matrix_market(input).is_err());
    }

    #[test]
    fn drops_explicit_zeros() {
        let input = "%%MatrixMarket matrix coordinate real general\n2 2 2\n1 1 0.0\n2 1 1.0\n";
        let h = parse_matrix_market(input).unwrap();
        assert_eq!(h.nnz(), 1);
        assert!(h.get(1, 0));
    }

    #[test]
    fn rejects_entry_count_mismatch_and_bad_banner() {
        let input = "%%MatrixMarket matrix coordinate pattern general\n2 2 3\n1 1\n";
        assert!(parse_matrix_market(input).is_err());
        let input = "%%MatrixMarket matrix array integer general\n2 2\n";
        assert!(parse_matrix_market(input).is_err());
    }

    #[test]
    fn pattern_writer_round_trips() {
        let h = families::ring_code(5);
        let mut buf = Vec::new();
        write_matrix_market(&h, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("%%MatrixMarket matrix coordinate pattern general\n5 5 10\n"));
        assert_eq!(parse_matrix_market(&text).unwrap(), h);
    }

    #[test]
    fn reads_alist() {
        // Repetition code of length 3 with explicit row lists.
        let input = "3 2\n2 2\n1 2 1\n2 2\n1 0\n1 2\n2 0\n1 2\n2 3\n";
        let h = parse_alist(input).unwrap();
        assert_eq!(h, families::rep_code(3));
    }

    #[test]
    fn reads_unpadded_alist_without_row_lists() {
        let input = "3 2\n2 2\n1 2 1\n2 2\n1\n1 2\n2\n";
        assert_eq!(parse_alist(input).unwrap(), families::rep_code(3));
    }

    #[test]
    fn alist_row_lists_are_checked() {
        let input = "3 2\n2 2\n1 2 1\n2 2\n1 0\n1 2\n2 0\n1 3\n2 3\n";
        assert!(parse_alist(input).is_err());
    }

    #[test]
    fn alist_writer_round_trips() {
        let h = families::hamming_code(4);
        let mut buf = Vec::new();
        write_alist(&h, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("15 4\n"));
        assert_eq!(parse_alist(&text).unwrap(), h);
    }
}

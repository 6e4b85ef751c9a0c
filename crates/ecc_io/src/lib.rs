//! File formats for binary linear codes.
//!
//! Reads and writes parity-check matrices in MatrixMarket coordinate, alist
//! and dense 0/1 text form, stores packed vectors such as distance witnesses,
//! and parses decoder configuration strings. All functions return
//! `anyhow::Result` with the file or line that failed attached as context.

/// Decoder configuration strings.
///
/// Parses `name=value,...` lists into a `DecoderConfig`, starting from the
/// documented defaults and overriding only the named parameters.
pub mod config;

/// Dense text matrices and packed vector records.
///
/// Dense rows are read through `bitvec` so that a row can be turned into its
/// support without an intermediate byte per entry. Vectors are stored LSB
/// first with each record padded to a whole byte.
pub mod loader;

/// MatrixMarket and alist parsers and writers.
///
/// Also hosts the extension based dispatch used by the command-line tools.
pub mod parser;

pub use config::{format_decoder_config, parse_decoder_config};
pub use loader::{load_vectors, parse_dense, save_vectors};
pub use parser::{load_matrix_file, parse_alist, parse_matrix_market, save_matrix_file};

use crate::search::SearchArgs;
use anyhow::{Context, Result};
use ecc_core::{CodeParameters, compute_code_parameters_using};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Computes `[n, k, d]` for every matrix file in parallel.
///
/// Files that fail to load or analyse are reported and skipped. Returns the
/// number of failures.
pub fn run_batch(paths: &[PathBuf], search: &SearchArgs) -> Result<usize> {
    info!(files = paths.len(), "starting batch");
    let start = Instant::now();

    let results: Vec<Result<CodeParameters>> = paths
        .par_iter()
        .map(|path| -> Result<CodeParameters> {
            let h = ecc_io::load_matrix_file(path)?;
            let (params, _) = compute_code_parameters_using(&h, &search.estimator(&h)?)
                .with_context(|| format!("Failed to estimate distance of {}", path.display()))?;
            Ok(params)
        })
        .collect();

    let mut failures = 0;
    println!("Results");
    for (path, result) in paths.iter().zip(&results) {
        match result {
            Ok(params) => println!("{:<40} {params}", path.display()),
            Err(err) => {
                failures += 1;
                warn!(path = %path.display(), "{err:#}");
                println!("{:<40} error", path.display());
            }
        }
    }
    println!("Time: {:.4} s", start.elapsed().as_secs_f64());
    println!("Solved: {}/{}", paths.len() - failures, paths.len());
    Ok(failures)
}

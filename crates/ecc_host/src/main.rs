mod batch;
mod generator;
mod search;
mod stats;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ecc_core::{compute_code_parameters_using, construct_generator_matrix, row_reduce};
use generator::{Family, RandomShape};
use search::SearchArgs;
use stats::DistanceReport;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "ecc", about = "Parameters of binary linear codes")]
struct Cli {
    /// Log engine internals at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print [n, k, d] of a parity-check matrix.
    Params {
        matrix: PathBuf,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Print rank and dimension.
    Dimension { matrix: PathBuf },
    /// Write a generator matrix for the code.
    Generator {
        matrix: PathBuf,
        /// Output file; the extension selects the format. Dense text on stdout if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Estimate the minimum distance and print a search report.
    Distance {
        matrix: PathBuf,
        #[command(flatten)]
        search: SearchArgs,
        /// Save the minimum-weight witness as a packed record.
        #[arg(long)]
        witness: Option<PathBuf>,
    },
    /// Generate a parity-check matrix of a standard family.
    Gen {
        #[arg(value_enum)]
        family: Family,
        /// Hamming rank, or code length for the other families.
        #[arg(long)]
        size: usize,
        #[arg(short, long, default_value = "code.mtx")]
        output: PathBuf,
        /// Number of checks of a random code.
        #[arg(long, default_value_t = 20)]
        rows: usize,
        /// Bits touched by each check of a random code.
        #[arg(long, default_value_t = 4)]
        row_weight: usize,
        #[arg(long, default_value_t = 12345)]
        seed: u64,
    },
    /// Compute [n, k, d] for many matrix files in parallel.
    Batch {
        #[arg(required = true)]
        matrices: Vec<PathBuf>,
        #[command(flatten)]
        search: SearchArgs,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Params { matrix, search } => {
            let h = ecc_io::load_matrix_file(&matrix)?;
            let (params, _) = compute_code_parameters_using(&h, &search.estimator(&h)?)?;
            println!("{params}");
        }
        Commands::Dimension { matrix } => {
            let h = ecc_io::load_matrix_file(&matrix)?;
            let rank = row_reduce(&h).rank();
            println!("n: {}", h.cols());
            println!("rank: {rank}");
            println!("k: {}", h.cols() - rank);
        }
        Commands::Generator { matrix, output } => {
            let h = ecc_io::load_matrix_file(&matrix)?;
            let g = construct_generator_matrix(&h);
            match output {
                Some(path) => {
                    ecc_io::save_matrix_file(&g, &path)?;
                    info!(rows = g.rows(), path = %path.display(), "wrote generator matrix");
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    ecc_io::loader::write_dense(&g, &mut stdout)?;
                }
            }
        }
        Commands::Distance {
            matrix,
            search,
            witness,
        } => {
            let h = ecc_io::load_matrix_file(&matrix)?;
            info!(rows = h.rows(), cols = h.cols(), nnz = h.nnz(), "loaded matrix");
            let start = Instant::now();
            let (params, estimate) = compute_code_parameters_using(&h, &search.estimator(&h)?)
                .with_context(|| format!("Failed to estimate distance of {}", matrix.display()))?;
            let report = DistanceReport {
                params,
                estimate: &estimate,
                elapsed: start.elapsed(),
            };
            report.print_report();
            if let Some(path) = witness {
                ecc_io::save_vectors(&path, std::slice::from_ref(&estimate.codeword))?;
                info!(path = %path.display(), "saved witness");
            }
        }
        Commands::Gen {
            family,
            size,
            output,
            rows,
            row_weight,
            seed,
        } => {
            let shape = RandomShape {
                rows,
                row_weight,
                seed,
            };
            generator::generate_family(family, size, shape, &output)?;
        }
        Commands::Batch { matrices, search } => {
            let failures = batch::run_batch(&matrices, &search)?;
            if failures > 0 {
                bail!("{failures} of {} files failed", matrices.len());
            }
        }
    }
    Ok(())
}

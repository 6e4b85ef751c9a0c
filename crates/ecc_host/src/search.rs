use anyhow::{Context, Result};
use clap::Args;
use ecc_common::defaults;
use ecc_core::{DistanceEstimator, EstimatorConfig, OsdOracle, SparseBinMatrix};
use ecc_io::{format_decoder_config, parse_decoder_config};
use tracing::debug;

/// Estimator options shared by every subcommand that searches for codewords.
#[derive(Args, Clone, Debug)]
pub struct SearchArgs {
    /// Acceptable probability of missing a lighter codeword.
    #[arg(long, default_value_t = defaults::MISS_PROBABILITY)]
    ps: f64,
    /// Seed for a reproducible search.
    #[arg(long)]
    seed: Option<u64>,
    /// Parallel workers; a seeded search returns the same result for any count.
    #[arg(long)]
    workers: Option<usize>,
    #[arg(long, default_value_t = defaults::MAX_TRIALS)]
    max_trials: u64,
    #[arg(long, default_value_t = defaults::EXHAUSTIVE_MAX_DIM)]
    exhaustive_max_dim: usize,
    /// Decoder configuration, e.g. `osd_method=osd_cs,osd_order=4`.
    #[arg(long)]
    decoder: Option<String>,
}

impl SearchArgs {
    pub fn config(&self) -> EstimatorConfig {
        let mut config = EstimatorConfig::default()
            .with_miss_probability(self.ps)
            .with_workers(self.workers.unwrap_or_else(rayon::current_num_threads))
            .with_max_trials(self.max_trials)
            .with_exhaustive_max_dim(self.exhaustive_max_dim);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }

    /// Builds the estimator for `h`, attaching an OSD oracle when requested.
    pub fn estimator(&self, h: &SparseBinMatrix) -> Result<DistanceEstimator> {
        let estimator = DistanceEstimator::new(self.config());
        let Some(spec) = &self.decoder else {
            return Ok(estimator);
        };
        let decoder = parse_decoder_config(spec).context("Invalid --decoder")?;
        debug!(decoder = %format_decoder_config(&decoder), "attaching oracle");
        let oracle = OsdOracle::new(h, &decoder)?;
        Ok(estimator.with_oracle(oracle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use ecc_core::compute_code_parameters_using;
    use ecc_core::families::hamming_code;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        search: SearchArgs,
    }

    fn parse(args: &[&str]) -> SearchArgs {
        Wrapper::parse_from(std::iter::once("ecc").chain(args.iter().copied())).search
    }

    #[test]
    fn seeded_search_ignores_worker_flag() {
        let h = hamming_code(5);
        let runs: Vec<_> = ["1", "3", "8"]
            .into_iter()
            .map(|workers| {
                let args = parse(&[
                    "--seed",
                    "17",
                    "--workers",
                    workers,
                    "--exhaustive-max-dim",
                    "0",
                ]);
                compute_code_parameters_using(&h, &args.estimator(&h).unwrap()).unwrap()
            })
            .collect();
        for (params, estimate) in &runs[1..] {
            assert_eq!(params, &runs[0].0);
            assert_eq!(estimate.samples, runs[0].1.samples);
            assert_eq!(estimate.codeword, runs[0].1.codeword);
        }

        let default_pool = parse(&["--seed", "17", "--exhaustive-max-dim", "0"]);
        let estimator = default_pool.estimator(&h).unwrap();
        let (_, estimate) = compute_code_parameters_using(&h, &estimator).unwrap();
        assert_eq!(estimate.codeword, runs[0].1.codeword);
    }

    #[test]
    fn invalid_decoder_is_reported() {
        let h = hamming_code(3);
        let args = parse(&["--decoder", "osd_depth=3"]);
        let err = args.estimator(&h).err().expect("expected an error");
        assert!(format!("{err:#}").contains("Invalid --decoder"));
    }
}

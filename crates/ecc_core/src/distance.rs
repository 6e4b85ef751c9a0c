//! Randomized minimum-distance estimation.
//!
//! Codes of small dimension are enumerated exhaustively in Gray-code order,
//! which yields the exact distance together with the full weight
//! distribution. Larger codes are searched with random information sets:
//! every trial reduces `H` under a random column priority, takes the free
//! columns as the information set, and scores the codewords that carry at
//! most `p` nonzero information bits (`p = 1`, or `p = 2` for moderate
//! dimension). An attached [`DecodingOracle`] contributes one extra candidate
//! per trial.
//!
//! # Stopping rule
//!
//! A fixed codeword of weight `w` is exposed by a trial with probability
//!
//! ```text
//! P(w) = sum_{j=1..p} C(w, j) · C(n - w, k - j) / C(n, k)
//! ```
//!
//! With current best weight `d`, `q = min_{1 <= w < d} P(w)` bounds from
//! below the chance that a trial reveals any lighter codeword, should one
//! exist. After `T` trials without improvement the miss-probability is at
//! most `(1 - q)^T`; the search stops once that drops to the requested
//! miss-probability. The trial budget is a plain counter so that seeded runs
//! are reproducible.
//!
//! Trial `i` draws from ChaCha stream `i` of the seed, and rounds have a fixed
//! size, so a seeded run returns the same estimate for any number of workers.

use crate::bit_utils::PackedBits;
use crate::echelon::{RowEchelon, row_reduce, row_reduce_with_order};
use crate::oracle::DecodingOracle;
use crate::sparse::{BinVector, SparseBinMatrix, xor_sorted};
use crate::{CodeError, CodeResult};
use ecc_common::defaults;
use rand::seq::{SliceRandom, index};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hard ceiling on exhaustive enumeration, whatever the configuration says.
const MAX_EXHAUSTIVE_DIM: usize = 32;

/// Tuning knobs of the estimator.
#[derive(Clone, Debug)]
pub struct EstimatorConfig {
    /// Target probability of having missed a lighter codeword, in (0, 1).
    pub miss_probability: f64,

    /// Maximum number of randomized samples.
    pub max_trials: u64,

    /// Dimensions up to this value are enumerated exhaustively.
    pub exhaustive_max_dim: usize,

    /// Weight-2 information patterns are scored when `k` is at most this.
    pub pair_search_max_dim: usize,

    /// Number of parallel workers sharing each round.
    pub workers: usize,

    /// Trials between two merge points.
    pub trials_per_round: u64,

    /// Seed for reproducible runs. `None` draws a fresh seed per call.
    pub seed: Option<u64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            miss_probability: defaults::MISS_PROBABILITY,
            max_trials: defaults::MAX_TRIALS,
            exhaustive_max_dim: defaults::EXHAUSTIVE_MAX_DIM,
            pair_search_max_dim: defaults::PAIR_SEARCH_MAX_DIM,
            workers: 1,
            trials_per_round: defaults::TRIALS_PER_ROUND,
            seed: None,
        }
    }
}

impl EstimatorConfig {
    pub fn with_miss_probability(mut self, ps: f64) -> Self {
        self.miss_probability = ps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_max_trials(mut self, max_trials: u64) -> Self {
        self.max_trials = max_trials;
        self
    }

    pub fn with_exhaustive_max_dim(mut self, dim: usize) -> Self {
        self.exhaustive_max_dim = dim;
        self
    }
}

/// How the search terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Every nonzero codeword was enumerated; the distance is exact.
    Exhaustive,
    /// The miss-probability target was met.
    ConfidenceReached,
    /// The trial budget ran out first; the distance is a best-effort bound.
    BudgetExhausted,
}

impl SearchOutcome {
    /// Whether the reported distance carries the requested guarantee.
    pub fn is_guaranteed(&self) -> bool {
        !matches!(self, SearchOutcome::BudgetExhausted)
    }
}

/// Result of a distance estimation.
#[derive(Clone, Debug)]
pub struct DistanceEstimate {
    /// Weight of the lightest nonzero codeword found.
    pub distance: usize,

    /// Number of samples consumed: trials, or enumerated codewords.
    pub samples: u64,

    /// Witness of weight `distance`.
    pub codeword: BinVector,

    pub outcome: SearchOutcome,

    /// Dimension `k` of the searched code.
    pub dimension: usize,

    /// Per-sample lightest weight, counted by weight. For exhaustive runs
    /// this is the weight distribution of the code.
    pub histogram: BTreeMap<usize, u64>,
}

impl DistanceEstimate {
    /// Number of samples whose lightest codeword had weight `distance`.
    pub fn best_hits(&self) -> u64 {
        self.histogram.get(&self.distance).copied().unwrap_or(0)
    }

    /// Empirical probability that a sample reproduces the best weight.
    pub fn hit_rate(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.best_hits() as f64 / self.samples as f64
        }
    }
}

/// Estimates the minimum distance of the code defined by `h`.
///
/// Uses the default configuration with miss-probability `ps` and a fresh
/// random seed.
pub fn estimate_min_distance(h: &SparseBinMatrix, ps: f64) -> CodeResult<DistanceEstimate> {
    DistanceEstimator::new(EstimatorConfig::default().with_miss_probability(ps)).estimate(h)
}

/// Minimum-distance estimator with an optional decoding oracle.
pub struct DistanceEstimator {
    config: EstimatorConfig,
    oracle: Option<Arc<dyn DecodingOracle>>,
}

impl DistanceEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            config,
            oracle: None,
        }
    }

    /// Attaches an oracle consulted once per randomized trial.
    pub fn with_oracle<O: DecodingOracle + 'static>(self, oracle: O) -> Self {
        self.with_shared_oracle(Arc::new(oracle))
    }

    pub fn with_shared_oracle(mut self, oracle: Arc<dyn DecodingOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Runs the search on `h`.
    ///
    /// Fails with [`CodeError::DegenerateCode`] when `h` has full column
    /// rank, with [`CodeError::InvalidProbability`] when the configured
    /// miss-probability lies outside (0, 1), and with
    /// [`CodeError::InvalidConfig`] when the trial budget is zero.
    pub fn estimate(&self, h: &SparseBinMatrix) -> CodeResult<DistanceEstimate> {
        let ps = self.config.miss_probability;
        if !(ps > 0.0 && ps < 1.0) {
            return Err(CodeError::InvalidProbability(ps));
        }
        if self.config.max_trials == 0 {
            return Err(CodeError::InvalidConfig(
                "trial budget must allow at least one trial".into(),
            ));
        }

        let echelon = row_reduce(h);
        let k = echelon.nullity();
        if k == 0 {
            return Err(CodeError::DegenerateCode { cols: h.cols() });
        }

        let estimate = if k <= self.config.exhaustive_max_dim.min(MAX_EXHAUSTIVE_DIM) {
            enumerate_codewords(&echelon)
        } else {
            self.information_set_search(h, k)?
        };

        debug_assert!(h.is_codeword(&estimate.codeword).unwrap_or(false));
        match estimate.outcome {
            SearchOutcome::BudgetExhausted => warn!(
                distance = estimate.distance,
                samples = estimate.samples,
                "trial budget exhausted before the confidence target was met"
            ),
            outcome => info!(
                n = h.cols(),
                k,
                distance = estimate.distance,
                samples = estimate.samples,
                ?outcome,
                "distance estimate finished"
            ),
        }
        Ok(estimate)
    }

    fn information_set_search(
        &self,
        h: &SparseBinMatrix,
        k: usize,
    ) -> CodeResult<DistanceEstimate> {
        let n = h.cols();
        let pair_search = k <= self.config.pair_search_max_dim;
        let search_order = if pair_search { 2 } else { 1 };
        let workers = self.config.workers.max(1);
        let per_round = self.config.trials_per_round.max(1);
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let ps = self.config.miss_probability;
        let oracle = self.oracle.as_deref();

        debug!(n, k, workers, seed, search_order, "starting information-set search");

        let mut best: Option<Candidate> = None;
        let mut histogram = BTreeMap::new();
        let mut samples = 0u64;
        let mut required: Option<(usize, u64)> = None;

        let outcome = loop {
            let remaining = self.config.max_trials.saturating_sub(samples);
            if remaining == 0 {
                break SearchOutcome::BudgetExhausted;
            }
            let planned = remaining.min(per_round);
            let chunk = planned.div_ceil(workers as u64);
            let round_start = samples;

            let results: Vec<RoundResult> = (0..planned.div_ceil(chunk) as usize)
                .into_par_iter()
                .map(|w| -> CodeResult<RoundResult> {
                    let lo = w as u64 * chunk;
                    let hi = (lo + chunk).min(planned);
                    let mut local = RoundResult::default();
                    for t in lo..hi {
                        let sample = round_start + t;
                        let mut rng = trial_rng(seed, sample);
                        let trial = run_trial(h, pair_search, oracle, &mut rng)?;
                        if let Some((weight, codeword)) = trial {
                            *local.histogram.entry(weight).or_insert(0) += 1;
                            if local.best.as_ref().is_none_or(|b| weight < b.weight) {
                                local.best = Some(Candidate {
                                    weight,
                                    sample,
                                    codeword,
                                });
                            }
                        }
                    }
                    Ok(local)
                })
                .collect::<CodeResult<_>>()?;

            samples += planned;

            let mut round_best: Option<Candidate> = None;
            for result in results {
                for (weight, count) in result.histogram {
                    *histogram.entry(weight).or_insert(0) += count;
                }
                if let Some(candidate) = result.best {
                    if round_best.as_ref().is_none_or(|b| candidate.precedes(b)) {
                        round_best = Some(candidate);
                    }
                }
            }
            if let Some(candidate) = round_best {
                if best.as_ref().is_none_or(|b| candidate.weight < b.weight) {
                    debug!(
                        weight = candidate.weight,
                        sample = candidate.sample,
                        "improved distance bound"
                    );
                    best = Some(candidate);
                }
            }

            let Some(current) = best.as_ref() else {
                continue;
            };
            if current.weight <= 1 {
                break SearchOutcome::ConfidenceReached;
            }
            let needed = match required {
                Some((weight, needed)) if weight == current.weight => needed,
                _ => {
                    let needed = required_trials(n, k, current.weight, search_order, ps);
                    required = Some((current.weight, needed));
                    needed
                }
            };
            let since_improvement = samples - (current.sample + 1);
            if since_improvement >= needed {
                break SearchOutcome::ConfidenceReached;
            }
        };

        // At least one trial ran and every trial exposes the basis vector of
        // some free column.
        let best = best.ok_or(CodeError::DegenerateCode { cols: n })?;
        Ok(DistanceEstimate {
            distance: best.weight,
            samples,
            codeword: best.codeword,
            outcome,
            dimension: k,
            histogram,
        })
    }
}

/// Random stream of trial `sample` under `seed`.
fn trial_rng(seed: u64, sample: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(sample);
    rng
}

struct Candidate {
    weight: usize,
    sample: u64,
    codeword: BinVector,
}

impl Candidate {
    /// Lower weight wins; equal weights go to the earlier sample.
    fn precedes(&self, other: &Candidate) -> bool {
        (self.weight, self.sample) < (other.weight, other.sample)
    }
}

#[derive(Default)]
struct RoundResult {
    best: Option<Candidate>,
    histogram: BTreeMap<usize, u64>,
}

/// Enumerates all nonzero codewords in Gray-code order.
fn enumerate_codewords(echelon: &RowEchelon) -> DistanceEstimate {
    let basis: Vec<PackedBits> = echelon
        .null_space_basis()
        .iter()
        .map(BinVector::to_packed)
        .collect();
    let total = (1u64 << basis.len()) - 1;

    let mut current = PackedBits::zeros(echelon.cols());
    let mut histogram = BTreeMap::new();
    let mut best: Option<(usize, PackedBits)> = None;

    for step in 1..=total {
        current.xor_assign(&basis[step.trailing_zeros() as usize]);
        let weight = current.count_ones();
        *histogram.entry(weight).or_insert(0) += 1;
        if best.as_ref().is_none_or(|(w, _)| weight < *w) {
            best = Some((weight, current.clone()));
        }
    }

    // k >= 1, so at least one codeword was visited.
    let (distance, witness) = best.unwrap_or_else(|| (0, PackedBits::zeros(echelon.cols())));
    DistanceEstimate {
        distance,
        samples: total,
        codeword: BinVector::from_packed(&witness),
        outcome: SearchOutcome::Exhaustive,
        dimension: basis.len(),
        histogram,
    }
}

/// Runs a single randomized information-set trial.
///
/// Returns the lightest codeword the trial exposes together with its weight.
fn run_trial<R: Rng>(
    h: &SparseBinMatrix,
    pair_search: bool,
    oracle: Option<&dyn DecodingOracle>,
    rng: &mut R,
) -> CodeResult<Option<(usize, BinVector)>> {
    let n = h.cols();
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    let echelon = row_reduce_with_order(h, &order)?;
    let by_col = echelon.column_pivot_rows();
    let free = echelon.free_columns();

    // (weight, first free index, optional second free index)
    let mut best: Option<(usize, usize, Option<usize>)> = None;
    for (i, &f) in free.iter().enumerate() {
        let weight = 1 + by_col[f].len();
        if best.is_none_or(|(w, _, _)| weight < w) {
            best = Some((weight, i, None));
        }
    }

    if pair_search && free.len() >= 2 {
        let rank = echelon.rank();
        let packed: Vec<PackedBits> = free
            .iter()
            .map(|&f| PackedBits::from_support(rank, &by_col[f]))
            .collect();
        for i in 0..packed.len() {
            for j in (i + 1)..packed.len() {
                let weight = 2 + packed[i].xor_count(&packed[j]);
                if best.is_none_or(|(w, _, _)| weight < w) {
                    best = Some((weight, i, Some(j)));
                }
            }
        }
    }

    let mut result = best.map(|(weight, i, j)| {
        let codeword = match j {
            None => echelon.assemble(&[free[i]], &by_col[free[i]]),
            Some(j) => echelon.assemble(
                &[free[i], free[j]],
                &xor_sorted(&by_col[free[i]], &by_col[free[j]]),
            ),
        };
        (weight, codeword)
    });

    if let Some(oracle) = oracle {
        if let Some(candidate) = oracle_candidate(h, oracle, rng)? {
            if result.as_ref().is_none_or(|(w, _)| candidate.weight() < *w) {
                result = Some((candidate.weight(), candidate));
            }
        }
    }

    Ok(result)
}

/// Asks the oracle to explain the syndrome of a random low-weight
/// perturbation and returns the resulting nonzero codeword, if any.
fn oracle_candidate<R: Rng>(
    h: &SparseBinMatrix,
    oracle: &dyn DecodingOracle,
    rng: &mut R,
) -> CodeResult<Option<BinVector>> {
    let n = h.cols();
    let weight = rng.gen_range(1..=n.min(2));
    let perturbation = BinVector::from_support(n, index::sample(rng, n, weight).into_vec())?;
    let syndrome = h.mul_vec(&perturbation)?;

    let Some(x) = oracle.decode(&syndrome) else {
        return Ok(None);
    };
    if x.len() != n {
        return Ok(None);
    }
    let candidate = x.add(&perturbation)?;
    if candidate.is_zero() || !h.is_codeword(&candidate)? {
        return Ok(None);
    }
    Ok(Some(candidate))
}

/// Natural logarithm of the binomial coefficient, `None` when `k > n`.
fn ln_binomial(n: usize, k: usize) -> Option<f64> {
    if k > n {
        return None;
    }
    let k = k.min(n - k);
    Some(
        (1..=k)
            .map(|i| ((n - k + i) as f64 / i as f64).ln())
            .sum(),
    )
}

/// Probability that one trial exposes a fixed codeword of weight `w`.
fn exposure_probability(n: usize, k: usize, w: usize, search_order: usize) -> f64 {
    let Some(total) = ln_binomial(n, k) else {
        return 0.0;
    };
    (1..=search_order.min(w).min(k))
        .filter_map(|j| {
            let ways = ln_binomial(w, j)? + ln_binomial(n - w, k - j)?;
            Some((ways - total).exp())
        })
        .sum::<f64>()
        .min(1.0)
}

/// Trials without improvement needed before a best weight of `d` is
/// accepted at miss-probability `ps`.
fn required_trials(n: usize, k: usize, d: usize, search_order: usize, ps: f64) -> u64 {
    let q = (1..d)
        .map(|w| exposure_probability(n, k, w, search_order))
        .fold(1.0f64, f64::min);
    if q >= 1.0 {
        return 1;
    }
    if q <= 0.0 {
        return u64::MAX;
    }
    (ps.ln() / (-q).ln_1p()).ceil() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::families;

    fn seeded(seed: u64) -> EstimatorConfig {
        EstimatorConfig::default().with_seed(seed)
    }

    #[test]
    fn exhaustive_hamming_7_4() {
        let h = families::hamming_code(3);
        let est = estimate_min_distance(&h, 0.025).unwrap();
        assert_eq!(est.outcome, SearchOutcome::Exhaustive);
        assert_eq!(est.distance, 3);
        assert_eq!(est.codeword.weight(), 3);
        assert!(h.is_codeword(&est.codeword).unwrap());
        assert_eq!(est.samples, 15);
        // Weight enumerator of the [7, 4] Hamming code: 7 x^3 + 7 x^4 + x^7.
        assert_eq!(
            est.histogram,
            BTreeMap::from([(3, 7), (4, 7), (7, 1)])
        );
        assert_eq!(est.best_hits(), 7);
    }

    #[test]
    fn randomized_search_on_hamming_7_4() {
        let h = families::hamming_code(3);
        let config = seeded(11).with_exhaustive_max_dim(0);
        let est = DistanceEstimator::new(config).estimate(&h).unwrap();
        assert_eq!(est.outcome, SearchOutcome::ConfidenceReached);
        assert_eq!(est.distance, 3);
        assert!(h.is_codeword(&est.codeword).unwrap());
        assert_eq!(est.histogram.values().sum::<u64>(), est.samples);
    }

    #[test]
    fn ring_code_distance_is_its_length() {
        for n in 3..10 {
            let h = families::ring_code(n);
            let est = estimate_min_distance(&h, 0.025).unwrap();
            assert_eq!(est.distance, n);
            assert_eq!(est.codeword.support(), (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn degenerate_code_is_reported() {
        let h = SparseBinMatrix::from_dense(&[vec![1, 1, 0], vec![0, 1, 0], vec![0, 0, 1]])
            .unwrap();
        assert_eq!(
            estimate_min_distance(&h, 0.1).unwrap_err(),
            CodeError::DegenerateCode { cols: 3 }
        );
    }

    #[test]
    fn probability_must_be_open_unit_interval() {
        let h = families::rep_code(4);
        for ps in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(matches!(
                estimate_min_distance(&h, ps),
                Err(CodeError::InvalidProbability(_))
            ));
        }
    }

    #[test]
    fn zero_matrix_has_distance_one() {
        let h = SparseBinMatrix::new(2, 40);
        let config = seeded(1).with_exhaustive_max_dim(0);
        let est = DistanceEstimator::new(config).estimate(&h).unwrap();
        assert_eq!(est.distance, 1);
        assert_eq!(est.samples, defaults::TRIALS_PER_ROUND);
        assert_eq!(est.outcome, SearchOutcome::ConfidenceReached);
    }

    #[test]
    fn budget_exhaustion_is_flagged() {
        let h = families::hamming_code(5);
        let config = seeded(5).with_exhaustive_max_dim(0).with_max_trials(3);
        let est = DistanceEstimator::new(config).estimate(&h).unwrap();
        assert_eq!(est.samples, 3);
        assert_eq!(est.outcome, SearchOutcome::BudgetExhausted);
        assert!(!est.outcome.is_guaranteed());
        assert!(est.distance >= 3);
        assert!(h.is_codeword(&est.codeword).unwrap());
    }

    #[test]
    fn zero_trial_budget_is_rejected() {
        let h = families::hamming_code(5);
        let config = seeded(5).with_exhaustive_max_dim(0).with_max_trials(0);
        let err = DistanceEstimator::new(config).estimate(&h).unwrap_err();
        assert!(matches!(err, CodeError::InvalidConfig(_)));
    }

    #[test]
    fn seeded_runs_do_not_depend_on_worker_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let h = families::random_code(24, 60, 5, &mut rng);
        let run = |workers| {
            let config = seeded(2024).with_workers(workers).with_exhaustive_max_dim(0);
            DistanceEstimator::new(config).estimate(&h).unwrap()
        };
        let single = run(1);
        for workers in [1, 2, 3, 8, 16] {
            let est = run(workers);
            assert_eq!(est.distance, single.distance, "workers = {workers}");
            assert_eq!(est.samples, single.samples, "workers = {workers}");
            assert_eq!(est.codeword, single.codeword, "workers = {workers}");
            assert_eq!(est.histogram, single.histogram, "workers = {workers}");
        }
    }

    #[test]
    fn sample_count_ignores_worker_count() {
        let h = families::hamming_code(6);
        let samples: Vec<u64> = [1, 2, 4, 8, 16]
            .into_iter()
            .map(|workers| {
                let config = seeded(5).with_workers(workers).with_exhaustive_max_dim(0);
                let est = DistanceEstimator::new(config).estimate(&h).unwrap();
                assert_eq!(est.dimension, 57);
                est.samples
            })
            .collect();
        assert!(samples.iter().all(|&s| s == samples[0]), "{samples:?}");
        assert_eq!(samples[0] % defaults::TRIALS_PER_ROUND, 0);
    }

    #[test]
    fn oracle_candidates_are_verified() {
        let h = families::hamming_code(4);
        // An oracle that lies: its answers never satisfy the syndrome.
        let liar = |s: &BinVector| BinVector::unit(15, s.len() % 15).ok();
        let config = seeded(3).with_exhaustive_max_dim(0);
        let est = DistanceEstimator::new(config)
            .with_oracle(liar)
            .estimate(&h)
            .unwrap();
        assert!(h.is_codeword(&est.codeword).unwrap());
        assert_eq!(est.codeword.weight(), est.distance);
    }

    #[test]
    fn osd_oracle_integrates_with_search() {
        use crate::oracle::OsdOracle;
        use ecc_common::decoder::DecoderConfig;

        let h = families::hamming_code(4);
        let oracle = OsdOracle::new(&h, &DecoderConfig::default()).unwrap();
        let config = seeded(8).with_exhaustive_max_dim(0);
        let est = DistanceEstimator::new(config)
            .with_oracle(oracle)
            .estimate(&h)
            .unwrap();
        assert_eq!(est.distance, 3);
    }

    #[test]
    fn exposure_probability_limits() {
        // A weight-1 codeword is exposed whenever its bit is informational.
        let p = exposure_probability(10, 4, 1, 1);
        assert!((p - 0.4).abs() < 1e-12);
        // Weight 2 with single-bit patterns: 2 * C(8, 3) / C(10, 4).
        let p = exposure_probability(10, 4, 2, 1);
        assert!((p - 2.0 * 56.0 / 210.0).abs() < 1e-12);
        // Adding pair patterns: + C(8, 2) / C(10, 4).
        let p2 = exposure_probability(10, 4, 2, 2);
        assert!((p2 - (112.0 + 28.0) / 210.0).abs() < 1e-12);
    }

    #[test]
    fn required_trials_grow_with_confidence() {
        let loose = required_trials(100, 50, 6, 1, 0.1);
        let tight = required_trials(100, 50, 6, 1, 0.001);
        assert!(tight > loose && loose > 0);
        assert_eq!(required_trials(100, 50, 1, 1, 0.1), 1);
    }
}

//! Summary of a distance search for terminal output.

use ecc_core::{CodeParameters, DistanceEstimate, SearchOutcome};
use std::time::Duration;

/// Histogram rows wider than this are scaled down.
const BAR_WIDTH: u64 = 40;

pub struct DistanceReport<'a> {
    pub params: CodeParameters,
    pub estimate: &'a DistanceEstimate,
    pub elapsed: Duration,
}

impl DistanceReport<'_> {
    fn outcome_label(&self) -> &'static str {
        match self.estimate.outcome {
            SearchOutcome::Exhaustive => "exhaustive (exact)",
            SearchOutcome::ConfidenceReached => "confidence reached",
            SearchOutcome::BudgetExhausted => "budget exhausted (upper bound only)",
        }
    }

    /// Prints parameters, search statistics and the weight histogram.
    ///
    /// For exhaustive runs the histogram is the weight distribution of the
    /// code. Otherwise it counts, per trial, the lightest weight the trial
    /// exposed.
    pub fn print_report(&self) {
        let est = self.estimate;
        println!("\nCode Parameters");
        println!("[n, k, d]: {}", self.params);
        println!("Outcome:   {}", self.outcome_label());
        println!("Samples:   {}", est.samples);
        println!(
            "Hit rate:  {:.4} ({} of {})",
            est.hit_rate(),
            est.best_hits(),
            est.samples
        );
        println!("Time:      {:.4} s", self.elapsed.as_secs_f64());

        let peak = est.histogram.values().copied().max().unwrap_or(0);
        if peak == 0 {
            return;
        }
        println!("Distribution (weight: count):");
        for (&weight, &count) in &est.histogram {
            let bar = (count * BAR_WIDTH).div_ceil(peak) as usize;
            println!("[{weight:4}]: {count:8} {}", "#".repeat(bar));
        }
    }
}

//! Common definitions and constants shared across the code analysis workspace.
//!
//! This crate provides the default tuning constants of the minimum-distance
//! estimator and the named-parameter configuration handed to external
//! decoders. Everything here is plain data so that the core library, the
//! file-format crate and the command-line host agree on a single set of
//! defaults.

// Default tuning constants for code analysis.
//
// Collects the numbers that decide how hard the minimum-distance estimator
// searches before it gives up or declares a confidence target met. They are
// consumed by `ecc_core::distance::EstimatorConfig::default` and surfaced as
// CLI defaults by the host binary.
pub mod defaults {
    /// Target miss-probability used when the caller does not supply one.
    ///
    /// The estimator keeps sampling information sets until the probability of
    /// having overlooked a strictly lighter codeword falls below this value.
    pub const MISS_PROBABILITY: f64 = 0.025;

    /// Upper bound on the number of randomized samples per estimate.
    ///
    /// Acts as a safety valve for large codes whose confidence bound would
    /// otherwise demand an impractical number of trials. Reaching it is not
    /// an error; the estimate is flagged as best-effort instead.
    pub const MAX_TRIALS: u64 = 100_000;

    /// Largest code dimension that is searched exhaustively.
    ///
    /// Codes with at most this many information bits have all 2^k - 1
    /// nonzero codewords enumerated, which yields the exact distance.
    pub const EXHAUSTIVE_MAX_DIM: usize = 16;

    /// Largest code dimension for which weight-2 information patterns are
    /// scored in every trial.
    ///
    /// Pair scoring costs O(k^2) per trial, so it is only enabled when the
    /// information set is small enough for that to stay cheap.
    pub const PAIR_SEARCH_MAX_DIM: usize = 256;

    /// Number of trials each worker runs between two merge points.
    ///
    /// Rounds of fixed size keep the stopping decision independent of thread
    /// scheduling, so seeded runs are reproducible for a given worker count.
    pub const TRIALS_PER_ROUND: u64 = 32;
}

/// Named-parameter configuration for external decoders.
///
/// Belief-propagation decoders with ordered-statistics (OSD) or localised
/// statistics (LSD) post-processing are external collaborators of the
/// distance estimator. This module fixes their parameter names and defaults so
/// that a configuration can be parsed, printed and handed over as a plain
/// name to value mapping.
pub mod decoder {
    use core::fmt;
    use core::str::FromStr;
    use thiserror::Error;

    /// Default cap on belief-propagation iterations.
    pub const DEFAULT_MAX_BP_ITERS: usize = 30;

    /// Default message-passing rule.
    pub const DEFAULT_BP_METHOD: BpMethod = BpMethod::MinimumSum;

    /// Default post-processing search order.
    pub const DEFAULT_OSD_ORDER: usize = 0;

    /// Default post-processing method.
    pub const DEFAULT_OSD_METHOD: OsdMethod = OsdMethod::Osd0;

    /// Failure to interpret a decoder parameter.
    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum ConfigError {
        /// The parameter name is not known for this decoder flavour.
        #[error("unknown decoder parameter `{0}`")]
        UnknownParameter(String),

        /// The value could not be parsed for the named parameter.
        #[error("invalid value `{value}` for decoder parameter `{name}`")]
        InvalidValue { name: String, value: String },
    }

    /// Message-passing rule used by the belief-propagation stage.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum BpMethod {
        /// Exact sum-product update.
        ProductSum,
        /// Min-sum approximation.
        MinimumSum,
    }

    impl BpMethod {
        pub fn as_str(&self) -> &'static str {
            match self {
                BpMethod::ProductSum => "product_sum",
                BpMethod::MinimumSum => "minimum_sum",
            }
        }
    }

    impl FromStr for BpMethod {
        type Err = ConfigError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "product_sum" | "ps" => Ok(BpMethod::ProductSum),
                "minimum_sum" | "ms" => Ok(BpMethod::MinimumSum),
                _ => Err(ConfigError::InvalidValue {
                    name: "bp_method".into(),
                    value: s.into(),
                }),
            }
        }
    }

    impl fmt::Display for BpMethod {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    /// Post-processing search strategy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum OsdMethod {
        /// Order-zero: only the solution supported on the pivot columns.
        Osd0,
        /// Exhaustive over all patterns on the first `order` free columns.
        OsdE,
        /// Combination sweep: every single free column, then pairs among the
        /// first `order` free columns.
        OsdCs,
    }

    impl OsdMethod {
        pub fn as_str(&self) -> &'static str {
            match self {
                OsdMethod::Osd0 => "osd_0",
                OsdMethod::OsdE => "osd_e",
                OsdMethod::OsdCs => "osd_cs",
            }
        }
    }

    impl FromStr for OsdMethod {
        type Err = ConfigError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "osd_0" | "osd0" => Ok(OsdMethod::Osd0),
                "osd_e" | "exhaustive" => Ok(OsdMethod::OsdE),
                "osd_cs" | "combination_sweep" => Ok(OsdMethod::OsdCs),
                _ => Err(ConfigError::InvalidValue {
                    name: "osd_method".into(),
                    value: s.into(),
                }),
            }
        }
    }

    impl fmt::Display for OsdMethod {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    /// Which post-processor the parameters are addressed to.
    ///
    /// Only the spelling of the order/method keys differs between the two.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PostProcessor {
        Osd,
        Lsd,
    }

    impl PostProcessor {
        fn order_key(&self) -> &'static str {
            match self {
                PostProcessor::Osd => "osd_order",
                PostProcessor::Lsd => "lsd_order",
            }
        }

        fn method_key(&self) -> &'static str {
            match self {
                PostProcessor::Osd => "osd_method",
                PostProcessor::Lsd => "lsd_method",
            }
        }
    }

    /// Decoder parameters with their documented defaults.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DecoderConfig {
        /// Flavour of post-processing the keys are named after.
        pub post_processor: PostProcessor,

        /// Maximum number of belief-propagation iterations.
        pub max_iter: usize,

        /// Message-passing rule.
        pub bp_method: BpMethod,

        /// Search order of the post-processing stage.
        pub order: usize,

        /// Post-processing strategy.
        pub method: OsdMethod,
    }

    impl Default for DecoderConfig {
        fn default() -> Self {
            Self::bp_osd()
        }
    }

    impl DecoderConfig {
        /// Defaults for a BP+OSD decoder.
        pub fn bp_osd() -> Self {
            Self {
                post_processor: PostProcessor::Osd,
                max_iter: DEFAULT_MAX_BP_ITERS,
                bp_method: DEFAULT_BP_METHOD,
                order: DEFAULT_OSD_ORDER,
                method: DEFAULT_OSD_METHOD,
            }
        }

        /// Defaults for a BP+LSD decoder.
        pub fn bp_lsd() -> Self {
            Self {
                post_processor: PostProcessor::Lsd,
                ..Self::bp_osd()
            }
        }

        /// Overrides a single named parameter.
        ///
        /// Accepts the keys reported by [`DecoderConfig::to_pairs`]. Order and
        /// method keys must match the configured post-processor flavour.
        pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
            let invalid = || ConfigError::InvalidValue {
                name: name.into(),
                value: value.into(),
            };

            if name == "max_iter" {
                self.max_iter = value.parse().map_err(|_| invalid())?;
            } else if name == "bp_method" {
                self.bp_method = value.parse()?;
            } else if name == self.post_processor.order_key() {
                self.order = value.parse().map_err(|_| invalid())?;
            } else if name == self.post_processor.method_key() {
                self.method = value.parse().map_err(|_: ConfigError| invalid())?;
            } else {
                return Err(ConfigError::UnknownParameter(name.into()));
            }
            Ok(())
        }

        /// Returns the configuration as an ordered name to value mapping.
        pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
            vec![
                ("max_iter", self.max_iter.to_string()),
                ("bp_method", self.bp_method.to_string()),
                (self.post_processor.order_key(), self.order.to_string()),
                (self.post_processor.method_key(), self.method.to_string()),
            ]
        }
    }

}

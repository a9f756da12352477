//! Race-aware tire recommendation engine
//!
//! Filter-then-rank: hard rules drop unsafe tires, a weighted additive score
//! orders the survivors, and the top picks drive the width, pressure, setup
//! and condition-alternative advice.

mod alternatives;
mod engine;
mod explanation;
mod filter;
mod pressure;
mod ranking;
mod scoring;
mod setup;
mod split;
mod types;

pub use alternatives::find_condition_alternatives;
pub use engine::{DeterministicRecommender, Recommender};
pub use explanation::{explain_pick, format_measure};
pub use filter::{filter_tires, filter_with_fallback, rejection_reason, FilterOutcome};
pub use pressure::compute_pressure_table;
pub use ranking::{rank_candidates, recommend_width, target_width};
pub use scoring::{ScoreBreakdown, ScoreCalculator, ScoringWeights};
pub use setup::build_setup_strategy;
pub use split::advise_front_rear_split;
pub use types::*;

/// Default calibration for the scoring stage.
pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    use_match: 10.0,
    avoid_penalty: -15.0,
    crr_ceiling_watts: 45.0,
    crr_divisor: 2.0,
    puncture_high: 12.0,
    puncture_moderate: 4.0,
    weight_ceiling_grams: 600.0,
    weight_divisor: 50.0,
    climbing_ratio_threshold: 80.0,
    wet_good: 10.0,
    wet_fair: 4.0,
    mud_high: 12.0,
    mud_moderate: 6.0,
    mud_low: 2.0,
    comfort_wide: 3.0,
    comfort_wide_min_mm: 45,
    comfort_durable_high: 4.0,
    comfort_durable_moderate: 2.0,
    terrain_keyword: 5.0,
    price_cheap: 2.0,
    price_cheap_max_usd: 60.0,
    price_mid: 1.0,
    price_mid_max_usd: 70.0,
};

/// Number of ranked picks returned by default.
pub const DEFAULT_TOP_N: usize = 3;

/// Width assumed for pressure and setup advice when there is no pick at all.
pub const FALLBACK_WIDTH_MM: u16 = 40;

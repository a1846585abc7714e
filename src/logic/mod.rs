//! Bracket engine: construction, per-match lifecycle, and result propagation.

mod advancement;
mod builder;
mod losers;
mod match_state;
mod seeding;

pub use advancement::{declare_winner, set_match_result};
pub use builder::{
    generate_bracket, winners_match_id, EngineConfig, DEFAULT_MAX_PARTICIPANTS, GRAND_FINAL_ID,
    RESET_MATCH_ID,
};
pub use losers::{drop_in_round, drop_in_target, losers_match_count, losers_match_id, losers_round_count};
pub use match_state::{start_match, validate_result, MatchResult};
pub use seeding::{bracket_size, first_round_pairs, seed_order, SeedingMode};

pub mod aggregate;
pub mod engine;

pub use aggregate::{rank, stats, RankOrder, RankedGenre, Stats};
pub use engine::{clamp_sub_score, compute_score, parse_score_input, MAX_SUB_SCORE};

/// Highest value a skip or kiff sub-score can take.
pub const MAX_SUB_SCORE: u8 = 10;

const FLOU_SKIP_WEIGHT: f64 = 0.35;
const FLOU_KIFF_WEIGHT: f64 = 0.65;
const EVEN_WEIGHT: f64 = 0.5;

/// Derive a genre's score from its sub-scores and flags.
///
/// Returns `None` when the rating is `special` (excluded from aggregates) or
/// when either sub-score is missing. With `flou` set the kiff weighs more
/// (0.35/0.65); otherwise both count equally.
///
/// Sub-scores above [`MAX_SUB_SCORE`] are clamped before weighting.
pub fn compute_score(skip: Option<u8>, kiff: Option<u8>, special: bool, flou: bool) -> Option<f64> {
    if special {
        return None;
    }
    let (skip, kiff) = match (skip, kiff) {
        (Some(skip), Some(kiff)) => (clamp(skip), clamp(kiff)),
        _ => return None,
    };

    let score = if flou {
        FLOU_SKIP_WEIGHT * skip + FLOU_KIFF_WEIGHT * kiff
    } else {
        EVEN_WEIGHT * skip + EVEN_WEIGHT * kiff
    };
    Some(score)
}

fn clamp(value: u8) -> f64 {
    f64::from(value.min(MAX_SUB_SCORE))
}

/// Turn raw user input into a sub-score.
///
/// Blank or non-numeric input means "no value". Numbers are clamped to
/// 0..=10 and truncated toward zero, so "7.9" becomes 7 and "-3" becomes 0.
pub fn parse_score_input(input: &str) -> Option<u8> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    clamp_sub_score(trimmed.parse().ok()?)
}

/// Clamp any number into a sub-score, truncating toward zero. NaN is no value.
pub fn clamp_sub_score(value: f64) -> Option<u8> {
    if value.is_nan() {
        return None;
    }
    if value <= 0.0 {
        Some(0)
    } else if value >= f64::from(MAX_SUB_SCORE) {
        Some(MAX_SUB_SCORE)
    } else {
        Some(value.trunc() as u8)
    }
}

use std::cmp::Ordering;

use crate::store::Rating;

use super::engine::MAX_SUB_SCORE;

/// Number of distribution buckets (one per rounded score 0..=10)
pub const BUCKET_COUNT: usize = MAX_SUB_SCORE as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankOrder {
    /// Best first
    #[default]
    Desc,
    /// Worst first
    Asc,
}

impl RankOrder {
    pub fn toggled(self) -> Self {
        match self {
            RankOrder::Desc => RankOrder::Asc,
            RankOrder::Asc => RankOrder::Desc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RankOrder::Desc => "best first",
            RankOrder::Asc => "worst first",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedGenre {
    pub genre_id: usize,
    pub name: String,
    pub score: f64,
    pub flou: bool,
}

/// Rank every scorable, non-special rating.
///
/// Equal scores are ordered by genre id so the output is stable no matter
/// what order the store hands ratings back in.
pub fn rank(ratings: &[Rating], order: RankOrder) -> Vec<RankedGenre> {
    let mut ranked: Vec<RankedGenre> = ratings
        .iter()
        .filter(|r| !r.special)
        .filter_map(|r| {
            r.score().map(|score| RankedGenre {
                genre_id: r.genre_id,
                name: r.name.clone(),
                score,
                flou: r.flou,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        let by_score = match order {
            RankOrder::Desc => b.score.partial_cmp(&a.score),
            RankOrder::Asc => a.score.partial_cmp(&b.score),
        }
        .unwrap_or(Ordering::Equal);
        by_score.then(a.genre_id.cmp(&b.genre_id))
    });
    ranked
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stats {
    /// All stored ratings
    pub total: usize,
    /// Ratings flagged special (excluded from everything below)
    pub special_count: usize,
    /// Non-special ratings
    pub eligible: usize,
    /// Non-special ratings flagged flou
    pub flou_count: usize,
    /// Non-special ratings with both sub-scores
    pub scored_count: usize,
    pub average: Option<f64>,
    /// Count of scores per rounded value 0..=10
    pub distribution: [usize; BUCKET_COUNT],
}

pub fn stats(ratings: &[Rating]) -> Stats {
    let mut stats = Stats {
        total: ratings.len(),
        ..Stats::default()
    };
    let mut sum = 0.0;

    for rating in ratings {
        if rating.special {
            stats.special_count += 1;
            continue;
        }
        stats.eligible += 1;
        if rating.flou {
            stats.flou_count += 1;
        }
        let Some(score) = rating.score() else {
            continue;
        };
        stats.scored_count += 1;
        sum += score;

        let bucket = (score.round().max(0.0) as usize).min(BUCKET_COUNT - 1);
        stats.distribution[bucket] += 1;
    }

    if stats.scored_count > 0 {
        stats.average = Some(sum / stats.scored_count as f64);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(genre_id: usize, skip: Option<u8>, kiff: Option<u8>) -> Rating {
        let mut r = Rating::new(genre_id, format!("genre {}", genre_id));
        r.skip = skip;
        r.kiff = kiff;
        r
    }

    fn special(genre_id: usize, skip: u8, kiff: u8) -> Rating {
        let mut r = rating(genre_id, Some(skip), Some(kiff));
        r.special = true;
        r
    }

    #[test]
    fn test_rank_excludes_special() {
        let ratings = vec![
            rating(0, Some(5), Some(5)),
            special(1, 10, 10),
            special(2, 0, 0),
            rating(3, Some(2), Some(2)),
        ];

        let ranked = rank(&ratings, RankOrder::Desc);
        let ids: Vec<usize> = ranked.iter().map(|r| r.genre_id).collect();
        assert_eq!(ids, vec![0, 3]);
    }

    #[test]
    fn test_rank_skips_incomplete() {
        let ratings = vec![rating(0, Some(5), None), rating(1, None, None), rating(2, Some(1), Some(1))];
        let ranked = rank(&ratings, RankOrder::Desc);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].genre_id, 2);
    }

    #[test]
    fn test_rank_orders() {
        let ratings = vec![
            rating(0, Some(2), Some(2)),
            rating(1, Some(9), Some(9)),
            rating(2, Some(5), Some(5)),
        ];

        let desc: Vec<usize> = rank(&ratings, RankOrder::Desc).iter().map(|r| r.genre_id).collect();
        assert_eq!(desc, vec![1, 2, 0]);

        let asc: Vec<usize> = rank(&ratings, RankOrder::Asc).iter().map(|r| r.genre_id).collect();
        assert_eq!(asc, vec![0, 2, 1]);
    }

    #[test]
    fn test_rank_ties_break_on_genre_id() {
        let ratings = vec![
            rating(7, Some(4), Some(6)),
            rating(3, Some(6), Some(4)),
            rating(5, Some(5), Some(5)),
        ];
        for order in [RankOrder::Desc, RankOrder::Asc] {
            let ids: Vec<usize> = rank(&ratings, order).iter().map(|r| r.genre_id).collect();
            assert_eq!(ids, vec![3, 5, 7]);
        }
    }

    #[test]
    fn test_rank_carries_flou_and_score() {
        let mut r = rating(4, Some(8), Some(4));
        r.flou = true;
        let ranked = rank(&[r], RankOrder::Desc);
        assert!(ranked[0].flou);
        assert!((ranked[0].score - 5.4).abs() < 1e-9);
        assert_eq!(ranked[0].name, "genre 4");
    }

    #[test]
    fn test_order_toggle() {
        assert_eq!(RankOrder::default(), RankOrder::Desc);
        assert_eq!(RankOrder::Desc.toggled(), RankOrder::Asc);
        assert_eq!(RankOrder::Asc.toggled(), RankOrder::Desc);
    }

    #[test]
    fn test_stats_counts() {
        let mut flou = rating(4, Some(8), Some(4));
        flou.flou = true;
        let mut special_flou = special(5, 3, 3);
        special_flou.flou = true;

        let ratings = vec![
            rating(0, Some(8), Some(4)),
            rating(1, Some(10), Some(10)),
            rating(2, None, Some(3)),
            special(3, 10, 10),
            flou,
            special_flou,
        ];

        let s = stats(&ratings);
        assert_eq!(s.total, 6);
        assert_eq!(s.special_count, 2);
        assert_eq!(s.eligible, 4);
        assert_eq!(s.flou_count, 1);
        assert_eq!(s.scored_count, 3);

        let average = s.average.unwrap();
        assert!((average - (6.0 + 10.0 + 5.4) / 3.0).abs() < 1e-9);

        assert_eq!(s.distribution[6], 1);
        assert_eq!(s.distribution[10], 1);
        assert_eq!(s.distribution[5], 1);
        assert_eq!(s.distribution.iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_stats_empty() {
        let s = stats(&[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.average, None);
        assert!(s.distribution.iter().all(|&n| n == 0));
    }

    #[test]
    fn test_stats_rounds_half_up() {
        // 0.5 * 3 + 0.5 * 4 = 3.5
        let s = stats(&[rating(0, Some(3), Some(4))]);
        assert_eq!(s.distribution[4], 1);
    }
}

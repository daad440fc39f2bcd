use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::score::{RankedGenre, Stats};
use crate::store::{ImportReport, Rating};

/// Placeholder shown when there is no score
pub const NO_SCORE: &str = "—";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a derived score: two decimals, a dash when missing, and an
/// explicit marker when the rating is excluded
pub fn format_score(score: Option<f64>, special: bool) -> String {
    if special {
        return format!("{} (excluded)", NO_SCORE);
    }
    match score {
        Some(score) => format!("{:.2}", score),
        None => NO_SCORE.to_string(),
    }
}

fn format_sub_score(value: Option<u8>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NO_SCORE.to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
pub fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Multi-line view of one genre and its rating (or lack of one)
pub fn format_rating_detail(
    genre_id: usize,
    name: &str,
    url: &str,
    rating: Option<&Rating>,
    use_colors: bool,
) -> String {
    let header = if use_colors {
        format!("{} {}", name.bold(), format!("#{}", genre_id).dimmed())
    } else {
        format!("{} #{}", name, genre_id)
    };
    let url_line = if use_colors {
        url.underline().to_string()
    } else {
        url.to_string()
    };

    let Some(rating) = rating else {
        return format!("{}\n  {}\n  Not rated yet", header, url_line);
    };

    let score = format_score(rating.score(), rating.special);
    let score = if use_colors {
        score.bold().to_string()
    } else {
        score
    };
    let updated = rating
        .updated_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| NO_SCORE.to_string());

    let mut out = format!(
        "{}\n  {}\n  Skip: {}  Kiff: {}\n  Special: {}  Flou: {}\n  Score: {}",
        header,
        url_line,
        format_sub_score(rating.skip),
        format_sub_score(rating.kiff),
        yes_no(rating.special),
        yes_no(rating.flou),
        score,
    );
    if let Some(ref comment) = rating.comment {
        out.push_str(&format!("\n  Comment: {}", comment));
    }
    out.push_str(&format!("\n  Updated: {}", updated));
    out
}

/// Format the ranking as one line per genre: position, score, id, name
pub fn format_rank_table(ranked: &[RankedGenre], limit: usize, use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No ranked genres yet (special genres are excluded, skip and kiff are required)."
            .to_string();
    }

    let term_width = get_terminal_width();
    let shown = ranked.len().min(limit);
    let pos_width = shown.to_string().len() + 1;
    let id_width = ranked
        .iter()
        .take(shown)
        .map(|r| r.genre_id.to_string().len() + 1)
        .max()
        .unwrap_or(2);

    let mut lines: Vec<String> = ranked
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, item)| {
            let position = format!("{:>width$}", format!("{}.", i + 1), width = pos_width);
            let score = format!("{:>5.2}", item.score);
            let id = format!("{:>width$}", format!("#{}", item.genre_id), width = id_width);
            let marker = if item.flou { " (flou)" } else { "" };

            // position + space + score + 2 spaces + id + space + marker
            let fixed_width = pos_width + 1 + 5 + 2 + id_width + 1 + marker.len();
            let name = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_name(&item.name, width - fixed_width)
                }
                Some(_) => truncate_name(&item.name, 20),
                None => item.name.clone(),
            };

            if use_colors {
                format!(
                    "{} {}  {} {}{}",
                    position.dimmed(),
                    score.bold(),
                    id.dimmed(),
                    name,
                    marker.dimmed()
                )
            } else {
                format!("{} {}  {} {}{}", position, score, id, name, marker)
            }
        })
        .collect();

    if ranked.len() > shown {
        lines.push(format!("... {} more", ranked.len() - shown));
    }
    lines.join("\n")
}

/// Format the ranking as tab-separated values for scripting
/// Columns: rank, score, genre_id, name, flou (no headers, no colors)
pub fn format_rank_tsv(ranked: &[RankedGenre]) -> String {
    ranked
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                "{}\t{:.2}\t{}\t{}\t{}",
                i + 1,
                item.score,
                item.genre_id,
                item.name,
                item.flou
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format aggregate statistics with the 0-10 distribution
pub fn format_stats(stats: &Stats, use_colors: bool) -> String {
    let average = format_score(stats.average, false);
    let rows = [
        ("Total ratings", stats.total.to_string()),
        ("Special (excluded)", stats.special_count.to_string()),
        ("Counted", stats.eligible.to_string()),
        ("Scored", stats.scored_count.to_string()),
        ("Flou (of counted)", stats.flou_count.to_string()),
        ("Average score", average),
    ];

    let mut lines: Vec<String> = rows
        .iter()
        .map(|(label, value)| {
            if use_colors {
                format!("{:<20}{}", label.dimmed(), value.bold())
            } else {
                format!("{:<20}{}", label, value)
            }
        })
        .collect();

    lines.push(String::new());
    lines.push("Distribution (rounded 0-10)".to_string());
    let max = stats.distribution.iter().copied().max().unwrap_or(0);
    for (bucket, count) in stats.distribution.iter().enumerate() {
        let bar = distribution_bar(*count, max, 30);
        if use_colors {
            lines.push(format!("{:>3} {:>5} {}", bucket, count, bar.cyan()));
        } else {
            lines.push(format!("{:>3} {:>5} {}", bucket, count, bar));
        }
    }
    lines.join("\n")
}

fn distribution_bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = ((count as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(filled)
}

/// Format genre search matches, one per line
pub fn format_search_results(results: &[(usize, &str)], limit: usize, use_colors: bool) -> String {
    if results.is_empty() {
        return "No matching genres.".to_string();
    }

    let mut lines: Vec<String> = results
        .iter()
        .map(|(id, name)| {
            let id = format!("#{}", id);
            if use_colors {
                format!("{:>7} {}", id.dimmed(), name)
            } else {
                format!("{:>7} {}", id, name)
            }
        })
        .collect();

    if results.len() >= limit {
        lines.push(format!("(limited to {} matches)", limit));
    }
    lines.join("\n")
}

/// One-line summary of an import
pub fn format_import_report(report: &ImportReport) -> String {
    let mut out = format!("Imported {} ratings", report.imported);
    if report.skipped > 0 {
        out.push_str(&format!(", skipped {} invalid entries", report.skipped));
    }
    if report.idx_restored {
        out.push_str(", restored position");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_rating() -> Rating {
        Rating {
            genre_id: 12,
            name: "shoegaze".to_string(),
            url: "https://everynoise.com/everynoise1d-shoegaze.html".to_string(),
            skip: Some(8),
            kiff: Some(4),
            special: false,
            flou: false,
            comment: Some("wall of sound".to_string()),
            updated_at: Some(Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()),
        }
    }

    fn ranked(genre_id: usize, name: &str, score: f64, flou: bool) -> RankedGenre {
        RankedGenre {
            genre_id,
            name: name.to_string(),
            score,
            flou,
        }
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(6.0), false), "6.00");
        assert_eq!(format_score(Some(5.3999999999), false), "5.40");
        assert_eq!(format_score(None, false), "—");
        assert_eq!(format_score(Some(6.0), true), "— (excluded)");
    }

    #[test]
    fn test_format_rating_detail() {
        let rating = sample_rating();
        let out = format_rating_detail(12, "shoegaze", &rating.url, Some(&rating), false);
        assert!(out.starts_with("shoegaze #12"));
        assert!(out.contains("Skip: 8  Kiff: 4"));
        assert!(out.contains("Special: no  Flou: no"));
        assert!(out.contains("Score: 6.00"));
        assert!(out.contains("Comment: wall of sound"));
        assert!(out.contains("Updated: 2025-03-14 09:30"));
    }

    #[test]
    fn test_format_rating_detail_unrated() {
        let out = format_rating_detail(3, "drone", "https://x/drone", None, false);
        assert!(out.contains("drone #3"));
        assert!(out.contains("Not rated yet"));
    }

    #[test]
    fn test_format_rank_table_empty() {
        let out = format_rank_table(&[], 100, false);
        assert!(out.starts_with("No ranked genres yet"));
    }

    #[test]
    fn test_format_rank_table_limit_and_flou() {
        let items = vec![
            ranked(4, "acid jazz", 9.5, false),
            ranked(1, "drone", 5.4, true),
            ranked(2, "polka", 1.0, false),
        ];
        let out = format_rank_table(&items, 2, false);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("1."));
        assert!(lines[0].contains("9.50"));
        assert!(lines[0].contains("#4"));
        assert!(lines[0].contains("acid jazz"));
        assert!(lines[1].ends_with("drone (flou)"));
        assert_eq!(lines[2], "... 1 more");
    }

    #[test]
    fn test_format_rank_tsv() {
        let items = vec![ranked(4, "acid jazz", 9.5, false), ranked(1, "drone", 5.4, true)];
        assert_eq!(
            format_rank_tsv(&items),
            "1\t9.50\t4\tacid jazz\tfalse\n2\t5.40\t1\tdrone\ttrue"
        );
    }

    #[test]
    fn test_format_stats() {
        let mut stats = Stats {
            total: 4,
            special_count: 1,
            eligible: 3,
            flou_count: 1,
            scored_count: 2,
            average: Some(7.25),
            ..Stats::default()
        };
        stats.distribution[6] = 1;
        stats.distribution[9] = 1;

        let out = format_stats(&stats, false);
        assert!(out.contains("Total ratings       4"));
        assert!(out.contains("Special (excluded)  1"));
        assert!(out.contains("Average score       7.25"));
        assert!(out.contains("Distribution (rounded 0-10)"));
        assert_eq!(out.lines().count(), 6 + 2 + 11);
    }

    #[test]
    fn test_format_stats_without_scores() {
        let out = format_stats(&Stats::default(), false);
        assert!(out.contains("Average score       —"));
    }

    #[test]
    fn test_format_search_results() {
        let results = vec![(2, "acid jazz"), (4, "nu jazz")];
        let out = format_search_results(&results, 200, false);
        assert!(out.contains("#2 acid jazz"));
        assert!(out.contains("#4 nu jazz"));
        assert!(!out.contains("limited"));

        let limited = format_search_results(&results, 2, false);
        assert!(limited.contains("(limited to 2 matches)"));

        assert_eq!(format_search_results(&[], 200, false), "No matching genres.");
    }

    #[test]
    fn test_format_import_report() {
        let report = ImportReport {
            imported: 9,
            skipped: 1,
            idx_restored: true,
        };
        assert_eq!(
            format_import_report(&report),
            "Imported 9 ratings, skipped 1 invalid entries, restored position"
        );
        assert_eq!(
            format_import_report(&ImportReport::default()),
            "Imported 0 ratings"
        );
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("short", 10), "short");
        assert_eq!(truncate_name("a very long genre name", 10), "a very ...");
        assert_eq!(truncate_name("abcdef", 3), "abc");
    }
}

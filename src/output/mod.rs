pub mod formatter;

pub use formatter::{
    format_import_report, format_rank_table, format_rank_tsv, format_rating_detail, format_score,
    format_search_results, format_stats, should_use_colors, truncate_name, NO_SCORE,
};

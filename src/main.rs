use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use genre_rater::config::{load_config, validate_config, Config};
use genre_rater::genres::{reference_url, GenreList};
use genre_rater::output;
use genre_rater::score::RankOrder;
use genre_rater::session::Session;
use genre_rater::store::{backup_file_name, snapshot_to_json, RatingStore, StoreError};
use genre_rater::verbose_eprintln;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_STORAGE: i32 = 2;
const EXIT_IMPORT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive rating UI (default if no subcommand)
    Tui,
    /// Show a genre and its rating
    Show {
        /// Genre id (defaults to the current position)
        id: Option<usize>,
    },
    /// Rate a genre; unset flags keep their stored values
    Rate {
        /// Genre id (defaults to the current position)
        id: Option<usize>,
        /// Skip sub-score
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
        skip: Option<u8>,
        /// Kiff sub-score
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
        kiff: Option<u8>,
        /// Exclude from ranking and stats
        #[arg(long)]
        special: Option<bool>,
        /// Use the kiff-weighted formula
        #[arg(long)]
        flou: Option<bool>,
        /// Free-text comment (empty clears it)
        #[arg(long)]
        comment: Option<String>,
        /// Move to the next genre after saving
        #[arg(long)]
        next: bool,
    },
    /// Move to the next genre
    Next,
    /// Jump to a genre id
    Goto { id: usize },
    /// Search genre names
    Search {
        query: String,
        /// Maximum number of matches
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Ranked list of scored genres
    Rank {
        /// Worst first
        #[arg(long)]
        asc: bool,
        /// Number of genres to print
        #[arg(long)]
        limit: Option<usize>,
        /// Tab-separated output for scripts
        #[arg(long)]
        tsv: bool,
    },
    /// Rating statistics
    Stats,
    /// Write a JSON backup (`-` for stdout)
    Export { path: Option<PathBuf> },
    /// Replace all ratings from a JSON backup
    Import { path: PathBuf },
    /// Open a genre's reference page in the browser
    Open {
        /// Genre id (defaults to the current position)
        id: Option<usize>,
    },
    /// Print the reference URL for any genre name
    Url { name: String },
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "genre-rater")]
#[command(about = "Rate music genres one at a time", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/genre-rater/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Genre list file, overriding the config
    #[arg(long, global = true)]
    genres: Option<PathBuf>,

    /// Ratings file, overriding the config
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn fail(code: i32, msg: impl std::fmt::Display) -> ! {
    eprintln!("{}", msg);
    std::process::exit(code);
}

fn store_exit_code(err: &StoreError) -> i32 {
    if err.is_import_error() {
        EXIT_IMPORT
    } else {
        EXIT_STORAGE
    }
}

/// Exit with a config error if `id` is not in the genre list
fn check_genre_id(session: &Session, id: usize) {
    let len = session.genres().len();
    if id >= len {
        fail(
            EXIT_CONFIG,
            format!("Invalid genre id {}. Must be between 0 and {}.", id, len.saturating_sub(1)),
        );
    }
}

fn print_detail(session: &Session, id: usize, use_colors: bool) {
    let Some(name) = session.genres().get(id) else {
        fail(EXIT_CONFIG, "No genres loaded.");
    };
    let url = session.url_for(name);
    let rating = session.store().get_rating(id);
    println!(
        "{}",
        output::format_rating_detail(id, name, &url, rating, use_colors)
    );
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    genre_rater::stderr_buffer::set_verbose(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Tui);
    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init = command {
        if let Err(e) = genre_rater::config::init::run_init_wizard(config_path) {
            fail(EXIT_CONFIG, format!("Init failed: {:#}", e));
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load and validate config
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => fail(EXIT_CONFIG, format!("Config error: {:#}", e)),
    };
    if let Err(errors) = validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if let Commands::Url { name } = &command {
        println!("{}", reference_url(config.url_template(), name));
        std::process::exit(EXIT_SUCCESS);
    }

    let genres_path = cli.genres.unwrap_or_else(|| config.genres_path());
    let genres = match GenreList::load(&genres_path) {
        Ok(g) => g,
        Err(e) => fail(EXIT_CONFIG, format!("Genre list error: {:#}", e)),
    };
    verbose_eprintln!("Loaded {} genres from {}", genres.len(), genres_path.display());

    let data_path = cli.data.unwrap_or_else(|| config.data_path());
    let store = match RatingStore::open(&data_path) {
        Ok(s) => s,
        Err(e) => fail(EXIT_STORAGE, format!("Storage error: {}", e)),
    };
    verbose_eprintln!("Opened {} ratings from {}", store.len(), data_path.display());

    let mut session = Session::open(genres, store, config.url_template());
    let use_colors = output::should_use_colors();

    match command {
        Commands::Tui => run_tui(session, config).await,
        Commands::Show { id } => {
            let id = id.unwrap_or(session.position());
            check_genre_id(&session, id);
            print_detail(&session, id, use_colors);
        }
        Commands::Rate {
            id,
            skip,
            kiff,
            special,
            flou,
            comment,
            next,
        } => {
            if let Some(id) = id {
                check_genre_id(&session, id);
                if let Err(e) = session.jump_to(id) {
                    fail(EXIT_STORAGE, format!("{:#}", e));
                }
            }

            let mut draft = session.draft();
            if skip.is_some() {
                draft.skip = skip;
            }
            if kiff.is_some() {
                draft.kiff = kiff;
            }
            if let Some(special) = special {
                draft.special = special;
            }
            if let Some(flou) = flou {
                draft.flou = flou;
            }
            if let Some(comment) = comment {
                draft.comment = comment;
            }

            let rating = match session.save(&draft) {
                Ok(Some(rating)) => rating,
                Ok(None) => fail(EXIT_CONFIG, "No genres loaded."),
                Err(e) => fail(EXIT_STORAGE, format!("{:#}", e)),
            };
            print_detail(&session, rating.genre_id, use_colors);

            if next {
                match session.advance() {
                    Ok(idx) => {
                        println!();
                        print_detail(&session, idx, use_colors);
                    }
                    Err(e) => fail(EXIT_STORAGE, format!("{:#}", e)),
                }
            }
        }
        Commands::Next => match session.advance() {
            Ok(idx) => print_detail(&session, idx, use_colors),
            Err(e) => fail(EXIT_STORAGE, format!("{:#}", e)),
        },
        Commands::Goto { id } => {
            check_genre_id(&session, id);
            match session.jump_to(id) {
                Ok(idx) => print_detail(&session, idx, use_colors),
                Err(e) => fail(EXIT_STORAGE, format!("{:#}", e)),
            }
        }
        Commands::Search { query, limit } => {
            let limit = limit.unwrap_or(config.search_limit).max(1);
            let results = session.genres().search(&query, limit);
            println!(
                "{}",
                output::format_search_results(&results, limit, use_colors)
            );
        }
        Commands::Rank { asc, limit, tsv } => {
            let order = if asc { RankOrder::Asc } else { RankOrder::Desc };
            let ranked = session.ranking(order);
            let limit = limit.unwrap_or(config.rank_limit);
            if tsv {
                let shown = ranked.len().min(limit);
                println!("{}", output::format_rank_tsv(&ranked[..shown]));
            } else {
                println!(
                    "{}",
                    output::format_rank_table(&ranked, limit, use_colors)
                );
            }
        }
        Commands::Stats => {
            println!("{}", output::format_stats(&session.stats(), use_colors));
        }
        Commands::Export { path } => {
            let store = session.store();
            match path {
                Some(path) if path.as_os_str() == "-" => {
                    match snapshot_to_json(&store.export_data()) {
                        Ok(json) => println!("{}", json),
                        Err(e) => fail(EXIT_STORAGE, format!("Export failed: {}", e)),
                    }
                }
                path => {
                    let path = path.unwrap_or_else(|| default_backup_path(&data_path));
                    match store.export_to_path(&path) {
                        Ok(snapshot) => eprintln!(
                            "Exported {} ratings to {}",
                            snapshot.ratings.len(),
                            path.display()
                        ),
                        Err(e) => fail(EXIT_STORAGE, format!("Export failed: {}", e)),
                    }
                }
            }
        }
        Commands::Import { path } => match session.import_from_path(&path) {
            Ok(report) => println!("{}", output::format_import_report(&report)),
            Err(e) => fail(store_exit_code(&e), format!("Import failed: {}", e)),
        },
        Commands::Open { id } => {
            let id = id.unwrap_or(session.position());
            check_genre_id(&session, id);
            let Some(name) = session.genres().get(id) else {
                fail(EXIT_CONFIG, "No genres loaded.");
            };
            let url = session.url_for(name);
            if let Err(e) = genre_rater::browser::open_url(&url) {
                fail(EXIT_FAILURE, format!("Failed to open browser: {:#}", e));
            }
            println!("Opened {}", url);
        }
        Commands::Url { .. } | Commands::Init => {}
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Dated backup file next to the ratings file
fn default_backup_path(data_path: &std::path::Path) -> PathBuf {
    let dir = data_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    dir.join(backup_file_name(Local::now().date_naive()))
}

async fn run_tui(session: Session, config: Config) {
    // Detect the theme before the TUI takes over the terminal
    let theme = genre_rater::tui::resolve_theme(config.theme);
    let app = genre_rater::tui::App::new(session, config, theme);

    if let Err(e) = genre_rater::tui::run_tui(app).await {
        fail(EXIT_FAILURE, format!("TUI error: {:#}", e));
    }
}

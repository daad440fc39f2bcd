use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{
    get_config_path, Config, ThemeMode, DEFAULT_RANK_LIMIT, DEFAULT_SEARCH_LIMIT,
};
use crate::genres::{reference_url, GenreList, DEFAULT_URL_TEMPLATE, SLUG_PLACEHOLDER};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Prompt for a positive count, re-asking until the input parses.
fn prompt_limit(message: &str, default: usize) -> Result<usize> {
    loop {
        let input = prompt_with_default(message, &default.to_string())?;
        match input.parse::<usize>() {
            Ok(v) if v > 0 => return Ok(v),
            _ => println!("  Invalid: must be a positive whole number. Try again."),
        }
    }
}

fn parse_theme(input: &str) -> Option<ThemeMode> {
    match input.to_lowercase().as_str() {
        "auto" => Some(ThemeMode::Auto),
        "dark" => Some(ThemeMode::Dark),
        "light" => Some(ThemeMode::Light),
        _ => None,
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Genre Rater Configuration Wizard");
    println!("================================");
    println!();

    let defaults = Config::default();

    // 1. Genre list
    println!("The genre list is a plain text file with one genre name per line.");
    let genres_default = defaults.genres_path().display().to_string();
    let genres_file = loop {
        let input = prompt_with_default("Genre list file", &genres_default)?;
        let path = PathBuf::from(&input);
        match GenreList::load(&path) {
            Ok(genres) if !genres.is_empty() => {
                println!("  Found {} genres.", genres.len());
                break path;
            }
            Ok(_) => println!("  That file has no genres in it."),
            Err(e) => println!("  {}", e),
        }
        if prompt_yes_no("  Use it anyway?", false)? {
            break path;
        }
    };

    // 2. Ratings store
    println!();
    println!("Ratings are kept in a JSON file on this machine. Export backups now and then.");
    let data_default = defaults.data_path().display().to_string();
    let data_file = PathBuf::from(prompt_with_default("Ratings file", &data_default)?);

    // 3. Reference link
    println!();
    println!(
        "Each genre links to a reference page. {} is replaced by the genre's slug.",
        SLUG_PLACEHOLDER
    );
    let template = loop {
        let input = prompt_with_default("Reference URL template", DEFAULT_URL_TEMPLATE)?;
        if input.contains(SLUG_PLACEHOLDER) {
            println!("  Example: {}", reference_url(&input, "Néo Soul"));
            break input;
        }
        println!("  Invalid: the template must contain {}. Try again.", SLUG_PLACEHOLDER);
    };

    // 4. Display
    println!();
    let rank_limit = prompt_limit("Genres shown in the ranking", DEFAULT_RANK_LIMIT)?;
    let search_limit = prompt_limit("Maximum search matches", DEFAULT_SEARCH_LIMIT)?;
    let theme = loop {
        let input = prompt_with_default("Theme (auto/dark/light)", "auto")?;
        match parse_theme(&input) {
            Some(theme) => break theme,
            None => println!("  Invalid: choose auto, dark or light."),
        }
    };

    // 5. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 6. Write config
    let config = Config {
        genres_file: Some(genres_file),
        data_file: Some(data_file),
        reference_url_template: (template != DEFAULT_URL_TEMPLATE).then_some(template),
        rank_limit,
        search_limit,
        theme,
    };

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(&config_path)
        .with_context(|| format!("Failed to open {} for writing", config_path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `genre-rater` to start rating.");

    Ok(())
}

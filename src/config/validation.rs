use super::schema::Config;
use crate::genres::SLUG_PLACEHOLDER;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref template) = config.reference_url_template {
        if !template.contains(SLUG_PLACEHOLDER) {
            errors.push(format!(
                "reference_url_template: '{}' must contain {}",
                template, SLUG_PLACEHOLDER
            ));
        }
    }

    if config.rank_limit == 0 {
        errors.push("rank_limit: must be at least 1".to_string());
    }

    if config.search_limit == 0 {
        errors.push("search_limit: must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

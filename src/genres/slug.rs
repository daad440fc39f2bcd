use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Placeholder replaced by the slug in a URL template
pub const SLUG_PLACEHOLDER: &str = "{slug}";

/// Default reference page for a genre
pub const DEFAULT_URL_TEMPLATE: &str = "https://everynoise.com/everynoise1d-{slug}.html";

/// Normalize a genre name into a URL slug.
///
/// Lowercases, strips diacritics, then keeps only ASCII letters and digits:
/// "Néo Soul" becomes "neosoul".
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Reference URL for a genre name built from `template`
pub fn reference_url(template: &str, name: &str) -> String {
    template.replace(SLUG_PLACEHOLDER, &slugify(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_plain() {
        assert_eq!(slugify("shoegaze"), "shoegaze");
        assert_eq!(slugify("  Dream Pop  "), "dreampop");
    }

    #[test]
    fn test_slugify_strips_diacritics() {
        assert_eq!(slugify("Néo Soul"), "neosoul");
        assert_eq!(slugify("musique concrète"), "musiqueconcrete");
        assert_eq!(slugify("Forró"), "forro");
    }

    #[test]
    fn test_slugify_drops_punctuation() {
        assert_eq!(slugify("drum & bass"), "drumbass");
        assert_eq!(slugify("k-pop"), "kpop");
        assert_eq!(slugify("80s synth-pop"), "80ssynthpop");
        assert_eq!(slugify("hip\thop\n"), "hiphop");
    }

    #[test]
    fn test_slugify_drops_non_latin() {
        assert_eq!(slugify("j-pop ポップ"), "jpop");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_reference_url_default_template() {
        assert_eq!(
            reference_url(DEFAULT_URL_TEMPLATE, "Néo Soul"),
            "https://everynoise.com/everynoise1d-neosoul.html"
        );
    }

    #[test]
    fn test_reference_url_custom_template() {
        assert_eq!(
            reference_url("https://example.org/g/{slug}", "Acid Jazz"),
            "https://example.org/g/acidjazz"
        );
    }
}

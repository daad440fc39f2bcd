use anyhow::{bail, Context, Result};

/// Open a genre's reference page in the user's default browser
///
/// # Errors
/// Returns error if the URL is not http(s) or no browser can be opened
pub fn open_url(url: &str) -> Result<()> {
    if !is_web_url(url) {
        bail!("Refusing to open '{}': not an http(s) URL", url);
    }
    webbrowser::open(url).with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}

fn is_web_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_web_url() {
        assert!(is_web_url("https://everynoise.com/everynoise1d-drone.html"));
        assert!(is_web_url("http://localhost/drone"));
        assert!(!is_web_url(""));
        assert!(!is_web_url("file:///etc/passwd"));
    }

    #[test]
    fn test_open_rejects_non_web_url() {
        assert!(open_url("javascript:alert(1)").is_err());
    }
}

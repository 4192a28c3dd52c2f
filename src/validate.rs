//! Link validation.
//!
//! The check is deliberately shallow: a link is accepted when it is non-blank
//! and contains a recognized YouTube host substring. Scheme and URL
//! well-formedness are left to the downloader, which reports its own errors
//! for malformed targets.

use crate::error::{HentError, Result};

/// Host substrings accepted as YouTube links.
pub const YOUTUBE_HOSTS: [&str; 2] = ["youtube.com", "youtu.be"];

/// Validate a submitted link and return its trimmed form.
pub fn validate_link(input: &str) -> Result<String> {
    let link = input.trim();
    if link.is_empty() {
        return Err(HentError::EmptyLink);
    }
    if !YOUTUBE_HOSTS.iter().any(|host| link.contains(host)) {
        return Err(HentError::UnsupportedLink(link.to_string()));
    }
    Ok(link.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_watch_urls() {
        assert_eq!(
            validate_link("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(
            validate_link("https://youtu.be/dQw4w9WgXcQ").unwrap(),
            "https://youtu.be/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_accepts_playlist_urls() {
        assert!(validate_link("https://youtube.com/playlist?list=PLtest").is_ok());
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(
            validate_link("  https://youtu.be/dQw4w9WgXcQ \n").unwrap(),
            "https://youtu.be/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_rejects_blank_input() {
        assert!(matches!(validate_link(""), Err(HentError::EmptyLink)));
        assert!(matches!(validate_link("   \t "), Err(HentError::EmptyLink)));
    }

    #[test]
    fn test_rejects_other_hosts() {
        assert!(matches!(
            validate_link("https://vimeo.com/123456"),
            Err(HentError::UnsupportedLink(_))
        ));
        assert!(matches!(
            validate_link("not a link at all"),
            Err(HentError::UnsupportedLink(_))
        ));
    }

    #[test]
    fn test_host_match_is_substring_only() {
        // No URL parsing happens; any string containing the host passes.
        assert!(validate_link("watch this: youtube.com/watch?v=abc").is_ok());
        assert!(validate_link("myyoutube.com/video").is_ok());
    }
}

//! URL helper functions

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::SiteConfig;

lazy_static! {
    /// Unreserved URL characters only, so a slug is safe as a path segment
    static ref SLUG_RE: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._~-]*$").unwrap();
}

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/post/hello/") // -> "/blog/post/hello/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/post/hello/") // -> "https://example.com/blog/post/hello/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Route of a post detail page
pub fn post_path(config: &SiteConfig, slug: &str) -> String {
    url_for(config, &format!("post/{}/", slug))
}

/// Whether `slug` can be used verbatim as a route segment and file name
pub fn is_url_safe_slug(slug: &str) -> bool {
    slug != "." && slug != ".." && SLUG_RE.is_match(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com".to_string();
        config.root = "/blog/".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/images/logo.svg"), "/blog/images/logo.svg");
        assert_eq!(url_for(&config, ""), "/blog/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/post/hello/"),
            "https://example.com/blog/post/hello/"
        );
    }

    #[test]
    fn test_post_path() {
        let config = SiteConfig::default();
        assert_eq!(post_path(&config, "como-utilizar-hooks"), "/post/como-utilizar-hooks/");
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_url_safe_slug("como-utilizar-hooks"));
        assert!(is_url_safe_slug("post_2021.v2"));
        assert!(!is_url_safe_slug(""));
        assert!(!is_url_safe_slug(".."));
        assert!(!is_url_safe_slug("../etc/passwd"));
        assert!(!is_url_safe_slug("with space"));
        assert!(!is_url_safe_slug("quote\""));
    }
}

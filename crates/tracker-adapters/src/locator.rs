//! Repository locator parsing.
//!
//! Accepts the browsable URL form (`https://github.com/owner/name[/...]`)
//! and the bare `owner/name` path a bound project stores. Everything on
//! another host is rejected before any network call is made.

use domains::GatewayError;
use url::Url;

pub const SUPPORTED_HOST: &str = "github.com";

/// Extracts the "owner/name" identifier from a user-supplied locator.
pub fn parse_locator(input: &str) -> Result<String, GatewayError> {
    let trimmed = input.trim();
    if trimmed.contains("://") {
        let parsed = Url::parse(trimmed)
            .map_err(|_| GatewayError::UnsupportedHost(trimmed.to_string()))?;
        let host = parsed.host_str().unwrap_or_default();
        if host != SUPPORTED_HOST {
            return Err(GatewayError::UnsupportedHost(if host.is_empty() {
                trimmed.to_string()
            } else {
                host.to_string()
            }));
        }
        let mut segments = parsed.path().split('/').filter(|s| !s.is_empty());
        return match (segments.next(), segments.next()) {
            (Some(owner), Some(name)) => Ok(format!("{}/{}", owner, name)),
            _ => Err(GatewayError::NotFoundOrForbidden(trimmed.to_string())),
        };
    }

    // Bare "owner/name" path, as stored on a bound project.
    let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [owner, name]
            if !owner.contains(char::is_whitespace) && !name.contains(char::is_whitespace) =>
        {
            Ok(format!("{}/{}", owner, name))
        }
        _ => Err(GatewayError::UnsupportedHost(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browsable_url_resolves_to_full_name() {
        assert_eq!(
            parse_locator("https://github.com/acme/repo").unwrap(),
            "acme/repo"
        );
    }

    #[test]
    fn extra_path_segments_are_dropped() {
        assert_eq!(
            parse_locator("https://github.com/acme/repo/tree/main/src").unwrap(),
            "acme/repo"
        );
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(
            parse_locator("  https://github.com/acme/repo  ").unwrap(),
            "acme/repo"
        );
    }

    #[test]
    fn foreign_hosts_are_unsupported() {
        let err = parse_locator("https://gitlab.com/acme/repo").unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedHost(host) if host == "gitlab.com"));
    }

    #[test]
    fn url_without_a_repository_path_is_rejected() {
        let err = parse_locator("https://github.com/acme").unwrap_err();
        assert!(matches!(err, GatewayError::NotFoundOrForbidden(_)));
    }

    #[test]
    fn bare_owner_name_path_is_accepted() {
        assert_eq!(parse_locator("acme/repo").unwrap(), "acme/repo");
    }

    #[test]
    fn malformed_bare_paths_are_rejected() {
        assert!(parse_locator("acme").is_err());
        assert!(parse_locator("acme/repo/extra").is_err());
        assert!(parse_locator("acme corp/repo").is_err());
        assert!(parse_locator("").is_err());
    }
}

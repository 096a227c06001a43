//! IRI helpers for identifier resolution.
//!
//! Node identifiers are conventionally absolute IRIs. Link-integrity and
//! reachability checks only apply to identifiers whose origin (scheme +
//! host + port) matches a known definition; everything else is treated as
//! external and ignored.

use url::Url;

/// The origin of an absolute IRI, or `None` if the value does not parse.
///
/// Non-hierarchical schemes all serialize to the opaque origin `"null"`,
/// which keeps them mutually comparable the way browser URL semantics do.
pub fn origin(id: &str) -> Option<String> {
    let url = Url::parse(id).ok()?;
    Some(url.origin().ascii_serialization())
}

/// Strip a fragment: `https://e.org/p#intro` resolves against
/// `https://e.org/p`.
pub fn split_fragment(id: &str) -> &str {
    match id.find('#') {
        Some(i) => &id[..i],
        None => id,
    }
}

/// The last non-empty path segment of an identifier, trailing slash
/// trimmed. Used to derive the expected filename stem for reference nodes.
pub fn tail_slug(id: &str) -> Option<String> {
    let url = Url::parse(id).ok()?;
    let path = url.path().trim_end_matches('/');
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Whether a value looks like an absolute http(s) IRI.
pub fn is_http_iri(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_scheme_host_port() {
        assert_eq!(
            origin("https://example.org/pages/one").as_deref(),
            Some("https://example.org")
        );
        assert_eq!(
            origin("https://example.org:8443/x").as_deref(),
            Some("https://example.org:8443")
        );
        assert_eq!(origin("not a url"), None);
    }

    #[test]
    fn fragment_splitting() {
        assert_eq!(split_fragment("https://e.org/p#intro"), "https://e.org/p");
        assert_eq!(split_fragment("https://e.org/p"), "https://e.org/p");
    }

    #[test]
    fn tail_slug_trims_trailing_slash() {
        assert_eq!(
            tail_slug("https://example.org/refs/alpha").as_deref(),
            Some("alpha")
        );
        assert_eq!(
            tail_slug("https://example.org/refs/alpha/").as_deref(),
            Some("alpha")
        );
        assert_eq!(tail_slug("https://example.org/"), None);
        assert_eq!(tail_slug("no scheme"), None);
    }

    #[test]
    fn http_iri_detection() {
        assert!(is_http_iri("https://example.org/x"));
        assert!(is_http_iri("http://example.org/x"));
        assert!(!is_http_iri("urn:uuid:1234"));
        assert!(!is_http_iri("relative/path"));
    }
}

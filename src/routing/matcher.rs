//! Path predicates and normalization.
//!
//! # Responsibilities
//! - Put stored rule constants and incoming paths into one canonical form
//! - Strip the mount prefix before matching and forwarding
//! - Match exact and prefix predicates
//!
//! # Design Decisions
//! - Canonical form has no leading slash; both sides go through `canonical`
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

use std::borrow::Cow;

/// Canonical form of a path: leading slashes removed.
pub fn canonical(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Percent-decode a raw request path for matching.
///
/// Invalid UTF-8 sequences become U+FFFD; the rest of the path still
/// decodes, so a stray escape cannot hide an encoded rule path.
pub fn decode(raw: &str) -> Cow<'_, str> {
    match urlencoding::decode_binary(raw.as_bytes()) {
        Cow::Borrowed(_) => Cow::Borrowed(raw),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// A path condition attached to an interception rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPredicate {
    /// Path equals the stored value.
    Exact(String),
    /// Path starts with the stored value.
    Prefix(String),
}

impl PathPredicate {
    pub fn exact(path: &str) -> Self {
        Self::Exact(canonical(path).to_string())
    }

    pub fn prefix(path: &str) -> Self {
        Self::Prefix(canonical(path).to_string())
    }

    /// Returns true if the path satisfies this predicate.
    pub fn matches(&self, path: &str) -> bool {
        let path = canonical(path);
        match self {
            Self::Exact(expected) => path == expected,
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

/// The path segment the proxy is mounted under.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MountPrefix {
    /// Canonical form without leading or trailing slashes. Empty at root.
    segment: String,
}

impl MountPrefix {
    pub fn new(prefix: &str) -> Self {
        Self {
            segment: canonical(prefix).trim_end_matches('/').to_string(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.segment.is_empty()
    }

    /// Suffix appended to an origin to address the mount, e.g. "zykj".
    pub fn suffix(&self) -> &str {
        &self.segment
    }

    /// Strip the mount from a raw request path.
    ///
    /// Returns the remainder with a single leading slash, or `None` when the
    /// path is outside the mount.
    pub fn strip(&self, raw_path: &str) -> Option<String> {
        let path = canonical(raw_path);
        if self.is_root() {
            return Some(format!("/{path}"));
        }

        let rest = path.strip_prefix(self.segment.as_str())?;
        if rest.is_empty() {
            Some("/".to_string())
        } else if rest.starts_with('/') {
            Some(format!("/{}", canonical(rest)))
        } else {
            // "/zykjx" is not under "/zykj"
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_ignores_leading_slash_on_both_sides() {
        let with_slash = PathPredicate::exact("/api/discovery/sxz");
        let without = PathPredicate::exact("api/discovery/sxz");
        assert_eq!(with_slash, without);

        assert!(with_slash.matches("/api/discovery/sxz"));
        assert!(with_slash.matches("api/discovery/sxz"));
        assert!(with_slash.matches("//api/discovery/sxz"));
        assert!(!with_slash.matches("/api/discovery/sxz/"));
        assert!(!with_slash.matches("/api/discovery"));
    }

    #[test]
    fn prefix_matching() {
        let matcher = PathPredicate::prefix("/api/services/app/[WebWhiteList]/");
        assert!(matcher.matches("/api/services/app/[WebWhiteList]/GetAll"));
        assert!(matcher.matches("api/services/app/[WebWhiteList]/"));
        assert!(!matcher.matches("/api/services/app/[WebWhiteList]"));
        assert!(!matcher.matches("/api/services/app/[webwhitelist]/GetAll"));
    }

    #[test]
    fn decode_handles_encoded_brackets() {
        assert_eq!(decode("/a/%5BWebWhiteList%5D/b"), "/a/[WebWhiteList]/b");
        assert_eq!(decode("/plain"), "/plain");
        assert_eq!(decode("/bad/%ff"), "/bad/\u{FFFD}");
    }

    #[test]
    fn invalid_escape_does_not_hide_encoded_prefix() {
        let decoded = decode("/api/services/app/%5BWebWhiteList%5D/GetAll%FF");
        assert_eq!(decoded, "/api/services/app/[WebWhiteList]/GetAll\u{FFFD}");
        assert!(PathPredicate::prefix("/api/services/app/[WebWhiteList]/").matches(&decoded));
    }

    #[test]
    fn root_mount_keeps_whole_path() {
        let mount = MountPrefix::new("");
        assert!(mount.is_root());
        assert_eq!(mount.strip("/api/foo").as_deref(), Some("/api/foo"));
        assert_eq!(mount.strip("/").as_deref(), Some("/"));
    }

    #[test]
    fn named_mount_is_stripped() {
        for prefix in ["/zykj", "zykj", "/zykj/"] {
            let mount = MountPrefix::new(prefix);
            assert_eq!(mount.suffix(), "zykj");
            assert_eq!(mount.strip("/zykj/api/foo").as_deref(), Some("/api/foo"));
            assert_eq!(mount.strip("/zykj").as_deref(), Some("/"));
            assert_eq!(mount.strip("/zykj/").as_deref(), Some("/"));
            assert_eq!(mount.strip("/zykjx/api"), None);
            assert_eq!(mount.strip("/api/foo"), None);
        }
    }

    #[test]
    fn nested_mount() {
        let mount = MountPrefix::new("/proxy/v1");
        assert_eq!(mount.strip("/proxy/v1/api").as_deref(), Some("/api"));
        assert_eq!(mount.strip("/proxy/api"), None);
    }
}

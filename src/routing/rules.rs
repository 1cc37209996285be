//! Ordered interception rules.
//!
//! # Responsibilities
//! - Hold the compiled rules in priority order
//! - Return the first rule matching a method and normalized path
//! - Return an explicit no-match meaning "proxy normally"
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Priority is fixed in code, never taken from config order
//! - First match wins, not most specific match

use std::fmt;

use axum::http::Method;

use crate::config::RoutingConfig;
use crate::routing::matcher::PathPredicate;

/// Identifies which interception rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Self-referential discovery document.
    Discovery,
    /// Protected endpoint range, answered with 403.
    BlockedPrefix,
    /// Canned policy document.
    Preset,
}

impl RuleKind {
    /// Reason recorded in the request log when this rule short-circuits.
    pub fn reason(self) -> &'static str {
        match self {
            RuleKind::Discovery => "discovery endpoint intercepted",
            RuleKind::BlockedPrefix => "protected endpoint range",
            RuleKind::Preset => "preset response endpoint",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::Discovery => "discovery",
            RuleKind::BlockedPrefix => "blocked_prefix",
            RuleKind::Preset => "preset",
        };
        f.write_str(name)
    }
}

/// A single interception rule.
#[derive(Debug, Clone)]
pub struct InterceptRule {
    pub kind: RuleKind,
    pub predicate: PathPredicate,
    /// Methods the rule applies to; `None` means any method.
    pub methods: Option<Vec<Method>>,
}

impl InterceptRule {
    fn matches(&self, method: &Method, path: &str) -> bool {
        let method_ok = self
            .methods
            .as_ref()
            .map_or(true, |allowed| allowed.contains(method));
        method_ok && self.predicate.matches(path)
    }
}

/// Compiled rule list, evaluated in order.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<InterceptRule>,
}

impl RuleSet {
    /// Compile the three interception rules from routing config.
    pub fn from_config(config: &RoutingConfig) -> Self {
        let rules = vec![
            InterceptRule {
                kind: RuleKind::Discovery,
                predicate: PathPredicate::exact(&config.discovery_path),
                methods: Some(vec![Method::GET]),
            },
            InterceptRule {
                kind: RuleKind::BlockedPrefix,
                predicate: PathPredicate::prefix(&config.blocked_prefix),
                methods: None,
            },
            InterceptRule {
                kind: RuleKind::Preset,
                predicate: PathPredicate::exact(&config.preset_path),
                methods: None,
            },
        ];
        Self { rules }
    }

    /// Find the first rule matching the request, if any.
    pub fn evaluate(&self, method: &Method, path: &str) -> Option<RuleKind> {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.kind)
    }

    #[cfg(test)]
    fn rules(&self) -> &[InterceptRule] {
        &self.rules
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::from_config(&RoutingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISCOVERY: &str = "/api/discovery/sxz";
    const PRESET: &str = "/api/services/app/CtrlStrategy/GetControlPolicyByDeviceNumberAsync";

    #[test]
    fn discovery_requires_get() {
        let rules = RuleSet::default();
        assert_eq!(rules.evaluate(&Method::GET, DISCOVERY), Some(RuleKind::Discovery));
        assert_eq!(rules.evaluate(&Method::POST, DISCOVERY), None);
        assert_eq!(rules.evaluate(&Method::HEAD, DISCOVERY), None);
    }

    #[test]
    fn blocked_prefix_applies_to_every_method() {
        let rules = RuleSet::default();
        let path = "/api/services/app/[WebWhiteList]/GetWebWhiteLists";
        for method in [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS] {
            assert_eq!(rules.evaluate(&method, path), Some(RuleKind::BlockedPrefix));
        }
    }

    #[test]
    fn preset_is_exact() {
        let rules = RuleSet::default();
        assert_eq!(rules.evaluate(&Method::POST, PRESET), Some(RuleKind::Preset));
        assert_eq!(rules.evaluate(&Method::POST, &format!("{PRESET}/extra")), None);
    }

    #[test]
    fn unmatched_paths_proxy() {
        let rules = RuleSet::default();
        assert_eq!(rules.evaluate(&Method::POST, "/api/foo"), None);
        assert_eq!(rules.evaluate(&Method::GET, "/"), None);
    }

    #[test]
    fn first_match_wins_over_later_rules() {
        // Preset path placed under the protected prefix: the prefix rule fires first.
        let config = RoutingConfig {
            blocked_prefix: "/api/services/".into(),
            ..RoutingConfig::default()
        };
        let rules = RuleSet::from_config(&config);
        assert_eq!(rules.evaluate(&Method::POST, PRESET), Some(RuleKind::BlockedPrefix));

        // Discovery path under the protected prefix: discovery is checked first on GET only.
        let config = RoutingConfig {
            blocked_prefix: "/api/".into(),
            ..RoutingConfig::default()
        };
        let rules = RuleSet::from_config(&config);
        assert_eq!(rules.evaluate(&Method::GET, DISCOVERY), Some(RuleKind::Discovery));
        assert_eq!(rules.evaluate(&Method::POST, DISCOVERY), Some(RuleKind::BlockedPrefix));
    }

    #[test]
    fn config_slashes_do_not_change_matching() {
        let config = RoutingConfig {
            discovery_path: "api/discovery/sxz".into(),
            blocked_prefix: "api/services/app/[WebWhiteList]/".into(),
            preset_path: PRESET.trim_start_matches('/').into(),
            ..RoutingConfig::default()
        };
        let rules = RuleSet::from_config(&config);
        assert_eq!(rules.evaluate(&Method::GET, DISCOVERY), Some(RuleKind::Discovery));
        assert_eq!(
            rules.evaluate(&Method::GET, "/api/services/app/[WebWhiteList]/x"),
            Some(RuleKind::BlockedPrefix)
        );
        assert_eq!(rules.evaluate(&Method::GET, PRESET), Some(RuleKind::Preset));
    }

    #[test]
    fn rules_are_in_priority_order() {
        let kinds: Vec<_> = RuleSet::default().rules().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RuleKind::Discovery, RuleKind::BlockedPrefix, RuleKind::Preset]);
    }
}

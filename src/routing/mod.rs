//! Interception rule matching.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, raw path)
//!     → matcher.rs (strip mount prefix, percent-decode, canonicalize)
//!     → rules.rs (ordered rule evaluation)
//!     → Return: RuleKind or None ("proxy normally")
//!
//! Rule compilation (at startup):
//!     RoutingConfig
//!     → canonicalize stored paths with the same function used on requests
//!     → freeze as immutable RuleSet
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - No regex in hot path (exact and prefix matching only)
//! - Deterministic: same input always matches same rule
//! - First match wins (fixed priority order)

pub mod matcher;
pub mod rules;

pub use matcher::{MountPrefix, PathPredicate};
pub use rules::{InterceptRule, RuleKind, RuleSet};

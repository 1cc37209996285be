//! Request body rewriting.
//!
//! # Data Flow
//! ```text
//! raw body bytes + Content-Type
//!     → charset.rs (textual allow-list, charset parameter)
//!     → body.rs (decode, substitute token, re-encode)
//!     → TransformedBody { bytes, modified }
//! ```
//!
//! # Design Decisions
//! - Blunt textual substitution, not structural JSON/XML editing
//! - Failures never propagate: original bytes are forwarded, a warning logged

pub mod body;
pub mod charset;

pub use body::{BodyTransformer, TransformError, TransformedBody};

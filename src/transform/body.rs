//! Literal token substitution over textual request bodies.

use axum::body::Bytes;

use crate::config::RewriteConfig;
use crate::transform::charset::{declared_charset, is_textual, resolve};

/// Result of running a body through the transformer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedBody {
    /// Bytes to forward upstream.
    pub bytes: Bytes,
    /// True only when the body was decoded, substituted and re-encoded.
    pub modified: bool,
}

impl TransformedBody {
    fn unchanged(bytes: Bytes) -> Self {
        Self {
            bytes,
            modified: false,
        }
    }
}

/// Reasons a textual body could not be rewritten.
///
/// These never leave the transformer; they are logged and the original body
/// is forwarded instead.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("unsupported charset `{0}`")]
    UnsupportedCharset(String),

    #[error("body is not valid {0}")]
    Decode(&'static str),

    #[error("rewritten body cannot be represented in {0}")]
    Encode(&'static str),
}

/// Rewrites `from` to `to` in request bodies whose Content-Type is textual.
#[derive(Debug, Clone)]
pub struct BodyTransformer {
    from: String,
    to: String,
}

impl Default for BodyTransformer {
    fn default() -> Self {
        Self::from_config(&RewriteConfig::default())
    }
}

impl BodyTransformer {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn from_config(config: &RewriteConfig) -> Self {
        Self::new(config.from.clone(), config.to.clone())
    }

    /// Transform a request body according to its declared Content-Type.
    ///
    /// Non-textual bodies pass through untouched. Decoding or encoding
    /// failures are reported through `tracing` and also pass through.
    pub fn transform(&self, body: Bytes, content_type: &str) -> TransformedBody {
        if !is_textual(content_type) {
            return TransformedBody::unchanged(body);
        }

        let charset = declared_charset(content_type);
        match self.rewrite(&body, &charset) {
            Ok(bytes) => TransformedBody {
                bytes: Bytes::from(bytes),
                modified: true,
            },
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    charset = %charset,
                    content_type = %content_type,
                    "Request body rewrite failed, forwarding original"
                );
                TransformedBody::unchanged(body)
            }
        }
    }

    fn rewrite(&self, body: &[u8], charset: &str) -> Result<Vec<u8>, TransformError> {
        let encoding =
            resolve(charset).ok_or_else(|| TransformError::UnsupportedCharset(charset.to_string()))?;

        let text = encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .ok_or(TransformError::Decode(encoding.name()))?;

        let replaced = text.replace(&self.from, &self.to);

        let (encoded, _, unmappable) = encoding.encode(&replaced);
        if unmappable {
            return Err(TransformError::Encode(encoding.name()));
        }
        Ok(encoded.into_owned())
    }
}

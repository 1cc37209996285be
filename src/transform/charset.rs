//! Content-Type inspection: textual allow-list and charset parameter.

use encoding_rs::Encoding;

/// Media types whose bodies are treated as text and rewritten.
///
/// Matched as case-sensitive prefixes of the raw Content-Type value.
pub const TEXTUAL_TYPES: [&str; 6] = [
    "application/json",
    "text/plain",
    "application/xml",
    "text/xml",
    "application/x-www-form-urlencoded",
    "text/html",
];

/// Charset assumed when the Content-Type does not declare one.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Whether a body with this Content-Type is eligible for rewriting.
pub fn is_textual(content_type: &str) -> bool {
    TEXTUAL_TYPES.iter().any(|t| content_type.starts_with(t))
}

/// Extract the `charset=` parameter, lowercased, or the default.
///
/// The parameter name is located case-insensitively; the value runs to the
/// next `;` and is trimmed of whitespace and surrounding quotes.
pub fn declared_charset(content_type: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with the original.
    let lowered = content_type.to_ascii_lowercase();
    let Some(index) = lowered.find("charset=") else {
        return DEFAULT_CHARSET.to_string();
    };

    let rest = &lowered[index + "charset=".len()..];
    let value = rest.split(';').next().unwrap_or_default();
    value.trim().trim_matches('"').to_string()
}

/// Resolve a charset label to an encoding that can both decode and encode.
///
/// UTF-16 labels resolve to encodings whose encoder emits UTF-8, so they are
/// rejected along with unknown labels.
pub fn resolve(label: &str) -> Option<&'static Encoding> {
    let encoding = Encoding::for_label_no_replacement(label.as_bytes())?;
    (encoding.output_encoding() == encoding).then_some(encoding)
}

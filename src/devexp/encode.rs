//! Placeholder-preserving percent-encoding
//!
//! Keys and values headed for a URL or a form body may still hold
//! unresolved `{{ name }}` references. Those are copied through untouched;
//! every literal run around them is percent-encoded.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::devexp::variables::PLACEHOLDER_RE;

/// Characters left alone by URI component encoding (`A-Z a-z 0-9 - _ . ! ~ * ' ( )`)
pub const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a URI component
pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Percent-encode everything except `{{ name }}` placeholders
pub fn smart_encode(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last = 0;

    for m in PLACEHOLDER_RE.find_iter(text) {
        result.push_str(&percent_encode(&text[last..m.start()]));
        result.push_str(m.as_str());
        last = m.end();
    }
    result.push_str(&percent_encode(&text[last..]));

    result
}

/// Decode a percent-encoded component; invalid UTF-8 is replaced lossily
pub fn percent_decode(s: &str) -> String {
    percent_encoding::percent_decode_str(s)
        .decode_utf8_lossy()
        .into_owned()
}

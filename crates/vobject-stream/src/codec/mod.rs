//! Bridge to the quoted-printable codec and character set registry.
//!
//! Quoted-printable transports 8-bit data through 7-bit-safe streams by
//! encoding each byte as `=HH`. Decoding is delegated to the
//! `quoted_printable` crate and the character set layer to `encoding_rs`;
//! this module composes the two and normalizes their error surfaces.

use encoding_rs::Encoding;
use thiserror::Error;

/// An error resolving a character set name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharsetError {
    /// The name contains characters that are not legal in a charset name.
    #[error("illegal character set name: {0:?}")]
    IllegalName(String),
    /// The name is well-formed but does not match any known character set.
    #[error("unsupported character set: {0:?}")]
    Unsupported(String),
}

/// An error decoding a quoted-printable value.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The value contains an invalid `=HH` sequence.
    #[error("invalid quoted-printable sequence: {0}")]
    QuotedPrintable(#[from] quoted_printable::QuotedPrintableError),
}

/// Resolves a character set label (e.g. "UTF-8", "windows-1252").
///
/// ## Errors
/// Returns [`CharsetError::IllegalName`] if the label is not a
/// syntactically valid charset name, or [`CharsetError::Unsupported`] if no
/// known character set matches it.
pub fn lookup_charset(label: &str) -> Result<&'static Encoding, CharsetError> {
    if !is_legal_charset_name(label) {
        return Err(CharsetError::IllegalName(label.to_string()));
    }
    Encoding::for_label(label.as_bytes())
        .ok_or_else(|| CharsetError::Unsupported(label.to_string()))
}

/// Decodes a quoted-printable value into text.
///
/// The `=HH` layer is strict: a malformed escape sequence is an error. The
/// character set layer is lenient: byte sequences that are invalid in the
/// given encoding decode to replacement characters, matching how consumers
/// of legacy vobject data behave.
///
/// ## Errors
/// Returns an error if the value contains an invalid quoted-printable
/// sequence.
pub fn decode_quoted_printable(
    value: &str,
    encoding: &'static Encoding,
) -> Result<String, DecodeError> {
    let bytes = quoted_printable::decode(value, quoted_printable::ParseMode::Strict)?;
    let (text, _, _) = encoding.decode(&bytes);
    Ok(text.into_owned())
}

/// Encodes text as quoted-printable under the given character set.
///
/// Unmappable characters are replaced by the charset encoder. The output
/// contains no soft line breaks: folding the encoded value is the line
/// emitter's job, and it inserts its own soft breaks at the configured
/// column.
#[must_use]
pub fn encode_quoted_printable(value: &str, encoding: &'static Encoding) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let (bytes, _, _) = encoding.encode(value);
    let mut result = String::with_capacity(bytes.len());
    for &byte in bytes.iter() {
        match byte {
            // printable ASCII except "=", plus space and tab
            b' ' | b'\t' | 33..=60 | 62..=126 => result.push(char::from(byte)),
            _ => {
                result.push('=');
                result.push(char::from(HEX[usize::from(byte >> 4)]));
                result.push(char::from(HEX[usize::from(byte & 0x0f)]));
            }
        }
    }
    result
}

/// A charset name is a leading alphanumeric followed by alphanumerics and
/// any of `- + . : _`.
fn is_legal_charset_name(label: &str) -> bool {
    let mut chars = label.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphanumeric()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.' | ':' | '_'))
}

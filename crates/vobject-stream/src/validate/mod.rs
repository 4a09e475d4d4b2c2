//! Character validation for the lexical positions of a property line.
//!
//! Two profiles are supported: strict, which enforces what the
//! specifications allow, and non-strict, which allows any character that
//! does not break the syntax. The writer validates with the non-strict
//! profile; the strict profile is available to callers that want
//! spec-compliant data.

mod allowed;

pub use allowed::{AllowedCharacters, Builder};

use crate::SyntaxStyle;

/// Returns the allowed characters for a group name.
#[must_use]
pub fn allowed_group_chars(syntax: SyntaxStyle, strict: bool) -> AllowedCharacters {
    allowed_property_name_chars(syntax, strict)
}

/// Returns the allowed characters for a property name.
#[must_use]
pub fn allowed_property_name_chars(syntax: SyntaxStyle, strict: bool) -> AllowedCharacters {
    match (syntax, strict) {
        (_, false) => allowed::NAME_LENIENT,
        (SyntaxStyle::Old, true) => allowed::NAME_OLD_STRICT,
        (SyntaxStyle::New, true) => allowed::NAME_NEW_STRICT,
    }
}

/// Returns the allowed characters for a parameter name.
#[must_use]
pub fn allowed_parameter_name_chars(syntax: SyntaxStyle, strict: bool) -> AllowedCharacters {
    match (syntax, strict) {
        (_, false) => allowed::PARAM_NAME_LENIENT,
        (SyntaxStyle::Old, true) => allowed::NAME_OLD_STRICT,
        (SyntaxStyle::New, true) => allowed::NAME_NEW_STRICT,
    }
}

/// Returns the allowed characters for a parameter value.
///
/// Caret encoding has no effect in old-style syntax.
#[must_use]
pub fn allowed_parameter_value_chars(
    syntax: SyntaxStyle,
    caret_encoding: bool,
    strict: bool,
) -> AllowedCharacters {
    match (syntax, caret_encoding, strict) {
        (SyntaxStyle::Old, _, false) => allowed::PARAM_VALUE_OLD,
        (SyntaxStyle::Old, _, true) => allowed::PARAM_VALUE_OLD_STRICT,
        (SyntaxStyle::New, false, false) => allowed::PARAM_VALUE_NEW,
        (SyntaxStyle::New, false, true) => allowed::PARAM_VALUE_NEW_STRICT,
        (SyntaxStyle::New, true, false) => allowed::PARAM_VALUE_NEW_CARET,
        (SyntaxStyle::New, true, true) => allowed::PARAM_VALUE_NEW_CARET_STRICT,
    }
}

/// Validates a group name.
#[must_use]
pub fn validate_group_name(group: &str, syntax: SyntaxStyle, strict: bool) -> bool {
    allowed_group_chars(syntax, strict).check(group)
}

/// Validates a property name.
#[must_use]
pub fn validate_property_name(name: &str, syntax: SyntaxStyle, strict: bool) -> bool {
    allowed_property_name_chars(syntax, strict).check(name)
}

/// Validates a parameter name.
#[must_use]
pub fn validate_parameter_name(name: &str, syntax: SyntaxStyle, strict: bool) -> bool {
    allowed_parameter_name_chars(syntax, strict).check(name)
}

/// Validates a parameter value.
#[must_use]
pub fn validate_parameter_value(
    value: &str,
    syntax: SyntaxStyle,
    caret_encoding: bool,
    strict: bool,
) -> bool {
    allowed_parameter_value_chars(syntax, caret_encoding, strict).check(value)
}

//! Character class tables.

use std::fmt;

/// An immutable set of characters permitted at some lexical position.
///
/// The set is a 128-bit mask over 7-bit ASCII plus a flag that decides
/// whether characters outside of 7-bit ASCII are permitted. Tables are
/// built once in `const` context and shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedCharacters {
    mask: u128,
    allow_non_ascii: bool,
}

impl AllowedCharacters {
    /// Creates a builder with no characters allowed.
    #[must_use]
    pub const fn builder() -> Builder {
        Builder {
            mask: 0,
            allow_non_ascii: false,
        }
    }

    /// Determines if a string consists only of allowed characters.
    #[must_use]
    pub fn check(&self, string: &str) -> bool {
        string.chars().all(|c| self.check_char(c))
    }

    /// Determines if a single character is allowed.
    #[must_use]
    pub fn check_char(&self, c: char) -> bool {
        let code = c as u32;
        if code >= 128 {
            self.allow_non_ascii
        } else {
            self.mask & (1u128 << code) != 0
        }
    }

    /// Returns whether characters outside of 7-bit ASCII are allowed.
    #[must_use]
    pub const fn is_non_ascii_allowed(&self) -> bool {
        self.allow_non_ascii
    }

    /// Returns the complement of this set (the characters that are NOT
    /// allowed). Used to render user-facing validation messages.
    #[must_use]
    pub const fn flip(self) -> Self {
        Self {
            mask: !self.mask,
            allow_non_ascii: !self.allow_non_ascii,
        }
    }
}

impl fmt::Display for AllowedCharacters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for code in 0u8..128 {
            if self.mask & (1u128 << code) == 0 {
                continue;
            }
            match code {
                b' ' => write!(f, " <space>")?,
                b'\r' => write!(f, " \\r")?,
                b'\n' => write!(f, " \\n")?,
                b'\t' => write!(f, " \\t")?,
                0..=31 | 127 => write!(f, " ({code})")?,
                _ => write!(f, " {}", code as char)?,
            }
        }
        write!(f, " ]")
    }
}

/// Builder for [`AllowedCharacters`]. All methods are `const` so tables can
/// be defined as constants.
#[derive(Debug, Clone, Copy)]
pub struct Builder {
    mask: u128,
    allow_non_ascii: bool,
}

impl Builder {
    /// Starts from an existing table.
    #[must_use]
    pub const fn from_table(table: AllowedCharacters) -> Self {
        Self {
            mask: table.mask,
            allow_non_ascii: table.allow_non_ascii,
        }
    }

    /// Allows every character.
    #[must_use]
    pub const fn allow_all(mut self) -> Self {
        self.mask = !0;
        self.allow_non_ascii = true;
        self
    }

    /// Allows the ASCII range `from..=to`.
    #[must_use]
    pub const fn allow_range(mut self, from: u8, to: u8) -> Self {
        let mut code = from;
        while code <= to {
            self.mask |= 1u128 << code;
            code += 1;
        }
        self
    }

    /// Allows every character in the given string.
    #[must_use]
    pub const fn allow(mut self, characters: &str) -> Self {
        let bytes = characters.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            self.mask |= 1u128 << bytes[i];
            i += 1;
        }
        self
    }

    /// Allows the printable ASCII characters (32-126 inclusive). This
    /// includes the space character but not tabs or newlines.
    #[must_use]
    pub const fn allow_printable(self) -> Self {
        self.allow_range(32, 126)
    }

    /// Allows characters outside of 7-bit ASCII.
    #[must_use]
    pub const fn allow_non_ascii(mut self) -> Self {
        self.allow_non_ascii = true;
        self
    }

    /// Rejects every character in the given string.
    #[must_use]
    pub const fn except(mut self, characters: &str) -> Self {
        let bytes = characters.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            self.mask &= !(1u128 << bytes[i]);
            i += 1;
        }
        self
    }

    /// Constructs the final table.
    #[must_use]
    pub const fn build(self) -> AllowedCharacters {
        AllowedCharacters {
            mask: self.mask,
            allow_non_ascii: self.allow_non_ascii,
        }
    }
}

/// Group and property name, both dialects, non-strict: anything that does
/// not break the line syntax.
pub(crate) const NAME_LENIENT: AllowedCharacters = AllowedCharacters::builder()
    .allow_all()
    .except("\r\n:.;")
    .build();

/// Group and property name, old style, strict.
///
/// The formal grammar of vCard 2.1 and vCal 1.0 permits semicolons in
/// property names, but a semicolon cannot survive the tokenizer, so it is
/// rejected here as well.
pub(crate) const NAME_OLD_STRICT: AllowedCharacters = AllowedCharacters::builder()
    .allow_printable()
    .except("[]=:.,")
    .except(";")
    .build();

/// Group and property name, new style, strict.
pub(crate) const NAME_NEW_STRICT: AllowedCharacters = AllowedCharacters::builder()
    .allow_range(b'A', b'Z')
    .allow_range(b'a', b'z')
    .allow_range(b'0', b'9')
    .allow("-")
    .build();

/// Parameter name, both dialects, non-strict.
pub(crate) const PARAM_NAME_LENIENT: AllowedCharacters = AllowedCharacters::builder()
    .allow_all()
    .except("\r\n:;=")
    .build();

/// Parameter value, old style, non-strict.
pub(crate) const PARAM_VALUE_OLD: AllowedCharacters = AllowedCharacters::builder()
    .allow_all()
    .except("\r\n:")
    .build();

/// Parameter value, old style, strict: the strict parameter name set plus
/// semicolons (which the emitter escapes with a backslash).
pub(crate) const PARAM_VALUE_OLD_STRICT: AllowedCharacters =
    Builder::from_table(NAME_OLD_STRICT).allow(";").build();

/// Parameter value, new style without caret encoding, non-strict.
pub(crate) const PARAM_VALUE_NEW: AllowedCharacters = AllowedCharacters::builder()
    .allow_all()
    .except("\r\n\"")
    .build();

/// Parameter value, new style without caret encoding, strict.
pub(crate) const PARAM_VALUE_NEW_STRICT: AllowedCharacters = AllowedCharacters::builder()
    .allow_printable()
    .allow_non_ascii()
    .allow("\t")
    .except("\"")
    .build();

/// Parameter value, new style with caret encoding, non-strict.
pub(crate) const PARAM_VALUE_NEW_CARET: AllowedCharacters =
    AllowedCharacters::builder().allow_all().build();

/// Parameter value, new style with caret encoding, strict.
pub(crate) const PARAM_VALUE_NEW_CARET_STRICT: AllowedCharacters = AllowedCharacters::builder()
    .allow_printable()
    .allow_non_ascii()
    .allow("\r\n\t")
    .build();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_ascii() {
        let table = AllowedCharacters::builder().allow("abc").build();
        assert!(table.check("abcba"));
        assert!(!table.check("abcd"));
        assert!(!table.check("ab\u{e9}"));
    }

    #[test]
    fn check_non_ascii() {
        let table = AllowedCharacters::builder().allow("abc").allow_non_ascii().build();
        assert!(table.check("ab\u{e9}c"));
        assert!(!table.check("abd"));
    }

    #[test]
    fn flip_is_complement() {
        let table = AllowedCharacters::builder().allow("x").build();
        let flipped = table.flip();
        assert!(!flipped.check("x"));
        assert!(flipped.check("y"));
        assert!(flipped.check("\u{e9}"));
    }

    #[test]
    fn lenient_name_rejects_structural_characters() {
        for c in ['\r', '\n', ':', '.', ';'] {
            assert!(!NAME_LENIENT.check_char(c), "{c:?}");
        }
        assert!(NAME_LENIENT.check("NOTE #2 \u{e9}"));
    }

    #[test]
    fn strict_new_name_is_alphanumeric_dash() {
        assert!(NAME_NEW_STRICT.check("X-FOO-2"));
        assert!(!NAME_NEW_STRICT.check("NOTE #2"));
        assert!(!NAME_NEW_STRICT.check("caf\u{e9}"));
    }

    #[test]
    fn old_strict_param_value_allows_semicolon() {
        assert!(!NAME_OLD_STRICT.check_char(';'));
        assert!(PARAM_VALUE_OLD_STRICT.check_char(';'));
    }

    #[test]
    fn caret_tables_admit_newlines() {
        assert!(PARAM_VALUE_NEW_CARET.check("any\r\nthing\"at all"));
        assert!(PARAM_VALUE_NEW_CARET_STRICT.check("line one\r\nline two\t\"quoted\""));
        assert!(!PARAM_VALUE_NEW_STRICT.check_char('"'));
        assert!(!PARAM_VALUE_NEW.check_char('\n'));
    }

    #[test]
    fn display_renders_special_characters() {
        let table = AllowedCharacters::builder().allow("a \t").build();
        assert_eq!(table.to_string(), "[ \\t <space> a ]");
    }
}

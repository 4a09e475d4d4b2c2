//! The streaming vobject writer.

use std::borrow::Cow;
use std::io::{self, Write};

use super::FoldedLineWriter;
use crate::error::WriteError;
use crate::{validate, Parameters, Property, SyntaxStyle};

/// Writes properties to a vobject data stream.
///
/// ```rust
/// use vobject_stream::build::VObjectWriter;
/// use vobject_stream::SyntaxStyle;
///
/// let mut writer = VObjectWriter::new(Vec::new(), SyntaxStyle::New);
/// writer.write_begin_component("VCARD").unwrap();
/// writer.write_version("4.0").unwrap();
/// writer.write_simple_property("FN", "John Doe").unwrap();
/// writer.write_end_component("VCARD").unwrap();
///
/// let data = String::from_utf8(writer.into_inner()).unwrap();
/// assert_eq!(data, "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:John Doe\r\nEND:VCARD\r\n");
/// ```
///
/// The writer is strict: a property whose group, name, or parameters
/// contain characters that cannot be encoded or escaped is rejected with a
/// [`WriteError`] and nothing is written, so a validation failure never
/// corrupts the stream.
///
/// Newlines in property values are handled per dialect. Old-style syntax
/// has no `\n` escape sequence, so the value is promoted to
/// quoted-printable encoding; new-style values have their newlines replaced
/// with the two characters `\n`. Values already marked with
/// `ENCODING=QUOTED-PRINTABLE` are encoded on output, using the CHARSET
/// parameter if usable and UTF-8 otherwise (the parameters written to the
/// stream record the charset actually used; the caller's parameter map is
/// never mutated).
pub struct VObjectWriter<W: Write> {
    writer: FoldedLineWriter<W>,
    syntax_style: SyntaxStyle,
    caret_encoding_enabled: bool,
}

impl<W: Write> VObjectWriter<W> {
    /// Creates a writer over a character sink.
    pub fn new(writer: W, syntax_style: SyntaxStyle) -> Self {
        Self {
            writer: FoldedLineWriter::new(writer),
            syntax_style,
            caret_encoding_enabled: false,
        }
    }

    /// The folding writer used for output. Fold length and indent are
    /// configured there.
    pub fn folded_line_writer(&mut self) -> &mut FoldedLineWriter<W> {
        &mut self.writer
    }

    /// The syntax style the writer is producing.
    #[must_use]
    pub fn syntax_style(&self) -> SyntaxStyle {
        self.syntax_style
    }

    /// Sets the syntax style to produce.
    pub fn set_syntax_style(&mut self, syntax_style: SyntaxStyle) {
        self.syntax_style = syntax_style;
    }

    /// Whether circumflex accent encoding is applied to parameter values
    /// (disabled by default). It allows newlines and double quotes inside
    /// parameter values, but is defined in a separate specification that
    /// not every consumer supports. New-style syntax only.
    #[must_use]
    pub fn is_caret_encoding_enabled(&self) -> bool {
        self.caret_encoding_enabled
    }

    /// Enables or disables circumflex accent encoding of parameter values.
    pub fn set_caret_encoding_enabled(&mut self, enabled: bool) {
        self.caret_encoding_enabled = enabled;
    }

    /// Writes a `BEGIN` property marking the start of a component.
    ///
    /// ## Errors
    /// Returns an error if the component name is empty or writing fails.
    pub fn write_begin_component(&mut self, component_name: &str) -> Result<(), WriteError> {
        if component_name.is_empty() {
            return Err(WriteError::EmptyComponentName);
        }
        self.write_simple_property("BEGIN", component_name)
    }

    /// Writes an `END` property marking the end of a component.
    ///
    /// ## Errors
    /// Returns an error if the component name is empty or writing fails.
    pub fn write_end_component(&mut self, component_name: &str) -> Result<(), WriteError> {
        if component_name.is_empty() {
            return Err(WriteError::EmptyComponentName);
        }
        self.write_simple_property("END", component_name)
    }

    /// Writes a `VERSION` property.
    ///
    /// ## Errors
    /// Returns an error if the version string is empty or writing fails.
    pub fn write_version(&mut self, version: &str) -> Result<(), WriteError> {
        if version.is_empty() {
            return Err(WriteError::EmptyVersion);
        }
        self.write_simple_property("VERSION", version)
    }

    /// Writes a property with no group and no parameters.
    ///
    /// ## Errors
    /// Returns an error if the property fails validation or writing fails.
    pub fn write_simple_property(&mut self, name: &str, value: &str) -> Result<(), WriteError> {
        self.write_property_parts(None, name, &Parameters::new(), value)
    }

    /// Writes a property.
    ///
    /// ## Errors
    /// Returns an error if the property fails validation or writing fails.
    pub fn write_property(&mut self, property: &Property) -> Result<(), WriteError> {
        self.write_property_parts(
            property.group.as_deref(),
            &property.name,
            &property.parameters,
            &property.value,
        )
    }

    /// Writes a property given as its four parts.
    ///
    /// ## Errors
    /// Returns an error if the property fails validation or writing fails.
    pub fn write_property_parts(
        &mut self,
        group: Option<&str>,
        name: &str,
        parameters: &Parameters,
        value: &str,
    ) -> Result<(), WriteError> {
        self.validate(group, name, parameters)?;

        let mut parameters = Cow::Borrowed(parameters);
        let mut value = Cow::Borrowed(value);

        match self.syntax_style {
            SyntaxStyle::Old => {
                // old style has no "\n" escape sequence, so values with
                // newlines are promoted to quoted-printable encoding
                if contains_newlines(&value) && !parameters.is_quoted_printable() {
                    parameters
                        .to_mut()
                        .put(Some("ENCODING"), "QUOTED-PRINTABLE");
                }
            }
            SyntaxStyle::New => {
                if contains_newlines(&value) {
                    value = Cow::Owned(escape_newlines(&value));
                }
            }
        }

        let quoted_printable = parameters.is_quoted_printable();
        let mut charset = encoding_rs::UTF_8;
        if quoted_printable {
            match parameters.charset() {
                Ok(Some(resolved)) => charset = resolved,
                Ok(None) | Err(_) => {
                    // missing or unrecognized charset: use UTF-8 and record
                    // the charset actually used
                    parameters.to_mut().replace(Some("CHARSET"), charset.name());
                }
            }
        }

        if let Some(group) = group {
            if !group.is_empty() {
                self.writer.append(group)?;
                self.writer.append(".")?;
            }
        }
        self.writer.append(name)?;

        for (param_name, values) in parameters.iter() {
            if values.is_empty() {
                // an empty value list is logically absent
                continue;
            }

            match self.syntax_style {
                SyntaxStyle::Old => {
                    // one segment per value, e.g. ADR;TYPE=home;TYPE=work:
                    for value in values {
                        let value = escape_old_style_param_value(value);
                        self.writer.append(";")?;
                        if let Some(param_name) = param_name {
                            self.writer.append(param_name)?;
                            self.writer.append("=")?;
                        }
                        self.writer.append(&value)?;
                    }
                }
                SyntaxStyle::New => {
                    // one segment per key, e.g. ADR;TYPE=home,work:
                    self.writer.append(";")?;
                    if let Some(param_name) = param_name {
                        self.writer.append(param_name)?;
                        self.writer.append("=")?;
                    }

                    for (index, value) in values.iter().enumerate() {
                        let value = if self.caret_encoding_enabled {
                            Cow::Owned(apply_caret_encoding(value))
                        } else {
                            Cow::Borrowed(value.as_str())
                        };

                        if index > 0 {
                            self.writer.append(",")?;
                        }

                        if should_quote_param_value(&value) {
                            self.writer.append("\"")?;
                            self.writer.append(&value)?;
                            self.writer.append("\"")?;
                        } else {
                            self.writer.append(&value)?;
                        }
                    }
                }
            }
        }

        self.writer.append(":")?;
        self.writer.write(&value, quoted_printable, charset)?;
        self.writer.writeln()?;

        Ok(())
    }

    /// Checks that the property data is safe to write under the current
    /// dialect and caret-encoding setting.
    fn validate(
        &self,
        group: Option<&str>,
        name: &str,
        parameters: &Parameters,
    ) -> Result<(), WriteError> {
        let style = self.syntax_style;

        if let Some(group) = group {
            let allowed = validate::allowed_group_chars(style, false);
            if !allowed.check(group) {
                return Err(WriteError::InvalidGroup {
                    name: name.to_string(),
                    group: group.to_string(),
                    not_permitted: allowed.flip().to_string(),
                });
            }
            if begins_with_whitespace(group) {
                return Err(WriteError::GroupBeginsWithWhitespace {
                    name: name.to_string(),
                    group: group.to_string(),
                });
            }
        }

        if name.is_empty() {
            return Err(WriteError::EmptyPropertyName);
        }
        let allowed = validate::allowed_property_name_chars(style, false);
        if !allowed.check(name) {
            return Err(WriteError::InvalidPropertyName {
                name: name.to_string(),
                not_permitted: allowed.flip().to_string(),
            });
        }
        if begins_with_whitespace(name) {
            return Err(WriteError::PropertyNameBeginsWithWhitespace {
                name: name.to_string(),
            });
        }

        let allowed_name = validate::allowed_parameter_name_chars(style, false);
        let allowed_value =
            validate::allowed_parameter_value_chars(style, self.caret_encoding_enabled, false);

        for (param_name, values) in parameters.iter() {
            match param_name {
                None if style == SyntaxStyle::New => {
                    return Err(WriteError::NamelessParameter {
                        name: name.to_string(),
                    });
                }
                Some(param_name) if !allowed_name.check(param_name) => {
                    return Err(WriteError::InvalidParameterName {
                        name: name.to_string(),
                        parameter: param_name.to_string(),
                        not_permitted: allowed_name.flip().to_string(),
                    });
                }
                _ => {}
            }

            for value in values {
                if !allowed_value.check(value) {
                    return Err(WriteError::InvalidParameterValue {
                        name: name.to_string(),
                        parameter: param_name.map(str::to_string),
                        not_permitted: allowed_value.flip().to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Flushes the underlying sink.
    ///
    /// ## Errors
    /// Returns an error if flushing the underlying sink fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consumes the writer, returning the underlying sink.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

fn contains_newlines(string: &str) -> bool {
    string.contains(['\r', '\n'])
}

fn begins_with_whitespace(string: &str) -> bool {
    string.starts_with([' ', '\t'])
}

/// A new-style parameter value is quoted when it contains characters that
/// would otherwise end the value.
fn should_quote_param_value(value: &str) -> bool {
    value.contains([',', ':', ';'])
}

/// Escapes backslashes and semicolons in an old-style parameter value.
fn escape_old_style_param_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == ';' {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// Applies circumflex accent encoding: `^` becomes `^^`, `"` becomes `^'`,
/// and each newline sequence becomes `^n`.
fn apply_caret_encoding(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut prev = '\0';
    for c in value.chars() {
        match c {
            // a CRLF pair is a single newline
            '\n' if prev == '\r' => {}
            '\r' | '\n' => result.push_str("^n"),
            '^' => result.push_str("^^"),
            '"' => result.push_str("^'"),
            _ => result.push(c),
        }
        prev = c;
    }
    result
}

/// Replaces each newline sequence with the two characters `\n` (a CRLF
/// pair produces a single escape).
fn escape_newlines(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut prev = '\0';
    for c in value.chars() {
        match c {
            '\n' if prev == '\r' => {}
            '\r' | '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
        prev = c;
    }
    result
}

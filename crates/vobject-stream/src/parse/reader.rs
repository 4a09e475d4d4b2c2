//! The streaming vobject reader.

use std::io::{self, BufRead};

use encoding_rs::Encoding;

use super::{Context, SyntaxRules, VObjectListener, Warning};
use crate::codec;
use crate::{Parameters, Property, SyntaxStyle};

/// Parses a vobject data stream.
///
/// ```rust
/// use vobject_stream::parse::{SyntaxRules, VObjectListener, VObjectReader};
/// use vobject_stream::{Context, Property};
///
/// struct Printer;
///
/// impl VObjectListener for Printer {
///     fn on_property(&mut self, property: Property, _context: &mut Context) {
///         println!("{}={}", property.name, property.value);
///     }
/// }
///
/// let data = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:John Doe\r\nEND:VCARD\r\n";
/// let mut reader = VObjectReader::new(data.as_bytes(), SyntaxRules::vcard());
/// reader.parse(&mut Printer).unwrap();
/// ```
///
/// Properties with an `ENCODING=QUOTED-PRINTABLE` parameter (or the legacy
/// nameless `QUOTED-PRINTABLE` parameter) have their values decoded before
/// delivery; the ENCODING and CHARSET parameters are left in place so the
/// caller can still see the original encoding. When no CHARSET parameter is
/// present, or its value cannot be resolved, the
/// [default quoted-printable charset](Self::set_default_quoted_printable_charset)
/// is used and decoding problems are reported as warnings rather than
/// errors.
///
/// Parameter values encoded with circumflex accents (`^^`, `^n`, `^'`) are
/// decoded automatically in new-style syntax. This can be
/// [turned off](Self::set_caret_decoding_enabled) for data that uses raw
/// `^` characters.
///
/// Folded lines are unfolded transparently, including quoted-printable
/// values whose continuation lines are missing the folding whitespace.
pub struct VObjectReader<R> {
    reader: R,
    rules: SyntaxRules,
    caret_decoding_enabled: bool,
    default_quoted_printable_charset: &'static Encoding,
    newline: String,

    /// Syntax style of each open component, plus one bottom slot for
    /// properties outside of any component. Always one element longer than
    /// the component path in `context`.
    styles: Vec<SyntaxStyle>,
    context: Context,
    /// Accumulator reused across properties.
    buffer: String,
    /// The character read when it was determined that the previous property
    /// had ended.
    left_over: Option<char>,
    line_number: usize,
    eos: bool,
}

impl<R: BufRead> VObjectReader<R> {
    /// Creates a reader over a character source.
    ///
    /// `rules` decides the initial syntax style and how VERSION properties
    /// switch it mid-stream.
    #[must_use]
    pub fn new(reader: R, rules: SyntaxRules) -> Self {
        let default_style = rules.default_style();
        Self {
            reader,
            rules,
            caret_decoding_enabled: true,
            default_quoted_printable_charset: encoding_rs::UTF_8,
            newline: if cfg!(windows) { "\r\n" } else { "\n" }.to_string(),
            styles: vec![default_style],
            context: Context::new(),
            buffer: String::new(),
            left_over: None,
            line_number: 1,
            eos: false,
        }
    }

    /// Whether circumflex accent decoding is applied to parameter values
    /// (enabled by default; new-style syntax only).
    #[must_use]
    pub fn is_caret_decoding_enabled(&self) -> bool {
        self.caret_decoding_enabled
    }

    /// Enables or disables circumflex accent decoding of parameter values.
    pub fn set_caret_decoding_enabled(&mut self, enabled: bool) {
        self.caret_decoding_enabled = enabled;
    }

    /// The character set used to decode quoted-printable values of
    /// properties that lack a CHARSET parameter, or whose CHARSET parameter
    /// cannot be resolved. Defaults to UTF-8.
    #[must_use]
    pub fn default_quoted_printable_charset(&self) -> &'static Encoding {
        self.default_quoted_printable_charset
    }

    /// Sets the fallback character set for quoted-printable decoding.
    pub fn set_default_quoted_printable_charset(&mut self, charset: &'static Encoding) {
        self.default_quoted_printable_charset = charset;
    }

    /// The newline sequence produced when expanding `^n` escapes. Defaults
    /// to the platform newline.
    #[must_use]
    pub fn newline(&self) -> &str {
        &self.newline
    }

    /// Sets the newline sequence produced when expanding `^n` escapes.
    pub fn set_newline(&mut self, newline: impl Into<String>) {
        self.newline = newline.into();
    }

    /// Consumes the reader, returning the underlying character source.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Starts or continues parsing the data stream.
    ///
    /// Returns when the end of the stream is reached or when the listener
    /// raises the [stop flag](Context::stop). A subsequent call resumes
    /// from the next character with the component stack, syntax style, and
    /// look-ahead preserved.
    ///
    /// ## Errors
    /// Returns an error if reading from the underlying stream fails.
    /// Malformed content never causes an error, only warnings.
    pub fn parse<L: VObjectListener>(&mut self, listener: &mut L) -> io::Result<()> {
        self.context.stop = false;

        while !self.eos && !self.context.stop {
            self.context.line_number = self.line_number;
            self.buffer.clear();
            self.context.unfolded_line.clear();

            let property = self.parse_property(listener)?;

            if self.context.unfolded_line.is_empty() {
                // nothing but line terminators remained
                return Ok(());
            }

            let Some(property) = property else {
                tracing::warn!(line = self.context.line_number, "skipping malformed line");
                listener.on_warning(Warning::MalformedLine, &mut self.context);
                continue;
            };

            self.dispatch(property, listener);
        }

        Ok(())
    }

    /// Parses the next property off the stream. Returns `None` if the line
    /// ended before a colon was seen.
    #[expect(clippy::too_many_lines)]
    fn parse_property<L: VObjectListener>(
        &mut self,
        listener: &mut L,
    ) -> io::Result<Option<Property>> {
        let mut group: Option<String> = None;
        let mut name: Option<String> = None;
        let mut parameters = Parameters::new();

        let syntax = self.current_style();

        // the name of the parameter currently being read (None both before
        // any "=" is seen and for legacy nameless parameters)
        let mut cur_param_name: Option<String> = None;
        // a pending parameter value escape character
        let mut escape: Option<char> = None;
        let mut in_quotes = false;
        let mut in_value = false;
        // the value is quoted-printable and the previous line ended with "="
        let mut folded_qp_line = false;
        let mut in_fold_whitespace = false;

        let mut ch = '\0';

        loop {
            let prev = ch;

            let Some(read) = self.read_char()? else {
                self.eos = true;
                break;
            };
            ch = read;

            if prev == '\r' && ch == '\n' {
                // the newline was handled when the CR was seen
                continue;
            }

            if is_newline(ch) {
                folded_qp_line = in_value && prev == '=' && parameters.is_quoted_printable();
                if folded_qp_line {
                    // drop the "=" that quoted-printable lines end with
                    // when they are folded
                    self.buffer.pop();
                    self.context.unfolded_line.pop();
                }
                self.line_number += 1;
                continue;
            }

            if is_newline(prev) {
                if is_fold_whitespace(ch) {
                    // the line is folded
                    in_fold_whitespace = true;
                    continue;
                }

                if !folded_qp_line {
                    // end of the property; stash the first character of
                    // the next line
                    self.left_over = Some(ch);
                    break;
                }

                // quoted-printable continuation without folding whitespace:
                // stitch the line on as-is
            }

            if in_fold_whitespace {
                if is_fold_whitespace(ch) && syntax == SyntaxStyle::Old {
                    // old style syntax allows multi-character folding
                    // whitespace
                    continue;
                }
                in_fold_whitespace = false;
            }

            self.context.unfolded_line.push(ch);

            if in_value {
                self.buffer.push(ch);
                continue;
            }

            // decode an escaped parameter value character
            if let Some(escape_char) = escape.take() {
                match (escape_char, ch) {
                    // semicolons can only be escaped in old style values;
                    // new style surrounds the value in double quotes
                    ('\\', '\\' | ';') => self.buffer.push(ch),
                    ('^', '^') => self.buffer.push('^'),
                    ('^', 'n') => {
                        let newline = self.newline.clone();
                        self.buffer.push_str(&newline);
                    }
                    ('^', '\'') => self.buffer.push('"'),
                    _ => {
                        // not a valid escape sequence; keep both characters
                        self.buffer.push(escape_char);
                        self.buffer.push(ch);
                    }
                }
                continue;
            }

            // detect a parameter value escape character
            if cur_param_name.is_some() {
                match syntax {
                    SyntaxStyle::Old => {
                        if ch == '\\' {
                            escape = Some(ch);
                            continue;
                        }
                    }
                    SyntaxStyle::New => {
                        if ch == '^' && self.caret_decoding_enabled {
                            escape = Some(ch);
                            continue;
                        }
                    }
                }
            }

            // the group is everything before the first "."
            if ch == '.' && group.is_none() && name.is_none() {
                group = Some(self.take_buffer());
                continue;
            }

            if (ch == ';' || ch == ':') && !in_quotes {
                if name.is_none() {
                    name = Some(self.take_buffer());
                } else {
                    // commit a parameter value; old style allows whitespace
                    // around the "="
                    let value = self.take_buffer();
                    let value = if syntax == SyntaxStyle::Old {
                        value.trim_start().to_string()
                    } else {
                        value
                    };
                    parameters.put(cur_param_name.as_deref(), value);
                    cur_param_name = None;
                }

                if ch == ':' {
                    // the rest of the line is the property value
                    in_value = true;
                }
                continue;
            }

            if name.is_some() {
                // an additional value of a multi-valued parameter
                if ch == ',' && cur_param_name.is_some() && !in_quotes && syntax != SyntaxStyle::Old
                {
                    let value = self.take_buffer();
                    parameters.put(cur_param_name.as_deref(), value);
                    continue;
                }

                // the parameter name
                if ch == '=' && cur_param_name.is_none() {
                    let mut param_name = self.take_buffer().to_ascii_uppercase();
                    if syntax == SyntaxStyle::Old {
                        param_name.truncate(param_name.trim_end().len());
                    }
                    cur_param_name = Some(param_name);
                    continue;
                }

                // entering or leaving a double-quoted parameter value
                // (new style only)
                if ch == '"' && cur_param_name.is_some() && syntax != SyntaxStyle::Old {
                    in_quotes = !in_quotes;
                    continue;
                }
            }

            self.buffer.push(ch);
        }

        // the line or stream ended before the property value was reached
        if !in_value {
            return Ok(None);
        }

        let mut property = Property {
            group,
            name: name.unwrap_or_default(),
            parameters,
            value: self.take_buffer(),
        };

        if property.parameters.is_quoted_printable() {
            self.decode_quoted_printable(&mut property, listener);
        }

        Ok(Some(property))
    }

    /// Routes a complete property to the right listener event.
    fn dispatch<L: VObjectListener>(&mut self, property: Property, listener: &mut L) {
        // property names are trimmed when checking for BEGIN and END
        // because old style syntax allows whitespace around the colon of
        // these two properties; component names likewise
        let trimmed_name = property.name.trim();

        if trimmed_name.eq_ignore_ascii_case("BEGIN") {
            let component = property.value.trim().to_ascii_uppercase();
            if component.is_empty() {
                listener.on_warning(Warning::EmptyBegin, &mut self.context);
                return;
            }

            tracing::debug!(component = %component, "component begin");
            listener.on_component_begin(&component, &mut self.context);

            let style = self.current_style();
            self.context.components.push(component);
            self.styles.push(style);
            return;
        }

        if trimmed_name.eq_ignore_ascii_case("END") {
            let component = property.value.trim().to_ascii_uppercase();
            if component.is_empty() {
                listener.on_warning(Warning::EmptyEnd, &mut self.context);
                return;
            }

            // find the component this END matches up with, force-closing
            // anything opened in between
            let pop_count = self.pop_count(&component);
            if pop_count == 0 {
                tracing::warn!(component = %component, "unmatched END");
                listener.on_warning(Warning::UnmatchedEnd, &mut self.context);
                return;
            }

            for _ in 0..pop_count {
                self.styles.pop();
                let popped = self
                    .context
                    .components
                    .pop()
                    .expect("pop count is bounded by the stack depth");
                tracing::debug!(component = %popped, "component end");
                listener.on_component_end(&popped, &mut self.context);
            }
            return;
        }

        if property.name.eq_ignore_ascii_case("VERSION") {
            let parent = self.context.components.last().map(String::as_str);
            if self.rules.has_rules_for(parent) {
                if let Some(style) = self.rules.style_for(parent, &property.value) {
                    listener.on_version(&property.value, &mut self.context);
                    *self.styles.last_mut().expect("styles is never empty") = style;
                    return;
                }
                listener.on_warning(
                    Warning::UnknownVersion {
                        property: &property,
                    },
                    &mut self.context,
                );
            }
        }

        listener.on_property(property, &mut self.context);
    }

    /// Decodes the property's value from quoted-printable encoding,
    /// reporting problems as warnings.
    fn decode_quoted_printable<L: VObjectListener>(
        &mut self,
        property: &mut Property,
        listener: &mut L,
    ) {
        let charset = match property.parameters.charset() {
            Ok(Some(charset)) => charset,
            Ok(None) => self.default_quoted_printable_charset,
            Err(cause) => {
                listener.on_warning(
                    Warning::UnknownCharset {
                        property: &*property,
                        cause,
                    },
                    &mut self.context,
                );
                self.default_quoted_printable_charset
            }
        };

        match codec::decode_quoted_printable(&property.value, charset) {
            Ok(decoded) => property.value = decoded,
            Err(cause) => {
                listener.on_warning(
                    Warning::QuotedPrintableError {
                        property: &*property,
                        cause,
                    },
                    &mut self.context,
                );
            }
        }
    }

    /// Copies the accumulator out and clears it, keeping its capacity for
    /// the next token.
    fn take_buffer(&mut self) -> String {
        let taken = self.buffer.clone();
        self.buffer.clear();
        taken
    }

    fn current_style(&self) -> SyntaxStyle {
        *self.styles.last().expect("styles is never empty")
    }

    /// The number of stack frames that must be popped to close the named
    /// component, or 0 if it is not open.
    fn pop_count(&self, component: &str) -> usize {
        self.context
            .components
            .iter()
            .rposition(|name| name == component)
            .map_or(0, |index| self.context.components.len() - index)
    }

    /// Reads the next Unicode scalar value from the stream, honoring the
    /// single look-ahead slot.
    fn read_char(&mut self) -> io::Result<Option<char>> {
        if let Some(ch) = self.left_over.take() {
            return Ok(Some(ch));
        }

        let mut first = [0u8; 1];
        loop {
            match self.reader.read(&mut first) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }

        let width = match first[0] {
            0x00..=0x7F => return Ok(Some(char::from(first[0]))),
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Err(invalid_utf8()),
        };

        let mut bytes = [0u8; 4];
        bytes[0] = first[0];
        self.reader.read_exact(&mut bytes[1..width])?;

        std::str::from_utf8(&bytes[..width])
            .map_err(|_| invalid_utf8())
            .map(|s| s.chars().next())
    }
}

fn is_newline(ch: char) -> bool {
    ch == '\r' || ch == '\n'
}

fn is_fold_whitespace(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

fn invalid_utf8() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "stream is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect {
        properties: Vec<Property>,
    }

    impl VObjectListener for Collect {
        fn on_property(&mut self, property: Property, _context: &mut Context) {
            self.properties.push(property);
        }
    }

    fn parse_one(data: &str) -> Property {
        let mut reader = VObjectReader::new(data.as_bytes(), SyntaxRules::vcard());
        let mut listener = Collect::default();
        reader.parse(&mut listener).unwrap();
        assert_eq!(listener.properties.len(), 1, "{:?}", listener.properties);
        listener.properties.remove(0)
    }

    #[test]
    fn group_name_params_value() {
        let property = parse_one("iteM1.NOTE;X-SIZE=8:The body\r\n");
        assert_eq!(property.group.as_deref(), Some("iteM1"));
        assert_eq!(property.name, "NOTE");
        assert_eq!(property.parameters.first(Some("X-SIZE")), Some("8"));
        assert_eq!(property.value, "The body");
    }

    #[test]
    fn value_keeps_structural_characters() {
        let property = parse_one("URL:https://example.com:8080/a;b,c\r\n");
        assert_eq!(property.value, "https://example.com:8080/a;b,c");
    }

    #[test]
    fn final_terminator_is_optional() {
        let property = parse_one("NOTE:no newline");
        assert_eq!(property.value, "no newline");
    }

    #[test]
    fn non_ascii_values() {
        let property = parse_one("NOTE:caf\u{e9} \u{1f4f0}\r\n");
        assert_eq!(property.value, "caf\u{e9} \u{1f4f0}");
    }

    #[test]
    fn utf8_decoding_errors_are_io_errors() {
        let mut reader = VObjectReader::new(&b"NOTE:\xFF\r\n"[..], SyntaxRules::vcard());
        let err = reader.parse(&mut Collect::default()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}

//! Line folding for the output stream.

use std::io::{self, Write};

use encoding_rs::Encoding;

use crate::codec;

const CRLF: &str = "\r\n";

/// Automatically folds lines as they are written.
///
/// Lines longer than the configured length (75 columns by default) are
/// split with a CRLF followed by folding whitespace. In quoted-printable
/// mode the fold is a soft break instead: each non-final line ends with `=`
/// and no folding whitespace is prepended, since consumers of old-style
/// quoted-printable data do not expect it.
///
/// Newlines embedded in the input are written through verbatim and reset
/// the column counter.
pub struct FoldedLineWriter<W> {
    writer: W,
    line_length: Option<usize>,
    indent: String,
    cur_line_length: usize,
}

impl<W: Write> FoldedLineWriter<W> {
    /// Creates a folding writer over a sink, with a 75-column fold limit
    /// and a single space as folding whitespace.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            line_length: Some(75),
            indent: " ".to_string(),
            cur_line_length: 0,
        }
    }

    /// The maximum length a line can be before it is folded (excluding the
    /// newline), or `None` when folding is disabled.
    #[must_use]
    pub fn line_length(&self) -> Option<usize> {
        self.line_length
    }

    /// Sets the maximum line length, or disables folding with `None`.
    ///
    /// ## Panics
    /// Panics if the length is zero or not greater than the length of the
    /// indent string.
    pub fn set_line_length(&mut self, line_length: Option<usize>) {
        if let Some(length) = line_length {
            assert!(length > 0, "line length must be greater than 0");
            assert!(
                length > self.indent.chars().count(),
                "line length must be greater than the indent length"
            );
        }
        self.line_length = line_length;
    }

    /// The whitespace prepended to each folded line (a single space by
    /// default).
    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Sets the whitespace prepended to each folded line.
    ///
    /// New-style syntax requires the folding whitespace to be exactly one
    /// character long; old-style syntax allows any combination of spaces
    /// and tabs.
    ///
    /// ## Panics
    /// Panics if the indent is empty, is not shorter than the line length,
    /// or contains characters other than spaces and tabs.
    pub fn set_indent(&mut self, indent: &str) {
        assert!(!indent.is_empty(), "indent cannot be empty");
        if let Some(length) = self.line_length {
            assert!(
                indent.chars().count() < length,
                "indent length must be less than the line length"
            );
        }
        assert!(
            indent.chars().all(|c| c == ' ' || c == '\t'),
            "indent may only contain spaces and tabs"
        );
        self.indent = indent.to_string();
    }

    /// Writes a newline.
    ///
    /// ## Errors
    /// Returns an error if writing to the underlying sink fails.
    pub fn writeln(&mut self) -> io::Result<()> {
        self.append(CRLF)
    }

    /// Writes a string without quoted-printable encoding.
    ///
    /// ## Errors
    /// Returns an error if writing to the underlying sink fails.
    pub fn append(&mut self, string: &str) -> io::Result<()> {
        self.write_folded(string, false)
    }

    /// Writes a string, optionally encoding it as quoted-printable under
    /// the given character set.
    ///
    /// ## Errors
    /// Returns an error if writing to the underlying sink fails.
    pub fn write(
        &mut self,
        string: &str,
        quoted_printable: bool,
        charset: &'static Encoding,
    ) -> io::Result<()> {
        if quoted_printable {
            let encoded = codec::encode_quoted_printable(string, charset);
            self.write_folded(&encoded, true)
        } else {
            self.write_folded(string, false)
        }
    }

    fn write_folded(&mut self, string: &str, quoted_printable: bool) -> io::Result<()> {
        let Some(line_length) = self.line_length else {
            return self.writer.write_all(string.as_bytes());
        };

        // leave room for the "=" appended to every folded quoted-printable
        // line
        let effective_length = if quoted_printable {
            line_length.saturating_sub(1)
        } else {
            line_length
        };

        let chars: Vec<char> = string.chars().collect();
        let end = chars.len();

        // position within a quoted-printable =XX triple, so the triple is
        // never split across a fold
        let mut triple_pos: Option<usize> = None;
        let mut start = 0;
        let mut i = 0;

        while i < end {
            let mut c = chars[i];

            if let Some(pos) = triple_pos {
                triple_pos = if pos + 1 == 3 { None } else { Some(pos + 1) };
            }

            if c == '\n' {
                self.write_chars(&chars[start..=i])?;
                self.cur_line_length = 0;
                start = i + 1;
                i += 1;
                continue;
            }

            if c == '\r' {
                if i == end - 1 || chars[i + 1] != '\n' {
                    self.write_chars(&chars[start..=i])?;
                    self.cur_line_length = 0;
                    start = i + 1;
                } else {
                    self.cur_line_length += 1;
                }
                i += 1;
                continue;
            }

            if c == '=' && quoted_printable {
                triple_pos = Some(0);
            }

            if self.cur_line_length >= effective_length {
                // If the characters at the fold point are whitespace, exceed
                // the line length and break after them. Whitespace at the
                // start of a continuation line would merge with the folding
                // whitespace and could be lost (old style syntax allows the
                // fold whitespace to span multiple characters).
                if c.is_whitespace() {
                    while c.is_whitespace() && i < end - 1 {
                        i += 1;
                        c = chars[i];
                    }
                    if i >= end - 1 {
                        // the rest of the string is whitespace
                        break;
                    }
                }

                // never split a =XX sequence across a fold
                if let Some(pos) = triple_pos {
                    if pos > 0 {
                        i += 3 - pos;
                        if i >= end - 1 {
                            // the encoded sequence finishes the string
                            break;
                        }
                    }
                }

                self.write_chars(&chars[start..i])?;
                if quoted_printable {
                    self.writer.write_all(b"=")?;
                    self.writer.write_all(CRLF.as_bytes())?;
                    self.cur_line_length = 1;
                } else {
                    self.writer.write_all(CRLF.as_bytes())?;
                    self.writer.write_all(self.indent.as_bytes())?;
                    self.cur_line_length = self.indent.chars().count() + 1;
                }
                start = i;
                i += 1;
                continue;
            }

            self.cur_line_length += 1;
            i += 1;
        }

        self.write_chars(&chars[start..end])
    }

    fn write_chars(&mut self, chars: &[char]) -> io::Result<()> {
        let string: String = chars.iter().collect();
        self.writer.write_all(string.as_bytes())
    }

    /// Flushes the underlying sink.
    ///
    /// ## Errors
    /// Returns an error if flushing the underlying sink fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Returns a reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Returns a mutable reference to the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consumes the writer, returning the underlying sink.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

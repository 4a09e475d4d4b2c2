//! The event interface of the reader, and the warnings it reports.

use std::fmt;

use crate::codec::{CharsetError, DecodeError};
use crate::{Context, Property};

/// Receives the events of a [`VObjectReader`](super::VObjectReader) parse.
///
/// All methods have no-op defaults, so implementations only handle the
/// events they care about.
pub trait VObjectListener {
    /// A component has been opened (`BEGIN:NAME`). The name is trimmed and
    /// upper-cased.
    fn on_component_begin(&mut self, name: &str, context: &mut Context) {
        let _ = (name, context);
    }

    /// A component has been closed (`END:NAME`). The name is trimmed and
    /// upper-cased.
    fn on_component_end(&mut self, name: &str, context: &mut Context) {
        let _ = (name, context);
    }

    /// A property has been read. Quoted-printable values arrive decoded
    /// (the ENCODING and CHARSET parameters are left in place so the
    /// original encoding can still be inspected).
    fn on_property(&mut self, property: Property, context: &mut Context) {
        let _ = (property, context);
    }

    /// A VERSION property has changed the syntax style of the current
    /// component. Only fires inside components that have syntax rules; a
    /// VERSION property anywhere else is delivered as an ordinary property.
    fn on_version(&mut self, value: &str, context: &mut Context) {
        let _ = (value, context);
    }

    /// A non-fatal problem was found in the data.
    fn on_warning(&mut self, warning: Warning<'_>, context: &mut Context) {
        let _ = (warning, context);
    }
}

/// A non-fatal problem encountered while parsing.
///
/// Warnings never abort the parse; the reader either discards the
/// offending line or carries on with a best-effort interpretation.
#[derive(Debug)]
pub enum Warning<'a> {
    /// A line without a colon character. The line is skipped.
    MalformedLine,
    /// A BEGIN property without a component name. The property is ignored.
    EmptyBegin,
    /// An END property without a component name. The property is ignored.
    EmptyEnd,
    /// An END property that does not match any open component. The
    /// property is ignored.
    UnmatchedEnd,
    /// A VERSION value that is not defined in the syntax rules of the
    /// current component. The property is delivered as a regular property.
    UnknownVersion {
        /// The VERSION property.
        property: &'a Property,
    },
    /// A CHARSET parameter naming an unusable character set. The value is
    /// decoded with the default quoted-printable character set instead.
    UnknownCharset {
        /// The property whose CHARSET parameter is unusable.
        property: &'a Property,
        /// Why the character set could not be resolved.
        cause: CharsetError,
    },
    /// A quoted-printable value that could not be decoded. The raw,
    /// undecoded value is retained.
    QuotedPrintableError {
        /// The property whose value could not be decoded.
        property: &'a Property,
        /// The decoder failure.
        cause: DecodeError,
    },
}

impl Warning<'_> {
    /// The kind of this warning, without its payload.
    #[must_use]
    pub fn kind(&self) -> WarningKind {
        match self {
            Warning::MalformedLine => WarningKind::MalformedLine,
            Warning::EmptyBegin => WarningKind::EmptyBegin,
            Warning::EmptyEnd => WarningKind::EmptyEnd,
            Warning::UnmatchedEnd => WarningKind::UnmatchedEnd,
            Warning::UnknownVersion { .. } => WarningKind::UnknownVersion,
            Warning::UnknownCharset { .. } => WarningKind::UnknownCharset,
            Warning::QuotedPrintableError { .. } => WarningKind::QuotedPrintableError,
        }
    }

    /// The property the warning is about, if any.
    #[must_use]
    pub fn property(&self) -> Option<&Property> {
        match self {
            Warning::MalformedLine
            | Warning::EmptyBegin
            | Warning::EmptyEnd
            | Warning::UnmatchedEnd => None,
            Warning::UnknownVersion { property }
            | Warning::UnknownCharset { property, .. }
            | Warning::QuotedPrintableError { property, .. } => Some(property),
        }
    }
}

impl fmt::Display for Warning<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MalformedLine => {
                write!(f, "skipping malformed line (no colon character found)")
            }
            Warning::EmptyBegin => {
                write!(f, "ignoring BEGIN property that does not have a component name")
            }
            Warning::EmptyEnd => {
                write!(f, "ignoring END property that does not have a component name")
            }
            Warning::UnmatchedEnd => write!(
                f,
                "ignoring END property that does not match up with any BEGIN properties"
            ),
            Warning::UnknownVersion { .. } => {
                write!(f, "unknown version number; treating it as a regular property")
            }
            Warning::UnknownCharset { cause, .. } => write!(
                f,
                "the property's character encoding is not supported ({cause}); the value will be decoded with the default quoted-printable character encoding"
            ),
            Warning::QuotedPrintableError { cause, .. } => write!(
                f,
                "unable to decode the property's quoted-printable value ({cause}); value will be treated as plain text"
            ),
        }
    }
}

/// The kind of a [`Warning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// See [`Warning::MalformedLine`].
    MalformedLine,
    /// See [`Warning::EmptyBegin`].
    EmptyBegin,
    /// See [`Warning::EmptyEnd`].
    EmptyEnd,
    /// See [`Warning::UnmatchedEnd`].
    UnmatchedEnd,
    /// See [`Warning::UnknownVersion`].
    UnknownVersion,
    /// See [`Warning::UnknownCharset`].
    UnknownCharset,
    /// See [`Warning::QuotedPrintableError`].
    QuotedPrintableError,
}

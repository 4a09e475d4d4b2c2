//! Streaming reader and writer for "vobject" data: the line-oriented text
//! format family shared by vCard (RFC 2426, RFC 6350) and iCalendar
//! (RFC 5545), including their old-style ancestors vCard 2.1 and vCal 1.0.
//!
//! ## Overview
//!
//! A vobject stream is a sequence of CRLF-terminated lines of the form
//! `[group.]name[;param]*:value`, where `BEGIN:NAME` and `END:NAME` lines
//! open and close nested components. Two syntax dialects share this
//! framing but differ in escaping, folding, and parameter syntax:
//! [`SyntaxStyle::Old`] (vCard 2.1, vCal 1.0) and [`SyntaxStyle::New`]
//! (vCard 3.0+, iCalendar 2.0).
//!
//! This crate tokenizes a stream into events — components, properties,
//! version markers, warnings — and serializes properties back out, taking
//! care of line folding, quoted-printable values, and the various escape
//! layers. It does not interpret property semantics: values are delivered
//! as text, with [`values`] offering parsers for the common composite
//! value shapes.
//!
//! ## Reading
//!
//! ```rust
//! use vobject_stream::parse::{SyntaxRules, VObjectListener, VObjectReader};
//! use vobject_stream::{Context, Property};
//!
//! #[derive(Default)]
//! struct Names(Vec<String>);
//!
//! impl VObjectListener for Names {
//!     fn on_property(&mut self, property: Property, _context: &mut Context) {
//!         self.0.push(property.name);
//!     }
//! }
//!
//! let data = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:John Doe\r\nEND:VCARD\r\n";
//! let mut reader = VObjectReader::new(data.as_bytes(), SyntaxRules::vcard());
//! let mut names = Names::default();
//! reader.parse(&mut names).unwrap();
//! assert_eq!(names.0, vec!["FN"]);
//! ```
//!
//! ## Writing
//!
//! ```rust
//! use vobject_stream::build::VObjectWriter;
//! use vobject_stream::SyntaxStyle;
//!
//! let mut writer = VObjectWriter::new(Vec::new(), SyntaxStyle::Old);
//! writer.write_begin_component("VCARD").unwrap();
//! writer.write_version("2.1").unwrap();
//! writer.write_simple_property("NOTE", "one\r\ntwo").unwrap();
//! writer.write_end_component("VCARD").unwrap();
//!
//! let data = String::from_utf8(writer.into_inner()).unwrap();
//! assert_eq!(data, "\
//! BEGIN:VCARD\r\n\
//! VERSION:2.1\r\n\
//! NOTE;ENCODING=QUOTED-PRINTABLE;CHARSET=UTF-8:one=0D=0Atwo\r\n\
//! END:VCARD\r\n");
//! ```
//!
//! ## Submodules
//!
//! - [`parse`] — the reader, its event listener, and syntax rules
//! - [`build`] — the property writer and the folding line writer
//! - [`values`] — list / semi-structured / structured / multimap value
//!   codecs
//! - [`validate`] — per-position character validation tables
//! - [`codec`] — the quoted-printable and charset bridge

pub mod build;
pub mod codec;
mod core;
mod error;
pub mod parse;
pub mod validate;
pub mod values;

pub use crate::core::{Parameters, Property, SyntaxStyle};
pub use build::{FoldedLineWriter, VObjectWriter};
pub use error::WriteError;
pub use parse::{Context, SyntaxRules, VObjectListener, VObjectReader, Warning, WarningKind};

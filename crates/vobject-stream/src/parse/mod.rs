//! Streaming parser: the reader, its event interface, and syntax rules.

mod context;
mod listener;
mod reader;
mod rules;

pub use context::Context;
pub use listener::{VObjectListener, Warning, WarningKind};
pub use reader::VObjectReader;
pub use rules::SyntaxRules;

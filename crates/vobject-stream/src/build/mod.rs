//! Serialization: the property writer and the folding line writer.

mod fold;
mod writer;

pub use fold::FoldedLineWriter;
pub use writer::VObjectWriter;

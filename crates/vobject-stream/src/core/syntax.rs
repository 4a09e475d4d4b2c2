//! Syntax styles of the vobject family.

/// The two syntax dialects used by vobject data.
///
/// The dialects share the same overall line framing but differ in escaping,
/// folding, parameter syntax, and newline handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxStyle {
    /// Old-style syntax: vCard 2.1 and vCal 1.0.
    Old,
    /// New-style syntax: vCard 3.0/4.0 and iCalendar 2.0.
    New,
}

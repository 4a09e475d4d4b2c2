//! Write-side error types.

use std::io;

use thiserror::Error;

/// An error writing a property to a vobject data stream.
///
/// Validation variants mean the property contains characters that cannot be
/// encoded or escaped and would break the syntax if written; nothing is
/// written in that case. [`Io`](WriteError::Io) is a transport failure from
/// the underlying sink, propagated untouched.
#[derive(Debug, Error)]
pub enum WriteError {
    /// A group name with characters that would break the syntax.
    #[error("property {name:?} has its group set to {group:?}, which contains one or more invalid characters; the following characters are not permitted: {not_permitted}")]
    InvalidGroup {
        /// The property name.
        name: String,
        /// The offending group.
        group: String,
        /// The rendered set of forbidden characters.
        not_permitted: String,
    },

    /// A group name starting with whitespace, which would be mistaken for
    /// folding whitespace.
    #[error("property {name:?} has its group set to {group:?}, which begins with whitespace")]
    GroupBeginsWithWhitespace {
        /// The property name.
        name: String,
        /// The offending group.
        group: String,
    },

    /// A property with an empty name.
    #[error("property name cannot be empty")]
    EmptyPropertyName,

    /// A property name with characters that would break the syntax.
    #[error("property name {name:?} contains one or more invalid characters; the following characters are not permitted: {not_permitted}")]
    InvalidPropertyName {
        /// The offending property name.
        name: String,
        /// The rendered set of forbidden characters.
        not_permitted: String,
    },

    /// A property name starting with whitespace.
    #[error("property name {name:?} begins with whitespace")]
    PropertyNameBeginsWithWhitespace {
        /// The offending property name.
        name: String,
    },

    /// A nameless parameter in new-style syntax (only old-style syntax has
    /// the legacy value-only parameter form).
    #[error("property {name:?} has a nameless parameter, which is not permitted with new style syntax")]
    NamelessParameter {
        /// The property name.
        name: String,
    },

    /// A parameter name with characters that would break the syntax.
    #[error("property {name:?} has a parameter named {parameter:?}, which contains one or more invalid characters; the following characters are not permitted: {not_permitted}")]
    InvalidParameterName {
        /// The property name.
        name: String,
        /// The offending parameter name.
        parameter: String,
        /// The rendered set of forbidden characters.
        not_permitted: String,
    },

    /// A parameter value with characters that cannot be represented under
    /// the current dialect and caret-encoding setting.
    #[error("property {name:?} has a parameter whose value contains one or more invalid characters; the following characters are not permitted: {not_permitted}")]
    InvalidParameterValue {
        /// The property name.
        name: String,
        /// The parameter name, if the parameter has one.
        parameter: Option<String>,
        /// The rendered set of forbidden characters.
        not_permitted: String,
    },

    /// An empty component name passed to a BEGIN or END convenience method.
    #[error("component name cannot be empty")]
    EmptyComponentName,

    /// An empty version string passed to the VERSION convenience method.
    #[error("version string cannot be empty")]
    EmptyVersion,

    /// A transport failure from the underlying sink.
    #[error(transparent)]
    Io(#[from] io::Error),
}

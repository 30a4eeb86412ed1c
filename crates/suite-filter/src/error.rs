//! Error types for the suite-filter crate.

use thiserror::Error;

/// Errors that can occur when building, compiling or parsing filters.
///
/// `InvalidArgument` and `InvalidState` are API-misuse errors raised while
/// a chain is built or compiled. The remaining variants come from reading
/// the XML wire format back in.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A builder call received an unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The chain is not in a state that allows the operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The filter XML is not well formed.
    #[error("malformed filter xml: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A `re="1"` element carries an invalid regular expression.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// The filter XML is well formed but does not describe a filter.
    #[error("malformed filter: {0}")]
    Malformed(String),

    /// The filter XML uses a tag outside the filter vocabulary.
    #[error("unsupported filter element <{0}>")]
    UnknownElement(String),
}

impl FilterError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        FilterError::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        FilterError::InvalidState(msg.into())
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        FilterError::Malformed(msg.into())
    }
}

/// Result type for suite-filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;

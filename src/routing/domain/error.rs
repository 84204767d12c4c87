//! Error types for routing domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing routing domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoutingDomainError {
    /// The category is empty after trimming.
    #[error("category must not be empty")]
    EmptyCategory,

    /// The category contains whitespace or a reserved delimiter.
    #[error("category '{0}' contains whitespace or one of the reserved characters / ? # , *")]
    InvalidCategory(String),

    /// A category list contained no usable entries.
    #[error("category list must name at least one category")]
    EmptyCategoryList,

    /// The link does not start with `<scheme>://`.
    #[error("'{link}' is not a {scheme}:// link")]
    MalformedLink {
        /// Scheme the link was expected to use.
        scheme: String,
        /// Link as received.
        link: String,
    },
}

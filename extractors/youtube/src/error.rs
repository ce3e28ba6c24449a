//! Error taxonomy for channel extraction.
//!
//! The variants separate failures that callers are expected to treat differently:
//! a [`ExtractError::Transport`] failure may be worth retrying at a higher level, while
//! [`ExtractError::SchemaMismatch`] and [`ExtractError::FieldExtraction`] usually mean the
//! upstream JSON changed shape and retrying will not help.

use std::error::Error as StdError;

/// Boxed cause carried by [`ExtractError`] variants that wrap a lower-level failure.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Everything that can go wrong while extracting a channel or one of its pages.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The request could not be completed, or completed with a non-success status.
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The response arrived but is not something we can walk: too short, not JSON, or the
    /// envelope around the payload has the wrong shape.
    #[error("invalid response from {url}: {reason}")]
    InvalidResponse {
        url: String,
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A single metadata field could not be located or parsed.
    #[error("could not get {field}")]
    FieldExtraction {
        field: &'static str,
        #[source]
        cause: BoxError,
    },

    /// A structural element that every channel document carries is missing.
    #[error("could not find {0}")]
    SchemaMismatch(String),

    /// The caller passed an argument that can never succeed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A document accessor was called before the channel document was fetched.
    #[error("channel document has not been fetched yet")]
    NotFetched,
}

impl ExtractError {
    pub(crate) fn transport(url: &str, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            url: url.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn invalid_response(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            url: url.to_string(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Wraps any failure as the cause of a [`ExtractError::FieldExtraction`] for `field`.
    ///
    /// Wrapping an error that is already a field failure for the same field keeps it as is,
    /// so nested lookups don't produce "could not get name: could not get name".
    pub(crate) fn field(field: &'static str, cause: impl Into<BoxError>) -> Self {
        let cause = cause.into();
        match cause.downcast::<ExtractError>() {
            Ok(inner) => match *inner {
                ExtractError::FieldExtraction { field: f, cause } if f == field => {
                    ExtractError::FieldExtraction { field, cause }
                }
                other => ExtractError::FieldExtraction {
                    field,
                    cause: Box::new(other),
                },
            },
            Err(cause) => ExtractError::FieldExtraction { field, cause },
        }
    }

    /// The name of the field that failed, if this is a field extraction failure.
    pub fn field_name(&self) -> Option<&'static str> {
        match self {
            ExtractError::FieldExtraction { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Extension for attaching a field name to any fallible lookup.
pub(crate) trait FieldContext<T> {
    fn field(self, field: &'static str) -> Result<T, ExtractError>;
}

impl<T, E> FieldContext<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn field(self, field: &'static str) -> Result<T, ExtractError> {
        self.map_err(|e| ExtractError::field(field, e))
    }
}

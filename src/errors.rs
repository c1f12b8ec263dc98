//! # Error handling
//!
//! A single error type is shared by the domain builder, the filter engine and
//! the diagram pipeline so that renderer callbacks can propagate failures with
//! `?` all the way to the caller of [`crate::diagram::DiagramVariant::create`].

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Entity filtering left nothing to draw.
    #[error("no entities found; verify your model definitions first")]
    EmptyResult,

    /// An option value could not be understood.
    #[error("invalid diagram configuration: {reason}")]
    Configuration { reason: String },

    /// A filtered edge points to an entity that was filtered out.
    #[error("{edge} references entity `{entity}` which is not part of the diagram")]
    ReferentialInconsistency { edge: String, entity: String },

    /// The domain handed to the builder breaks one of its invariants.
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    JSON(#[from] serde_json::Error),

    /// Reading a configuration file failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Any(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn wrap(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Any(Box::new(err))
    }

    #[must_use]
    pub fn string(s: &str) -> Self {
        Self::Message(s.to_string())
    }

    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

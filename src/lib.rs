//! Entity-relationship diagrams for loco domain models.
//!
//! The crate takes a read-only [`domain::Domain`] together with a set of
//! [`config::Options`], reduces the graph to the entities, specializations and
//! relationships that belong in the picture, and drives a renderer over the
//! result through a [`diagram::DiagramVariant`].
//!
//! ```text
//! ModelRepository -> DomainBuilder -> Domain
//!                                       |
//!             PartialOptions -> Options |
//!                                  \    v
//!                               filter engine -> Views -> renderer callbacks -> artifact
//! ```

pub use self::errors::Error;

pub mod config;
pub mod diagram;
pub mod domain;
mod errors;
#[cfg(feature = "logger")]
pub mod logger;

/// Application results options list
pub type Result<T, E = Error> = std::result::Result<T, E>;

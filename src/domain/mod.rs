//! Read-only domain graph the diagrams are drawn from.
//!
//! The graph is produced outside this crate by whatever understands the ORM
//! layer. Producers implement the repository traits and hand them to
//! [`DomainBuilder`], which checks the few invariants the filters rely on and
//! derives the entity flags. Once built, a [`Domain`] is never mutated.

pub mod entities;
pub mod repositories;

pub use entities::{
    Attribute, Cardinality, Domain, Entity, Relationship, Specialization, SpecializationKind,
};
pub use repositories::{
    DomainBuilder, EntityDescriptor, EntityRepository, RelationshipRepository,
    SpecializationRepository,
};

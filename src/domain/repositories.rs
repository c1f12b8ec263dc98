use std::collections::BTreeSet;

use tracing::debug;

use super::entities::{Attribute, Domain, Entity, Relationship, Specialization};
use crate::{Error, Result};

/// Model description extracted from the ORM layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub name: String,
    pub attributes: Vec<Attribute>,
    /// Set when the producer already knows the model is a subclass or a polymorphic member.
    pub specialized: bool,
    /// Set when the producer already knows the model is abstract.
    pub generalized: bool,
}

impl EntityDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            name: name.into(),
            attributes,
            specialized: false,
            generalized: false,
        }
    }

    /// Declares the model abstract, e.g. the interface side of a polymorphic association.
    #[must_use]
    pub fn abstract_model(mut self) -> Self {
        self.generalized = true;
        self
    }
}

/// Repository abstraction for retrieving models.
pub trait EntityRepository {
    fn entities(&self) -> Vec<EntityDescriptor>;
}

/// Repository abstraction for retrieving associations between models.
pub trait RelationshipRepository {
    fn relationships(&self) -> Vec<Relationship>;
}

/// Repository abstraction for retrieving inheritance and polymorphic hierarchies.
pub trait SpecializationRepository {
    fn specializations(&self) -> Vec<Specialization>;
}

/// Builds a [`Domain`] from the different repositories.
pub struct DomainBuilder<'a, E, R, S>
where
    E: EntityRepository + ?Sized,
    R: RelationshipRepository + ?Sized,
    S: SpecializationRepository + ?Sized,
{
    entities: &'a E,
    relationships: &'a R,
    specializations: &'a S,
}

impl<'a, E, R, S> DomainBuilder<'a, E, R, S>
where
    E: EntityRepository + ?Sized,
    R: RelationshipRepository + ?Sized,
    S: SpecializationRepository + ?Sized,
{
    /// Creates a new builder referencing the repositories needed to materialise the domain.
    pub fn new(entities: &'a E, relationships: &'a R, specializations: &'a S) -> Self {
        Self {
            entities,
            relationships,
            specializations,
        }
    }

    /// Materialises the domain by querying every repository.
    ///
    /// Entity flags are derived from the edges: an entity is specialized when it
    /// is the specific side of any specialization, generalized when it is the
    /// general side of one, and disconnected when no relationship touches it.
    /// Flags declared on the descriptors are kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDomain`] on duplicate entity names, on edges
    /// pointing to unknown entities, and on specializations of an entity into itself.
    pub fn build(&self) -> Result<Domain> {
        let descriptors = self.entities.entities();
        let relationships = self.relationships.relationships();
        let specializations = self.specializations.specializations();

        let mut known: BTreeSet<&str> = BTreeSet::new();
        for descriptor in &descriptors {
            if !known.insert(descriptor.name.as_str()) {
                return Err(Error::InvalidDomain(format!(
                    "entity `{}` is defined more than once",
                    descriptor.name
                )));
            }
        }

        let mut connected: BTreeSet<&str> = BTreeSet::new();
        for relationship in &relationships {
            for endpoint in [relationship.source(), relationship.destination()] {
                if !known.contains(endpoint) {
                    return Err(unknown_endpoint(&relationship.to_string(), endpoint));
                }
                connected.insert(endpoint);
            }
        }

        let mut specialized: BTreeSet<&str> = BTreeSet::new();
        let mut generalized: BTreeSet<&str> = BTreeSet::new();
        for specialization in &specializations {
            for endpoint in [specialization.generalized(), specialization.specialized()] {
                if !known.contains(endpoint) {
                    return Err(unknown_endpoint(&specialization.to_string(), endpoint));
                }
            }
            if specialization.generalized() == specialization.specialized() {
                return Err(Error::InvalidDomain(format!(
                    "{specialization} specializes an entity into itself"
                )));
            }
            specialized.insert(specialization.specialized());
            generalized.insert(specialization.generalized());
        }

        let entities: Vec<Entity> = descriptors
            .iter()
            .map(|descriptor| {
                let name = descriptor.name.as_str();
                Entity::new(
                    descriptor.name.clone(),
                    descriptor.attributes.clone(),
                    descriptor.specialized || specialized.contains(name),
                    descriptor.generalized || generalized.contains(name),
                    !connected.contains(name),
                )
            })
            .collect();

        debug!(
            entities = entities.len(),
            relationships = relationships.len(),
            specializations = specializations.len(),
            "domain_built"
        );

        Ok(Domain::new(entities, relationships, specializations))
    }
}

fn unknown_endpoint(edge: &str, entity: &str) -> Error {
    Error::InvalidDomain(format!("{edge} references unknown entity `{entity}`"))
}

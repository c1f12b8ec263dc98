use std::{collections::BTreeSet, fmt};

use serde::Serialize;
use tracing::debug;

use super::filter::{
    filter_attributes, filter_entities, filter_relationships, filter_specializations,
};
use crate::{
    config::Options,
    domain::{Attribute, Domain, Entity, Relationship, Specialization},
    Error, Result,
};

/// An entity of the diagram together with the attributes drawn for it.
#[derive(Debug, Clone)]
pub struct EntityView<'d> {
    pub entity: &'d Entity,
    pub attributes: Vec<&'d Attribute>,
}

/// The reduced graph handed to a renderer.
///
/// Built by running every filter and then dropping the edges whose endpoints
/// did not survive entity filtering, so that no edge points outside the view.
#[derive(Debug, Clone)]
pub struct Views<'d> {
    entities: Vec<EntityView<'d>>,
    specializations: Vec<&'d Specialization>,
    relationships: Vec<&'d Relationship>,
}

impl<'d> Views<'d> {
    /// Filters `domain` with `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyResult`] when no entity survives filtering.
    pub fn build(domain: &'d Domain, options: &Options) -> Result<Self> {
        let entities = filter_entities(domain, options)?;
        let included: BTreeSet<&str> = entities.iter().map(|entity| entity.name()).collect();

        let specializations = filter_specializations(domain, options)
            .into_iter()
            .filter(|specialization| {
                let kept = included.contains(specialization.generalized())
                    && included.contains(specialization.specialized());
                if !kept {
                    debug!(edge = %specialization, "dangling_specialization_dropped");
                }
                kept
            })
            .collect();

        let relationships = filter_relationships(domain, options)
            .into_iter()
            .filter(|relationship| {
                let kept = included.contains(relationship.source())
                    && included.contains(relationship.destination());
                if !kept {
                    debug!(edge = %relationship, "dangling_relationship_dropped");
                }
                kept
            })
            .collect();

        let entities = entities
            .into_iter()
            .map(|entity| EntityView {
                entity,
                attributes: filter_attributes(entity, options),
            })
            .collect();

        Ok(Self {
            entities,
            specializations,
            relationships,
        })
    }

    #[must_use]
    pub fn entities(&self) -> &[EntityView<'d>] {
        &self.entities
    }

    #[must_use]
    pub fn specializations(&self) -> &[&'d Specialization] {
        &self.specializations
    }

    #[must_use]
    pub fn relationships(&self) -> &[&'d Relationship] {
        &self.relationships
    }

    /// Verifies that every edge only references entities of the view.
    ///
    /// # Errors
    ///
    /// See [`ensure_closed`].
    pub fn ensure_closed(&self) -> Result<()> {
        let entities: Vec<&Entity> = self.entities.iter().map(|view| view.entity).collect();
        ensure_closed(&entities, &self.relationships, &self.specializations)
    }

    /// Serializable summary of the view, mostly useful for debugging and tests.
    #[must_use]
    pub fn snapshot(&self) -> ViewsSnapshot {
        ViewsSnapshot {
            entities: self
                .entities
                .iter()
                .map(|view| EntitySnapshot {
                    name: view.entity.name().to_string(),
                    attributes: view
                        .attributes
                        .iter()
                        .map(|attribute| attribute.name().to_string())
                        .collect(),
                })
                .collect(),
            specializations: self.specializations.iter().map(|&s| s.clone()).collect(),
            relationships: self.relationships.iter().map(|&r| r.clone()).collect(),
        }
    }
}

/// Checks referential closure of a set of filtered views.
///
/// # Errors
///
/// Returns [`Error::ReferentialInconsistency`] for the first relationship or
/// specialization with an endpoint missing from `entities`.
pub fn ensure_closed(
    entities: &[&Entity],
    relationships: &[&Relationship],
    specializations: &[&Specialization],
) -> Result<()> {
    let included: BTreeSet<&str> = entities.iter().map(|entity| entity.name()).collect();

    for specialization in specializations {
        check_endpoints(
            &included,
            specialization,
            [specialization.generalized(), specialization.specialized()],
        )?;
    }
    for relationship in relationships {
        check_endpoints(
            &included,
            relationship,
            [relationship.source(), relationship.destination()],
        )?;
    }
    Ok(())
}

fn check_endpoints(
    included: &BTreeSet<&str>,
    edge: &dyn fmt::Display,
    endpoints: [&str; 2],
) -> Result<()> {
    match endpoints
        .into_iter()
        .find(|name| !included.contains(*name))
    {
        Some(entity) => Err(Error::ReferentialInconsistency {
            edge: edge.to_string(),
            entity: entity.to_string(),
        }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySnapshot {
    pub name: String,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewsSnapshot {
    pub entities: Vec<EntitySnapshot>,
    pub specializations: Vec<Specialization>,
    pub relationships: Vec<Relationship>,
}

impl ViewsSnapshot {
    /// Pretty printed JSON.
    ///
    /// # Errors
    ///
    /// Propagates serialization failures.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

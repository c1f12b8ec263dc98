//! Filter engine.
//!
//! Pure functions deciding which parts of a [`Domain`] end up in a diagram.
//! Every function preserves domain order and never mutates the domain, so
//! calling them repeatedly with the same inputs yields the same output.
//!
//! The `inheritance`, `polymorphism` and `disconnected` options do not gate
//! entities: with neither `only` nor `exclude` set every entity is kept.
//! Edges are gated by their own options and are closed over the entity view
//! afterwards by [`super::views::Views`].
use std::collections::BTreeSet;

use tracing::warn;

use crate::{
    config::Options,
    domain::{Attribute, Domain, Entity, Relationship, Specialization},
    Error, Result,
};

/// Entities that belong in the diagram, in domain order.
///
/// 1. with a non-empty `only`, keep entities related to the focus set
///    (see [`entity_is_related`]);
/// 2. with a non-empty `exclude`, drop the named entities;
/// 3. otherwise keep everything.
///
/// # Errors
///
/// Returns [`Error::EmptyResult`] when nothing is left.
pub fn filter_entities<'d>(domain: &'d Domain, options: &Options) -> Result<Vec<&'d Entity>> {
    let mut entities: Vec<&Entity> = domain.entities().iter().collect();

    if let Some(focus) = options.only_names() {
        if options.warn {
            warn_unmatched_names(domain, "only", focus);
        }
        entities.retain(|entity| entity_is_related(domain, entity, focus));
    }

    if let Some(excluded) = options.excluded_names() {
        if options.warn {
            warn_unmatched_names(domain, "exclude", excluded);
        }
        entities.retain(|entity| !excluded.contains(entity.name()));
    }

    if entities.is_empty() {
        return Err(Error::EmptyResult);
    }
    Ok(entities)
}

/// Relationships in domain order, without the indirect ones unless `indirect` is set.
#[must_use]
pub fn filter_relationships<'d>(domain: &'d Domain, options: &Options) -> Vec<&'d Relationship> {
    domain
        .relationships()
        .iter()
        .filter(|relationship| options.indirect || relationship.is_direct())
        .collect()
}

/// Specializations in domain order, gated by `inheritance` and `polymorphism`.
#[must_use]
pub fn filter_specializations<'d>(
    domain: &'d Domain,
    options: &Options,
) -> Vec<&'d Specialization> {
    domain
        .specializations()
        .iter()
        .filter(|specialization| {
            (options.inheritance || !specialization.is_inheritance())
                && (options.polymorphism || !specialization.is_polymorphic())
        })
        .collect()
}

/// Attributes of `entity` matching at least one selected category.
///
/// Specialized entities show no attributes of their own; they are drawn on
/// the general side of the hierarchy.
#[must_use]
pub fn filter_attributes<'e>(entity: &'e Entity, options: &Options) -> Vec<&'e Attribute> {
    if entity.is_specialized() {
        return Vec::new();
    }
    let Some(categories) = options.attribute_categories() else {
        return Vec::new();
    };

    entity
        .attributes()
        .iter()
        .filter(|attribute| {
            categories
                .iter()
                .any(|category| category.matches(attribute))
        })
        .collect()
}

/// One hop relatedness: the entity is in `focus`, or one of its relationships
/// or specializations has an endpoint in `focus`.
#[must_use]
pub fn entity_is_related(domain: &Domain, entity: &Entity, focus: &BTreeSet<String>) -> bool {
    if focus.contains(entity.name()) {
        return true;
    }

    let related_by_relationship = domain
        .relationships_by_entity_name(entity.name())
        .iter()
        .any(|relationship| {
            focus.contains(relationship.source()) || focus.contains(relationship.destination())
        });
    if related_by_relationship {
        return true;
    }

    domain
        .specializations_by_entity_name(entity.name())
        .iter()
        .any(|specialization| {
            focus.contains(specialization.generalized())
                || focus.contains(specialization.specialized())
        })
}

fn warn_unmatched_names(domain: &Domain, option: &str, names: &BTreeSet<String>) {
    for name in names {
        if domain.entity_by_name(name).is_none() {
            warn!(option, name = %name, "entity_filter_name_unmatched");
        }
    }
}

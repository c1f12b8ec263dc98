use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// Column names recognised as bookkeeping timestamps.
const TIMESTAMP_NAMES: [&str; 4] = ["created_at", "created_on", "updated_at", "updated_on"];
/// Column types a timestamp column may have.
const TIMESTAMP_TYPES: [&str; 4] = ["datetime", "timestamp", "time", "date"];

/// A column of an [`Entity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    data_type: String,
    #[serde(default)]
    primary_key: bool,
    #[serde(default)]
    foreign_key: bool,
    #[serde(default)]
    inheritance: bool,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            primary_key: false,
            foreign_key: false,
            inheritance: false,
        }
    }

    /// Marks the attribute as (part of) the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the attribute as a foreign key of some association.
    #[must_use]
    pub fn foreign_key(mut self) -> Self {
        self.foreign_key = true;
        self
    }

    /// Marks the attribute as the discriminator column of an inheritance hierarchy.
    #[must_use]
    pub fn inheritance(mut self) -> Self {
        self.inheritance = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    #[must_use]
    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key
    }

    #[must_use]
    pub fn is_inheritance(&self) -> bool {
        self.inheritance
    }

    /// `created_at`, `updated_on` and friends, provided they hold a date or time.
    #[must_use]
    pub fn is_timestamp(&self) -> bool {
        TIMESTAMP_NAMES.contains(&self.name.as_str())
            && TIMESTAMP_TYPES.contains(&self.data_type.as_str())
    }

    /// Anything that is not a key, a discriminator or a timestamp.
    #[must_use]
    pub fn is_content(&self) -> bool {
        !self.primary_key && !self.foreign_key && !self.inheritance && !self.is_timestamp()
    }
}

/// A table of the domain model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    name: String,
    attributes: Vec<Attribute>,
    specialized: bool,
    generalized: bool,
    disconnected: bool,
}

impl Entity {
    pub(crate) fn new(
        name: String,
        attributes: Vec<Attribute>,
        specialized: bool,
        generalized: bool,
        disconnected: bool,
    ) -> Self {
        Self {
            name,
            attributes,
            specialized,
            generalized,
            disconnected,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// The specific side of an inheritance hierarchy.
    #[must_use]
    pub fn is_specialized(&self) -> bool {
        self.specialized
    }

    /// The general side of a polymorphic association or an abstract base.
    #[must_use]
    pub fn is_generalized(&self) -> bool {
        self.generalized
    }

    /// Takes part in no relationship.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl Cardinality {
    #[must_use]
    pub fn is_to_many(self) -> bool {
        !matches!(self, Self::OneToOne)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OneToOne => "1-1",
            Self::OneToMany => "1-n",
            Self::ManyToMany => "n-m",
        })
    }
}

/// Association between two entities, referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    source: String,
    destination: String,
    cardinality: Cardinality,
    #[serde(default)]
    indirect: bool,
}

impl Relationship {
    /// Creates a direct relationship.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            cardinality,
            indirect: false,
        }
    }

    /// Marks the relationship as going through an intermediate entity.
    #[must_use]
    pub fn through(mut self) -> Self {
        self.indirect = true;
        self
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    #[must_use]
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    #[must_use]
    pub fn is_indirect(&self) -> bool {
        self.indirect
    }

    #[must_use]
    pub fn is_direct(&self) -> bool {
        !self.indirect
    }

    /// Both ends are the same entity.
    #[must_use]
    pub fn is_recursive(&self) -> bool {
        self.source == self.destination
    }

    /// Whether `name` is one of the two endpoints.
    #[must_use]
    pub fn touches(&self, name: &str) -> bool {
        self.source == name || self.destination == name
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "relationship `{}` -> `{}`",
            self.source, self.destination
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecializationKind {
    /// Single table inheritance.
    Inheritance,
    /// Polymorphic association.
    Polymorphic,
}

/// Edge from a general entity to one of its specific forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialization {
    generalized: String,
    specialized: String,
    kind: SpecializationKind,
}

impl Specialization {
    #[must_use]
    pub fn inheritance(generalized: impl Into<String>, specialized: impl Into<String>) -> Self {
        Self {
            generalized: generalized.into(),
            specialized: specialized.into(),
            kind: SpecializationKind::Inheritance,
        }
    }

    #[must_use]
    pub fn polymorphic(generalized: impl Into<String>, specialized: impl Into<String>) -> Self {
        Self {
            generalized: generalized.into(),
            specialized: specialized.into(),
            kind: SpecializationKind::Polymorphic,
        }
    }

    #[must_use]
    pub fn generalized(&self) -> &str {
        &self.generalized
    }

    #[must_use]
    pub fn specialized(&self) -> &str {
        &self.specialized
    }

    #[must_use]
    pub fn kind(&self) -> SpecializationKind {
        self.kind
    }

    #[must_use]
    pub fn is_inheritance(&self) -> bool {
        self.kind == SpecializationKind::Inheritance
    }

    #[must_use]
    pub fn is_polymorphic(&self) -> bool {
        self.kind == SpecializationKind::Polymorphic
    }

    /// Whether `name` is one of the two endpoints.
    #[must_use]
    pub fn touches(&self, name: &str) -> bool {
        self.generalized == name || self.specialized == name
    }
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            SpecializationKind::Inheritance => "inheritance",
            SpecializationKind::Polymorphic => "polymorphic",
        };
        write!(
            f,
            "{kind} specialization `{}` -> `{}`",
            self.generalized, self.specialized
        )
    }
}

/// Root aggregate holding the complete, immutable domain graph.
///
/// Incident edges are resolved through name indexes built once by
/// [`super::DomainBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Domain {
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,
    specializations: Vec<Specialization>,
    entity_index: BTreeMap<String, usize>,
    relationship_index: BTreeMap<String, Vec<usize>>,
    specialization_index: BTreeMap<String, Vec<usize>>,
}

impl Domain {
    pub(crate) fn new(
        entities: Vec<Entity>,
        relationships: Vec<Relationship>,
        specializations: Vec<Specialization>,
    ) -> Self {
        let entity_index = entities
            .iter()
            .enumerate()
            .map(|(position, entity)| (entity.name.clone(), position))
            .collect();

        let mut relationship_index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (position, relationship) in relationships.iter().enumerate() {
            relationship_index
                .entry(relationship.source.clone())
                .or_default()
                .push(position);
            if !relationship.is_recursive() {
                relationship_index
                    .entry(relationship.destination.clone())
                    .or_default()
                    .push(position);
            }
        }

        let mut specialization_index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (position, specialization) in specializations.iter().enumerate() {
            for name in [&specialization.generalized, &specialization.specialized] {
                specialization_index
                    .entry(name.clone())
                    .or_default()
                    .push(position);
            }
        }

        Self {
            entities,
            relationships,
            specializations,
            entity_index,
            relationship_index,
            specialization_index,
        }
    }

    /// Entities in domain order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Relationships in domain order.
    #[must_use]
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Specializations in domain order.
    #[must_use]
    pub fn specializations(&self) -> &[Specialization] {
        &self.specializations
    }

    #[must_use]
    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.entity_index
            .get(name)
            .map(|&position| &self.entities[position])
    }

    /// Relationships where `name` is the source or the destination, in domain order.
    #[must_use]
    pub fn relationships_by_entity_name(&self, name: &str) -> Vec<&Relationship> {
        self.relationship_index
            .get(name)
            .map(|positions| {
                positions
                    .iter()
                    .map(|&position| &self.relationships[position])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Specializations where `name` is either endpoint, in domain order.
    #[must_use]
    pub fn specializations_by_entity_name(&self, name: &str) -> Vec<&Specialization> {
        self.specialization_index
            .get(name)
            .map(|positions| {
                positions
                    .iter()
                    .map(|&position| &self.specializations[position])
                    .collect()
            })
            .unwrap_or_default()
    }
}

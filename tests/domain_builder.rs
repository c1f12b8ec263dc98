use loco_erd::{
    config::{AttributeCategory, Options},
    diagram::filter::filter_attributes,
    domain::{
        Attribute, Cardinality, Domain, DomainBuilder, EntityDescriptor, EntityRepository,
        Relationship, RelationshipRepository, Specialization, SpecializationRepository,
    },
    Error,
};

struct EntitiesStub {
    entities: Vec<EntityDescriptor>,
}

impl EntityRepository for EntitiesStub {
    fn entities(&self) -> Vec<EntityDescriptor> {
        self.entities.clone()
    }
}

struct RelationshipsStub {
    relationships: Vec<Relationship>,
}

impl RelationshipRepository for RelationshipsStub {
    fn relationships(&self) -> Vec<Relationship> {
        self.relationships.clone()
    }
}

struct SpecializationsStub {
    specializations: Vec<Specialization>,
}

impl SpecializationRepository for SpecializationsStub {
    fn specializations(&self) -> Vec<Specialization> {
        self.specializations.clone()
    }
}

fn build(
    entities: Vec<EntityDescriptor>,
    relationships: Vec<Relationship>,
    specializations: Vec<Specialization>,
) -> Result<Domain, Error> {
    DomainBuilder::new(
        &EntitiesStub { entities },
        &RelationshipsStub { relationships },
        &SpecializationsStub { specializations },
    )
    .build()
}

#[test]
fn builds_domain_with_entities_relationships_and_specializations() {
    let domain = build(
        vec![
            EntityDescriptor::new(
                "User",
                vec![
                    Attribute::new("id", "integer").primary_key(),
                    Attribute::new("email", "string"),
                ],
            ),
            EntityDescriptor::new("Order", vec![]),
            EntityDescriptor::new("Vehicle", vec![Attribute::new("type", "string").inheritance()]),
            EntityDescriptor::new("Car", vec![]),
            EntityDescriptor::new("Attachable", vec![]),
            EntityDescriptor::new("Document", vec![]),
        ],
        vec![Relationship::new("User", "Order", Cardinality::OneToMany)],
        vec![
            Specialization::inheritance("Vehicle", "Car"),
            Specialization::polymorphic("Attachable", "Document"),
        ],
    )
    .expect("valid domain");

    let names: Vec<&str> = domain.entities().iter().map(|entity| entity.name()).collect();
    assert_eq!(
        names,
        vec!["User", "Order", "Vehicle", "Car", "Attachable", "Document"]
    );

    let user = domain.entity_by_name("User").expect("user");
    assert_eq!(user.attributes().len(), 2);
    assert!(!user.is_disconnected());
    let vehicle = domain.entity_by_name("Vehicle").expect("vehicle");
    assert!(vehicle.is_generalized());
    assert!(!vehicle.is_specialized());
    let car = domain.entity_by_name("Car").expect("car");
    assert!(car.is_specialized());
    assert!(!car.is_generalized());
    let attachable = domain.entity_by_name("Attachable").expect("attachable");
    assert!(attachable.is_generalized());
    assert!(!attachable.is_specialized());
    let document = domain.entity_by_name("Document").expect("document");
    assert!(document.is_specialized());
    assert!(!document.is_generalized());
    assert!(document.is_disconnected());

    let order_edges = domain.relationships_by_entity_name("Order");
    assert_eq!(order_edges.len(), 1);
    assert_eq!(order_edges[0].source(), "User");
    assert_eq!(domain.specializations_by_entity_name("Car").len(), 1);
}

#[test]
fn declared_flags_are_kept() {
    let domain = build(
        vec![EntityDescriptor::new("Base", vec![]).abstract_model()],
        vec![],
        vec![],
    )
    .expect("valid domain");

    let base = domain.entity_by_name("Base").expect("base");
    assert!(base.is_generalized());
    assert!(base.is_disconnected());
}

#[test]
fn rejects_duplicate_entity_names() {
    let err = build(
        vec![
            EntityDescriptor::new("User", vec![]),
            EntityDescriptor::new("User", vec![]),
        ],
        vec![],
        vec![],
    )
    .expect_err("duplicate");

    assert!(matches!(err, Error::InvalidDomain(reason) if reason.contains("`User`")));
}

#[test]
fn rejects_relationship_to_unknown_entity() {
    let err = build(
        vec![EntityDescriptor::new("User", vec![])],
        vec![Relationship::new("User", "Invoice", Cardinality::OneToOne)],
        vec![],
    )
    .expect_err("unknown endpoint");

    assert!(matches!(err, Error::InvalidDomain(reason) if reason.contains("`Invoice`")));
}

#[test]
fn rejects_self_specialization() {
    let err = build(
        vec![EntityDescriptor::new("Node", vec![])],
        vec![],
        vec![Specialization::inheritance("Node", "Node")],
    )
    .expect_err("self specialization");

    assert!(matches!(err, Error::InvalidDomain(_)));
}

#[test]
fn polymorphic_members_are_specialized_and_hide_their_attributes() {
    let domain = build(
        vec![
            EntityDescriptor::new("Vehicle", vec![Attribute::new("id", "integer").primary_key()]),
            EntityDescriptor::new("Car", vec![Attribute::new("doors", "integer")]),
            EntityDescriptor::new("Taggable", vec![]),
            EntityDescriptor::new("Photo", vec![Attribute::new("url", "string")]),
        ],
        vec![],
        vec![
            Specialization::inheritance("Vehicle", "Car"),
            Specialization::polymorphic("Taggable", "Photo"),
        ],
    )
    .expect("valid domain");
    let options = Options {
        attributes: Some(AttributeCategory::ALL.into_iter().collect()),
        ..Options::default()
    };

    let vehicle = domain.entity_by_name("Vehicle").expect("vehicle");
    let photo = domain.entity_by_name("Photo").expect("photo");
    assert!(vehicle.is_generalized());
    assert!(photo.is_specialized());
    assert!(filter_attributes(photo, &options).is_empty());
    assert_eq!(filter_attributes(vehicle, &options).len(), 1);
}

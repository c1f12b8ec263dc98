//! # Diagram pipeline
//!
//! A renderer is described by a [`DiagramVariant`]: a name, a function creating
//! the renderer state for one run, and up to five callbacks.
//!
//! | hook                  | called with                          |
//! |-----------------------|--------------------------------------|
//! | `setup`               | once, before anything else           |
//! | `each_entity`         | every entity and its attributes      |
//! | `each_specialization` | every specialization                 |
//! | `each_relationship`   | every relationship                   |
//! | `save`                | once, consumes the state             |
//!
//! Entities always come before edges, so a renderer can declare every node
//! before an edge references it. Hooks that are not registered do nothing; a
//! missing `save` returns `A::default()`.
//!
//! ```rust
//! use loco_erd::{
//!     config::PartialOptions,
//!     diagram::DiagramVariant,
//!     domain::{
//!         Cardinality, DomainBuilder, EntityDescriptor, EntityRepository,
//!         Relationship, RelationshipRepository, Specialization, SpecializationRepository,
//!     },
//! };
//!
//! struct Shop;
//!
//! impl EntityRepository for Shop {
//!     fn entities(&self) -> Vec<EntityDescriptor> {
//!         vec![
//!             EntityDescriptor::new("User", vec![]),
//!             EntityDescriptor::new("Order", vec![]),
//!         ]
//!     }
//! }
//!
//! impl RelationshipRepository for Shop {
//!     fn relationships(&self) -> Vec<Relationship> {
//!         vec![Relationship::new("User", "Order", Cardinality::OneToMany)]
//!     }
//! }
//!
//! impl SpecializationRepository for Shop {
//!     fn specializations(&self) -> Vec<Specialization> {
//!         vec![]
//!     }
//! }
//!
//! let domain = DomainBuilder::new(&Shop, &Shop, &Shop).build().unwrap();
//!
//! let text = DiagramVariant::new("text", |_| String::new())
//!     .each_entity(|out, _, entity, _| {
//!         out.push_str(&format!("[{}]\n", entity.name()));
//!         Ok(())
//!     })
//!     .each_relationship(|out, _, relationship| {
//!         out.push_str(&format!("{} -> {}\n", relationship.source(), relationship.destination()));
//!         Ok(())
//!     })
//!     .save(|out, _| Ok(out));
//!
//! let rendered = text.create(&domain, &PartialOptions::default()).unwrap();
//! assert_eq!(rendered, "[User]\n[Order]\nUser -> Order\n");
//! ```

pub mod filter;
pub mod views;

use tracing::debug;

pub use self::views::{ensure_closed, EntityView, Views, ViewsSnapshot};
use crate::{
    config::{Options, PartialOptions},
    domain::{Attribute, Domain, Entity, Relationship, Specialization},
    Result,
};

/// What every hook can see during a run: the domain and the merged options.
#[derive(Debug, Clone)]
pub struct Context<'d> {
    domain: &'d Domain,
    options: Options,
}

impl<'d> Context<'d> {
    #[must_use]
    pub fn domain(&self) -> &'d Domain {
        self.domain
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }
}

pub type StateInit<S> = Box<dyn Fn(&Context<'_>) -> S>;
pub type SetupHook<S> = Box<dyn Fn(&mut S, &Context<'_>) -> Result<()>>;
pub type EntityHook<S> = Box<dyn Fn(&mut S, &Context<'_>, &Entity, &[&Attribute]) -> Result<()>>;
pub type SpecializationHook<S> = Box<dyn Fn(&mut S, &Context<'_>, &Specialization) -> Result<()>>;
pub type RelationshipHook<S> = Box<dyn Fn(&mut S, &Context<'_>, &Relationship) -> Result<()>>;
pub type SaveHook<S, A> = Box<dyn Fn(S, &Context<'_>) -> Result<A>>;

/// Renderer definition producing artifacts of type `A` from state `S`.
pub struct DiagramVariant<S, A> {
    name: String,
    defaults: Options,
    init: StateInit<S>,
    setup: Option<SetupHook<S>>,
    each_entity: Option<EntityHook<S>>,
    each_specialization: Option<SpecializationHook<S>>,
    each_relationship: Option<RelationshipHook<S>>,
    save: Option<SaveHook<S, A>>,
}

impl<S, A> DiagramVariant<S, A> {
    /// Creates a variant with no hooks. `init` builds fresh state for every run.
    pub fn new(name: impl Into<String>, init: impl Fn(&Context<'_>) -> S + 'static) -> Self {
        Self {
            name: name.into(),
            defaults: Options::default(),
            init: Box::new(init),
            setup: None,
            each_entity: None,
            each_specialization: None,
            each_relationship: None,
            save: None,
        }
    }

    /// Options the caller's overrides are merged over. Defaults to [`Options::default`].
    #[must_use]
    pub fn with_defaults(mut self, defaults: Options) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn setup(mut self, hook: impl Fn(&mut S, &Context<'_>) -> Result<()> + 'static) -> Self {
        self.setup = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn each_entity(
        mut self,
        hook: impl Fn(&mut S, &Context<'_>, &Entity, &[&Attribute]) -> Result<()> + 'static,
    ) -> Self {
        self.each_entity = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn each_specialization(
        mut self,
        hook: impl Fn(&mut S, &Context<'_>, &Specialization) -> Result<()> + 'static,
    ) -> Self {
        self.each_specialization = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn each_relationship(
        mut self,
        hook: impl Fn(&mut S, &Context<'_>, &Relationship) -> Result<()> + 'static,
    ) -> Self {
        self.each_relationship = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn save(mut self, hook: impl Fn(S, &Context<'_>) -> Result<A> + 'static) -> Self {
        self.save = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn defaults(&self) -> &Options {
        &self.defaults
    }

    /// Binds a fresh renderer instance to `domain` and fully resolved `options`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] when `options` fail
    /// [`Options::validate`]; the state initialiser is not called then.
    pub fn diagram<'v, 'd>(
        &'v self,
        domain: &'d Domain,
        options: Options,
    ) -> Result<Diagram<'v, 'd, S, A>> {
        options.validate()?;
        let context = Context { domain, options };
        let state = (self.init)(&context);
        Ok(Diagram {
            variant: self,
            context,
            state,
        })
    }
}

impl<S, A: Default> DiagramVariant<S, A> {
    /// Merges `overrides` over the variant defaults, generates and saves.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::Error::Configuration`] before any filtering when the
    /// overrides are invalid, with [`crate::Error::EmptyResult`] when no entity
    /// is left, and with whatever a hook returns.
    pub fn create(&self, domain: &Domain, overrides: &PartialOptions) -> Result<A> {
        let options = self.defaults.merge(overrides)?;
        self.create_with_options(domain, options)
    }

    /// Same as [`DiagramVariant::create`] with options that are already resolved.
    ///
    /// # Errors
    ///
    /// See [`DiagramVariant::create`].
    pub fn create_with_options(&self, domain: &Domain, options: Options) -> Result<A> {
        let mut diagram = self.diagram(domain, options)?;
        diagram.generate()?;
        diagram.save()
    }
}

/// One run of a [`DiagramVariant`] over a domain.
pub struct Diagram<'v, 'd, S, A> {
    variant: &'v DiagramVariant<S, A>,
    context: Context<'d>,
    state: S,
}

impl<'v, 'd, S, A> Diagram<'v, 'd, S, A> {
    #[must_use]
    pub fn context(&self) -> &Context<'d> {
        &self.context
    }

    /// Renderer state accumulated so far.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// The filtered views this run draws.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EmptyResult`] when no entity is left.
    pub fn views(&self) -> Result<Views<'d>> {
        Views::build(self.context.domain, &self.context.options)
    }

    /// Runs `setup`, then the entity, specialization and relationship hooks in
    /// that order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing filter, closure check or hook.
    pub fn generate(&mut self) -> Result<()> {
        let views = self.views()?;
        views.ensure_closed()?;

        if let Some(setup) = &self.variant.setup {
            setup(&mut self.state, &self.context)?;
        }
        if let Some(each_entity) = &self.variant.each_entity {
            for view in views.entities() {
                each_entity(
                    &mut self.state,
                    &self.context,
                    view.entity,
                    view.attributes.as_slice(),
                )?;
            }
        }
        if let Some(each_specialization) = &self.variant.each_specialization {
            for specialization in views.specializations() {
                each_specialization(&mut self.state, &self.context, *specialization)?;
            }
        }
        if let Some(each_relationship) = &self.variant.each_relationship {
            for relationship in views.relationships() {
                each_relationship(&mut self.state, &self.context, *relationship)?;
            }
        }

        debug!(
            variant = %self.variant.name,
            entities = views.entities().len(),
            specializations = views.specializations().len(),
            relationships = views.relationships().len(),
            "diagram_generated"
        );
        Ok(())
    }
}

impl<'v, 'd, S, A: Default> Diagram<'v, 'd, S, A> {
    /// Hands the state to the `save` hook and returns the artifact.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by the `save` hook.
    pub fn save(self) -> Result<A> {
        match &self.variant.save {
            Some(save) => save(self.state, &self.context),
            None => Ok(A::default()),
        }
    }
}

use std::fmt::{Debug, Formatter, Result as FmtResult};

use tracing::debug;

use crate::config::{BeanDecl, Configuration, ConfigurationError, ConfigurationUnit, Resource};
use crate::registry::{BeanLookup, BeanRegistry};

type Builder = fn(&BeanRegistry) -> Result<ConfigurationUnit, ConfigurationError>;

/// Bookkeeping for a registered configuration that hasn't been constructed
/// yet: it remembers which of the declared resources are still missing.
///
/// The wrapper doesn't hold on to a registry. Each check is made against the
/// registry passed in, so the assembler remains free to mutate it between
/// checks.
pub struct ConfigurationWrapper {
    name: &'static str,
    resources: &'static [Resource],
    waiting: Vec<String>,
    beans: &'static [BeanDecl],
    build: Builder,
}

impl ConfigurationWrapper {
    pub fn new<C: Configuration>() -> Self {
        let mut waiting: Vec<String> = Vec::with_capacity(C::RESOURCES.len());
        for resource in C::RESOURCES {
            if !waiting.iter().any(|name| name == resource.name()) {
                waiting.push(resource.name().to_owned());
            }
        }

        Self {
            name: C::NAME,
            resources: C::RESOURCES,
            waiting,
            beans: C::BEANS,
            build: build::<C>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Drops every waiting resource that `beans` now contains and tells
    /// whether none are left. A resource found once is never checked again.
    pub fn are_resources_satisfied<L>(&mut self, beans: &L) -> bool
    where
        L: BeanLookup + ?Sized,
    {
        self.waiting.retain(|name| !beans.contains_bean(name));
        self.waiting.is_empty()
    }

    /// Constructs the configuration. The returned unit is not initialized
    /// yet.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingResources`] if some waiting
    /// resource is still absent from `registry`, or whatever error the
    /// configuration's constructor reports.
    pub fn build_config(
        &self,
        registry: &BeanRegistry,
    ) -> Result<ConfigurationUnit, ConfigurationError> {
        let missing: Vec<String> = self
            .waiting
            .iter()
            .filter(|name| !registry.contains_bean(name))
            .cloned()
            .collect();

        if missing.is_empty() {
            (self.build)(registry)
        } else {
            for resource in &missing {
                debug!(
                    configuration = self.name,
                    resource = %resource,
                    binding = self.binding(resource),
                    "resource is still missing"
                );
            }
            Err(ConfigurationError::MissingResources {
                configuration: self.name,
                resources: missing,
            })
        }
    }

    /// The constructor argument a resource is delivered to, if declared.
    pub fn binding(&self, resource: &str) -> Option<&'static str> {
        self.resources
            .iter()
            .filter(|declared| declared.name() == resource)
            .find_map(Resource::binding)
    }

    pub fn waiting_resources(&self) -> &[String] {
        &self.waiting
    }

    pub fn beans(&self) -> &'static [BeanDecl] {
        self.beans
    }

    pub fn bean_names(&self) -> impl Iterator<Item = &'static str> {
        self.beans.iter().map(BeanDecl::name)
    }
}

fn build<C: Configuration>(registry: &BeanRegistry) -> Result<ConfigurationUnit, ConfigurationError> {
    C::construct(registry).map(ConfigurationUnit::new)
}

impl Debug for ConfigurationWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConfigurationWrapper")
            .field("name", &self.name)
            .field("waiting", &self.waiting)
            .field("beans", &self.beans)
            .finish_non_exhaustive()
    }
}

use std::fmt::{Debug, Formatter, Result as FmtResult};

use tracing::warn;

use crate::config::{BeanDecl, Configuration, ConfigurationError};
use crate::registry::BeanRegistry;
use crate::util::any::{AsAny, DowncastRef};

trait ErasedConfiguration: AsAny + Send + Sync {
    fn post_init(&mut self, registry: &BeanRegistry) -> Result<(), ConfigurationError>;

    fn provide_beans(&mut self, registry: &mut BeanRegistry) -> Result<(), ConfigurationError>;
}

impl<C: Configuration> ErasedConfiguration for C {
    fn post_init(&mut self, registry: &BeanRegistry) -> Result<(), ConfigurationError> {
        Configuration::post_init(self, registry)
    }

    fn provide_beans(&mut self, registry: &mut BeanRegistry) -> Result<(), ConfigurationError> {
        Configuration::provide_beans(self, registry)
    }
}

/// A constructed configuration with its concrete type erased.
pub struct ConfigurationUnit {
    name: &'static str,
    beans: &'static [BeanDecl],
    inner: Box<dyn ErasedConfiguration>,
}

impl ConfigurationUnit {
    pub fn new<C: Configuration>(configuration: C) -> Self {
        Self {
            name: C::NAME,
            beans: C::BEANS,
            inner: Box::new(configuration),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn beans(&self) -> &'static [BeanDecl] {
        self.beans
    }

    /// Runs the post-initialization hook and then the bean-providing hook.
    ///
    /// # Errors
    ///
    /// Returns the first error either hook reports, unchanged.
    pub fn initialize(&mut self, registry: &mut BeanRegistry) -> Result<(), ConfigurationError> {
        self.inner.post_init(registry)?;
        self.inner.provide_beans(registry)?;
        self.check_declared_beans(registry);
        Ok(())
    }

    fn check_declared_beans(&self, registry: &BeanRegistry) {
        for bean in self.beans {
            match registry.bean_kind(bean.name()) {
                None => warn!(
                    configuration = self.name,
                    bean = bean.name(),
                    "declared bean was not provided"
                ),
                Some(kind) if kind != bean.kind() => warn!(
                    configuration = self.name,
                    bean = bean.name(),
                    declared = %bean.kind(),
                    registered = %kind,
                    "declared bean was provided with another strategy"
                ),
                Some(_) => {}
            }
        }
    }

    pub fn downcast_ref<C: Configuration>(&self) -> Option<&C> {
        self.inner.downcast_ref::<C>()
    }
}

impl Debug for ConfigurationUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConfigurationUnit")
            .field("name", &self.name)
            .field("beans", &self.beans)
            .finish_non_exhaustive()
    }
}

mod error;
mod provider_map;
mod resolution;

use std::any;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use tracing::{debug, trace};

use crate::provider::{Provider, TypedProvider, TypedRefProvider};
use crate::strategy::{CreationStrategy, Instance, SharedCreationStrategy, Singleton, StrategyKind};
use crate::util::any::AsAny;

use provider_map::ProviderMap;
use resolution::ResolutionStacks;

pub use error::BeanError;
pub(crate) use error::{DUPLICATED_NAME, EMPTY_NAME, UNREGISTERED_NAME};

/// Anything that can be stored in and retrieved from a [`BeanRegistry`].
pub trait Bean: Send + Sync + 'static {}

impl<T> Bean for T where T: Send + Sync + 'static {}

/// The narrow view of a registry needed to tell whether a name is already
/// provided.
#[cfg_attr(test, mockall::automock)]
pub trait BeanLookup {
    fn contains_bean(&self, name: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Lets [`BeanRegistry::get_or_register_bean`] register a missing name
    /// as a default-constructed [`Singleton`] instead of failing.
    pub auto_register: bool,
}

impl RegistryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_register(mut self, enabled: bool) -> Self {
        self.auto_register = enabled;
        self
    }
}

/// Maps bean names to providers and resolves them on request.
///
/// Registration needs exclusive access, while resolution only needs a shared
/// reference: a constructor running inside [`BeanRegistry::get_bean`] gets
/// the same registry back and may resolve its own dependencies through it.
/// Re-entering a name that is still being resolved on the same thread is
/// reported as [`BeanError::BeanDependencyCycle`].
///
/// Beans registered with a [`SharedCreationStrategy`] are retrieved by
/// reference through [`BeanRegistry::get_bean_ref`]; all others are
/// retrieved by value through [`BeanRegistry::get_bean`]. Asking for one
/// shape when the other was registered is a type mismatch.
pub struct BeanRegistry {
    options: RegistryOptions,
    providers: ProviderMap,
    resolving: ResolutionStacks,
}

impl BeanRegistry {
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            options,
            providers: ProviderMap::new(),
            resolving: ResolutionStacks::new(),
        }
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Registers a bean handed out by value.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::InvalidBeanName`] if `name` is empty or already
    /// registered. The existing registration is left untouched.
    pub fn register_bean<S>(&mut self, name: impl Into<String>, strategy: S) -> Result<(), BeanError>
    where
        S: CreationStrategy,
    {
        self.insert_provider(name.into(), Box::new(TypedProvider::new(strategy)))
    }

    /// Registers a bean handed out by reference.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::InvalidBeanName`] if `name` is empty or already
    /// registered.
    pub fn register_shared_bean<S>(
        &mut self,
        name: impl Into<String>,
        strategy: S,
    ) -> Result<(), BeanError>
    where
        S: SharedCreationStrategy,
    {
        self.insert_provider(name.into(), Box::new(TypedRefProvider::new(strategy)))
    }

    /// Registers a lazily default-constructed [`Singleton`].
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::InvalidBeanName`] if `name` is empty or already
    /// registered.
    pub fn register_singleton<T>(&mut self, name: impl Into<String>) -> Result<(), BeanError>
    where
        T: Bean + Default,
    {
        self.register_shared_bean(name, Singleton::<T>::default())
    }

    /// Registers a value owned by the caller. Each request receives a clone.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::InvalidBeanName`] if `name` is empty or already
    /// registered.
    pub fn register_bean_instance<T>(
        &mut self,
        name: impl Into<String>,
        instance: T,
    ) -> Result<(), BeanError>
    where
        T: Bean + Clone,
    {
        self.register_bean(name, Instance::new(instance))
    }

    fn insert_provider(&mut self, name: String, provider: Box<dyn Provider>) -> Result<(), BeanError> {
        if name.is_empty() {
            return Err(BeanError::invalid_name(&name, EMPTY_NAME));
        }

        let (type_name, kind) = (provider.type_name(), provider.kind());
        match self.providers.insert(name.clone(), provider) {
            Ok(()) => {
                debug!(bean = %name, bean_type = type_name, %kind, "registered bean");
                Ok(())
            }
            Err(_) => Err(BeanError::InvalidBeanName {
                name,
                reason: DUPLICATED_NAME,
            }),
        }
    }

    pub fn contains_bean(&self, name: &str) -> bool {
        self.providers.contains(name)
    }

    /// Resolves a bean registered to hand out values of type `T`.
    ///
    /// # Errors
    ///
    /// - [`BeanError::InvalidBeanName`] if `name` is not registered.
    /// - [`BeanError::BeanDependencyCycle`] if `name` is already being
    ///   resolved further up the current call chain.
    /// - [`BeanError::InvalidBeanType`] if `name` was registered with
    ///   another type.
    /// - Any error raised while constructing the bean.
    pub fn get_bean<T: Bean>(&self, name: &str) -> Result<T, BeanError> {
        let provider = self.find_provider(name)?;
        let _resolving = self.resolving.enter(name)?;
        trace!(bean = name, "resolving bean");

        let Some(provider) = provider.as_any().downcast_ref::<TypedProvider<T>>() else {
            return Err(type_mismatch(name, any::type_name::<T>(), provider));
        };
        provider.get_bean(self)
    }

    /// Resolves a bean registered to hand out references to `T`.
    ///
    /// # Errors
    ///
    /// The same as [`BeanRegistry::get_bean`].
    pub fn get_bean_ref<T: Bean>(&self, name: &str) -> Result<&T, BeanError> {
        let provider = self.find_provider(name)?;
        let _resolving = self.resolving.enter(name)?;
        trace!(bean = name, "resolving bean by reference");

        let Some(provider) = provider.as_any().downcast_ref::<TypedRefProvider<T>>() else {
            return Err(type_mismatch(name, any::type_name::<&T>(), provider));
        };
        provider.get_bean(self)
    }

    /// Resolves a bean by reference, first registering `name` as a
    /// default-constructed [`Singleton<T>`] if it is missing and
    /// [`RegistryOptions::auto_register`] is on.
    ///
    /// # Errors
    ///
    /// The same as [`BeanRegistry::get_bean_ref`]. With auto-registration
    /// on, an empty `name` fails the way [`BeanRegistry::register_singleton`]
    /// does.
    pub fn get_or_register_bean<T>(&mut self, name: &str) -> Result<&T, BeanError>
    where
        T: Bean + Default,
    {
        if self.options.auto_register && !self.contains_bean(name) {
            debug!(bean = name, "registering missing bean on first use");
            self.register_singleton::<T>(name)?;
        }
        self.get_bean_ref(name)
    }

    /// Returns the strategy a name was registered with.
    pub fn bean_kind(&self, name: &str) -> Option<StrategyKind> {
        self.providers.get(name).map(Provider::kind)
    }

    /// Describes the type a name was registered with, for diagnostics only.
    pub fn bean_type(&self, name: &str) -> Option<&'static str> {
        self.providers.get(name).map(Provider::type_name)
    }

    /// Names being resolved on the calling thread, outermost first.
    pub fn resolving_beans(&self) -> Vec<String> {
        self.resolving.current()
    }

    pub fn bean_names(&self) -> impl Iterator<Item = &str> {
        self.providers.names()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find_provider(&self, name: &str) -> Result<&dyn Provider, BeanError> {
        self.providers
            .get(name)
            .ok_or_else(|| BeanError::invalid_name(name, UNREGISTERED_NAME))
    }
}

fn type_mismatch(name: &str, wanted: &'static str, provider: &dyn Provider) -> BeanError {
    BeanError::InvalidBeanType {
        name: name.to_owned(),
        wanted,
        actual: provider.type_name(),
    }
}

impl Default for BeanRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for BeanRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("BeanRegistry")
            .field("options", &self.options)
            .field("providers", &self.providers)
            .finish_non_exhaustive()
    }
}

impl BeanLookup for BeanRegistry {
    fn contains_bean(&self, name: &str) -> bool {
        BeanRegistry::contains_bean(self, name)
    }
}

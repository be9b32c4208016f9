//! Configuration units: declarative bundles of required resources and
//! provided beans, materialized by a [`Context`] once everything they need
//! is registered.
//!
//! [`Context`]: crate::context::Context

mod error;
mod unit;
mod wrapper;

use crate::context::Context;
use crate::registry::BeanRegistry;
use crate::strategy::StrategyKind;

pub use error::{ConfigurationError, PendingConfiguration};
pub use unit::ConfigurationUnit;
pub use wrapper::ConfigurationWrapper;

/// The name given to configurations which don't declare one.
pub const UNDEFINED_NAME: &str = "Undefined";

/// A bean name a configuration needs before it can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resource {
    name: &'static str,
    binding: Option<&'static str>,
}

impl Resource {
    pub const fn named(name: &'static str) -> Self {
        Self {
            name,
            binding: None,
        }
    }

    /// A resource delivered to the constructor argument called `binding`.
    pub const fn bound(name: &'static str, binding: &'static str) -> Self {
        Self {
            name,
            binding: Some(binding),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn binding(&self) -> Option<&'static str> {
        self.binding
    }
}

/// A bean a configuration promises to register once initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BeanDecl {
    name: &'static str,
    kind: StrategyKind,
}

impl BeanDecl {
    pub const fn new(name: &'static str, kind: StrategyKind) -> Self {
        Self { name, kind }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }
}

/// A unit of assembly.
///
/// A configuration declares which beans it needs ([`Configuration::RESOURCES`])
/// and which beans it provides ([`Configuration::BEANS`]). It is constructed
/// only after all of its resources are registered; [`Configuration::post_init`]
/// then runs, followed by [`Configuration::provide_beans`].
///
/// Usually the [`configuration`] attribute writes this implementation. By
/// hand it looks like:
///
/// ```rust
/// # use beanbag::prelude::*;
/// struct Greeting {
///     name: String,
/// }
///
/// impl Configuration for Greeting {
///     const NAME: &'static str = "greeting";
///     const RESOURCES: &'static [Resource] = &[Resource::bound("user", "name")];
///     const BEANS: &'static [BeanDecl] = &[BeanDecl::new("greeting", StrategyKind::Instance)];
///
///     type Dependencies = ();
///
///     fn construct(registry: &BeanRegistry) -> Result<Self, ConfigurationError> {
///         Ok(Self { name: registry.get_bean("user")? })
///     }
///
///     fn provide_beans(&mut self, registry: &mut BeanRegistry) -> Result<(), ConfigurationError> {
///         registry.register_bean_instance("greeting", format!("Hello, {}!", self.name))?;
///         Ok(())
///     }
/// }
/// ```
///
/// [`configuration`]: crate::configuration
pub trait Configuration: Sized + Send + Sync + 'static {
    const NAME: &'static str = UNDEFINED_NAME;

    const RESOURCES: &'static [Resource] = &[];

    const BEANS: &'static [BeanDecl] = &[];

    /// Configurations registered alongside this one, as a tuple.
    type Dependencies: ConfigurationSet;

    /// Builds the configuration, pulling its resources from `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a resource can't be resolved or the configuration
    /// itself fails to build.
    fn construct(registry: &BeanRegistry) -> Result<Self, ConfigurationError>;

    /// Runs right after construction.
    ///
    /// # Errors
    ///
    /// Any error returned here aborts assembly unchanged.
    fn post_init(&mut self, _registry: &BeanRegistry) -> Result<(), ConfigurationError> {
        Ok(())
    }

    /// Registers the beans this configuration provides.
    ///
    /// # Errors
    ///
    /// Any error returned here aborts assembly unchanged.
    fn provide_beans(&mut self, _registry: &mut BeanRegistry) -> Result<(), ConfigurationError> {
        Ok(())
    }
}

/// A list of configurations, written as a tuple.
pub trait ConfigurationSet {
    fn register_all(context: &mut Context);
}

impl ConfigurationSet for () {
    fn register_all(_context: &mut Context) {}
}

macro_rules! impl_configuration_set_for_tuples {
    ($($config:ident),+) => {
        impl<$($config,)+> ConfigurationSet for ($($config,)+)
        where
            $($config: Configuration,)+
        {
            fn register_all(context: &mut Context) {
                $(context.register_configuration::<$config>();)+
            }
        }
    };
}

impl_configuration_set_for_tuples!(C1);
impl_configuration_set_for_tuples!(C1, C2);
impl_configuration_set_for_tuples!(C1, C2, C3);
impl_configuration_set_for_tuples!(C1, C2, C3, C4);
impl_configuration_set_for_tuples!(C1, C2, C3, C4, C5);
impl_configuration_set_for_tuples!(C1, C2, C3, C4, C5, C6);
impl_configuration_set_for_tuples!(C1, C2, C3, C4, C5, C6, C7);
impl_configuration_set_for_tuples!(C1, C2, C3, C4, C5, C6, C7, C8);

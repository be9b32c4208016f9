//! Creation strategies decide how and when a bean's value comes into being.
//!
//! A strategy either hands out owned values ([`CreationStrategy`]) or
//! references into storage it owns itself ([`SharedCreationStrategy`]). The
//! registry never needs to know which concrete strategy sits behind a name:
//! each one is wrapped in a [`TypedProvider`] or [`TypedRefProvider`] first.
//!
//! [`TypedProvider`]: crate::provider::TypedProvider
//! [`TypedRefProvider`]: crate::provider::TypedRefProvider

mod factory;
mod instance;
mod singleton;
mod smart;

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::provider::ValueContainer;
use crate::registry::{Bean, BeanError, BeanRegistry};

pub use factory::Factory;
pub use instance::Instance;
pub use singleton::Singleton;
pub use smart::{SmartFactory, SmartSingleton};

/// A constructor shared by every strategy. It receives the registry the bean
/// is resolved from, so it may pull its own dependencies by name.
pub(crate) type Constructor<T> = Box<dyn Fn(&BeanRegistry) -> Result<T, BeanError> + Send + Sync>;

/// A strategy producing owned values of type [`CreationStrategy::Output`].
pub trait CreationStrategy: Send + Sync + 'static {
    type Output: Bean;

    /// Produces one value. Whether it is fresh or shared depends on the
    /// strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying constructor fails or one of the
    /// dependencies it resolves fails.
    fn produce(&self, registry: &BeanRegistry) -> Result<ValueContainer<Self::Output>, BeanError>;

    fn kind(&self) -> StrategyKind;
}

/// A strategy handing out references into an instance it owns, so the
/// produced reference lives exactly as long as the strategy does.
pub trait SharedCreationStrategy: Send + Sync + 'static {
    type Target: Bean;

    /// Produces a reference to the owned instance, creating it first if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the instance has to be created and its
    /// constructor fails.
    fn produce_ref(
        &self,
        registry: &BeanRegistry,
    ) -> Result<ValueContainer<&Self::Target>, BeanError>;

    fn kind(&self) -> StrategyKind;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Singleton,
    Factory,
    Instance,
    SmartSingleton,
    SmartFactory,
}

impl StrategyKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Singleton => "Singleton",
            Self::Factory => "Factory",
            Self::Instance => "Instance",
            Self::SmartSingleton => "SmartSingleton",
            Self::SmartFactory => "SmartFactory",
        }
    }
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_str())
    }
}

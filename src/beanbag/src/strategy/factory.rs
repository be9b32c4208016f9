use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::provider::ValueContainer;
use crate::registry::{Bean, BeanError, BeanRegistry};
use crate::strategy::{Constructor, CreationStrategy, StrategyKind};

/// Builds a brand-new value on every request. The caller owns whatever it
/// receives.
pub struct Factory<T: Bean> {
    constructor: Constructor<T>,
}

impl<T: Bean> Factory<T> {
    pub fn new<F>(constructor: F) -> Self
    where
        F: Fn(&BeanRegistry) -> Result<T, BeanError> + Send + Sync + 'static,
    {
        Self {
            constructor: Box::new(constructor),
        }
    }
}

impl<T: Bean + Default> Default for Factory<T> {
    fn default() -> Self {
        Self::new(|_| Ok(T::default()))
    }
}

impl<T: Bean> Debug for Factory<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Factory<T>").finish_non_exhaustive()
    }
}

impl<T: Bean> CreationStrategy for Factory<T> {
    type Output = T;

    fn produce(&self, registry: &BeanRegistry) -> Result<ValueContainer<T>, BeanError> {
        (self.constructor)(registry).map(ValueContainer::new)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Factory
    }
}

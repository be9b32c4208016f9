use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::provider::ValueContainer;
use crate::registry::{Bean, BeanError, BeanRegistry};
use crate::strategy::{CreationStrategy, StrategyKind};

/// Serves a value supplied by the caller at registration time.
///
/// Every request receives a clone of that value, so the registry never
/// produces anything on its own. To share one object rather than copies of
/// it, hand in an `Arc<T>` or a `&'static T`: the clones then all point at
/// the caller's object, whose lifetime stays in the caller's hands.
pub struct Instance<T>
where
    T: Bean + Clone,
{
    instance: T,
}

impl<T> Instance<T>
where
    T: Bean + Clone,
{
    pub fn new(instance: T) -> Self {
        Self { instance }
    }
}

impl<T> Debug for Instance<T>
where
    T: Bean + Clone,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Instance<T>").finish_non_exhaustive()
    }
}

impl<T> CreationStrategy for Instance<T>
where
    T: Bean + Clone,
{
    type Output = T;

    fn produce(&self, _registry: &BeanRegistry) -> Result<ValueContainer<T>, BeanError> {
        Ok(ValueContainer::new(self.instance.clone()))
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Instance
    }
}

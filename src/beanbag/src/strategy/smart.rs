use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::provider::ValueContainer;
use crate::registry::{Bean, BeanError, BeanRegistry};
use crate::strategy::{Constructor, CreationStrategy, StrategyKind};

/// Like [`Singleton`], but the instance lives behind an [`Arc`] so holders
/// may keep it after the registry is gone.
///
/// The instance belongs to this registration alone: two names registered
/// with a `SmartSingleton<T>` of the same `T` own two separate instances.
///
/// [`Singleton`]: crate::strategy::Singleton
pub struct SmartSingleton<T: Bean> {
    constructor: Constructor<T>,
    instance: OnceLock<Arc<T>>,
    constructing: Mutex<()>,
}

impl<T: Bean> SmartSingleton<T> {
    pub fn new<F>(constructor: F) -> Self
    where
        F: Fn(&BeanRegistry) -> Result<T, BeanError> + Send + Sync + 'static,
    {
        Self {
            constructor: Box::new(constructor),
            instance: OnceLock::new(),
            constructing: Mutex::new(()),
        }
    }

    pub fn is_constructed(&self) -> bool {
        self.instance.get().is_some()
    }
}

impl<T: Bean + Default> Default for SmartSingleton<T> {
    fn default() -> Self {
        Self::new(|_| Ok(T::default()))
    }
}

impl<T: Bean> Debug for SmartSingleton<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SmartSingleton<T>")
            .field("constructed", &self.is_constructed())
            .finish_non_exhaustive()
    }
}

impl<T: Bean> CreationStrategy for SmartSingleton<T> {
    type Output = Arc<T>;

    fn produce(&self, registry: &BeanRegistry) -> Result<ValueContainer<Arc<T>>, BeanError> {
        if let Some(instance) = self.instance.get() {
            return Ok(ValueContainer::new(Arc::clone(instance)));
        }

        let _constructing = self.constructing.lock();
        if let Some(instance) = self.instance.get() {
            return Ok(ValueContainer::new(Arc::clone(instance)));
        }

        let instance = Arc::new((self.constructor)(registry)?);
        let instance = self.instance.get_or_init(|| instance);
        Ok(ValueContainer::new(Arc::clone(instance)))
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::SmartSingleton
    }
}

/// Builds an independent shared instance on every request.
pub struct SmartFactory<T: Bean> {
    constructor: Constructor<T>,
}

impl<T: Bean> SmartFactory<T> {
    pub fn new<F>(constructor: F) -> Self
    where
        F: Fn(&BeanRegistry) -> Result<T, BeanError> + Send + Sync + 'static,
    {
        Self {
            constructor: Box::new(constructor),
        }
    }
}

impl<T: Bean + Default> Default for SmartFactory<T> {
    fn default() -> Self {
        Self::new(|_| Ok(T::default()))
    }
}

impl<T: Bean> Debug for SmartFactory<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SmartFactory<T>").finish_non_exhaustive()
    }
}

impl<T: Bean> CreationStrategy for SmartFactory<T> {
    type Output = Arc<T>;

    fn produce(&self, registry: &BeanRegistry) -> Result<ValueContainer<Arc<T>>, BeanError> {
        (self.constructor)(registry)
            .map(Arc::new)
            .map(ValueContainer::new)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::SmartFactory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smart_singleton_produce_succeeds_with_shared_instance() {
        let registry = BeanRegistry::new();
        let strategy = SmartSingleton::<String>::default();

        let first = strategy.produce(&registry).unwrap().into_inner();
        let second = strategy.produce(&registry).unwrap().into_inner();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn smart_singleton_instance_outlives_strategy() {
        let registry = BeanRegistry::new();
        let strategy = SmartSingleton::new(|_| Ok(String::from("kept")));

        let instance = strategy.produce(&registry).unwrap().into_inner();
        drop(strategy);

        assert_eq!(*instance, "kept");
        assert_eq!(Arc::strong_count(&instance), 1);
    }

    #[test]
    fn smart_singletons_of_same_type_are_separate() {
        let registry = BeanRegistry::new();
        let first = SmartSingleton::<i32>::default();
        let second = SmartSingleton::<i32>::default();

        assert!(!Arc::ptr_eq(
            &first.produce(&registry).unwrap().into_inner(),
            &second.produce(&registry).unwrap().into_inner(),
        ));
    }

    #[test]
    fn smart_factory_produce_succeeds_with_distinct_instances() {
        let registry = BeanRegistry::new();
        let strategy = SmartFactory::<i32>::default();

        let first = strategy.produce(&registry).unwrap().into_inner();
        let second = strategy.produce(&registry).unwrap().into_inner();

        assert!(!Arc::ptr_eq(&first, &second));
    }
}

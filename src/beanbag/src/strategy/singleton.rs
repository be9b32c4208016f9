use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::provider::ValueContainer;
use crate::registry::{Bean, BeanError, BeanRegistry};
use crate::strategy::{Constructor, SharedCreationStrategy, StrategyKind};

/// Creates its instance on first request and hands out references to it
/// ever after. The instance is owned by the strategy and dropped with it.
pub struct Singleton<T: Bean> {
    constructor: Constructor<T>,
    instance: OnceLock<T>,
    constructing: Mutex<()>,
}

impl<T: Bean> Singleton<T> {
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

impl<T: Bean + Default> Default for Singleton<T> {
    fn default() -> Self {
        Self::new(|_| Ok(T::default()))
    }
}

impl<T: Bean> Debug for Singleton<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Singleton<T>")
            .field("constructed", &self.is_constructed())
            .finish_non_exhaustive()
    }
}

impl<T: Bean> SharedCreationStrategy for Singleton<T> {
    type Target = T;

    fn produce_ref(&self, registry: &BeanRegistry) -> Result<ValueContainer<&T>, BeanError> {
        if let Some(instance) = self.instance.get() {
            return Ok(ValueContainer::new(instance));
        }

        // Only one thread builds the instance; the others find it afterwards.
        let _constructing = self.constructing.lock();
        if let Some(instance) = self.instance.get() {
            return Ok(ValueContainer::new(instance));
        }

        let instance = (self.constructor)(registry)?;
        Ok(ValueContainer::new(self.instance.get_or_init(|| instance)))
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Singleton
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn singleton_produce_ref_succeeds_with_same_instance() {
        let registry = BeanRegistry::new();
        let created = Arc::new(AtomicUsize::new(0));
        let strategy = Singleton::new({
            let created = Arc::clone(&created);
            move |_| {
                created.fetch_add(1, Ordering::SeqCst);
                Ok(String::from("bean"))
            }
        });
        assert!(!strategy.is_constructed());

        let first = strategy.produce_ref(&registry).unwrap().into_inner();
        let second = strategy.produce_ref(&registry).unwrap().into_inner();

        assert!(ptr::eq(first, second));
        assert_eq!(first, "bean");
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn singleton_produce_ref_retries_after_constructor_failure() {
        let registry = BeanRegistry::new();
        let attempts = Arc::new(AtomicUsize::new(0));
        let strategy = Singleton::new({
            let attempts = Arc::clone(&attempts);
            move |_| {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(BeanError::construction("flaky", "first attempt"))
                } else {
                    Ok(7i32)
                }
            }
        });

        assert!(strategy.produce_ref(&registry).is_err());
        assert!(!strategy.is_constructed());
        assert_eq!(*strategy.produce_ref(&registry).unwrap().into_inner(), 7);
    }
}

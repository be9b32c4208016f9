mod value;

use std::any;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::registry::{Bean, BeanError, BeanRegistry};
use crate::strategy::{CreationStrategy, SharedCreationStrategy, StrategyKind};
use crate::util::any::AsAny;

pub use value::ValueContainer;

/// A type-erased wrapper around one creation strategy.
///
/// The registry stores every bean as a `Box<dyn Provider>` regardless of its
/// type. Retrieval recovers the typed view by downcasting to
/// [`TypedProvider<T>`] or [`TypedRefProvider<T>`]; a failed downcast is a
/// type mismatch and is reported with [`Provider::type_name`].
pub trait Provider: AsAny + Debug + Send + Sync + 'static {
    /// Describes the registered bean type. Only meant for diagnostics.
    fn type_name(&self) -> &'static str;

    fn kind(&self) -> StrategyKind;
}

/// Typed view over a strategy producing owned `T`s.
pub struct TypedProvider<T: Bean> {
    strategy: Box<dyn CreationStrategy<Output = T>>,
}

impl<T: Bean> TypedProvider<T> {
    pub fn new<S>(strategy: S) -> Self
    where
        S: CreationStrategy<Output = T>,
    {
        Self {
            strategy: Box::new(strategy),
        }
    }

    /// Runs the strategy and unpacks the produced value.
    ///
    /// # Errors
    ///
    /// Returns whatever error the strategy reports.
    pub fn get_bean(&self, registry: &BeanRegistry) -> Result<T, BeanError> {
        self.strategy
            .produce(registry)
            .map(ValueContainer::into_inner)
    }
}

impl<T: Bean> Debug for TypedProvider<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TypedProvider")
            .field("type", &any::type_name::<T>())
            .field("kind", &self.strategy.kind())
            .finish()
    }
}

impl<T: Bean> Provider for TypedProvider<T> {
    fn type_name(&self) -> &'static str {
        any::type_name::<T>()
    }

    fn kind(&self) -> StrategyKind {
        self.strategy.kind()
    }
}

/// Typed view over a strategy handing out `&T`s into storage it owns.
pub struct TypedRefProvider<T: Bean> {
    strategy: Box<dyn SharedCreationStrategy<Target = T>>,
}

impl<T: Bean> TypedRefProvider<T> {
    pub fn new<S>(strategy: S) -> Self
    where
        S: SharedCreationStrategy<Target = T>,
    {
        Self {
            strategy: Box::new(strategy),
        }
    }

    /// Runs the strategy and unpacks the produced reference, which borrows
    /// from this provider.
    ///
    /// # Errors
    ///
    /// Returns whatever error the strategy reports.
    pub fn get_bean(&self, registry: &BeanRegistry) -> Result<&T, BeanError> {
        self.strategy
            .produce_ref(registry)
            .map(ValueContainer::into_inner)
    }
}

impl<T: Bean> Debug for TypedRefProvider<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TypedRefProvider")
            .field("type", &any::type_name::<&T>())
            .field("kind", &self.strategy.kind())
            .finish()
    }
}

impl<T: Bean> Provider for TypedRefProvider<T> {
    fn type_name(&self) -> &'static str {
        any::type_name::<&T>()
    }

    fn kind(&self) -> StrategyKind {
        self.strategy.kind()
    }
}

/// A single-value holder used to move a freshly produced bean out of a
/// [`CreationStrategy`] without the provider layer knowing how the value was
/// made.
///
/// [`CreationStrategy`]: crate::strategy::CreationStrategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueContainer<T> {
    value: T,
}

impl<T> ValueContainer<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::registry::BeanError;

/// The names of beans currently being resolved, kept apart per thread so
/// that nested `get_bean` calls on one thread can detect re-entrance without
/// being confused by resolutions running on another.
#[derive(Debug, Default)]
pub(super) struct ResolutionStacks {
    stacks: Mutex<HashMap<ThreadId, Vec<String>>>,
}

impl ResolutionStacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `name` onto the current thread's stack.
    ///
    /// Fails without pushing if `name` is already being resolved, carrying
    /// the whole in-flight chain followed by the repeated name. The returned
    /// guard pops the entry when dropped.
    pub fn enter(&self, name: &str) -> Result<ResolutionGuard<'_>, BeanError> {
        let on_thread = thread::current().id();
        let mut stacks = self.stacks.lock();
        let stack = stacks.entry(on_thread).or_default();

        if stack.iter().any(|entered| entered == name) {
            let mut trace = stack.clone();
            trace.push(name.to_owned());
            return Err(BeanError::BeanDependencyCycle { trace });
        }

        stack.push(name.to_owned());
        Ok(ResolutionGuard {
            owner: self,
            on_thread,
        })
    }

    pub fn current(&self) -> Vec<String> {
        let on_thread = thread::current().id();
        self.stacks
            .lock()
            .get(&on_thread)
            .cloned()
            .unwrap_or_default()
    }

    fn leave(&self, on_thread: ThreadId) {
        let mut stacks = self.stacks.lock();
        if let Some(stack) = stacks.get_mut(&on_thread) {
            stack.pop();
            if stack.is_empty() {
                stacks.remove(&on_thread);
            }
        }
    }
}

pub(super) struct ResolutionGuard<'a> {
    owner: &'a ResolutionStacks,
    on_thread: ThreadId,
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        self.owner.leave(self.on_thread);
    }
}

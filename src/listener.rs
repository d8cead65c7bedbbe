use crate::error::ListenerError;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A callback invoked after a state change with the old and the new state.
///
/// `old` is `None` only for the first reduction of a store that was built
/// without priming. Implemented for every closure with the matching
/// signature; see [`listener`] for building one without annotations.
pub trait Listener<S> {
    fn on_change(&self, old: Option<&Rc<S>>, new: &Rc<S>) -> Result<(), ListenerError>;
}

impl<S, F> Listener<S> for F
where
    F: Fn(Option<&Rc<S>>, &Rc<S>) -> Result<(), ListenerError>,
{
    fn on_change(&self, old: Option<&Rc<S>>, new: &Rc<S>) -> Result<(), ListenerError> {
        self(old, new)
    }
}

/// Wrap a closure as a shareable listener.
///
/// The returned `Rc` is the listener's identity: subscribing the same `Rc`
/// twice registers it once.
///
/// ```
/// use foldstore::listener;
/// use std::rc::Rc;
///
/// let log = listener::<u32, _>(|old, new| {
///     println!("{:?} -> {}", old.map(|s| **s), new);
///     Ok(())
/// });
/// let again = Rc::clone(&log);
/// assert!(Rc::ptr_eq(&log, &again));
/// ```
pub fn listener<S, F>(f: F) -> Rc<F>
where
    F: Fn(Option<&Rc<S>>, &Rc<S>) -> Result<(), ListenerError>,
{
    Rc::new(f)
}

pub(crate) type SharedListener<S> = Rc<dyn Listener<S>>;

/// Insertion-ordered set of listeners, keyed by `Rc` identity.
pub(crate) struct Registry<S> {
    listeners: Vec<SharedListener<S>>,
}

impl<S> Registry<S> {
    pub(crate) fn new() -> Self {
        Registry {
            listeners: Vec::new(),
        }
    }

    /// Returns `false` if the listener was already registered.
    pub(crate) fn insert(&mut self, listener: SharedListener<S>) -> bool {
        if self.position(&listener).is_some() {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    pub(crate) fn remove(&mut self, listener: &SharedListener<S>) -> bool {
        match self.position(listener) {
            Some(idx) => {
                self.listeners.remove(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Immutable copy of the current listeners, in subscription order.
    pub(crate) fn snapshot(&self) -> Vec<SharedListener<S>> {
        self.listeners.clone()
    }

    fn position(&self, listener: &SharedListener<S>) -> Option<usize> {
        self.listeners
            .iter()
            .position(|l| same_listener(l, listener))
    }
}

// Compare data pointers only; vtable pointers for one type may differ
// between codegen units.
fn same_listener<S>(a: &SharedListener<S>, b: &SharedListener<S>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Handle returned by [`Store::subscribe`](crate::Store::subscribe).
///
/// Holds the listener's identity and a weak reference to the store's
/// registry, so it never keeps the store alive. Dropping the handle does
/// **not** unsubscribe.
pub struct Unsubscribe<S> {
    registry: Weak<RefCell<Registry<S>>>,
    listener: SharedListener<S>,
}

impl<S> Unsubscribe<S> {
    pub(crate) fn new(registry: Weak<RefCell<Registry<S>>>, listener: SharedListener<S>) -> Self {
        Unsubscribe { registry, listener }
    }

    /// Remove the listener from the store.
    ///
    /// Returns `true` if the listener was registered. Calling this again, or
    /// after the store is gone, is a no-op that returns `false`.
    pub fn unsubscribe(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let removed = registry.borrow_mut().remove(&self.listener);
        if removed {
            log::debug!("listener unsubscribed");
        }
        removed
    }
}

impl<S> fmt::Debug for Unsubscribe<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("store_alive", &(self.registry.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> SharedListener<u8> {
        let l = listener::<u8, _>(|_, _| Ok(()));
        l
    }

    #[test]
    fn test_registry_rejects_same_rc() {
        let mut registry = Registry::new();
        let l = noop();
        assert!(registry.insert(Rc::clone(&l)));
        assert!(!registry.insert(Rc::clone(&l)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_keeps_distinct_closures() {
        let mut registry = Registry::new();
        registry.insert(noop());
        registry.insert(noop());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_registry_remove_missing_is_noop() {
        let mut registry = Registry::new();
        let l = noop();
        assert!(!registry.remove(&l));
        registry.insert(Rc::clone(&l));
        assert!(registry.remove(&l));
        assert!(!registry.remove(&l));
    }

    #[test]
    fn test_unsubscribe_after_registry_dropped() {
        let registry = Rc::new(RefCell::new(Registry::new()));
        let l = noop();
        registry.borrow_mut().insert(Rc::clone(&l));
        let handle = Unsubscribe::new(Rc::downgrade(&registry), l);
        drop(registry);
        assert!(!handle.unsubscribe());
    }
}

use crate::error::{ListenerError, StoreError};
use crate::listener::{Listener, Registry, SharedListener, Unsubscribe};
use crate::reducer::Reducer;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// What a store does when a listener returns an error during notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenerErrorPolicy {
    /// Log the failure, record it in [`Dispatch::failures`], and keep
    /// notifying the remaining listeners.
    #[default]
    Continue,
    /// Stop notifying and return [`StoreError::Listener`] from `dispatch`.
    /// The new state stays committed.
    Abort,
}

/// A listener failure isolated under [`ListenerErrorPolicy::Continue`].
#[derive(Debug)]
#[non_exhaustive]
pub struct ListenerFailure {
    /// Position of the listener in the notification pass.
    pub index: usize,
    pub error: ListenerError,
}

/// Outcome of a successful dispatch.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct Dispatch {
    /// Whether the reducer produced a new state (by the store's change
    /// detection). Listeners run only when this is `true`.
    pub changed: bool,
    /// Number of listeners called, failed ones included.
    pub notified: usize,
    pub failures: Vec<ListenerFailure>,
}

type ChangeFn<S> = fn(&Rc<S>, &Rc<S>) -> bool;

fn identity_changed<S>(old: &Rc<S>, new: &Rc<S>) -> bool {
    !Rc::ptr_eq(old, new)
}

fn value_changed<S: PartialEq>(old: &Rc<S>, new: &Rc<S>) -> bool {
    !Rc::ptr_eq(old, new) && **old != **new
}

struct Inner<S, A> {
    reducer: Box<dyn Reducer<S, A>>,
    state: RefCell<Option<Rc<S>>>,
    listeners: Rc<RefCell<Registry<S>>>,
    changed: ChangeFn<S>,
    on_listener_error: ListenerErrorPolicy,
}

/// The single authoritative holder of application state.
///
/// All mutation goes through [`dispatch`](Store::dispatch). `Store` is a
/// cheap handle: clones share the same state and listeners, which lets a
/// listener capture the store and dispatch from inside a notification. Such
/// a listener forms an `Rc` cycle with the store and lives until it is
/// unsubscribed.
///
/// The store is `!Send` and `!Sync`; it belongs to one thread.
///
/// # Examples
///
/// ```
/// use foldstore::{listener, ReduceError, Store};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// fn counter(state: Option<&Rc<i64>>, delta: Option<&i64>) -> Result<Rc<i64>, ReduceError> {
///     Ok(match (state, delta) {
///         (None, _) => Rc::new(0),
///         (Some(n), Some(&d)) if d != 0 => Rc::new(**n + d),
///         (Some(n), _) => Rc::clone(n),
///     })
/// }
///
/// let store = Store::create(counter).unwrap();
/// assert_eq!(*store.state().unwrap(), 0);
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
/// let unsubscribe = store.subscribe(listener(move |_old, new: &Rc<i64>| {
///     sink.borrow_mut().push(**new);
///     Ok(())
/// }));
///
/// store.dispatch(&5).unwrap();
/// store.dispatch(&0).unwrap(); // unchanged, no notification
/// unsubscribe.unsubscribe();
/// store.dispatch(&1).unwrap();
///
/// assert_eq!(*seen.borrow(), vec![5]);
/// assert_eq!(*store.state().unwrap(), 6);
/// ```
pub struct Store<S, A> {
    inner: Rc<Inner<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Store {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.inner.state.borrow())
            .field("listeners", &self.listener_count())
            .field("on_listener_error", &self.inner.on_listener_error)
            .finish()
    }
}

impl<S: 'static, A: 'static> Store<S, A> {
    /// Construct a store without computing any state.
    ///
    /// [`state`](Store::state) returns `None` until the first dispatch.
    /// Prefer [`Store::create`], which primes the store immediately.
    pub fn new(reducer: impl Reducer<S, A> + 'static) -> Self {
        Self::builder(reducer).build()
    }

    /// Construct a store and prime it with the init dispatch.
    ///
    /// The reducer is called once with `(None, None)` and its result becomes
    /// the initial state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Reducer`] if the init reduction fails.
    pub fn create(reducer: impl Reducer<S, A> + 'static) -> Result<Self, StoreError> {
        Self::builder(reducer).create()
    }

    /// Start configuring a store.
    pub fn builder(reducer: impl Reducer<S, A> + 'static) -> StoreBuilder<S, A> {
        StoreBuilder::new(reducer)
    }
}

impl<S, A> Store<S, A> {
    /// Returns the current state. Never runs the reducer.
    pub fn state(&self) -> Option<Rc<S>> {
        self.inner.state.borrow().clone()
    }

    /// Whether a reduction has ever been committed.
    pub fn is_initialized(&self) -> bool {
        self.inner.state.borrow().is_some()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Reduce `action` into the current state and notify listeners if the
    /// state changed.
    ///
    /// The reducer's result is stored even when it is the same `Rc` as
    /// before. Listeners are called synchronously, in subscription order,
    /// with `(previous, next)`, from a snapshot of the registry taken before
    /// the first call: listeners subscribed during the pass are skipped,
    /// listeners unsubscribed during the pass are still called.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Reducer`] if the reducer fails; the state is left as
    ///   it was.
    /// - [`StoreError::Listener`] if a listener fails and the store uses
    ///   [`ListenerErrorPolicy::Abort`].
    pub fn dispatch(&self, action: &A) -> Result<Dispatch, StoreError> {
        self.reduce(Some(action))
    }

    /// Dispatch the init action (`None`).
    ///
    /// [`Store::create`] calls this once; calling it again re-runs the
    /// reducer's init branch against the current state.
    pub fn dispatch_init(&self) -> Result<Dispatch, StoreError> {
        self.reduce(None)
    }

    /// Register `listener` and return a handle that removes it.
    ///
    /// Containment is by `Rc` identity: subscribing the same `Rc` again is a
    /// no-op, though a fresh handle is still returned.
    pub fn subscribe<L>(&self, listener: Rc<L>) -> Unsubscribe<S>
    where
        L: Listener<S> + 'static,
    {
        let listener: SharedListener<S> = listener;
        if self.inner.listeners.borrow_mut().insert(Rc::clone(&listener)) {
            log::debug!("listener subscribed ({} total)", self.listener_count());
        } else {
            log::debug!("listener already subscribed");
        }
        Unsubscribe::new(Rc::downgrade(&self.inner.listeners), listener)
    }

    fn reduce(&self, action: Option<&A>) -> Result<Dispatch, StoreError> {
        // No borrow may be held across the reducer or listeners: both may
        // reenter the store.
        let previous = self.inner.state.borrow().clone();
        let next = self.inner.reducer.reduce(previous.as_ref(), action)?;
        *self.inner.state.borrow_mut() = Some(Rc::clone(&next));

        let changed = match &previous {
            Some(prev) => (self.inner.changed)(prev, &next),
            None => true,
        };
        log::trace!(
            "dispatched {} action, state {}",
            if action.is_some() { "an" } else { "the init" },
            if changed { "changed" } else { "unchanged" }
        );

        let mut outcome = Dispatch {
            changed,
            ..Dispatch::default()
        };
        if !changed {
            return Ok(outcome);
        }

        let listeners = self.inner.listeners.borrow().snapshot();
        for (index, listener) in listeners.iter().enumerate() {
            outcome.notified += 1;
            let Err(error) = listener.on_change(previous.as_ref(), &next) else {
                continue;
            };
            match self.inner.on_listener_error {
                ListenerErrorPolicy::Abort => {
                    return Err(StoreError::Listener {
                        index,
                        source: error,
                    });
                }
                ListenerErrorPolicy::Continue => {
                    log::warn!("listener #{index} failed, continuing: {error}");
                    outcome.failures.push(ListenerFailure { index, error });
                }
            }
        }
        Ok(outcome)
    }
}

/// Create a primed store. Same as [`Store::create`].
pub fn create_store<S: 'static, A: 'static>(
    reducer: impl Reducer<S, A> + 'static,
) -> Result<Store<S, A>, StoreError> {
    Store::create(reducer)
}

/// Builder for configuring a [`Store`].
///
/// # Examples
///
/// ```
/// use foldstore::{ListenerErrorPolicy, ReduceError, Store};
/// use std::rc::Rc;
///
/// // Rebuilds the value on every action, so identity always changes.
/// fn clamp(state: Option<&Rc<u8>>, value: Option<&u8>) -> Result<Rc<u8>, ReduceError> {
///     let current = state.map(|s| **s).unwrap_or(0);
///     Ok(Rc::new(value.copied().unwrap_or(current).min(10)))
/// }
///
/// let store = Store::builder(clamp)
///     .compare_by_value()
///     .on_listener_error(ListenerErrorPolicy::Abort)
///     .create()
///     .unwrap();
///
/// assert!(store.dispatch(&42).unwrap().changed);
/// assert!(!store.dispatch(&42).unwrap().changed);
/// ```
pub struct StoreBuilder<S, A> {
    reducer: Box<dyn Reducer<S, A>>,
    changed: ChangeFn<S>,
    on_listener_error: ListenerErrorPolicy,
}

impl<S: 'static, A: 'static> StoreBuilder<S, A> {
    fn new(reducer: impl Reducer<S, A> + 'static) -> Self {
        StoreBuilder {
            reducer: Box::new(reducer),
            changed: identity_changed::<S>,
            on_listener_error: ListenerErrorPolicy::default(),
        }
    }

    /// Set the listener failure policy. Defaults to
    /// [`ListenerErrorPolicy::Continue`].
    pub fn on_listener_error(mut self, policy: ListenerErrorPolicy) -> Self {
        self.on_listener_error = policy;
        self
    }

    /// Build the store without priming it.
    pub fn build(self) -> Store<S, A> {
        Store {
            inner: Rc::new(Inner {
                reducer: self.reducer,
                state: RefCell::new(None),
                listeners: Rc::new(RefCell::new(Registry::new())),
                changed: self.changed,
                on_listener_error: self.on_listener_error,
            }),
        }
    }

    /// Build the store and run the init dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Reducer`] if the init reduction fails.
    pub fn create(self) -> Result<Store<S, A>, StoreError> {
        let store = self.build();
        store.dispatch_init()?;
        Ok(store)
    }
}

impl<S: PartialEq + 'static, A: 'static> StoreBuilder<S, A> {
    /// Treat a new `Rc` holding an equal value as "unchanged".
    ///
    /// By default change detection is by `Rc` identity only, so a reducer
    /// that rebuilds an equal value still notifies listeners.
    pub fn compare_by_value(mut self) -> Self {
        self.changed = value_changed::<S>;
        self
    }
}

impl<S, A> fmt::Debug for StoreBuilder<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreBuilder")
            .field("on_listener_error", &self.on_listener_error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReduceError;

    fn latest(state: Option<&Rc<u32>>, value: Option<&u32>) -> Result<Rc<u32>, ReduceError> {
        match (state, value) {
            (Some(s), Some(v)) if **s == *v => Ok(Rc::clone(s)),
            (_, Some(v)) => Ok(Rc::new(*v)),
            (Some(s), None) => Ok(Rc::clone(s)),
            (None, None) => Ok(Rc::new(0)),
        }
    }

    #[test]
    fn test_new_does_not_reduce() {
        let store = Store::new(latest);
        assert!(!store.is_initialized());
        assert!(store.state().is_none());
    }

    #[test]
    fn test_first_dispatch_on_unprimed_store_is_a_change() {
        let store = Store::new(latest);
        let outcome = store.dispatch_init().unwrap();
        assert!(outcome.changed);
        assert!(store.is_initialized());
    }

    #[test]
    fn test_unchanged_state_is_still_stored() {
        let store = Store::create(latest).unwrap();
        let before = store.state().unwrap();
        let outcome = store.dispatch(&0).unwrap();
        assert!(!outcome.changed);
        assert!(Rc::ptr_eq(&before, &store.state().unwrap()));
    }

    #[test]
    fn test_clones_share_state() {
        let store = Store::create(latest).unwrap();
        let other = store.clone();
        other.dispatch(&9).unwrap();
        assert_eq!(*store.state().unwrap(), 9);
    }

    #[test]
    fn test_identity_and_value_change_fns() {
        let a = Rc::new(1);
        let b = Rc::new(1);
        assert!(identity_changed(&a, &b));
        assert!(!identity_changed(&a, &Rc::clone(&a)));
        assert!(!value_changed(&a, &b));
        assert!(value_changed(&a, &Rc::new(2)));
    }
}

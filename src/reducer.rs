use crate::error::ReduceError;
use std::rc::Rc;

/// A pure function computing the next state from the previous state and an
/// action.
///
/// `state` is `None` before the store's first reduction; `action` is `None`
/// for the init dispatch that primes a store. Reducers must not mutate their
/// input. Returning a clone of the incoming `Rc` signals "unchanged", a
/// freshly allocated `Rc` signals "changed" — the store compares identities,
/// not values.
///
/// Implemented for every closure and fn item with the matching signature.
///
/// # Examples
///
/// ```
/// use foldstore::{ReduceError, Reducer};
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
/// let zero = counter.reduce(None, None).unwrap();
/// assert_eq!(*zero, 0);
/// let same = counter.reduce(Some(&zero), Some(&0)).unwrap();
/// assert!(Rc::ptr_eq(&zero, &same));
/// ```
pub trait Reducer<S, A> {
    /// Reduce `action` into `state`.
    fn reduce(&self, state: Option<&Rc<S>>, action: Option<&A>) -> Result<Rc<S>, ReduceError>;
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(Option<&Rc<S>>, Option<&A>) -> Result<Rc<S>, ReduceError>,
{
    fn reduce(&self, state: Option<&Rc<S>>, action: Option<&A>) -> Result<Rc<S>, ReduceError> {
        self(state, action)
    }
}

/// Wrap a closure as a reducer.
///
/// Gives the compiler the reducer signature up front, so closure parameters
/// need no reference annotations once `S` and `A` are known.
///
/// ```
/// use foldstore::{reducer, Reducer};
/// use std::rc::Rc;
///
/// let toggle = reducer::<bool, (), _>(|state, _action| {
///     Ok(Rc::new(!state.map(|s| **s).unwrap_or(true)))
/// });
/// assert!(!*toggle.reduce(None, None).unwrap());
/// ```
pub fn reducer<S, A, F>(f: F) -> F
where
    F: Fn(Option<&Rc<S>>, Option<&A>) -> Result<Rc<S>, ReduceError>,
{
    f
}

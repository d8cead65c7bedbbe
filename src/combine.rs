//! Building one reducer out of many named sub-reducers.
//!
//! Each sub-reducer owns one *slice* of a composite state. Slices are stored
//! type-erased as [`Slice`] (`Rc<dyn Any>`) so sub-reducers of different
//! state types can live side by side; each sub-reducer sees its own slice
//! with its concrete type.
//!
//! ```
//! use foldstore::{combine, ReduceError, Store};
//! use std::rc::Rc;
//!
//! fn clicks(state: Option<&Rc<u32>>, action: Option<&&'static str>) -> Result<Rc<u32>, ReduceError> {
//!     Ok(match (state, action) {
//!         (None, _) => Rc::new(0),
//!         (Some(n), Some(&"click")) => Rc::new(**n + 1),
//!         (Some(n), _) => Rc::clone(n),
//!     })
//! }
//!
//! fn last(state: Option<&Rc<String>>, action: Option<&&'static str>) -> Result<Rc<String>, ReduceError> {
//!     Ok(match action {
//!         Some(a) => Rc::new(a.to_string()),
//!         None => state.cloned().unwrap_or_default(),
//!     })
//! }
//!
//! let app = combine().slice("clicks", clicks).slice("last", last).build();
//! let store = Store::create(app).unwrap();
//! store.dispatch(&"click").unwrap();
//!
//! let state = store.state().unwrap();
//! assert_eq!(*state.get::<u32>("clicks").unwrap(), 1);
//! assert_eq!(*state.get::<String>("last").unwrap(), "click");
//! ```

use crate::error::ReduceError;
use crate::reducer::Reducer;
use std::any::{Any, type_name};
use std::fmt;
use std::rc::Rc;

/// A type-erased slice of composite state.
pub type Slice = Rc<dyn Any>;

/// Ordered mapping from field name to slice.
///
/// The composite state produced by [`Combine::build`], and the input handed
/// to the state factory of [`Combine::build_with`].
#[derive(Clone, Default)]
pub struct Slices {
    entries: Vec<(String, Slice)>,
}

impl Slices {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Slices::default()
    }

    /// Append a slice, or replace the value of an existing name in place.
    pub fn insert(&mut self, name: impl Into<String>, slice: Slice) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = slice,
            None => self.entries.push((name, slice)),
        }
    }

    /// Returns the type-erased slice for `name`.
    pub fn get_raw(&self, name: &str) -> Option<&Slice> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, slice)| slice)
    }

    /// Returns the slice for `name` if it exists and holds a `T`.
    pub fn get<T: 'static>(&self, name: &str) -> Option<Rc<T>> {
        self.get_raw(name)
            .and_then(|slice| Rc::clone(slice).downcast::<T>().ok())
    }

    /// Like [`get`](Slices::get), but reports why the slice is unavailable.
    /// Meant for state factories.
    ///
    /// # Errors
    ///
    /// [`ReduceError::MissingSlice`] if `name` is absent,
    /// [`ReduceError::SliceType`] if it holds another type.
    pub fn require<T: 'static>(&self, name: &str) -> Result<Rc<T>, ReduceError> {
        let slice = self.get_raw(name).ok_or_else(|| ReduceError::MissingSlice {
            name: name.to_string(),
        })?;
        downcast(name, slice)
    }

    /// Field names in declared order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// `(name, slice)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slice)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Slices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Slice values are opaque; show the shape only.
        f.debug_list().entries(self.names()).finish()
    }
}

/// Named read access to the slices of a composite state.
///
/// A combined reducer uses this to read each field's current slice before
/// calling its sub-reducer. Implement it for the state type built by a
/// [`Combine::build_with`] factory, returning the field that was built from
/// the slice of the same name.
///
/// ```
/// use foldstore::{Slice, SliceAccess};
/// use std::rc::Rc;
///
/// struct Counters {
///     left: Rc<u32>,
///     right: Rc<u32>,
/// }
///
/// impl SliceAccess for Counters {
///     fn slice(&self, name: &str) -> Option<Slice> {
///         match name {
///             "left" => Some(self.left.clone()),
///             "right" => Some(self.right.clone()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait SliceAccess {
    fn slice(&self, name: &str) -> Option<Slice>;
}

impl SliceAccess for Slices {
    fn slice(&self, name: &str) -> Option<Slice> {
        self.get_raw(name).cloned()
    }
}

type ErasedReducer<A> = Box<dyn Fn(Option<&Slice>, Option<&A>) -> Result<Slice, ReduceError>>;
type Factory<S> = Box<dyn Fn(Slices) -> Result<S, ReduceError>>;

fn downcast<T: 'static>(name: &str, slice: &Slice) -> Result<Rc<T>, ReduceError> {
    Rc::clone(slice)
        .downcast::<T>()
        .map_err(|_| ReduceError::SliceType {
            name: name.to_string(),
            expected: type_name::<T>(),
        })
}

/// Start combining sub-reducers for action type `A`.
pub fn combine<A: 'static>() -> Combine<A> {
    Combine {
        reducers: Vec::new(),
    }
}

/// Builder returned by [`combine`].
pub struct Combine<A> {
    reducers: Vec<(String, ErasedReducer<A>)>,
}

impl<A: 'static> Combine<A> {
    /// Add the sub-reducer owning slice `name`.
    ///
    /// Names are unique: adding a name twice replaces the earlier reducer but
    /// keeps its position.
    pub fn slice<T, R>(mut self, name: impl Into<String>, reducer: R) -> Self
    where
        T: 'static,
        R: Reducer<T, A> + 'static,
    {
        let name = name.into();
        let key = name.clone();
        let erased: ErasedReducer<A> = Box::new(move |slice, action| {
            let current = slice.map(|s| downcast::<T>(&key, s)).transpose()?;
            let next: Slice = reducer.reduce(current.as_ref(), action)?;
            Ok(next)
        });
        match self.reducers.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = erased,
            None => self.reducers.push((name, erased)),
        }
        self
    }

    /// Finish with [`Slices`] as the composite state.
    pub fn build(self) -> Combined<Slices, A> {
        self.build_with(Ok)
    }

    /// Finish with a state factory that assembles the composite state from
    /// the freshly computed slices.
    pub fn build_with<S, F>(self, factory: F) -> Combined<S, A>
    where
        S: SliceAccess,
        F: Fn(Slices) -> Result<S, ReduceError> + 'static,
    {
        Combined {
            reducers: self.reducers,
            factory: Box::new(factory),
        }
    }
}

impl<A> fmt::Debug for Combine<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.reducers.iter().map(|(n, _)| n))
            .finish()
    }
}

/// A reducer built from named sub-reducers.
///
/// Every reduction returns a freshly allocated composite state, even when
/// every sub-reducer returned its slice unchanged, so a store running a
/// combined reducer sees a change on every dispatch. Unchanged slices keep
/// their identity inside the new composite.
///
/// An absent composite state, or a name the composite does not expose,
/// hands `None` to that field's sub-reducer.
pub struct Combined<S, A> {
    reducers: Vec<(String, ErasedReducer<A>)>,
    factory: Factory<S>,
}

impl<S, A> Combined<S, A> {
    /// Field names in declared order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.reducers.iter().map(|(n, _)| n.as_str())
    }
}

impl<S: SliceAccess, A> Reducer<S, A> for Combined<S, A> {
    fn reduce(&self, state: Option<&Rc<S>>, action: Option<&A>) -> Result<Rc<S>, ReduceError> {
        let mut slices = Slices {
            entries: Vec::with_capacity(self.reducers.len()),
        };
        for (name, reducer) in &self.reducers {
            let current = state.and_then(|s| s.slice(name));
            let next = reducer(current.as_ref(), action)?;
            slices.entries.push((name.clone(), next));
        }
        Ok(Rc::new((self.factory)(slices)?))
    }
}

impl<S, A> fmt::Debug for Combined<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

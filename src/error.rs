use thiserror::Error;

/// A boxed, thread-safe error raised by application code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by a listener during change notification.
///
/// Any error type converts into it with `?` or `.into()`, so a listener can
/// simply write `Err("disk full".into())`.
pub type ListenerError = BoxError;

/// Error raised by a reducer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReduceError {
    /// The reducer refused the action.
    #[error("{0}")]
    Rejected(String),

    /// A combined reducer found a slice that is not of its sub-reducer's
    /// state type.
    #[error("slice `{name}` does not hold a value of type `{expected}`")]
    SliceType {
        name: String,
        expected: &'static str,
    },

    /// A state factory asked for a slice the combined reducer did not produce.
    #[error("slice `{name}` is missing")]
    MissingSlice { name: String },

    /// Any other application error.
    #[error(transparent)]
    Other(#[from] BoxError),
}

impl ReduceError {
    /// Shorthand for [`ReduceError::Rejected`].
    pub fn rejected(reason: impl Into<String>) -> Self {
        ReduceError::Rejected(reason.into())
    }
}

/// Error returned by [`Store::dispatch`](crate::Store::dispatch).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The reducer failed. The store's state is unchanged.
    #[error("reducer failed: {0}")]
    Reducer(#[from] ReduceError),

    /// A listener failed and the store is configured with
    /// [`ListenerErrorPolicy::Abort`](crate::ListenerErrorPolicy::Abort).
    /// The new state has already been committed.
    #[error("listener #{index} failed: {source}")]
    Listener {
        index: usize,
        #[source]
        source: ListenerError,
    },
}

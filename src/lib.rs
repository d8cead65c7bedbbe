mod action;
pub mod combine;
mod error;
mod listener;
mod reducer;
mod store;

pub use action::Action;
pub use combine::{combine, Combine, Combined, Slice, SliceAccess, Slices};
pub use error::{BoxError, ListenerError, ReduceError, StoreError};
pub use listener::{listener, Listener, Unsubscribe};
pub use reducer::{reducer, Reducer};
pub use store::{
    create_store, Dispatch, ListenerErrorPolicy, ListenerFailure, Store, StoreBuilder,
};

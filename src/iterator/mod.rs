//! The collapsing user-key iterator and the pieces it is built from.
//!
//! `InternalIterator` is the black-box contract the core consumes;
//! `VecIterator` is the only concrete implementation of it this crate ships,
//! for tests and for anyone wiring this core on top of an in-memory source.
//! `UserIterator` is the core itself.

mod internal;
mod kind;
mod user_iterator;
mod vec_iterator;

pub use internal::InternalIterator;
pub use kind::Kind;
pub use user_iterator::{IteratorOptions, UserIterator};
pub use vec_iterator::{Record, VecIterator};

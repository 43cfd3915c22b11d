//! An incremental, bidirectional iterator that collapses a versioned
//! internal record stream into one logical entry per live user key.
//!
//! The pieces below are the minimal collaborator set the core iterator
//! needs: a [`comparator::Comparator`] for key order, a
//! [`merge::MergeOperator`] to fold mergeable updates, an
//! [`iterator::InternalIterator`] as the black-box source it collapses, and
//! a [`snapshot::Snapshot`] pinning the version it reads through. Everything
//! else — the underlying store, how the internal iterator itself merges
//! multiple sources — is out of scope for this crate.

pub mod comparator;
pub mod iterator;
pub mod merge;
pub mod snapshot;
pub mod util;

pub use comparator::{BytewiseComparator, Comparator};
pub use iterator::{InternalIterator, IteratorOptions, Kind, Record, UserIterator, VecIterator};
pub use merge::{MergeOperator, StringAppendMerge};
pub use snapshot::Snapshot;
pub use util::{Code, Result, Slice, Status};

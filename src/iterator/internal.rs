use crate::util::Result;

/// The black-box cursor `UserIterator` collapses.
///
/// This is the contract spec.md §6 assigns to "the internal iterator": a
/// single merged, ordered view over however many underlying sources
/// (memtables, sorted files, ...) a real store combines, already decoded
/// down to `(user_key, kind_byte, value)` triples. How that merge happens is
/// explicitly out of scope for this core (spec.md §1) — `rucksdb`'s own
/// `MergingIterator` is a stub for exactly this reason, and this crate's
/// `VecIterator` exists only to give the core something concrete to run
/// against in tests.
///
/// Seeks and repositioning return nothing: per spec.md §6, exhaustion and
/// corruption are both observed only by `valid()` turning false afterward,
/// never by a distinguishing return value. `next`/`prev` report whether they
/// moved, matching the source's `Next() -> bool` / `Prev() -> bool`.
pub trait InternalIterator {
    fn seek_ge(&mut self, target: &[u8]);
    fn seek_lt(&mut self, target: &[u8]);
    fn first(&mut self);
    fn last(&mut self);

    /// Prerequisite: `valid()`. Returns `true` if the cursor moved to
    /// another record, `false` if it ran off the end.
    fn next(&mut self) -> bool;

    /// Prerequisite: `valid()`. Returns `true` if the cursor moved to
    /// another record, `false` if it ran off the beginning.
    fn prev(&mut self) -> bool;

    fn valid(&self) -> bool;

    /// Prerequisite: `valid()`. The kind byte is decoded by the caller (see
    /// `Kind::from_byte`) rather than here, so that an unrecognized
    /// discriminant surfaces as this layer's own corruption error instead of
    /// panicking inside the internal iterator.
    fn key(&self) -> (&[u8], u8);

    /// Prerequisite: `valid()`. Valid only until the next mutating call.
    fn value(&self) -> &[u8];

    /// Idempotent. `UserIterator::close` adopts this error under the
    /// asymmetric rule documented in spec.md §4.6/§9.
    fn close(&mut self) -> Result<()>;
}

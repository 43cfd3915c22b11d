use crate::iterator::internal::InternalIterator;
use crate::iterator::kind::Kind;
use crate::util::{Result, Status};

/// A single entry as fed into `VecIterator`: one version of a user key.
pub type Record = (Vec<u8>, u8, Vec<u8>);

/// An in-memory `InternalIterator` over a pre-sorted slice of records.
///
/// Grounded in `rucksdb::iterator::MemTableIterator`'s role relative to the
/// (stubbed) `MergingIterator` in the teacher crate: a simple, concrete
/// source that lets the collapsing logic above it be exercised without a
/// real storage engine underneath. Records must already be supplied in
/// final internal order — ascending by user key, and newest-first within
/// each user key — exactly as the merged view of multiple LSM sources would
/// present them; `VecIterator` does no merging or sequence-number filtering
/// of its own.
///
/// Kind bytes are accepted as raw `u8` rather than `Kind` so tests can
/// construct a corrupt record (an unrecognized discriminant) to exercise
/// `UserIterator`'s corruption path.
pub struct VecIterator {
    records: Vec<Record>,
    pos: Option<usize>,
    close_err: Option<Status>,
}

impl VecIterator {
    pub fn new(records: Vec<Record>) -> Self {
        VecIterator {
            records,
            pos: None,
            close_err: None,
        }
    }

    /// Convenience constructor for tests: builds records tagged with a
    /// well-formed `Kind` instead of a raw byte.
    pub fn from_kinds(records: Vec<(Vec<u8>, Kind, Vec<u8>)>) -> Self {
        VecIterator::new(
            records
                .into_iter()
                .map(|(k, kind, v)| (k, kind.as_byte(), v))
                .collect(),
        )
    }

    /// Makes `close()` fail, to exercise `UserIterator::close`'s asymmetric
    /// error-adoption rule (spec.md §4.6/§9).
    pub fn fail_close(mut self, status: Status) -> Self {
        self.close_err = Some(status);
        self
    }

    fn first_ge(&self, target: &[u8]) -> usize {
        self.records.partition_point(|(k, _, _)| k.as_slice() < target)
    }
}

impl InternalIterator for VecIterator {
    fn seek_ge(&mut self, target: &[u8]) {
        let idx = self.first_ge(target);
        self.pos = (idx < self.records.len()).then_some(idx);
    }

    fn seek_lt(&mut self, target: &[u8]) {
        let idx = self.first_ge(target);
        self.pos = idx.checked_sub(1);
    }

    fn first(&mut self) {
        self.pos = (!self.records.is_empty()).then_some(0);
    }

    fn last(&mut self) {
        self.pos = self.records.len().checked_sub(1);
    }

    fn next(&mut self) -> bool {
        match self.pos {
            Some(i) if i + 1 < self.records.len() => {
                self.pos = Some(i + 1);
                true
            }
            _ => {
                self.pos = None;
                false
            }
        }
    }

    fn prev(&mut self) -> bool {
        match self.pos {
            Some(i) if i > 0 => {
                self.pos = Some(i - 1);
                true
            }
            _ => {
                self.pos = None;
                false
            }
        }
    }

    fn valid(&self) -> bool {
        self.pos.is_some()
    }

    fn key(&self) -> (&[u8], u8) {
        let (k, kind, _) = &self.records[self.pos.expect("key() called while invalid")];
        (k.as_slice(), *kind)
    }

    fn value(&self) -> &[u8] {
        let (_, _, v) = &self.records[self.pos.expect("value() called while invalid")];
        v.as_slice()
    }

    fn close(&mut self) -> Result<()> {
        self.pos = None;
        match self.close_err.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

use crate::comparator::Comparator;
use crate::iterator::internal::InternalIterator;
use crate::iterator::kind::Kind;
use crate::merge::MergeOperator;
use crate::snapshot::Snapshot;
use crate::util::{Result, Slice, Status};

/// Where the inner cursor sits relative to the emitted user key.
///
/// The crucial abstraction spec.md §9 calls out: without it, a direction
/// change right after a merge fold (which leaves the inner cursor parked on
/// the *next* key, not the emitted one) would skip or repeat a key. There is
/// no way to recover this by peeking at the inner iterator after the fact —
/// it has to be tracked explicitly through every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pos {
    /// Inner points at (a record of) the emitted user key.
    Cur,
    /// Inner points at the first record of the key strictly greater than emitted.
    Next,
    /// Inner points at the first (newest) record of the key strictly less than emitted.
    Prev,
}

/// Bounds and injected collaborators for a `UserIterator`.
///
/// Modeled on the plain-struct-with-`Default` convention this corpus uses for
/// read-time knobs (`rucksdb::db::db::ReadOptions`) rather than a builder.
pub struct IteratorOptions<C, M> {
    pub lower_bound: Option<Vec<u8>>,
    pub upper_bound: Option<Vec<u8>>,
    pub comparator: C,
    pub merge_operator: M,
}

impl<C: Default, M: Default> Default for IteratorOptions<C, M> {
    fn default() -> Self {
        IteratorOptions {
            lower_bound: None,
            upper_bound: None,
            comparator: C::default(),
            merge_operator: M::default(),
        }
    }
}

/// Collapses a versioned internal record stream into one logical entry per
/// live user key, in either direction.
///
/// This is the whole of the design problem the rest of this crate exists to
/// support: `cmp` and `merge` are injected collaborators, `inner` is the
/// black-box cursor from `iterator::internal`, and everything below is the
/// incremental, bidirectional bookkeeping that keeps those pieces in sync
/// with what the caller has been told is the current key.
pub struct UserIterator<I, C, M> {
    inner: I,
    cmp: C,
    merge: M,
    lower_bound: Option<Vec<u8>>,
    upper_bound: Option<Vec<u8>>,
    snapshot: Option<Snapshot>,

    err: Option<Status>,
    valid: bool,
    pos: Pos,

    key_buf: Slice,
    value_buf: Slice,
    value_buf2: Slice,
    /// true if `value_buf2` currently holds the live value (reverse-merge
    /// role swap); false if `value_buf` does, or if the exposed value
    /// aliases the inner iterator's own slice instead of either buffer.
    value_in_buf2: bool,
    /// true if the currently exposed value aliases a buffer at all, as
    /// opposed to the inner iterator's live slice (only the forward `Set`
    /// case aliases the inner directly).
    value_owned: bool,
}

impl<I, C, M> UserIterator<I, C, M>
where
    I: InternalIterator,
    C: Comparator,
    M: MergeOperator,
{
    pub fn new(inner: I, opts: IteratorOptions<C, M>, snapshot: Option<Snapshot>) -> Self {
        UserIterator {
            inner,
            cmp: opts.comparator,
            merge: opts.merge_operator,
            lower_bound: opts.lower_bound,
            upper_bound: opts.upper_bound,
            snapshot,
            err: None,
            valid: false,
            pos: Pos::Cur,
            key_buf: Slice::empty(),
            value_buf: Slice::empty(),
            value_buf2: Slice::empty(),
            value_in_buf2: false,
            value_owned: false,
        }
    }

    pub fn valid(&self) -> bool {
        self.valid
    }

    pub fn error(&self) -> Option<&Status> {
        self.err.as_ref()
    }

    pub fn key(&self) -> Option<&[u8]> {
        self.valid.then(|| self.key_buf.data())
    }

    pub fn value(&self) -> Option<&[u8]> {
        if !self.valid {
            return None;
        }
        Some(if self.value_owned {
            if self.value_in_buf2 {
                self.value_buf2.data()
            } else {
                self.value_buf.data()
            }
        } else {
            self.inner.value()
        })
    }

    fn below_lower(&self, key: &[u8]) -> bool {
        match &self.lower_bound {
            Some(lb) => self.cmp.lt(key, lb),
            None => false,
        }
    }

    fn at_or_above_upper(&self, key: &[u8]) -> bool {
        match &self.upper_bound {
            Some(ub) => self.cmp.ge(key, ub),
            None => false,
        }
    }

    fn fail(&mut self, status: Status) {
        self.err = Some(status);
        self.valid = false;
    }

    fn has_err(&self) -> bool {
        self.err.is_some()
    }

    // ---- public cursor operations -----------------------------------

    pub fn seek_ge(&mut self, target: &[u8]) {
        if self.has_err() {
            return;
        }
        let raised;
        let target = match &self.lower_bound {
            Some(lb) if self.cmp.lt(target, lb) => {
                raised = lb.clone();
                raised.as_slice()
            }
            _ => target,
        };
        self.inner.seek_ge(target);
        self.find_next_entry();
    }

    pub fn seek_lt(&mut self, target: &[u8]) {
        if self.has_err() {
            return;
        }
        let lowered;
        let target = match &self.upper_bound {
            Some(ub) if self.cmp.ge(target, ub) => {
                lowered = ub.clone();
                lowered.as_slice()
            }
            _ => target,
        };
        self.inner.seek_lt(target);
        self.find_prev_entry();
    }

    pub fn first(&mut self) {
        if self.has_err() {
            return;
        }
        if let Some(lb) = self.lower_bound.clone() {
            self.seek_ge(&lb);
            return;
        }
        self.inner.first();
        self.find_next_entry();
    }

    pub fn last(&mut self) {
        if self.has_err() {
            return;
        }
        if let Some(ub) = self.upper_bound.clone() {
            self.seek_lt(&ub);
            return;
        }
        self.inner.last();
        self.find_prev_entry();
    }

    pub fn next(&mut self) -> bool {
        if self.has_err() {
            return false;
        }
        match self.pos {
            Pos::Cur => self.next_user_key(),
            Pos::Prev => {
                self.next_user_key();
                self.next_user_key();
            }
            Pos::Next => {}
        }
        self.find_next_entry();
        self.valid
    }

    pub fn prev(&mut self) -> bool {
        if self.has_err() {
            return false;
        }
        match self.pos {
            Pos::Cur => self.prev_user_key(),
            Pos::Next => {
                self.prev_user_key();
                self.prev_user_key();
            }
            Pos::Prev => {}
        }
        self.find_prev_entry();
        self.valid
    }

    pub fn close(&mut self) -> Result<()> {
        self.snapshot.take();
        let inner_result = self.inner.close();
        if let Err(inner_err) = inner_result {
            if self.err.is_some() {
                self.err = Some(inner_err);
            }
        }
        self.valid = false;
        match &self.err {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    // ---- key-boundary stepping ----------------------------------------

    /// Steps the inner iterator forward until the user key changes (or it
    /// exhausts). Repositions to `First` when called while invalid, so that
    /// `Next` after exhaustion restarts correctly (spec.md §4.4).
    fn next_user_key(&mut self) {
        if !self.inner.valid() {
            self.inner.first();
            return;
        }
        let (start_key, _) = self.inner.key();
        let start_key = start_key.to_vec();
        while self.inner.valid() {
            let (k, _) = self.inner.key();
            if !self.cmp.eq(k, &start_key) {
                return;
            }
            if !self.inner.next() {
                return;
            }
        }
    }

    fn prev_user_key(&mut self) {
        if !self.inner.valid() {
            self.inner.last();
            return;
        }
        let (start_key, _) = self.inner.key();
        let start_key = start_key.to_vec();
        while self.inner.valid() {
            let (k, _) = self.inner.key();
            if !self.cmp.eq(k, &start_key) {
                return;
            }
            if !self.inner.prev() {
                return;
            }
        }
    }

    // ---- forward collapse ----------------------------------------------

    /// `findNextEntry`: precondition is that the inner sits at the newest
    /// record of some candidate key, or is exhausted. Dispatches on that
    /// record's kind; Delete and RangeDelete loop around, Set and Merge
    /// terminate the search (possibly via the merge-next loop).
    fn find_next_entry(&mut self) {
        self.valid = false;
        loop {
            if !self.inner.valid() {
                self.pos = Pos::Cur;
                return;
            }
            let (k, kind_byte) = self.inner.key();
            if self.at_or_above_upper(k) {
                self.pos = Pos::Cur;
                return;
            }
            let kind = match Kind::from_byte(kind_byte) {
                Some(k) => k,
                None => {
                    self.fail(Status::corruption(format!(
                        "unrecognized internal key kind: {kind_byte}"
                    )));
                    return;
                }
            };
            match kind {
                Kind::Delete => {
                    self.next_user_key();
                    continue;
                }
                Kind::RangeDelete => {
                    self.inner.next();
                    continue;
                }
                Kind::Set => {
                    self.key_buf.assign(k);
                    self.value_owned = false;
                    self.valid = true;
                    self.pos = Pos::Cur;
                    return;
                }
                Kind::Merge => {
                    self.merge_next();
                    return;
                }
            }
        }
    }

    /// `mergeNext`: folds newer-to-older within one user key after the
    /// newest record turned out to be a Merge.
    fn merge_next(&mut self) {
        let (k, _) = self.inner.key();
        self.key_buf.assign(k);
        self.value_buf.assign(self.inner.value());
        self.value_owned = true;
        self.value_in_buf2 = false;

        loop {
            if !self.inner.next() {
                self.valid = true;
                self.pos = Pos::Next;
                return;
            }
            let (k2, kind_byte) = self.inner.key();
            if !self.cmp.eq(k2, self.key_buf.data()) {
                self.valid = true;
                self.pos = Pos::Next;
                return;
            }
            let kind = match Kind::from_byte(kind_byte) {
                Some(k) => k,
                None => {
                    self.fail(Status::corruption(format!(
                        "unrecognized internal key kind: {kind_byte}"
                    )));
                    return;
                }
            };
            match kind {
                Kind::Delete => {
                    self.valid = true;
                    self.pos = Pos::Cur;
                    return;
                }
                Kind::RangeDelete => continue,
                Kind::Set | Kind::Merge => {
                    // Forward walk encounters newest-to-oldest within a key:
                    // the just-read record is older than whatever is held.
                    let folded = match self.merge.merge(
                        self.key_buf.data(),
                        self.inner.value(),
                        self.value_buf.data(),
                    ) {
                        Ok(v) => v,
                        Err(_) => {
                            self.fail(Status::merge_error("merge operator failed"));
                            return;
                        }
                    };
                    self.value_buf.assign(&folded);
                    if kind == Kind::Set {
                        self.valid = true;
                        self.pos = Pos::Cur;
                        return;
                    }
                }
            }
        }
    }

    // ---- reverse collapse -----------------------------------------------

    /// `findPrevEntry`: walks backward through the already-newest-first
    /// per-key ordering, which means stepping backward across a key
    /// boundary lands on that key's *oldest* record. Accumulates oldest-to-
    /// newest until the boundary before the held key is crossed, then emits.
    fn find_prev_entry(&mut self) {
        self.valid = false;
        let mut held_key: Option<Vec<u8>> = None;

        loop {
            if !self.inner.valid() {
                self.pos = Pos::Prev;
                return;
            }
            let (k, kind_byte) = self.inner.key();
            if self.below_lower(k) {
                self.pos = Pos::Prev;
                return;
            }

            if self.valid {
                if let Some(hk) = &held_key {
                    if self.cmp.lt(k, hk) {
                        self.pos = Pos::Prev;
                        return;
                    }
                }
            }

            let kind = match Kind::from_byte(kind_byte) {
                Some(k) => k,
                None => {
                    self.fail(Status::corruption(format!(
                        "unrecognized internal key kind: {kind_byte}"
                    )));
                    return;
                }
            };

            match kind {
                Kind::Delete => {
                    self.valid = false;
                    held_key = Some(k.to_vec());
                    self.value_owned = false;
                }
                Kind::RangeDelete => {}
                Kind::Set => {
                    self.key_buf.assign(k);
                    self.value_buf.assign(self.inner.value());
                    self.value_owned = true;
                    self.value_in_buf2 = false;
                    self.valid = true;
                    held_key = Some(k.to_vec());
                }
                Kind::Merge => {
                    if !self.valid {
                        self.key_buf.assign(k);
                        self.value_buf.assign(self.inner.value());
                        self.value_owned = true;
                        self.value_in_buf2 = false;
                        self.valid = true;
                    } else {
                        // Reverse walk encounters oldest-to-newest within a
                        // key: whatever is held is older than this record.
                        let (held, scratch_is_buf2) = if self.value_in_buf2 {
                            (self.value_buf2.data(), false)
                        } else {
                            (self.value_buf.data(), true)
                        };
                        let folded =
                            match self.merge.merge(k, held, self.inner.value()) {
                                Ok(v) => v,
                                Err(_) => {
                                    self.fail(Status::merge_error("merge operator failed"));
                                    return;
                                }
                            };
                        if scratch_is_buf2 {
                            self.value_buf2.assign(&folded);
                            self.value_in_buf2 = true;
                        } else {
                            self.value_buf.assign(&folded);
                            self.value_in_buf2 = false;
                        }
                    }
                    held_key = Some(k.to_vec());
                }
            }

            if !self.inner.prev() {
                self.pos = Pos::Prev;
                return;
            }
        }
    }
}

use crate::util::Result;

/// Folds a user key's version chain into a single value.
///
/// Unlike a RocksDB-style `full_merge(key, base, operands[])` operator that
/// sees the whole chain at once, this core calls `merge` one pair at a time
/// as it walks the chain — newest-to-older in the forward direction,
/// oldest-to-newer in reverse (see the forward/reverse collapse docs on
/// `UserIterator`). `older` and `newer` name the operands by their position
/// in version order, not by which one the core happens to be holding in a
/// buffer at the time.
///
/// Implementations must be associative: `merge(k, merge(k, a, b), c)` must
/// equal `merge(k, a, merge(k, b, c))` for the chain to collapse to the same
/// result regardless of which direction it was discovered in. Whether they
/// must also be commutative is a narrower question the core does not answer
/// on an implementor's behalf — see the note on reverse-merge argument order
/// in `UserIterator::find_prev_entry`.
pub trait MergeOperator: Send + Sync {
    /// A short name for diagnostics; not interpreted by the core.
    fn name(&self) -> &str;

    /// Combine `older` (the earlier-written operand) with `newer` (written
    /// later) for `key`, in that order, regardless of which direction the
    /// fold was discovered in.
    fn merge(&self, key: &[u8], older: &[u8], newer: &[u8]) -> Result<Vec<u8>>;
}

/// Concatenates operands with a fixed delimiter, oldest-to-newest.
///
/// The example operator used throughout this crate's tests. It is
/// associative for any delimiter, which is what makes it safe to exercise
/// with both forward and reverse collapse.
pub struct StringAppendMerge {
    delimiter: Vec<u8>,
}

impl StringAppendMerge {
    pub fn new(delimiter: impl Into<Vec<u8>>) -> Self {
        StringAppendMerge {
            delimiter: delimiter.into(),
        }
    }
}

impl Default for StringAppendMerge {
    fn default() -> Self {
        StringAppendMerge::new(Vec::new())
    }
}

impl MergeOperator for StringAppendMerge {
    fn name(&self) -> &str {
        "StringAppendMerge"
    }

    fn merge(&self, _key: &[u8], older: &[u8], newer: &[u8]) -> Result<Vec<u8>> {
        let mut result = Vec::with_capacity(older.len() + self.delimiter.len() + newer.len());
        result.extend_from_slice(older);
        if !older.is_empty() && !newer.is_empty() {
            result.extend_from_slice(&self.delimiter);
        }
        result.extend_from_slice(newer);
        Ok(result)
    }
}

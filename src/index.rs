use core::{cmp::Ordering, ops::Range};

use tracing::debug;

use crate::{
    error::{Result, StateViolation, Violation},
    item::{Id, Record, Timestamp, INFINITY},
    monoid::{xor::Fingerprint, Monoid},
    protocol::bound::BoundKey,
};

/// One party's records.
///
/// Records are appended in any order while building, then sorted once by
/// [`seal`](Index::seal). Only a sealed index answers queries.
#[derive(Debug, Clone, Default)]
pub struct Index<const W: usize> {
    records: Vec<Record<W>>,
    sealed: bool,
}

impl<const W: usize> Index<W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            sealed: false,
        }
    }

    /// Builds and seals an index in one go.
    pub fn from_records<I: IntoIterator<Item = Record<W>>>(records: I) -> Result<Self> {
        let mut index = Self::new();
        for Record { timestamp, id } in records {
            index.insert(timestamp, id)?;
        }
        index.seal()?;
        Ok(index)
    }

    pub fn insert(&mut self, timestamp: Timestamp, id: Id<W>) -> Result<()> {
        if self.sealed {
            return Err(StateViolation::InsertAfterSeal.into());
        }
        if timestamp == INFINITY {
            return Err(Violation::ReservedTimestamp(timestamp).into());
        }

        self.records.push(Record::new(timestamp, id));
        Ok(())
    }

    /// Sorts the records and drops exact duplicates.
    pub fn seal(&mut self) -> Result<()> {
        if self.sealed {
            return Err(StateViolation::AlreadySealed.into());
        }

        let inserted = self.records.len();
        self.records.sort_unstable();
        self.records.dedup();
        self.sealed = true;

        debug!(
            records = self.records.len(),
            duplicates = inserted - self.records.len(),
            "sealed index"
        );
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> Result<&[Record<W>]> {
        if !self.sealed {
            return Err(StateViolation::NotSealed.into());
        }
        Ok(&self.records)
    }

    /// Returns the index range of records `r` with `lower <= r < upper`.
    ///
    /// Both searches start at `hint`, which lets the ranges of one message be
    /// resolved with a single left-to-right sweep.
    pub fn range_bounds(
        &self,
        lower: &BoundKey,
        upper: &BoundKey,
        hint: usize,
    ) -> Result<Range<usize>> {
        let records = self.records()?;
        let hint = hint.min(records.len());

        let start =
            hint + records[hint..].partition_point(|r| lower.cmp_record(r) == Ordering::Greater);
        let end =
            start + records[start..].partition_point(|r| upper.cmp_record(r) == Ordering::Greater);

        Ok(start..end)
    }

    /// XOR of the ids in `range`.
    pub fn fingerprint(&self, range: Range<usize>) -> Result<Fingerprint<W>> {
        let records = self.records()?;
        let run = records
            .get(range.clone())
            .ok_or(StateViolation::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: records.len(),
            })?;

        Ok(run.iter().fold(Fingerprint::neutral(), |acc, r| {
            acc.combine(&Fingerprint::lift(&r.id))
        }))
    }
}

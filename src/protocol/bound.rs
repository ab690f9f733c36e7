//! Bound keys and the delta-compressed timestamp stream that carries them.

use core::cmp::Ordering;

use crate::{
    error::{Field, Result, Violation},
    item::{Record, Timestamp, INFINITY},
};

use super::encoding::{write_varint, Cursor};

/// Delimits a sub-range on the wire. Only the id bytes needed to separate two
/// neighbouring records are kept, so a bound rarely matches a record exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundKey {
    timestamp: Timestamp,
    prefix: Vec<u8>,
}

impl BoundKey {
    pub fn new(timestamp: Timestamp, prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp,
            prefix: prefix.into(),
        }
    }

    /// Less than or equal to every record.
    pub fn min() -> Self {
        Self::new(0, Vec::new())
    }

    /// Greater than every record.
    pub fn infinity() -> Self {
        Self::new(INFINITY, Vec::new())
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn is_infinity(&self) -> bool {
        self.timestamp == INFINITY
    }

    /// The shortest key `k` with `prev < k <= curr`.
    ///
    /// `prev` must sort strictly before `curr`.
    pub fn minimal_between<const W: usize>(prev: &Record<W>, curr: &Record<W>) -> Self {
        if prev.timestamp != curr.timestamp {
            return Self::new(curr.timestamp, Vec::new());
        }

        let shared = prev
            .id
            .as_bytes()
            .iter()
            .zip(curr.id.as_bytes())
            .take_while(|(a, b)| a == b)
            .count();
        let len = (shared + 1).min(W);

        Self::new(curr.timestamp, &curr.id.as_bytes()[..len])
    }

    /// Compares a record against this key. A prefix sorts before every id
    /// that extends it.
    pub fn cmp_record<const W: usize>(&self, record: &Record<W>) -> Ordering {
        self.timestamp
            .cmp(&record.timestamp)
            .then_with(|| self.prefix.as_slice().cmp(&record.id.as_bytes()[..]))
    }
}

/// Outgoing half of the timestamp stream of one message.
#[derive(Debug, Default, Clone)]
pub struct TimestampEncoder {
    last: Timestamp,
    infinite: bool,
}

impl TimestampEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, out: &mut Vec<u8>, timestamp: Timestamp) -> Result<()> {
        if self.infinite || timestamp == INFINITY {
            self.infinite = true;
            write_varint(out, 0);
            return Ok(());
        }

        let delta = timestamp
            .checked_sub(self.last)
            .ok_or(Violation::TimestampRegression {
                previous: self.last,
                next: timestamp,
            })?;

        // timestamp < INFINITY, so delta + 1 cannot overflow
        write_varint(out, delta + 1);
        self.last = timestamp;
        Ok(())
    }
}

/// Incoming half of the timestamp stream of one message.
#[derive(Debug, Default, Clone)]
pub struct TimestampDecoder {
    last: Timestamp,
    infinite: bool,
}

impl TimestampDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, cursor: &mut Cursor<'_>) -> Result<Timestamp> {
        let wire = cursor.read_varint()?;
        if self.infinite || wire == 0 {
            self.infinite = true;
            return Ok(INFINITY);
        }

        let timestamp = self
            .last
            .checked_add(wire - 1)
            .ok_or(Violation::TimestampOverflow)?;
        if timestamp == INFINITY {
            self.infinite = true;
        }
        self.last = timestamp;
        Ok(timestamp)
    }
}

pub fn write_bound(
    out: &mut Vec<u8>,
    timestamps: &mut TimestampEncoder,
    bound: &BoundKey,
) -> Result<()> {
    timestamps.encode(out, bound.timestamp)?;
    write_varint(out, bound.prefix.len() as u64);
    out.extend_from_slice(&bound.prefix);
    Ok(())
}

pub fn read_bound<const W: usize>(
    cursor: &mut Cursor<'_>,
    timestamps: &mut TimestampDecoder,
) -> Result<BoundKey> {
    let timestamp = timestamps.decode(cursor)?;
    let len = cursor.read_varint()?;
    if len > W as u64 {
        return Err(Violation::IdPrefixTooLong { len, max: W }.into());
    }
    let prefix = cursor.read_bytes(len as usize, Field::IdPrefix)?;
    Ok(BoundKey::new(timestamp, prefix))
}

use crate::{
    error::{Error, Field, Result, Violation},
    item::Id,
    monoid::xor::Fingerprint,
};

use super::{
    bound::{read_bound, write_bound, BoundKey, TimestampDecoder, TimestampEncoder},
    encoding::{write_varint, Cursor},
};

/// Mode of a range that carries a fingerprint.
pub const MODE_FINGERPRINT: u64 = 0;
/// Modes at or above this carry `mode - MODE_ID_LIST` ids. Modes in between
/// are reserved.
pub const MODE_ID_LIST: u64 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<const W: usize> {
    Fingerprint(Fingerprint<W>),
    IdList(Vec<Id<W>>),
}

impl<const W: usize> Payload<W> {
    pub fn mode(&self) -> u64 {
        match self {
            Payload::Fingerprint(_) => MODE_FINGERPRINT,
            Payload::IdList(ids) => MODE_ID_LIST + ids.len() as u64,
        }
    }
}

/// One range of a message: the half-open key range `[lower, upper)` and what
/// the sender knows about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeDescriptor<const W: usize> {
    pub lower: BoundKey,
    pub upper: BoundKey,
    pub payload: Payload<W>,
}

/// Builds a message, carrying the outgoing timestamp state between ranges.
#[derive(Debug, Default)]
pub struct MessageWriter<const W: usize> {
    buf: Vec<u8>,
    timestamps: TimestampEncoder,
    ranges: usize,
}

impl<const W: usize> MessageWriter<W> {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            timestamps: TimestampEncoder::new(),
            ranges: 0,
        }
    }

    pub fn push(&mut self, range: &RangeDescriptor<W>) -> Result<()> {
        match &range.payload {
            Payload::Fingerprint(fp) => self.push_fingerprint(&range.lower, &range.upper, fp),
            Payload::IdList(ids) => self.push_id_list(&range.lower, &range.upper, ids),
        }
    }

    pub fn push_fingerprint(
        &mut self,
        lower: &BoundKey,
        upper: &BoundKey,
        fp: &Fingerprint<W>,
    ) -> Result<()> {
        self.push_bounds(lower, upper)?;
        write_varint(&mut self.buf, MODE_FINGERPRINT);
        self.buf.extend_from_slice(fp.as_bytes());
        Ok(())
    }

    pub fn push_id_list<'i, I>(
        &mut self,
        lower: &BoundKey,
        upper: &BoundKey,
        ids: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = &'i Id<W>>,
        I::IntoIter: ExactSizeIterator,
    {
        let ids = ids.into_iter();
        self.push_bounds(lower, upper)?;
        write_varint(&mut self.buf, MODE_ID_LIST + ids.len() as u64);
        for id in ids {
            self.buf.extend_from_slice(id.as_bytes());
        }
        Ok(())
    }

    fn push_bounds(&mut self, lower: &BoundKey, upper: &BoundKey) -> Result<()> {
        write_bound(&mut self.buf, &mut self.timestamps, lower)?;
        write_bound(&mut self.buf, &mut self.timestamps, upper)?;
        self.ranges += 1;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn range_count(&self) -> usize {
        self.ranges
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Parses ranges one at a time. Stops after the first error.
#[derive(Debug, Clone)]
pub struct MessageReader<'a, const W: usize> {
    cursor: Cursor<'a>,
    timestamps: TimestampDecoder,
    failed: bool,
}

impl<'a, const W: usize> MessageReader<'a, W> {
    pub fn new(msg: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(msg),
            timestamps: TimestampDecoder::new(),
            failed: false,
        }
    }

    fn read_range(&mut self) -> Result<RangeDescriptor<W>> {
        let lower = read_bound::<W>(&mut self.cursor, &mut self.timestamps)?;
        let upper = read_bound::<W>(&mut self.cursor, &mut self.timestamps)?;

        let payload = match self.cursor.read_varint()? {
            MODE_FINGERPRINT => {
                let bytes = self.cursor.read_array::<W>(Field::Fingerprint)?;
                Payload::Fingerprint(Fingerprint::from_bytes(bytes))
            }
            mode if mode >= MODE_ID_LIST => {
                let count = usize::try_from(mode - MODE_ID_LIST)
                    .map_err(|_| Error::TruncatedBuffer(Field::IdList))?;
                // never trust the count for the allocation
                let mut ids = Vec::with_capacity(count.min(self.cursor.remaining() / W.max(1)));
                for _ in 0..count {
                    ids.push(Id(self.cursor.read_array::<W>(Field::IdList)?));
                }
                Payload::IdList(ids)
            }
            mode => return Err(Violation::UnknownMode(mode).into()),
        };

        Ok(RangeDescriptor {
            lower,
            upper,
            payload,
        })
    }
}

impl<'a, const W: usize> Iterator for MessageReader<'a, W> {
    type Item = Result<RangeDescriptor<W>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_empty() {
            return None;
        }

        let res = self.read_range();
        self.failed = res.is_err();
        Some(res)
    }
}

pub fn encode_message<const W: usize>(ranges: &[RangeDescriptor<W>]) -> Result<Vec<u8>> {
    let mut writer = MessageWriter::new();
    for range in ranges {
        writer.push(range)?;
    }
    Ok(writer.finish())
}

pub fn decode_message<const W: usize>(msg: &[u8]) -> Result<Vec<RangeDescriptor<W>>> {
    MessageReader::new(msg).collect()
}

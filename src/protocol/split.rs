use core::ops::Range;

use crate::{
    config::Config,
    error::{Result, StateViolation},
    index::Index,
};

use super::{bound::BoundKey, message::MessageWriter};

/// Writes our view of a mismatching range to `out`.
///
/// Small ranges are sent as an explicit id list. Larger ones are cut into
/// `config.buckets` runs of near-equal size (the first `n % buckets` runs get
/// one extra record), each sent with its fingerprint. The outer edges keep
/// the bounds we were given, inner edges get minimal bound keys.
pub fn split<const W: usize>(
    index: &Index<W>,
    range: Range<usize>,
    lower: &BoundKey,
    upper: &BoundKey,
    config: &Config,
    out: &mut MessageWriter<W>,
) -> Result<()> {
    config.validate()?;
    let records = index.records()?;
    if range.start > range.end || range.end > records.len() {
        return Err(StateViolation::RangeOutOfBounds {
            start: range.start,
            end: range.end,
            len: records.len(),
        }
        .into());
    }
    let n = range.len();

    if n < config.skip_threshold {
        return out.push_id_list(lower, upper, records[range].iter().map(|r| &r.id));
    }

    let buckets = config.buckets;
    let per_bucket = n / buckets;
    let with_extra = n % buckets;

    let mut curr = range.start;
    let mut bucket_lower = lower.clone();

    for i in 0..buckets {
        let end = curr + per_bucket + usize::from(i < with_extra);
        let fp = index.fingerprint(curr..end)?;

        let bucket_upper = if i == buckets - 1 {
            upper.clone()
        } else {
            BoundKey::minimal_between(&records[end - 1], &records[end])
        };

        out.push_fingerprint(&bucket_lower, &bucket_upper, &fp)?;

        bucket_lower = bucket_upper;
        curr = end;
    }

    Ok(())
}

use serde::{Deserialize, Serialize};

use super::{id::Id, Timestamp};

/// A single element of a reconciled set.
///
/// The derived ordering is the protocol's ordering key: timestamp first, ties
/// broken by the id's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Record<const W: usize> {
    pub timestamp: Timestamp,
    pub id: Id<W>,
}

impl<const W: usize> Record<W> {
    pub fn new(timestamp: Timestamp, id: Id<W>) -> Self {
        Self { timestamp, id }
    }
}

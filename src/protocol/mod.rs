//! The reconciliation engine.
//!
//! A message is a sequence of ranges tiling the whole key space. For every
//! range the receiver either agrees (matching fingerprint), narrows it down
//! (splits it and answers with its own fingerprints), or settles it (the
//! sender listed its ids, so the difference can be read off directly).

pub mod bound;
pub mod encoding;
pub mod message;
pub mod split;

use std::collections::HashMap;

use tracing::{debug, trace};

pub use bound::BoundKey;
pub use message::{
    decode_message, encode_message, MessageReader, MessageWriter, Payload, RangeDescriptor,
};
pub use split::split;

use crate::{config::Config, error::Result, index::Index, item::Id};

/// The outcome of processing one incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<const W: usize> {
    /// The reply for the peer. Empty once every range is settled.
    pub output: Vec<u8>,
    /// Ids we hold that the peer lacks.
    pub have: Vec<Id<W>>,
    /// Ids the peer holds that we lack.
    pub need: Vec<Id<W>>,
}

impl<const W: usize> Reconciliation<W> {
    pub fn is_converged(&self) -> bool {
        self.output.is_empty()
    }
}

/// Opens a negotiation: one range over the whole key space, carrying the
/// fingerprint of every record we hold.
pub fn initial_message<const W: usize>(index: &Index<W>) -> Result<Vec<u8>> {
    let fp = index.fingerprint(0..index.records()?.len())?;

    let mut out = MessageWriter::new();
    out.push_fingerprint(&BoundKey::min(), &BoundKey::infinity(), &fp)?;
    Ok(out.finish())
}

/// Answers `msg` from the point of view of `index`.
///
/// The index is never modified. If any part of `msg` fails to decode, the
/// whole message is rejected and nothing is returned. So is a `config` that
/// fails [`Config::validate`].
pub fn reconcile<const W: usize>(
    index: &Index<W>,
    msg: &[u8],
    config: &Config,
) -> Result<Reconciliation<W>> {
    config.validate()?;
    let records = index.records()?;

    let mut out = MessageWriter::new();
    let mut have = vec![];
    let mut need = vec![];
    let mut prev_upper = 0;
    let mut incoming = 0;

    for range in MessageReader::<W>::new(msg) {
        let RangeDescriptor {
            lower,
            upper,
            payload,
        } = range?;
        incoming += 1;

        let found = index.range_bounds(&lower, &upper, prev_upper)?;
        prev_upper = found.end;

        match payload {
            Payload::Fingerprint(theirs) => {
                let ours = index.fingerprint(found.clone())?;
                if ours == theirs {
                    trace!(?lower, ?upper, "fingerprint match");
                    continue;
                }

                trace!(?lower, ?upper, records = found.len(), "fingerprint mismatch");
                split(index, found, &lower, &upper, config, &mut out)?;
            }
            Payload::IdList(their_ids) => {
                // position in their list, so needs come out in wire order
                let mut theirs: HashMap<Id<W>, usize> = HashMap::with_capacity(their_ids.len());
                for (i, id) in their_ids.iter().enumerate() {
                    theirs.entry(*id).or_insert(i);
                }
                let mut matched = vec![false; their_ids.len()];

                for record in &records[found] {
                    match theirs.get(&record.id) {
                        Some(&i) => matched[i] = true,
                        None => have.push(record.id),
                    }
                }

                need.extend(
                    their_ids
                        .iter()
                        .enumerate()
                        .filter(|(i, id)| !matched[*i] && theirs.get(*id) == Some(i))
                        .map(|(_, id)| *id),
                );
            }
        }
    }

    debug!(
        incoming,
        outgoing = out.range_count(),
        bytes_in = msg.len(),
        bytes_out = out.len(),
        have = have.len(),
        need = need.len(),
        "reconciled message"
    );

    Ok(Reconciliation {
        output: out.finish(),
        have,
        need,
    })
}

//! Drives two in-process parties to convergence.
//!
//! A deployment with real peers replaces this loop with message delivery over
//! its own transport. The per-message contract of
//! [`reconcile`](crate::protocol::reconcile) stays the same.

use tracing::{debug, info};

use crate::{
    config::Config,
    error::{Error, Result},
    index::Index,
    item::Id,
    protocol::{initial_message, reconcile},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Party {
    A,
    B,
}

impl Party {
    pub fn peer(self) -> Self {
        match self {
            Party::A => Party::B,
            Party::B => Party::A,
        }
    }
}

impl core::fmt::Display for Party {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Party::A => f.write_str("A"),
            Party::B => f.write_str("B"),
        }
    }
}

/// One call to `reconcile`, seen from the party that made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange<const W: usize> {
    pub party: Party,
    /// Ids `party` holds and its peer lacks.
    pub have: Vec<Id<W>>,
    /// Ids the peer holds and `party` lacks.
    pub need: Vec<Id<W>>,
    pub bytes_in: usize,
    pub bytes_out: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport<const W: usize> {
    /// Size of the opening message sent by A.
    pub initial_bytes: usize,
    pub exchanges: Vec<Exchange<W>>,
}

impl<const W: usize> SessionReport<W> {
    pub fn have(&self, party: Party) -> impl Iterator<Item = &Id<W>> + '_ {
        self.exchanges
            .iter()
            .filter(move |e| e.party == party)
            .flat_map(|e| e.have.iter())
    }

    pub fn need(&self, party: Party) -> impl Iterator<Item = &Id<W>> + '_ {
        self.exchanges
            .iter()
            .filter(move |e| e.party == party)
            .flat_map(|e| e.need.iter())
    }

    /// Ids held by `party` but not by its peer, whichever side found them.
    pub fn only_at(&self, party: Party) -> impl Iterator<Item = &Id<W>> + '_ {
        self.have(party).chain(self.need(party.peer()))
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.len()
    }

    pub fn bytes_transferred(&self) -> usize {
        self.initial_bytes + self.exchanges.iter().map(|e| e.bytes_out).sum::<usize>()
    }
}

/// Two sealed indexes and the parameters they reconcile with.
#[derive(Debug)]
pub struct Session<'a, const W: usize> {
    a: &'a Index<W>,
    b: &'a Index<W>,
    config: Config,
}

impl<'a, const W: usize> Session<'a, W> {
    pub fn new(a: &'a Index<W>, b: &'a Index<W>, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { a, b, config })
    }

    fn index(&self, party: Party) -> &'a Index<W> {
        match party {
            Party::A => self.a,
            Party::B => self.b,
        }
    }

    /// A opens, then B and A take turns until one of them has nothing left
    /// to send. Any error ends the session; a retry starts from scratch.
    pub fn run(&self) -> Result<SessionReport<W>> {
        let mut query = initial_message(self.a)?;
        let mut report = SessionReport {
            initial_bytes: query.len(),
            exchanges: vec![],
        };

        let mut party = Party::B;
        while !query.is_empty() {
            if report.exchanges.len() >= self.config.max_exchanges {
                return Err(Error::ExchangeLimitExceeded {
                    limit: self.config.max_exchanges,
                });
            }

            let res = reconcile(self.index(party), &query, &self.config)?;
            debug!(
                %party,
                have = res.have.len(),
                need = res.need.len(),
                bytes_out = res.output.len(),
                "exchange"
            );

            report.exchanges.push(Exchange {
                party,
                have: res.have,
                need: res.need,
                bytes_in: query.len(),
                bytes_out: res.output.len(),
            });

            query = res.output;
            party = party.peer();
        }

        info!(
            exchanges = report.exchange_count(),
            bytes = report.bytes_transferred(),
            only_a = report.only_at(Party::A).count(),
            only_b = report.only_at(Party::B).count(),
            "session converged"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use sha2::{Digest, Sha256};

    use crate::item::Record;

    fn id(b: u8) -> Id<16> {
        Id([b; 16])
    }

    fn hashed(i: u32) -> Id<16> {
        let digest = Sha256::digest(i.to_be_bytes());
        Id::from_slice(&digest[..16]).unwrap()
    }

    #[test]
    fn disjoint_single_records() {
        let a = Index::from_records([Record::new(100, id(0xaa))]).unwrap();
        let b = Index::from_records([Record::new(100, id(0xbb))]).unwrap();

        let report = Session::new(&a, &b, Config::default()).unwrap().run().unwrap();

        assert_eq!(report.exchange_count(), 2);
        assert_eq!(report.exchanges[0].party, Party::B);
        assert!(report.exchanges[0].have.is_empty());
        assert!(report.exchanges[0].need.is_empty());

        assert_eq!(report.exchanges[1].party, Party::A);
        assert_eq!(report.exchanges[1].have, vec![id(0xaa)]);
        assert_eq!(report.exchanges[1].need, vec![id(0xbb)]);
        assert_eq!(report.exchanges[1].bytes_out, 0);

        assert_eq!(report.only_at(Party::A).collect::<Vec<_>>(), vec![&id(0xaa)]);
        assert_eq!(report.only_at(Party::B).collect::<Vec<_>>(), vec![&id(0xbb)]);
    }

    #[test]
    fn identical_collections_take_one_exchange() {
        let records: Vec<_> = (0..1000u32)
            .map(|i| {
                let mut bytes = [0u8; 16];
                bytes[..4].copy_from_slice(&i.to_be_bytes());
                Record::new(u64::from(i) * 10, Id(bytes))
            })
            .collect();
        let a = Index::from_records(records.iter().copied()).unwrap();
        let b = Index::from_records(records).unwrap();

        let report = Session::new(&a, &b, Config::default()).unwrap().run().unwrap();
        assert_eq!(report.exchange_count(), 1);
        assert!(report.exchanges[0].have.is_empty());
        assert!(report.exchanges[0].need.is_empty());
        assert_eq!(report.bytes_transferred(), report.initial_bytes);
    }

    #[test]
    fn both_empty() {
        let a = Index::<16>::from_records([]).unwrap();
        let b = Index::<16>::from_records([]).unwrap();
        let report = Session::new(&a, &b, Config::default()).unwrap().run().unwrap();
        assert_eq!(report.exchange_count(), 1);
    }

    #[test]
    fn one_side_empty() {
        let a = Index::<16>::from_records([]).unwrap();
        let b = Index::from_records((0..100u32).map(|i| Record::new(u64::from(i), hashed(i)))).unwrap();

        let report = Session::new(&a, &b, Config::default()).unwrap().run().unwrap();
        assert_eq!(report.only_at(Party::B).count(), 100);
        assert_eq!(report.only_at(Party::A).count(), 0);
    }

    #[test]
    fn exchange_limit() {
        let a = Index::<16>::from_records([Record::new(1, id(1))]).unwrap();
        let b = Index::<16>::from_records([Record::new(1, id(2))]).unwrap();
        let config = Config {
            max_exchanges: 1,
            ..Config::default()
        };

        let err = Session::new(&a, &b, config).unwrap().run().unwrap_err();
        assert!(matches!(err, Error::ExchangeLimitExceeded { limit: 1 }));
    }

    #[test]
    fn rejects_invalid_config() {
        let a = Index::<16>::from_records([]).unwrap();
        assert!(matches!(
            Session::new(&a, &a, Config::with_buckets(0)),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn unsealed_index_fails_the_session() {
        let a = Index::<16>::from_records([Record::new(1, id(1))]).unwrap();
        let b = Index::<16>::new();
        let err = Session::new(&a, &b, Config::default()).unwrap().run().unwrap_err();
        assert!(matches!(err, Error::StateViolation(_)));
    }
}

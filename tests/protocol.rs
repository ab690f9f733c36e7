use std::collections::BTreeSet;

use xorsync::{ingest, Config, Id, Index, Party, Record, Session};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

fn random_records(rng: &mut ChaCha8Rng, n: usize, max_ts: u64) -> Vec<Record<16>> {
    (0..n)
        .map(|_| {
            let mut id = Id::default();
            rng.fill(&mut id.0);
            Record::new(rng.gen_range(0..max_ts), id)
        })
        .collect()
}

fn ids(records: &[Record<16>]) -> BTreeSet<Id<16>> {
    records.iter().map(|r| r.id).collect()
}

#[test]
fn sync_10k_records() {
    let mut rng = ChaCha8Rng::from_seed([23u8; 32]);
    let shared = random_records(&mut rng, 10_000, 1_000_000);
    let alices = random_records(&mut rng, 25, 1_000_000);
    let bobs = random_records(&mut rng, 25, 1_000_000);

    let alice = Index::from_records(shared.iter().chain(&alices).copied()).unwrap();
    let bob = Index::from_records(shared.iter().chain(&bobs).copied()).unwrap();

    let report = Session::new(&alice, &bob, Config::default())
        .unwrap()
        .run()
        .unwrap();

    let only_alice: BTreeSet<_> = report.only_at(Party::A).copied().collect();
    let only_bob: BTreeSet<_> = report.only_at(Party::B).copied().collect();

    assert_eq!(report.only_at(Party::A).count(), alices.len());
    assert_eq!(report.only_at(Party::B).count(), bobs.len());
    assert_eq!(only_alice, ids(&alices));
    assert_eq!(only_bob, ids(&bobs));

    assert!(
        report.exchange_count() <= 8,
        "took {} exchanges",
        report.exchange_count()
    );
    // a full id listing of either side alone would be far larger
    assert!(report.bytes_transferred() < 10_000 * 16);
}

#[test]
fn sync_with_shared_timestamps() {
    // every record at the same instant, so bounds have to carry id prefixes
    let mut rng = ChaCha8Rng::from_seed([42u8; 32]);
    let shared = random_records(&mut rng, 2_000, 1);
    let alices = random_records(&mut rng, 10, 1);
    let bobs = random_records(&mut rng, 3, 1);

    let alice = Index::from_records(shared.iter().chain(&alices).copied()).unwrap();
    let bob = Index::from_records(shared.iter().chain(&bobs).copied()).unwrap();

    let report = Session::new(&alice, &bob, Config::with_buckets(4))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(
        report.only_at(Party::A).copied().collect::<BTreeSet<_>>(),
        ids(&alices)
    );
    assert_eq!(
        report.only_at(Party::B).copied().collect::<BTreeSet<_>>(),
        ids(&bobs)
    );
}

#[test]
fn identical_sets_agree_immediately() {
    let mut rng = ChaCha8Rng::from_seed([7u8; 32]);
    let records = random_records(&mut rng, 1_000, 1_000_000);

    let a = Index::from_records(records.iter().copied()).unwrap();
    let b = Index::from_records(records).unwrap();

    let report = Session::new(&a, &b, Config::default()).unwrap().run().unwrap();
    assert_eq!(report.exchange_count(), 1);
    assert_eq!(report.only_at(Party::A).count(), 0);
    assert_eq!(report.only_at(Party::B).count(), 0);
}

#[test]
fn disjoint_single_records() {
    let a = Index::from_records([Record::new(100, Id([0xaa; 16]))]).unwrap();
    let b = Index::from_records([Record::new(100, Id([0xbb; 16]))]).unwrap();

    let report = Session::new(&a, &b, Config::default()).unwrap().run().unwrap();

    assert_eq!(report.exchange_count(), 2);
    assert_eq!(report.have(Party::A).collect::<Vec<_>>(), [&Id([0xaa; 16])]);
    assert_eq!(report.need(Party::A).collect::<Vec<_>>(), [&Id([0xbb; 16])]);
    assert_eq!(report.have(Party::B).count(), 0);
    assert_eq!(report.need(Party::B).count(), 0);
}

#[test]
fn loads_and_syncs_text_input() {
    let mut input = String::new();
    let mut expected_a = BTreeSet::new();
    let mut expected_b = BTreeSet::new();

    for i in 0..500u32 {
        let digest = Sha256::digest(i.to_be_bytes());
        let id = Id::<16>::from_slice(&digest[..16]).unwrap();
        let holder = match i % 50 {
            0 => {
                expected_a.insert(id);
                1
            }
            1 | 2 => {
                expected_b.insert(id);
                2
            }
            _ => 3,
        };
        input.push_str(&format!("{holder},{},{id}\n", 1_000 + u64::from(i / 3)));
    }

    let mut a = Index::new();
    let mut b = Index::new();
    assert_eq!(ingest::load(input.as_bytes(), &mut a, &mut b).unwrap(), 500);
    a.seal().unwrap();
    b.seal().unwrap();

    let report = Session::new(&a, &b, Config::default()).unwrap().run().unwrap();
    assert_eq!(
        report.only_at(Party::A).copied().collect::<BTreeSet<_>>(),
        expected_a
    );
    assert_eq!(
        report.only_at(Party::B).copied().collect::<BTreeSet<_>>(),
        expected_b
    );
}

//! Loads two parties' records from the text format used by the harness.
//!
//! Each line is `holder,timestamp,hex_id` where holder `1` is party A, `2`
//! is party B and `3` is both. Blank lines are skipped.

use std::io::BufRead;

use tracing::debug;

use crate::{
    error::{Error, Result, Violation},
    index::Index,
    item::{Id, Timestamp},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Holder {
    A,
    B,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<const W: usize> {
    pub holder: Holder,
    pub timestamp: Timestamp,
    pub id: Id<W>,
}

fn malformed(line: usize, reason: impl Into<String>) -> Error {
    Violation::MalformedLine {
        line,
        reason: reason.into(),
    }
    .into()
}

/// Parses one line. `line_no` only labels errors.
pub fn parse_line<const W: usize>(line: &str, line_no: usize) -> Result<Entry<W>> {
    let fields: Vec<&str> = line.trim().split(',').collect();
    let [holder, timestamp, id] = fields[..] else {
        return Err(malformed(
            line_no,
            format!("expected 3 fields, got {}", fields.len()),
        ));
    };

    let holder = match holder {
        "1" => Holder::A,
        "2" => Holder::B,
        "3" => Holder::Both,
        other => return Err(malformed(line_no, format!("unknown holder {other:?}"))),
    };

    let timestamp = timestamp
        .parse()
        .map_err(|e| malformed(line_no, format!("bad timestamp {timestamp:?}: {e}")))?;

    let id = Id::from_hex(id).map_err(|e| malformed(line_no, e.to_string()))?;

    Ok(Entry {
        holder,
        timestamp,
        id,
    })
}

/// Reads every line of `reader` into `a` and `b`. Returns the number of
/// entries read. Stops at the first malformed line.
pub fn load<const W: usize, R: BufRead>(
    reader: R,
    a: &mut Index<W>,
    b: &mut Index<W>,
) -> Result<usize> {
    let mut entries = 0;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let Entry {
            holder,
            timestamp,
            id,
        } = parse_line::<W>(&line, i + 1)?;

        if matches!(holder, Holder::A | Holder::Both) {
            a.insert(timestamp, id)?;
        }
        if matches!(holder, Holder::B | Holder::Both) {
            b.insert(timestamp, id)?;
        }
        entries += 1;
    }

    debug!(entries, a = a.len(), b = b.len(), "loaded records");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::item::Record;

    #[test]
    fn parses_each_holder() {
        let entry = parse_line::<2>("1,100,aabb", 1).unwrap();
        assert_eq!(
            entry,
            Entry {
                holder: Holder::A,
                timestamp: 100,
                id: Id([0xaa, 0xbb]),
            }
        );
        assert_eq!(parse_line::<2>("2,0,0000", 1).unwrap().holder, Holder::B);
        assert_eq!(parse_line::<2>("3,5,ffff\r", 1).unwrap().holder, Holder::Both);
    }

    fn reason(err: Error) -> (usize, String) {
        match err {
            Error::ProtocolViolation(Violation::MalformedLine { line, reason }) => (line, reason),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_lines() {
        let (line, msg) = reason(parse_line::<2>("1,100", 4).unwrap_err());
        assert_eq!(line, 4);
        assert!(msg.contains("3 fields"), "{msg}");

        let (_, msg) = reason(parse_line::<2>("4,100,aabb", 1).unwrap_err());
        assert!(msg.contains("holder"), "{msg}");

        let (_, msg) = reason(parse_line::<2>("1,-3,aabb", 1).unwrap_err());
        assert!(msg.contains("timestamp"), "{msg}");

        let (_, msg) = reason(parse_line::<2>("1,3,aab", 1).unwrap_err());
        assert!(msg.contains("hex"), "{msg}");

        let (_, msg) = reason(parse_line::<2>("1,3,aabbcc", 1).unwrap_err());
        assert!(msg.contains("expected 2"), "{msg}");
    }

    #[test]
    fn loads_into_both_indexes() {
        let input = "1,10,0001\n2,20,0002\n\n3,30,0003\n";
        let mut a = Index::<2>::new();
        let mut b = Index::<2>::new();

        assert_eq!(load(input.as_bytes(), &mut a, &mut b).unwrap(), 3);
        a.seal().unwrap();
        b.seal().unwrap();

        assert_eq!(
            a.records().unwrap(),
            &[Record::new(10, Id([0, 1])), Record::new(30, Id([0, 3]))]
        );
        assert_eq!(
            b.records().unwrap(),
            &[Record::new(20, Id([0, 2])), Record::new(30, Id([0, 3]))]
        );
    }

    #[test]
    fn load_reports_line_numbers() {
        let input = "1,10,0001\n\n1,x,0002\n";
        let mut a = Index::<2>::new();
        let mut b = Index::<2>::new();
        let (line, _) = reason(load(input.as_bytes(), &mut a, &mut b).unwrap_err());
        assert_eq!(line, 3);
    }
}

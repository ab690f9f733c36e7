//! Range-based set reconciliation over XOR fingerprints.
//!
//! Two parties each hold a set of `(timestamp, id)` records. They exchange
//! messages describing ranges of their sorted sets until each side knows
//! which ids it holds that the other lacks and vice versa. Traffic grows with
//! the size of the difference, not with the size of the sets.
//!
//! ```
//! use xorsync::{Config, Id, Index, Party, Record, Session};
//!
//! let a = Index::from_records([Record::new(100, Id([0xaa; 16]))])?;
//! let b = Index::from_records([Record::new(100, Id([0xbb; 16]))])?;
//!
//! let report = Session::new(&a, &b, Config::default())?.run()?;
//! assert_eq!(report.only_at(Party::A).collect::<Vec<_>>(), [&Id([0xaa; 16])]);
//! assert_eq!(report.only_at(Party::B).collect::<Vec<_>>(), [&Id([0xbb; 16])]);
//! # Ok::<(), xorsync::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod ingest;
pub mod item;
pub mod monoid;
pub mod protocol;
pub mod session;

pub use config::Config;
pub use error::{Error, Result};
pub use index::Index;
pub use item::{Id, Record, Timestamp, INFINITY};
pub use monoid::{xor::Fingerprint, Monoid};
pub use protocol::{initial_message, reconcile, Reconciliation};
pub use session::{Party, Session, SessionReport};

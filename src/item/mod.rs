pub mod id;
pub mod record;

pub use id::Id;
pub use record::Record;

/// Timestamps only order records; their unit is up to the application.
pub type Timestamp = u64;

/// The open upper bound of the key space. No record may carry this timestamp.
pub const INFINITY: Timestamp = u64::MAX;

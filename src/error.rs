use thiserror::Error;

/// The part of a message a decoder was reading when it ran out of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Varint,
    IdPrefix,
    Fingerprint,
    IdList,
}

impl core::fmt::Display for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Field::Varint => "varint",
            Field::IdPrefix => "id prefix",
            Field::Fingerprint => "fingerprint",
            Field::IdList => "id list",
        };
        f.write_str(name)
    }
}

/// Input that is well-formed bytes but breaks the protocol rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("unknown range mode {0}")]
    UnknownMode(u64),

    #[error("id prefix of {len} bytes exceeds id width {max}")]
    IdPrefixTooLong { len: u64, max: usize },

    #[error("varint does not fit in 64 bits")]
    VarintOverflow,

    #[error("timestamp delta overflows 64 bits")]
    TimestampOverflow,

    #[error("timestamp {next} precedes previous timestamp {previous}")]
    TimestampRegression { previous: u64, next: u64 },

    #[error("timestamp {0} is reserved for the open upper bound")]
    ReservedTimestamp(u64),

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("id has {actual} bytes, expected {expected}")]
    WrongIdWidth { expected: usize, actual: usize },

    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },
}

/// Misuse of an [`Index`](crate::index::Index) across its build/seal lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateViolation {
    #[error("insert after seal")]
    InsertAfterSeal,

    #[error("index sealed twice")]
    AlreadySealed,

    #[error("index queried before seal")]
    NotSealed,

    #[error("range {start}..{end} outside index of {len} records")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("truncated buffer while reading {0}")]
    TruncatedBuffer(Field),

    #[error("protocol violation: {0}")]
    ProtocolViolation(#[from] Violation),

    #[error("state violation: {0}")]
    StateViolation(#[from] StateViolation),

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("session did not converge within {limit} exchanges")]
    ExchangeLimitExceeded { limit: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hex::FromHexError> for Error {
    fn from(value: hex::FromHexError) -> Self {
        Self::ProtocolViolation(value.into())
    }
}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_errors_convert_and_compare() {
        let err: Error = hex::FromHexError::OddLength.into();
        match err {
            Error::ProtocolViolation(v) => {
                assert_eq!(v, Violation::InvalidHex(hex::FromHexError::OddLength))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}

use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, Violation};

/// A fixed-width opaque identifier. Ordered byte-wise, most significant byte first.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Id<const W: usize>(pub [u8; W]);

impl<const W: usize> Id<W> {
    pub const WIDTH: usize = W;

    pub fn as_bytes(&self) -> &[u8; W] {
        &self.0
    }

    /// Copies `bytes` into an id, failing unless exactly `W` bytes are given.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; W] = bytes.try_into().map_err(|_| Violation::WrongIdWidth {
            expected: W,
            actual: bytes.len(),
        })?;
        Ok(Id(arr))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl<const W: usize> ::core::fmt::Debug for Id<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if !f.alternate() && W > 4 {
            let hex_str = hex::encode(&self.0[..4]);
            write!(f, "Id_{hex_str}..")
        } else {
            let hex_str = hex::encode(self.0);
            write!(f, "Id_{hex_str}")
        }
    }
}

impl<const W: usize> ::core::fmt::Display for Id<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl<const W: usize> FromStr for Id<W> {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl<const W: usize> Default for Id<W> {
    fn default() -> Self {
        Id([0u8; W])
    }
}

impl<const W: usize> From<[u8; W]> for Id<W> {
    fn from(value: [u8; W]) -> Self {
        Id(value)
    }
}

impl<const W: usize> AsRef<[u8]> for Id<W> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const W: usize> Serialize for Id<W> {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de, const W: usize> Deserialize<'de> for Id<W> {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_bytes(IdVisitor::<W>)
    }
}

struct IdVisitor<const W: usize>;

impl<'de, const W: usize> serde::de::Visitor<'de> for IdVisitor<W> {
    type Value = Id<W>;

    fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(formatter, "{W} bytes")
    }

    fn visit_bytes<E>(self, value: &[u8]) -> core::result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match value.try_into() {
            Ok(buf) => Ok(Id(buf)),
            Err(_) => Err(serde::de::Error::invalid_value(
                serde::de::Unexpected::Bytes(value),
                &self,
            )),
        }
    }
}

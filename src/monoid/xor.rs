use serde::{Deserialize, Serialize};

use crate::item::Id;

use super::Monoid;

/// Byte-wise XOR of a set of ids.
///
/// Order-independent, so two parties holding the same ids in the same range
/// always arrive at the same value. Collisions are possible and accepted.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint<const W: usize>(Id<W>);

impl<const W: usize> Fingerprint<W> {
    pub fn from_bytes(bytes: [u8; W]) -> Self {
        Self(Id(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; W] {
        self.0.as_bytes()
    }

    pub fn add(&mut self, id: &Id<W>) {
        for (acc, b) in self.0 .0.iter_mut().zip(id.as_bytes()) {
            *acc ^= b;
        }
    }
}

impl<const W: usize> Default for Fingerprint<W> {
    fn default() -> Self {
        Self::neutral()
    }
}

impl<const W: usize> Monoid for Fingerprint<W> {
    type Item = Id<W>;

    fn neutral() -> Self {
        Self(Id([0; W]))
    }

    fn lift(item: &Self::Item) -> Self {
        Self(*item)
    }

    fn combine(&self, other: &Self) -> Self {
        let mut out = *self;
        out.add(&other.0);
        out
    }
}

impl<'a, const W: usize> FromIterator<&'a Id<W>> for Fingerprint<W> {
    fn from_iter<T: IntoIterator<Item = &'a Id<W>>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::neutral(), |acc, id| acc.combine(&Self::lift(id)))
    }
}

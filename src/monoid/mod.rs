pub mod xor;

use core::fmt::Debug;

/// A summary that can be computed over any contiguous run of items and
/// combined piecewise.
pub trait Monoid: Clone + Debug + Eq {
    type Item;

    fn neutral() -> Self;
    fn lift(item: &Self::Item) -> Self;
    fn combine(&self, other: &Self) -> Self;
}

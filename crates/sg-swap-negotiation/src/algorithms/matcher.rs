//! # Order Matching
//!
//! Two orders complement each other when each offers exactly what the other
//! wants. No partial fills, no price tolerance.

use crate::domain::Order;

/// `true` iff `b` is the exact complement of `a`.
///
/// All four fields are compared explicitly; the relation is symmetric as a
/// consequence, not by construction.
pub fn matches(a: &Order, b: &Order) -> bool {
    a.rel == b.base
        && a.base == b.rel
        && a.rel_amount == b.base_amount
        && a.base_amount == b.rel_amount
}

/// First element of `orders` complementing `candidate`.
pub fn first_complement<'a, T, F>(
    orders: impl IntoIterator<Item = &'a T>,
    candidate: &Order,
    terms: F,
) -> Option<&'a T>
where
    T: 'a,
    F: Fn(&T) -> &Order,
{
    orders
        .into_iter()
        .find(|entry| matches(terms(entry), candidate))
}

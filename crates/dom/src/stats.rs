//! Mutation counters for tests.
//!
//! Counts structural mutations (append/remove/replace) and attribute-level
//! mutations (attributes, properties, text payloads) on the current thread.
//! Compiled to no-ops unless testing or the `mutation-stats` feature is on.

#[cfg(any(test, feature = "mutation-stats"))]
use std::cell::Cell;

#[cfg(any(test, feature = "mutation-stats"))]
thread_local! {
    static STRUCTURAL: Cell<u64> = const { Cell::new(0) };
    static ATTRIBUTE: Cell<u64> = const { Cell::new(0) };
}

#[inline]
pub(crate) fn record_structural() {
    #[cfg(any(test, feature = "mutation-stats"))]
    STRUCTURAL.with(|c| c.set(c.get() + 1));
}

#[inline]
pub(crate) fn record_attribute() {
    #[cfg(any(test, feature = "mutation-stats"))]
    ATTRIBUTE.with(|c| c.set(c.get() + 1));
}

#[cfg(any(test, feature = "mutation-stats"))]
pub fn reset() {
    STRUCTURAL.with(|c| c.set(0));
    ATTRIBUTE.with(|c| c.set(0));
}

/// Returns `(structural, attribute)` mutation counts since the last reset.
#[cfg(any(test, feature = "mutation-stats"))]
pub fn counts() -> (u64, u64) {
    (
        STRUCTURAL.with(Cell::get),
        ATTRIBUTE.with(Cell::get),
    )
}

//! Persistent counter contract backing the guarantee tracks.

/// Counter key recording how often expensive triggers generated loot.
pub const HIGH_TRACK_COUNTER: &str = "HighTierUsageCount";

/// Counter key recording how often cheap triggers generated loot.
pub const LOW_TRACK_COUNTER: &str = "LowTierUsageCount";

/// Durable key-value integer storage consumed by the loot generator.
///
/// Implementations own their fault handling: both accessors are infallible
/// by contract, and a store that loses its backing medium is expected to
/// degrade to session-local memory rather than surface errors. Reads of
/// unknown keys yield 0.
pub trait CounterStore {
    /// Returns the stored value for `key`, or 0 when the key is absent.
    fn counter(&self, key: &str) -> i64;

    /// Stores `value` under `key`.
    fn set_counter(&self, key: &str, value: i64);

    /// Increments the counter under `key` and returns the new value.
    ///
    /// The default implementation reads and writes in two separate calls;
    /// stores reachable from more than one thread must override it so the
    /// read-modify-write runs under a single guard.
    fn increment_counter(&self, key: &str) -> i64 {
        let next = self.counter(key) + 1;
        self.set_counter(key, next);
        next
    }
}

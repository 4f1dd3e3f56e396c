//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Every persisted record carries a store-assigned identifier and a version
/// counter that increases by one on each persisted mutation. The version is
/// the handle the store's optimistic-concurrency primitive keys on.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// Monotonically increasing version of the entity's persisted state.
    fn version(&self) -> u64;
}

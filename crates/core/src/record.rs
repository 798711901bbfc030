//! Record trait: identity + soft-delete lifecycle.

/// A persisted record that is retired by soft delete rather than removed.
///
/// Read paths filter on [`Record::is_deleted`] unless they explicitly ask for
/// retired records.
pub trait Record {
    /// Strongly-typed record identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the record identifier.
    fn id(&self) -> &Self::Id;

    fn is_active(&self) -> bool;

    fn is_deleted(&self) -> bool;

    /// Active and not soft-deleted.
    fn is_live(&self) -> bool {
        self.is_active() && !self.is_deleted()
    }
}

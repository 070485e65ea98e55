use crate::memory_access::Memory;
use crate::remote_value::{Aggregate, RemoteValue};
use crate::snapshot_proxy::{CommitSummary, SnapshotProxy};
use crate::typed_handle::TypedHandle;

/// Member level access to a structured value backed by a single snapshot.
/// All members share the same working copy, and changes to any of them are committed together when the access is released.
/// Member boundaries are not tracked, so changed bytes of adjacent members are coalesced into a single write
pub struct AggregateAccess<M : Memory, T : Aggregate> {
    proxy: SnapshotProxy<M, T>,
}
impl<M : Memory, T : Aggregate> AggregateAccess<M, T> {
    /// Returns the members of the working value
    pub fn fields(&self) -> &T {
        self.proxy.value()
    }
    /// Returns the members of the working value for modification
    pub fn fields_mut(&mut self) -> &mut T {
        self.proxy.value_mut()
    }
    /// Reads a single member selected by the given projection
    pub fn field<F : RemoteValue, P : FnOnce(&T) -> &F>(&self, projection: P) -> F {
        *projection(self.proxy.value())
    }
    /// Replaces a single member selected by the given projection
    pub fn set_field<F : RemoteValue, P : FnOnce(&mut T) -> &mut F>(&mut self, projection: P, value: F) {
        *projection(self.proxy.value_mut()) = value;
    }
    /// Returns the proxy backing this access
    pub fn proxy(&self) -> &SnapshotProxy<M, T> {
        &self.proxy
    }
    pub fn into_proxy(self) -> SnapshotProxy<M, T> {
        self.proxy
    }
    /// Writes all changed bytes back and releases the access
    pub fn commit(self) -> anyhow::Result<CommitSummary> {
        self.proxy.commit()
    }
    /// Releases the access without writing anything back
    pub fn discard(self) {
        self.proxy.discard()
    }
}

impl<M : Memory, T : Aggregate> TypedHandle<M, T> {
    /// Captures the structured value and returns member level access to it
    pub fn access_fields(&self) -> anyhow::Result<AggregateAccess<M, T>> {
        Ok(AggregateAccess{proxy: self.dereference()?})
    }
}

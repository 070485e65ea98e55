use std::sync::Arc;
use crate::memory_access::Memory;
use crate::options::ProxyOptions;
use crate::remote_value::RemoteValue;
use crate::typed_handle::TypedHandle;

/// Binds a memory backend together with the options used by all handles and proxies created from it.
/// Handles keep the address space alive through a shared reference, so it is usually created once and wrapped in Arc
#[derive(Debug)]
pub struct AddressSpace<M : Memory> {
    memory: M,
    options: ProxyOptions,
}
impl<M : Memory> AddressSpace<M> {
    /// Creates a new address space with default options
    pub fn create(memory: M) -> Arc<Self> {
        Self::create_with_options(memory, ProxyOptions::default())
    }
    /// Creates a new address space with the provided options
    pub fn create_with_options(memory: M, options: ProxyOptions) -> Arc<Self> {
        Arc::new(Self{memory, options})
    }
    /// Returns the memory backend this address space reads from and writes to
    pub fn memory(&self) -> &M {
        &self.memory
    }
    pub fn options(&self) -> &ProxyOptions {
        &self.options
    }
    /// Creates a typed handle to the value located at the given address
    pub fn handle<T : RemoteValue>(self: &Arc<Self>, address: u64) -> TypedHandle<M, T> {
        TypedHandle::new(self.clone(), address)
    }
}

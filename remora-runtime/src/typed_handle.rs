use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;
use anyhow::{bail, Context};
use crate::address_space::AddressSpace;
use crate::error::MemoryAccessError;
use crate::memory_access::Memory;
use crate::remote_value::{Aggregate, RemoteValue, ValueKind};
use crate::snapshot_proxy::{CommitSummary, SnapshotProxy};

/// Typed locator of a value of type T in the address space. Handle does not hold any data itself,
/// every dereference reads the current value from the address space through a fresh snapshot
pub struct TypedHandle<M : Memory, T : RemoteValue> {
    space: Arc<AddressSpace<M>>,
    address: u64,
    phantom_data: PhantomData<T>,
}
impl<M : Memory, T : RemoteValue> TypedHandle<M, T> {
    /// Creates a handle to the value at the given address. The address is not validated, invalid addresses are reported by the memory backend on access
    pub fn new(space: Arc<AddressSpace<M>>, address: u64) -> Self {
        Self{space, address, phantom_data: PhantomData}
    }
    pub fn address(&self) -> u64 {
        self.address
    }
    /// Returns the shape of the value this handle points to
    pub fn kind(&self) -> ValueKind {
        T::KIND
    }
    pub fn space(&self) -> &Arc<AddressSpace<M>> {
        &self.space
    }
    pub fn memory(&self) -> &M {
        self.space.memory()
    }
    /// Returns the number of bytes a snapshot of this value occupies
    pub fn value_size(&self) -> usize {
        size_of::<T>()
    }
    /// Captures the current value into a snapshot proxy. Changes made through the proxy are written back when it is committed or released
    pub fn dereference(&self) -> anyhow::Result<SnapshotProxy<M, T>> {
        SnapshotProxy::capture(self.clone())
    }
    /// Reads the current value without keeping a proxy around
    pub fn read(&self) -> anyhow::Result<T> {
        let proxy = self.dereference()?;
        let value = proxy.get();
        proxy.discard();
        Ok(value)
    }
    /// Writes the value, touching only the bytes that differ from the value currently stored in the address space
    pub fn write(&self, value: T) -> anyhow::Result<CommitSummary> {
        let mut proxy = self.dereference()?;
        proxy.set(value);
        proxy.commit()
    }
    /// Returns a handle of the same type offset towards higher addresses by the given number of bytes
    pub fn offset_by(&self, bytes: u64) -> anyhow::Result<Self> {
        let address = self.address.checked_add(bytes).ok_or(MemoryAccessError::AddressOverflow{address: self.address, offset: bytes})?;
        Ok(Self::new(self.space.clone(), address))
    }
    /// Returns a handle to the value of the same type located count elements further
    pub fn add(&self, count: u64) -> anyhow::Result<Self> {
        let bytes = count.checked_mul(size_of::<T>() as u64).ok_or(MemoryAccessError::AddressOverflow{address: self.address, offset: u64::MAX})?;
        self.offset_by(bytes)
    }
    /// Reinterprets the value at the same address as a value of another type
    pub fn cast<U : RemoteValue>(&self) -> TypedHandle<M, U> {
        TypedHandle::new(self.space.clone(), self.address)
    }
}

impl<M : Memory, T : Aggregate> TypedHandle<M, T> {
    /// Returns a handle to the member of type F located at the given byte offset from the start of this value.
    /// Offset is usually obtained with std::mem::offset_of!
    pub fn member<F : RemoteValue>(&self, offset: usize) -> anyhow::Result<TypedHandle<M, F>> {
        if offset.checked_add(size_of::<F>()).is_none_or(|member_end| member_end > size_of::<T>()) {
            bail!("Member of {} bytes at offset {} does not fit into value of {} bytes", size_of::<F>(), offset, size_of::<T>());
        }
        Ok(self.offset_by(offset as u64)?.cast())
    }
}

impl<M : Memory, E : RemoteValue, const N: usize> TypedHandle<M, [E; N]> {
    /// Returns a handle to the array element at the given index
    pub fn element(&self, index: usize) -> anyhow::Result<TypedHandle<M, E>> {
        if index >= N {
            bail!("Array element index {} is out of bounds for array of length {}", index, N);
        }
        self.member::<E>(index * size_of::<E>()).with_context(|| format!("Failed to locate element {} of array at address {:#x}", index, self.address))
    }
}

impl<M : Memory, T : RemoteValue> Clone for TypedHandle<M, T> {
    fn clone(&self) -> Self {
        Self{space: self.space.clone(), address: self.address, phantom_data: PhantomData}
    }
}
impl<M : Memory, T : RemoteValue> Debug for TypedHandle<M, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedHandle")
            .field("address", &format_args!("{:#x}", self.address))
            .field("type", &std::any::type_name::<T>())
            .field("kind", &T::KIND)
            .finish()
    }
}
impl<M : Memory, T : RemoteValue> PartialEq for TypedHandle<M, T> {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && Arc::ptr_eq(&self.space, &other.space)
    }
}
impl<M : Memory, T : RemoteValue> Eq for TypedHandle<M, T> {}
impl<M : Memory, T : RemoteValue> PartialOrd for TypedHandle<M, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<M : Memory, T : RemoteValue> Ord for TypedHandle<M, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address.cmp(&other.address)
            .then_with(|| Arc::as_ptr(&self.space).cmp(&Arc::as_ptr(&other.space)))
    }
}
impl<M : Memory, T : RemoteValue> Hash for TypedHandle<M, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state)
    }
}

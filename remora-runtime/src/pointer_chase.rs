use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use anyhow::Context;
use crate::error::MemoryAccessError;
use crate::memory_access::{DataEndianness, Memory};
use crate::remote_value::{bytes_of, RemoteValue, ValueKind};
use crate::snapshot_proxy::SnapshotProxy;
use crate::typed_handle::TypedHandle;

mod private {
    pub trait Sealed {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// Raw integer representation of a stored pointer. Only 4 and 8 byte pointers are supported
pub trait PointerRepr : RemoteValue + private::Sealed {}
impl PointerRepr for u32 {}
impl PointerRepr for u64 {}

/// Pointer stored in the address space, pointing to a value of type U in the same address space.
/// Raw representation R holds the address in the byte order of the target, and is decoded using the endianness of the memory backend
#[repr(transparent)]
pub struct RemotePtr<U, R = u64> {
    raw: R,
    phantom_data: PhantomData<U>,
}
impl<U, R : PointerRepr> RemotePtr<U, R> {
    /// Creates a stored pointer from its raw target representation
    pub fn from_raw(raw: R) -> Self {
        Self{raw, phantom_data: PhantomData}
    }
    /// Returns the raw representation as a host integer. It equals the stored address only when the memory backend has host endianness,
    /// use target_address to decode it with the endianness of the backend
    pub fn raw(&self) -> R {
        self.raw
    }
    /// Decodes the stored address using the given endianness
    pub fn target_address(&self, endianness: DataEndianness) -> anyhow::Result<u64> {
        endianness.address_from_bytes(bytes_of(&self.raw))
    }
}
impl<U, R : PointerRepr> Clone for RemotePtr<U, R> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<U, R : PointerRepr> Copy for RemotePtr<U, R> {}
impl<U, R : PointerRepr + PartialEq> PartialEq for RemotePtr<U, R> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}
impl<U, R : PointerRepr + Debug> Debug for RemotePtr<U, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RemotePtr").field(&self.raw).finish()
    }
}
/// RemotePtr is transparent over its raw representation, which is a plain integer
unsafe impl<U : 'static, R : PointerRepr> RemoteValue for RemotePtr<U, R> {
    const KIND: ValueKind = ValueKind::Pointer;
}

/// Implemented by values that hold an address of another value in the same address space
pub trait PointerLike : RemoteValue {
    /// Type of the value this pointer points to
    type Pointee : RemoteValue;
}
impl<U : RemoteValue, R : PointerRepr> PointerLike for RemotePtr<U, R> {
    type Pointee = U;
}

impl<M : Memory, T : PointerLike> SnapshotProxy<M, T> {
    /// Decodes the address currently held by the working value
    pub fn target_address(&self) -> anyhow::Result<u64> {
        self.handle().memory().data_endianness().address_from_bytes(self.working_bytes())
    }
    /// Makes the working value point to the given address
    pub fn set_target(&mut self, address: u64) -> anyhow::Result<()> {
        let endianness = self.handle().memory().data_endianness();
        endianness.address_to_bytes(address, self.working_bytes_mut())
    }
    /// Makes the working value point to the value referenced by the given handle
    pub fn point_to(&mut self, target: &TypedHandle<M, T::Pointee>) -> anyhow::Result<()> {
        self.set_target(target.address())
    }
    /// Makes the working value a null pointer
    pub fn set_null(&mut self) -> anyhow::Result<()> {
        self.set_target(0)
    }
    /// Returns true if the working value holds address 0. This does not prevent the pointer from being followed
    pub fn is_null(&self) -> anyhow::Result<bool> {
        Ok(self.target_address()? == 0)
    }
    /// Returns a handle to the value the working value points to, bound to the same address space.
    /// The stored address is not validated, unless it matches the null sentinel configured for the address space
    pub fn pointee(&self) -> anyhow::Result<TypedHandle<M, T::Pointee>> {
        let target_address = self.target_address()?;
        if self.handle().space().options().null_sentinel_address() == Some(target_address) {
            return Err(MemoryAccessError::NullPointer{address: self.address()}.into());
        }
        Ok(TypedHandle::new(self.handle().space().clone(), target_address))
    }
    /// Follows the pointer and captures the pointed to value into a new proxy.
    /// The new proxy is independent from this one and commits its own changes to the pointed to address
    pub fn chase(&self) -> anyhow::Result<SnapshotProxy<M, T::Pointee>> {
        let pointee = self.pointee()?;
        pointee.dereference().with_context(|| format!("Failed to follow pointer stored at address {:#x}", self.address()))
    }
}

impl<M : Memory, T : PointerLike> TypedHandle<M, T> {
    /// Reads the stored pointer and returns a handle to the value it points to
    pub fn read_target(&self) -> anyhow::Result<TypedHandle<M, T::Pointee>> {
        let proxy = self.dereference()?;
        let pointee = proxy.pointee();
        proxy.discard();
        pointee
    }
    /// Reads the stored pointer and captures the value it points to
    pub fn chase(&self) -> anyhow::Result<SnapshotProxy<M, T::Pointee>> {
        self.read_target()?.dereference()
    }
}

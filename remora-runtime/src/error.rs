//! Error kinds reported by memory backends and by the proxy machinery

use thiserror::Error;

/// Errors that can be produced while accessing the target address space.
/// These are carried inside `anyhow::Error` and can be recovered with `downcast_ref::<MemoryAccessError>()`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryAccessError {
    /// Requested range does not fit into the address space
    #[error("Access of {length} bytes at address {address:#x} is out of range (address space size is {limit:#x})")]
    OutOfRange {
        address: u64,
        length: usize,
        limit: u64,
    },
    /// Backend supplied or accepted fewer bytes than requested
    #[error("Short transfer at address {address:#x}: requested {requested} bytes, but only {available} bytes are available")]
    ShortTransfer {
        address: u64,
        requested: usize,
        available: usize,
    },
    /// Backend requires accesses to be aligned
    #[error("Misaligned access at address {address:#x} (required alignment is {alignment})")]
    MisalignedAccess {
        address: u64,
        alignment: u64,
    },
    /// Stored pointer value is null and cannot be followed
    #[error("Pointer stored at address {address:#x} is null")]
    NullPointer {
        address: u64,
    },
    /// Address arithmetic does not fit into 64 bits
    #[error("Address {address:#x} cannot be offset by {offset} bytes")]
    AddressOverflow {
        address: u64,
        offset: u64,
    },
    /// Backend reports a pointer width the runtime cannot decode
    #[error("Unsupported address width of {0} bytes")]
    UnsupportedAddressWidth(usize),
    /// Backend does not accept writes
    #[error("Address space is read-only, cannot write at address {address:#x}")]
    ReadOnly {
        address: u64,
    },
}

impl MemoryAccessError {
    /// Creates an OutOfRange error for the given access
    pub fn out_of_range(address: u64, length: usize, limit: u64) -> Self {
        MemoryAccessError::OutOfRange { address, length, limit }
    }
    /// Returns the MemoryAccessError at the root of the given error chain, if there is one
    pub fn find_in(error: &anyhow::Error) -> Option<&MemoryAccessError> {
        error.chain().find_map(|cause| cause.downcast_ref::<MemoryAccessError>())
    }
}

use parking_lot::Mutex;
use anyhow::bail;
use crate::error::MemoryAccessError;
use crate::memory_access::{DataEndianness, Memory};

/// Fixed size address space backed by a byte buffer owned by this process.
/// Accesses outside of the buffer fail with OutOfRange, the buffer never grows to accommodate them
#[derive(Debug)]
pub struct BufferMemory {
    bytes: Mutex<Vec<u8>>,
    alignment: u64,
    endianness: DataEndianness,
    address_width: usize,
    read_only: bool,
}
impl BufferMemory {
    /// Creates a zero-filled address space of the given size
    pub fn new(size: usize) -> Self {
        Self::from_bytes(vec![0; size])
    }
    /// Creates an address space initialized with the given contents
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self{bytes: Mutex::new(bytes), alignment: 1, endianness: DataEndianness::host_endianness(), address_width: size_of::<u64>(), read_only: false}
    }
    /// Requires every access to start at an address that is a multiple of the given alignment
    pub fn with_alignment(mut self, alignment: u64) -> Self {
        self.alignment = alignment.max(1); self
    }
    /// Sets the endianness reported to the consumers of this address space
    pub fn with_endianness(mut self, endianness: DataEndianness) -> Self {
        self.endianness = endianness; self
    }
    /// Sets the pointer width reported to the consumers of this address space
    pub fn with_address_width(mut self, address_width: usize) -> Self {
        self.address_width = address_width; self
    }
    /// Rejects all writes, like a memory image that cannot be modified
    pub fn read_only(mut self) -> Self {
        self.read_only = true; self
    }
    /// Returns the size of this address space in bytes
    pub fn len(&self) -> usize {
        self.bytes.lock().len()
    }
    pub fn is_empty(&self) -> bool {
        self.bytes.lock().is_empty()
    }
    /// Returns a copy of the current contents of the address space
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }
    fn checked_range(&self, address: u64, length: usize, limit: usize) -> anyhow::Result<std::ops::Range<usize>> {
        if address % self.alignment != 0 {
            bail!(MemoryAccessError::MisalignedAccess{address, alignment: self.alignment});
        }
        let out_of_range = || MemoryAccessError::out_of_range(address, length, limit as u64);
        let start = usize::try_from(address).map_err(|_| out_of_range())?;
        let end = start.checked_add(length).ok_or_else(out_of_range)?;
        if end > limit {
            bail!(out_of_range());
        }
        Ok(start..end)
    }
}
impl Memory for BufferMemory {
    fn address_width(&self) -> usize {
        self.address_width
    }
    fn data_endianness(&self) -> DataEndianness {
        self.endianness
    }
    fn read_chunk(&self, address: u64, buffer: &mut [u8]) -> anyhow::Result<()> {
        let bytes = self.bytes.lock();
        let range = self.checked_range(address, buffer.len(), bytes.len())?;
        buffer.copy_from_slice(&bytes[range]);
        Ok({})
    }
    fn write_chunk(&self, address: u64, value: &[u8]) -> anyhow::Result<()> {
        if self.read_only {
            bail!(MemoryAccessError::ReadOnly{address});
        }
        let mut bytes = self.bytes.lock();
        let limit = bytes.len();
        let range = self.checked_range(address, value.len(), limit)?;
        bytes[range].copy_from_slice(value);
        Ok({})
    }
}

use parking_lot::Mutex;
use remora_runtime::buffer_memory::BufferMemory;
use remora_runtime::memory_access::{DataEndianness, Memory};

/// Single call made against the recording memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryCall {
    Read { address: u64, length: usize },
    Write { address: u64, bytes: Vec<u8> },
}

/// Memory backend that forwards to a bounded buffer and records every call made against it.
/// Optionally rejects writes to a single address to simulate a failing backend,
/// or serves only the bytes below a readable limit to simulate a truncated image
pub struct RecordingMemory {
    inner: BufferMemory,
    calls: Mutex<Vec<MemoryCall>>,
    failing_write_address: Option<u64>,
    readable_limit: Option<u64>,
}
impl RecordingMemory {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self{inner: BufferMemory::from_bytes(bytes), calls: Mutex::new(Vec::new()), failing_write_address: None, readable_limit: None}
    }
    pub fn failing_writes_at(mut self, address: u64) -> Self {
        self.failing_write_address = Some(address); self
    }
    pub fn truncated_at(mut self, limit: u64) -> Self {
        self.readable_limit = Some(limit); self
    }
    pub fn calls(&self) -> Vec<MemoryCall> {
        self.calls.lock().clone()
    }
    pub fn writes(&self) -> Vec<(u64, Vec<u8>)> {
        self.calls().into_iter().filter_map(|call| match call {
            MemoryCall::Write{address, bytes} => Some((address, bytes)),
            MemoryCall::Read{..} => None,
        }).collect()
    }
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
    pub fn contents(&self) -> Vec<u8> {
        self.inner.snapshot()
    }
}
impl Memory for RecordingMemory {
    fn address_width(&self) -> usize {
        self.inner.address_width()
    }
    fn data_endianness(&self) -> DataEndianness {
        self.inner.data_endianness()
    }
    fn read_chunk(&self, address: u64, buffer: &mut [u8]) -> anyhow::Result<()> {
        self.calls.lock().push(MemoryCall::Read{address, length: buffer.len()});
        self.inner.read_chunk(address, buffer)
    }
    fn read_available(&self, address: u64, buffer: &mut [u8]) -> anyhow::Result<usize> {
        let available = match self.readable_limit {
            Some(limit) => (limit.saturating_sub(address) as usize).min(buffer.len()),
            None => buffer.len(),
        };
        self.read_chunk(address, &mut buffer[..available])?;
        Ok(available)
    }
    fn write_chunk(&self, address: u64, buffer: &[u8]) -> anyhow::Result<()> {
        self.calls.lock().push(MemoryCall::Write{address, bytes: buffer.to_vec()});
        if self.failing_write_address == Some(address) {
            anyhow::bail!("Simulated write failure at address {:#x}", address);
        }
        self.inner.write_chunk(address, buffer)
    }
}

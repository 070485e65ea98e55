use anyhow::bail;
use paste::paste;
use crate::error::MemoryAccessError;

/// Describes possible endianness of the data stored in the target address space
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DataEndianness {
    LittleEndian,
    BigEndian,
}
macro_rules! impl_endian_aware_type {
    ($data_type: ident) => {
        paste! {
            pub fn [<$data_type _from_bytes>](self, bytes: [u8; size_of::<$data_type>()]) -> $data_type {
                match self {
                    DataEndianness::LittleEndian => $data_type::from_le_bytes(bytes),
                    DataEndianness::BigEndian => $data_type::from_be_bytes(bytes),
                }
            }
            pub fn [<$data_type _to_bytes>](self, value: $data_type) -> [u8; size_of::<$data_type>()] {
                match self {
                    DataEndianness::LittleEndian => value.to_le_bytes(),
                    DataEndianness::BigEndian => value.to_be_bytes(),
                }
            }
        }
    };
}
impl DataEndianness {
    pub fn host_endianness() -> DataEndianness {
        if cfg!(target_endian = "big") {
            DataEndianness::BigEndian
        } else {
            DataEndianness::LittleEndian
        }
    }
    impl_endian_aware_type!(u16);
    impl_endian_aware_type!(u32);
    impl_endian_aware_type!(u64);
    impl_endian_aware_type!(i16);
    impl_endian_aware_type!(i32);
    impl_endian_aware_type!(i64);
    impl_endian_aware_type!(f32);
    impl_endian_aware_type!(f64);

    /// Decodes an address stored in the given bytes. Length of the slice determines the address width, and only 4 and 8 byte addresses are supported
    pub fn address_from_bytes(self, bytes: &[u8]) -> anyhow::Result<u64> {
        match bytes.len() {
            8 => Ok(self.u64_from_bytes(bytes.try_into()?)),
            4 => Ok(self.u32_from_bytes(bytes.try_into()?) as u64),
            other => Err(MemoryAccessError::UnsupportedAddressWidth(other).into()),
        }
    }
    /// Encodes an address into the given bytes, using the length of the slice as the address width
    pub fn address_to_bytes(self, address: u64, bytes: &mut [u8]) -> anyhow::Result<()> {
        match bytes.len() {
            8 => bytes.copy_from_slice(&self.u64_to_bytes(address)),
            4 => {
                let narrow_address = u32::try_from(address).map_err(|_| anyhow::anyhow!("Address {:#x} does not fit into 4 byte pointer", address))?;
                bytes.copy_from_slice(&self.u32_to_bytes(narrow_address))
            },
            other => bail!(MemoryAccessError::UnsupportedAddressWidth(other)),
        }
        Ok({})
    }
}

macro_rules! impl_memory_access {
    ($data_type: ident) => {
        paste! {
            fn [<read_ $data_type>](&self, address: u64) -> anyhow::Result<$data_type> {
                let endianness = self.data_endianness();
                let mut buffer: [u8; size_of::<$data_type>()] = [0; size_of::<$data_type>()];
                self.read_chunk(address, &mut buffer)?;
                Ok(endianness.[<$data_type _from_bytes>](buffer))
            }
            fn [<write_ $data_type>](&self, address: u64, value: $data_type) -> anyhow::Result<()> {
                let endianness = self.data_endianness();
                let buffer: [u8; size_of::<$data_type>()] = endianness.[<$data_type _to_bytes>](value);
                self.write_chunk(address, &buffer)
            }
        }
    }
}

/// Interface for reading and writing a byte addressable space that is only reachable through bounded reads and writes.
/// This can be the memory of another process, a device register window, a memory image or a simulated buffer.
/// read_chunk and write_chunk must either transfer exactly the requested number of bytes or fail, partial transfers are only reported by read_available
pub trait Memory {
    /// Returns the address width in bytes for the memory backend. Address width determines the size of the pointer type
    fn address_width(&self) -> usize;
    /// Returns the endianness of this memory backend
    fn data_endianness(&self) -> DataEndianness;

    /// Fills the entire buffer with the bytes starting at the given address
    fn read_chunk(&self, address: u64, buffer: &mut [u8]) -> anyhow::Result<()>;
    /// Writes all bytes of the buffer starting at the given address
    fn write_chunk(&self, address: u64, buffer: &[u8]) -> anyhow::Result<()>;

    /// Reads as many bytes as are available starting at the given address, up to the size of the buffer, and returns their number.
    /// Backends that can serve the beginning of a range that runs past their end (truncated images, partially mapped regions) override this
    fn read_available(&self, address: u64, buffer: &mut [u8]) -> anyhow::Result<usize> {
        self.read_chunk(address, buffer)?;
        Ok(buffer.len())
    }
    /// Reads exactly length bytes starting at the given address. Fails with ShortTransfer if fewer bytes are available
    fn read_bytes(&self, address: u64, length: usize) -> anyhow::Result<Vec<u8>> {
        let mut buffer = vec![0u8; length];
        let available = self.read_available(address, &mut buffer)?;
        if available != length {
            bail!(MemoryAccessError::ShortTransfer{address, requested: length, available});
        }
        Ok(buffer)
    }

    impl_memory_access!(u16);
    impl_memory_access!(u32);
    impl_memory_access!(u64);
    impl_memory_access!(i16);
    impl_memory_access!(i32);
    impl_memory_access!(i64);
    impl_memory_access!(f32);
    impl_memory_access!(f64);

    fn read_u8(&self, address: u64) -> anyhow::Result<u8> {
        let mut buffer: [u8; 1] = [0; 1];
        self.read_chunk(address, &mut buffer)?;
        Ok(buffer[0])
    }
    fn write_u8(&self, address: u64, value: u8) -> anyhow::Result<()> {
        self.write_chunk(address, &[value])
    }
    fn read_i8(&self, address: u64) -> anyhow::Result<i8> {
        Ok(self.read_u8(address)? as i8)
    }
    fn write_i8(&self, address: u64, value: i8) -> anyhow::Result<()> {
        self.write_chunk(address, &[value as u8])
    }
    /// Reads a pointer sized value at the given address, using the address width of this backend
    fn read_raw_ptr(&self, address: u64) -> anyhow::Result<u64> {
        let mut buffer: [u8; 8] = [0; 8];
        let address_width = self.address_width();
        if address_width > buffer.len() {
            bail!(MemoryAccessError::UnsupportedAddressWidth(address_width));
        }
        self.read_chunk(address, &mut buffer[..address_width])?;
        self.data_endianness().address_from_bytes(&buffer[..address_width])
    }
    /// Writes a pointer sized value at the given address, using the address width of this backend
    fn write_raw_ptr(&self, address: u64, value: u64) -> anyhow::Result<()> {
        let mut buffer: [u8; 8] = [0; 8];
        let address_width = self.address_width();
        if address_width > buffer.len() {
            bail!(MemoryAccessError::UnsupportedAddressWidth(address_width));
        }
        self.data_endianness().address_to_bytes(value, &mut buffer[..address_width])?;
        self.write_chunk(address, &buffer[..address_width])
    }
}

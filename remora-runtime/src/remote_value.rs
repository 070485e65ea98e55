use std::ptr::slice_from_raw_parts;

/// Closed set of shapes a remote value can have. Each shape enables a different set of operations on handles and proxies
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Plain value without internal structure, like an integer or a float
    Scalar,
    /// Value holding an address of another value in the same address space
    Pointer,
    /// Value composed of multiple members, like a struct or an array
    Aggregate,
}

/// Implemented by types whose values can be captured as raw bytes from the address space and reinterpreted in place.
///
/// # Safety
/// Implementor must not contain any padding bytes, and every possible bit pattern of size_of::<Self>() bytes must be a valid value of the type.
/// Types containing references, bools, chars, enums or non-repr(C) structs do not satisfy this requirement.
/// Values are reinterpreted using the layout of the host, so the layout must also match the layout of the value in the target address space
pub unsafe trait RemoteValue : Copy + 'static {
    /// Shape of this value, used to select how handles to this type can be accessed
    const KIND: ValueKind;
}

/// Marker for structured values whose members can be accessed and mutated through a single snapshot
pub trait Aggregate : RemoteValue {}

macro_rules! implement_scalar_remote_value {
    ($($value_type:ty),*) => {
        $(
            unsafe impl RemoteValue for $value_type {
                const KIND: ValueKind = ValueKind::Scalar;
            }
        )*
    };
}
implement_scalar_remote_value!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

/// Arrays of remote values have no padding between the elements, so they are valid remote values themselves
unsafe impl<T : RemoteValue, const N: usize> RemoteValue for [T; N] {
    const KIND: ValueKind = ValueKind::Aggregate;
}
impl<T : RemoteValue, const N: usize> Aggregate for [T; N] {}

/// Returns the raw bytes of the given value
pub fn bytes_of<T : RemoteValue>(value: &T) -> &[u8] {
    // RemoteValue guarantees that there is no padding, so all bytes of the value are initialized
    unsafe { &*slice_from_raw_parts(value as *const T as *const u8, size_of::<T>()) }
}

/// Returns the raw bytes of the given value. Any bytes written through the returned slice produce a valid value
pub fn bytes_of_mut<T : RemoteValue>(value: &mut T) -> &mut [u8] {
    unsafe { std::slice::from_raw_parts_mut(value as *mut T as *mut u8, size_of::<T>()) }
}

/// Reinterprets the given bytes as a value. Panics if the length of the slice does not match the size of the value
pub fn read_value<T : RemoteValue>(bytes: &[u8]) -> T {
    assert_eq!(bytes.len(), size_of::<T>(), "Byte length mismatch when reinterpreting remote value");
    // Any bit pattern is valid for RemoteValue, and read_unaligned has no alignment requirements on the source buffer
    unsafe { std::ptr::read_unaligned(bytes.as_ptr() as *const T) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    #[derive(Debug, Copy, Clone, PartialEq)]
    struct Pair {
        first: u32,
        second: u32,
    }
    unsafe impl RemoteValue for Pair {
        const KIND: ValueKind = ValueKind::Aggregate;
    }
    impl Aggregate for Pair {}

    #[test]
    fn test_reinterpretation_matches_host_layout() {
        let pair = Pair{first: 0x11223344, second: 7};
        let bytes = bytes_of(&pair).to_vec();
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes[..4], 0x11223344u32.to_ne_bytes());
        assert_eq!(read_value::<Pair>(&bytes), pair);
    }

    #[test]
    fn test_mutation_through_bytes() {
        let mut value: u32 = 0;
        bytes_of_mut(&mut value).copy_from_slice(&5u32.to_ne_bytes());
        assert_eq!(value, 5);
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(<u16 as RemoteValue>::KIND, ValueKind::Scalar);
        assert_eq!(<[u8; 3] as RemoteValue>::KIND, ValueKind::Aggregate);
        assert_eq!(<Pair as RemoteValue>::KIND, ValueKind::Aggregate);
    }

    #[test]
    #[should_panic]
    fn test_read_value_length_mismatch() {
        read_value::<u32>(&[1, 2]);
    }
}

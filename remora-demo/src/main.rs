use std::sync::Arc;
use remora_runtime::address_space::AddressSpace;
use remora_runtime::buffer_memory::BufferMemory;
use remora_runtime::instrumentation::RecordingObserver;
use remora_runtime::memory_access::Memory;
use remora_runtime::options::ProxyOptions;
use remora_runtime::pointer_chase::RemotePtr;
use remora_runtime::remote_value::{bytes_of, Aggregate, RemoteValue, ValueKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
struct TestLayout {
    a: i32,
    b: i32,
    c: i32,
    d: i32,
}
unsafe impl RemoteValue for TestLayout {
    const KIND: ValueKind = ValueKind::Aggregate;
}
impl Aggregate for TestLayout {}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let observer = Arc::new(RecordingObserver::default());
    let space = AddressSpace::create_with_options(BufferMemory::new(64), ProxyOptions::default().observer(observer.clone()));

    let initial_value = TestLayout{a: 0xFFFFFFF, b: 6, c: 1024, d: 8};
    space.memory().write_chunk(0, bytes_of(&initial_value))?;
    let test_ptr = space.handle::<TestLayout>(0);
    println!("{:?}", test_ptr.read()?);

    {
        let mut fields = test_ptr.access_fields()?;
        fields.fields_mut().a = 990;
        fields.fields_mut().b = 7;
    }
    let updated_value = test_ptr.read()?;
    println!("{:?}", updated_value);
    assert_eq!(updated_value, TestLayout{a: 990, b: 7, c: 1024, d: 8});
    for event in observer.events() {
        info!(address = event.address, length = event.length, "commit");
    }

    // Pointer at 0x20 referencing a value at 0x28
    space.memory().write_raw_ptr(0x20, 0x28)?;
    space.memory().write_u32(0x28, 0xDEADBEEF)?;
    let value_ptr = space.handle::<RemotePtr<u32>>(0x20);
    let pointee_value = value_ptr.dereference()?.chase()?.get();
    println!("{:#x}", pointee_value);
    assert_eq!(pointee_value, 0xDEADBEEF);

    let out_of_range = space.handle::<u64>(60).read();
    if let Err(error) = out_of_range {
        println!("{:#}", error);
    }
    Ok({})
}

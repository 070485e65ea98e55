pub mod error;
pub mod memory_access;
pub mod buffer_memory;
pub mod remote_value;
pub mod diff;
pub mod instrumentation;
pub mod options;
pub mod address_space;
pub mod typed_handle;
pub mod snapshot_proxy;
pub mod pointer_chase;
pub mod aggregate_access;

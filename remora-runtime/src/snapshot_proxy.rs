use std::fmt::{Debug, Formatter};
use anyhow::Context;
use tracing::{debug, error, trace, warn};
use crate::diff::{changed_runs, ChangedRun};
use crate::error::MemoryAccessError;
use crate::instrumentation::{CommitEvent, CommitFailure};
use crate::memory_access::Memory;
use crate::options::ReleaseFailurePolicy;
use crate::remote_value::{bytes_of, bytes_of_mut, read_value, RemoteValue};
use crate::typed_handle::TypedHandle;

/// Result of a successful commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Runs that were written, one write call per run, in ascending address order
    pub runs: Vec<ChangedRun>,
    pub bytes_written: usize,
}
impl CommitSummary {
    /// Returns the number of write calls issued by the commit
    pub fn write_count(&self) -> usize {
        self.runs.len()
    }
}

/// Transient mutable view over the value referenced by a handle.
///
/// Construction reads the value once and keeps two copies of it: the initial snapshot, which is never modified,
/// and the working copy exposed to the caller. Releasing the proxy compares both copies and writes every maximal run
/// of changed bytes back with a single write call, so unchanged bytes are never written.
///
/// Release happens on explicit commit(), or implicitly when the proxy goes out of scope on any exit path.
/// Implicit release while the thread is panicking does not write anything. discard() releases the proxy without writing.
pub struct SnapshotProxy<M : Memory, T : RemoteValue> {
    handle: TypedHandle<M, T>,
    initial: Box<[u8]>,
    working: T,
    released: bool,
}
impl<M : Memory, T : RemoteValue> SnapshotProxy<M, T> {
    /// Reads the value referenced by the handle. Fails without creating a proxy if the read fails
    pub(crate) fn capture(handle: TypedHandle<M, T>) -> anyhow::Result<Self> {
        let value_size = size_of::<T>();
        let initial = handle.memory().read_bytes(handle.address(), value_size)
            .with_context(|| format!("Failed to snapshot {} bytes at address {:#x}", value_size, handle.address()))?;
        trace!(address = handle.address(), size = value_size, kind = ?T::KIND, "captured snapshot");
        let working = read_value::<T>(&initial);
        Ok(Self{handle, initial: initial.into_boxed_slice(), working, released: false})
    }
    /// Returns the handle this proxy has been created from
    pub fn handle(&self) -> &TypedHandle<M, T> {
        &self.handle
    }
    pub fn address(&self) -> u64 {
        self.handle.address()
    }
    /// Returns a copy of the working value
    pub fn get(&self) -> T {
        self.working
    }
    /// Replaces the working value
    pub fn set(&mut self, value: T) {
        self.working = value;
    }
    pub fn value(&self) -> &T {
        &self.working
    }
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.working
    }
    /// Applies the given function to the working value in place
    pub fn modify<R, F : FnOnce(&mut T) -> R>(&mut self, op: F) -> R {
        op(&mut self.working)
    }
    /// Bytes of the value as they were read when the proxy was created
    pub fn initial_bytes(&self) -> &[u8] {
        &self.initial
    }
    /// Bytes of the working value
    pub fn working_bytes(&self) -> &[u8] {
        bytes_of(&self.working)
    }
    pub(crate) fn working_bytes_mut(&mut self) -> &mut [u8] {
        bytes_of_mut(&mut self.working)
    }
    /// Returns true if any byte of the working value differs from the initial snapshot
    pub fn is_dirty(&self) -> bool {
        self.initial.as_ref() != self.working_bytes()
    }
    /// Returns the runs that would be written if the proxy was committed now
    pub fn pending_runs(&self) -> Vec<ChangedRun> {
        changed_runs(&self.initial, self.working_bytes())
    }
    /// Writes all changed byte runs back to the address space and releases the proxy.
    /// If one of the writes fails, the writes issued before it are not rolled back, and the error is returned
    pub fn commit(mut self) -> anyhow::Result<CommitSummary> {
        self.commit_changes()
    }
    /// Releases the proxy without writing anything back
    pub fn discard(mut self) {
        self.released = true;
    }

    fn commit_changes(&mut self) -> anyhow::Result<CommitSummary> {
        self.released = true;
        let runs = self.pending_runs();
        let options = self.handle.space().options();
        let mut bytes_written: usize = 0;

        for run in &runs {
            let address = self.handle.address().checked_add(run.offset as u64)
                .ok_or(MemoryAccessError::AddressOverflow{address: self.handle.address(), offset: run.offset as u64})?;
            let chunk = &bytes_of(&self.working)[run.range()];
            if let Err(write_error) = self.handle.memory().write_chunk(address, chunk) {
                options.notify_commit_failed(&CommitFailure{address, length: run.length, message: format!("{:#}", write_error)});
                return Err(write_error.context(format!("Failed to commit {} changed bytes at address {:#x}", run.length, address)));
            }
            debug!(address, length = run.length, "committed changed bytes");
            options.notify_commit(&CommitEvent{address, length: run.length});
            bytes_written += run.length;
        }
        Ok(CommitSummary{runs, bytes_written})
    }
}
impl<M : Memory, T : RemoteValue> Drop for SnapshotProxy<M, T> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if std::thread::panicking() {
            self.released = true;
            warn!(address = self.handle.address(), "discarding snapshot changes while unwinding");
            return;
        }
        if let Err(commit_error) = self.commit_changes() {
            error!(address = self.handle.address(), "failed to commit snapshot on release: {:#}", commit_error);
            if self.handle.space().options().release_failure_policy() == ReleaseFailurePolicy::Panic {
                panic!("Failed to commit snapshot at address {:#x} on release: {:#}", self.handle.address(), commit_error);
            }
        }
    }
}
impl<M : Memory, T : RemoteValue> Debug for SnapshotProxy<M, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotProxy")
            .field("handle", &self.handle)
            .field("initial", &self.initial)
            .field("working", &self.working_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::address_space::AddressSpace;
    use crate::buffer_memory::BufferMemory;
    use crate::instrumentation::RecordingObserver;
    use crate::options::ProxyOptions;

    fn observed_space(bytes: Vec<u8>) -> (Arc<AddressSpace<BufferMemory>>, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::default());
        let space = AddressSpace::create_with_options(BufferMemory::from_bytes(bytes), ProxyOptions::default().observer(observer.clone()));
        (space, observer)
    }

    #[test]
    fn test_working_matches_initial_after_capture() {
        let (space, observer) = observed_space(vec![1, 2, 3, 4]);
        let proxy = space.handle::<u32>(0).dereference().unwrap();
        assert_eq!(proxy.initial_bytes(), proxy.working_bytes());
        assert!(!proxy.is_dirty());
        let summary = proxy.commit().unwrap();
        assert_eq!(summary.write_count(), 0);
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_single_changed_byte_is_written_alone() {
        let (space, observer) = observed_space(vec![0x0F, 0xFF, 0xFF, 0xFF]);
        {
            let mut proxy = space.handle::<[u8; 4]>(0).dereference().unwrap();
            proxy.value_mut()[1] = 0x00;
        }
        assert_eq!(observer.events(), vec![CommitEvent{address: 1, length: 1}]);
        assert_eq!(space.memory().snapshot(), vec![0x0F, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_discard_writes_nothing() {
        let (space, observer) = observed_space(vec![0; 8]);
        let mut proxy = space.handle::<u64>(0).dereference().unwrap();
        proxy.set(u64::MAX);
        assert!(proxy.is_dirty());
        proxy.discard();
        assert!(observer.events().is_empty());
        assert_eq!(space.memory().snapshot(), vec![0; 8]);
    }

    #[test]
    fn test_failed_capture_returns_error() {
        let (space, _) = observed_space(vec![0; 2]);
        let err = space.handle::<u32>(0).dereference().unwrap_err();
        assert!(matches!(MemoryAccessError::find_in(&err), Some(MemoryAccessError::OutOfRange{..})));
    }

    #[test]
    fn test_early_return_still_commits() {
        fn update_then_fail(space: &Arc<AddressSpace<BufferMemory>>) -> anyhow::Result<()> {
            let mut proxy = space.handle::<u16>(0).dereference()?;
            proxy.set(0xABCD);
            space.handle::<u16>(100).dereference()?;
            Ok({})
        }
        let (space, observer) = observed_space(vec![0; 4]);
        assert!(update_then_fail(&space).is_err());
        assert_eq!(space.handle::<u16>(0).read().unwrap(), 0xABCD);
        assert_eq!(observer.events().len(), 1);
    }

    #[test]
    fn test_unwinding_discards_changes() {
        let (space, observer) = observed_space(vec![0; 4]);
        let unwind_space = space.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let mut proxy = unwind_space.handle::<u32>(0).dereference().unwrap();
            proxy.set(7);
            if proxy.get() == 7 {
                panic!("abort mutation");
            }
        }));
        assert!(result.is_err());
        assert_eq!(space.memory().snapshot(), vec![0; 4]);
        assert!(observer.events().is_empty());
    }
}

use parking_lot::Mutex;

/// Describes a single write issued to the address space while committing a snapshot
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CommitEvent {
    pub address: u64,
    pub length: usize,
}

/// Describes a write that the address space rejected while committing a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFailure {
    pub address: u64,
    pub length: usize,
    pub message: String,
}

/// Receives notifications about writes issued by snapshot proxies. Observers are attached to an address space through ProxyOptions
pub trait CommitObserver : Send + Sync {
    /// Called after each write call that completed successfully
    fn on_commit(&self, event: &CommitEvent);
    /// Called when a write call fails. Writes issued before the failing one are not rolled back
    fn on_commit_failed(&self, _failure: &CommitFailure) {}
}

/// Observer that keeps all received notifications in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CommitEvent>>,
    failures: Mutex<Vec<CommitFailure>>,
}
impl RecordingObserver {
    /// Returns all successful writes observed so far, in the order they were issued
    pub fn events(&self) -> Vec<CommitEvent> {
        self.events.lock().clone()
    }
    /// Returns all failed writes observed so far
    pub fn failures(&self) -> Vec<CommitFailure> {
        self.failures.lock().clone()
    }
    /// Forgets all observed notifications
    pub fn clear(&self) {
        self.events.lock().clear();
        self.failures.lock().clear();
    }
}
impl CommitObserver for RecordingObserver {
    fn on_commit(&self, event: &CommitEvent) {
        self.events.lock().push(*event);
    }
    fn on_commit_failed(&self, failure: &CommitFailure) {
        self.failures.lock().push(failure.clone());
    }
}

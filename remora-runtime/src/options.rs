use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use crate::instrumentation::{CommitEvent, CommitFailure, CommitObserver};

/// Determines what happens when a snapshot is released implicitly (by going out of scope) and one of the commit writes fails.
/// Explicit commits always return the error to the caller regardless of the policy
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ReleaseFailurePolicy {
    /// Log the failure and notify the observer, then continue
    #[default]
    LogAndSuppress,
    /// Log the failure, notify the observer and panic, unless the thread is already panicking
    Panic,
}

/// Options shared by all handles and proxies created from the same address space
#[derive(Clone, Default)]
pub struct ProxyOptions {
    release_failure: ReleaseFailurePolicy,
    observer: Option<Arc<dyn CommitObserver>>,
    null_sentinel: Option<u64>,
}
impl Debug for ProxyOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyOptions")
            .field("release_failure", &self.release_failure)
            .field("has_observer", &self.observer.is_some())
            .field("null_sentinel", &self.null_sentinel)
            .finish()
    }
}
impl ProxyOptions {
    /// Sets the policy applied when an implicit release fails to write the changes back
    pub fn release_failure(mut self, policy: ReleaseFailurePolicy) -> Self {
        self.release_failure = policy; self
    }
    /// Attaches an observer that will be notified about every write issued by the proxies
    pub fn observer(mut self, observer: Arc<dyn CommitObserver>) -> Self {
        self.observer = Some(observer); self
    }
    /// Treats stored pointers holding the given address as null. Chasing such a pointer fails with NullPointer instead of reading the address.
    /// By default no address is special, and every stored address is followed as is
    pub fn null_sentinel(mut self, address: u64) -> Self {
        self.null_sentinel = Some(address); self
    }
    pub fn release_failure_policy(&self) -> ReleaseFailurePolicy {
        self.release_failure
    }
    pub fn null_sentinel_address(&self) -> Option<u64> {
        self.null_sentinel
    }
    pub(crate) fn notify_commit(&self, event: &CommitEvent) {
        if let Some(observer) = &self.observer {
            observer.on_commit(event);
        }
    }
    pub(crate) fn notify_commit_failed(&self, failure: &CommitFailure) {
        if let Some(observer) = &self.observer {
            observer.on_commit_failed(failure);
        }
    }
}

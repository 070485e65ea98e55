//! Detection of changed byte runs between the initial snapshot of a value and its working copy

/// Maximal contiguous range of bytes that differ between the initial and the working copy, relative to the start of the value
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChangedRun {
    pub offset: usize,
    pub length: usize,
}
impl ChangedRun {
    /// Returns the byte range covered by this run
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..(self.offset + self.length)
    }
}

/// Scans both buffers in order and returns every maximal run of differing bytes, in ascending offset order.
/// Bytes that are equal never appear in a run, and runs separated by at least one equal byte are never merged
pub fn changed_runs(initial: &[u8], working: &[u8]) -> Vec<ChangedRun> {
    assert_eq!(initial.len(), working.len(), "Initial and working copies must have the same length");
    let mut runs: Vec<ChangedRun> = Vec::new();
    let mut run_start: usize = 0;
    let mut run_length: usize = 0;

    for offset in 0..initial.len() {
        if initial[offset] != working[offset] {
            if run_length == 0 {
                run_start = offset;
            }
            run_length += 1;
        } else if run_length > 0 {
            runs.push(ChangedRun{offset: run_start, length: run_length});
            run_length = 0;
        }
    }
    if run_length > 0 {
        runs.push(ChangedRun{offset: run_start, length: run_length});
    }
    runs
}

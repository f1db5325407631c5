use std::time::Duration;

/// Tunables for the compaction gate, grouped the way
/// `message_log::OpenOptions` groups its knobs rather than scattered as bare
/// constants in function bodies.
#[derive(Debug, Clone, Copy)]
pub struct CompactionPolicy {
    /// Minimum time between compactions.
    pub min_interval: Duration,
    /// How soon to retry after a failed compaction attempt.
    pub retry_interval: Duration,
    /// Minimum transactions appended since the last snapshot.
    pub min_transactions: u64,
    /// Minimum total log size.
    pub min_log_bytes: u64,
    /// Minimum ratio of log size to snapshot size.
    pub size_ratio: u64,
}

impl Default for CompactionPolicy {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(10 * 60),
            retry_interval: Duration::from_secs(60),
            min_transactions: 100,
            min_log_bytes: 10 * 1024 * 1024,
            size_ratio: 4,
        }
    }
}

impl CompactionPolicy {
    pub(crate) fn should_compact(&self, log_size: u64, n_transactions: u64, snapshot_size: u64) -> bool {
        n_transactions >= self.min_transactions && log_size >= self.min_log_bytes && log_size >= self.size_ratio * snapshot_size
    }
}

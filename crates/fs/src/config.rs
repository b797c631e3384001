/// Batch size for sending records through the channel.
/// Larger batches reduce channel overhead but increase latency.
pub const BATCH_SIZE: usize = 64;

/// How long an idle walker waits on the work queue before re-checking
/// whether the walk is finished.
pub const IDLE_POLL_MS: u64 = 50;

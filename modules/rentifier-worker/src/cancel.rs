//! Run-level cancellation. A watchdog flips the flag at the wall-clock
//! deadline; jobs check it between units of work and stop picking up more.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

pub fn cancelled(flag: &AtomicBool) -> bool {
    flag.load(Ordering::Relaxed)
}

/// Arm a deadline: after `secs`, the flag is set and in-progress runs wind
/// down with partial summaries.
pub fn spawn_deadline(flag: Arc<AtomicBool>, secs: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(secs)).await;
        warn!(deadline_secs = secs, "Run deadline reached, cancelling");
        flag.store(true, Ordering::Relaxed);
    });
}

//! Process-wide deployment counters.
//!
//! Counters are bumped at the call site and emitted together by
//! [`Metrics::flush`], typically once per handled event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lock-free atomic counters.
pub struct Metrics {
    events_received: AtomicU64,
    no_matches: AtomicU64,
    deployments_succeeded: AtomicU64,
    deployments_failed: AtomicU64,
    commands_executed: AtomicU64,
    clones_skipped: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            events_received: AtomicU64::new(0),
            no_matches: AtomicU64::new(0),
            deployments_succeeded: AtomicU64::new(0),
            deployments_failed: AtomicU64::new(0),
            commands_executed: AtomicU64::new(0),
            clones_skipped: AtomicU64::new(0),
        }
    }

    /// Increment the events-received counter by one.
    pub fn inc_events_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the no-match counter by one.
    pub fn inc_no_matches(&self) {
        self.no_matches.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the succeeded-deployments counter by one.
    pub fn inc_deployments_succeeded(&self) {
        self.deployments_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the failed-deployments counter by one.
    pub fn inc_deployments_failed(&self) {
        self.deployments_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the commands-executed counter by one.
    pub fn inc_commands_executed(&self) {
        self.commands_executed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the clones-skipped counter by one.
    pub fn inc_clones_skipped(&self) {
        self.clones_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Emit all counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            events_received = self.events_received(),
            no_matches = self.no_matches(),
            deployments_succeeded = self.deployments_succeeded(),
            deployments_failed = self.deployments_failed(),
            commands_executed = self.commands_executed(),
            clones_skipped = self.clones_skipped(),
        );
    }

    /// Read the current events-received count.
    pub fn events_received(&self) -> u64 {
        self.events_received.load(Ordering::Relaxed)
    }

    /// Read the current no-match count.
    pub fn no_matches(&self) -> u64 {
        self.no_matches.load(Ordering::Relaxed)
    }

    /// Read the current succeeded-deployments count.
    pub fn deployments_succeeded(&self) -> u64 {
        self.deployments_succeeded.load(Ordering::Relaxed)
    }

    /// Read the current failed-deployments count.
    pub fn deployments_failed(&self) -> u64 {
        self.deployments_failed.load(Ordering::Relaxed)
    }

    /// Read the current commands-executed count.
    pub fn commands_executed(&self) -> u64 {
        self.commands_executed.load(Ordering::Relaxed)
    }

    /// Read the current clones-skipped count.
    pub fn clones_skipped(&self) -> u64 {
        self.clones_skipped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment_independently() {
        let m = Metrics::new();
        m.inc_events_received();
        m.inc_events_received();
        m.inc_no_matches();
        m.inc_commands_executed();
        m.inc_commands_executed();
        m.inc_commands_executed();

        assert_eq!(m.events_received(), 2);
        assert_eq!(m.no_matches(), 1);
        assert_eq!(m.commands_executed(), 3);
        assert_eq!(m.deployments_succeeded(), 0);
        assert_eq!(m.deployments_failed(), 0);
        assert_eq!(m.clones_skipped(), 0);
    }

    #[test]
    fn outcome_counters() {
        let m = Metrics::new();
        m.inc_deployments_succeeded();
        m.inc_deployments_failed();
        m.inc_deployments_failed();
        m.inc_clones_skipped();
        assert_eq!(m.deployments_succeeded(), 1);
        assert_eq!(m.deployments_failed(), 2);
        assert_eq!(m.clones_skipped(), 1);
    }
}

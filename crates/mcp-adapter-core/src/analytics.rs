//! In-memory invocation analytics
//!
//! The dispatcher reports every invocation through the narrow
//! [`InvocationRecorder`] seam; the counter implementation is swappable
//! (external metrics sinks included) without touching dispatch logic.
//! Counters are derived data, never authoritative, and are not persisted
//! across process restarts.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::types::{InvocationOutcome, InvocationRecord};

/// Recording seam between the dispatcher and whatever aggregates calls
pub trait InvocationRecorder: Send + Sync {
    /// Record one finished invocation, whatever its outcome
    fn record(&self, record: InvocationRecord);
}

/// Recorder that drops everything; for tests and wiring without analytics
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpRecorder;

impl NoOpRecorder {
    pub fn new() -> Self {
        Self
    }
}

impl InvocationRecorder for NoOpRecorder {
    fn record(&self, _record: InvocationRecord) {}
}

/// Aggregated counters for one (server, tool) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolStats {
    pub success: u64,
    pub validation_error: u64,
    pub execution_error: u64,
    pub total_calls: u64,
    /// Sum of invocation durations, for averaging
    #[serde(skip)]
    total_duration: Duration,
}

impl ToolStats {
    /// Average invocation duration across all recorded calls
    pub fn avg_duration(&self) -> Duration {
        if self.total_calls == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.total_calls as u32
        }
    }

    fn absorb(&mut self, outcome: InvocationOutcome, duration: Duration) {
        self.total_calls += 1;
        self.total_duration += duration;
        match outcome {
            InvocationOutcome::Success => self.success += 1,
            InvocationOutcome::ValidationError => self.validation_error += 1,
            // Timeouts and cancellations are execution failures in the
            // three-bucket aggregate; the record keeps the precise kind
            InvocationOutcome::ExecutionError
            | InvocationOutcome::Timeout
            | InvocationOutcome::Cancelled => self.execution_error += 1,
            // Resolution failures count toward totals only
            InvocationOutcome::ServerDisabled | InvocationOutcome::NotFound => {}
        }
    }
}

/// Per-tool usage row in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolUsage {
    pub server: String,
    pub tool: String,
    pub success: u64,
    pub validation_error: u64,
    pub execution_error: u64,
    pub total_calls: u64,
    pub avg_duration_ms: u64,
}

/// Serializable snapshot of all counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    /// Rows sorted by (server, tool) for deterministic output
    pub tools: Vec<ToolUsage>,
    /// Calls recorded process-wide, resolution failures included
    pub total_calls: u64,
    /// Per-outcome totals across all tools
    pub outcomes: HashMap<String, u64>,
}

/// In-memory analytics counter.
///
/// A single mutex guards both maps so concurrent `record` calls lose no
/// increments; each record is one short critical section.
#[derive(Default)]
pub struct AnalyticsCounter {
    inner: Mutex<CounterState>,
}

#[derive(Default)]
struct CounterState {
    per_tool: HashMap<(String, String), ToolStats>,
    per_outcome: HashMap<InvocationOutcome, u64>,
    total_calls: u64,
}

impl AnalyticsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot current counters for dashboard consumption
    pub fn snapshot(&self) -> AnalyticsSnapshot {
        let state = self.inner.lock();

        let mut tools: Vec<ToolUsage> = state
            .per_tool
            .iter()
            .map(|((server, tool), stats)| ToolUsage {
                server: server.clone(),
                tool: tool.clone(),
                success: stats.success,
                validation_error: stats.validation_error,
                execution_error: stats.execution_error,
                total_calls: stats.total_calls,
                avg_duration_ms: stats.avg_duration().as_millis() as u64,
            })
            .collect();
        tools.sort_by(|a, b| (&a.server, &a.tool).cmp(&(&b.server, &b.tool)));

        let outcomes = state
            .per_outcome
            .iter()
            .map(|(outcome, count)| (outcome.as_str().to_string(), *count))
            .collect();

        AnalyticsSnapshot {
            tools,
            total_calls: state.total_calls,
            outcomes,
        }
    }

    /// Counters for one (server, tool) pair, if any call was recorded
    pub fn tool_stats(&self, server: &str, tool: &str) -> Option<ToolStats> {
        self.inner
            .lock()
            .per_tool
            .get(&(server.to_string(), tool.to_string()))
            .copied()
    }

    /// Total calls recorded so far
    pub fn total_calls(&self) -> u64 {
        self.inner.lock().total_calls
    }
}

impl InvocationRecorder for AnalyticsCounter {
    fn record(&self, record: InvocationRecord) {
        let mut state = self.inner.lock();
        state.total_calls += 1;
        *state.per_outcome.entry(record.outcome).or_default() += 1;
        state
            .per_tool
            .entry((record.server, record.tool))
            .or_default()
            .absorb(record.outcome, record.duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(outcome: InvocationOutcome, ms: u64) -> InvocationRecord {
        InvocationRecord::new("srv", "tool", outcome, Duration::from_millis(ms))
    }

    #[test]
    fn test_counts_by_outcome() {
        let counter = AnalyticsCounter::new();
        counter.record(record(InvocationOutcome::Success, 10));
        counter.record(record(InvocationOutcome::Success, 20));
        counter.record(record(InvocationOutcome::ValidationError, 1));
        counter.record(record(InvocationOutcome::ExecutionError, 5));

        let stats = counter.tool_stats("srv", "tool").unwrap();
        assert_eq!(stats.success, 2);
        assert_eq!(stats.validation_error, 1);
        assert_eq!(stats.execution_error, 1);
        assert_eq!(stats.total_calls, 4);
        assert_eq!(stats.avg_duration(), Duration::from_millis(9));
    }

    #[test]
    fn test_timeout_and_cancel_fold_into_execution_errors() {
        let counter = AnalyticsCounter::new();
        counter.record(record(InvocationOutcome::Timeout, 100));
        counter.record(record(InvocationOutcome::Cancelled, 50));

        let stats = counter.tool_stats("srv", "tool").unwrap();
        assert_eq!(stats.execution_error, 2);

        // The precise kinds survive in the outcome totals
        let snapshot = counter.snapshot();
        assert_eq!(snapshot.outcomes.get("timeout"), Some(&1));
        assert_eq!(snapshot.outcomes.get("cancelled"), Some(&1));
    }

    #[test]
    fn test_resolution_failures_count_toward_totals_only() {
        let counter = AnalyticsCounter::new();
        counter.record(record(InvocationOutcome::ServerDisabled, 0));
        counter.record(record(InvocationOutcome::NotFound, 0));

        let stats = counter.tool_stats("srv", "tool").unwrap();
        assert_eq!(stats.total_calls, 2);
        assert_eq!(stats.success, 0);
        assert_eq!(stats.execution_error, 0);
        assert_eq!(counter.total_calls(), 2);
    }

    #[test]
    fn test_snapshot_sorted_and_serializable() {
        let counter = AnalyticsCounter::new();
        counter.record(InvocationRecord::new(
            "zeta",
            "t",
            InvocationOutcome::Success,
            Duration::ZERO,
        ));
        counter.record(InvocationRecord::new(
            "alpha",
            "t",
            InvocationOutcome::Success,
            Duration::ZERO,
        ));

        let snapshot = counter.snapshot();
        assert_eq!(snapshot.tools[0].server, "alpha");
        assert_eq!(snapshot.tools[1].server, "zeta");
        // Must serialize cleanly for the dashboard boundary
        serde_json::to_value(&snapshot).unwrap();
    }

    #[test]
    fn test_concurrent_records_lose_nothing() {
        let counter = Arc::new(AnalyticsCounter::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let counter = Arc::clone(&counter);
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    counter.record(record(InvocationOutcome::Success, 1));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.total_calls(), 800);
        assert_eq!(counter.tool_stats("srv", "tool").unwrap().success, 800);
    }
}

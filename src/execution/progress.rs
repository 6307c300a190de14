//! Progress reporting for recomputation passes.

use crate::core::error::NodeId;
use serde::Serialize;
use std::time::{Duration, Instant};

/// An event emitted while a recomputation pass runs.
#[derive(Debug, Clone, PartialEq)]
pub enum RecomputeEvent {
    /// A pass has started.
    Started {
        /// Nodes dirty at the start of the pass.
        dirty_nodes: usize,
    },
    /// A node was evaluated and its output cached.
    NodeEvaluated {
        node_id: NodeId,
        node_name: String,
        duration_ms: u64,
    },
    /// A dirty node was left alone this pass.
    NodeSkipped { node_id: NodeId, reason: SkipReason },
    /// A node's evaluation failed; its previous output is kept.
    NodeFailed {
        node_id: NodeId,
        node_name: String,
        message: String,
    },
    /// The pass has completed.
    Completed { stats: RecomputeStats },
}

/// Reason why a dirty node was not evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The node failed and nothing changed since.
    Stalled,
    /// An upstream producer has no current output.
    UpstreamDirty,
    /// The node reads the graph input, which is not set.
    NoInput,
}

/// Callback type for recompute events.
pub type RecomputeObserver = Box<dyn Fn(&RecomputeEvent) + Send + Sync>;

/// Counters of one recomputation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecomputeStats {
    /// Nodes whose evaluation succeeded.
    pub evaluated: usize,
    /// Nodes whose evaluation failed.
    pub failed: usize,
    /// Dirty nodes that were not evaluated.
    pub skipped: usize,
    /// Clean nodes whose cached output was reused.
    pub reused: usize,
    /// Wall-clock duration of the pass.
    pub duration_ms: u64,
}

/// Accumulates [`RecomputeStats`] and forwards events to an observer.
pub struct RecomputeTracker<'a> {
    stats: RecomputeStats,
    start_time: Instant,
    observer: Option<&'a RecomputeObserver>,
}

impl<'a> RecomputeTracker<'a> {
    /// Start tracking a pass over `dirty_nodes` dirty nodes.
    pub fn start(dirty_nodes: usize, observer: Option<&'a RecomputeObserver>) -> Self {
        let tracker = Self {
            stats: RecomputeStats::default(),
            start_time: Instant::now(),
            observer,
        };
        tracker.send(RecomputeEvent::Started { dirty_nodes });
        tracker
    }

    /// Report a successful evaluation.
    pub fn node_evaluated(&mut self, node_id: NodeId, node_name: &str, duration: Duration) {
        self.stats.evaluated += 1;
        self.send(RecomputeEvent::NodeEvaluated {
            node_id,
            node_name: node_name.to_string(),
            duration_ms: duration.as_millis() as u64,
        });
    }

    /// Report a failed evaluation.
    pub fn node_failed(&mut self, node_id: NodeId, node_name: &str, message: &str) {
        self.stats.failed += 1;
        self.send(RecomputeEvent::NodeFailed {
            node_id,
            node_name: node_name.to_string(),
            message: message.to_string(),
        });
    }

    /// Report a dirty node that was left alone.
    pub fn node_skipped(&mut self, node_id: NodeId, reason: SkipReason) {
        self.stats.skipped += 1;
        self.send(RecomputeEvent::NodeSkipped { node_id, reason });
    }

    /// Report a clean node.
    pub fn node_reused(&mut self) {
        self.stats.reused += 1;
    }

    /// Finish the pass and return its counters.
    pub fn finish(mut self) -> RecomputeStats {
        self.stats.duration_ms = self.start_time.elapsed().as_millis() as u64;
        self.send(RecomputeEvent::Completed { stats: self.stats });
        self.stats
    }

    fn send(&self, event: RecomputeEvent) {
        if let Some(observer) = self.observer {
            observer(&event);
        }
    }
}

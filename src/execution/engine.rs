//! Recomputation pass and interactive tick.
//!
//! The pass visits nodes in evaluation order and evaluates each dirty node
//! whose input is current. Clean nodes are reused as they are, so a node is
//! evaluated at most once per pass no matter how many consumers it has.

use crate::core::controls::ParameterUi;
use crate::core::error::{EvaluationError, NodeId, NodeStatus};
use crate::core::types::{Bundle, Capability, Value};
use crate::execution::progress::{RecomputeStats, RecomputeTracker, SkipReason};
use crate::execution::timing::ScopedTimer;
use crate::graph::composition::{CompositionGraph, InputSource};
use crate::graph::connection::{Endpoint, Port};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Recomputation options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecomputeOptions {
    /// Log a warning for nodes whose evaluation takes longer than this.
    pub slow_node_warning_ms: Option<u64>,
    /// Re-evaluate failed nodes on every pass instead of waiting for a change.
    pub retry_failed: bool,
}

impl Default for RecomputeOptions {
    fn default() -> Self {
        Self {
            slow_node_warning_ms: Some(100),
            retry_failed: false,
        }
    }
}

impl RecomputeOptions {
    /// Create a new options builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the slow node threshold; `None` disables the warning.
    pub fn with_slow_node_warning(mut self, threshold: Option<Duration>) -> Self {
        self.slow_node_warning_ms = threshold.map(|t| t.as_millis() as u64);
        self
    }

    /// Enable/disable retrying failed nodes.
    pub fn with_retry_failed(mut self, retry: bool) -> Self {
        self.retry_failed = retry;
        self
    }
}

/// What one recomputation pass did.
#[derive(Debug, Clone, Default)]
pub struct RecomputeReport {
    /// Nodes evaluated successfully, in evaluation order.
    pub evaluated: Vec<NodeId>,
    /// Nodes whose evaluation failed.
    pub failed: Vec<(NodeId, EvaluationError)>,
    /// Dirty nodes that were left alone.
    pub skipped: Vec<(NodeId, SkipReason)>,
    pub stats: RecomputeStats,
}

impl RecomputeReport {
    /// Whether any node failed during the pass.
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// What one interactive tick did.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Nodes whose parameters changed while their controls were rendered.
    pub changed: Vec<NodeId>,
    pub recompute: RecomputeReport,
}

/// Outcome of gathering a node's input.
enum Gathered {
    Ready(Value),
    Blocked,
    NoInput,
}

impl CompositionGraph {
    /// One interactive cycle: render controls, propagate, recompute.
    pub fn tick(&mut self, ui: &mut dyn ParameterUi) -> TickReport {
        let changed = self.render_controls(ui);
        let recompute = self.recompute();
        TickReport { changed, recompute }
    }

    /// Evaluate every dirty node whose input is current, in evaluation order.
    ///
    /// A failing node keeps its previous output and stays dirty, which keeps
    /// its consumers dirty too. It is not tried again until it or something
    /// upstream changes, unless [`RecomputeOptions::retry_failed`] is set.
    pub fn recompute(&mut self) -> RecomputeReport {
        let _timer = ScopedTimer::debug("recompute");
        let dirty = self.nodes.values().filter(|slot| slot.dirty).count();
        let mut tracker = RecomputeTracker::start(dirty, self.observer.as_ref());
        let mut report = RecomputeReport::default();

        for index in 0..self.order.len() {
            let id = self.order[index];
            let Some(slot) = self.nodes.get(&id) else {
                continue;
            };

            if !slot.dirty {
                tracker.node_reused();
                continue;
            }

            if slot.stalled && !self.options.retry_failed {
                log::debug!("Skipping {}: failed and unchanged", slot.node.name());
                tracker.node_skipped(id, SkipReason::Stalled);
                report.skipped.push((id, SkipReason::Stalled));
                continue;
            }

            let input = match self.gather_input(&slot.input) {
                Gathered::Ready(value) => value,
                Gathered::Blocked => {
                    if let Some(slot) = self.nodes.get_mut(&id) {
                        slot.status = NodeStatus::Blocked;
                    }
                    tracker.node_skipped(id, SkipReason::UpstreamDirty);
                    report.skipped.push((id, SkipReason::UpstreamDirty));
                    continue;
                }
                Gathered::NoInput => {
                    if let Some(slot) = self.nodes.get_mut(&id) {
                        slot.status = NodeStatus::Unconnected;
                    }
                    tracker.node_skipped(id, SkipReason::NoInput);
                    report.skipped.push((id, SkipReason::NoInput));
                    continue;
                }
            };

            let Some(slot) = self.nodes.get_mut(&id) else {
                continue;
            };
            let name = slot.node.name().to_string();

            let timer = ScopedTimer::debug_lazy(|| format!("evaluate {}", name));
            let result = slot.node.evaluate(&input).and_then(|output| {
                if slot.output_capability.accepts(&output) {
                    Ok(output)
                } else {
                    Err(EvaluationError::OutputTypeMismatch {
                        expected: slot.output_capability.clone(),
                        got: Capability::of_value(&output),
                    })
                }
            });
            let elapsed = timer.elapsed();
            drop(timer);
            slot.evaluations += 1;

            if let Some(limit) = self.options.slow_node_warning_ms {
                if elapsed.as_millis() as u64 > limit {
                    log::warn!("{} took {} ms (limit {} ms)", name, elapsed.as_millis(), limit);
                }
            }

            match result {
                Ok(output) => {
                    log::debug!("Evaluated {}", name);
                    slot.cached_output = Some(output);
                    slot.dirty = false;
                    slot.stalled = false;
                    slot.status = NodeStatus::Ready;
                    tracker.node_evaluated(id, &name, elapsed);
                    report.evaluated.push(id);
                }
                Err(error) => {
                    log::warn!("{} failed: {}", name, error);
                    slot.stalled = true;
                    slot.status = NodeStatus::Failed {
                        message: error.to_string(),
                    };
                    tracker.node_failed(id, &name, &error.to_string());
                    report.failed.push((id, error));
                }
            }
        }

        report.stats = tracker.finish();
        report
    }

    fn gather_input(&self, source: &InputSource) -> Gathered {
        match source {
            InputSource::Root => match &self.root {
                Some(value) => Gathered::Ready(value.clone()),
                None => Gathered::NoInput,
            },
            InputSource::Whole(from) => match self.current_output(from) {
                Some(value) => Gathered::Ready(value),
                None => Gathered::Blocked,
            },
            InputSource::Components(producers) => {
                let mut components = Vec::with_capacity(producers.len());
                for from in producers {
                    match self.current_output(from) {
                        Some(value) => components.push(value),
                        None => return Gathered::Blocked,
                    }
                }
                Gathered::Ready(Value::new(Bundle::new(components)))
            }
        }
    }

    /// What a producer port currently carries; `None` while the producer is dirty.
    fn current_output(&self, from: &Endpoint) -> Option<Value> {
        let producer = self.nodes.get(&from.node_id)?;
        if producer.dirty {
            return None;
        }
        let output = producer.cached_output.as_ref()?;
        match from.port {
            Port::Whole => Some(output.clone()),
            Port::Component(index) => output.downcast_ref::<Bundle>()?.component(index).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controls::{NoopUi, ScriptedUi};
    use crate::execution::progress::{RecomputeEvent, RecomputeObserver};
    use crate::graph::test_nodes::{shift, Liar};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_output_capability_is_enforced() {
        let mut graph = CompositionGraph::chain(vec![shift("A", 1), Box::new(Liar)]).unwrap();
        graph.set_input(Value::new(1i64)).unwrap();

        let report = graph.recompute();
        assert_eq!(report.evaluated.len(), 1);
        assert!(matches!(
            report.failed[0].1,
            EvaluationError::OutputTypeMismatch { .. }
        ));
        assert!(graph.final_output().is_none());
        assert!(graph.output(graph.terminal()).is_none());
    }

    #[test]
    fn test_retry_failed_reevaluates_every_pass() {
        let mut graph = CompositionGraph::chain(vec![shift("A", 1)])
            .unwrap()
            .with_options(RecomputeOptions::new().with_retry_failed(true));
        graph.set_input(Value::new(1i64)).unwrap();
        graph.tick(&mut ScriptedUi::new().click("A/fail"));

        let a = graph.terminal();
        assert_eq!(graph.node(a).unwrap().evaluations, 1);
        graph.recompute();
        graph.recompute();
        assert_eq!(graph.node(a).unwrap().evaluations, 3);
    }

    #[test]
    fn test_observer_sees_every_step() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let observer: RecomputeObserver = Box::new(move |event| sink.lock().push(event.clone()));

        let mut graph = CompositionGraph::chain(vec![shift("A", 1), shift("B", 1)]).unwrap();
        graph.set_observer(observer);
        graph.set_input(Value::new(1i64)).unwrap();
        let report = graph.tick(&mut NoopUi);

        assert_eq!(report.recompute.stats.evaluated, 2);
        let events = events.lock();
        assert_eq!(events.first(), Some(&RecomputeEvent::Started { dirty_nodes: 2 }));
        let evaluated: Vec<&str> = events
            .iter()
            .filter_map(|event| match event {
                RecomputeEvent::NodeEvaluated { node_name, .. } => Some(node_name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(evaluated, ["A", "B"]);
    }

    #[test]
    fn test_skipped_nodes_are_reported() {
        let mut graph = CompositionGraph::chain(vec![shift("A", 1), shift("B", 1)]).unwrap();
        let report = graph.recompute();

        let reasons: Vec<SkipReason> = report.skipped.iter().map(|(_, r)| *r).collect();
        assert_eq!(reasons, [SkipReason::NoInput, SkipReason::UpstreamDirty]);
        assert_eq!(report.stats.skipped, 2);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: RecomputeOptions = toml::from_str("retry_failed = true").unwrap();

        assert!(options.retry_failed);
        assert_eq!(options.slow_node_warning_ms, Some(100));
        assert_eq!(
            RecomputeOptions::new().with_slow_node_warning(None).slow_node_warning_ms,
            None
        );
    }
}

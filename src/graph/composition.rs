//! The runtime composition graph.
//!
//! A [`CompositionGraph`] owns every node in one arena keyed by [`NodeId`],
//! the validated edges between them and the graph input. It keeps one
//! cached output and one dirty flag per node; the recomputation pass in
//! [`crate::execution::engine`] uses them to evaluate only what changed.
//!
//! Mutation paths are deliberately narrow:
//! - parameters change only inside [`TransformNode::render_parameter_controls`],
//!   reached through [`CompositionGraph::render_controls`] or a [`NodeHandle`]
//! - the graph input changes only through [`CompositionGraph::set_input`]
//! - cached outputs and dirty flags are written only by the graph itself

use crate::core::controls::ParameterUi;
use crate::core::error::{GraphError, GraphResult, NodeId, NodeStatus};
use crate::core::node::{Category, TransformNode};
use crate::core::types::{Capability, Value};
use crate::execution::engine::RecomputeOptions;
use crate::execution::progress::RecomputeObserver;
use crate::graph::connection::{Connection, Endpoint};
use crate::graph::structure::GraphBuilder;
use crate::graph::topology::TopologyAnalyzer;
use indexmap::IndexMap;
use serde::Serialize;

/// Where a node reads its input from.
#[derive(Debug, Clone)]
pub(crate) enum InputSource {
    /// The graph input.
    Root,
    /// One producer port, carried whole.
    Whole(Endpoint),
    /// One producer port per bundle component, in component order.
    Components(Vec<Endpoint>),
}

/// A node together with its runtime state.
pub(crate) struct NodeSlot {
    pub(crate) id: NodeId,
    pub(crate) node: Box<dyn TransformNode>,
    pub(crate) input: InputSource,
    pub(crate) output_capability: Capability,
    pub(crate) cached_output: Option<Value>,
    pub(crate) dirty: bool,
    /// Failed and unchanged since; not retried until re-dirtied.
    pub(crate) stalled: bool,
    pub(crate) status: NodeStatus,
    pub(crate) evaluations: u64,
    /// Set by [`NodeHandle::render_controls`], consumed by dirty propagation.
    pub(crate) pending_change: bool,
}

impl NodeSlot {
    pub(crate) fn new(id: NodeId, node: Box<dyn TransformNode>, input: InputSource) -> Self {
        let output_capability = node.output_capability();
        Self {
            id,
            node,
            input,
            output_capability,
            cached_output: None,
            dirty: true,
            stalled: false,
            status: NodeStatus::Pending,
            evaluations: 0,
            pending_change: false,
        }
    }

    fn view(&self) -> NodeView<'_> {
        NodeView {
            id: self.id,
            name: self.node.name(),
            category: self.node.category(),
            status: &self.status,
            dirty: self.dirty,
            cached_output: self.cached_output.as_ref(),
            evaluations: self.evaluations,
        }
    }
}

/// Read-only view of one node, handed to presentation code.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    pub id: NodeId,
    pub name: &'a str,
    pub category: Category,
    pub status: &'a NodeStatus,
    pub dirty: bool,
    /// Last successfully produced output; kept while the node is dirty.
    pub cached_output: Option<&'a Value>,
    /// How many times `evaluate` has been invoked on this node.
    pub evaluations: u64,
}

/// Mutable access to one node for an external presentation adapter.
///
/// The only thing a handle can change is the node's parameters, through
/// [`render_controls`](Self::render_controls).
pub struct NodeHandle<'a> {
    slot: &'a mut NodeSlot,
}

impl<'a> NodeHandle<'a> {
    pub fn id(&self) -> NodeId {
        self.slot.id
    }

    pub fn name(&self) -> &str {
        self.slot.node.name()
    }

    pub fn status(&self) -> &NodeStatus {
        &self.slot.status
    }

    pub fn is_dirty(&self) -> bool {
        self.slot.dirty
    }

    pub fn cached_output(&self) -> Option<&Value> {
        self.slot.cached_output.as_ref()
    }

    /// Render the node's parameter controls, scoped by node name like
    /// [`CompositionGraph::render_controls`].
    ///
    /// A reported change is remembered and turned into dirtiness once the
    /// surrounding [`CompositionGraph::for_each_node_mut`] call returns.
    pub fn render_controls(&mut self, ui: &mut dyn ParameterUi) -> bool {
        ui.push_scope(self.slot.node.name());
        let changed = self.slot.node.render_parameter_controls(ui);
        ui.pop_scope();
        self.slot.pending_change |= changed;
        changed
    }
}

/// An interactive recomputation graph of [`TransformNode`]s.
pub struct CompositionGraph {
    pub(crate) nodes: IndexMap<NodeId, NodeSlot>,
    pub(crate) connections: Vec<Connection>,
    /// Evaluation order, fixed at construction.
    pub(crate) order: Vec<NodeId>,
    /// Nodes fed from the graph input.
    pub(crate) sources: Vec<NodeId>,
    pub(crate) root: Option<Value>,
    pub(crate) root_capability: Capability,
    pub(crate) terminal: NodeId,
    pub(crate) options: RecomputeOptions,
    pub(crate) observer: Option<RecomputeObserver>,
}

impl std::fmt::Debug for CompositionGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.nodes.values().map(|slot| slot.node.name()).collect();
        f.debug_struct("CompositionGraph")
            .field("nodes", &names)
            .field("connections", &self.connections.len())
            .field("root_capability", &self.root_capability)
            .field("root_set", &self.root.is_some())
            .finish()
    }
}

impl CompositionGraph {
    pub(crate) fn from_parts(
        nodes: IndexMap<NodeId, NodeSlot>,
        connections: Vec<Connection>,
        order: Vec<NodeId>,
        sources: Vec<NodeId>,
        root_capability: Capability,
        terminal: NodeId,
    ) -> Self {
        Self {
            nodes,
            connections,
            order,
            sources,
            root: None,
            root_capability,
            terminal,
            options: RecomputeOptions::default(),
            observer: None,
        }
    }

    /// Start building a graph.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// Build a linear chain `nodes[0] -> nodes[1] -> ...`.
    pub fn chain(nodes: Vec<Box<dyn TransformNode>>) -> GraphResult<Self> {
        let mut builder = GraphBuilder::new();
        let mut previous: Option<NodeId> = None;
        for node in nodes {
            let id = builder.add_node(node);
            if let Some(previous) = previous {
                builder.connect(previous, id)?;
            }
            previous = Some(id);
        }
        builder.build()
    }

    /// Use these options for subsequent passes.
    pub fn with_options(mut self, options: RecomputeOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the recompute options.
    pub fn options(&self) -> &RecomputeOptions {
        &self.options
    }

    /// Receive an event for every step of every recomputation pass.
    pub fn set_observer(&mut self, observer: RecomputeObserver) {
        self.observer = Some(observer);
    }

    // ========================================================================
    // Input and dirtiness
    // ========================================================================

    /// Replace the graph input and invalidate every node fed from it.
    pub fn set_input(&mut self, value: Value) -> GraphResult<()> {
        if !self.root_capability.accepts(&value) {
            return Err(GraphError::RootTypeMismatch {
                expected: self.root_capability.clone(),
                got: Capability::of_value(&value),
            });
        }

        self.root = Some(value);
        let sources = self.sources.clone();
        self.mark_dirty_from(sources);
        Ok(())
    }

    /// Current graph input.
    pub fn input(&self) -> Option<&Value> {
        self.root.as_ref()
    }

    /// Capability every source node accepts.
    pub fn root_capability(&self) -> &Capability {
        &self.root_capability
    }

    /// Mark `id` and everything downstream of it dirty.
    pub fn mark_dirty(&mut self, id: NodeId) -> GraphResult<()> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::NodeNotFound(id));
        }
        self.mark_dirty_from([id]);
        Ok(())
    }

    /// Mark every node reachable from `starts` dirty. Ancestors are untouched.
    pub(crate) fn mark_dirty_from(&mut self, starts: impl IntoIterator<Item = NodeId>) {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        let affected = TopologyAnalyzer::new(&ids, &self.connections).downstream_closure(starts);

        for id in affected {
            if let Some(slot) = self.nodes.get_mut(&id) {
                slot.dirty = true;
                slot.stalled = false;
                if !matches!(slot.status, NodeStatus::Failed { .. }) {
                    slot.status = NodeStatus::Pending;
                }
            }
        }
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    /// Render every node's controls in evaluation order and propagate
    /// dirtiness from the nodes that changed. Returns those nodes.
    ///
    /// Widgets are scoped by node name.
    pub fn render_controls(&mut self, ui: &mut dyn ParameterUi) -> Vec<NodeId> {
        let mut changed = Vec::new();
        for id in &self.order {
            if let Some(slot) = self.nodes.get_mut(id) {
                ui.push_scope(slot.node.name());
                if slot.node.render_parameter_controls(ui) {
                    log::debug!("Parameters of {} changed", slot.node.name());
                    changed.push(*id);
                }
                ui.pop_scope();
            }
        }

        self.mark_dirty_from(changed.iter().copied());
        changed
    }

    /// Visit every node in display order.
    pub fn for_each_node<F>(&self, mut callback: F)
    where
        F: FnMut(NodeView<'_>),
    {
        for slot in self.nodes.values() {
            callback(slot.view());
        }
    }

    /// Visit every node in display order with a handle that can render its
    /// controls. Changes reported through the handles are propagated when
    /// this returns. Returns the nodes that changed.
    pub fn for_each_node_mut<F>(&mut self, mut callback: F) -> Vec<NodeId>
    where
        F: FnMut(NodeHandle<'_>),
    {
        for slot in self.nodes.values_mut() {
            callback(NodeHandle { slot });
        }

        let changed: Vec<NodeId> = self
            .nodes
            .values_mut()
            .filter_map(|slot| std::mem::take(&mut slot.pending_change).then_some(slot.id))
            .collect();
        self.mark_dirty_from(changed.iter().copied());
        changed
    }

    /// View of a single node.
    pub fn node(&self, id: NodeId) -> Option<NodeView<'_>> {
        self.nodes.get(&id).map(NodeSlot::view)
    }

    /// Find a node by name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|slot| slot.node.name() == name)
            .map(|slot| slot.id)
    }

    /// Cached output of a node, stale or not.
    pub fn output(&self, id: NodeId) -> Option<&Value> {
        self.nodes.get(&id).and_then(|slot| slot.cached_output.as_ref())
    }

    /// Whether a node is dirty.
    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.nodes.get(&id).map(|slot| slot.dirty).unwrap_or(false)
    }

    /// Output of the terminal node, or `None` if it was never evaluated or
    /// is currently dirty.
    pub fn final_output(&self) -> Option<&Value> {
        self.nodes
            .get(&self.terminal)
            .filter(|slot| !slot.dirty)
            .and_then(|slot| slot.cached_output.as_ref())
    }

    /// The node whose output is the final output.
    pub fn terminal(&self) -> NodeId {
        self.terminal
    }

    /// Whether every node is clean.
    pub fn is_settled(&self) -> bool {
        self.nodes.values().all(|slot| !slot.dirty)
    }

    /// Node IDs in display order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Node IDs in evaluation order.
    pub fn evaluation_order(&self) -> &[NodeId] {
        &self.order
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get all connections.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Serializable summary of the graph state.
    pub fn snapshot(&self) -> GraphSnapshot {
        let nodes = self
            .nodes
            .values()
            .map(|slot| NodeSnapshot {
                id: slot.id,
                name: slot.node.name().to_string(),
                category: slot.node.category(),
                status: slot.status.clone(),
                dirty: slot.dirty,
                evaluations: slot.evaluations,
                output: slot
                    .cached_output
                    .as_ref()
                    .map(|value| Capability::of_value(value).to_string()),
            })
            .collect();

        GraphSnapshot {
            input: self.root_capability.to_string(),
            input_set: self.root.is_some(),
            settled: self.is_settled(),
            terminal: self.terminal,
            nodes,
            connections: self.connections.clone(),
        }
    }
}

/// Serializable state of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    pub category: Category,
    pub status: NodeStatus,
    pub dirty: bool,
    pub evaluations: u64,
    /// Type of the cached output, if any.
    pub output: Option<String>,
}

/// Serializable state of a whole graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSnapshot {
    pub input: String,
    pub input_set: bool,
    pub settled: bool,
    pub terminal: NodeId,
    pub nodes: Vec<NodeSnapshot>,
    pub connections: Vec<Connection>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controls::{NoopUi, ScriptedUi};
    use crate::core::types::Plane;
    use crate::graph::test_nodes::{shift, Fan, Gather, Shift};
    use crate::core::error::EvaluationResult;
    use image::Luma;
    use proptest::prelude::*;
    use std::collections::HashSet;

    /// Scales every sample of a plane.
    struct Gain {
        factor: f32,
    }

    impl TransformNode for Gain {
        fn name(&self) -> &str {
            "Gain"
        }

        fn input_capability(&self) -> Capability {
            Capability::of::<Plane>()
        }

        fn output_capability(&self) -> Capability {
            Capability::of::<Plane>()
        }

        fn evaluate(&self, input: &Value) -> EvaluationResult<Value> {
            let plane = input.get::<Plane>()?;
            let mut out = plane.clone();
            out.pixels_mut().for_each(|p| p.0[0] *= self.factor);
            Ok(Value::new(out))
        }
    }

    fn number(value: &Value) -> i64 {
        *value.get::<i64>().unwrap()
    }

    fn dirty_set(graph: &CompositionGraph) -> HashSet<NodeId> {
        graph.node_ids().filter(|&id| graph.is_dirty(id)).collect()
    }

    #[test]
    fn test_single_node_matrix() {
        let gain = Gain { factor: 2.0 };
        let input = Plane::from_pixel(2, 2, Luma([0.25]));
        let expected = gain.evaluate(&Value::new(input.clone())).unwrap();

        let mut graph = CompositionGraph::chain(vec![Box::new(gain)]).unwrap();
        graph.set_input(Value::new(input)).unwrap();
        graph.tick(&mut NoopUi);

        let a = graph.terminal();
        let out = graph.final_output().unwrap().get::<Plane>().unwrap();
        assert_eq!(out, expected.get::<Plane>().unwrap());
        assert!(!graph.is_dirty(a));
        assert_eq!(graph.node(a).unwrap().status, &NodeStatus::Ready);
    }

    #[test]
    fn test_chain_downstream_edit_reuses_upstream() {
        let mut graph = CompositionGraph::chain(vec![shift("A", 1), shift("B", 10)]).unwrap();
        let a = graph.find("A").unwrap();
        let b = graph.find("B").unwrap();

        graph.set_input(Value::new(5i64)).unwrap();
        graph.tick(&mut NoopUi);
        assert!(graph.is_settled());
        assert_eq!(number(graph.final_output().unwrap()), 16);

        let a_output = graph.output(a).unwrap().clone();
        let mut ui = ScriptedUi::new().set_i32("B/amount", 20);
        let report = graph.tick(&mut ui);

        assert_eq!(report.changed, vec![b]);
        assert_eq!(report.recompute.evaluated, vec![b]);
        assert!(graph.output(a).unwrap().ptr_eq(&a_output));
        assert_eq!(graph.node(a).unwrap().evaluations, 1);
        assert_eq!(graph.node(b).unwrap().evaluations, 2);
        assert_eq!(number(graph.final_output().unwrap()), 26);
    }

    #[test]
    fn test_second_recompute_is_noop() {
        let mut graph =
            CompositionGraph::chain(vec![shift("A", 1), shift("B", 2), shift("C", 3)]).unwrap();
        graph.set_input(Value::new(0i64)).unwrap();
        graph.recompute();

        let before: Vec<(Value, bool, u64)> = graph
            .node_ids()
            .map(|id| {
                let view = graph.node(id).unwrap();
                (view.cached_output.unwrap().clone(), view.dirty, view.evaluations)
            })
            .collect();

        let report = graph.recompute();
        assert!(report.evaluated.is_empty());

        for (id, (output, dirty, evaluations)) in graph.node_ids().zip(before) {
            let view = graph.node(id).unwrap();
            assert!(view.cached_output.unwrap().ptr_eq(&output));
            assert_eq!(view.dirty, dirty);
            assert_eq!(view.evaluations, evaluations);
        }
    }

    #[test]
    fn test_failure_is_contained() {
        // A -> B -> C, A -> D
        let mut builder = CompositionGraph::builder();
        let a = builder.add_node(shift("A", 1));
        let b = builder.add_node(shift("B", 1));
        let c = builder.add_node(shift("C", 1));
        let d = builder.add_node(shift("D", 1));
        builder.connect(a, b).unwrap();
        builder.connect(b, c).unwrap();
        builder.connect(a, d).unwrap();
        let mut graph = builder.build().unwrap();

        graph.set_input(Value::new(1i64)).unwrap();
        graph.tick(&mut NoopUi);
        let c_output = graph.output(c).unwrap().clone();

        let report = graph.tick(&mut ScriptedUi::new().click("B/fail").set_i32("D/amount", 5));
        assert_eq!(report.recompute.failed.len(), 1);
        assert_eq!(report.recompute.failed[0].0, b);

        // Upstream clean, failing node and its consumers dirty, siblings fine
        assert!(!graph.is_dirty(a));
        assert!(graph.is_dirty(b));
        assert!(graph.is_dirty(c));
        assert!(!graph.is_dirty(d));
        assert_eq!(number(graph.output(d).unwrap()), 7);
        assert!(graph.node(b).unwrap().status.is_problem());
        assert_eq!(graph.node(c).unwrap().status, &NodeStatus::Blocked);

        // Previous outputs are kept, the terminal has nothing current to show
        assert!(graph.output(c).unwrap().ptr_eq(&c_output));
        assert_eq!(number(graph.output(b).unwrap()), 3);

        // Stalled until something changes
        let again = graph.recompute();
        assert!(again.failed.is_empty());
        assert_eq!(graph.node(b).unwrap().evaluations, 2);

        graph.tick(&mut ScriptedUi::new().click("B/fail"));
        assert!(graph.is_settled());
        assert_eq!(number(graph.output(c).unwrap()), 4);
    }

    #[test]
    fn test_fan_out_and_fan_in() {
        let mut builder = CompositionGraph::builder();
        let fan = builder.add(Fan { arity: 3 });
        let branches: Vec<NodeId> = ["X", "Y", "Z"]
            .iter()
            .map(|name| builder.add_node(shift(name, 0)))
            .collect();
        let gather = builder.add(Gather { arity: 3 });
        for (index, &branch) in branches.iter().enumerate() {
            builder
                .connect_ports(Endpoint::component(fan, index), Endpoint::whole(branch))
                .unwrap();
            builder
                .connect_ports(Endpoint::whole(branch), Endpoint::component(gather, index))
                .unwrap();
        }
        let mut graph = builder.build().unwrap();

        graph.set_input(Value::new(2i64)).unwrap();
        graph.tick(&mut NoopUi);
        assert_eq!(number(graph.final_output().unwrap()), 2 + 4 + 6);

        let changed = graph.for_each_node_mut(|mut node| {
            if node.name() == "Y" {
                node.render_controls(&mut ScriptedUi::new().set_i32("Y/amount", 100));
            }
        });
        assert_eq!(changed, vec![branches[1]]);
        assert_eq!(dirty_set(&graph), HashSet::from([branches[1], gather]));

        let report = graph.recompute();
        assert_eq!(report.evaluated, vec![branches[1], gather]);
        assert_eq!(number(graph.final_output().unwrap()), 112);
        assert_eq!(graph.node(fan).unwrap().evaluations, 1);
    }

    #[test]
    fn test_widget_paths_match_across_render_entry_points() {
        let mut graph = CompositionGraph::chain(vec![shift("A", 0), shift("B", 0)]).unwrap();
        let a = graph.find("A").unwrap();
        let b = graph.find("B").unwrap();
        graph.set_input(Value::new(1i64)).unwrap();
        graph.recompute();

        let mut ui = ScriptedUi::new().set_i32("B/amount", 5);
        let changed = graph.for_each_node_mut(|mut node| {
            node.render_controls(&mut ui);
        });
        assert_eq!(changed, vec![b]);
        assert!(ui.pending().is_empty());
        graph.recompute();
        assert_eq!(number(graph.final_output().unwrap()), 6);

        // An unscoped label reaches neither node
        let mut ui = ScriptedUi::new().set_i32("amount", 9);
        assert!(graph
            .for_each_node_mut(|mut node| {
                node.render_controls(&mut ui);
            })
            .is_empty());
        assert!(graph.render_controls(&mut ui).is_empty());
        assert_eq!(ui.pending(), ["amount"]);

        let changed = graph.render_controls(&mut ScriptedUi::new().set_i32("A/amount", 2));
        assert_eq!(changed, vec![a]);
        graph.recompute();
        assert_eq!(number(graph.final_output().unwrap()), 8);
    }

    #[test]
    fn test_without_input_sources_are_unconnected() {
        let mut graph = CompositionGraph::chain(vec![shift("A", 1), shift("B", 1)]).unwrap();
        let a = graph.find("A").unwrap();
        let b = graph.find("B").unwrap();

        graph.tick(&mut NoopUi);
        assert_eq!(graph.node(a).unwrap().status, &NodeStatus::Unconnected);
        assert_eq!(graph.node(b).unwrap().status, &NodeStatus::Blocked);
        assert!(graph.final_output().is_none());
    }

    #[test]
    fn test_set_input_checks_type() {
        let mut graph = CompositionGraph::chain(vec![shift("A", 1)]).unwrap();

        let result = graph.set_input(Value::new("five".to_string()));
        assert!(matches!(result, Err(GraphError::RootTypeMismatch { .. })));
        assert!(graph.input().is_none());
    }

    #[test]
    fn test_render_scopes_by_node_name() {
        let mut graph = CompositionGraph::chain(vec![shift("A", 1), shift("B", 1)]).unwrap();
        let mut ui = ScriptedUi::new();

        graph.render_controls(&mut ui);
        assert_eq!(ui.rendered(), ["A/amount", "A/fail", "B/amount", "B/fail"]);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut graph = CompositionGraph::chain(vec![shift("A", 1)]).unwrap();
        graph.set_input(Value::new(1i64)).unwrap();
        graph.recompute();

        let json = serde_json::to_value(graph.snapshot()).unwrap();
        assert_eq!(json["settled"], true);
        assert_eq!(json["nodes"][0]["name"], "A");
        assert_eq!(json["nodes"][0]["status"]["state"], "ready");
        assert_eq!(json["nodes"][0]["output"], "i64");
    }

    proptest! {
        #[test]
        fn prop_dirty_marks_exactly_the_downstream_closure(
            parents in prop::collection::vec(prop::option::of(0usize..16), 1..16),
            pick in 0usize..16,
        ) {
            // Forest: node i optionally hangs below some earlier node
            let mut builder = CompositionGraph::builder();
            let mut ids = Vec::new();
            let mut parent_of = Vec::new();
            for (i, parent) in parents.iter().enumerate() {
                let id = builder.add(Shift { name: format!("N{}", i), amount: 1, fail: false });
                let parent = parent.filter(|_| i > 0).map(|p| p % i);
                if let Some(p) = parent {
                    builder.connect(ids[p], id).unwrap();
                }
                ids.push(id);
                parent_of.push(parent);
            }
            let mut graph = builder.build().unwrap();
            graph.set_input(Value::new(0i64)).unwrap();
            graph.recompute();
            prop_assert!(graph.is_settled());

            let target = pick % ids.len();
            graph.mark_dirty(ids[target]).unwrap();

            let mut expected = HashSet::new();
            for i in 0..ids.len() {
                let mut cursor = Some(i);
                while let Some(c) = cursor {
                    if c == target {
                        expected.insert(ids[i]);
                        break;
                    }
                    cursor = parent_of[c];
                }
            }
            prop_assert_eq!(dirty_set(&graph), expected);
        }
    }
}

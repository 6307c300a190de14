//! Graph construction.
//!
//! [`GraphBuilder`] collects nodes and edges and validates every edge as it
//! is added, so that a built [`CompositionGraph`] can only move values
//! between capability-compatible ports. Once built, the node set is fixed.

use crate::core::error::{ConnectionId, GraphError, GraphResult, NodeId};
use crate::core::node::TransformNode;
use crate::core::types::Capability;
use crate::graph::composition::{CompositionGraph, InputSource, NodeSlot};
use crate::graph::connection::{Connection, Endpoint, Port};
use crate::graph::topology::TopologyAnalyzer;
use indexmap::IndexMap;

/// Builder for a [`CompositionGraph`].
///
/// Uses IndexMap to maintain insertion order, which is also the display
/// order of the built graph and the tie-break of its evaluation order.
#[derive(Default)]
pub struct GraphBuilder {
    nodes: IndexMap<NodeId, Box<dyn TransformNode>>,
    connections: Vec<Connection>,
    terminal: Option<NodeId>,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Node Management
    // ========================================================================

    /// Add a boxed node and return its ID.
    pub fn add_node(&mut self, node: Box<dyn TransformNode>) -> NodeId {
        let id = NodeId::new();
        if self.nodes.values().any(|other| other.name() == node.name()) {
            log::warn!("Node name '{}' is used more than once", node.name());
        }
        self.nodes.insert(id, node);
        id
    }

    /// Add a node and return its ID.
    pub fn add<N: TransformNode + 'static>(&mut self, node: N) -> NodeId {
        self.add_node(Box::new(node))
    }

    /// Check if a node exists.
    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ========================================================================
    // Connection Management
    // ========================================================================

    /// Connect the whole output of `from` to the whole input of `to`.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> GraphResult<ConnectionId> {
        self.connect_ports(Endpoint::whole(from), Endpoint::whole(to))
    }

    /// Create a connection between two ports.
    ///
    /// Rejected when either port does not exist, the capabilities the ports
    /// carry differ, the consumer port is taken, the consumer would mix whole
    /// and per-component inputs, or the edge would close a cycle.
    pub fn connect_ports(&mut self, from: Endpoint, to: Endpoint) -> GraphResult<ConnectionId> {
        let producer = self.get_node(from.node_id)?;
        let consumer = self.get_node(to.node_id)?;

        let from_type = producer
            .output_capability()
            .select(from.port)
            .ok_or_else(|| GraphError::PortNotFound {
                node_id: from.node_id,
                port: from.port.to_string(),
            })?;

        let to_type = consumer
            .input_capability()
            .select(to.port)
            .ok_or_else(|| GraphError::PortNotFound {
                node_id: to.node_id,
                port: to.port.to_string(),
            })?;

        if from_type != to_type {
            return Err(GraphError::TypeMismatch { from_type, to_type });
        }

        if self.connections.iter().any(|c| c.to == to) {
            return Err(GraphError::PortAlreadyConnected {
                node_id: to.node_id,
                port: to.port.to_string(),
            });
        }

        let whole = to.port == Port::Whole;
        if self
            .connections_to(to.node_id)
            .any(|c| (c.to.port == Port::Whole) != whole)
        {
            return Err(GraphError::MixedInputPorts { node_id: to.node_id });
        }

        if self.would_create_cycle(from.node_id, to.node_id) {
            return Err(GraphError::CycleDetected {
                nodes: vec![from.node_id, to.node_id],
            });
        }

        let connection = Connection::new(from, to);
        let id = connection.id;
        self.connections.push(connection);
        Ok(id)
    }

    /// Get all connections.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Get all connections to a node.
    pub fn connections_to(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections
            .iter()
            .filter(move |c| c.to.node_id == node_id)
    }

    /// Choose the node whose output is the graph's final output.
    pub fn set_terminal(&mut self, id: NodeId) -> GraphResult<()> {
        self.get_node(id)?;
        self.terminal = Some(id);
        Ok(())
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Validate the whole graph and turn it into a runtime graph.
    ///
    /// Every node starts dirty and without output; nothing is evaluated
    /// until the graph input is set.
    pub fn build(self) -> GraphResult<CompositionGraph> {
        if self.nodes.is_empty() {
            return Err(GraphError::EmptyGraph);
        }

        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        let analyzer = TopologyAnalyzer::new(&ids, &self.connections);
        let order = analyzer.topological_sort()?;
        let sources = analyzer.sources();

        let root_capability = self.root_capability(&sources)?;
        let terminal = match self.terminal {
            Some(id) => id,
            None => analyzer
                .sinks()
                .last()
                .copied()
                .ok_or(GraphError::EmptyGraph)?,
        };

        let mut slots = IndexMap::with_capacity(self.nodes.len());
        for (id, node) in self.nodes {
            let input = input_source(id, node.input_capability(), &self.connections)?;
            slots.insert(id, NodeSlot::new(id, node, input));
        }

        log::info!(
            "Built composition graph: {} nodes, {} connections, input {}",
            slots.len(),
            self.connections.len(),
            root_capability
        );

        Ok(CompositionGraph::from_parts(
            slots,
            self.connections,
            order,
            sources,
            root_capability,
            terminal,
        ))
    }

    fn get_node(&self, id: NodeId) -> GraphResult<&dyn TransformNode> {
        self.nodes
            .get(&id)
            .map(|node| node.as_ref())
            .ok_or(GraphError::NodeNotFound(id))
    }

    /// Adding `from -> to` closes a cycle iff `from` is reachable from `to`.
    fn would_create_cycle(&self, from: NodeId, to: NodeId) -> bool {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        TopologyAnalyzer::new(&ids, &self.connections).is_reachable(to, from)
    }

    /// All source nodes read the graph input, so they must agree on its type.
    fn root_capability(&self, sources: &[NodeId]) -> GraphResult<Capability> {
        let mut capabilities = sources
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|node| node.input_capability());

        let first = capabilities.next().ok_or(GraphError::EmptyGraph)?;
        for other in capabilities {
            if other != first {
                return Err(GraphError::RootCapabilityConflict {
                    first,
                    second: other,
                });
            }
        }
        Ok(first)
    }
}

/// Resolve where a node's input comes from.
fn input_source(
    id: NodeId,
    capability: Capability,
    connections: &[Connection],
) -> GraphResult<InputSource> {
    let incoming: Vec<&Connection> = connections.iter().filter(|c| c.to.node_id == id).collect();

    match incoming.as_slice() {
        [] => Ok(InputSource::Root),
        [single] if single.to.port == Port::Whole => Ok(InputSource::Whole(single.from)),
        _ => {
            let arity = capability.arity();
            let mut producers: Vec<Option<Endpoint>> = vec![None; arity];
            for conn in &incoming {
                if let Port::Component(index) = conn.to.port {
                    producers[index] = Some(conn.from);
                }
            }

            let missing: Vec<usize> = producers
                .iter()
                .enumerate()
                .filter(|(_, producer)| producer.is_none())
                .map(|(index, _)| index)
                .collect();
            if !missing.is_empty() {
                return Err(GraphError::IncompleteInput { node_id: id, missing });
            }

            Ok(InputSource::Components(producers.into_iter().flatten().collect()))
        }
    }
}

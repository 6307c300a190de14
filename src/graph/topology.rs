//! Topological analysis of a composition graph.
//!
//! Provides algorithms for:
//! - Topological sorting (evaluation order)
//! - Downstream and upstream closures (dirty propagation, containment)
//! - Reachability (cycle checks while edges are added)

use crate::core::error::{GraphError, GraphResult, NodeId};
use crate::graph::connection::Connection;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Analyzer over a node list and its connections.
///
/// Node order matters: ties in the topological order are broken by the
/// position of the node in `nodes`, so the same graph always sorts the same
/// way.
pub struct TopologyAnalyzer<'a> {
    nodes: &'a [NodeId],
    connections: &'a [Connection],
}

impl<'a> TopologyAnalyzer<'a> {
    /// Create a new analyzer.
    pub fn new(nodes: &'a [NodeId], connections: &'a [Connection]) -> Self {
        Self { nodes, connections }
    }

    /// Get the topological sort order (Kahn's algorithm).
    ///
    /// Returns nodes in an order where producers come before consumers.
    pub fn topological_sort(&self) -> GraphResult<Vec<NodeId>> {
        let index: HashMap<NodeId, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();

        let mut in_degree = vec![0usize; self.nodes.len()];
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];

        for conn in self.connections {
            let (Some(&from), Some(&to)) =
                (index.get(&conn.from.node_id), index.get(&conn.to.node_id))
            else {
                continue;
            };
            adjacency[from].push(to);
            in_degree[to] += 1;
        }

        // Ready set ordered by insertion index
        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(i, _)| i)
            .collect();

        let mut result = Vec::with_capacity(self.nodes.len());

        while let Some(node) = ready.pop_first() {
            result.push(self.nodes[node]);

            for &neighbor in &adjacency[node] {
                in_degree[neighbor] -= 1;
                if in_degree[neighbor] == 0 {
                    ready.insert(neighbor);
                }
            }
        }

        if result.len() != self.nodes.len() {
            let remaining: Vec<NodeId> = in_degree
                .iter()
                .enumerate()
                .filter(|(_, degree)| **degree > 0)
                .map(|(i, _)| self.nodes[i])
                .collect();

            return Err(GraphError::CycleDetected { nodes: remaining });
        }

        Ok(result)
    }

    /// Every node reachable from any of `starts`, the starts included.
    pub fn downstream_closure(&self, starts: impl IntoIterator<Item = NodeId>) -> HashSet<NodeId> {
        self.closure(starts, |conn| (conn.from.node_id, conn.to.node_id))
    }

    /// Every node `start` depends on, `start` included.
    pub fn upstream_closure(&self, start: NodeId) -> HashSet<NodeId> {
        self.closure([start], |conn| (conn.to.node_id, conn.from.node_id))
    }

    /// Check if `to` can be reached from `from` by following edges.
    pub fn is_reachable(&self, from: NodeId, to: NodeId) -> bool {
        from == to || self.downstream_closure([from]).contains(&to)
    }

    /// Nodes without incoming edges, in node order.
    pub fn sources(&self) -> Vec<NodeId> {
        let fed: HashSet<NodeId> = self.connections.iter().map(|c| c.to.node_id).collect();
        self.nodes
            .iter()
            .copied()
            .filter(|id| !fed.contains(id))
            .collect()
    }

    /// Nodes without outgoing edges, in node order.
    pub fn sinks(&self) -> Vec<NodeId> {
        let feeding: HashSet<NodeId> = self.connections.iter().map(|c| c.from.node_id).collect();
        self.nodes
            .iter()
            .copied()
            .filter(|id| !feeding.contains(id))
            .collect()
    }

    fn closure(
        &self,
        starts: impl IntoIterator<Item = NodeId>,
        direction: impl Fn(&Connection) -> (NodeId, NodeId),
    ) -> HashSet<NodeId> {
        let mut visited = HashSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();

        for start in starts {
            if visited.insert(start) {
                queue.push_back(start);
            }
        }

        while let Some(current) = queue.pop_front() {
            for conn in self.connections {
                let (near, far) = direction(conn);
                if near == current && visited.insert(far) {
                    queue.push_back(far);
                }
            }
        }

        visited
    }
}

//! Connection types for the graph.

use crate::core::error::{ConnectionId, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which part of a node's value an edge carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Port {
    /// The whole value.
    Whole,
    /// One component of a bundle.
    Component(usize),
}

impl Default for Port {
    fn default() -> Self {
        Port::Whole
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::Whole => write!(f, "whole"),
            Port::Component(index) => write!(f, "#{}", index),
        }
    }
}

/// An endpoint of a connection (node + port).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// The node ID.
    pub node_id: NodeId,
    /// The port on that node.
    pub port: Port,
}

impl Endpoint {
    /// Create a new endpoint.
    pub fn new(node_id: NodeId, port: Port) -> Self {
        Self { node_id, port }
    }

    /// Endpoint carrying the node's whole value.
    pub fn whole(node_id: NodeId) -> Self {
        Self::new(node_id, Port::Whole)
    }

    /// Endpoint carrying component `index` of the node's bundle.
    pub fn component(node_id: NodeId, index: usize) -> Self {
        Self::new(node_id, Port::Component(index))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node_id, self.port)
    }
}

/// A connection from a producer's output to a consumer's input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Unique identifier for this connection.
    pub id: ConnectionId,
    /// Producer endpoint.
    pub from: Endpoint,
    /// Consumer endpoint.
    pub to: Endpoint,
}

impl Connection {
    /// Create a new connection.
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self {
            id: ConnectionId::new(),
            from,
            to,
        }
    }
}

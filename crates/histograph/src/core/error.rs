//! Core error types for graph processing
//!
//! Every failure in the model, layout and sync layers is reported through
//! [`GraphError`]. Operations that fail leave the last good state untouched.

use thiserror::Error;

/// Core error types for graph processing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("Duplicate edge id: {id}")]
    DuplicateEdge { id: String },

    #[error("Edge {edge_id} references unknown node {endpoint}")]
    DanglingEdge { edge_id: String, endpoint: String },

    #[error("Self-loop on node {node_id} is not allowed")]
    SelfLoop { node_id: String },

    #[error("Invalid connection: {source_id} -> {target_id}")]
    InvalidConnection {
        source_id: String,
        target_id: String,
    },

    #[error("Unknown node: {id}")]
    UnknownNode { id: String },

    #[error("Unknown edge: {id}")]
    UnknownEdge { id: String },
}

impl GraphError {
    /// Create a duplicate node error
    pub fn duplicate_node(id: impl Into<String>) -> Self {
        Self::DuplicateNode { id: id.into() }
    }

    /// Create a duplicate edge error
    pub fn duplicate_edge(id: impl Into<String>) -> Self {
        Self::DuplicateEdge { id: id.into() }
    }

    /// Create a dangling edge error
    pub fn dangling_edge(edge_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::DanglingEdge {
            edge_id: edge_id.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Create a self-loop error
    pub fn self_loop(node_id: impl Into<String>) -> Self {
        Self::SelfLoop {
            node_id: node_id.into(),
        }
    }

    /// Create an invalid connection error
    pub fn invalid_connection(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::InvalidConnection {
            source_id: source.into(),
            target_id: target.into(),
        }
    }

    /// Create an unknown node error
    pub fn unknown_node(id: impl Into<String>) -> Self {
        Self::UnknownNode { id: id.into() }
    }

    /// Create an unknown edge error
    pub fn unknown_edge(id: impl Into<String>) -> Self {
        Self::UnknownEdge { id: id.into() }
    }
}

/// Result alias used throughout the library
pub type Result<T, E = GraphError> = std::result::Result<T, E>;

//! Graph store trait
//!
//! The store is the canonical owner of nodes, edges, selection state and the
//! last observed canvas size. The sync controller only talks to it through
//! this trait.

use super::error::Result;
use super::types::{Dimensions, EdgeData, EdgeSelection, NodeData, Position};

/// Canonical node/edge collections plus transient selection state
///
/// Implementations keep nodes and edges in insertion order and never hold
/// an edge whose endpoints are missing.
pub trait GraphStore: Send + Sync {
    /// Iterate over all nodes in insertion order
    fn nodes(&self) -> impl Iterator<Item = &NodeData>;

    /// Iterate over all edges in insertion order
    fn edges(&self) -> impl Iterator<Item = &EdgeData>;

    /// Get a node by ID
    fn get_node(&self, id: &str) -> Option<&NodeData>;

    /// Get an edge by ID
    fn get_edge(&self, id: &str) -> Option<&EdgeData>;

    /// Add a node; fails on a duplicate id
    fn add_node(&mut self, node: NodeData) -> Result<()>;

    /// Add an edge; fails on a duplicate id, a missing endpoint or a self-loop
    fn add_edge(&mut self, edge: EdgeData) -> Result<()>;

    /// Remove a node and every edge touching it, returning the pruned edges
    fn remove_node(&mut self, id: &str) -> Result<(NodeData, Vec<EdgeData>)>;

    /// Remove a single edge
    fn remove_edge(&mut self, id: &str) -> Result<EdgeData>;

    /// Replace the edge with the same id
    fn update_edge(&mut self, edge: EdgeData) -> Result<()>;

    /// Swap the edge `id` for `edge`, keeping its place in insertion order
    ///
    /// `edge` may carry a new id; it fails if another edge already holds it.
    fn replace_edge(&mut self, id: &str, edge: EdgeData) -> Result<()>;

    /// Move a node
    fn set_position(&mut self, id: &str, position: Position) -> Result<()>;

    /// Publish the selected node, or clear it with `None`
    fn select_node(&mut self, node: Option<NodeData>);

    /// Publish the selected edge, or clear it with `None`
    fn select_edge(&mut self, edge: Option<EdgeSelection>);

    fn selected_node(&self) -> Option<&NodeData>;

    fn selected_edge(&self) -> Option<&EdgeSelection>;

    /// Record the last observed canvas size
    fn set_container_dimensions(&mut self, dimensions: Dimensions);

    fn container_dimensions(&self) -> Option<Dimensions>;

    /// Remove all nodes, edges and selection state
    fn clear(&mut self);

    fn node_count(&self) -> usize {
        self.nodes().count()
    }

    fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// First edge running from `source` to `target`
    fn find_edge_between(&self, source: &str, target: &str) -> Option<&EdgeData> {
        self.edges()
            .find(|e| e.source == source && e.target == target)
    }

    /// `base` when no edge holds it, otherwise the first free `base-2`, `base-3`, ...
    fn unique_edge_id(&self, base: &str) -> String {
        if self.get_edge(base).is_none() {
            return base.to_string();
        }
        (2usize..)
            .map(|n| format!("{}-{}", base, n))
            .find(|id| self.get_edge(id).is_none())
            .unwrap_or_else(|| base.to_string())
    }
}

//! Core layout trait for node positioning
//!
//! A layout engine is a pure function from nodes and edges to positioned
//! nodes. The sync controller holds one behind this trait, which also lets
//! tests substitute a counting engine.

use super::error::Result;
use super::types::{Direction, EdgeData, NodeData};

/// Core trait for layout engines
///
/// # Example
/// ```
/// use histograph::core::{Direction, EdgeData, LayoutEngine, NodeData, NodeKind, RelationshipKind};
/// use histograph::canvas::LayeredLayout;
///
/// let nodes = vec![
///     NodeData::new("a", NodeKind::Person, "Ada"),
///     NodeData::new("b", NodeKind::Event, "Engine"),
/// ];
/// let edges = vec![EdgeData::between("a", "b", RelationshipKind::Influences)];
/// let placed = LayeredLayout::new().layout(&nodes, &edges, Direction::TopToBottom).unwrap();
/// assert!(placed[0].position.y < placed[1].position.y);
/// ```
pub trait LayoutEngine: Send + Sync {
    /// Return the same nodes, in the same order, with positions replaced
    fn layout(
        &self,
        nodes: &[NodeData],
        edges: &[EdgeData],
        direction: Direction,
    ) -> Result<Vec<NodeData>>;

    /// Get the name of this layout engine
    fn name(&self) -> &'static str;

    /// Get the version of this layout engine
    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

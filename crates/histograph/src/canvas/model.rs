//! Graph model implementation
//!
//! The canonical store behind the canvas: nodes keyed by id with an explicit
//! insertion order, edges in insertion order, selection state and the last
//! observed container size.

use std::collections::HashMap;
use tracing::{debug, trace};

use crate::core::{
    Dimensions, Direction, EdgeData, EdgeSelection, GraphDocument, GraphError, GraphStore,
    NodeData, NodeKind, Position, RelationshipKind, Result,
};

/// Position of the first toolbar-created node
pub const FIRST_NODE_POSITION: Position = Position { x: 100.0, y: 100.0 };

/// Horizontal offset between consecutive toolbar-created nodes
pub const NEW_NODE_OFFSET_X: f64 = 250.0;

/// In-memory graph model
///
/// Maintains insertion order for deterministic layout and iteration.
#[derive(Debug, Default, Clone)]
pub struct GraphModel {
    /// Nodes indexed by ID
    nodes: HashMap<String, NodeData>,
    /// Node IDs in insertion order
    node_order: Vec<String>,
    /// Edges in insertion order
    edges: Vec<EdgeData>,
    selected_node: Option<NodeData>,
    selected_edge: Option<EdgeSelection>,
    dimensions: Option<Dimensions>,
    /// Counter behind generated `node-<n>` ids
    id_counter: usize,
}

impl GraphModel {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from a document, validating every node and edge
    pub fn from_document(document: &GraphDocument) -> Result<Self> {
        let mut model = Self::new();
        for node in &document.nodes {
            model.add_node(node.clone())?;
        }
        for edge in &document.edges {
            model.add_edge(edge.clone())?;
        }
        debug!(
            node_count = model.node_count(),
            edge_count = model.edge_count(),
            "Model loaded from document"
        );
        Ok(model)
    }

    /// Snapshot the model as a document
    pub fn to_document(&self, direction: Direction) -> GraphDocument {
        GraphDocument {
            direction,
            nodes: self.nodes().cloned().collect(),
            edges: self.edges.clone(),
        }
    }

    /// Check if a node exists
    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Check if an edge exists
    pub fn has_edge(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e.id == id)
    }

    /// Get IDs of nodes that this node points to
    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.source == node_id)
            .map(|e| e.target.as_str())
            .collect()
    }

    /// Get IDs of nodes that point to this node
    pub fn predecessors(&self, node_id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.target == node_id)
            .map(|e| e.source.as_str())
            .collect()
    }

    /// First node whose label matches, in insertion order
    pub fn find_node_by_label(&self, label: &str) -> Option<&NodeData> {
        self.nodes().find(|node| node.label == label)
    }

    /// Generate the next free `node-<n>` id
    pub fn next_node_id(&mut self) -> String {
        loop {
            self.id_counter += 1;
            let id = format!("node-{}", self.id_counter);
            if !self.has_node(&id) {
                return id;
            }
        }
    }

    /// Where the toolbar places its next node
    ///
    /// The first node goes to a fixed spot; later nodes sit to the right of
    /// the most recently added one.
    pub fn next_node_position(&self) -> Position {
        self.node_order
            .last()
            .and_then(|id| self.nodes.get(id))
            .map(|last| Position::new(last.position.x + NEW_NODE_OFFSET_X, last.position.y))
            .unwrap_or(FIRST_NODE_POSITION)
    }

    /// Add a toolbar node of the given kind, returning its id
    pub fn add_node_of_kind(&mut self, kind: NodeKind) -> Result<String> {
        let id = self.next_node_id();
        let node = NodeData::new(id.clone(), kind, format!("New {}", kind))
            .with_description(format!("Description for new {}", kind))
            .at(self.next_node_position());
        self.add_node(node)?;
        Ok(id)
    }

    fn check_endpoints(&self, edge: &EdgeData) -> Result<()> {
        for endpoint in [&edge.source, &edge.target] {
            if !self.has_node(endpoint) {
                return Err(GraphError::dangling_edge(&edge.id, endpoint));
            }
        }
        if edge.is_self_loop() {
            return Err(GraphError::self_loop(&edge.source));
        }
        Ok(())
    }
}

impl GraphStore for GraphModel {
    fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    fn edges(&self) -> impl Iterator<Item = &EdgeData> {
        self.edges.iter()
    }

    fn get_node(&self, id: &str) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    fn get_edge(&self, id: &str) -> Option<&EdgeData> {
        self.edges.iter().find(|e| e.id == id)
    }

    fn add_node(&mut self, node: NodeData) -> Result<()> {
        trace!(node_id = %node.id, node_kind = %node.kind, node_label = %node.label, "Adding node to model");
        if self.has_node(&node.id) {
            return Err(GraphError::duplicate_node(&node.id));
        }
        self.node_order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        debug!(node_count = self.node_count(), "Node added");
        Ok(())
    }

    fn add_edge(&mut self, edge: EdgeData) -> Result<()> {
        trace!(
            edge_id = %edge.id,
            edge_source = %edge.source,
            edge_target = %edge.target,
            edge_kind = %edge.kind,
            "Adding edge to model"
        );
        if self.has_edge(&edge.id) {
            return Err(GraphError::duplicate_edge(&edge.id));
        }
        self.check_endpoints(&edge)?;
        self.edges.push(edge);
        debug!(edge_count = self.edge_count(), "Edge added");
        Ok(())
    }

    fn remove_node(&mut self, id: &str) -> Result<(NodeData, Vec<EdgeData>)> {
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| GraphError::unknown_node(id))?;
        self.node_order.retain(|existing| existing != id);

        let (pruned, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| e.source == id || e.target == id);
        self.edges = kept;

        if self.selected_node.as_ref().is_some_and(|n| n.id == id) {
            self.selected_node = None;
        }
        if self
            .selected_edge
            .as_ref()
            .is_some_and(|sel| pruned.iter().any(|e| e.id == sel.id))
        {
            self.selected_edge = None;
        }

        debug!(node_id = %id, pruned_edges = pruned.len(), "Node removed");
        Ok((node, pruned))
    }

    fn remove_edge(&mut self, id: &str) -> Result<EdgeData> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| GraphError::unknown_edge(id))?;
        let edge = self.edges.remove(index);
        if self.selected_edge.as_ref().is_some_and(|sel| sel.id == id) {
            self.selected_edge = None;
        }
        debug!(edge_id = %id, edge_count = self.edge_count(), "Edge removed");
        Ok(edge)
    }

    fn update_edge(&mut self, edge: EdgeData) -> Result<()> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == edge.id)
            .ok_or_else(|| GraphError::unknown_edge(&edge.id))?;
        self.check_endpoints(&edge)?;
        trace!(edge_id = %edge.id, edge_source = %edge.source, edge_target = %edge.target, "Edge updated");
        self.edges[index] = edge;
        Ok(())
    }

    fn replace_edge(&mut self, id: &str, edge: EdgeData) -> Result<()> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| GraphError::unknown_edge(id))?;
        if edge.id != id && self.has_edge(&edge.id) {
            return Err(GraphError::duplicate_edge(&edge.id));
        }
        self.check_endpoints(&edge)?;
        if self.selected_edge.as_ref().is_some_and(|sel| sel.id == id) {
            self.selected_edge = None;
        }
        trace!(old_id = %id, edge_id = %edge.id, edge_source = %edge.source, edge_target = %edge.target, "Edge replaced");
        self.edges[index] = edge;
        Ok(())
    }

    fn set_position(&mut self, id: &str, position: Position) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::unknown_node(id))?;
        node.position = position;
        trace!(node_id = %id, x = position.x, y = position.y, "Node moved");
        Ok(())
    }

    fn select_node(&mut self, node: Option<NodeData>) {
        trace!(node_id = ?node.as_ref().map(|n| n.id.as_str()), "Node selection changed");
        self.selected_node = node;
    }

    fn select_edge(&mut self, edge: Option<EdgeSelection>) {
        trace!(edge_id = ?edge.as_ref().map(|e| e.id.as_str()), "Edge selection changed");
        self.selected_edge = edge;
    }

    fn selected_node(&self) -> Option<&NodeData> {
        self.selected_node.as_ref()
    }

    fn selected_edge(&self) -> Option<&EdgeSelection> {
        self.selected_edge.as_ref()
    }

    fn set_container_dimensions(&mut self, dimensions: Dimensions) {
        self.dimensions = Some(dimensions);
    }

    fn container_dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.node_order.clear();
        self.edges.clear();
        self.selected_node = None;
        self.selected_edge = None;
        self.id_counter = 0;
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Every problem that would stop a document from loading
///
/// Unlike [`GraphModel::from_document`], which stops at the first error,
/// this reports duplicate ids, dangling endpoints and self-loops across the
/// whole document, in document order.
pub fn check_document(document: &GraphDocument) -> Vec<GraphError> {
    let mut problems = Vec::new();

    let mut node_ids = std::collections::HashSet::new();
    for node in &document.nodes {
        if !node_ids.insert(node.id.as_str()) {
            problems.push(GraphError::duplicate_node(&node.id));
        }
    }

    let mut edge_ids = std::collections::HashSet::new();
    for edge in &document.edges {
        if !edge_ids.insert(edge.id.as_str()) {
            problems.push(GraphError::duplicate_edge(&edge.id));
        }
        for endpoint in [&edge.source, &edge.target] {
            if !node_ids.contains(endpoint.as_str()) {
                problems.push(GraphError::dangling_edge(&edge.id, endpoint));
            }
        }
        if edge.is_self_loop() {
            problems.push(GraphError::self_loop(&edge.source));
        }
    }

    problems
}

// Convenience methods for building graphs with less boilerplate
impl GraphModel {
    /// Add a node of kind `other` whose label is its id
    pub fn add_simple_node(&mut self, id: &str) -> Result<()> {
        self.add_node(NodeData::new(id, NodeKind::Other, id))
    }

    /// Add an `e<source>-<target>` edge of the given relationship
    pub fn add_simple_edge(&mut self, source: &str, target: &str, kind: RelationshipKind) -> Result<()> {
        self.add_edge(EdgeData::between(source, target, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> GraphModel {
        let mut model = GraphModel::new();
        model.add_simple_node("A").unwrap();
        model.add_simple_node("B").unwrap();
        model.add_simple_node("C").unwrap();
        model
    }

    #[test]
    fn test_model_basic_operations() {
        let mut model = abc();
        model.add_simple_edge("A", "B", RelationshipKind::Causes).unwrap();

        assert_eq!(model.node_count(), 3);
        assert_eq!(model.edge_count(), 1);
        assert!(model.has_edge("eA-B"));
        assert_eq!(model.successors("A"), vec!["B"]);
        assert_eq!(model.predecessors("B"), vec!["A"]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut model = abc();
        assert_eq!(
            model.add_simple_node("A"),
            Err(GraphError::duplicate_node("A"))
        );
        model.add_simple_edge("A", "B", RelationshipKind::Causes).unwrap();
        assert_eq!(
            model.add_simple_edge("A", "B", RelationshipKind::Located),
            Err(GraphError::duplicate_edge("eA-B"))
        );
        assert_eq!(model.edge_count(), 1);
    }

    #[test]
    fn test_invalid_edges_rejected() {
        let mut model = abc();
        assert_eq!(
            model.add_simple_edge("A", "Z", RelationshipKind::Causes),
            Err(GraphError::dangling_edge("eA-Z", "Z"))
        );
        assert_eq!(
            model.add_simple_edge("A", "A", RelationshipKind::Causes),
            Err(GraphError::self_loop("A"))
        );
        assert_eq!(model.edge_count(), 0);
    }

    #[test]
    fn test_remove_node_prunes_orphans() {
        let mut model = abc();
        model.add_simple_edge("A", "B", RelationshipKind::Influences).unwrap();

        let (removed, pruned) = model.remove_node("B").unwrap();
        assert_eq!(removed.id, "B");
        assert_eq!(pruned.len(), 1);
        assert_eq!(model.edge_count(), 0);
        assert_eq!(model.node_count(), 2);
        assert!(model.remove_node("B").is_err());
    }

    #[test]
    fn test_remove_node_clears_selection() {
        let mut model = abc();
        model.add_simple_edge("A", "B", RelationshipKind::Influences).unwrap();
        model.select_node(model.get_node("B").cloned());
        model.select_edge(Some(EdgeSelection {
            id: "eA-B".to_string(),
            source: "A".to_string(),
            target: "B".to_string(),
            label: String::new(),
            kind: RelationshipKind::Influences,
        }));

        model.remove_node("B").unwrap();
        assert!(model.selected_node().is_none());
        assert!(model.selected_edge().is_none());
    }

    #[test]
    fn test_update_edge() {
        let mut model = abc();
        model.add_simple_edge("A", "B", RelationshipKind::Causes).unwrap();

        let mut edge = model.get_edge("eA-B").cloned().unwrap();
        edge.target = "C".to_string();
        model.update_edge(edge).unwrap();
        assert_eq!(model.get_edge("eA-B").unwrap().target, "C");

        let mut looped = model.get_edge("eA-B").cloned().unwrap();
        looped.target = "A".to_string();
        assert!(model.update_edge(looped).is_err());
        assert_eq!(model.get_edge("eA-B").unwrap().target, "C");
    }

    #[test]
    fn test_replace_edge_keeps_order() {
        let mut model = abc();
        model.add_simple_edge("A", "B", RelationshipKind::Causes).unwrap();
        model.add_simple_edge("B", "C", RelationshipKind::Causes).unwrap();

        let mut moved = model.get_edge("eA-B").cloned().unwrap();
        moved.id = "eA-C".to_string();
        moved.target = "C".to_string();
        model.replace_edge("eA-B", moved.clone()).unwrap();

        let ids: Vec<_> = model.edges().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["eA-C", "eB-C"]);
        assert!(model.get_edge("eA-B").is_none());

        moved.id = "eB-C".to_string();
        assert_eq!(
            model.replace_edge("eA-C", moved),
            Err(GraphError::duplicate_edge("eB-C"))
        );
    }

    #[test]
    fn test_unique_edge_id() {
        let mut model = abc();
        assert_eq!(model.unique_edge_id("eA-B"), "eA-B");
        model.add_simple_edge("A", "B", RelationshipKind::Causes).unwrap();
        assert_eq!(model.unique_edge_id("eA-B"), "eA-B-2");
        assert_eq!(model.find_edge_between("A", "B").unwrap().id, "eA-B");
        assert!(model.find_edge_between("B", "A").is_none());
    }

    #[test]
    fn test_toolbar_nodes() {
        let mut model = GraphModel::new();
        let first = model.add_node_of_kind(NodeKind::Person).unwrap();
        let second = model.add_node_of_kind(NodeKind::Event).unwrap();

        assert_eq!(first, "node-1");
        assert_eq!(second, "node-2");

        let first = model.get_node(&first).unwrap();
        assert_eq!(first.label, "New person");
        assert_eq!(first.description, "Description for new person");
        assert_eq!(first.position, Position::new(100.0, 100.0));
        assert_eq!(model.get_node(&second).unwrap().position, Position::new(350.0, 100.0));
    }

    #[test]
    fn test_generated_ids_skip_taken() {
        let mut model = GraphModel::new();
        model.add_simple_node("node-1").unwrap();
        assert_eq!(model.add_node_of_kind(NodeKind::Goal).unwrap(), "node-2");
    }

    #[test]
    fn test_iteration_order() {
        let mut model = GraphModel::new();
        model.add_simple_node("C").unwrap();
        model.add_simple_node("A").unwrap();
        model.add_simple_node("B").unwrap();

        let ids: Vec<_> = model.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_check_document_reports_everything() {
        let doc = GraphDocument::new(
            vec![
                NodeData::new("A", NodeKind::Person, "A"),
                NodeData::new("A", NodeKind::Event, "A again"),
            ],
            vec![
                EdgeData::between("A", "ghost", RelationshipKind::Causes),
                EdgeData::new("loop", "A", "A", RelationshipKind::Causes),
            ],
        );
        let problems = check_document(&doc);
        assert_eq!(
            problems,
            vec![
                GraphError::duplicate_node("A"),
                GraphError::dangling_edge("eA-ghost", "ghost"),
                GraphError::self_loop("A"),
            ]
        );
        assert!(GraphModel::from_document(&doc).is_err());
    }

    #[test]
    fn test_document_round_trip() {
        let mut model = abc();
        model.add_simple_edge("B", "C", RelationshipKind::Located).unwrap();
        let doc = model.to_document(Direction::LeftToRight);
        let reloaded = GraphModel::from_document(&doc).unwrap();
        assert_eq!(reloaded.node_count(), 3);
        assert_eq!(reloaded.edge_count(), 1);
        assert_eq!(reloaded.to_document(Direction::LeftToRight), doc);
    }
}

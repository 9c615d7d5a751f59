//! Canvas adapter
//!
//! Maps model nodes and edges to the element shapes the canvas renders, and
//! canvas gestures (clicks, connects) back into selections and model edges.

use serde::{Deserialize, Serialize};

use crate::core::{
    Connection, EdgeData, EdgeSelection, NodeData, NodeKind, Position, RelationshipKind,
};

/// Variant tag every canvas node carries
pub const NODE_VARIANT: &str = "historical";

/// Label given to edges drawn with the connect gesture
pub const NEW_CONNECTION_LABEL: &str = "New Connection";

/// Stroke width shared by every edge
pub const EDGE_STROKE_WIDTH: f64 = 2.0;

/// Fallback colour for unknown relationships and unlisted node kinds
pub const DEFAULT_COLOR: &str = "#64748b";

/// Stroke colour for a relationship
pub fn stroke_color(kind: &RelationshipKind) -> &'static str {
    match kind {
        RelationshipKind::Causes => "#ef4444",
        RelationshipKind::Influences => "#a855f7",
        RelationshipKind::Participates => "#3b82f6",
        RelationshipKind::Located => "#22c55e",
        RelationshipKind::Custom(_) => DEFAULT_COLOR,
    }
}

/// Minimap fill colour for a node kind
pub fn minimap_color(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Person => "#3b82f6",
        NodeKind::Event => "#ef4444",
        NodeKind::Country => "#22c55e",
        NodeKind::Term => "#a855f7",
        NodeKind::Cause
        | NodeKind::Political
        | NodeKind::Economic
        | NodeKind::Social
        | NodeKind::Cultural
        | NodeKind::Date
        | NodeKind::Goal
        | NodeKind::Indicator
        | NodeKind::Other => DEFAULT_COLOR,
    }
}

/// A node as the canvas sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    pub id: String,
    #[serde(rename = "type")]
    pub variant: String,
    pub position: Position,
    pub data: NodeData,
    pub draggable: bool,
}

impl From<&NodeData> for CanvasNode {
    fn from(node: &NodeData) -> Self {
        Self {
            id: node.id.clone(),
            variant: NODE_VARIANT.to_string(),
            position: node.position,
            data: node.clone(),
            draggable: true,
        }
    }
}

/// Stroke styling of a canvas edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub stroke: String,
    #[serde(rename = "strokeWidth")]
    pub stroke_width: f64,
}

impl EdgeStyle {
    pub fn for_kind(kind: &RelationshipKind) -> Self {
        Self {
            stroke: stroke_color(kind).to_string(),
            stroke_width: EDGE_STROKE_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    ArrowClosed,
}

/// End marker drawn at the target of every edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    pub width: f64,
    pub height: f64,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            kind: MarkerKind::ArrowClosed,
            width: 20.0,
            height: 20.0,
        }
    }
}

/// Relationship payload attached to a canvas edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasEdgeData {
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    #[serde(rename = "customLabel", default, skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
}

/// An edge as the canvas sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub animated: bool,
    pub style: EdgeStyle,
    #[serde(rename = "markerEnd")]
    pub marker_end: Marker,
    /// Missing on edges the canvas created without a relationship
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CanvasEdgeData>,
}

impl CanvasEdge {
    /// Relationship carried by this edge, if any
    pub fn kind(&self) -> Option<&RelationshipKind> {
        self.data.as_ref().map(|d| &d.kind)
    }

    /// Selection payload, substituting `default_kind` when the edge has none
    pub fn selection(&self, default_kind: &RelationshipKind) -> EdgeSelection {
        EdgeSelection {
            id: self.id.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
            label: self.label.clone(),
            kind: self.kind().cloned().unwrap_or_else(|| default_kind.clone()),
        }
    }

    /// Convert back to a model edge, substituting `default_kind` when needed
    pub fn to_model_edge(&self, default_kind: &RelationshipKind) -> EdgeData {
        let mut edge = EdgeData::new(
            self.id.clone(),
            self.source.clone(),
            self.target.clone(),
            self.kind().cloned().unwrap_or_else(|| default_kind.clone()),
        )
        .with_label(self.label.clone());
        edge.custom_label = self.data.as_ref().and_then(|d| d.custom_label.clone());
        edge
    }
}

impl From<&EdgeData> for CanvasEdge {
    fn from(edge: &EdgeData) -> Self {
        Self {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            label: edge.label.clone(),
            animated: true,
            style: EdgeStyle::for_kind(&edge.kind),
            marker_end: Marker::default(),
            data: Some(CanvasEdgeData {
                kind: edge.kind.clone(),
                custom_label: edge.custom_label.clone(),
            }),
        }
    }
}

/// Map model collections to canvas collections, preserving order
pub fn to_canvas<'a>(
    nodes: impl IntoIterator<Item = &'a NodeData>,
    edges: impl IntoIterator<Item = &'a EdgeData>,
) -> (Vec<CanvasNode>, Vec<CanvasEdge>) {
    (
        nodes.into_iter().map(CanvasNode::from).collect(),
        edges.into_iter().map(CanvasEdge::from).collect(),
    )
}

/// Id given to edges drawn with the connect gesture
pub fn connection_edge_id(connection: &Connection) -> String {
    format!("edge-{}-{}", connection.source, connection.target)
}

/// Model edge created by a connect gesture
pub fn edge_from_connection(connection: &Connection, kind: RelationshipKind) -> EdgeData {
    EdgeData::new(
        connection_edge_id(connection),
        connection.source.clone(),
        connection.target.clone(),
        kind,
    )
    .with_label(NEW_CONNECTION_LABEL)
}

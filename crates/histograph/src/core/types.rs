//! Core type definitions for graph processing
//!
//! This module contains the fundamental types used throughout Histograph:
//! node kinds, relationship kinds, layout direction, and the node/edge
//! records that make up a graph document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic kind of a node
///
/// Covers people, events and causes plus the PESC factors
/// (political, economic, social, cultural) and a few supporting kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Person,
    Event,
    Cause,
    Political,
    Economic,
    Social,
    Cultural,
    Term,
    Date,
    Goal,
    Indicator,
    Country,
    #[default]
    Other,
}

impl NodeKind {
    /// Every node kind, in toolbar order
    pub const ALL: [NodeKind; 13] = [
        NodeKind::Person,
        NodeKind::Event,
        NodeKind::Cause,
        NodeKind::Political,
        NodeKind::Economic,
        NodeKind::Social,
        NodeKind::Cultural,
        NodeKind::Term,
        NodeKind::Date,
        NodeKind::Goal,
        NodeKind::Indicator,
        NodeKind::Country,
        NodeKind::Other,
    ];

    /// Lowercase tag used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Person => "person",
            NodeKind::Event => "event",
            NodeKind::Cause => "cause",
            NodeKind::Political => "political",
            NodeKind::Economic => "economic",
            NodeKind::Social => "social",
            NodeKind::Cultural => "cultural",
            NodeKind::Term => "term",
            NodeKind::Date => "date",
            NodeKind::Goal => "goal",
            NodeKind::Indicator => "indicator",
            NodeKind::Country => "country",
            NodeKind::Other => "other",
        }
    }

    /// Returns true for the four PESC factor kinds
    pub fn is_pesc_factor(&self) -> bool {
        matches!(
            self,
            NodeKind::Political | NodeKind::Economic | NodeKind::Social | NodeKind::Cultural
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("Unknown node kind: {}", s))
    }
}

/// Relationship carried by an edge
///
/// The four built-in kinds have fixed canvas colors; anything else is kept
/// verbatim as free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipKind {
    Causes,
    Influences,
    Participates,
    Located,
    Custom(String),
}

impl RelationshipKind {
    /// The built-in relationship kinds
    pub const BUILT_IN: [RelationshipKind; 4] = [
        RelationshipKind::Causes,
        RelationshipKind::Influences,
        RelationshipKind::Participates,
        RelationshipKind::Located,
    ];

    /// Choices offered by the relationship dialog
    pub const DIALOG_CHOICES: [&'static str; 6] = [
        "Caused by",
        "Led to",
        "Influenced",
        "Part of",
        "Opposed to",
        "Related to",
    ];

    /// Tag used on the wire
    pub fn as_str(&self) -> &str {
        match self {
            RelationshipKind::Causes => "causes",
            RelationshipKind::Influences => "influences",
            RelationshipKind::Participates => "participates",
            RelationshipKind::Located => "located",
            RelationshipKind::Custom(tag) => tag,
        }
    }

    /// Returns true for free-text relationships
    pub fn is_custom(&self) -> bool {
        matches!(self, RelationshipKind::Custom(_))
    }

    /// Build a relationship from a dialog choice such as "Led to"
    ///
    /// The choice is slugified (`led-to`); a slug naming a built-in kind
    /// resolves to that kind.
    pub fn from_dialog_choice(choice: &str) -> Self {
        let slug = choice
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        RelationshipKind::from(slug)
    }
}

impl Default for RelationshipKind {
    fn default() -> Self {
        RelationshipKind::Influences
    }
}

impl From<String> for RelationshipKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "causes" => RelationshipKind::Causes,
            "influences" => RelationshipKind::Influences,
            "participates" => RelationshipKind::Participates,
            "located" => RelationshipKind::Located,
            _ => RelationshipKind::Custom(value),
        }
    }
}

impl From<&str> for RelationshipKind {
    fn from(value: &str) -> Self {
        RelationshipKind::from(value.to_string())
    }
}

impl From<RelationshipKind> for String {
    fn from(value: RelationshipKind) -> Self {
        match value {
            RelationshipKind::Custom(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flow direction for the layered layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Ranks stacked top to bottom (TB or TD)
    #[default]
    #[serde(rename = "TB", alias = "TD", alias = "tb", alias = "td")]
    TopToBottom,
    /// Ranks laid out left to right (LR)
    #[serde(rename = "LR", alias = "lr")]
    LeftToRight,
}

impl Direction {
    /// Returns true if ranks advance along the y axis
    pub fn is_vertical(&self) -> bool {
        matches!(self, Direction::TopToBottom)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TB" | "TD" => Ok(Direction::TopToBottom),
            "LR" => Ok(Direction::LeftToRight),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::TopToBottom => write!(f, "TB"),
            Direction::LeftToRight => write!(f, "LR"),
        }
    }
}

/// A point on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Last observed pixel size of the canvas container
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides are strictly positive
    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// A node in the graph with its semantic data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Unique identifier for the node
    pub id: String,
    /// Semantic kind
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Display label
    pub label: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Top-left corner on the canvas
    #[serde(default)]
    pub position: Position,
}

impl NodeData {
    /// Create a node at the origin with an empty description
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            description: String::new(),
            position: Position::default(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the position
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

/// An edge connecting two nodes with a relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Unique identifier for the edge
    pub id: String,
    /// Source node ID
    pub source: String,
    /// Target node ID
    pub target: String,
    /// Relationship carried by the edge
    #[serde(rename = "type", default)]
    pub kind: RelationshipKind,
    /// Label shown on the canvas
    #[serde(default)]
    pub label: String,
    /// Optional label chosen in the relationship dialog
    #[serde(
        rename = "customLabel",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_label: Option<String>,
}

impl EdgeData {
    /// Create an edge with an explicit id
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: RelationshipKind,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind,
            label: String::new(),
            custom_label: None,
        }
    }

    /// Create an edge whose id follows the `e<source>-<target>` convention
    pub fn between(source: impl Into<String>, target: impl Into<String>, kind: RelationshipKind) -> Self {
        let source = source.into();
        let target = target.into();
        let id = format!("e{}-{}", source, target);
        Self::new(id, source, target, kind)
    }

    /// Set the canvas label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the custom label
    pub fn with_custom_label(mut self, custom_label: impl Into<String>) -> Self {
        self.custom_label = Some(custom_label.into());
        self
    }

    /// Text shown next to the edge: custom label, else the relationship tag,
    /// else "connected"
    pub fn display_label(&self) -> &str {
        match self.custom_label.as_deref() {
            Some(custom) if !custom.is_empty() => custom,
            _ if !self.kind.as_str().is_empty() => self.kind.as_str(),
            _ => "connected",
        }
    }

    /// Returns true if the edge starts and ends on the same node
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// A proposed edge, as produced by a connect gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source: String,
    pub target: String,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Edge payload published when an edge is clicked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSelection {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
}

/// Serializable snapshot of a whole graph
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub nodes: Vec<NodeData>,
    #[serde(default)]
    pub edges: Vec<EdgeData>,
}

impl GraphDocument {
    pub fn new(nodes: Vec<NodeData>, edges: Vec<EdgeData>) -> Self {
        Self {
            direction: Direction::default(),
            nodes,
            edges,
        }
    }
}

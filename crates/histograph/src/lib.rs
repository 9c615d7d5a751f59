//! Histograph - interactive graphs of historical entities and relationships
//!
//! A library for keeping a node/edge model of people, events, causes and
//! PESC factors in sync with an interactive canvas, and for laying such
//! graphs out in ranked layers.
//!
//! # Quick Start
//!
//! ```rust
//! use histograph::layout_document;
//!
//! let input = r#"{
//!     "nodes": [
//!         {"id": "a", "type": "person", "label": "Bismarck"},
//!         {"id": "b", "type": "event", "label": "Unification"}
//!     ],
//!     "edges": [{"id": "ea-b", "source": "a", "target": "b", "type": "causes"}]
//! }"#;
//! let output = layout_document(input, None).unwrap();
//! assert!(output.contains("\"position\""));
//! ```
//!
//! # Advanced Usage
//!
//! Drive the sync controller directly:
//!
//! ```rust
//! use histograph::prelude::*;
//! use std::time::Instant;
//!
//! struct Headless;
//! impl CanvasSurface for Headless {
//!     fn render(&mut self, _nodes: &[CanvasNode], _edges: &[CanvasEdge]) {}
//!     fn fit_view(&mut self) {}
//! }
//!
//! let mut controller = SyncController::new(
//!     GraphModel::new(),
//!     LayeredLayout::new(),
//!     Headless,
//!     CanvasConfig::default(),
//! );
//! controller.mount().unwrap();
//! let a = controller.add_node_of_kind(NodeKind::Person).unwrap();
//! let b = controller.add_node_of_kind(NodeKind::Event).unwrap();
//! controller
//!     .handle(CanvasEvent::Connect(Connection::new(&a, &b)), Instant::now())
//!     .unwrap();
//! assert_eq!(controller.store().edge_count(), 1);
//! ```

pub mod canvas;
pub mod classifier;
pub mod core;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use crate::core::*;

use anyhow::Context;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::canvas::{
        CanvasEdge, CanvasEvent, CanvasNode, CanvasSurface, EdgeChange, GraphModel,
        LayeredLayout, LayoutConfig, NodeChange, SyncController,
    };
    pub use crate::classifier::{
        analyze_text, Classification, ClassifierError, ClassifierTask, TextClassifier,
    };
    pub use crate::core::{
        CanvasConfig, Connection, Dimensions, Direction, EdgeData, GraphDocument, GraphError,
        GraphStore, LayoutEngine, NodeData, NodeKind, Position, RelationshipKind,
    };
}

/// Lay out a document with the given configuration
///
/// Nodes come back in document order with positions replaced; edges are
/// unchanged. The document's own direction is ignored in favour of
/// `config.direction`.
pub fn layout_with_config(
    document: &GraphDocument,
    config: &CanvasConfig,
) -> Result<GraphDocument> {
    let engine = canvas::LayeredLayout::with_config(config.layout.clone());
    let nodes = engine.layout(&document.nodes, &document.edges, config.direction)?;
    Ok(GraphDocument {
        direction: config.direction,
        nodes,
        edges: document.edges.clone(),
    })
}

/// Lay out a JSON graph document and return it as pretty JSON
///
/// `direction` overrides the direction stored in the document.
pub fn layout_document(json: &str, direction: Option<Direction>) -> anyhow::Result<String> {
    let document: GraphDocument =
        serde_json::from_str(json).context("Failed to parse graph document")?;
    let config = CanvasConfig::default().with_direction(direction.unwrap_or(document.direction));
    let placed = layout_with_config(&document, &config)?;
    serde_json::to_string_pretty(&placed).context("Failed to serialize graph document")
}

/// Parse a JSON graph document and list every structural problem in it
pub fn check_document_json(json: &str) -> anyhow::Result<Vec<GraphError>> {
    let document: GraphDocument =
        serde_json::from_str(json).context("Failed to parse graph document")?;
    Ok(canvas::check_document(&document))
}

/// Merge a classification response body into a JSON graph document
///
/// Returns the updated document, laid out, and a summary of the import.
pub fn import_into_document(
    document: &GraphDocument,
    response_body: &str,
    config: &CanvasConfig,
) -> anyhow::Result<(GraphDocument, classifier::ImportSummary)> {
    let classification = classifier::process_response(200, response_body)
        .context("Failed to read classification")?;
    let mut model =
        canvas::GraphModel::from_document(document).context("Invalid graph document")?;
    let plan = classifier::plan_import(&model, &classification);
    for node in plan.nodes {
        model.add_node(node)?;
    }
    for edge in plan.edges {
        model.add_edge(edge)?;
    }
    let merged = layout_with_config(&model.to_document(config.direction), config)?;
    Ok((merged, plan.summary))
}

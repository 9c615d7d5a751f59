//! Synchronization between the graph store and the canvas
//!
//! The controller owns the store, the layout engine and the canvas surface.
//! Two kinds of change flow through it:
//!
//! - **Model → canvas**: every change made through the controller (add,
//!   remove, edit, import) replaces the canvas collections wholesale.
//! - **Canvas → model**: gestures arrive as [`CanvasEvent`]s. Drags move the
//!   canvas node and are mirrored into the store on release; removals and
//!   connects are mirrored immediately.
//!
//! Layout only runs when the number of canvas nodes or edges differs from
//! the last check, so drags and edge edits never trigger it. Fit-to-view
//! runs immediately on mount and, after a resize, once the debounce window
//! has passed without another resize.

use std::time::Instant;
use tracing::{debug, info, span, trace, warn, Level};

use super::adapter::{connection_edge_id, edge_from_connection, to_canvas, CanvasEdge, CanvasNode};
use super::debounce::FitDebouncer;
use super::model::GraphModel;
use super::validator::{ConnectionValidator, NoSelfLoops};
use crate::classifier::{plan_import, Classification, ImportSummary};
use crate::core::{
    CanvasConfig, Connection, Dimensions, EdgeData, GraphError, GraphStore, LayoutEngine,
    NodeData, NodeKind, Position, Result,
};

/// The rendering side of the canvas
pub trait CanvasSurface {
    /// Replace everything on screen
    fn render(&mut self, nodes: &[CanvasNode], edges: &[CanvasEdge]);

    /// Zoom and pan so every node is visible
    fn fit_view(&mut self);
}

/// Node-level change reported by the canvas
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    /// A node moved; `dragging` is false on the final event of a drag
    Position {
        id: String,
        position: Position,
        dragging: bool,
    },
    Remove {
        id: String,
    },
}

/// Edge-level change reported by the canvas
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    Remove { id: String },
}

/// A gesture or notification from the canvas
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    NodeClick { id: String },
    EdgeClick { id: String },
    Connect(Connection),
    NodesChanged(Vec<NodeChange>),
    EdgesChanged(Vec<EdgeChange>),
    Resize(Dimensions),
    /// The user picked up the end of an existing edge
    ReconnectStart { edge_id: String },
    /// The edge was dropped; `None` means it landed on empty canvas
    ReconnectEnd { connection: Option<Connection> },
}

/// Keeps a [`GraphStore`] and a [`CanvasSurface`] consistent
pub struct SyncController<S: GraphStore, L: LayoutEngine, V: CanvasSurface> {
    store: S,
    layout: L,
    surface: V,
    validator: Box<dyn ConnectionValidator>,
    config: CanvasConfig,
    canvas_nodes: Vec<CanvasNode>,
    canvas_edges: Vec<CanvasEdge>,
    /// Node and edge counts seen by the last structural check
    last_counts: (usize, usize),
    fit: FitDebouncer,
    reconnecting: Option<String>,
    layout_runs: usize,
    attached: bool,
}

impl<S: GraphStore, L: LayoutEngine, V: CanvasSurface> SyncController<S, L, V> {
    pub fn new(store: S, layout: L, surface: V, config: CanvasConfig) -> Self {
        let fit = FitDebouncer::new(config.fit_debounce());
        Self {
            store,
            layout,
            surface,
            validator: Box::new(NoSelfLoops),
            config,
            canvas_nodes: Vec::new(),
            canvas_edges: Vec::new(),
            last_counts: (0, 0),
            fit,
            reconnecting: None,
            layout_runs: 0,
            attached: true,
        }
    }

    /// Replace the connection policy
    pub fn with_validator(mut self, validator: impl ConnectionValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn layout_engine(&self) -> &L {
        &self.layout
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut V {
        &mut self.surface
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn canvas_nodes(&self) -> &[CanvasNode] {
        &self.canvas_nodes
    }

    pub fn canvas_edges(&self) -> &[CanvasEdge] {
        &self.canvas_edges
    }

    /// Number of layout passes run so far
    pub fn layout_runs(&self) -> usize {
        self.layout_runs
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// True while a debounced fit is waiting to fire
    pub fn fit_pending(&self) -> bool {
        self.fit.is_pending()
    }

    /// First render: push the model, lay it out and fit immediately
    pub fn mount(&mut self) -> Result<()> {
        let mount_span = span!(
            Level::INFO,
            "mount_canvas",
            node_count = self.store.node_count(),
            edge_count = self.store.edge_count()
        );
        let _enter = mount_span.enter();

        self.attached = true;
        self.push_model();
        self.check_structure()?;
        self.surface.fit_view();
        info!(layout_runs = self.layout_runs, "Canvas mounted");
        Ok(())
    }

    /// Cancel pending work and ignore every later event
    pub fn teardown(&mut self) {
        self.fit.cancel();
        self.reconnecting = None;
        self.attached = false;
        debug!("Canvas detached");
    }

    /// Fire the debounced fit if it is due; returns true when it fired
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.attached {
            return false;
        }
        if self.fit.poll(now) {
            trace!("Debounced fit fired");
            self.surface.fit_view();
            true
        } else {
            false
        }
    }

    /// Handle one canvas event
    ///
    /// A rejected event leaves both the store and the canvas unchanged.
    pub fn handle(&mut self, event: CanvasEvent, now: Instant) -> Result<()> {
        if !self.attached {
            trace!(?event, "Ignoring event after teardown");
            return Ok(());
        }

        match event {
            CanvasEvent::NodeClick { id } => {
                let node = self
                    .store
                    .get_node(&id)
                    .cloned()
                    .ok_or_else(|| GraphError::unknown_node(&id))?;
                trace!(node_id = %id, "Node selected");
                self.store.select_node(Some(node));
                Ok(())
            }
            CanvasEvent::EdgeClick { id } => {
                let selection = self
                    .canvas_edges
                    .iter()
                    .find(|e| e.id == id)
                    .map(|e| e.selection(&self.config.default_edge_type))
                    .ok_or_else(|| GraphError::unknown_edge(&id))?;
                trace!(edge_id = %id, kind = %selection.kind, "Edge selected");
                self.store.select_edge(Some(selection));
                Ok(())
            }
            CanvasEvent::Connect(connection) => self.connect(connection),
            CanvasEvent::NodesChanged(changes) => self.apply_node_changes(changes),
            CanvasEvent::EdgesChanged(changes) => self.apply_edge_changes(changes),
            CanvasEvent::Resize(dimensions) => {
                self.resize(dimensions, now);
                Ok(())
            }
            CanvasEvent::ReconnectStart { edge_id } => {
                if self.store.get_edge(&edge_id).is_none() {
                    return Err(GraphError::unknown_edge(&edge_id));
                }
                trace!(edge_id = %edge_id, "Reconnect started");
                self.reconnecting = Some(edge_id);
                Ok(())
            }
            CanvasEvent::ReconnectEnd { connection } => self.finish_reconnect(connection),
        }
    }

    /// Add a node to the model
    pub fn add_node(&mut self, node: NodeData) -> Result<()> {
        self.store.add_node(node)?;
        self.model_changed()
    }

    /// Add an edge to the model
    pub fn add_edge(&mut self, edge: EdgeData) -> Result<()> {
        if !self.validator.is_valid_connection(&Connection::new(&edge.source, &edge.target)) {
            return Err(GraphError::invalid_connection(&edge.source, &edge.target));
        }
        self.store.add_edge(edge)?;
        self.model_changed()
    }

    /// Remove a node and the edges touching it
    pub fn remove_node(&mut self, id: &str) -> Result<()> {
        self.store.remove_node(id)?;
        self.model_changed()
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<()> {
        self.store.remove_edge(id)?;
        self.model_changed()
    }

    /// Replace an edge's relationship, labels or endpoints
    pub fn update_edge(&mut self, edge: EdgeData) -> Result<()> {
        self.store.update_edge(edge)?;
        self.model_changed()
    }

    /// Merge a classifier result into the model as one structural change
    pub fn import_classification(&mut self, classification: &Classification) -> Result<ImportSummary> {
        let import_span = span!(
            Level::INFO,
            "import_classification",
            entities = classification.entities.len(),
            relationships = classification.relationships.len()
        );
        let _enter = import_span.enter();

        let plan = plan_import(&self.store, classification);
        for node in plan.nodes {
            self.store.add_node(node)?;
        }
        for edge in plan.edges {
            self.store.add_edge(edge)?;
        }
        self.model_changed()?;
        info!(
            nodes_added = plan.summary.nodes_added,
            edges_added = plan.summary.edges_added,
            "Import completed"
        );
        Ok(plan.summary)
    }

    fn model_changed(&mut self) -> Result<()> {
        self.push_model();
        self.check_structure()
    }

    /// Full replace of the canvas collections from the store
    fn push_model(&mut self) {
        let (nodes, edges) = to_canvas(self.store.nodes(), self.store.edges());
        self.canvas_nodes = nodes;
        self.canvas_edges = edges;
        self.render();
    }

    fn render(&mut self) {
        if self.attached {
            self.surface.render(&self.canvas_nodes, &self.canvas_edges);
        }
    }

    /// Lay out when the canvas node or edge count changed
    fn check_structure(&mut self) -> Result<()> {
        let counts = (self.canvas_nodes.len(), self.canvas_edges.len());
        if counts == self.last_counts {
            return Ok(());
        }
        trace!(
            nodes = counts.0,
            edges = counts.1,
            previous_nodes = self.last_counts.0,
            previous_edges = self.last_counts.1,
            "Structure changed"
        );
        self.last_counts = counts;
        if self.canvas_nodes.is_empty() {
            return Ok(());
        }
        self.run_layout()
    }

    fn run_layout(&mut self) -> Result<()> {
        let nodes: Vec<NodeData> = self.store.nodes().cloned().collect();
        let edges: Vec<EdgeData> = self.store.edges().cloned().collect();

        let placed = self
            .layout
            .layout(&nodes, &edges, self.config.direction)
            .inspect_err(|err| warn!(%err, "Layout failed, keeping previous positions"))?;
        self.layout_runs += 1;

        for node in &placed {
            self.store.set_position(&node.id, node.position)?;
        }
        self.push_model();
        debug!(
            engine = self.layout.name(),
            runs = self.layout_runs,
            "Layout applied"
        );
        Ok(())
    }

    fn connect(&mut self, connection: Connection) -> Result<()> {
        if !self.validator.is_valid_connection(&connection) {
            debug!(source = %connection.source, target = %connection.target, "Connection rejected");
            return Err(GraphError::invalid_connection(
                &connection.source,
                &connection.target,
            ));
        }

        if let Some(existing) = self
            .store
            .find_edge_between(&connection.source, &connection.target)
        {
            return Err(GraphError::duplicate_edge(&existing.id));
        }

        let mut edge = edge_from_connection(&connection, self.config.default_edge_type.clone());
        edge.id = self.store.unique_edge_id(&edge.id);
        self.store.add_edge(edge.clone())?;
        trace!(edge_id = %edge.id, "Connected");

        self.canvas_edges.push(CanvasEdge::from(&edge));
        self.render();
        self.check_structure()
    }

    fn apply_node_changes(&mut self, changes: Vec<NodeChange>) -> Result<()> {
        for change in changes {
            match change {
                NodeChange::Position {
                    id,
                    position,
                    dragging,
                } => {
                    let Some(node) = self.canvas_nodes.iter_mut().find(|n| n.id == id) else {
                        debug!(node_id = %id, "Position change for unknown node");
                        continue;
                    };
                    node.position = position;
                    node.data.position = position;
                    if !dragging {
                        self.store.set_position(&id, position)?;
                    }
                }
                NodeChange::Remove { id } => {
                    match self.store.remove_node(&id) {
                        Ok((_, pruned)) => debug!(node_id = %id, pruned = pruned.len(), "Node removed on canvas"),
                        Err(err) => debug!(%err, "Canvas removed a node the model does not hold"),
                    }
                    self.canvas_nodes.retain(|n| n.id != id);
                    self.canvas_edges.retain(|e| e.source != id && e.target != id);
                }
            }
        }
        self.render();
        self.check_structure()
    }

    fn apply_edge_changes(&mut self, changes: Vec<EdgeChange>) -> Result<()> {
        for change in changes {
            match change {
                EdgeChange::Remove { id } => {
                    if let Err(err) = self.store.remove_edge(&id) {
                        debug!(%err, "Canvas removed an edge the model does not hold");
                    }
                    self.canvas_edges.retain(|e| e.id != id);
                    if self.reconnecting.as_deref() == Some(id.as_str()) {
                        self.reconnecting = None;
                    }
                }
            }
        }
        self.render();
        self.check_structure()
    }

    fn resize(&mut self, dimensions: Dimensions, now: Instant) {
        if !dimensions.is_positive() {
            trace!(?dimensions, "Ignoring empty container size");
            return;
        }
        if self.store.container_dimensions() == Some(dimensions) {
            return;
        }
        self.store.set_container_dimensions(dimensions);
        self.fit.trigger(now);
        trace!(width = dimensions.width, height = dimensions.height, "Container resized");
    }

    fn finish_reconnect(&mut self, connection: Option<Connection>) -> Result<()> {
        let Some(edge_id) = self.reconnecting.take() else {
            return Ok(());
        };
        let Some(connection) = connection else {
            trace!(edge_id = %edge_id, "Reconnect dropped on empty canvas");
            return Ok(());
        };
        if !self.validator.is_valid_connection(&connection) {
            return Err(GraphError::invalid_connection(
                &connection.source,
                &connection.target,
            ));
        }

        let previous = self
            .store
            .get_edge(&edge_id)
            .cloned()
            .ok_or_else(|| GraphError::unknown_edge(&edge_id))?;
        if previous.source == connection.source && previous.target == connection.target {
            trace!(edge_id = %edge_id, "Reconnect kept both endpoints");
            return Ok(());
        }
        if let Some(existing) = self
            .store
            .find_edge_between(&connection.source, &connection.target)
        {
            return Err(GraphError::duplicate_edge(&existing.id));
        }

        // Ids track the current endpoints
        let edge = EdgeData {
            id: self.store.unique_edge_id(&connection_edge_id(&connection)),
            source: connection.source,
            target: connection.target,
            ..previous
        };
        self.store.replace_edge(&edge_id, edge.clone())?;

        if let Some(canvas_edge) = self.canvas_edges.iter_mut().find(|e| e.id == edge_id) {
            *canvas_edge = CanvasEdge::from(&edge);
        }
        debug!(old_id = %edge_id, edge_id = %edge.id, source = %edge.source, target = %edge.target, "Edge reconnected");
        self.render();
        self.check_structure()
    }
}

impl<L: LayoutEngine, V: CanvasSurface> SyncController<GraphModel, L, V> {
    /// Add a toolbar node of the given kind, returning its id
    pub fn add_node_of_kind(&mut self, kind: NodeKind) -> Result<String> {
        let id = self.store.add_node_of_kind(kind)?;
        self.model_changed()?;
        Ok(id)
    }
}

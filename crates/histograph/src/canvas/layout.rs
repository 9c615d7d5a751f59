//! Layered graph layout
//!
//! Positions nodes with a Sugiyama-style pipeline:
//!
//! 1. Cycle breaking: a depth-first search in input order reverses every
//!    edge that closes a cycle.
//! 2. Ranking: longest path from the sources.
//! 3. Normalization: edges spanning several ranks are split with virtual
//!    nodes, one per intermediate rank.
//! 4. Ordering: barycenter sweeps, keeping the order with fewest crossings.
//! 5. Coordinates: each node moves towards the mean of its neighbours in the
//!    previous rank, a forward pass enforces the minimum separation, and the
//!    rank is shifted back by the mean displacement.
//!
//! Every node occupies the same footprint whatever its label. Returned
//! positions are top-left corners, i.e. centre minus half the footprint.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info, span, trace, Level};

use super::ordering::{minimize_crossings, Adjacency};
use crate::core::{Direction, EdgeData, GraphError, LayoutEngine, NodeData, Position, Result};

/// Number of alternating refinement sweeps in coordinate assignment
const COORDINATE_PASSES: usize = 4;

/// Layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Footprint width of every node
    pub node_width: f64,
    /// Footprint height of every node
    pub node_height: f64,
    /// Gap between neighbouring nodes in the same rank
    pub node_sep: f64,
    /// Gap between consecutive ranks
    pub rank_sep: f64,
    /// Barycenter sweeps during ordering
    pub order_iterations: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 172.0,
            node_height: 36.0,
            node_sep: 50.0,
            rank_sep: 50.0,
            order_iterations: 8,
        }
    }
}

/// Layered layout engine
#[derive(Debug, Clone, Default)]
pub struct LayeredLayout {
    config: LayoutConfig,
}

impl LayeredLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Footprint extents as (along the order axis, along the rank axis)
    fn extents(&self, direction: Direction) -> (f64, f64) {
        if direction.is_vertical() {
            (self.config.node_width, self.config.node_height)
        } else {
            (self.config.node_height, self.config.node_width)
        }
    }
}

/// Resolve edges to index pairs, rejecting duplicate node ids and dangling
/// endpoints. Self-loops are dropped.
fn index_edges(nodes: &[NodeData], edges: &[EdgeData]) -> Result<Vec<(usize, usize)>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        if index.insert(node.id.as_str(), i).is_some() {
            return Err(GraphError::duplicate_node(&node.id));
        }
    }

    let mut pairs = Vec::with_capacity(edges.len());
    for edge in edges {
        let source = *index
            .get(edge.source.as_str())
            .ok_or_else(|| GraphError::dangling_edge(&edge.id, &edge.source))?;
        let target = *index
            .get(edge.target.as_str())
            .ok_or_else(|| GraphError::dangling_edge(&edge.id, &edge.target))?;
        if source != target {
            pairs.push((source, target));
        } else {
            trace!(edge_id = %edge.id, "Ignoring self-loop");
        }
    }
    Ok(pairs)
}

/// Reverse the edges that close a cycle during a DFS in input order
fn break_cycles(count: usize, edges: &[(usize, usize)]) -> Vec<(usize, usize)> {
    const UNVISITED: u8 = 0;
    const ON_STACK: u8 = 1;
    const DONE: u8 = 2;

    let mut out_edges: Vec<Vec<(usize, usize)>> = vec![Vec::new(); count];
    for (edge_idx, &(from, to)) in edges.iter().enumerate() {
        out_edges[from].push((edge_idx, to));
    }

    let mut state = vec![UNVISITED; count];
    let mut reversed = vec![false; edges.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..count {
        if state[root] != UNVISITED {
            continue;
        }
        state[root] = ON_STACK;
        stack.push((root, 0));

        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            if let Some(&(edge_idx, to)) = out_edges[node].get(next) {
                top.1 += 1;
                match state[to] {
                    UNVISITED => {
                        state[to] = ON_STACK;
                        stack.push((to, 0));
                    }
                    ON_STACK => reversed[edge_idx] = true,
                    _ => {}
                }
            } else {
                state[node] = DONE;
                stack.pop();
            }
        }
    }

    edges
        .iter()
        .zip(&reversed)
        .map(|(&(from, to), &flip)| if flip { (to, from) } else { (from, to) })
        .collect()
}

/// Longest-path ranks over an acyclic edge list; sources and isolated nodes
/// get rank 0
fn longest_path_ranks(count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut graph = Adjacency::new(count);
    let mut in_degree = vec![0usize; count];
    for &(from, to) in edges {
        graph.add_edge(from, to);
        in_degree[to] += 1;
    }

    let mut ranks = vec![0usize; count];
    let mut queue: VecDeque<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();
    while let Some(node) = queue.pop_front() {
        for &succ in graph.successors(node) {
            ranks[succ] = ranks[succ].max(ranks[node] + 1);
            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                queue.push_back(succ);
            }
        }
    }
    ranks
}

/// Rank of every node, in input order
///
/// Uses the same cycle breaking and ranking as [`LayeredLayout`], so a node
/// with rank `r` ends up in the `r`-th layer of the layout.
pub fn assign_ranks(nodes: &[NodeData], edges: &[EdgeData]) -> Result<Vec<usize>> {
    let pairs = index_edges(nodes, edges)?;
    let acyclic = break_cycles(nodes.len(), &pairs);
    Ok(longest_path_ranks(nodes.len(), &acyclic))
}

/// Split edges spanning more than one rank into chains of virtual nodes
///
/// Returns the unit-span graph; `ranks` is extended with the virtual nodes.
fn normalize(real_count: usize, edges: &[(usize, usize)], ranks: &mut Vec<usize>) -> Adjacency {
    let mut graph = Adjacency::new(real_count);
    for &(from, to) in edges {
        let (from_rank, to_rank) = (ranks[from], ranks[to]);
        let mut prev = from;
        for rank in (from_rank + 1)..to_rank {
            let dummy = graph.add_node();
            ranks.push(rank);
            graph.add_edge(prev, dummy);
            prev = dummy;
        }
        graph.add_edge(prev, to);
    }
    graph
}

/// Group nodes by rank, in index order
fn build_layers(ranks: &[usize]) -> Vec<Vec<usize>> {
    let layer_count = ranks.iter().max().map_or(0, |&max| max + 1);
    let mut layers = vec![Vec::new(); layer_count];
    for (node, &rank) in ranks.iter().enumerate() {
        layers[rank].push(node);
    }
    layers
}

/// Centre coordinate of every node along the order axis
fn assign_order_coordinates(
    graph: &Adjacency,
    layers: &[Vec<usize>],
    real_count: usize,
    extent: f64,
    node_sep: f64,
) -> Vec<f64> {
    // Virtual nodes take no room of their own
    let footprint = |node: usize| if node < real_count { extent } else { 0.0 };
    let gap = |a: usize, b: usize| (footprint(a) + footprint(b)) / 2.0 + node_sep;

    let mut pos = vec![0.0f64; graph.len()];
    for layer in layers {
        for pair in layer.windows(2) {
            pos[pair[1]] = pos[pair[0]] + gap(pair[0], pair[1]);
        }
        if let (Some(&first), Some(&last)) = (layer.first(), layer.last()) {
            let mid = (pos[first] + pos[last]) / 2.0;
            for &node in layer {
                pos[node] -= mid;
            }
        }
    }

    for pass in 0..COORDINATE_PASSES {
        let downward = pass % 2 == 0;
        let layer_indices: Vec<usize> = if downward {
            (1..layers.len()).collect()
        } else {
            (0..layers.len().saturating_sub(1)).rev().collect()
        };

        for layer_idx in layer_indices {
            let layer = &layers[layer_idx];
            if layer.is_empty() {
                continue;
            }

            let desired: Vec<f64> = layer
                .iter()
                .map(|&node| {
                    let neighbours = if downward {
                        graph.predecessors(node)
                    } else {
                        graph.successors(node)
                    };
                    if neighbours.is_empty() {
                        pos[node]
                    } else {
                        neighbours.iter().map(|&n| pos[n]).sum::<f64>() / neighbours.len() as f64
                    }
                })
                .collect();

            let mut placed: Vec<f64> = Vec::with_capacity(layer.len());
            for (i, &node) in layer.iter().enumerate() {
                let mut p = desired[i];
                if i > 0 {
                    p = p.max(placed[i - 1] + gap(layer[i - 1], node));
                }
                placed.push(p);
            }

            let shift = desired
                .iter()
                .zip(&placed)
                .map(|(d, p)| d - p)
                .sum::<f64>()
                / layer.len() as f64;
            for (&node, p) in layer.iter().zip(&placed) {
                pos[node] = p + shift;
            }
        }
    }

    pos
}

impl LayoutEngine for LayeredLayout {
    fn layout(
        &self,
        nodes: &[NodeData],
        edges: &[EdgeData],
        direction: Direction,
    ) -> Result<Vec<NodeData>> {
        let layout_span = span!(
            Level::INFO,
            "layout_graph",
            node_count = nodes.len(),
            edge_count = edges.len(),
            direction = %direction
        );
        let _enter = layout_span.enter();

        trace!("Starting layered layout");

        let validate_span = span!(Level::DEBUG, "validate_input");
        let _validate_enter = validate_span.enter();
        let pairs = index_edges(nodes, edges)?;
        if nodes.is_empty() {
            debug!("Empty graph, returning empty layout");
            return Ok(Vec::new());
        }
        debug!(usable_edges = pairs.len(), "Validated input");
        drop(_validate_enter);

        let cycle_span = span!(Level::DEBUG, "break_cycles");
        let _cycle_enter = cycle_span.enter();
        let acyclic = break_cycles(nodes.len(), &pairs);
        let reversed = acyclic.iter().zip(&pairs).filter(|(a, p)| a != p).count();
        debug!(reversed, "Broke cycles");
        drop(_cycle_enter);

        let rank_span = span!(Level::DEBUG, "assign_ranks");
        let _rank_enter = rank_span.enter();
        let mut ranks = longest_path_ranks(nodes.len(), &acyclic);
        debug!(
            max_rank = ranks.iter().max().copied().unwrap_or(0),
            "Assigned ranks"
        );
        drop(_rank_enter);

        let normalize_span = span!(Level::DEBUG, "normalize_edges");
        let _normalize_enter = normalize_span.enter();
        let graph = normalize(nodes.len(), &acyclic, &mut ranks);
        debug!(
            virtual_nodes = graph.len() - nodes.len(),
            "Split long edges"
        );
        drop(_normalize_enter);

        let order_span = span!(Level::DEBUG, "order_layers");
        let _order_enter = order_span.enter();
        let mut layers = build_layers(&ranks);
        let crossings =
            minimize_crossings(&graph, &mut layers, self.config.order_iterations);
        debug!(layer_count = layers.len(), crossings, "Ordered layers");
        drop(_order_enter);

        let position_span = span!(Level::DEBUG, "assign_coordinates", direction = ?direction);
        let _position_enter = position_span.enter();
        let (order_extent, rank_extent) = self.extents(direction);
        let order_pos = assign_order_coordinates(
            &graph,
            &layers,
            nodes.len(),
            order_extent,
            self.config.node_sep,
        );

        // Shift so the leftmost (topmost in LR) footprint starts at zero
        let min_edge = order_pos[..nodes.len()]
            .iter()
            .map(|p| p - order_extent / 2.0)
            .fold(f64::INFINITY, f64::min);

        let placed: Vec<NodeData> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let along_order = order_pos[i] - order_extent / 2.0 - min_edge;
                let along_rank = ranks[i] as f64 * (rank_extent + self.config.rank_sep);
                let position = if direction.is_vertical() {
                    Position::new(along_order, along_rank)
                } else {
                    Position::new(along_rank, along_order)
                };
                let mut node = node.clone();
                node.position = position;
                node
            })
            .collect();
        debug!(positioned = placed.len(), "Assigned coordinates");
        drop(_position_enter);

        info!(
            node_count = placed.len(),
            layer_count = layers.len(),
            crossings,
            "Layout completed"
        );

        Ok(placed)
    }

    fn name(&self) -> &'static str {
        "layered"
    }
}

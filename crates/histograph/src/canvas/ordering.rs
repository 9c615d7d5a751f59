//! Crossing reduction for the layered layout
//!
//! Nodes are dense indices here, real nodes first and the virtual nodes of
//! split edges after them, so both kinds are ordered together.

use std::cmp::Ordering;

/// Directed graph over dense node indices
///
/// Neighbour lists keep insertion order, so every traversal is
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    out: Vec<Vec<usize>>,
    inc: Vec<Vec<usize>>,
}

impl Adjacency {
    /// Graph of `count` nodes and no edges
    pub fn new(count: usize) -> Self {
        Self {
            out: vec![Vec::new(); count],
            inc: vec![Vec::new(); count],
        }
    }

    /// Append a node, returning its index
    pub fn add_node(&mut self) -> usize {
        self.out.push(Vec::new());
        self.inc.push(Vec::new());
        self.out.len() - 1
    }

    pub fn add_edge(&mut self, from: usize, to: usize) {
        self.out[from].push(to);
        self.inc[to].push(from);
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn successors(&self, node: usize) -> &[usize] {
        &self.out[node]
    }

    pub fn predecessors(&self, node: usize) -> &[usize] {
        &self.inc[node]
    }
}

/// Which neighbouring layer a sweep pulls nodes towards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    /// Towards the layer above, through predecessors
    Down,
    /// Towards the layer below, through successors
    Up,
}

impl Sweep {
    fn neighbours(self, graph: &Adjacency, node: usize) -> &[usize] {
        match self {
            Sweep::Down => graph.predecessors(node),
            Sweep::Up => graph.successors(node),
        }
    }

    /// `(layer, reference layer)` pairs in visiting order
    fn steps(self, layer_count: usize) -> Vec<(usize, usize)> {
        match self {
            Sweep::Down => (1..layer_count).map(|i| (i, i - 1)).collect(),
            Sweep::Up => (0..layer_count.saturating_sub(1))
                .rev()
                .map(|i| (i, i + 1))
                .collect(),
        }
    }
}

/// Slot of every node of `layer`, indexed by node
fn slots(layer: &[usize], count: usize) -> Vec<Option<usize>> {
    let mut slot = vec![None; count];
    for (i, &node) in layer.iter().enumerate() {
        slot[node] = Some(i);
    }
    slot
}

/// Total crossings over every pair of adjacent layers
pub fn crossings(layers: &[Vec<usize>], graph: &Adjacency) -> usize {
    layers
        .windows(2)
        .map(|pair| crossings_between(&pair[0], &pair[1], graph))
        .sum()
}

/// Crossings between `upper` and the layer right below it
///
/// Edges are listed by upper slot then lower slot; two edges cross exactly
/// when their lower slots are out of order in that listing.
fn crossings_between(upper: &[usize], lower: &[usize], graph: &Adjacency) -> usize {
    let lower_slot = slots(lower, graph.len());
    let mut segments: Vec<(usize, usize)> = upper
        .iter()
        .enumerate()
        .flat_map(|(top, &node)| {
            graph
                .successors(node)
                .iter()
                .filter_map(|&succ| lower_slot[succ])
                .map(move |bottom| (top, bottom))
                .collect::<Vec<_>>()
        })
        .collect();
    segments.sort_unstable();

    let mut count = 0;
    for (i, &(top_i, bottom_i)) in segments.iter().enumerate() {
        count += segments[i + 1..]
            .iter()
            .filter(|&&(top_j, bottom_j)| top_j > top_i && bottom_j < bottom_i)
            .count();
    }
    count
}

/// Mean slot of `node`'s neighbours in the reference layer
///
/// `None` when it has no neighbour there.
pub fn barycenter(
    node: usize,
    reference: &[Option<usize>],
    graph: &Adjacency,
    sweep: Sweep,
) -> Option<f64> {
    let (sum, n) = sweep
        .neighbours(graph, node)
        .iter()
        .filter_map(|&other| reference[other])
        .fold((0usize, 0usize), |(sum, n), slot| (sum + slot, n + 1));
    (n > 0).then(|| sum as f64 / n as f64)
}

/// Stable sort of `layer` by weight; unweighted nodes sink to the end
pub fn reorder(layer: &mut Vec<usize>, weights: &[Option<f64>]) {
    let mut keyed: Vec<(usize, Option<f64>)> = layer
        .iter()
        .enumerate()
        .map(|(i, &node)| (node, weights.get(i).copied().flatten()))
        .collect();
    keyed.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    *layer = keyed.into_iter().map(|(node, _)| node).collect();
}

/// Reorder every layer to reduce crossings, returning the final count
///
/// Sweeps alternate down and up for at most `iterations` rounds. The best
/// ordering seen wins, so the result is never worse than the input.
pub fn minimize_crossings(
    graph: &Adjacency,
    layers: &mut Vec<Vec<usize>>,
    iterations: usize,
) -> usize {
    if layers.len() < 2 {
        return 0;
    }

    let mut best = (crossings(layers, graph), layers.clone());
    for round in 0..iterations {
        if best.0 == 0 {
            break;
        }
        let sweep = if round % 2 == 0 { Sweep::Down } else { Sweep::Up };
        for (current, reference) in sweep.steps(layers.len()) {
            let reference = slots(&layers[reference], graph.len());
            let weights: Vec<Option<f64>> = layers[current]
                .iter()
                .map(|&node| barycenter(node, &reference, graph, sweep))
                .collect();
            reorder(&mut layers[current], &weights);
        }

        let count = crossings(layers, graph);
        if count < best.0 {
            best = (count, layers.clone());
        }
    }

    *layers = best.1;
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjacency(count: usize, edges: &[(usize, usize)]) -> Adjacency {
        let mut graph = Adjacency::new(count);
        for &(from, to) in edges {
            graph.add_edge(from, to);
        }
        graph
    }

    #[test]
    fn test_parallel_edges_do_not_cross() {
        let graph = adjacency(4, &[(0, 2), (1, 3)]);
        assert_eq!(crossings(&[vec![0, 1], vec![2, 3]], &graph), 0);
        assert_eq!(crossings(&[], &graph), 0);
    }

    #[test]
    fn test_swapped_targets_cross_once_per_pair() {
        let graph = adjacency(6, &[(0, 3), (1, 2), (2, 5), (3, 4)]);
        assert_eq!(crossings(&[vec![0, 1], vec![2, 3]], &graph), 1);
        assert_eq!(crossings(&[vec![0, 1], vec![2, 3], vec![4, 5]], &graph), 2);
    }

    #[test]
    fn test_shared_endpoint_is_not_a_crossing() {
        // Fan out of one node, fan in to another
        let graph = adjacency(5, &[(0, 2), (0, 3), (1, 3), (1, 4)]);
        assert_eq!(crossings(&[vec![0, 1], vec![2, 3, 4]], &graph), 0);
    }

    #[test]
    fn test_barycenter_averages_reference_slots() {
        let graph = adjacency(5, &[(0, 3), (2, 3), (1, 4)]);
        let upper = slots(&[0, 1, 2], graph.len());
        assert_eq!(barycenter(3, &upper, &graph, Sweep::Down), Some(1.0));
        assert_eq!(barycenter(4, &upper, &graph, Sweep::Down), Some(1.0));
        assert_eq!(barycenter(0, &upper, &graph, Sweep::Down), None);

        let lower = slots(&[4, 3], graph.len());
        assert_eq!(barycenter(0, &lower, &graph, Sweep::Up), Some(1.0));
        assert_eq!(barycenter(1, &lower, &graph, Sweep::Up), Some(0.0));
    }

    #[test]
    fn test_reorder_is_stable_and_sinks_unweighted() {
        let mut layer = vec![10, 11, 12, 13, 14];
        reorder(&mut layer, &[Some(1.0), None, Some(0.5), Some(1.0), None]);
        assert_eq!(layer, vec![12, 10, 13, 11, 14]);

        let mut empty: Vec<usize> = Vec::new();
        reorder(&mut empty, &[]);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_sweep_steps() {
        assert_eq!(Sweep::Down.steps(3), vec![(1, 0), (2, 1)]);
        assert_eq!(Sweep::Up.steps(3), vec![(1, 2), (0, 1)]);
        assert!(Sweep::Up.steps(0).is_empty());
    }

    #[test]
    fn test_minimize_untangles_two_layers() {
        let graph = adjacency(4, &[(0, 2), (1, 3)]);
        let mut layers = vec![vec![0, 1], vec![3, 2]];
        assert_eq!(minimize_crossings(&graph, &mut layers, 4), 0);
        assert_eq!(layers, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_minimize_diamond() {
        // 0 -> {1, 2} -> 3
        let graph = adjacency(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let mut layers = vec![vec![0], vec![2, 1], vec![3]];
        assert_eq!(minimize_crossings(&graph, &mut layers, 4), 0);
    }

    #[test]
    fn test_minimize_never_worsens() {
        let graph = adjacency(4, &[(0, 2), (0, 3), (1, 2), (1, 3)]);
        let mut layers = vec![vec![0, 1], vec![3, 2]];
        let before = crossings(&layers, &graph);
        assert!(minimize_crossings(&graph, &mut layers, 8) <= before);

        let mut single = vec![vec![0, 1]];
        assert_eq!(minimize_crossings(&graph, &mut single, 8), 0);
    }

    #[test]
    fn test_minimize_is_repeatable() {
        let graph = adjacency(6, &[(0, 4), (1, 3), (2, 5), (0, 5)]);
        let start = vec![vec![0, 1, 2], vec![3, 4, 5]];
        let (mut first, mut second) = (start.clone(), start);
        let a = minimize_crossings(&graph, &mut first, 6);
        let b = minimize_crossings(&graph, &mut second, 6);
        assert_eq!(a, b);
        assert_eq!(first, second);
    }
}

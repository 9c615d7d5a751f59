//! Property tests for the layered layout

use histograph::canvas::{assign_ranks, LayeredLayout, LayoutConfig};
use histograph::core::{Direction, EdgeData, LayoutEngine, NodeData, NodeKind, RelationshipKind};
use proptest::prelude::*;

const EPS: f64 = 1e-6;

fn build_graph(count: usize, pairs: &[(usize, usize)]) -> (Vec<NodeData>, Vec<EdgeData>) {
    let nodes = (0..count)
        .map(|i| NodeData::new(format!("n{}", i), NodeKind::Other, format!("Node {}", i)))
        .collect();
    let edges = pairs
        .iter()
        .enumerate()
        .map(|(i, &(s, t))| {
            EdgeData::new(
                format!("e{}", i),
                format!("n{}", s),
                format!("n{}", t),
                RelationshipKind::Influences,
            )
        })
        .collect();
    (nodes, edges)
}

/// Arbitrary graphs, cycles and self-loops included
fn any_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..14).prop_flat_map(|count| {
        (
            Just(count),
            prop::collection::vec((0..count, 0..count), 0..24),
        )
    })
}

/// Graphs whose edges all point from a lower to a higher index
fn dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    any_graph().prop_map(|(count, pairs)| {
        let forward = pairs
            .into_iter()
            .filter(|(s, t)| s != t)
            .map(|(s, t)| (s.min(t), s.max(t)))
            .collect();
        (count, forward)
    })
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::TopToBottom), Just(Direction::LeftToRight)]
}

proptest! {
    #[test]
    fn layout_is_deterministic((count, pairs) in any_graph(), dir in direction()) {
        let (nodes, edges) = build_graph(count, &pairs);
        let layout = LayeredLayout::new();
        let first = layout.layout(&nodes, &edges, dir).unwrap();
        let second = layout.layout(&nodes, &edges, dir).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn layout_keeps_every_node((count, pairs) in any_graph(), dir in direction()) {
        let (nodes, edges) = build_graph(count, &pairs);
        let placed = LayeredLayout::new().layout(&nodes, &edges, dir).unwrap();

        prop_assert_eq!(placed.len(), nodes.len());
        for (before, after) in nodes.iter().zip(&placed) {
            prop_assert_eq!(&before.id, &after.id);
            prop_assert_eq!(&before.label, &after.label);
            prop_assert!(after.position.is_finite());
        }
    }

    #[test]
    fn same_rank_nodes_do_not_overlap((count, pairs) in any_graph()) {
        let (nodes, edges) = build_graph(count, &pairs);
        let config = LayoutConfig::default();
        let placed = LayeredLayout::new()
            .layout(&nodes, &edges, Direction::TopToBottom)
            .unwrap();

        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                if (a.position.y - b.position.y).abs() < EPS {
                    let gap = (a.position.x - b.position.x).abs();
                    prop_assert!(
                        gap + EPS >= config.node_width + config.node_sep,
                        "{} and {} overlap: gap {}", a.id, b.id, gap
                    );
                }
            }
        }
    }

    #[test]
    fn layout_starts_at_origin((count, pairs) in any_graph()) {
        let (nodes, edges) = build_graph(count, &pairs);
        let placed = LayeredLayout::new()
            .layout(&nodes, &edges, Direction::TopToBottom)
            .unwrap();

        let min_x = placed.iter().map(|n| n.position.x).fold(f64::INFINITY, f64::min);
        let min_y = placed.iter().map(|n| n.position.y).fold(f64::INFINITY, f64::min);
        prop_assert!(min_x.abs() < EPS);
        prop_assert!(min_y.abs() < EPS);
    }

    #[test]
    fn dag_edges_point_down((count, pairs) in dag()) {
        let (nodes, edges) = build_graph(count, &pairs);
        let placed = LayeredLayout::new()
            .layout(&nodes, &edges, Direction::TopToBottom)
            .unwrap();

        for &(s, t) in &pairs {
            prop_assert!(placed[s].position.y < placed[t].position.y);
        }
    }

    #[test]
    fn dag_edges_point_right((count, pairs) in dag()) {
        let (nodes, edges) = build_graph(count, &pairs);
        let placed = LayeredLayout::new()
            .layout(&nodes, &edges, Direction::LeftToRight)
            .unwrap();

        for &(s, t) in &pairs {
            prop_assert!(placed[s].position.x < placed[t].position.x);
        }
    }

    #[test]
    fn ranks_match_layout_rows((count, pairs) in any_graph()) {
        let (nodes, edges) = build_graph(count, &pairs);
        let config = LayoutConfig::default();
        let ranks = assign_ranks(&nodes, &edges).unwrap();
        let placed = LayeredLayout::new()
            .layout(&nodes, &edges, Direction::TopToBottom)
            .unwrap();

        for (rank, node) in ranks.iter().zip(&placed) {
            let expected = *rank as f64 * (config.node_height + config.rank_sep);
            prop_assert!((node.position.y - expected).abs() < EPS);
        }
    }
}

#[test]
fn test_rank_zero_always_present() {
    let (nodes, edges) = build_graph(3, &[(0, 1), (1, 2), (2, 0)]);
    let ranks = assign_ranks(&nodes, &edges).unwrap();
    assert!(ranks.contains(&0));
}

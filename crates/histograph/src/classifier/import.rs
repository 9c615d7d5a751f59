//! Turning a classification into model nodes and edges

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use super::payload::Classification;
use crate::core::{EdgeData, GraphStore, NodeData, NodeKind, RelationshipKind};

/// What an import did, and what it skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub nodes_added: usize,
    /// Entities that matched the label of a node already present
    pub nodes_reused: usize,
    pub edges_added: usize,
    /// Relationships naming an entity that is not in the graph
    pub skipped_unresolved: usize,
    pub skipped_self_loops: usize,
    /// Relationships between a pair that already has an edge
    pub skipped_duplicates: usize,
}

/// Nodes and edges to add, in order, plus the summary
#[derive(Debug, Clone, Default)]
pub struct ImportPlan {
    pub nodes: Vec<NodeData>,
    pub edges: Vec<EdgeData>,
    pub summary: ImportSummary,
}

/// Work out which nodes and edges a classification adds to `store`
///
/// Entities become `other` nodes with `entity-<n>` ids unless a node with the
/// same label exists. Relationships are resolved by label and become
/// `e<source>-<target>` edges. The store is not modified.
pub fn plan_import<S: GraphStore>(store: &S, classification: &Classification) -> ImportPlan {
    let mut plan = ImportPlan::default();

    let mut by_label: HashMap<String, String> = HashMap::new();
    let mut taken_ids: HashSet<String> = HashSet::new();
    for node in store.nodes() {
        by_label
            .entry(node.label.clone())
            .or_insert_with(|| node.id.clone());
        taken_ids.insert(node.id.clone());
    }

    let mut counter = 0usize;
    for entity in &classification.entities {
        let label = entity.trim();
        if label.is_empty() {
            trace!("Skipping blank entity");
            continue;
        }
        if by_label.contains_key(label) {
            plan.summary.nodes_reused += 1;
            continue;
        }

        let id = loop {
            counter += 1;
            let candidate = format!("entity-{}", counter);
            if !taken_ids.contains(&candidate) {
                break candidate;
            }
        };
        taken_ids.insert(id.clone());
        by_label.insert(label.to_string(), id.clone());
        plan.nodes.push(NodeData::new(id, NodeKind::Other, label));
        plan.summary.nodes_added += 1;
    }

    let mut taken_pairs: HashSet<(String, String)> = store
        .edges()
        .map(|e| (e.source.clone(), e.target.clone()))
        .collect();
    let mut taken_edges: HashSet<String> = store.edges().map(|e| e.id.clone()).collect();
    for relationship in &classification.relationships {
        let source = by_label.get(relationship.source.trim());
        let target = by_label.get(relationship.target.trim());
        let (Some(source), Some(target)) = (source, target) else {
            trace!(
                source = %relationship.source,
                target = %relationship.target,
                "Skipping unresolved relationship"
            );
            plan.summary.skipped_unresolved += 1;
            continue;
        };
        if source == target {
            plan.summary.skipped_self_loops += 1;
            continue;
        }

        if !taken_pairs.insert((source.clone(), target.clone())) {
            plan.summary.skipped_duplicates += 1;
            continue;
        }

        let mut edge = EdgeData::between(
            source.clone(),
            target.clone(),
            RelationshipKind::from(relationship.kind.clone()),
        )
        .with_label(relationship.kind.clone());
        if taken_edges.contains(&edge.id) {
            let base = edge.id.clone();
            edge.id = (2usize..)
                .map(|n| format!("{}-{}", base, n))
                .find(|id| !taken_edges.contains(id))
                .unwrap_or(base);
        }
        taken_edges.insert(edge.id.clone());
        plan.edges.push(edge);
        plan.summary.edges_added += 1;
    }

    debug!(
        nodes_added = plan.summary.nodes_added,
        nodes_reused = plan.summary.nodes_reused,
        edges_added = plan.summary.edges_added,
        skipped_unresolved = plan.summary.skipped_unresolved,
        "Planned import"
    );
    plan
}

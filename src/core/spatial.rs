//! Spatial-Index (KD-Tree) über den Knotenpositionen eines Graphen.

use kiddo::{KdTree, SquaredEuclidean};

use crate::core::{Graph, NodeId};
use crate::shared::Vector;

/// Ergebnis einer Distanzabfrage gegen den Spatial-Index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMatch {
    /// Gefundener Knoten
    pub node: NodeId,
    /// Euklidische Distanz zum Suchpunkt
    pub distance: f64,
}

/// Read-only Spatial-Index; nach Graph-Mutationen neu aufbauen.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
    node_ids: Vec<NodeId>,
}

impl SpatialIndex {
    /// Erstellt einen leeren Spatial-Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 2]>::new()).into(),
            node_ids: Vec::new(),
        }
    }

    /// Baut einen neuen Index aus allen Knoten des Graphen.
    pub fn from_graph(graph: &Graph) -> Self {
        let (node_ids, entries): (Vec<NodeId>, Vec<[f64; 2]>) = graph
            .nodes()
            .map(|(id, node)| (id, [node.pose.pos.x, node.pose.pos.y]))
            .unzip();

        Self {
            tree: (&entries).into(),
            node_ids,
        }
    }

    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    /// Findet den nächsten Knoten zur gegebenen Position.
    pub fn nearest(&self, query: Vector) -> Option<SpatialMatch> {
        if self.is_empty() {
            return None;
        }

        let result = self.tree.nearest_one::<SquaredEuclidean>(&[query.x, query.y]);
        let node = *self.node_ids.get(result.item as usize)?;

        Some(SpatialMatch {
            node,
            distance: result.distance.sqrt(),
        })
    }

    /// Alle Knoten innerhalb eines Radius, nach Distanz sortiert.
    pub fn within_radius(&self, query: Vector, radius: f64) -> Vec<SpatialMatch> {
        if self.is_empty() || radius.is_sign_negative() {
            return Vec::new();
        }

        let mut results = self
            .tree
            .within::<SquaredEuclidean>(&[query.x, query.y], radius * radius)
            .into_iter()
            .filter_map(|entry| {
                let node = *self.node_ids.get(entry.item as usize)?;
                Some(SpatialMatch {
                    node,
                    distance: entry.distance.sqrt(),
                })
            })
            .collect::<Vec<_>>();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results
    }
}

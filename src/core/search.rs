//! Kürzeste Wege über die Kantenenden des Graphen.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use crate::core::edge::End;
use crate::core::graph::Graph;
use crate::core::ids::NodeId;
use crate::core::path::Path;

/// Startpunkt einer Wegsuche.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStart {
    /// Alle Enden am Knoten, Spitze zuerst
    Node(NodeId),
    /// Genau dieses Ende
    End(End),
}

impl From<NodeId> for PathStart {
    fn from(node: NodeId) -> Self {
        PathStart::Node(node)
    }
}

impl From<End> for PathStart {
    fn from(end: End) -> Self {
        PathStart::End(end)
    }
}

/// Kumulierte Weglänge mit Totalordnung für den Heap.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Length(f64);

impl Eq for Length {}

impl PartialOrd for Length {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Length {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Sucht den kürzesten befahrbaren Weg zu `end_node`.
///
/// Weichen werden nur von der Spitze aus verzweigt. Bei gleicher Länge
/// gewinnt das früher eingereihte Ende. Ist das Ziel nicht erreichbar, ist
/// der Weg leer.
pub fn find_shortest_path(graph: &Graph, start: impl Into<PathStart>, end_node: NodeId) -> Path {
    let start_ends = match start.into() {
        PathStart::Node(node) => graph.node_ends(node),
        PathStart::End(end) => vec![end],
    };

    let mut heap: BinaryHeap<Reverse<(Length, u64, End)>> = BinaryHeap::new();
    let mut predecessors: HashMap<End, Option<End>> = HashMap::new();
    let mut seq = 0u64;

    for end in start_ends {
        heap.push(Reverse((Length(graph.edge_length(end.edge)), seq, end)));
        predecessors.insert(end, None);
        seq += 1;
    }

    let mut reached = None;
    while let Some(Reverse((Length(s), _, current))) = heap.pop() {
        let other = current.other_end();
        if graph.end_node(other) == end_node {
            reached = Some(current);
            break;
        }
        // Enden ohne Rückverweis am Knoten haben keine Fortsetzung
        let Ok(next_ends) = graph.connected_ends(other) else {
            continue;
        };
        for next in next_ends {
            if predecessors.contains_key(&next) {
                continue;
            }
            predecessors.insert(next, Some(current));
            heap.push(Reverse((Length(s + graph.edge_length(next.edge)), seq, next)));
            seq += 1;
        }
    }

    let Some(mut current) = reached else {
        log::debug!("Knoten {} ist nicht erreichbar", end_node);
        return Path::default();
    };

    let mut ends = vec![current];
    while let Some(Some(previous)) = predecessors.get(&current) {
        ends.push(*previous);
        current = *previous;
    }
    ends.reverse();
    Path::new(ends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segment::EdgeSegment;
    use crate::shared::{Pose, Vector};
    use approx::assert_abs_diff_eq;

    #[test]
    fn single_edge_route_is_found() {
        let mut graph = Graph::new();
        let start = graph.add_node(Pose::at(Vector::new(1000.0, 0.0)));
        let end = graph.add_edge_at_node(start, 1200.0, 0.0, false);

        let path = find_shortest_path(&graph, start, graph.end_node(end));

        assert_eq!(path.ends, vec![end.other_end()]);
        assert_abs_diff_eq!(path.length(&graph), 1200.0, epsilon = 1e-9);
        assert_eq!(path.start_offset, 0.0);
        assert_eq!(path.end_offset, 0.0);
    }

    #[test]
    fn shorter_of_two_parallel_edges_wins() {
        let mut graph = Graph::new();
        let a = graph.add_node(Pose::at(Vector::ZERO));
        let b = graph.add_node(Pose::at(Vector::new(100.0, 0.0)));
        let long = EdgeSegment::straight(Pose::at(Vector::ZERO), 200.0);
        let short = EdgeSegment::straight(Pose::at(Vector::ZERO), 100.0);
        graph.insert_edge(a, b, vec![long]);
        let short_edge = graph.insert_edge(a, b, vec![short]);

        let path = find_shortest_path(&graph, End::source(short_edge), b);
        assert_eq!(path.ends, vec![End::source(short_edge)]);

        let from_node = find_shortest_path(&graph, a, b);
        assert_eq!(from_node.ends, vec![End::source(short_edge)]);
    }

    #[test]
    fn reverse_search_starts_from_end() {
        let mut graph = Graph::new();
        let start = graph.add_node(Pose::at(Vector::ZERO));
        let first = graph.add_edge_at_node(start, 300.0, 0.0, false);
        let second = graph
            .add_edge_at_end(first, 600.0, 0.0, false)
            .expect("zweite Kante");

        let path = find_shortest_path(&graph, second, start);

        assert_eq!(path.ends, vec![second, first]);
    }

    #[test]
    fn unreachable_target_gives_empty_path() {
        let mut graph = Graph::new();
        let start = graph.add_node(Pose::at(Vector::ZERO));
        graph.add_edge_at_node(start, 100.0, 0.0, false);
        let island = graph.add_node(Pose::at(Vector::new(500.0, 500.0)));

        let path = find_shortest_path(&graph, start, island);

        assert!(path.is_empty());
    }
}

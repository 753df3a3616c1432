//! Routen-Erstellung: Knoten anlegen und Gleise an Knoten oder Kantenenden anhängen.

use super::Graph;
use crate::core::edge::{EdgeSide, End};
use crate::core::ids::NodeId;
use crate::core::node::Node;
use crate::core::segment::EdgeSegment;
use crate::error::RouteResult;
use crate::shared::Pose;

impl Graph {
    /// Legt einen freien Knoten an
    pub fn add_node(&mut self, pose: Pose) -> NodeId {
        self.insert_node(Node::new(pose, 0.0))
    }

    /// Legt einen Knoten mit Bezeichnung an
    pub fn add_labeled_node(&mut self, pose: Pose, label: impl Into<String>) -> NodeId {
        let mut node = Node::new(pose, 0.0);
        node.label = Some(label.into());
        self.insert_node(node)
    }

    /// Hängt an einen Knoten eine neue Kante mit genau einem Segment.
    ///
    /// - `length < 0`: die Kante führt in den Knoten hinein
    /// - `backward`: entgegen der Knotenrichtung bauen
    ///
    /// Liefert das vom Knoten entfernte Ende der neuen Kante.
    pub fn add_edge_at_node(
        &mut self,
        node: NodeId,
        length: f64,
        radius: f64,
        backward: bool,
    ) -> End {
        let (pose, s) = (self[node].pose, self[node].s);
        let start = if (length < 0.0) ^ backward {
            pose.reverse()
        } else {
            pose
        };
        let segment = EdgeSegment::new(start, length.abs(), radius);
        let target = self.insert_node(Node::new(segment.end().reverse(), s + length));
        let edge = self.insert_edge(node, target, vec![segment]);

        if length >= 0.0 {
            End::target(edge)
        } else {
            self.flip_edge(edge);
            End::source(edge)
        }
    }

    /// Baut vom Kantenende `end` aus weiter.
    ///
    /// Ist `extend_edge` gesetzt, die Länge nicht negativ und der Knoten ein
    /// Gleisende, wird die bestehende Kante um ein Segment verlängert. Sonst
    /// entsteht eine neue Kante am Knoten; gibt es dort schon eine Fortsetzung,
    /// wird der Knoten zur Weiche mit der Spitze zum Ende hin.
    ///
    /// Das gelieferte Ende liegt immer am vom Ausgangspunkt entfernten Knoten.
    pub fn add_edge_at_end(
        &mut self,
        end: End,
        length: f64,
        radius: f64,
        extend_edge: bool,
    ) -> RouteResult<End> {
        if length == 0.0 {
            return Ok(end);
        }

        let node = self.end_node(end);
        if extend_edge && length >= 0.0 && self[node].degree() == 1 {
            let mut segment = EdgeSegment::new(self.end_pose(end).reverse(), length, radius);
            let end_pose = segment.end();
            match end.side {
                EdgeSide::Target => {
                    self[end.edge].segments.push(segment);
                    self[node].s += length;
                }
                EdgeSide::Source => {
                    segment.flip();
                    self[end.edge].segments.insert(0, segment);
                    self[node].s -= length;
                }
            }
            self[node].pose = end_pose;
            return Ok(end);
        }

        let forms_switch = !self.connected_ends(end)?.is_empty();
        let next = if forms_switch {
            // Spitze zeigt zu uns
            self[node].pose = self.end_pose(end);
            self.add_edge_at_node(node, length, radius, true)
        } else {
            self[node].pose = self.end_pose(end).reverse();
            self.add_edge_at_node(node, length, radius, false)
        };

        if end.side == EdgeSide::Source {
            self.flip_edge(next.edge);
            return Ok(End::source(next.edge));
        }
        Ok(next)
    }
}

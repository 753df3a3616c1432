//! Topologie-Operationen: Knotenrichtungen, Kontraktion, Orientierung, Prüfung.

use std::collections::HashSet;
use std::f64::consts::{FRAC_PI_2, PI};

use indexmap::IndexMap;

use super::Graph;
use crate::core::edge::{EdgeSide, End};
use crate::core::ids::{EdgeId, NodeId};
use crate::core::node::Node;
use crate::core::scenery::SceneryOwner;
use crate::core::segment::EdgeSegment;
use crate::error::{RouteError, RouteResult};
use crate::shared::options::{MAX_RADIUS, MIN_ANGLE};
use crate::shared::{angle_between, biarc_interpolation, Pose, VectorExt};

/// Mindestabstand der Weichenspitze zu allen anderen Richtungen.
const TIP_SEPARATION: f64 = 0.66 * PI;

/// Bei Kontraktion entferntes Element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractedItem {
    Node(NodeId),
    Edge(EdgeId),
}

/// Entferntes Element → überlebende Kante.
pub type ContractionMap = IndexMap<ContractedItem, EdgeId>;

/// Arbeitsschritt der iterativen Tiefensuche in `make_directed`.
enum Visit {
    /// Kante ab diesem Ende betreten
    Enter(End, bool),
    /// Nach allen Nachfolgern: Kante bei Bedarf umdrehen
    Orient(End, bool),
}

impl Graph {
    /// Alle Enden am Knoten, die Spitze (kleinster Winkel zur Knotenrichtung) zuerst.
    pub fn node_ends(&self, node: NodeId) -> Vec<End> {
        let n = &self[node];
        let direction = n.pose.direction;
        let mut keyed: Vec<(f64, End)> = n
            .incoming
            .iter()
            .map(|&edge| End::target(edge))
            .chain(n.outgoing.iter().map(|&edge| End::source(edge)))
            .map(|end| {
                let key = angle_between(direction, self.end_pose(end).direction).abs();
                (key, end)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        keyed.into_iter().map(|(_, end)| end).collect()
    }

    /// Von `end` aus befahrbare Enden am selben Knoten.
    ///
    /// Von der Spitze aus alle übrigen Enden, sonst nur die Spitze.
    pub fn connected_ends(&self, end: End) -> RouteResult<Vec<End>> {
        let node = self.end_node(end);
        let ends = self.node_ends(node);
        let Some(position) = ends.iter().position(|e| *e == end) else {
            return Err(RouteError::topology(format!(
                "Ende {:?} fehlt am Knoten {}",
                end, node
            )));
        };
        if position == 0 {
            Ok(ends[1..].to_vec())
        } else {
            Ok(ends[..1].to_vec())
        }
    }

    /// `true`, wenn `end` die Spitze einer Weiche ist
    pub fn is_tip(&self, end: End) -> bool {
        let ends = self.node_ends(self.end_node(end));
        ends.len() >= 3 && ends[0] == end
    }

    /// Richtungen aller inzidenten Kanten, eingehende zuerst
    pub fn directions(&self, node: NodeId) -> Vec<f64> {
        let n = &self[node];
        n.incoming
            .iter()
            .map(|&edge| self.edge_end(edge).direction)
            .chain(n.outgoing.iter().map(|&edge| self.edge_start(edge).direction))
            .collect()
    }

    /// Bestimmt die Knotenrichtung aus den inzidenten Kanten.
    ///
    /// Liefert `false`, wenn der Knoten eine Kreuzung ist und geteilt werden muss.
    /// Knoten ohne Kanten behalten ihre Richtung.
    pub fn calculate_direction(&mut self, node: NodeId) -> bool {
        let dirs = self.directions(node);
        let direction = match dirs.len() {
            0 => return true,
            1 => dirs[0],
            2 => {
                if angle_between(dirs[0], dirs[1]).abs() <= FRAC_PI_2 {
                    return false;
                }
                // auf halbem Weg durch die Kurve
                dirs[1] + angle_between(dirs[1], dirs[0] + PI) * 0.5
            }
            _ => {
                let tip = (0..dirs.len()).find(|&i| {
                    dirs.iter()
                        .enumerate()
                        .filter(|&(j, _)| j != i)
                        .all(|(_, other)| angle_between(dirs[i], *other).abs() > TIP_SEPARATION)
                });
                match tip {
                    Some(i) => dirs[i],
                    None => return false,
                }
            }
        };
        let pos = self[node].pose.pos;
        self[node].pose = Pose::new(pos, direction);
        true
    }

    /// Setzt alle Knotenrichtungen und teilt Kreuzungen und spitze Ecken.
    ///
    /// Liefert für jeden neuen Knoten den ursprünglichen Knoten.
    pub fn set_directions(&mut self) -> IndexMap<NodeId, NodeId> {
        let mut new_nodes: IndexMap<NodeId, NodeId> = IndexMap::new();
        let mut pending: Vec<NodeId> = self.node_ids().collect();
        let mut cursor = 0;

        while cursor < pending.len() {
            let node = pending[cursor];
            cursor += 1;
            while !self.calculate_direction(node) {
                let new_node = self.insert_node(Node::new(self[node].pose, 0.0));
                let origin = new_nodes.get(&node).copied().unwrap_or(node);
                new_nodes.insert(new_node, origin);

                let ends = self.node_ends(node);
                if self[node].degree() == 2 {
                    // spitze Ecke: ein Ende abtrennen
                    self.set_end_node(ends[0], new_node);
                    log::debug!("Knoten {} an spitzer Ecke geteilt", node);
                } else {
                    // Kreuzung: Spitze und das am weitesten gegenüberliegende Ende abtrennen
                    let first = self.end_pose(ends[0]).direction;
                    let separation =
                        |end: End| angle_between(first, self.end_pose(end).direction).abs();
                    let mut opposite = 1;
                    for i in 2..ends.len() {
                        if separation(ends[i]) > separation(ends[opposite]) {
                            opposite = i;
                        }
                    }
                    self.set_end_node(ends[0], new_node);
                    self.set_end_node(ends[opposite], new_node);
                    log::debug!("Kreuzung an Knoten {} geteilt", node);
                }
                pending.push(new_node);
            }
        }
        new_nodes
    }

    /// Entfernt alle Knoten vom Grad 2, indem die beiden Kanten verschmolzen werden.
    ///
    /// Selbstschleifen bleiben stehen. Die Abbildung zeigt auf die Kante, die
    /// nach der gesamten Kontraktion übrig ist.
    pub fn contract_edges(&mut self) -> ContractionMap {
        let mut removed = ContractionMap::new();
        let candidates: Vec<NodeId> = self.node_ids().collect();

        for node in candidates {
            if self.node(node).map_or(true, |n| n.degree() != 2) {
                continue;
            }
            let incident: Vec<EdgeId> = self[node]
                .incoming
                .iter()
                .chain(self[node].outgoing.iter())
                .copied()
                .collect();
            if incident[0] == incident[1] {
                log::debug!("Selbstschleife an Knoten {} bleibt erhalten", node);
                continue;
            }
            if self[node].incoming.len() == 2 {
                let second = self[node].incoming[1];
                self.flip_edge(second);
            }
            if self[node].outgoing.len() == 2 {
                let second = self[node].outgoing[1];
                self.flip_edge(second);
            }
            let e1 = self[node].incoming[0];
            let e2 = self[node].outgoing[0];

            let shift = self.edge_length(e1);
            let new_target = self[e2].target;
            self.set_target(e1, new_target);

            let moved = std::mem::take(&mut self[e2].scenery);
            for object_id in &moved {
                let object = &mut self[*object_id];
                object.owner = SceneryOwner::Edge(e1);
                object.pose.pos.x += shift;
            }
            self[e1].scenery.extend(moved);
            let segments = std::mem::take(&mut self[e2].segments);
            self[e1].segments.extend(segments);

            self.remove_edge(e2);
            self.nodes.shift_remove(&node);
            removed.insert(ContractedItem::Node(node), e1);
            removed.insert(ContractedItem::Edge(e2), e1);
            log::debug!("Knoten {} entfernt, Kante {} in {} aufgegangen", node, e2, e1);
        }

        // auf die endgültig überlebende Kante abbilden
        let snapshot = removed.clone();
        for survivor in removed.values_mut() {
            while let Some(next) = snapshot.get(&ContractedItem::Edge(*survivor)) {
                *survivor = *next;
            }
        }
        removed
    }

    /// Knoten vom Grad 1 (Gleisenden)
    pub fn end_nodes(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.degree() == 1)
            .map(|(id, _)| id)
            .collect()
    }

    /// Orientiert alle Kanten entlang befahrbarer Wege und setzt die Knotenwege `s`.
    ///
    /// Startet an jedem noch nicht besuchten Gleisende; Kanten und Knoten
    /// werden je einmal besucht.
    pub fn make_directed(&mut self) {
        let mut visited_edges: HashSet<EdgeId> = HashSet::new();
        let mut visited_nodes: HashSet<NodeId> = HashSet::new();
        let mut stack: Vec<Visit> = Vec::new();

        for root in self.end_nodes() {
            if !visited_nodes.insert(root) {
                continue;
            }
            self[root].s = 0.0;
            let first_end = self.node_ends(root)[0];
            stack.push(Visit::Enter(first_end, first_end.side == EdgeSide::Source));

            while let Some(visit) = stack.pop() {
                match visit {
                    Visit::Enter(from, forward) => {
                        let s = self[self.end_node(from)].s;
                        let end = from.other_end();
                        if !visited_edges.insert(end.edge) {
                            continue;
                        }
                        stack.push(Visit::Orient(end, forward));

                        let current = self.end_node(end);
                        if !visited_nodes.insert(current) {
                            continue;
                        }
                        let length = self.edge_length(end.edge);
                        self[current].s = if forward { s + length } else { s - length };

                        let ends = self.node_ends(current);
                        let mut children: Vec<Visit> = Vec::with_capacity(ends.len());
                        if ends[0] == end {
                            children.extend(ends[1..].iter().map(|&e| Visit::Enter(e, forward)));
                        } else {
                            children.push(Visit::Enter(ends[0], forward));
                            children.extend(
                                ends[1..]
                                    .iter()
                                    .filter(|&&e| e != end)
                                    .map(|&e| Visit::Enter(e, !forward)),
                            );
                        }
                        // umgekehrt auf den Stack, damit die Reihenfolge erhalten bleibt
                        stack.extend(children.into_iter().rev());
                    }
                    Visit::Orient(end, forward) => {
                        if (end.side == EdgeSide::Target) ^ forward {
                            self.flip_edge(end.edge);
                        }
                    }
                }
            }
        }
    }

    /// Prüft die Rückverweise zwischen Knoten und Kanten.
    pub fn check(&self) -> RouteResult<()> {
        for (id, edge) in self.edges() {
            let source = self.node(edge.source).ok_or_else(|| {
                RouteError::topology(format!("Kante {} ohne Quelle {}", id, edge.source))
            })?;
            if !source.outgoing.contains(&id) {
                return Err(RouteError::topology(format!(
                    "Kante {} fehlt in outgoing von {}",
                    id, edge.source
                )));
            }
            let target = self.node(edge.target).ok_or_else(|| {
                RouteError::topology(format!("Kante {} ohne Ziel {}", id, edge.target))
            })?;
            if !target.incoming.contains(&id) {
                return Err(RouteError::topology(format!(
                    "Kante {} fehlt in incoming von {}",
                    id, edge.target
                )));
            }
        }

        for (id, node) in self.nodes() {
            for edge in &node.incoming {
                if self.edge(*edge).map(|e| e.target) != Some(id) {
                    return Err(RouteError::topology(format!(
                        "Knoten {} ist nicht Ziel von {}",
                        id, edge
                    )));
                }
            }
            for edge in &node.outgoing {
                if self.edge(*edge).map(|e| e.source) != Some(id) {
                    return Err(RouteError::topology(format!(
                        "Knoten {} ist nicht Quelle von {}",
                        id, edge
                    )));
                }
            }
        }
        Ok(())
    }

    /// Erzeugt die Geometrie aller Kanten per Bi-Arc-Interpolation
    pub fn create_segments(&mut self) {
        let edges: Vec<EdgeId> = self.edge_ids().collect();
        for edge in edges {
            self.create_biarcs(edge);
        }
    }

    /// Ersetzt die Segmente einer Kante durch einen Bi-Arc zwischen den Knotenposen.
    ///
    /// Fast gerade Verbindungen und entartete Bögen werden zur Geraden.
    pub fn create_biarcs(&mut self, id: EdgeId) {
        let edge_start = self.edge_start(id);
        let edge_end = self.edge_end(id);

        let mut start = self[self[id].source].pose;
        if angle_between(start.direction, edge_start.direction).abs() > FRAC_PI_2 {
            start = start.reverse();
        }
        let mut end = self[self[id].target].pose;
        if angle_between(end.direction, edge_end.direction).abs() <= FRAC_PI_2 {
            end = end.reverse();
        }

        let t1 = start.heading();
        let t2 = end.heading();
        let t = edge_start.heading();
        let straight = vec![EdgeSegment::straight(
            edge_start,
            (end.pos - start.pos).length(),
        )];

        if t1.cross(t).abs() + t2.cross(t).abs() < 1e-4 {
            self[id].segments = straight;
            return;
        }

        let arc = biarc_interpolation(start.pos, t1, end.pos, t2);
        let degenerate = |r: f64, theta: f64| {
            theta.abs() < MIN_ANGLE || r > MAX_RADIUS || !r.is_finite()
        };
        if degenerate(arc.r1, arc.theta1) || degenerate(arc.r2, arc.theta2) {
            self[id].segments = straight;
            return;
        }

        let r1 = if arc.theta1 > 0.0 { -arc.r1 } else { arc.r1 };
        let first = EdgeSegment::new(start, (arc.theta1 * arc.r1).abs(), r1);
        let r2 = if arc.theta2 < 0.0 { -arc.r2 } else { arc.r2 };
        let second = EdgeSegment::new(first.end().reverse(), (arc.theta2 * arc.r2).abs(), r2);
        self[id].segments = vec![first, second];
    }
}

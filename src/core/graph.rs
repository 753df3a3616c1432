//! Der Gleisgraph: Arena für Knoten, Kanten und Szenerie-Objekte.
//!
//! Knoten und Kanten verweisen über stabile Handles aufeinander. Jede Kante
//! steht in der `outgoing`-Liste ihrer Quelle und der `incoming`-Liste ihres
//! Ziels; alle Mutationen laufen über den Graphen und halten das aufrecht.

mod authoring;
mod export;
mod topology;

use std::borrow::Cow;
use std::ops::{Index, IndexMut};

use indexmap::IndexMap;

use super::edge::{Edge, EdgeSide, End};
use super::ids::{EdgeId, NodeId, SceneryId, SegmentRef};
use super::node::Node;
use super::scenery::{SceneryObject, SceneryOwner};
use super::segment::{self, EdgeSegment};
use crate::shared::{Pose, Vector, VectorExt};

pub use topology::{ContractedItem, ContractionMap};

/// Typisierte Graph-Attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphAttrs {
    /// Kachel, auf die der Ursprung abgebildet wird (überschreibt die Writer-Option)
    pub origin_tile: Option<(i32, i32)>,
}

/// Gleisnetz mit Knoten, Kanten und graphbezogenen Szenerie-Objekten.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
    scenery: IndexMap<SceneryId, SceneryObject>,
    /// Graphbezogene (globale) Szenerie-Objekte in Einfügereihenfolge
    graph_scenery: Vec<SceneryId>,
    next_node_id: u32,
    next_edge_id: u32,
    next_scenery_id: u32,
    pub attrs: GraphAttrs,
}

impl Index<NodeId> for Graph {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[&id]
    }
}

impl IndexMut<NodeId> for Graph {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[&id]
    }
}

impl Index<EdgeId> for Graph {
    type Output = Edge;

    fn index(&self, id: EdgeId) -> &Edge {
        &self.edges[&id]
    }
}

impl IndexMut<EdgeId> for Graph {
    fn index_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[&id]
    }
}

impl Index<SceneryId> for Graph {
    type Output = SceneryObject;

    fn index(&self, id: SceneryId) -> &SceneryObject {
        &self.scenery[&id]
    }
}

impl IndexMut<SceneryId> for Graph {
    fn index_mut(&mut self, id: SceneryId) -> &mut SceneryObject {
        &mut self.scenery[&id]
    }
}

impl Graph {
    /// Erstellt einen leeren Graphen
    pub fn new() -> Self {
        Self::default()
    }

    // ── Zugriff ─────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn scenery_object(&self, id: SceneryId) -> Option<&SceneryObject> {
        self.scenery.get(&id)
    }

    /// Knoten-Handles in Einfügereihenfolge
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Kanten-Handles in Einfügereihenfolge
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys().copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().map(|(id, edge)| (*id, edge))
    }

    /// Graphbezogene Szenerie-Objekte
    pub fn graph_scenery(&self) -> &[SceneryId] {
        &self.graph_scenery
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Position eines Knotens in der Knotenliste
    pub fn node_position(&self, id: NodeId) -> Option<usize> {
        self.nodes.get_index_of(&id)
    }

    // ── Kantenenden ─────────────────────────────────────────────────

    /// Knoten am Kantenende
    pub fn end_node(&self, end: End) -> NodeId {
        self[end.edge].node(end.side)
    }

    /// Pose der Kante am Ende, Blickrichtung in die Kante hinein
    pub fn end_pose(&self, end: End) -> Pose {
        match end.side {
            EdgeSide::Source => self.edge_start(end.edge),
            EdgeSide::Target => self.edge_end(end.edge),
        }
    }

    /// Verbindet das Ende mit einem anderen Knoten
    pub fn set_end_node(&mut self, end: End, node: NodeId) {
        match end.side {
            EdgeSide::Source => self.set_source(end.edge, node),
            EdgeSide::Target => self.set_target(end.edge, node),
        }
    }

    /// Radius am Ende, gesehen vom Knoten in die Kante hinein
    pub fn end_radius(&self, end: End) -> f64 {
        let segments = &self[end.edge].segments;
        match (end.side, segments.first(), segments.last()) {
            (EdgeSide::Source, Some(first), _) => first.radius,
            (EdgeSide::Target, _, Some(last)) => -last.radius,
            _ => 0.0,
        }
    }

    /// Krümmung am Ende (0 für Geraden)
    pub fn end_curvature(&self, end: End) -> f64 {
        let radius = self.end_radius(end);
        if radius == 0.0 {
            0.0
        } else {
            1.0 / radius
        }
    }

    /// Segment am Ende, falls die Kante Geometrie hat
    pub fn end_segment(&self, end: End) -> Option<SegmentRef> {
        self[end.edge]
            .segment_index(end.side)
            .map(|index| SegmentRef::new(end.edge, index))
    }

    /// Pose im Abstand `s` vom Knoten des Endes, Blickrichtung vom Knoten weg
    pub fn end_travel(&self, end: End, s: f64) -> Pose {
        match end.side {
            EdgeSide::Source => self.edge_travel(end.edge, s),
            EdgeSide::Target => self
                .edge_travel(end.edge, self.edge_length(end.edge) - s)
                .reverse(),
        }
    }

    /// Kantengeometrie in Laufrichtung des Endes (vom Knoten weg)
    pub fn end_geometry(&self, end: End) -> Cow<'_, [EdgeSegment]> {
        let geometry = self.edge_geometry(end.edge);
        match end.side {
            EdgeSide::Source => geometry,
            EdgeSide::Target => Cow::Owned(segment::chain_flipped(&geometry)),
        }
    }

    // ── Kantengeometrie ─────────────────────────────────────────────

    /// Segmente der Kante; ohne Segmente die Sehne zwischen den Knoten
    pub fn edge_geometry(&self, id: EdgeId) -> Cow<'_, [EdgeSegment]> {
        let edge = &self[id];
        if edge.segments.is_empty() {
            let p = self[edge.source].pose.pos;
            let q = self[edge.target].pose.pos;
            let chord = EdgeSegment::straight(Pose::new(p, (q - p).alpha()), (q - p).length());
            Cow::Owned(vec![chord])
        } else {
            Cow::Borrowed(&edge.segments)
        }
    }

    /// Startpose der Kante (zum Ziel gerichtet)
    pub fn edge_start(&self, id: EdgeId) -> Pose {
        let edge = &self[id];
        match edge.segments.first() {
            Some(first) => first.start,
            None => {
                let p = self[edge.source].pose.pos;
                let q = self[edge.target].pose.pos;
                Pose::new(p, (q - p).alpha())
            }
        }
    }

    /// Endpose der Kante (zur Quelle gerichtet)
    pub fn edge_end(&self, id: EdgeId) -> Pose {
        let edge = &self[id];
        match edge.segments.last() {
            Some(last) => last.end(),
            None => {
                let p = self[edge.target].pose.pos;
                let q = self[edge.source].pose.pos;
                Pose::new(p, (q - p).alpha())
            }
        }
    }

    /// Geometrische Länge der Kante
    pub fn edge_length(&self, id: EdgeId) -> f64 {
        segment::chain_length(&self.edge_geometry(id))
    }

    /// Pose nach Strecke `s` ab der Quelle
    pub fn edge_travel(&self, id: EdgeId, s: f64) -> Pose {
        let geometry = self.edge_geometry(id);
        segment::chain_travel(&geometry, s).unwrap_or_else(|| self.edge_start(id))
    }

    /// Kantenlokal → global. `offset = None` nimmt den Weg `s` der Quelle.
    pub fn edge_to_global(
        &self,
        id: EdgeId,
        local: Pose,
        offset: Option<f64>,
        extend_before: bool,
        extend_after: bool,
    ) -> Option<Pose> {
        let offset = offset.unwrap_or(self[self[id].source].s);
        segment::chain_to_global(
            &self.edge_geometry(id),
            local,
            offset,
            extend_before,
            extend_after,
        )
    }

    /// Global → kantenlokal. `offset = None` nimmt den Weg `s` der Quelle.
    pub fn edge_to_local(
        &self,
        id: EdgeId,
        global: Pose,
        offset: Option<f64>,
        extend_before: bool,
        extend_after: bool,
    ) -> Option<Pose> {
        let offset = offset.unwrap_or(self[self[id].source].s);
        segment::chain_to_local(
            &self.edge_geometry(id),
            global,
            offset,
            extend_before,
            extend_after,
        )
    }

    /// Segment hinter einem `SegmentRef`
    pub fn segment(&self, segment: SegmentRef) -> Option<&EdgeSegment> {
        self.edges
            .get(&segment.edge)
            .and_then(|edge| edge.segments.get(segment.index))
    }

    /// Alle Segmente in Kanten- und Segmentreihenfolge
    pub fn segment_refs(&self) -> impl Iterator<Item = SegmentRef> + '_ {
        self.edges.iter().flat_map(|(id, edge)| {
            (0..edge.segments.len()).map(move |index| SegmentRef::new(*id, index))
        })
    }

    // ── Grundmutationen ─────────────────────────────────────────────

    pub(crate) fn insert_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Legt eine Kante an und trägt sie bei Quelle und Ziel ein
    pub fn insert_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        segments: Vec<EdgeSegment>,
    ) -> EdgeId {
        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        self.edges.insert(id, Edge::new(source, target, segments));
        self[source].outgoing.push(id);
        self[target].incoming.push(id);
        id
    }

    /// Setzt eine neue Quelle und pflegt die Kantenlisten
    pub fn set_source(&mut self, edge: EdgeId, source: NodeId) {
        let old = self[edge].source;
        if old == source {
            return;
        }
        remove_first(&mut self[old].outgoing, edge);
        self[source].outgoing.push(edge);
        self[edge].source = source;
    }

    /// Setzt ein neues Ziel und pflegt die Kantenlisten
    pub fn set_target(&mut self, edge: EdgeId, target: NodeId) {
        let old = self[edge].target;
        if old == target {
            return;
        }
        remove_first(&mut self[old].incoming, edge);
        self[target].incoming.push(edge);
        self[edge].target = target;
    }

    /// Kehrt eine Kante um: Quelle/Ziel tauschen, Segmente umkehren,
    /// kantenlokale Szenerie spiegeln.
    pub fn flip_edge(&mut self, id: EdgeId) {
        let (source, target) = (self[id].source, self[id].target);
        remove_first(&mut self[source].outgoing, id);
        remove_first(&mut self[target].incoming, id);
        self[source].incoming.push(id);
        self[target].outgoing.push(id);

        let length = self.edge_length(id);
        let edge = &mut self.edges[&id];
        edge.source = target;
        edge.target = source;
        for segment in edge.segments.iter_mut() {
            segment.flip();
        }
        edge.segments.reverse();

        let scenery = edge.scenery.clone();
        for object_id in scenery {
            let object = &mut self[object_id];
            let reversed = object.pose.reverse();
            object.pose = Pose::new(
                Vector::new(length - reversed.pos.x, -reversed.pos.y),
                reversed.direction,
            );
        }
    }

    /// Entfernt eine Kante samt ihrer Szenerie-Objekte
    pub fn remove_edge(&mut self, id: EdgeId) {
        let Some(edge) = self.edges.shift_remove(&id) else {
            return;
        };
        if let Some(source) = self.nodes.get_mut(&edge.source) {
            remove_first(&mut source.outgoing, id);
        }
        if let Some(target) = self.nodes.get_mut(&edge.target) {
            remove_first(&mut target.incoming, id);
        }
        for object_id in edge.scenery {
            self.scenery.shift_remove(&object_id);
        }
    }

    /// Entfernt einen Knoten inklusive aller inzidenten Kanten
    pub fn remove_node(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let incident: Vec<EdgeId> = node
            .incoming
            .iter()
            .chain(node.outgoing.iter())
            .copied()
            .collect();
        for edge in incident {
            self.remove_edge(edge);
        }
        self.nodes.shift_remove(&id);
    }

    /// Entfernt alle Knoten ohne Kanten
    pub fn remove_unconnected_nodes(&mut self) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|_, node| node.degree() > 0);
        let removed = before - self.nodes.len();
        if removed > 0 {
            log::debug!("{} unverbundene Knoten entfernt", removed);
        }
        removed
    }

    // ── Szenerie ────────────────────────────────────────────────────

    /// Hängt ein Objekt mit globaler Pose an den Graphen
    pub fn attach_to_graph(&mut self, mut object: SceneryObject) -> SceneryId {
        object.owner = SceneryOwner::Graph;
        let id = self.insert_scenery(object);
        self.graph_scenery.push(id);
        id
    }

    /// Hängt ein Objekt mit kantenlokaler Pose an eine Kante
    pub fn attach_to_edge(&mut self, edge: EdgeId, mut object: SceneryObject) -> SceneryId {
        object.owner = SceneryOwner::Edge(edge);
        let id = self.insert_scenery(object);
        self[edge].scenery.push(id);
        id
    }

    fn insert_scenery(&mut self, object: SceneryObject) -> SceneryId {
        let id = SceneryId(self.next_scenery_id);
        self.next_scenery_id += 1;
        self.scenery.insert(id, object);
        id
    }

    /// Globale Pose eines Szenerie-Objekts
    pub fn scenery_global_pose(&self, id: SceneryId) -> Pose {
        let object = &self[id];
        match object.owner {
            SceneryOwner::Graph => object.pose,
            // mit Extrapolation an beiden Enden immer definiert
            SceneryOwner::Edge(edge) => self
                .edge_to_global(edge, object.pose, Some(0.0), true, true)
                .unwrap_or(object.pose),
        }
    }

    /// Setzt die Pose eines Szenerie-Objekts aus globalen Koordinaten
    pub fn set_scenery_global_pose(&mut self, id: SceneryId, pose: Pose) {
        let local = match self[id].owner {
            SceneryOwner::Graph => Some(pose),
            SceneryOwner::Edge(edge) => self.edge_to_local(edge, pose, Some(0.0), true, true),
        };
        if let Some(local) = local {
            self[id].pose = local;
        }
    }
}

/// Entfernt das erste Vorkommen von `id`.
fn remove_first<T: PartialEq>(list: &mut Vec<T>, id: T) {
    if let Some(pos) = list.iter().position(|item| *item == id) {
        list.remove(pos);
    }
}

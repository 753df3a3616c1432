//! Kacheln und Index-Vergabe für die Ausgabedateien.

pub mod indexer;
pub mod tile_manager;

pub use indexer::Indexer;
pub use tile_manager::{pos2tile, pos2world, Tile, TileManager, WorldPosition};

use crate::core::{EdgeId, NodeId, SceneryId, SegmentRef};

/// In einer Welt-Datei platziertes Objekt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldObject {
    /// Gleisstück (Dyntrack)
    Segment(SegmentRef),
    /// Statisches Objekt oder Signal
    Scenery(SceneryId),
}

/// Eintrag der Track-Datenbank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TdbEntry {
    /// Vektorknoten (Kante)
    Edge(EdgeId),
    /// End- oder Weichenknoten
    Node(NodeId),
}

//! Core-Domänentypen: Graph, Knoten, Kanten, Segmente, Wege, Spatial-Index.

pub mod edge;
/// Gleisgraph als Arena
///
/// Dieses Modul definiert die Haupt-Datenstruktur:
/// - Graph: Container für Knoten, Kanten und Szenerie
/// - Node: Punkt im Gleisnetz mit Richtung und Weg `s`
/// - Edge: gerichtete Verbindung mit Segmentgeometrie
pub mod graph;
pub mod ids;
pub mod node;
pub mod path;
pub mod scenery;
pub mod search;
pub mod segment;
pub mod spatial;

pub use edge::{Edge, EdgeSide, End};
pub use graph::{ContractedItem, ContractionMap, Graph, GraphAttrs};
pub use ids::{EdgeId, NodeId, SceneryId, SegmentRef};
pub use node::Node;
pub use path::Path;
pub use scenery::{SceneryAttrs, SceneryKind, SceneryObject, SceneryOwner};
pub use search::{find_shortest_path, PathStart};
pub use segment::EdgeSegment;
pub use spatial::{SpatialIndex, SpatialMatch};

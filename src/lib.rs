//! OR Route Builder Library.
//! Gleisgraph, Geometrie und Open-Rails-Writer als Library exportiert für Tests und Wiederverwendung.

pub mod core;
pub mod error;
pub mod plan;
pub mod shared;
pub mod tiles;
pub mod writer;

pub use core::{
    find_shortest_path, Edge, EdgeId, EdgeSegment, EdgeSide, End, Graph, Node, NodeId, Path,
    PathStart, SceneryAttrs, SceneryId, SceneryKind, SceneryObject, SegmentRef,
};
pub use core::{SpatialIndex, SpatialMatch};
pub use error::{RouteError, RouteResult};
pub use plan::{BuiltRoute, PathRequest, RoutePlan};
pub use shared::{LineEnding, Pose, Vector, WriterOptions};
pub use tiles::{Indexer, TdbEntry, Tile, TileManager, WorldObject, WorldPosition};
pub use writer::{Facing, RouteWriter};

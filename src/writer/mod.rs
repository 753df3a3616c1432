//! Schreibt einen Gleisgraphen als Open-Rails-Route.
//!
//! Ein Vorlauf beim Anlegen des Writers vergibt alle Indizes (Kachel,
//! Index in der Welt-Datei, Track-Datenbank, Track-Items, Abschnitte) in
//! fester Reihenfolge: Kanten, darin Segmente, dann Szenerie der Kante,
//! danach alle Knoten und zuletzt die graphbezogene Szenerie.

pub mod format;
mod path_file;
mod route_file;
pub mod stf;
mod tdb;
mod tsection;
mod world;

use std::f64::consts::PI;
use std::path::{Path as FsPath, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::core::{EdgeId, Graph, NodeId, Path, SceneryId, SceneryObject, SegmentRef};
use crate::error::{RouteError, RouteResult};
use crate::shared::options::{FIRST_SECTION_INDEX, FIRST_TDB_INDEX, FIRST_TR_ITEM_ID};
use crate::shared::{Vector, WriterOptions};
use crate::tiles::{Indexer, TdbEntry, Tile, TileManager, WorldObject, WorldPosition};

pub use stf::StfOutput;

/// Achse eines Objekts, die in Blickrichtung der Pose zeigt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    X,
    Y,
    NegX,
    NegY,
}

impl Facing {
    /// Winkelversatz für die Quaternion-Richtung
    pub fn offset(self) -> f64 {
        match self {
            Facing::X => 0.0,
            Facing::Y => 0.25 * PI,
            Facing::NegX => 0.5 * PI,
            Facing::NegY => 0.75 * PI,
        }
    }
}

impl FromStr for Facing {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(Facing::X),
            "y" => Ok(Facing::Y),
            "-x" => Ok(Facing::NegX),
            "-y" => Ok(Facing::NegY),
            other => Err(RouteError::Configuration(format!(
                "Ausrichtung '{}' ist keine von 'x', 'y', '-x', '-y'",
                other
            ))),
        }
    }
}

/// Writer für eine Route; hält den Graphen nur lesend.
#[derive(Debug)]
pub struct RouteWriter<'g> {
    directory: PathBuf,
    base_name: String,
    graph: &'g Graph,
    options: WriterOptions,
    world: TileManager<WorldObject>,
    tdb: Indexer<TdbEntry>,
    tr_items: Indexer<SceneryId>,
    sections: Indexer<SegmentRef>,
}

impl<'g> RouteWriter<'g> {
    /// Legt einen Writer für das Routen-Verzeichnis `directory` an und vergibt alle Indizes.
    ///
    /// Der Routenname ist der letzte Pfadbestandteil. Signale, die am Graphen
    /// statt an einer Kante hängen, sind ein Topologie-Fehler.
    pub fn new(
        directory: impl Into<PathBuf>,
        graph: &'g Graph,
        options: WriterOptions,
    ) -> RouteResult<Self> {
        let directory = directory.into();
        let base_name = directory
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "route".to_string());
        let origin = graph.attrs.origin_tile.unwrap_or(options.start_tile);

        let mut writer = Self {
            directory,
            base_name,
            graph,
            options,
            world: TileManager::new(origin),
            tdb: Indexer::new(FIRST_TDB_INDEX),
            tr_items: Indexer::new(FIRST_TR_ITEM_ID),
            sections: Indexer::new(FIRST_SECTION_INDEX),
        };
        writer.init_indices()?;
        Ok(writer)
    }

    fn init_indices(&mut self) -> RouteResult<()> {
        let graph = self.graph;
        for (edge_id, edge) in graph.edges() {
            for (index, segment) in edge.segments.iter().enumerate() {
                let segment_ref = SegmentRef::new(edge_id, index);
                self.world
                    .register(WorldObject::Segment(segment_ref), segment.start.pos);
                self.sections.get_or_add(segment_ref);
            }
            self.tdb.get_or_add(TdbEntry::Edge(edge_id));
            for object_id in edge.scenery() {
                let object = &graph[*object_id];
                if !is_written(object, *object_id) {
                    continue;
                }
                if object.is_signal() {
                    self.tr_items.get_or_add(*object_id);
                }
                let pos = graph.scenery_global_pose(*object_id).pos;
                self.world.register(WorldObject::Scenery(*object_id), pos);
            }
        }

        self.tdb.register(graph.node_ids().map(TdbEntry::Node));

        for object_id in graph.graph_scenery() {
            let object = &graph[*object_id];
            if !is_written(object, *object_id) {
                continue;
            }
            if object.is_signal() {
                return Err(RouteError::topology(format!(
                    "Signal {} muss an einer Kante hängen",
                    object_id
                )));
            }
            self.world
                .register(WorldObject::Scenery(*object_id), object.pose.pos);
        }

        log::debug!(
            "Indizes vergeben: {} Kacheln, {} TDB-Einträge, {} Signale, {} Abschnitte",
            self.world.len(),
            self.tdb.len(),
            self.tr_items.len(),
            self.sections.len()
        );
        Ok(())
    }

    // ── Zugriff ─────────────────────────────────────────────────────

    pub fn directory(&self) -> &FsPath {
        &self.directory
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Kachel, auf die der Ursprung abgebildet wird
    pub fn origin_tile(&self) -> Tile {
        self.world.origin()
    }

    /// Kachelverwaltung der Welt-Dateien
    pub fn world(&self) -> &TileManager<WorldObject> {
        &self.world
    }

    // ── Abfragen für Simulator-Anbindung ────────────────────────────

    /// 2D-Position → Weltkoordinate
    pub fn pos2world(&self, pos: Vector, z: f64, tile: Option<Tile>) -> WorldPosition {
        self.world.pos2world(pos, z, tile)
    }

    /// Kachel und Index eines platzierten Objekts
    pub fn world_tile_and_index(&self, object: WorldObject) -> Option<(Tile, u32)> {
        self.world.tile_and_index(&object)
    }

    /// Index in der Track-Datenbank
    pub fn tdb_index(&self, entry: TdbEntry) -> Option<u32> {
        self.tdb.get(&entry)
    }

    /// Track-Item-ID eines Signals
    pub fn tr_item_id(&self, object: SceneryId) -> Option<u32> {
        self.tr_items.get(&object)
    }

    /// Abschnitts-Index im Pfadformat: gerade Werte für Geraden und
    /// Linksbögen, ungerade für Rechtsbögen.
    pub fn section_index(&self, segment: SegmentRef) -> Option<u32> {
        let index = self.sections.get(&segment)?;
        let radius = self.graph.segment(segment)?.radius;
        let base = 2 * index - FIRST_SECTION_INDEX;
        Some(if radius > 0.0 { base + 1 } else { base })
    }

    /// TDB-Indizes aller Weichen, an denen der Weg eine Kante betritt.
    pub fn switch_tdb_indices(&self, path: &Path) -> Vec<u32> {
        path.iter()
            .map(|end| self.graph.end_node(*end))
            .filter(|node| self.graph[*node].degree() > 2)
            .filter_map(|node| self.tdb.get(&TdbEntry::Node(node)))
            .collect()
    }

    // ── Schreiben ───────────────────────────────────────────────────

    /// Schreibt die komplette Route: Vorlage, .trk, tsection.dat, Welt-Dateien, .tdb.
    pub fn write_all(&self) -> Result<()> {
        self.copy_route_template(self.options.overwrite)?;
        self.write_track_file()?;
        self.write_tsection_file()?;
        self.write_world_files()?;
        self.write_tdb()?;
        if self.options.export_graph_json {
            self.write_graph_json()?;
        }
        log::info!(
            "Route '{}' geschrieben: {} Knoten, {} Kanten, {} Kacheln",
            self.base_name,
            self.graph.node_count(),
            self.graph.edge_count(),
            self.world.len()
        );
        Ok(())
    }

    /// Exportiert den Graphen als `<route>.graph.json`.
    pub fn write_graph_json(&self) -> Result<()> {
        let path = self.directory.join(format!("{}.graph.json", self.base_name));
        let json = self.graph.to_json()?;
        std::fs::write(&path, json)
            .with_context(|| format!("Graph-Export fehlgeschlagen: {}", path.display()))?;
        log::debug!("Graph exportiert: {}", path.display());
        Ok(())
    }

    /// Pfad der Welt-Datei einer Kachel
    pub fn world_file_name(&self, tile: Tile) -> PathBuf {
        self.directory
            .join("world")
            .join(format!("w{:+07}{:+07}.w", tile.0, tile.1))
    }

    /// Pfade der Terrain-Dateien einer Kachel (`.t` und `_y.raw`)
    pub fn tile_file_names(&self, tile: Tile) -> (PathBuf, PathBuf) {
        let base = format!("-{:08x}", tile_file_index(tile));
        let tiles = self.directory.join("tiles");
        (
            tiles.join(format!("{}.t", base)),
            tiles.join(format!("{}_y.raw", base)),
        )
    }

    fn ensure_directory(&self, name: &str) -> Result<PathBuf> {
        let directory = self.directory.join(name);
        std::fs::create_dir_all(&directory)
            .with_context(|| format!("Verzeichnis nicht anlegbar: {}", directory.display()))?;
        Ok(directory)
    }

    fn segment_index_or_err(&self, segment: SegmentRef) -> RouteResult<u32> {
        self.sections.get(&segment).ok_or_else(|| {
            RouteError::topology(format!("Segment {} ohne Abschnitts-Index", segment))
        })
    }

    fn section_index_or_err(&self, segment: SegmentRef) -> RouteResult<u32> {
        self.section_index(segment).ok_or_else(|| {
            RouteError::topology(format!("Segment {} ohne Abschnitts-Index", segment))
        })
    }

    fn tdb_edge_index(&self, edge: EdgeId) -> RouteResult<u32> {
        self.tdb
            .get(&TdbEntry::Edge(edge))
            .ok_or_else(|| RouteError::topology(format!("Kante {} fehlt in der TDB", edge)))
    }

    fn tdb_node_index(&self, node: NodeId) -> RouteResult<u32> {
        self.tdb
            .get(&TdbEntry::Node(node))
            .ok_or_else(|| RouteError::topology(format!("Knoten {} fehlt in der TDB", node)))
    }
}

/// Prüft einmal beim Indexlauf, ob ein Szenerie-Objekt geschrieben wird.
fn is_written(object: &SceneryObject, id: SceneryId) -> bool {
    if object.lacks_shapefile() {
        log::warn!(
            "Szenerie-Objekt {} ({}) ohne Shape-Datei wird nicht geschrieben",
            object.name.as_deref().unwrap_or("<unbenannt>"),
            id
        );
    }
    object.displayable_shapefile().is_some()
}

/// Dateiindex einer Kachel: Bits der versetzten, invertierten Koordinaten
/// verschränkt (Z-Kurve), um zwei Bit nach links geschoben.
pub fn tile_file_index(tile: Tile) -> u64 {
    let mut x = i64::from(tile.0) + (1 << 14);
    let mut z = i64::from(tile.1) + (1 << 14);
    x ^= z;
    x = !x;
    z = !z;
    let mut index: i64 = 0;
    for i in 0..15 {
        index |= ((x & (1 << i)) | ((z & (1 << i)) << 1)) << i;
    }
    (index << 2) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_parses_known_axes() {
        assert_eq!("x".parse::<Facing>().ok(), Some(Facing::X));
        assert_eq!("-y".parse::<Facing>().ok(), Some(Facing::NegY));
        assert!(matches!(
            "z".parse::<Facing>(),
            Err(RouteError::Configuration(_))
        ));
    }

    #[test]
    fn tile_file_index_interleaves_bits() {
        assert_eq!(tile_file_index((-5354, 14849)), 0x11db_fba0);
        assert_eq!(tile_file_index((-5353, 14849)), 0x11db_fba4);
        // x = z = 0 → x ^ z = 0 → beide invertiert: alle 30 Bit gesetzt
        assert_eq!(tile_file_index((-(1 << 14), -(1 << 14))), 0xFFFF_FFFC);
    }
}

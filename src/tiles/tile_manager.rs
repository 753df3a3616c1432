//! Kachelverwaltung: Positionen → Kacheln, Objekte → (Kachel, Index in der Welt-Datei).

use std::collections::HashMap;
use std::hash::Hash;

use indexmap::IndexMap;

use super::indexer::Indexer;
use crate::shared::options::{FIRST_WORLD_INDEX, GROUND_LEVEL, TILE_SIZE};
use crate::shared::Vector;

/// Kachelkoordinate (X, Z)
pub type Tile = (i32, i32);

/// Weltkoordinate einer Position: Kachel plus Position innerhalb der Kachel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPosition {
    pub tile_x: i32,
    pub tile_z: i32,
    pub x: f64,
    /// Höhe über Grund
    pub y: f64,
    pub z: f64,
}

/// Kachel einer 2D-Position; `(0, 0)` liegt in `origin`.
pub fn pos2tile(pos: Vector, origin: Tile) -> Tile {
    (
        (pos.x / TILE_SIZE).round_ties_even() as i32 + origin.0,
        (pos.y / TILE_SIZE).round_ties_even() as i32 + origin.1,
    )
}

/// 2D-Position → Weltkoordinate. Ohne `tile` wird die Kachel aus der Position bestimmt.
pub fn pos2world(pos: Vector, z: f64, tile: Option<Tile>, origin: Tile) -> WorldPosition {
    let (tile_x, tile_z) = tile.unwrap_or_else(|| pos2tile(pos, origin));
    WorldPosition {
        tile_x,
        tile_z,
        x: pos.x - f64::from(tile_x - origin.0) * TILE_SIZE,
        y: z + GROUND_LEVEL,
        z: pos.y - f64::from(tile_z - origin.1) * TILE_SIZE,
    }
}

/// Weist Objekte Kacheln zu und vergibt pro Kachel fortlaufende Indizes.
#[derive(Debug, Clone)]
pub struct TileManager<K> {
    origin: Tile,
    tiles: IndexMap<Tile, Indexer<K>>,
    placement: HashMap<K, Tile>,
}

impl<K: Copy + Eq + Hash> TileManager<K> {
    pub fn new(origin: Tile) -> Self {
        Self {
            origin,
            tiles: IndexMap::new(),
            placement: HashMap::new(),
        }
    }

    pub fn origin(&self) -> Tile {
        self.origin
    }

    /// Registriert ein Objekt in der Kachel seiner Position.
    ///
    /// Die acht Nachbarkacheln werden leer mit angelegt, damit Abfragen an
    /// Kachelgrenzen immer eine Welt-Datei finden.
    pub fn register(&mut self, key: K, pos: Vector) -> (Tile, u32) {
        let tile = self.pos2tile(pos);
        for i in -1..=1 {
            for j in -1..=1 {
                self.tiles
                    .entry((tile.0 + i, tile.1 + j))
                    .or_insert_with(|| Indexer::new(FIRST_WORLD_INDEX));
            }
        }
        let index = self.tiles[&tile].get_or_add(key);
        self.placement.entry(key).or_insert(tile);
        (tile, index)
    }

    pub fn pos2tile(&self, pos: Vector) -> Tile {
        pos2tile(pos, self.origin)
    }

    pub fn pos2world(&self, pos: Vector, z: f64, tile: Option<Tile>) -> WorldPosition {
        pos2world(pos, z, tile, self.origin)
    }

    /// Alle Kacheln in Anlagereihenfolge
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.tiles.keys().copied()
    }

    /// Objekte einer Kachel; `None` für nie angelegte Kacheln
    pub fn by_tile(&self, tile: Tile) -> Option<&Indexer<K>> {
        self.tiles.get(&tile)
    }

    /// Kachel und Index eines registrierten Objekts
    pub fn tile_and_index(&self, key: &K) -> Option<(Tile, u32)> {
        let tile = *self.placement.get(key)?;
        let index = self.tiles.get(&tile)?.get(key)?;
        Some((tile, index))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Paare (Kachel, Objekte) in Anlagereihenfolge
    pub fn iter(&self) -> impl Iterator<Item = (Tile, &Indexer<K>)> + '_ {
        self.tiles.iter().map(|(tile, indexer)| (*tile, indexer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const ORIGIN: Tile = (-5354, 14849);

    #[test]
    fn tile_rounding_uses_half_to_even() {
        assert_eq!(pos2tile(Vector::new(1024.0, 0.0), (0, 0)), (0, 0));
        assert_eq!(pos2tile(Vector::new(3072.0, 0.0), (0, 0)), (2, 0));
        assert_eq!(pos2tile(Vector::new(-1024.0, 1025.0), (0, 0)), (0, 1));
    }

    #[test]
    fn pos2world_is_relative_to_tile_center() {
        let world = pos2world(Vector::new(2100.0, -10.0), 0.5, None, ORIGIN);

        assert_eq!((world.tile_x, world.tile_z), (ORIGIN.0 + 1, ORIGIN.1));
        assert_abs_diff_eq!(world.x, 52.0, epsilon = 1e-12);
        assert_abs_diff_eq!(world.y, 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(world.z, -10.0, epsilon = 1e-12);
    }

    #[test]
    fn explicit_tile_overrides_position() {
        let world = pos2world(Vector::new(2100.0, 0.0), 0.0, Some(ORIGIN), ORIGIN);
        assert_abs_diff_eq!(world.x, 2100.0, epsilon = 1e-12);
    }

    #[test]
    fn register_allocates_neighbours_and_indexes_per_tile() {
        let mut manager = TileManager::new(ORIGIN);
        let (tile, first) = manager.register("a", Vector::ZERO);
        let (_, second) = manager.register("b", Vector::new(10.0, 0.0));
        let (far_tile, far) = manager.register("c", Vector::new(4096.0, 0.0));

        assert_eq!(tile, ORIGIN);
        assert_eq!((first, second), (1, 2));
        assert_eq!(far_tile, (ORIGIN.0 + 2, ORIGIN.1));
        assert_eq!(far, 1);
        // 3x3 um den Ursprung plus zwei neue Spalten um die ferne Kachel
        assert_eq!(manager.len(), 15);
        assert_eq!(manager.tiles().next(), Some((ORIGIN.0 - 1, ORIGIN.1 - 1)));
        assert!(manager.by_tile((ORIGIN.0 + 1, ORIGIN.1 + 1)).is_some_and(Indexer::is_empty));
        assert_eq!(manager.tile_and_index(&"b"), Some((ORIGIN, 2)));
        assert_eq!(manager.tile_and_index(&"d"), None);
    }
}

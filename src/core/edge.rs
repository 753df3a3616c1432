//! Kanten und Kantenenden.

use serde::{Deserialize, Serialize};

use super::ids::{EdgeId, NodeId, SceneryId};
use super::segment::EdgeSegment;

/// Seite einer Kante.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeSide {
    Source,
    Target,
}

impl EdgeSide {
    /// Pin-Wert in der Track-Datenbank (Quelle = 1, Ziel = 0).
    pub fn pin(self) -> u8 {
        match self {
            EdgeSide::Source => 1,
            EdgeSide::Target => 0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            EdgeSide::Source => EdgeSide::Target,
            EdgeSide::Target => EdgeSide::Source,
        }
    }
}

/// Navigations-Handle auf ein Ende einer Kante.
///
/// Besitzt nichts; alle Abfragen laufen über den `Graph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct End {
    pub edge: EdgeId,
    pub side: EdgeSide,
}

impl End {
    pub fn new(edge: EdgeId, side: EdgeSide) -> Self {
        Self { edge, side }
    }

    pub fn source(edge: EdgeId) -> Self {
        Self::new(edge, EdgeSide::Source)
    }

    pub fn target(edge: EdgeId) -> Self {
        Self::new(edge, EdgeSide::Target)
    }

    /// Das andere Ende derselben Kante
    pub fn other_end(self) -> Self {
        Self::new(self.edge, self.side.opposite())
    }
}

/// Gerichtete Gleisverbindung zweier Knoten.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub(crate) source: NodeId,
    pub(crate) target: NodeId,
    /// Geometrie von der Quelle zum Ziel
    pub segments: Vec<EdgeSegment>,
    pub(crate) scenery: Vec<SceneryId>,
}

impl Edge {
    pub(crate) fn new(source: NodeId, target: NodeId, segments: Vec<EdgeSegment>) -> Self {
        Self {
            source,
            target,
            segments,
            scenery: Vec::new(),
        }
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Knoten auf der gegebenen Seite
    pub fn node(&self, side: EdgeSide) -> NodeId {
        match side {
            EdgeSide::Source => self.source,
            EdgeSide::Target => self.target,
        }
    }

    /// Kantenbezogene Szenerie-Objekte in Einfügereihenfolge
    pub fn scenery(&self) -> &[SceneryId] {
        &self.scenery
    }

    /// Index des Segments am gegebenen Ende
    pub fn segment_index(&self, side: EdgeSide) -> Option<usize> {
        if self.segments.is_empty() {
            return None;
        }
        Some(match side {
            EdgeSide::Source => 0,
            EdgeSide::Target => self.segments.len() - 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_end_toggles_side() {
        let end = End::source(EdgeId(4));
        assert_eq!(end.other_end(), End::target(EdgeId(4)));
        assert_eq!(end.other_end().other_end(), end);
    }

    #[test]
    fn pins_follow_track_database_convention() {
        assert_eq!(EdgeSide::Source.pin(), 1);
        assert_eq!(EdgeSide::Target.pin(), 0);
    }
}

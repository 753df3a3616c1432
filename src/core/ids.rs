//! Stabile Handles für Graph-Elemente.
//!
//! Handles werden vom `Graph` fortlaufend vergeben und nie wiederverwendet.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Handle eines Knotens
    NodeId,
    "n"
);
arena_id!(
    /// Handle einer Kante
    EdgeId,
    "e"
);
arena_id!(
    /// Handle eines Szenerie-Objekts
    SceneryId,
    "o"
);

/// Verweis auf ein Segment: Kante plus Position in deren Segmentliste.
///
/// Bleibt gültig, solange die Segmentliste der Kante nicht verändert wird
/// (also ab Übergabe des Graphen an den Writer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentRef {
    pub edge: EdgeId,
    pub index: usize,
}

impl SegmentRef {
    pub fn new(edge: EdgeId, index: usize) -> Self {
        Self { edge, index }
    }
}

impl fmt::Display for SegmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.edge, self.index)
    }
}

//! Geteilte Bausteine ohne Graph-Abhängigkeit.
//!
//! Enthält den Geometrie-Kern (Vektoren, Posen, Bi-Arcs) und die
//! Writer-Konfiguration samt Formatkonstanten.

pub mod biarc;
pub mod geometry;
pub mod options;

pub use biarc::{biarc_interpolation, BiArc};
pub use geometry::{angle_between, polar, Pose, Vector, VectorExt};
pub use options::{LineEnding, WriterOptions};
pub use options::{DEFAULT_START_TILE, GROUND_LEVEL, TILE_SIZE, UNDEFINED};

//! Knoten des Gleisgraphen.

use super::ids::EdgeId;
use crate::shared::Pose;

/// Punkt im Gleisnetz mit Richtung.
///
/// Bei Grad 2 ist die Richtung die Fahrtrichtung durch den Knoten, bei
/// Weichen zeigt sie zur Weichenspitze. Die Kantenlisten verwaltet der
/// `Graph`; sie sind von außen nur lesbar.
#[derive(Debug, Clone)]
pub struct Node {
    /// Position und Richtung
    pub pose: Pose,
    /// Kumulierter Weg (wird von `make_directed` gesetzt)
    pub s: f64,
    /// Optionale Bezeichnung (z.B. aus einem Routenplan)
    pub label: Option<String>,
    pub(crate) incoming: Vec<EdgeId>,
    pub(crate) outgoing: Vec<EdgeId>,
}

impl Node {
    pub(crate) fn new(pose: Pose, s: f64) -> Self {
        Self {
            pose,
            s,
            label: None,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Kanten mit diesem Knoten als Ziel
    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    /// Kanten mit diesem Knoten als Quelle
    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    /// Anzahl inzidenter Kanten (Selbstschleifen zählen doppelt)
    pub fn degree(&self) -> usize {
        self.incoming.len() + self.outgoing.len()
    }
}

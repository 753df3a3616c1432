//! Szenerie-Objekte (statische Objekte, Signale) am Graphen oder an einer Kante.

use serde::{Deserialize, Serialize};

use super::ids::EdgeId;
use crate::shared::Pose;

/// Art eines Szenerie-Objekts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneryKind {
    /// Statisches Objekt (Baum, Gebäude, Hindernis)
    #[default]
    Static,
    /// Signal; nur an Kanten zulässig
    Signal,
}

impl SceneryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SceneryKind::Static => "static",
            SceneryKind::Signal => "signal",
        }
    }
}

/// Bezugssystem der Pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneryOwner {
    /// Globale Koordinaten
    Graph,
    /// Kantenlokal: x = Weg ab Quelle, y = Querabstand nach links
    Edge(EdgeId),
}

/// Typisierte Ausgabe-Attribute.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneryAttrs {
    /// Shape-Datei; ohne sie wird das Objekt nicht geschrieben
    #[serde(default)]
    pub shapefile: Option<String>,
    #[serde(default)]
    pub animated: bool,
    /// 3-Bit-Klassifikation in den Static-Flags
    #[serde(default)]
    pub classification: u32,
    /// Höhe über Boden
    #[serde(default)]
    pub z: f64,
    /// Signaltyp; fehlt er, gilt der Standard der Writer-Optionen
    #[serde(default)]
    pub signal_type: Option<String>,
}

/// Objekt in der Szenerie.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneryObject {
    /// Pose im Bezugssystem von `owner`
    pub pose: Pose,
    pub kind: SceneryKind,
    pub name: Option<String>,
    /// Wird das Objekt in die Weltdateien geschrieben?
    pub render: bool,
    pub attrs: SceneryAttrs,
    pub(crate) owner: SceneryOwner,
}

impl SceneryObject {
    pub fn new(pose: Pose, kind: SceneryKind) -> Self {
        Self {
            pose,
            kind,
            name: None,
            render: true,
            attrs: SceneryAttrs::default(),
            owner: SceneryOwner::Graph,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attrs(mut self, attrs: SceneryAttrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_shapefile(mut self, shapefile: impl Into<String>) -> Self {
        self.attrs.shapefile = Some(shapefile.into());
        self
    }

    /// Objekt bleibt im Graphen, wird aber nicht geschrieben.
    pub fn hidden(mut self) -> Self {
        self.render = false;
        self
    }

    pub fn owner(&self) -> SceneryOwner {
        self.owner
    }

    pub fn is_signal(&self) -> bool {
        self.kind == SceneryKind::Signal
    }

    /// Shape-Datei, falls das Objekt geschrieben werden soll.
    pub fn displayable_shapefile(&self) -> Option<&str> {
        if !self.render {
            return None;
        }
        self.attrs.shapefile.as_deref().filter(|s| !s.is_empty())
    }

    /// Sichtbar, aber ohne Shape-Datei: wird beim Schreiben übersprungen.
    pub fn lacks_shapefile(&self) -> bool {
        self.render && self.displayable_shapefile().is_none()
    }
}

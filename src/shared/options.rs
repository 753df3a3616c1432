//! Zentrale Konfiguration für den Route-Writer.
//!
//! `WriterOptions` enthält alle pro Aufruf änderbaren Werte.
//! Die `const`-Werte sind Festwerte des Open-Rails-Formats oder Fallback/Default.

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

// ── Zielformat ──────────────────────────────────────────────────────

/// Platzhalter für "keine Referenz" in Open-Rails-Dateien.
pub const UNDEFINED: u32 = 4294967295;
/// Höhe des Bodens über Null (Welt-Y).
pub const GROUND_LEVEL: f64 = 1.0;
/// Höhenversatz von Dyntrack-Objekten gegenüber dem Boden.
pub const DYNTRACK_Z_OFFSET: f64 = -0.2;
/// Kantenlänge einer Kachel in Metern.
pub const TILE_SIZE: f64 = 2048.0;
/// Kachel, auf die der Ursprung (0, 0) abgebildet wird.
pub const DEFAULT_START_TILE: (i32, i32) = (-5354, 14849);
/// Standard-Signaltyp für Signale ohne eigenen Typ.
pub const DEFAULT_SIGNAL_TYPE: &str = "Ks";
/// Name der Einstellungsdatei neben dem Programm
pub const CONFIG_FILE_NAME: &str = "or_route_builder.toml";

// ── Indexer ─────────────────────────────────────────────────────────

/// Erster Index innerhalb einer Welt-Datei.
pub const FIRST_WORLD_INDEX: u32 = 1;
/// Erster Index in der Track-Datenbank.
pub const FIRST_TDB_INDEX: u32 = 1;
/// Erste Track-Item-ID (Signale).
pub const FIRST_TR_ITEM_ID: u32 = 0;
/// Erster Abschnitts-Index (tsection.dat).
pub const FIRST_SECTION_INDEX: u32 = 40000;

// ── Bi-Arc ──────────────────────────────────────────────────────────

/// Bögen mit kleinerem Winkel werden zur Geraden.
pub const MIN_ANGLE: f64 = 0.0;
/// Bögen mit größerem Radius werden zur Geraden.
pub const MAX_RADIUS: f64 = f64::INFINITY;

/// Zeilenende der geschriebenen STF-Dateien.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Crlf,
    Lf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

/// Laufzeit-Optionen des Writers (persistiert als TOML).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriterOptions {
    /// Kachel des Ursprungs (X, Z)
    pub start_tile: (i32, i32),
    /// Vorlagen-Route (Terrain, Umgebung, .rdb); ohne Vorlage werden nur Verzeichnisse angelegt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_folder: Option<PathBuf>,
    /// Vorhandenes Routen-Verzeichnis aus der Vorlage neu erzeugen
    #[serde(default)]
    pub overwrite: bool,
    /// Zeilenende der STF-Dateien
    #[serde(default)]
    pub line_ending: LineEnding,
    /// Signaltyp, falls ein Signal keinen eigenen mitbringt
    #[serde(default = "default_signal_type")]
    pub default_signal_type: String,
    /// Zusätzlich `<route>.graph.json` schreiben
    #[serde(default)]
    pub export_graph_json: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            start_tile: DEFAULT_START_TILE,
            template_folder: None,
            overwrite: false,
            line_ending: LineEnding::Crlf,
            default_signal_type: default_signal_type(),
            export_graph_json: false,
        }
    }
}

/// Serde-Default für `default_signal_type`.
fn default_signal_type() -> String {
    DEFAULT_SIGNAL_TYPE.to_string()
}

impl WriterOptions {
    /// Lädt die Writer-Einstellungen aus einer TOML-Datei.
    ///
    /// Fehlt die Datei oder ist sie unlesbar, schreibt der Writer mit den
    /// Standardwerten (Starttile, Signaltyp, CRLF).
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Writer-Einstellungen aus {} übernommen", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!(
                        "Writer-Einstellungen in {} ungültig, Route wird mit Standardwerten geschrieben: {}",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                log::info!(
                    "Keine Writer-Einstellungen unter {} ({}), Standardwerte aktiv",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Schreibt die Einstellungen als Vorlage für spätere Läufe.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| {
            format!("Writer-Einstellungen nicht schreibbar: {}", path.display())
        })?;
        log::info!("Writer-Einstellungen nach {} gesichert", path.display());
        Ok(())
    }

    /// `or_route_builder.toml` im Verzeichnis des Programms; ohne
    /// ermittelbares Programm das aktuelle Verzeichnis.
    pub fn config_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(std::path::Path::to_path_buf));
        exe_dir
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE_NAME)
    }
}

//! Fehler-Taxonomie des Routen-Kerns.

/// Alle fatalen Fehler, die Graph-, Geometrie- und Writer-Operationen melden.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Verletzte Graph-Invariante (Knotengrad, Rückreferenzen, Signal-Besitzer)
    #[error("Topologie-Fehler: {0}")]
    Topology(String),

    /// Strukturfehler beim Schreiben (unbalancierte Klammern)
    #[error("Format-Fehler: {0}")]
    Format(String),

    /// Ungültiger Parameter an einer Geometrie- oder Writer-Funktion
    #[error("Konfigurations-Fehler: {0}")]
    Configuration(String),

    /// Normalisierung eines Nullvektors o.ä.
    #[error("Division durch Null: {0}")]
    DivisionByZero(&'static str),

    /// Ein Pfad ohne Ends kann nicht geschrieben werden
    #[error("Leerer Pfad")]
    EmptyPath,

    #[error("E/A-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

/// Ergebnis-Typ des Routen-Kerns.
pub type RouteResult<T> = Result<T, RouteError>;

impl RouteError {
    /// Kurzform für `RouteError::Topology`.
    pub fn topology(message: impl Into<String>) -> Self {
        Self::Topology(message.into())
    }
}

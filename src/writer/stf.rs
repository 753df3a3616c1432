//! Ausgabe im geklammerten Textformat (STF) der Simulator-Dateien.
//!
//! Einrückung = Anzahl offener Klammern; eine Zeile, die mit `)` beginnt,
//! steht eine Ebene weiter links. Dateien werden als UTF-16LE mit BOM
//! geschrieben.

use std::path::{Path, PathBuf};

use crate::error::{RouteError, RouteResult};
use crate::shared::LineEnding;

/// Gepufferte STF-Datei; erst [`StfOutput::finish`] schreibt auf die Platte.
#[derive(Debug)]
pub struct StfOutput {
    path: PathBuf,
    line_ending: LineEnding,
    buffer: String,
    depth: usize,
}

impl StfOutput {
    /// Beginnt eine Datei mit Kopfzeile für die gegebene Signatur.
    ///
    /// Einstellige Signaturen werden mit `0` aufgefüllt.
    pub fn create(path: impl Into<PathBuf>, signature: &str, line_ending: LineEnding) -> Self {
        let mut signature = signature.to_string();
        if signature.chars().count() == 1 {
            signature.push('0');
        }
        let mut output = Self {
            path: path.into(),
            line_ending,
            buffer: String::new(),
            depth: 0,
        };
        output
            .buffer
            .push_str(&format!("SIMISA@@@@@@@@@@JINX0{}t______\n\n", signature));
        output
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Aktuelle Klammertiefe
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Hängt Text an; jede Zeile wird neu eingerückt.
    pub fn write(&mut self, content: &str) -> RouteResult<()> {
        for line in content.lines() {
            let line = line.trim_start();
            let closes_first = usize::from(line.starts_with(')'));
            let indent = self.depth.checked_sub(closes_first).ok_or_else(|| {
                RouteError::Format(format!(
                    "unbalancierte Klammer in {}: '{}'",
                    self.path.display(),
                    line
                ))
            })?;
            for _ in 0..indent {
                self.buffer.push('\t');
            }
            self.buffer.push_str(line);
            self.buffer.push('\n');

            let opened = line.matches('(').count();
            let closed = line.matches(')').count();
            self.depth = (self.depth + opened).checked_sub(closed).ok_or_else(|| {
                RouteError::Format(format!(
                    "mehr schließende als öffnende Klammern in {}",
                    self.path.display()
                ))
            })?;
        }
        Ok(())
    }

    /// Schließt offene Klammern und liefert den fertigen Text.
    pub fn into_text(mut self) -> RouteResult<String> {
        while self.depth > 0 {
            self.write(")")?;
        }
        Ok(match self.line_ending {
            LineEnding::Lf => self.buffer,
            LineEnding::Crlf => self.buffer.replace('\n', self.line_ending.as_str()),
        })
    }

    /// Schließt offene Klammern und schreibt die Datei.
    pub fn finish(self) -> RouteResult<()> {
        let path = self.path.clone();
        let text = self.into_text()?;
        std::fs::write(&path, encode_utf16_bom(&text))?;
        log::debug!("STF-Datei geschrieben: {}", path.display());
        Ok(())
    }
}

/// UTF-16LE mit vorangestellter BOM
pub fn encode_utf16_bom(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 + text.len() * 2);
    bytes.extend_from_slice(&[0xFF, 0xFE]);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

//! Abschnittskatalog `tsection.dat`.
//!
//! Jeder Bogen erhält zwei Einträge (links und rechts gekrümmt), damit die
//! Pfad-Indizes aus [`RouteWriter::section_index`] auf beide Richtungen passen.

use anyhow::{Context, Result};

use super::world::track_section;
use super::{RouteWriter, StfOutput};
use crate::shared::options::FIRST_SECTION_INDEX;

impl RouteWriter<'_> {
    /// Schreibt `tsection.dat` mit allen Segmenten des Graphen.
    pub fn write_tsection_file(&self) -> Result<()> {
        let path = self.directory().join("tsection.dat");
        let mut f = StfOutput::create(&path, "T", self.options().line_ending);

        f.write(&format!("TrackSections ( {}", 2 * self.sections.len()))?;
        for (segment_ref, index) in self.sections.iter() {
            let segment = self.segment_or_err(segment_ref)?;
            let base = 2 * (index - FIRST_SECTION_INDEX / 2);
            if segment.is_straight() {
                f.write(&track_section(0, base, segment.length, 0.0))?;
            } else {
                let angle = (segment.length / segment.radius).abs();
                let radius = segment.radius.abs();
                f.write(&track_section(1, base, -angle, radius))?;
                f.write(&track_section(1, base + 1, angle, radius))?;
            }
        }

        f.write(&format!(")\nSectionIdx ( {}", self.sections.len()))?;
        for (segment_ref, index) in self.sections.iter() {
            f.write(&format!(
                "TrackPath ( {} 1 {} )",
                index,
                self.section_index_or_err(segment_ref)?
            ))?;
        }
        f.write(")")?;
        f.finish()
            .with_context(|| format!("tsection.dat nicht schreibbar: {}", path.display()))?;
        Ok(())
    }
}

//! Pfad-Dateien (`paths/<name>.pat`) für Fahrten im Simulator.

use anyhow::{Context, Result};

use super::format::fmt_repr;
use super::{RouteWriter, StfOutput};
use crate::core::Path;
use crate::error::RouteError;
use crate::shared::options::UNDEFINED;
use crate::shared::Vector;

/// Ein Wegpunkt des Pfads
#[derive(Debug, Clone, Copy)]
struct Location {
    pos: Vector,
    /// Lage-Flags des PDP: `1 1` für Knoten auf dem Gleis, `2 0` für Zwischenpunkte
    pdp_flags: &'static str,
    /// Flags des Pfadknotens (`00000004` = Zwischenpunkt auf Parallelgleis)
    node_flags: &'static str,
}

impl RouteWriter<'_> {
    /// Schreibt einen Pfad nach `paths/<file>.pat`.
    ///
    /// Der Startversatz des Pfads überspringt Kanten, die vollständig davor
    /// liegen. Führen von einem Knoten mehrere Kanten zum selben Nachbarn,
    /// erhält die befahrene Kante einen Zwischenpunkt in der Mitte.
    pub fn write_path_file(
        &self,
        file: &str,
        name: &str,
        start_name: &str,
        end_name: &str,
        path: &Path,
    ) -> Result<()> {
        let Some(last) = path.last() else {
            return Err(RouteError::EmptyPath.into());
        };

        let mut locations = Vec::new();
        let mut started = false;
        let mut offset = path.start_offset;
        for &end in path {
            let length = self.graph.edge_length(end.edge);
            if !started && offset > length {
                offset -= length;
                continue;
            }
            locations.push(Location {
                pos: self.graph.end_travel(end, offset).pos,
                pdp_flags: if started { "2 0" } else { "1 1" },
                node_flags: "00000000",
            });

            let next_node = self.graph.end_node(end.other_end());
            let parallel = self
                .graph
                .node_ends(self.graph.end_node(end))
                .into_iter()
                .any(|other| other != end && self.graph.end_node(other.other_end()) == next_node);
            if parallel {
                locations.push(Location {
                    pos: self.graph.end_travel(end, length / 2.0).pos,
                    pdp_flags: "1 1",
                    node_flags: "00000004",
                });
            }
            started = true;
            offset = 0.0;
        }
        locations.push(Location {
            pos: self.graph.end_pose(last.other_end()).pos,
            pdp_flags: "1 1",
            node_flags: "00000000",
        });

        // PDPs mit `2 0` zuerst; `perm[i]` = Position des i-ten Wegpunkts in der PDP-Liste
        let mut order: Vec<usize> = (0..locations.len()).collect();
        order.sort_by(|a, b| locations[*b].pdp_flags.cmp(locations[*a].pdp_flags));
        let mut perm = vec![0; locations.len()];
        for (pdp, original) in order.iter().enumerate() {
            perm[*original] = pdp;
        }

        let directory = self.ensure_directory("paths")?;
        let file_path = directory.join(format!("{}.pat", file));
        let mut f = StfOutput::create(&file_path, "P", self.options().line_ending);
        f.write("Serial ( 1 )")?;
        f.write("TrackPDPs (")?;
        for original in &order {
            let location = locations[*original];
            let world = self.pos2world(location.pos, 0.0, None);
            f.write(&format!(
                "TrackPDP ( {} {} {} {} {} {} )",
                world.tile_x,
                world.tile_z,
                fmt_repr(world.x),
                fmt_repr(world.y),
                fmt_repr(world.z),
                location.pdp_flags
            ))?;
        }
        f.write(")")?;
        f.write(&format!(
            "TrackPath (\nTrPathName ( \"{}\" )\nName ( \"{}\" )\nTrPathStart ( \"{}\" )\nTrPathEnd ( \"{}\" )\nTrPathNodes ( {}",
            file,
            name,
            start_name,
            end_name,
            locations.len()
        ))?;
        for (index, location) in locations.iter().enumerate() {
            let next = if index + 1 < locations.len() {
                (index + 1).to_string()
            } else {
                UNDEFINED.to_string()
            };
            f.write(&format!(
                "TrPathNode ( {} {} {} {} )",
                location.node_flags, next, UNDEFINED, perm[index]
            ))?;
        }
        f.write(")\n)")?;
        f.finish()
            .with_context(|| format!("Pfad-Datei nicht schreibbar: {}", file_path.display()))?;
        log::info!("Pfad '{}' mit {} Wegpunkten geschrieben", name, locations.len());
        Ok(())
    }
}

//! Track-Datenbank (`<route>.tdb`): Knoten, Vektorknoten und Signal-Items.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use anyhow::{Context, Result};

use super::format::{fmt_g, fmt_repr};
use super::{RouteWriter, StfOutput};
use crate::core::{EdgeId, End, NodeId, SceneryId, SceneryOwner, SegmentRef};
use crate::error::{RouteError, RouteResult};
use crate::shared::{angle_between, Pose};
use crate::tiles::{TdbEntry, WorldObject};

impl RouteWriter<'_> {
    /// Schreibt `<route>.tdb`.
    ///
    /// Knoten müssen Grad 1 (Endknoten) oder mindestens 3 (Weiche) haben.
    pub fn write_tdb(&self) -> Result<()> {
        let path = self.directory().join(format!("{}.tdb", self.base_name()));
        let mut f = StfOutput::create(&path, "T", self.options().line_ending);

        f.write(&format!(
            "TrackDB (\n Serial ( 0 ) \n TrackNodes ( {}",
            self.tdb.len()
        ))?;
        for (entry, index) in self.tdb.iter() {
            f.write(&format!("TrackNode ( {}", index))?;
            match entry {
                TdbEntry::Node(node) => self.write_track_node(&mut f, node)?,
                TdbEntry::Edge(edge) => self.write_vector_node(&mut f, edge)?,
            }
        }
        f.write(")")?;

        if !self.tr_items.is_empty() {
            f.write(&format!("TrItemTable ( {}", self.tr_items.len()))?;
            for (object, index) in self.tr_items.iter() {
                f.write(&self.signal_item(object, index)?)?;
            }
        }
        f.finish()
            .with_context(|| format!("Track-Datenbank nicht schreibbar: {}", path.display()))?;
        Ok(())
    }

    fn write_track_node(&self, f: &mut StfOutput, node: NodeId) -> RouteResult<()> {
        let degree = self.graph[node].degree();
        if degree != 1 && degree < 3 {
            return Err(RouteError::topology(format!(
                "Knoten {} hat Grad {}, erlaubt sind 1 oder mindestens 3",
                node, degree
            )));
        }
        let ends = self.graph.node_ends(node);
        let Some(&end) = ends.last() else {
            return Err(RouteError::topology(format!("Knoten {} ohne Kanten", node)));
        };
        let primary = self.graph.end_segment(end).ok_or_else(|| {
            RouteError::topology(format!("Kante {} am Knoten {} ohne Segmente", end.edge, node))
        })?;

        if degree == 1 {
            f.write("TrEndNode ( 0 )")?;
        } else {
            f.write(&format!(
                "TrJunctionNode ( 0 {} 0)",
                self.segment_index_or_err(primary)?
            ))?;
        }
        f.write(&format!(
            "UiD ( {} )",
            self.uid(primary, self.graph.end_pose(end), "1")?
        ))?;
        f.write(&format!("TrPins ( 1 {}", ends.len() - 1))?;
        for end in &ends {
            f.write(&format!(
                "TrPin ( {} {} )",
                self.tdb_edge_index(end.edge)?,
                end.side.pin()
            ))?;
        }
        f.write(")\n)")
    }

    fn write_vector_node(&self, f: &mut StfOutput, edge_id: EdgeId) -> RouteResult<()> {
        let edge = &self.graph[edge_id];
        f.write("TrVectorNode (")?;
        f.write(&format!("TrVectorSections ( {}", edge.segments.len()))?;
        for (index, segment) in edge.segments.iter().enumerate() {
            let segment_ref = SegmentRef::new(edge_id, index);
            f.write(&format!(
                "{} {} {}",
                self.section_index_or_err(segment_ref)?,
                self.segment_index_or_err(segment_ref)?,
                self.uid(segment_ref, segment.start, "0 1 00")?
            ))?;
        }
        f.write(")")?;

        let items: Vec<u32> = edge
            .scenery()
            .iter()
            .filter_map(|object| self.tr_item_id(*object))
            .collect();
        if !items.is_empty() {
            f.write(&format!("TrItemRefs ( {}", items.len()))?;
            for item in items {
                f.write(&format!("TrItemRef ( {} )", item))?;
            }
            f.write(")")?;
        }
        f.write(")")?;

        f.write("TrPins ( 1 1")?;
        for end in [End::source(edge_id), End::target(edge_id)] {
            let node = self.graph.end_node(end);
            let is_tip = self.graph.node_ends(node).first() == Some(&end);
            f.write(&format!(
                "TrPin ( {} {} )",
                self.tdb_node_index(node)?,
                u8::from(is_tip)
            ))?;
        }
        f.write(")\n)")
    }

    /// Weltreferenz eines Segments: Platzierung in der Welt-Datei plus Pose.
    fn uid(&self, segment: SegmentRef, pose: Pose, reserved: &str) -> RouteResult<String> {
        let (world_tile, world_index) = self
            .world_tile_and_index(WorldObject::Segment(segment))
            .ok_or_else(|| {
                RouteError::topology(format!("Segment {} fehlt in den Welt-Dateien", segment))
            })?;
        let world = self.pos2world(pose.pos, 0.0, None);
        let direction = (-pose.direction - FRAC_PI_2).rem_euclid(TAU) - PI;
        Ok(format!(
            "{} {} {} {} {} {} {} {} {} 0 {} 0",
            world_tile.0,
            world_tile.1,
            world_index,
            reserved,
            world.tile_x,
            world.tile_z,
            fmt_g(world.x),
            fmt_g(world.y),
            fmt_g(world.z),
            fmt_g(direction)
        ))
    }

    /// `SignalItem` eines kantenbezogenen Signals.
    fn signal_item(&self, id: SceneryId, index: u32) -> RouteResult<String> {
        let object = &self.graph[id];
        let SceneryOwner::Edge(edge) = object.owner() else {
            return Err(RouteError::topology(format!(
                "Signal {} muss an einer Kante hängen",
                id
            )));
        };
        let s = object.pose.pos.x;
        let reference = self.graph.edge_travel(edge, s);
        let world = self.pos2world(reference.pos, 0.0, None);
        let global = self.graph.scenery_global_pose(id);
        let same_direction =
            angle_between(reference.direction, global.direction).abs() <= FRAC_PI_2;
        let signal_type = object
            .attrs
            .signal_type
            .as_deref()
            .unwrap_or(&self.options().default_signal_type);

        Ok(format!(
            "SignalItem (\nTrItemId ( {} )\nTrItemSData ( {} 00000002 )\nTrItemRData ( {} {} {} {} {})\nTrSignalType ( 00000000 {} 1.8310872 {} )\n)",
            index,
            fmt_repr(s),
            fmt_repr(world.x),
            fmt_repr(world.y),
            fmt_repr(world.z),
            world.tile_x,
            world.tile_z,
            u8::from(same_direction),
            signal_type
        ))
    }
}

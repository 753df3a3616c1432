//! Welt-Dateien (`world/w±XXXXXX±ZZZZZZ.w`): Gleisstücke, statische Objekte, Signale.

use anyhow::{Context, Result};

use super::format::fmt_g;
use super::{Facing, RouteWriter, StfOutput};
use crate::core::{EdgeSegment, SceneryId, SceneryObject, SegmentRef};
use crate::error::{RouteError, RouteResult};
use crate::shared::options::{DYNTRACK_Z_OFFSET, UNDEFINED};
use crate::shared::Pose;
use crate::tiles::WorldObject;

const STATIC_FLAG_BASE: u32 = 0x0001_0000;
const STATIC_FLAG_ANIMATED: u32 = 0x0008_0000;

/// Ein `TrackSection`-Eintrag (Dyntrack und tsection.dat teilen das Format).
pub(super) fn track_section(curved: u8, section: u32, a: f64, b: f64) -> String {
    format!(
        "      TrackSection (\n        SectionCurve ( {} ) {} {} {} \n      )\n",
        curved,
        section,
        fmt_g(a),
        fmt_g(b)
    )
}

fn empty_section(curved: u8) -> String {
    track_section(curved, UNDEFINED, 0.0, 0.0)
}

fn static_flags(object: &SceneryObject, with_classification: bool) -> u32 {
    let mut flags = STATIC_FLAG_BASE;
    if object.attrs.animated {
        flags |= STATIC_FLAG_ANIMATED;
    }
    if with_classification {
        flags |= (object.attrs.classification & 7) << 24;
    }
    flags
}

impl RouteWriter<'_> {
    /// Schreibt je Kachel eine Welt-Datei und kopiert die Terrain-Vorlagen.
    pub fn write_world_files(&self) -> Result<()> {
        self.ensure_directory("world")?;
        self.ensure_directory("tiles")?;
        let template = self.template_folder();

        for (tile, objects) in self.world().iter() {
            let path = self.world_file_name(tile);
            let mut f = StfOutput::create(&path, "w", self.options().line_ending);
            f.write("Tr_Worldfile (")?;
            for (object, uid) in objects.iter() {
                match object {
                    WorldObject::Segment(segment) => self.write_dyntrack(&mut f, segment, uid)?,
                    WorldObject::Scenery(id) => self.write_scenery_object(&mut f, id, uid)?,
                }
            }
            f.write(")\n")?;
            f.finish()
                .with_context(|| format!("Welt-Datei nicht schreibbar: {}", path.display()))?;

            if let Some(template) = &template {
                let (tile_t, tile_raw) = self.tile_file_names(tile);
                let source = template.join("tiles");
                std::fs::copy(source.join("template.t"), &tile_t)
                    .with_context(|| format!("Terrain-Vorlage fehlt für {}", tile_t.display()))?;
                std::fs::copy(source.join("template_y.raw"), &tile_raw).with_context(|| {
                    format!("Höhen-Vorlage fehlt für {}", tile_raw.display())
                })?;
            }
        }
        log::debug!("{} Welt-Dateien geschrieben", self.world().len());
        Ok(())
    }

    fn write_dyntrack(&self, f: &mut StfOutput, segment_ref: SegmentRef, uid: u32) -> RouteResult<()> {
        let segment = self.segment_or_err(segment_ref)?;
        let section = self.section_index_or_err(segment_ref)?;
        let raw_index = self.segment_index_or_err(segment_ref)?;

        let mut text = format!("Dyntrack (\nUiD ( {} )\nTrackSections (\n", uid);
        if segment.is_straight() {
            text.push_str(&track_section(0, section, segment.length, 0.0));
            text.push_str(&empty_section(1));
        } else {
            text.push_str(&empty_section(0));
            text.push_str(&track_section(
                1,
                section,
                segment.length / segment.radius,
                segment.radius.abs(),
            ));
        }
        text.push_str(&empty_section(0));
        text.push_str(&empty_section(1));
        text.push_str(&empty_section(0));
        text.push_str(&format!(
            "    )\n    SectionIdx ( {} )\n    Elevation ( 0 )\n    CollideFlags ( 39 )\n    StaticFlags ( 00100000 )\n{}\n    VDbId ( {} )\n  )\n",
            raw_index,
            self.position_and_qdirection(segment.start, DYNTRACK_Z_OFFSET, Facing::Y),
            UNDEFINED
        ));
        f.write(&text)
    }

    fn write_scenery_object(&self, f: &mut StfOutput, id: SceneryId, uid: u32) -> RouteResult<()> {
        let object = &self.graph[id];
        if !object.render {
            return Ok(());
        }
        let pose = self.graph.scenery_global_pose(id);
        if object.is_signal() {
            self.write_signal(f, object, pose, id, uid)
        } else {
            self.write_static(f, object, pose, uid)
        }
    }

    fn write_static(
        &self,
        f: &mut StfOutput,
        object: &SceneryObject,
        pose: Pose,
        uid: u32,
    ) -> RouteResult<()> {
        let text = format!(
            "Static (\nUiD ( {} )\nFileName ( {} )\nStaticFlags ( {:8x} )\n{}\nVDbId ( {} )\n )\n",
            uid,
            shapefile_or_default(
                object,
                &format!("{}.s", object.name.as_deref().unwrap_or(object.kind.as_str()))
            ),
            static_flags(object, true),
            self.position_and_qdirection(pose, object.attrs.z, Facing::X),
            UNDEFINED
        );
        f.write(&text)
    }

    fn write_signal(
        &self,
        f: &mut StfOutput,
        object: &SceneryObject,
        pose: Pose,
        id: SceneryId,
        uid: u32,
    ) -> RouteResult<()> {
        let item = self.tr_item_id(id).ok_or_else(|| {
            RouteError::topology(format!("Signal {} ohne Track-Item-ID", id))
        })?;
        let text = format!(
            "Signal (\n    UiD ( {} )\n    FileName ( {} )\n    StaticFlags ( {:8x} )\n    {}\n    VDbId ( {} )\n    SignalSubObj ( 00000001 )\n    SignalUnits ( 1 \n        SignalUnit ( 0\n            TrItemId ( 0 {} )\n        )\n    )\n)\n",
            uid,
            shapefile_or_default(object, "Signal.s"),
            static_flags(object, false),
            self.position_and_qdirection(pose, 0.0, Facing::NegY),
            UNDEFINED,
            item
        );
        f.write(&text)
    }

    /// `Position` und `QDirection` einer Pose in Weltkoordinaten.
    pub(super) fn position_and_qdirection(&self, pose: Pose, z: f64, facing: Facing) -> String {
        let world = self.pos2world(pose.pos, z, None);
        let half = pose.direction / 2.0 - facing.offset();
        format!(
            "    Position ( {} {} {} )\n    QDirection ( 0 {} 0 {} )",
            fmt_g(world.x),
            fmt_g(world.y),
            fmt_g(world.z),
            fmt_g(half.sin()),
            fmt_g(half.cos())
        )
    }

    pub(super) fn segment_or_err(&self, segment: SegmentRef) -> RouteResult<&EdgeSegment> {
        self.graph
            .segment(segment)
            .ok_or_else(|| RouteError::topology(format!("Segment {} existiert nicht", segment)))
    }
}

fn shapefile_or_default(object: &SceneryObject, fallback: &str) -> String {
    object
        .attrs
        .shapefile
        .clone()
        .unwrap_or_else(|| fallback.to_string())
}

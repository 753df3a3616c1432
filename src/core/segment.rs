//! Kantensegmente: Gerade oder Kreisbogen mit konstantem Radius.
//!
//! Vorzeichen des Radius: `< 0` Linksbogen, `0` Gerade, `> 0` Rechtsbogen.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::shared::{polar, Pose, Vector, VectorExt};

/// Ein Stück Kantengeometrie.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSegment {
    /// Startpose, Blickrichtung entlang des Segments
    pub start: Pose,
    /// Länge (≥ 0)
    pub length: f64,
    /// Vorzeichenbehafteter Radius
    pub radius: f64,
}

impl EdgeSegment {
    pub fn new(start: Pose, length: f64, radius: f64) -> Self {
        Self {
            start,
            length,
            radius,
        }
    }

    /// Gerades Segment.
    pub fn straight(start: Pose, length: f64) -> Self {
        Self::new(start, length, 0.0)
    }

    pub fn is_straight(&self) -> bool {
        self.radius == 0.0
    }

    /// Mittelpunkt des Kreises, dem das Segment folgt.
    pub fn center(&self) -> Vector {
        self.start.pos + polar(self.start.direction - FRAC_PI_2, self.radius)
    }

    /// Pose nach Strecke `s` ab dem Start. Über die Länge hinaus wird extrapoliert.
    pub fn travel(&self, s: f64) -> Pose {
        if self.is_straight() {
            return Pose::new(
                self.start.pos + polar(self.start.direction, s),
                self.start.direction,
            );
        }
        let angle = s / self.radius;
        let beta = self.start.direction + FRAC_PI_2 - angle;
        Pose::new(
            self.center() + polar(beta, self.radius),
            self.start.direction - angle,
        )
    }

    /// Endpose, Blickrichtung zurück zum Start.
    pub fn end(&self) -> Pose {
        self.travel(self.length).reverse()
    }

    /// Kehrt die Laufrichtung um.
    pub fn flip(&mut self) {
        self.start = self.end();
        self.radius = -self.radius;
    }

    /// Umgekehrte Kopie.
    pub fn flipped(&self) -> Self {
        let mut segment = *self;
        segment.flip();
        segment
    }

    /// Transformiert eine segment-lokale Pose (x = Weg ab `offset`, y = Querabstand nach links).
    ///
    /// Liefert `None`, wenn x vor dem Start bzw. hinter dem Ende liegt und
    /// dort nicht extrapoliert werden darf.
    pub fn to_global(
        &self,
        local: Pose,
        offset: f64,
        extend_before: bool,
        extend_after: bool,
    ) -> Option<Pose> {
        let x = local.pos.x - offset;
        let y = local.pos.y;
        if x < 0.0 && !extend_before {
            return None;
        }
        if x > self.length && !extend_after {
            return None;
        }
        let q = self.travel(x);
        let p = q.pos + q.heading().ortho() * y;
        Some(Pose::new(p, local.direction + q.direction))
    }

    /// Umkehrung von [`EdgeSegment::to_global`].
    pub fn to_local(
        &self,
        global: Pose,
        offset: f64,
        extend_before: bool,
        extend_after: bool,
    ) -> Option<Pose> {
        let mut origin = self.start;
        let mut offset = offset;

        if !self.is_straight() {
            let c = self.center();
            let rel = global.pos - c;
            let d = rel.length();
            let (y, angle) = if self.radius > 0.0 {
                (
                    d - self.radius,
                    (self.start.direction + FRAC_PI_2 - rel.alpha()).rem_euclid(TAU),
                )
            } else {
                (
                    -self.radius - d,
                    (rel.alpha() + FRAC_PI_2 - self.start.direction).rem_euclid(TAU),
                )
            };
            let s = angle * self.radius.abs();
            if s <= self.length {
                let direction = if self.radius >= 0.0 {
                    global.direction - self.start.direction + angle
                } else {
                    global.direction - self.start.direction - angle
                };
                return Some(Pose::new(Vector::new(offset + s, y), direction));
            }

            // Außerhalb des Bogens: näher am Start oder am Ende?
            if angle >= PI + 0.5 * self.length / self.radius.abs() {
                if !extend_before {
                    return None;
                }
            } else {
                if !extend_after {
                    return None;
                }
                origin = self.travel(self.length);
                offset += self.length;
            }
        }

        let local = origin.to_local(global);
        let x = local.pos.x;
        if x < 0.0 && !extend_before {
            return None;
        }
        if x > self.length && !extend_after {
            return None;
        }
        Some(Pose::new(
            Vector::new(x + offset, local.pos.y),
            local.direction,
        ))
    }
}

// ── Segmentketten ───────────────────────────────────────────────────

/// Gesamtlänge einer Segmentkette.
pub fn chain_length(segments: &[EdgeSegment]) -> f64 {
    segments.iter().map(|segment| segment.length).sum()
}

/// Pose nach Strecke `s` entlang einer Segmentkette.
pub fn chain_travel(segments: &[EdgeSegment], s: f64) -> Option<Pose> {
    let (last, init) = segments.split_last()?;
    let mut s = s;
    for segment in init {
        if s <= segment.length {
            return Some(segment.travel(s));
        }
        s -= segment.length;
    }
    Some(last.travel(s))
}

/// Lokal → global über eine Segmentkette. Nur das erste Segment extrapoliert
/// nach vorne, nur das letzte nach hinten.
pub fn chain_to_global(
    segments: &[EdgeSegment],
    local: Pose,
    offset: f64,
    extend_before: bool,
    extend_after: bool,
) -> Option<Pose> {
    let last = segments.len().checked_sub(1)?;
    let mut offset = offset;
    for (idx, segment) in segments.iter().enumerate() {
        let transformed = segment.to_global(
            local,
            offset,
            extend_before && idx == 0,
            extend_after && idx == last,
        );
        if transformed.is_some() {
            return transformed;
        }
        offset += segment.length;
    }
    None
}

/// Global → lokal über eine Segmentkette.
pub fn chain_to_local(
    segments: &[EdgeSegment],
    global: Pose,
    offset: f64,
    extend_before: bool,
    extend_after: bool,
) -> Option<Pose> {
    let last = segments.len().checked_sub(1)?;
    let mut offset = offset;
    for (idx, segment) in segments.iter().enumerate() {
        let transformed = segment.to_local(
            global,
            offset,
            extend_before,
            extend_after && idx == last,
        );
        if transformed.is_some() {
            return transformed;
        }
        offset += segment.length;
    }
    None
}

/// Kehrt eine Segmentkette um (Reihenfolge und Laufrichtung).
pub fn chain_flipped(segments: &[EdgeSegment]) -> Vec<EdgeSegment> {
    segments.iter().rev().map(EdgeSegment::flipped).collect()
}

//! 2D-Geometrie: Vektoren und Posen in der Ebene.
//!
//! Vektoren sind `glam::DVec2`; `VectorExt` ergänzt die Operationen, die der
//! Routenbau braucht (Orthogonale, Richtungswinkel, Kreuzprodukt).

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{RouteError, RouteResult};

/// 2D-Vektor (x, y). Kopien sind explizit, da `DVec2: Copy`.
pub type Vector = DVec2;

/// Ergänzende Operationen auf `Vector`.
pub trait VectorExt: Sized {
    /// Richtung des Vektors, gegen den Uhrzeigersinn ab der X-Achse (Radiant)
    fn alpha(self) -> f64;
    /// Orthogonaler Vektor (-y, x)
    fn ortho(self) -> Self;
    /// Z-Komponente des Kreuzprodukts
    fn cross(self, other: Self) -> f64;
    /// Normierter Vektor; schlägt für die Länge 0 fehl
    fn norm(self) -> RouteResult<Self>;
}

impl VectorExt for Vector {
    fn alpha(self) -> f64 {
        self.y.atan2(self.x)
    }

    fn ortho(self) -> Self {
        self.perp()
    }

    fn cross(self, other: Self) -> f64 {
        self.perp_dot(other)
    }

    fn norm(self) -> RouteResult<Self> {
        let length = self.length();
        if length == 0.0 {
            return Err(RouteError::DivisionByZero("Nullvektor kann nicht normiert werden"));
        }
        Ok(self / length)
    }
}

/// Vektor mit gegebener Richtung und Länge.
pub fn polar(alpha: f64, length: f64) -> Vector {
    Vector::from_angle(alpha) * length
}

/// Winkeldifferenz `beta - alpha`, normiert auf [-π, π).
pub fn angle_between(alpha: f64, beta: f64) -> f64 {
    (beta - alpha + PI).rem_euclid(TAU) - PI
}

/// Position plus Richtung. Die Richtung liegt immer in [0, 2π).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub pos: Vector,
    pub direction: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vector::ZERO, 0.0)
    }
}

impl Pose {
    pub fn new(pos: Vector, direction: f64) -> Self {
        Self {
            pos,
            direction: direction.rem_euclid(TAU),
        }
    }

    /// Pose ohne Drehung am gegebenen Punkt.
    pub fn at(pos: Vector) -> Self {
        Self::new(pos, 0.0)
    }

    /// Gleiche Position, Richtung um π gedreht.
    pub fn reverse(&self) -> Self {
        Self::new(self.pos, self.direction + PI)
    }

    /// Einheitsvektor in Blickrichtung.
    pub fn heading(&self) -> Vector {
        polar(self.direction, 1.0)
    }

    /// Transformiert eine Pose aus dem lokalen System dieser Pose ins globale System.
    pub fn to_global(&self, local: Pose) -> Pose {
        Pose::new(
            self.point_to_global(local.pos),
            self.direction + local.direction,
        )
    }

    /// Transformiert einen Punkt aus dem lokalen System dieser Pose ins globale System.
    pub fn point_to_global(&self, local: Vector) -> Vector {
        let vx = self.heading();
        let vy = vx.ortho();
        self.pos + local.x * vx + local.y * vy
    }

    /// Transformiert eine globale Pose in das lokale System dieser Pose.
    pub fn to_local(&self, global: Pose) -> Pose {
        Pose::new(
            self.point_to_local(global.pos),
            global.direction - self.direction,
        )
    }

    /// Transformiert einen globalen Punkt in das lokale System dieser Pose.
    pub fn point_to_local(&self, global: Vector) -> Vector {
        let vx = self.heading();
        let vy = vx.ortho();
        let p = global - self.pos;
        Vector::new(p.dot(vx), p.dot(vy))
    }
}

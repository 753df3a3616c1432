//! Bi-Arc-Interpolation: zwei tangentenstetige Kreisbögen zwischen zwei Posen.
//!
//! Vorgehen nach <https://www.ryanjuckett.com/biarc-interpolation/>.

use std::f64::consts::{PI, TAU};

use super::geometry::{Vector, VectorExt};

/// Ergebnis einer Bi-Arc-Interpolation.
///
/// Die Winkel sind gegen den Uhrzeigersinn gemessen. Ein nicht endlicher
/// Radius bedeutet, dass der Bogen zur Geraden entartet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiArc {
    /// Radius des ersten Bogens (ab p1)
    pub r1: f64,
    /// Überstrichener Winkel des ersten Bogens
    pub theta1: f64,
    /// Radius des zweiten Bogens (ab p2)
    pub r2: f64,
    /// Überstrichener Winkel des zweiten Bogens
    pub theta2: f64,
}

/// Verbindet p1 und p2 durch zwei Kreisbögen.
///
/// - `t1`: Einheitstangente in p1, entlang des Bi-Arcs
/// - `t2`: Einheitstangente in p2, vom Bi-Arc weg
///
/// Sind die Tangenten gleich gerichtet und steht die Sehne senkrecht darauf,
/// wird die Sehne halbiert und jeder Bogen ist ein Halbkreis. Das Vorzeichen
/// folgt dem Kreuzprodukt von Sehne und `t2`, in derselben Konvention wie im
/// allgemeinen Fall (gleiches Vorzeichen = S-Kurve).
pub fn biarc_interpolation(p1: Vector, t1: Vector, p2: Vector, t2: Vector) -> BiArc {
    let v = p2 - p1;
    let t = t1 + t2;
    let vt = v.dot(t);
    let one_minus_cos = 1.0 - t1.dot(t2);
    let denominator = 2.0 * one_minus_cos;

    let d = if denominator == 0.0 {
        if vt == 0.0 {
            let radius = 0.25 * v.length();
            let sweep = if v.cross(t2) < 0.0 { PI } else { -PI };
            return BiArc {
                r1: radius,
                theta1: sweep,
                r2: radius,
                theta2: sweep,
            };
        }
        0.5 * v.dot(v) / vt
    } else {
        (-vt + (vt * vt + 2.0 * one_minus_cos * v.dot(v)).sqrt()) / denominator
    };

    let pm = 0.5 * (p1 + p2 + d * (t1 - t2));
    let (r1, theta1) = arc_to_join(p1, t1, pm, d);
    let (r2, theta2) = arc_to_join(p2, t2, pm, d);
    BiArc {
        r1,
        theta1,
        r2,
        theta2,
    }
}

/// Radius und Winkel des Bogens von `p` (Tangente `tangent`) zum Verbindungspunkt `pm`.
fn arc_to_join(p: Vector, tangent: Vector, pm: Vector, d: f64) -> (f64, f64) {
    let n = tangent.ortho();
    let chord = pm - p;
    let projection = n.dot(chord);
    if projection == 0.0 {
        // Verbindungspunkt liegt auf der Tangente
        return (f64::INFINITY, 0.0);
    }

    let s = chord.dot(chord) / (2.0 * projection);
    let center = p + s * n;
    let r = s.abs();
    let op = (p - center) / r;
    let om = (pm - center) / r;

    let mut theta = op.dot(om).clamp(-1.0, 1.0).acos();
    if d <= 0.0 {
        theta -= TAU;
    }
    if op.cross(om) <= 0.0 {
        theta = -theta;
    }
    (r, theta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn parallel_tangents_give_symmetric_s_curve() {
        let arc = biarc_interpolation(
            Vector::ZERO,
            Vector::X,
            Vector::new(100.0, 20.0),
            Vector::X,
        );
        let expected_theta = (12.0_f64 / 13.0).acos();

        assert_abs_diff_eq!(arc.r1, 130.0, epsilon = 1e-9);
        assert_abs_diff_eq!(arc.r2, 130.0, epsilon = 1e-9);
        assert_abs_diff_eq!(arc.theta1, expected_theta, epsilon = 1e-9);
        assert_abs_diff_eq!(arc.theta2, expected_theta, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_case_splits_chord_in_half_circles() {
        let arc = biarc_interpolation(
            Vector::ZERO,
            Vector::X,
            Vector::new(0.0, 100.0),
            Vector::X,
        );
        assert_abs_diff_eq!(arc.r1, 25.0, epsilon = 1e-12);
        assert_abs_diff_eq!(arc.r2, 25.0, epsilon = 1e-12);
        assert_eq!(arc.theta1, PI);
        assert_eq!(arc.theta2, PI);

        let mirrored = biarc_interpolation(
            Vector::ZERO,
            Vector::X,
            Vector::new(0.0, -100.0),
            Vector::X,
        );
        assert_eq!(mirrored.theta1, -PI);
        assert_eq!(mirrored.theta2, -PI);
    }

    #[test]
    fn quarter_turn_is_single_circle() {
        // Viertelkreis mit Radius 10 um (0, 10): beide Bögen teilen den Mittelpunkt
        let arc = biarc_interpolation(
            Vector::ZERO,
            Vector::X,
            Vector::new(10.0, 10.0),
            Vector::Y,
        );
        assert_abs_diff_eq!(arc.r1, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(arc.r2, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(arc.theta1 - arc.theta2, std::f64::consts::FRAC_PI_2, epsilon = 1e-9);
    }
}

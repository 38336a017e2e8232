use crate::error::Result;
use crate::geometry::curve::{Arc, Curve, DrawCurve, LineSegment};
use crate::math::intersect_2d::{
    angular_overlaps, arc_arc_intersect_2d, segment_arc_intersect_2d,
    segment_segment_intersect_2d,
};
use crate::math::{Interval, Point3, TOLERANCE};

/// A single result of a curve-curve intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntersectionEvent {
    /// A transversal or touching point.
    Point {
        /// The intersection point.
        point: Point3,
        /// Parameter on the first curve.
        t_a: f64,
        /// Parameter on the second curve.
        t_b: f64,
    },
    /// A run where both curves coincide within tolerance.
    Overlap {
        /// Coincident range on the first curve.
        a: Interval,
        /// Coincident range on the second curve.
        b: Interval,
    },
}

impl IntersectionEvent {
    /// Returns whether this event is an overlap.
    #[must_use]
    pub fn is_overlap(&self) -> bool {
        matches!(self, Self::Overlap { .. })
    }

    fn shifted(self, offset_a: f64, offset_b: f64) -> Self {
        match self {
            Self::Point { point, t_a, t_b } => Self::Point {
                point,
                t_a: t_a + offset_a,
                t_b: t_b + offset_b,
            },
            Self::Overlap { a, b } => Self::Overlap {
                a: Interval::new(a.min() + offset_a, a.max() + offset_a),
                b: Interval::new(b.min() + offset_b, b.max() + offset_b),
            },
        }
    }

    fn swapped(self) -> Self {
        match self {
            Self::Point { point, t_a, t_b } => Self::Point {
                point,
                t_a: t_b,
                t_b: t_a,
            },
            Self::Overlap { a, b } => Self::Overlap { a: b, b: a },
        }
    }
}

/// Computes intersections between two drawing curves.
///
/// Coincident runs are detected exactly in 3D for line/line and arc/arc
/// pairs. Crossing points are computed in the XY drawing plane.
pub struct CurveCurveIntersect<'a> {
    curve_a: &'a DrawCurve,
    curve_b: &'a DrawCurve,
    tolerance: f64,
}

/// An elementary piece of a drawing curve.
enum Piece<'a> {
    Line(LineSegment),
    Arc(&'a Arc),
}

fn pieces(curve: &DrawCurve) -> Vec<(f64, Piece<'_>)> {
    match curve {
        DrawCurve::Line(line) => vec![(0.0, Piece::Line(line.clone()))],
        DrawCurve::Arc(arc) => vec![(0.0, Piece::Arc(arc))],
        DrawCurve::Polyline(pl) => pl
            .segments()
            .filter(|(_, seg)| !seg.is_degenerate())
            .map(|(offset, seg)| (offset, Piece::Line(seg)))
            .collect(),
    }
}

impl<'a> CurveCurveIntersect<'a> {
    /// Creates a new `CurveCurveIntersect` query.
    #[must_use]
    pub fn new(curve_a: &'a DrawCurve, curve_b: &'a DrawCurve, tolerance: f64) -> Self {
        Self {
            curve_a,
            curve_b,
            tolerance,
        }
    }

    /// Executes the query, returning all intersection events.
    ///
    /// Parameters are arc lengths on the respective curves. Degenerate
    /// curves produce no events.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluating either curve fails.
    pub fn execute(&self) -> Result<Vec<IntersectionEvent>> {
        if self.curve_a.is_degenerate() || self.curve_b.is_degenerate() {
            return Ok(Vec::new());
        }
        let tol = self.tolerance;
        let mut events = Vec::new();
        for (off_a, piece_a) in pieces(self.curve_a) {
            for (off_b, piece_b) in pieces(self.curve_b) {
                let local = match (&piece_a, &piece_b) {
                    (Piece::Line(a), Piece::Line(b)) => line_line(a, b, tol)?,
                    (Piece::Arc(a), Piece::Arc(b)) => arc_arc(a, b, tol)?,
                    (Piece::Line(a), Piece::Arc(b)) => line_arc(a, b, tol),
                    (Piece::Arc(a), Piece::Line(b)) => line_arc(b, a, tol)
                        .into_iter()
                        .map(IntersectionEvent::swapped)
                        .collect(),
                };
                events.extend(local.into_iter().map(|e| e.shifted(off_a, off_b)));
            }
        }
        Ok(events)
    }
}

fn line_line(a: &LineSegment, b: &LineSegment, tol: f64) -> Result<Vec<IntersectionEvent>> {
    let collinear = (a.distance_to_carrier(b.start()) <= tol
        && a.distance_to_carrier(b.end()) <= tol)
        || (b.distance_to_carrier(a.start()) <= tol && b.distance_to_carrier(a.end()) <= tol);

    if collinear {
        let ta0 = a.project_unclamped(b.start());
        let ta1 = a.project_unclamped(b.end());
        let lo = ta0.min(ta1).max(0.0);
        let hi = ta0.max(ta1).min(a.length());
        if hi - lo > tol {
            let b_range = Interval::new(
                b.closest_parameter(&a.evaluate(lo)?),
                b.closest_parameter(&a.evaluate(hi)?),
            );
            return Ok(vec![IntersectionEvent::Overlap {
                a: Interval::new(lo, hi),
                b: b_range,
            }]);
        }
        if hi - lo >= -tol {
            // End-to-end contact.
            let t_a = (0.5 * (lo + hi)).clamp(0.0, a.length());
            let point = a.evaluate(t_a)?;
            return Ok(vec![IntersectionEvent::Point {
                point,
                t_a,
                t_b: b.closest_parameter(&point),
            }]);
        }
        return Ok(Vec::new());
    }

    Ok(
        segment_segment_intersect_2d(a.start(), a.end(), b.start(), b.end(), tol)
            .map(|(point, t, u)| IntersectionEvent::Point {
                point,
                t_a: t * a.length(),
                t_b: u * b.length(),
            })
            .into_iter()
            .collect(),
    )
}

fn arc_arc(a: &Arc, b: &Arc, tol: f64) -> Result<Vec<IntersectionEvent>> {
    let concentric = (a.center() - b.center()).norm() <= tol
        && (a.radius() - b.radius()).abs() <= tol
        && a.normal().dot(b.normal()).abs() >= 1.0 - TOLERANCE.sqrt();

    if concentric {
        // In a's frame, b runs counter-clockwise from its start point, or
        // from its end point when the normals are opposed.
        let b_start = if a.normal().dot(b.normal()) > 0.0 {
            a.angle_of(&b.start_point())
        } else {
            a.angle_of(&b.end_point())
        };
        let runs = angular_overlaps(
            a.start_angle(),
            a.sweep(),
            b_start,
            b.sweep(),
            tol / a.radius(),
        );
        let mut events = Vec::with_capacity(runs.len());
        for (lo, hi) in runs {
            let a_range = Interval::new(lo * a.radius(), hi * a.radius());
            let b_range = Interval::new(
                b.closest_parameter(&a.evaluate(a_range.min())?),
                b.closest_parameter(&a.evaluate(a_range.max())?),
            );
            events.push(IntersectionEvent::Overlap {
                a: a_range,
                b: b_range,
            });
        }
        return Ok(events);
    }

    let (Some(pa), Some(pb)) = (a.to_planar(), b.to_planar()) else {
        return Ok(Vec::new());
    };
    Ok(arc_arc_intersect_2d(&pa, &pb, tol)
        .into_iter()
        .map(|(point, t1, t2)| IntersectionEvent::Point {
            point,
            t_a: t1 * a.length(),
            t_b: t2 * b.length(),
        })
        .collect())
}

fn line_arc(a: &LineSegment, b: &Arc, tol: f64) -> Vec<IntersectionEvent> {
    let Some(pb) = b.to_planar() else {
        return Vec::new();
    };
    segment_arc_intersect_2d(a.start(), a.end(), &pb, tol)
        .into_iter()
        .map(|(point, t, u)| IntersectionEvent::Point {
            point,
            t_a: t * a.length(),
            t_b: u * b.length(),
        })
        .collect()
}

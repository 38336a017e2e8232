use crate::error::{GeometryError, Result};
use crate::math::{Interval, Point3, Vector3, TOLERANCE};

use super::{check_interval, check_parameter, Curve};

/// A bounded straight segment.
///
/// The parametric form is `P(t) = start + t * direction` with `t` in
/// `[0, length]`. Zero-length segments are allowed and report themselves
/// as degenerate.
#[derive(Debug, Clone)]
pub struct LineSegment {
    start: Point3,
    end: Point3,
}

impl LineSegment {
    /// Creates a segment between two points.
    #[must_use]
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Start point.
    #[must_use]
    pub fn start(&self) -> &Point3 {
        &self.start
    }

    /// End point.
    #[must_use]
    pub fn end(&self) -> &Point3 {
        &self.end
    }

    /// Unit direction from start to end.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment has zero length.
    pub fn direction(&self) -> Result<Vector3> {
        let d = self.end - self.start;
        let len = d.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(d / len)
    }

    /// Distance from `point` to the infinite carrier line.
    ///
    /// Falls back to the distance to `start` for a degenerate segment.
    #[must_use]
    pub fn distance_to_carrier(&self, point: &Point3) -> f64 {
        let to_point = point - self.start;
        match self.direction() {
            Ok(dir) => (to_point - dir * to_point.dot(&dir)).norm(),
            Err(_) => to_point.norm(),
        }
    }

    /// Signed parameter of the projection of `point` onto the carrier line.
    #[must_use]
    pub fn project_unclamped(&self, point: &Point3) -> f64 {
        self.direction()
            .map_or(0.0, |dir| (point - self.start).dot(&dir))
    }
}

impl Curve for LineSegment {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let len = self.length();
        let t = check_parameter(t, len)?;
        if len < TOLERANCE {
            return Ok(self.start);
        }
        Ok(self.start + (self.end - self.start) * (t / len))
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        check_parameter(t, self.length())?;
        self.direction()
    }

    fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn closest_parameter(&self, point: &Point3) -> f64 {
        self.project_unclamped(point).clamp(0.0, self.length())
    }

    fn trim(&self, interval: Interval) -> Result<Self> {
        let iv = check_interval(interval, self.length())?;
        Ok(Self::new(self.evaluate(iv.min())?, self.evaluate(iv.max())?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn seg() -> LineSegment {
        LineSegment::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0))
    }

    #[test]
    fn evaluate_is_arc_length() {
        let p = seg().evaluate(2.5).unwrap();
        assert!((p.x - 2.5).abs() < TOLERANCE);
    }

    #[test]
    fn evaluate_out_of_range_fails() {
        assert!(seg().evaluate(11.0).is_err());
    }

    #[test]
    fn closest_parameter_clamps() {
        let s = seg();
        assert!((s.closest_parameter(&Point3::new(4.0, 3.0, 0.0)) - 4.0).abs() < TOLERANCE);
        assert!(s.closest_parameter(&Point3::new(-4.0, 3.0, 0.0)).abs() < TOLERANCE);
        assert!((s.closest_parameter(&Point3::new(14.0, 0.0, 0.0)) - 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn distance_to_carrier_is_perpendicular() {
        let d = seg().distance_to_carrier(&Point3::new(20.0, 2.0, 0.0));
        assert!((d - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn degenerate_segment() {
        let p = Point3::new(1.0, 1.0, 0.0);
        let s = LineSegment::new(p, p);
        assert!(s.is_degenerate());
        assert!(s.tangent(0.0).is_err());
        assert_eq!(s.evaluate(0.0).unwrap(), p);
    }

    #[test]
    fn trim_reparameterises() {
        let piece = seg().trim(Interval::new(6.0, 3.0)).unwrap();
        assert!((piece.length() - 3.0).abs() < TOLERANCE);
        assert!((piece.start().x - 3.0).abs() < TOLERANCE);
    }
}

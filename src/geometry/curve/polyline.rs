use crate::error::{GeometryError, Result};
use crate::math::{Interval, Point3, Vector3, TOLERANCE};

use super::{check_interval, check_parameter, Curve, LineSegment};

/// A chain of straight segments through an ordered list of vertices.
///
/// Parameterised by cumulative arc length across the whole chain.
#[derive(Debug, Clone)]
pub struct Polyline {
    points: Vec<Point3>,
    /// `stations[i]` is the arc length from the first vertex to vertex `i`.
    stations: Vec<f64>,
}

impl Polyline {
    /// Creates a polyline through `points`.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are given.
    pub fn new(points: Vec<Point3>) -> Result<Self> {
        if points.len() < 2 {
            return Err(
                GeometryError::Degenerate("polyline needs at least two points".into()).into(),
            );
        }
        let mut stations = Vec::with_capacity(points.len());
        let mut acc = 0.0;
        stations.push(acc);
        for pair in points.windows(2) {
            acc += (pair[1] - pair[0]).norm();
            stations.push(acc);
        }
        Ok(Self { points, stations })
    }

    /// The vertices of the chain.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// First vertex.
    #[must_use]
    pub fn start_point(&self) -> Point3 {
        self.points[0]
    }

    /// Last vertex.
    #[must_use]
    pub fn end_point(&self) -> Point3 {
        self.points[self.points.len() - 1]
    }

    /// The straight pieces of the chain with the arc length at which each
    /// one starts.
    pub fn segments(&self) -> impl Iterator<Item = (f64, LineSegment)> + '_ {
        self.points
            .windows(2)
            .zip(&self.stations)
            .map(|(pair, &offset)| (offset, LineSegment::new(pair[0], pair[1])))
    }

    /// Index of the piece containing parameter `t`.
    fn piece_at(&self, t: f64) -> usize {
        let last = self.points.len() - 2;
        self.stations
            .partition_point(|&s| s <= t)
            .saturating_sub(1)
            .min(last)
    }
}

impl Curve for Polyline {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let t = check_parameter(t, self.length())?;
        let i = self.piece_at(t);
        let a = self.points[i];
        let b = self.points[i + 1];
        let piece_len = self.stations[i + 1] - self.stations[i];
        if piece_len < TOLERANCE {
            return Ok(a);
        }
        Ok(a + (b - a) * ((t - self.stations[i]) / piece_len))
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        let t = check_parameter(t, self.length())?;
        LineSegment::new(self.points[self.piece_at(t)], self.points[self.piece_at(t) + 1])
            .direction()
    }

    fn length(&self) -> f64 {
        self.stations[self.stations.len() - 1]
    }

    fn is_closed(&self) -> bool {
        self.length() > TOLERANCE && (self.end_point() - self.start_point()).norm() < TOLERANCE
    }

    fn closest_parameter(&self, point: &Point3) -> f64 {
        let mut best = (f64::INFINITY, 0.0);
        for (offset, seg) in self.segments() {
            let local = seg.closest_parameter(point);
            let dist = seg
                .evaluate(local)
                .map_or(f64::INFINITY, |p| (point - p).norm());
            if dist < best.0 {
                best = (dist, offset + local);
            }
        }
        best.1
    }

    fn trim(&self, interval: Interval) -> Result<Self> {
        let iv = check_interval(interval, self.length())?;
        let mut points = vec![self.evaluate(iv.min())?];
        for (point, &station) in self.points.iter().zip(&self.stations) {
            if station > iv.min() && station < iv.max() {
                points.push(*point);
            }
        }
        points.push(self.evaluate(iv.max())?);
        Self::new(points)
    }
}

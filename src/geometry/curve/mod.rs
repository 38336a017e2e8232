mod arc;
mod line;
mod polyline;

pub use arc::Arc;
pub use line::LineSegment;
pub use polyline::Polyline;

use crate::error::{GeometryError, Result};
use crate::math::{Interval, Point3, Vector3, TOLERANCE};

/// Trait for bounded curves parameterised by arc length.
///
/// Every implementor has the domain `[0, length]`, so a parameter is also
/// a distance along the curve from its start point.
pub trait Curve {
    /// Evaluates the curve at parameter `t`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is out of range.
    fn evaluate(&self, t: f64) -> Result<Point3>;

    /// Computes the unit tangent vector at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is out of range or the curve is degenerate.
    fn tangent(&self, t: f64) -> Result<Vector3>;

    /// Total arc length.
    fn length(&self) -> f64;

    /// Returns the parameter domain of the curve, `[0, length]`.
    fn domain(&self) -> Interval {
        Interval::new(0.0, self.length())
    }

    /// Returns whether the curve is closed.
    fn is_closed(&self) -> bool;

    /// Parameter of the point on the curve closest to `point`.
    fn closest_parameter(&self, point: &Point3) -> f64;

    /// Returns the part of the curve covering `interval`, re-parameterised
    /// from zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the interval leaves the domain.
    fn trim(&self, interval: Interval) -> Result<Self>
    where
        Self: Sized;

    /// Whether the curve has (numerically) zero length.
    fn is_degenerate(&self) -> bool {
        self.length() < TOLERANCE
    }
}

/// Checks that `t` lies in `[0, length]`, allowing a tiny slack, and clamps it.
pub(crate) fn check_parameter(t: f64, length: f64) -> Result<f64> {
    let slack = TOLERANCE * length.max(1.0);
    if t.is_nan() || t < -slack || t > length + slack {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: "t",
            value: t,
            min: 0.0,
            max: length,
        }
        .into());
    }
    Ok(t.clamp(0.0, length))
}

/// Checks that a trim interval lies inside `[0, length]` and clamps it.
pub(crate) fn check_interval(interval: Interval, length: f64) -> Result<Interval> {
    let lo = check_parameter(interval.min(), length)?;
    let hi = check_parameter(interval.max(), length)?;
    Ok(Interval::new(lo, hi))
}

/// A projected drawing curve.
#[derive(Debug, Clone)]
pub enum DrawCurve {
    /// A straight segment.
    Line(LineSegment),
    /// A circular arc.
    Arc(Arc),
    /// A chain of straight segments.
    Polyline(Polyline),
}

impl DrawCurve {
    /// Start point of the curve.
    #[must_use]
    pub fn start_point(&self) -> Point3 {
        match self {
            Self::Line(line) => *line.start(),
            Self::Arc(arc) => arc.start_point(),
            Self::Polyline(pl) => pl.start_point(),
        }
    }

    /// End point of the curve.
    #[must_use]
    pub fn end_point(&self) -> Point3 {
        match self {
            Self::Line(line) => *line.end(),
            Self::Arc(arc) => arc.end_point(),
            Self::Polyline(pl) => pl.end_point(),
        }
    }

    /// Point at the middle of the arc-length domain.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    pub fn midpoint(&self) -> Result<Point3> {
        self.evaluate(0.5 * self.length())
    }
}

impl Curve for DrawCurve {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        match self {
            Self::Line(c) => c.evaluate(t),
            Self::Arc(c) => c.evaluate(t),
            Self::Polyline(c) => c.evaluate(t),
        }
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        match self {
            Self::Line(c) => c.tangent(t),
            Self::Arc(c) => c.tangent(t),
            Self::Polyline(c) => c.tangent(t),
        }
    }

    fn length(&self) -> f64 {
        match self {
            Self::Line(c) => c.length(),
            Self::Arc(c) => c.length(),
            Self::Polyline(c) => c.length(),
        }
    }

    fn is_closed(&self) -> bool {
        match self {
            Self::Line(c) => c.is_closed(),
            Self::Arc(c) => c.is_closed(),
            Self::Polyline(c) => c.is_closed(),
        }
    }

    fn closest_parameter(&self, point: &Point3) -> f64 {
        match self {
            Self::Line(c) => c.closest_parameter(point),
            Self::Arc(c) => c.closest_parameter(point),
            Self::Polyline(c) => c.closest_parameter(point),
        }
    }

    fn trim(&self, interval: Interval) -> Result<Self> {
        Ok(match self {
            Self::Line(c) => Self::Line(c.trim(interval)?),
            Self::Arc(c) => Self::Arc(c.trim(interval)?),
            Self::Polyline(c) => Self::Polyline(c.trim(interval)?),
        })
    }
}

impl From<LineSegment> for DrawCurve {
    fn from(line: LineSegment) -> Self {
        Self::Line(line)
    }
}

impl From<Arc> for DrawCurve {
    fn from(arc: Arc) -> Self {
        Self::Arc(arc)
    }
}

impl From<Polyline> for DrawCurve {
    fn from(pl: Polyline) -> Self {
        Self::Polyline(pl)
    }
}

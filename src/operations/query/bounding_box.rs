use crate::geometry::curve::DrawCurve;
use crate::math::Point3;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Smallest box containing all `points`, or `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = *first;
        let mut max = *first;
        for p in rest {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some(Self { min, max })
    }

    /// The box grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        let m = crate::math::Vector3::repeat(margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Inclusive overlap test on all three axes.
    ///
    /// Boxes that merely touch coincide. This never culls a genuinely
    /// overlapping pair; it may keep pairs whose curves do not meet.
    #[must_use]
    pub fn coincides(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Free-function form of [`Aabb::coincides`].
#[must_use]
pub fn coincides(a: &Aabb, b: &Aabb) -> bool {
    a.coincides(b)
}

/// Computes the axis-aligned bounding box of a drawing curve.
pub struct BoundingBox<'a> {
    curve: &'a DrawCurve,
}

impl<'a> BoundingBox<'a> {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(curve: &'a DrawCurve) -> Self {
        Self { curve }
    }

    /// Executes the query, returning the exact AABB of the curve.
    ///
    /// Lines and polylines are bounded by their vertices; arcs by their
    /// endpoints plus every axis extreme reached inside the sweep.
    #[must_use]
    pub fn execute(&self) -> Aabb {
        let points = match self.curve {
            DrawCurve::Line(line) => vec![*line.start(), *line.end()],
            DrawCurve::Polyline(pl) => pl.points().to_vec(),
            DrawCurve::Arc(arc) => {
                let mut pts = arc.extreme_points();
                pts.push(arc.start_point());
                pts.push(arc.end_point());
                pts
            }
        };
        // Every variant yields at least two points.
        Aabb::from_points(&points).unwrap_or(Aabb {
            min: self.curve.start_point(),
            max: self.curve.start_point(),
        })
    }
}

mod bounding_box;
mod intersect;

pub use bounding_box::{coincides, Aabb, BoundingBox};
pub use intersect::{CurveCurveIntersect, IntersectionEvent};

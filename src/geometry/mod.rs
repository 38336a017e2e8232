pub mod curve;

pub use curve::{Arc, Curve, DrawCurve, LineSegment, Polyline};

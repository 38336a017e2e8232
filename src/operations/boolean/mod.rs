mod difference;

pub use difference::{CurveDifference, DifferenceResult, Subtractor, SubtractorSet};

//! Weighted line drawings from projected linework.

pub mod classify;
pub mod layers;
pub mod options;
pub mod pipeline;
pub mod services;
pub mod types;

pub use classify::{classify, Classification, ClassifyFlags, DiscardReason, SegmentClassifier};
pub use layers::{
    LayerAssignment, LayerId, LayerKind, LayerNode, LayerPlan, LayerRepository, LayerTable,
    LinePatternId, NewLayer,
};
pub use options::{Capabilities, DrawingOptions, LayerNames, WeightPolicy};
pub use pipeline::{
    ClassifiedPiece, DrawingRequest, DrawingResult, DrawingServices, LineDrawing, RunSummary,
};
pub use services::{
    ByLayer, ColorResolver, EdgeConcavity, IntersectionCurve, IntersectionService,
    ProjectionRequest, ProjectionService, Viewpoint,
};
pub use types::{
    Color, Concavity, CurveSource, EdgeRef, ObjectRef, ParentCurveRecord, Segment,
    SilhouetteCategory, Visibility, WeightClass,
};

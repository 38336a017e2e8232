use tracing::{trace, warn};

use crate::geometry::curve::Curve;

use super::services::EdgeConcavity;
use super::types::{
    Concavity, ParentCurveRecord, Segment, SilhouetteCategory, Visibility, WeightClass,
};

/// Why a segment is left out of the drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscardReason {
    /// The projection did not report a source record.
    MissingParent,
    /// The source carries no drawing meaning.
    NoSilhouette,
    /// Hidden segment while hidden lines are off.
    HiddenSuppressed,
    /// Section cut while clipping cuts are off.
    CutSuppressed,
    /// Zero-length curve.
    Degenerate,
}

/// Outcome of classifying one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Draw the segment with this class.
    Keep(WeightClass),
    /// Leave the segment out.
    Discard(DiscardReason),
}

/// Output switches consulted by the classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyFlags {
    /// Keep hidden segments as [`WeightClass::Hidden`].
    pub include_hidden: bool,
    /// Keep section cuts as [`WeightClass::Cut`].
    pub include_cuts: bool,
}

/// Maps visibility, silhouette category and concavity to a weight class.
///
/// | Rule | Condition                                          | Result                              |
/// |------|----------------------------------------------------|-------------------------------------|
/// | 1    | silhouette `None`                                  | discard                             |
/// | 2    | hidden                                             | `Hidden` if requested, else discard |
/// | 3    | silhouette `SectionCut`                            | `Cut` if requested, else discard    |
/// | 4    | `Boundary`, `Crease`, `Tangent`, `TangentProjects` | `Outline`                           |
/// | 5    | otherwise, concavity `Convex`                      | `Convex`                            |
/// | 6    | otherwise                                          | `Concave`                           |
///
/// The first matching rule wins. `concavity` is only called once rule 5 is
/// reached, since sampling it is the one expensive input.
pub fn classify(
    visibility: Visibility,
    silhouette: SilhouetteCategory,
    concavity: impl FnOnce() -> Concavity,
    flags: ClassifyFlags,
) -> Classification {
    match (silhouette, visibility) {
        (SilhouetteCategory::None, _) => Classification::Discard(DiscardReason::NoSilhouette),

        (_, Visibility::Hidden) if flags.include_hidden => {
            Classification::Keep(WeightClass::Hidden)
        }
        (_, Visibility::Hidden) => Classification::Discard(DiscardReason::HiddenSuppressed),

        (SilhouetteCategory::SectionCut, _) if flags.include_cuts => {
            Classification::Keep(WeightClass::Cut)
        }
        (SilhouetteCategory::SectionCut, _) => {
            Classification::Discard(DiscardReason::CutSuppressed)
        }

        (
            SilhouetteCategory::Boundary
            | SilhouetteCategory::Crease
            | SilhouetteCategory::Tangent
            | SilhouetteCategory::TangentProjects,
            Visibility::Visible,
        ) => Classification::Keep(WeightClass::Outline),

        (SilhouetteCategory::Projecting, Visibility::Visible) => match concavity() {
            Concavity::Convex => Classification::Keep(WeightClass::Convex),
            Concavity::Concave | Concavity::None => Classification::Keep(WeightClass::Concave),
        },
    }
}

/// Classifies whole segments, sampling concavity through an oracle.
pub struct SegmentClassifier<'a> {
    flags: ClassifyFlags,
    oracle: &'a dyn EdgeConcavity,
    tolerance: f64,
}

impl<'a> SegmentClassifier<'a> {
    /// Creates a classifier.
    #[must_use]
    pub fn new(flags: ClassifyFlags, oracle: &'a dyn EdgeConcavity, tolerance: f64) -> Self {
        Self {
            flags,
            oracle,
            tolerance,
        }
    }

    /// Classifies one segment.
    ///
    /// Segments without a parent record or with a zero-length curve are
    /// discarded. An oracle failure reads as [`Concavity::None`].
    #[must_use]
    pub fn classify(&self, segment: &Segment) -> Classification {
        let Some(parent) = segment.parent.as_ref() else {
            return Classification::Discard(DiscardReason::MissingParent);
        };
        if segment.curve.is_degenerate() {
            return Classification::Discard(DiscardReason::Degenerate);
        }
        let result = classify(
            segment.visibility,
            parent.silhouette,
            || self.sample_concavity(parent),
            self.flags,
        );
        trace!(silhouette = ?parent.silhouette, ?result, "classified segment");
        result
    }

    fn sample_concavity(&self, parent: &ParentCurveRecord) -> Concavity {
        let (Some(edge), Some(point)) = (parent.source.edge(), parent.source_point) else {
            return Concavity::None;
        };
        match self.oracle.concavity(edge, &point, self.tolerance) {
            Ok(concavity) => concavity,
            Err(err) => {
                warn!(%err, ?edge, "concavity sample failed, treating edge as concave");
                Concavity::None
            }
        }
    }
}

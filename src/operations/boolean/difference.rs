use tracing::{trace, warn};

use crate::error::Result;
use crate::geometry::curve::{Curve, DrawCurve};
use crate::math::interval::{difference, merge};
use crate::math::Interval;
use crate::operations::query::{Aabb, BoundingBox, CurveCurveIntersect, IntersectionEvent};

/// A subtractor curve together with its precomputed bounding box.
#[derive(Debug, Clone)]
pub struct Subtractor {
    /// The subtracting curve.
    pub curve: DrawCurve,
    /// Its axis-aligned bounds.
    pub bounds: Aabb,
}

/// A family of subtractor curves, prepared once and reused for every
/// subject.
#[derive(Debug, Clone, Default)]
pub struct SubtractorSet {
    items: Vec<Subtractor>,
}

impl SubtractorSet {
    /// Builds the set, computing each curve's bounding box. Degenerate
    /// curves are dropped.
    pub fn new(curves: impl IntoIterator<Item = DrawCurve>) -> Self {
        let items = curves
            .into_iter()
            .filter(|c| !c.is_degenerate())
            .map(|curve| {
                let bounds = BoundingBox::new(&curve).execute();
                Subtractor { curve, bounds }
            })
            .collect();
        Self { items }
    }

    /// Number of subtractors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the set has no subtractors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Subtractors whose bounds coincide with `bounds`.
    pub fn candidates<'s>(&'s self, bounds: &'s Aabb) -> impl Iterator<Item = &'s Subtractor> {
        self.items.iter().filter(move |s| s.bounds.coincides(bounds))
    }
}

/// Output of a curve boolean difference.
#[derive(Debug, Clone, Default)]
pub struct DifferenceResult {
    /// The subject domain that was examined.
    pub examined: Option<Interval>,
    /// Sub-ranges of the subject not covered by any subtractor.
    pub remainder_intervals: Vec<Interval>,
    /// Merged sub-ranges where the subject coincides with a subtractor.
    pub overlap_intervals: Vec<Interval>,
    /// The subject trimmed to each remainder interval.
    pub remainder: Vec<DrawCurve>,
    /// The subject trimmed to each overlap interval.
    pub overlap: Vec<DrawCurve>,
}

impl DifferenceResult {
    /// Returns whether any part of the subject coincides with a subtractor.
    #[must_use]
    pub fn has_overlap(&self) -> bool {
        !self.overlap_intervals.is_empty()
    }
}

/// Splits a subject curve into the parts that do and do not coincide with
/// a family of subtractor curves.
///
/// Candidates are culled by bounding box first; only overlap events from
/// the intersection query count, crossing points are ignored.
pub struct CurveDifference<'a> {
    subject: &'a DrawCurve,
    subtractors: &'a SubtractorSet,
    tolerance: f64,
}

impl<'a> CurveDifference<'a> {
    /// Creates a new `CurveDifference` operation.
    #[must_use]
    pub fn new(subject: &'a DrawCurve, subtractors: &'a SubtractorSet, tolerance: f64) -> Self {
        Self {
            subject,
            subtractors,
            tolerance,
        }
    }

    /// Executes the difference.
    ///
    /// A degenerate subject yields an empty result. When no subtractor box
    /// coincides with the subject, the remainder is the unchanged subject.
    /// A failed intersection query for one subtractor is logged and that
    /// subtractor is treated as disjoint.
    ///
    /// # Errors
    ///
    /// Returns an error if trimming the subject fails.
    pub fn execute(&self) -> Result<DifferenceResult> {
        if self.subject.is_degenerate() {
            trace!("degenerate subject, nothing to split");
            return Ok(DifferenceResult::default());
        }

        let domain = self.subject.domain();
        let bounds = BoundingBox::new(self.subject)
            .execute()
            .expanded(self.tolerance);

        let mut remainder = vec![domain];
        let mut overlaps = Vec::new();
        let mut candidates = 0usize;

        for sub in self.subtractors.candidates(&bounds) {
            candidates += 1;
            let events =
                match CurveCurveIntersect::new(self.subject, &sub.curve, self.tolerance).execute() {
                    Ok(events) => events,
                    Err(err) => {
                        warn!(%err, "intersection query failed, treating pair as disjoint");
                        continue;
                    }
                };
            for event in events {
                if let IntersectionEvent::Overlap { a, .. } = event {
                    remainder = difference(&remainder, a);
                    overlaps.push(a);
                }
            }
        }

        let overlap_intervals = merge(&overlaps);
        trace!(
            candidates,
            overlaps = overlap_intervals.len(),
            remainder = remainder.len(),
            "curve difference"
        );

        if overlap_intervals.is_empty() {
            return Ok(DifferenceResult {
                examined: Some(domain),
                remainder_intervals: remainder,
                overlap_intervals,
                remainder: vec![self.subject.clone()],
                overlap: Vec::new(),
            });
        }

        let remainder_curves = self.trim_all(&remainder)?;
        let overlap_curves = self.trim_all(&overlap_intervals)?;
        Ok(DifferenceResult {
            examined: Some(domain),
            remainder_intervals: remainder,
            overlap_intervals,
            remainder: remainder_curves,
            overlap: overlap_curves,
        })
    }

    /// Trims the subject to each interval, skipping slivers shorter than
    /// the tolerance.
    fn trim_all(&self, intervals: &[Interval]) -> Result<Vec<DrawCurve>> {
        intervals
            .iter()
            .filter(|iv| iv.length() > self.tolerance)
            .map(|iv| self.subject.trim(*iv))
            .collect()
    }
}

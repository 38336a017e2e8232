use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, trace, warn};

use crate::error::{InputError, Result};
use crate::geometry::curve::DrawCurve;
use crate::math::Matrix4;
use crate::operations::boolean::{CurveDifference, SubtractorSet};

use super::classify::{Classification, DiscardReason, SegmentClassifier};
use super::layers::{LayerAssignment, LayerId, LayerPlan, LayerRepository};
use super::options::{Capabilities, DrawingOptions};
use super::services::{
    ByLayer, ColorResolver, EdgeConcavity, IntersectionService, ProjectionRequest,
    ProjectionService, Viewpoint,
};
use super::types::{Color, ObjectRef, Segment, Visibility, WeightClass};

/// What to draw.
#[derive(Debug, Clone)]
pub struct DrawingRequest<'a> {
    /// Selected objects.
    pub objects: &'a [ObjectRef],
    /// Transform applied to the objects before projecting.
    pub transform: Matrix4,
    /// Camera; a run without one is rejected.
    pub viewpoint: Option<Viewpoint>,
}

/// The collaborators a run talks to.
#[derive(Clone, Copy)]
pub struct DrawingServices<'a> {
    /// Hidden-line projection.
    pub projection: &'a dyn ProjectionService,
    /// Solid intersection; without it no segment is re-partitioned.
    pub intersection: Option<&'a dyn IntersectionService>,
    /// Edge concavity sampling.
    pub concavity: &'a dyn EdgeConcavity,
    /// Display colors.
    pub colors: &'a dyn ColorResolver,
}

impl<'a> DrawingServices<'a> {
    /// Services without intersection support, drawing by layer color.
    #[must_use]
    pub fn new(projection: &'a dyn ProjectionService, concavity: &'a dyn EdgeConcavity) -> Self {
        Self {
            projection,
            intersection: None,
            concavity,
            colors: &ByLayer,
        }
    }

    /// Adds a solid-intersection service.
    #[must_use]
    pub fn with_intersection(mut self, intersection: &'a dyn IntersectionService) -> Self {
        self.intersection = Some(intersection);
        self
    }

    /// Replaces the color resolver.
    #[must_use]
    pub fn with_colors(mut self, colors: &'a dyn ColorResolver) -> Self {
        self.colors = colors;
        self
    }
}

/// One output curve ready to be written to a document.
#[derive(Debug, Clone)]
pub struct ClassifiedPiece {
    /// Trimmed geometry.
    pub curve: DrawCurve,
    /// Weight class.
    pub class: WeightClass,
    /// Target layer, `None` when the layer table could not provide one.
    pub layer: Option<LayerId>,
    /// Color inherited from the source, `None` for the layer color.
    pub color: Option<Color>,
}

/// Counters reported after each run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Projected segments, auxiliary ones excluded.
    pub segments: usize,
    /// Segments that received a weight class.
    pub kept: usize,
    /// Kept segments split by an intersection curve.
    pub split: usize,
    /// Emitted pieces.
    pub pieces: usize,
    /// Intersection-curve pieces used for splitting.
    pub subtractors: usize,
    discarded: HashMap<DiscardReason, usize>,
}

impl RunSummary {
    /// Segments discarded for `reason`.
    #[must_use]
    pub fn discarded(&self, reason: DiscardReason) -> usize {
        self.discarded.get(&reason).copied().unwrap_or(0)
    }

    /// Segments discarded for any reason.
    #[must_use]
    pub fn discarded_total(&self) -> usize {
        self.discarded.values().sum()
    }
}

/// Output of a [`LineDrawing`] run.
#[derive(Debug, Clone, Default)]
pub struct DrawingResult {
    /// Classified pieces in projection order.
    pub pieces: Vec<ClassifiedPiece>,
    /// Layer chosen per class.
    pub layers: LayerAssignment,
    /// Counters.
    pub summary: RunSummary,
}

impl DrawingResult {
    /// Pieces placed on `layer`.
    pub fn pieces_on(&self, layer: LayerId) -> impl Iterator<Item = &ClassifiedPiece> {
        self.pieces.iter().filter(move |p| p.layer == Some(layer))
    }

    /// Pieces grouped by weight class.
    #[must_use]
    pub fn by_class(&self) -> BTreeMap<WeightClass, Vec<&ClassifiedPiece>> {
        let mut groups: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for piece in &self.pieces {
            groups.entry(piece.class).or_default().push(piece);
        }
        groups
    }
}

/// Produces a weighted line drawing of the selected objects.
///
/// Stages, each switched by [`Capabilities`]:
///
/// 1. intersection curves between every pair of objects (optional),
/// 2. projection of the objects plus those curves,
/// 3. layer planning,
/// 4. classification, with outlines and convex edges split where they
///    coincide with a projected intersection curve; the coinciding part
///    is drawn as concave.
pub struct LineDrawing<'a> {
    request: DrawingRequest<'a>,
    options: DrawingOptions,
}

impl<'a> LineDrawing<'a> {
    /// Creates a new `LineDrawing` operation.
    #[must_use]
    pub fn new(request: DrawingRequest<'a>, options: DrawingOptions) -> Self {
        Self { request, options }
    }

    /// Executes the run.
    ///
    /// Failures of a single intersection pair or concavity sample are
    /// logged and degraded; the run continues.
    ///
    /// # Errors
    ///
    /// Returns an [`InputError`] for invalid options, an empty selection or
    /// a missing or invalid viewpoint, a service error if the projection
    /// fails, and a layer error if the layer table rejects a layer.
    #[tracing::instrument(skip_all, fields(objects = self.request.objects.len()))]
    pub fn execute(
        &self,
        services: &DrawingServices<'_>,
        layers: &mut dyn LayerRepository,
    ) -> Result<DrawingResult> {
        self.options.validate()?;
        if self.request.objects.is_empty() {
            return Err(InputError::EmptySelection.into());
        }
        let viewpoint = self.request.viewpoint.ok_or(InputError::MissingViewpoint)?;
        viewpoint.validate()?;

        let caps = self.options.capabilities();
        let tolerance = self.options.tolerance;

        let auxiliary = if caps.intersection_segmentation {
            self.intersection_curves(services)
        } else {
            Vec::new()
        };

        let projected = services.projection.project(&ProjectionRequest {
            objects: self.request.objects,
            auxiliary_curves: &auxiliary,
            transform: self.request.transform,
            viewpoint,
            tolerance,
            include_hidden: caps.hidden,
            include_tangent: self.options.include_tangent_edges,
            include_scene_silhouette: caps.scene_silhouette,
            include_clipping: caps.clipping,
        })?;

        let (aux_segments, segments): (Vec<Segment>, Vec<Segment>) =
            projected.into_iter().partition(Segment::is_auxiliary);
        let subtractors = SubtractorSet::new(
            aux_segments
                .into_iter()
                .filter(|s| s.visibility == Visibility::Visible)
                .map(|s| s.curve),
        );
        debug!(
            segments = segments.len(),
            subtractors = subtractors.len(),
            "projection done"
        );

        let assignment = LayerPlan::new(&self.options, &producible_classes(caps)).apply(layers)?;

        let classifier =
            SegmentClassifier::new(caps.classify_flags(), services.concavity, tolerance);
        let mut summary = RunSummary {
            segments: segments.len(),
            subtractors: subtractors.len(),
            ..RunSummary::default()
        };
        let mut pieces = Vec::new();

        for segment in segments {
            let class = match classifier.classify(&segment) {
                Classification::Keep(class) => class,
                Classification::Discard(reason) => {
                    *summary.discarded.entry(reason).or_default() += 1;
                    continue;
                }
            };
            summary.kept += 1;

            let color = segment
                .parent
                .as_ref()
                .and_then(|p| services.colors.color_of(p));
            let mut emit = |curve: DrawCurve, class: WeightClass| {
                pieces.push(ClassifiedPiece {
                    curve,
                    class,
                    layer: assignment.layer_for(class),
                    color,
                });
            };

            if !class.is_repartitionable() || subtractors.is_empty() {
                emit(segment.curve, class);
                continue;
            }

            let split = CurveDifference::new(&segment.curve, &subtractors, tolerance).execute();
            match split {
                Ok(split) if split.has_overlap() => {
                    summary.split += 1;
                    trace!(
                        %class,
                        remainder = split.remainder.len(),
                        overlap = split.overlap.len(),
                        "segment split by intersection curve"
                    );
                    for curve in split.remainder {
                        emit(curve, class);
                    }
                    for curve in split.overlap {
                        emit(curve, WeightClass::Concave);
                    }
                }
                Ok(_) => emit(segment.curve, class),
                Err(err) => {
                    warn!(%err, %class, "splitting segment failed, keeping it whole");
                    emit(segment.curve, class);
                }
            }
        }

        summary.pieces = pieces.len();
        info!(
            segments = summary.segments,
            kept = summary.kept,
            discarded = summary.discarded_total(),
            split = summary.split,
            pieces = summary.pieces,
            "line drawing complete"
        );

        Ok(DrawingResult {
            pieces,
            layers: assignment,
            summary,
        })
    }

    /// Intersection curves of every unordered pair of selected objects.
    fn intersection_curves(&self, services: &DrawingServices<'_>) -> Vec<DrawCurve> {
        let Some(service) = services.intersection else {
            debug!("no intersection service, skipping segmentation");
            return Vec::new();
        };
        let objects = self.request.objects;
        let mut curves = Vec::new();
        for (i, &a) in objects.iter().enumerate() {
            for &b in &objects[i + 1..] {
                match service.intersect(a, b, self.options.tolerance) {
                    Ok(found) => curves.extend(found.into_iter().map(|c| c.curve)),
                    Err(err) => warn!(%err, ?a, ?b, "intersection failed, skipping pair"),
                }
            }
        }
        debug!(curves = curves.len(), "intersection curves");
        curves
    }
}

/// Classes a run with these capabilities can emit, heaviest first.
fn producible_classes(caps: Capabilities) -> Vec<WeightClass> {
    WeightClass::ALL
        .into_iter()
        .filter(|class| match class {
            WeightClass::Cut => caps.clipping,
            WeightClass::Hidden => caps.hidden,
            WeightClass::Outline | WeightClass::Convex | WeightClass::Concave => true,
        })
        .collect()
}

#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::collections::HashMap;

use approx::assert_abs_diff_eq;
use lineweight::drafting::{
    Color, Concavity, CurveSource, DiscardReason, DrawingOptions, DrawingRequest,
    DrawingServices, EdgeConcavity, EdgeRef, IntersectionCurve, IntersectionService, LayerId,
    LayerRepository, LayerTable, LineDrawing, ObjectRef, ParentCurveRecord, ProjectionRequest,
    ProjectionService, Segment, SilhouetteCategory, Viewpoint, Visibility, WeightClass,
};
use lineweight::error::{InputError, LineweightError, ServiceError};
use lineweight::geometry::{Curve, DrawCurve, LineSegment};
use lineweight::math::{Matrix4, Point3};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> DrawCurve {
    LineSegment::new(Point3::new(x0, y0, 0.0), Point3::new(x1, y1, 0.0)).into()
}

fn top_view() -> Viewpoint {
    Viewpoint::parallel(Point3::new(0.0, 0.0, 10.0), Point3::origin())
}

fn edge(object: u64, index: usize) -> CurveSource {
    CurveSource::Edge(EdgeRef {
        object: ObjectRef(object),
        index,
    })
}

fn segment(
    curve: DrawCurve,
    visibility: Visibility,
    silhouette: SilhouetteCategory,
    source: CurveSource,
) -> Segment {
    let source_point = curve.midpoint().ok();
    Segment {
        curve,
        visibility,
        parent: Some(ParentCurveRecord {
            silhouette,
            source,
            source_point,
        }),
    }
}

/// Returns fixed segments and echoes every auxiliary curve back as a
/// visible segment, as a top view of planar curves would.
#[derive(Default)]
struct FakeProjection {
    segments: Vec<Segment>,
    fail: bool,
    seen: RefCell<Vec<(usize, bool, bool)>>,
}

impl ProjectionService for FakeProjection {
    fn project(&self, request: &ProjectionRequest<'_>) -> Result<Vec<Segment>, ServiceError> {
        self.seen.borrow_mut().push((
            request.auxiliary_curves.len(),
            request.include_clipping,
            request.include_scene_silhouette,
        ));
        if self.fail {
            return Err(ServiceError::Projection("viewpoint inside geometry".into()));
        }
        let mut out = self.segments.clone();
        out.extend(
            request
                .auxiliary_curves
                .iter()
                .enumerate()
                .map(|(i, curve)| Segment {
                    curve: curve.clone(),
                    visibility: Visibility::Visible,
                    parent: Some(ParentCurveRecord {
                        silhouette: SilhouetteCategory::Crease,
                        source: CurveSource::Auxiliary(i),
                        source_point: None,
                    }),
                }),
        );
        Ok(out)
    }
}

/// Intersection curves per unordered object pair; pairs involving
/// `failing` report an error.
#[derive(Default)]
struct FakeIntersection {
    curves: HashMap<(u64, u64), Vec<DrawCurve>>,
    failing: Option<u64>,
}

impl IntersectionService for FakeIntersection {
    fn intersect(
        &self,
        a: ObjectRef,
        b: ObjectRef,
        _tolerance: f64,
    ) -> Result<Vec<IntersectionCurve>, ServiceError> {
        if self.failing.is_some_and(|f| f == a.0 || f == b.0) {
            return Err(ServiceError::Intersection("surfaces do not converge".into()));
        }
        let key = (a.0.min(b.0), a.0.max(b.0));
        Ok(self
            .curves
            .get(&key)
            .into_iter()
            .flatten()
            .map(|curve| IntersectionCurve {
                curve: curve.clone(),
                parents: (a, b),
            })
            .collect())
    }
}

/// Even edge indices are convex, odd ones concave, index 99 fails.
struct ParityConcavity;

impl EdgeConcavity for ParityConcavity {
    fn concavity(
        &self,
        edge: EdgeRef,
        _point: &Point3,
        _tolerance: f64,
    ) -> Result<Concavity, ServiceError> {
        match edge.index {
            99 => Err(ServiceError::Concavity("edge has one face".into())),
            i if i % 2 == 0 => Ok(Concavity::Convex),
            _ => Ok(Concavity::Concave),
        }
    }
}

static OBJECTS: [ObjectRef; 2] = [ObjectRef(1), ObjectRef(2)];

fn request(objects: &[ObjectRef]) -> DrawingRequest<'_> {
    DrawingRequest {
        objects,
        transform: Matrix4::identity(),
        viewpoint: Some(top_view()),
    }
}

fn layer_name(table: &LayerTable, piece_layer: Option<LayerId>) -> String {
    table.node(piece_layer.unwrap()).unwrap().name.clone()
}

#[test]
fn classifies_a_mixed_projection() {
    init_tracing();
    let projection = FakeProjection {
        segments: vec![
            segment(
                line(0.0, 0.0, 10.0, 0.0),
                Visibility::Visible,
                SilhouetteCategory::Boundary,
                edge(1, 1),
            ),
            segment(
                line(0.0, 1.0, 10.0, 1.0),
                Visibility::Visible,
                SilhouetteCategory::Projecting,
                edge(1, 2),
            ),
            segment(
                line(0.0, 2.0, 10.0, 2.0),
                Visibility::Visible,
                SilhouetteCategory::Projecting,
                edge(1, 3),
            ),
            segment(
                line(0.0, 3.0, 10.0, 3.0),
                Visibility::Visible,
                SilhouetteCategory::None,
                edge(1, 4),
            ),
            segment(
                line(0.0, 4.0, 10.0, 4.0),
                Visibility::Hidden,
                SilhouetteCategory::Boundary,
                edge(1, 5),
            ),
            segment(
                line(0.0, 5.0, 10.0, 5.0),
                Visibility::Visible,
                SilhouetteCategory::SectionCut,
                CurveSource::Object(ObjectRef(1)),
            ),
            Segment {
                curve: line(0.0, 6.0, 1.0, 6.0),
                visibility: Visibility::Visible,
                parent: None,
            },
        ],
        ..FakeProjection::default()
    };
    let services = DrawingServices::new(&projection, &ParityConcavity);
    let mut table = LayerTable::new();

    let result = LineDrawing::new(request(&OBJECTS[..1]), DrawingOptions::default())
        .execute(&services, &mut table)
        .unwrap();

    let classes: Vec<_> = result.pieces.iter().map(|p| p.class).collect();
    assert_eq!(
        classes,
        vec![WeightClass::Outline, WeightClass::Convex, WeightClass::Concave]
    );
    for piece in &result.pieces {
        assert_eq!(layer_name(&table, piece.layer), piece.class.name());
        assert_eq!(piece.color, None);
    }

    let summary = &result.summary;
    assert_eq!(summary.segments, 7);
    assert_eq!(summary.kept, 3);
    assert_eq!(summary.discarded(DiscardReason::NoSilhouette), 1);
    assert_eq!(summary.discarded(DiscardReason::HiddenSuppressed), 1);
    assert_eq!(summary.discarded(DiscardReason::CutSuppressed), 1);
    assert_eq!(summary.discarded(DiscardReason::MissingParent), 1);
    assert_eq!(summary.discarded_total(), 4);
    assert_eq!(summary.pieces, 3);
}

#[test]
fn failed_concavity_sample_draws_concave() {
    let projection = FakeProjection {
        segments: vec![segment(
            line(0.0, 0.0, 1.0, 0.0),
            Visibility::Visible,
            SilhouetteCategory::Projecting,
            edge(1, 99),
        )],
        ..FakeProjection::default()
    };
    let services = DrawingServices::new(&projection, &ParityConcavity);
    let result = LineDrawing::new(request(&OBJECTS[..1]), DrawingOptions::default())
        .execute(&services, &mut LayerTable::new())
        .unwrap();
    assert_eq!(result.pieces.len(), 1);
    assert_eq!(result.pieces[0].class, WeightClass::Concave);
}

#[test]
fn outline_is_split_where_an_intersection_curve_runs_along_it() {
    init_tracing();
    let projection = FakeProjection {
        segments: vec![segment(
            line(0.0, 0.0, 10.0, 0.0),
            Visibility::Visible,
            SilhouetteCategory::Boundary,
            edge(1, 0),
        )],
        ..FakeProjection::default()
    };
    let intersection = FakeIntersection {
        curves: HashMap::from([((1, 2), vec![line(3.0, 0.0, 6.0, 0.0)])]),
        ..FakeIntersection::default()
    };
    let services =
        DrawingServices::new(&projection, &ParityConcavity).with_intersection(&intersection);
    let mut table = LayerTable::new();

    let result = LineDrawing::new(request(&OBJECTS), DrawingOptions::default())
        .execute(&services, &mut table)
        .unwrap();

    assert_eq!(projection.seen.borrow()[0].0, 1);
    assert_eq!(result.summary.subtractors, 1);
    assert_eq!(result.summary.split, 1);
    assert_eq!(result.summary.segments, 1);

    let by_class = result.by_class();
    let outline = &by_class[&WeightClass::Outline];
    let concave = &by_class[&WeightClass::Concave];
    assert_eq!(outline.len(), 2);
    assert_eq!(concave.len(), 1);
    assert_abs_diff_eq!(outline[0].curve.length(), 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(outline[1].curve.length(), 4.0, epsilon = 1e-9);
    let overlap = &concave[0].curve;
    assert_abs_diff_eq!(overlap.start_point(), Point3::new(3.0, 0.0, 0.0), epsilon = 1e-9);
    assert_abs_diff_eq!(overlap.end_point(), Point3::new(6.0, 0.0, 0.0), epsilon = 1e-9);
    assert_eq!(layer_name(&table, concave[0].layer), "Concave");
}

#[test]
fn convex_edge_is_split_where_an_intersection_curve_runs_along_it() {
    let projection = FakeProjection {
        segments: vec![segment(
            line(0.0, 0.0, 10.0, 0.0),
            Visibility::Visible,
            SilhouetteCategory::Projecting,
            edge(1, 2),
        )],
        ..FakeProjection::default()
    };
    let intersection = FakeIntersection {
        curves: HashMap::from([((1, 2), vec![line(3.0, 0.0, 6.0, 0.0)])]),
        ..FakeIntersection::default()
    };
    let services =
        DrawingServices::new(&projection, &ParityConcavity).with_intersection(&intersection);
    let mut table = LayerTable::new();

    let result = LineDrawing::new(request(&OBJECTS), DrawingOptions::default())
        .execute(&services, &mut table)
        .unwrap();

    assert_eq!(result.summary.kept, 1);
    assert_eq!(result.summary.split, 1);
    assert_eq!(result.summary.pieces, 3);

    let by_class = result.by_class();
    assert!(!by_class.contains_key(&WeightClass::Outline));
    let convex = &by_class[&WeightClass::Convex];
    let concave = &by_class[&WeightClass::Concave];
    assert_eq!(convex.len(), 2);
    assert_eq!(concave.len(), 1);
    assert_abs_diff_eq!(convex[0].curve.start_point(), Point3::origin(), epsilon = 1e-9);
    assert_abs_diff_eq!(convex[0].curve.length(), 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(convex[1].curve.length(), 4.0, epsilon = 1e-9);
    assert_abs_diff_eq!(
        convex[1].curve.end_point(),
        Point3::new(10.0, 0.0, 0.0),
        epsilon = 1e-9
    );
    let overlap = &concave[0].curve;
    assert_abs_diff_eq!(overlap.start_point(), Point3::new(3.0, 0.0, 0.0), epsilon = 1e-9);
    assert_abs_diff_eq!(overlap.end_point(), Point3::new(6.0, 0.0, 0.0), epsilon = 1e-9);
    assert_eq!(layer_name(&table, convex[0].layer), "Convex");
    assert_eq!(layer_name(&table, concave[0].layer), "Concave");
}

#[test]
fn outline_away_from_intersection_curves_is_unchanged() {
    let projection = FakeProjection {
        segments: vec![segment(
            line(0.0, 0.0, 10.0, 0.0),
            Visibility::Visible,
            SilhouetteCategory::Boundary,
            edge(1, 0),
        )],
        ..FakeProjection::default()
    };
    let intersection = FakeIntersection {
        curves: HashMap::from([((1, 2), vec![line(0.0, 5.0, 10.0, 5.0)])]),
        ..FakeIntersection::default()
    };
    let services =
        DrawingServices::new(&projection, &ParityConcavity).with_intersection(&intersection);

    let result = LineDrawing::new(request(&OBJECTS), DrawingOptions::default())
        .execute(&services, &mut LayerTable::new())
        .unwrap();

    assert_eq!(result.summary.subtractors, 1);
    assert_eq!(result.summary.split, 0);
    assert_eq!(result.pieces.len(), 1);
    let piece = &result.pieces[0];
    assert_eq!(piece.class, WeightClass::Outline);
    assert!((piece.curve.start_point() - Point3::origin()).norm() < 1e-12);
    assert!((piece.curve.end_point() - Point3::new(10.0, 0.0, 0.0)).norm() < 1e-12);
}

#[test]
fn concave_segments_are_never_split() {
    let projection = FakeProjection {
        segments: vec![segment(
            line(0.0, 0.0, 10.0, 0.0),
            Visibility::Visible,
            SilhouetteCategory::Projecting,
            edge(1, 1),
        )],
        ..FakeProjection::default()
    };
    let intersection = FakeIntersection {
        curves: HashMap::from([((1, 2), vec![line(3.0, 0.0, 6.0, 0.0)])]),
        ..FakeIntersection::default()
    };
    let services =
        DrawingServices::new(&projection, &ParityConcavity).with_intersection(&intersection);
    let result = LineDrawing::new(request(&OBJECTS), DrawingOptions::default())
        .execute(&services, &mut LayerTable::new())
        .unwrap();
    assert_eq!(result.pieces.len(), 1);
    assert_eq!(result.summary.split, 0);
}

#[test]
fn segmentation_can_be_switched_off() {
    let projection = FakeProjection {
        segments: vec![segment(
            line(0.0, 0.0, 10.0, 0.0),
            Visibility::Visible,
            SilhouetteCategory::Projecting,
            edge(1, 2),
        )],
        ..FakeProjection::default()
    };
    let intersection = FakeIntersection {
        curves: HashMap::from([((1, 2), vec![line(3.0, 0.0, 6.0, 0.0)])]),
        ..FakeIntersection::default()
    };
    let services =
        DrawingServices::new(&projection, &ParityConcavity).with_intersection(&intersection);
    let options = DrawingOptions {
        intersection_segmentation: false,
        ..DrawingOptions::default()
    };
    let result = LineDrawing::new(request(&OBJECTS), options)
        .execute(&services, &mut LayerTable::new())
        .unwrap();
    assert_eq!(projection.seen.borrow()[0].0, 0);
    assert_eq!(result.pieces.len(), 1);
    assert_eq!(result.pieces[0].class, WeightClass::Convex);
}

#[test]
fn failing_intersection_pair_is_skipped() {
    init_tracing();
    let objects = [ObjectRef(1), ObjectRef(2), ObjectRef(3)];
    let projection = FakeProjection::default();
    let intersection = FakeIntersection {
        curves: HashMap::from([
            ((1, 2), vec![line(0.0, 0.0, 1.0, 0.0)]),
            ((1, 3), vec![line(0.0, 1.0, 1.0, 1.0)]),
        ]),
        failing: Some(3),
    };
    let services =
        DrawingServices::new(&projection, &ParityConcavity).with_intersection(&intersection);
    let result = LineDrawing::new(request(&objects), DrawingOptions::default())
        .execute(&services, &mut LayerTable::new())
        .unwrap();
    assert_eq!(projection.seen.borrow()[0].0, 1);
    assert_eq!(result.summary.subtractors, 1);
    assert!(result.pieces.is_empty());
}

#[test]
fn hidden_lines_land_on_the_hidden_layer() {
    let projection = FakeProjection {
        segments: vec![segment(
            line(0.0, 0.0, 1.0, 0.0),
            Visibility::Hidden,
            SilhouetteCategory::Crease,
            edge(1, 0),
        )],
        ..FakeProjection::default()
    };
    let services = DrawingServices::new(&projection, &ParityConcavity);
    let mut table = LayerTable::new();
    let dashed = table.add_line_pattern("Hidden");
    let options = DrawingOptions {
        include_hidden_lines: true,
        ..DrawingOptions::default()
    };
    let result = LineDrawing::new(request(&OBJECTS[..1]), options)
        .execute(&services, &mut table)
        .unwrap();

    let hidden = result.layers.layer_for(WeightClass::Hidden).unwrap();
    assert_eq!(result.pieces_on(hidden).count(), 1);
    assert_eq!(result.pieces[0].class, WeightClass::Hidden);
    assert_eq!(table.node(hidden).unwrap().line_pattern, Some(dashed));
}

#[test]
fn silhouette_suppresses_clipping_in_the_projection_request() {
    let projection = FakeProjection {
        segments: vec![segment(
            line(0.0, 0.0, 1.0, 0.0),
            Visibility::Visible,
            SilhouetteCategory::SectionCut,
            CurveSource::Object(ObjectRef(1)),
        )],
        ..FakeProjection::default()
    };
    let services = DrawingServices::new(&projection, &ParityConcavity);
    let options = DrawingOptions {
        include_clipping_cuts: true,
        include_scene_silhouette: true,
        ..DrawingOptions::default()
    };
    let result = LineDrawing::new(request(&OBJECTS[..1]), options)
        .execute(&services, &mut LayerTable::new())
        .unwrap();
    assert_eq!(projection.seen.borrow()[0], (0, false, true));
    assert!(result.pieces.is_empty());
    assert_eq!(result.summary.discarded(DiscardReason::CutSuppressed), 1);
    assert!(result.layers.layer_for(WeightClass::Cut).is_none());
}

#[test]
fn section_cuts_kept_when_clipping_requested() {
    let projection = FakeProjection {
        segments: vec![segment(
            line(0.0, 0.0, 1.0, 0.0),
            Visibility::Visible,
            SilhouetteCategory::SectionCut,
            CurveSource::Object(ObjectRef(1)),
        )],
        ..FakeProjection::default()
    };
    let services = DrawingServices::new(&projection, &ParityConcavity);
    let options = DrawingOptions {
        include_clipping_cuts: true,
        ..DrawingOptions::default()
    };
    let mut table = LayerTable::new();
    let result = LineDrawing::new(request(&OBJECTS[..1]), options)
        .execute(&services, &mut table)
        .unwrap();
    assert_eq!(result.pieces[0].class, WeightClass::Cut);

    let weight = |class| {
        table
            .node(result.layers.layer_for(class).unwrap())
            .unwrap()
            .line_weight
            .unwrap()
    };
    assert!(weight(WeightClass::Cut) > weight(WeightClass::Outline));
    assert!(weight(WeightClass::Outline) > weight(WeightClass::Concave));
}

#[test]
fn colors_come_from_the_resolver() {
    let projection = FakeProjection {
        segments: vec![
            segment(
                line(0.0, 0.0, 1.0, 0.0),
                Visibility::Visible,
                SilhouetteCategory::Boundary,
                edge(1, 0),
            ),
            segment(
                line(0.0, 1.0, 1.0, 1.0),
                Visibility::Visible,
                SilhouetteCategory::Boundary,
                edge(2, 0),
            ),
        ],
        ..FakeProjection::default()
    };
    let red = |parent: &ParentCurveRecord| {
        (parent.source.object() == Some(ObjectRef(1))).then_some(Color::rgb(255, 0, 0))
    };
    let services = DrawingServices::new(&projection, &ParityConcavity).with_colors(&red);
    let result = LineDrawing::new(request(&OBJECTS), DrawingOptions::default())
        .execute(&services, &mut LayerTable::new())
        .unwrap();
    let colors: Vec<_> = result.pieces.iter().map(|p| p.color).collect();
    assert_eq!(colors, vec![Some(Color::rgb(255, 0, 0)), None]);
}

#[test]
fn repeated_runs_reuse_layers() {
    let projection = FakeProjection {
        segments: vec![segment(
            line(0.0, 0.0, 1.0, 0.0),
            Visibility::Visible,
            SilhouetteCategory::Boundary,
            edge(1, 0),
        )],
        ..FakeProjection::default()
    };
    let services = DrawingServices::new(&projection, &ParityConcavity);
    let mut table = LayerTable::new();
    let drawing = LineDrawing::new(request(&OBJECTS[..1]), DrawingOptions::default());
    let first = drawing.execute(&services, &mut table).unwrap();
    let layers = table.len();
    let second = drawing.execute(&services, &mut table).unwrap();
    assert!(!first.layers.created().is_empty());
    assert!(second.layers.created().is_empty());
    assert_eq!(table.len(), layers);
    assert_eq!(first.pieces[0].layer, second.pieces[0].layer);
    assert!(table.find_by_name(None, "Linework").unwrap().is_some());
}

#[test]
fn invalid_input_aborts_the_run() {
    let projection = FakeProjection::default();
    let services = DrawingServices::new(&projection, &ParityConcavity);

    let err = LineDrawing::new(request(&[]), DrawingOptions::default())
        .execute(&services, &mut LayerTable::new())
        .unwrap_err();
    assert!(matches!(
        err,
        LineweightError::Input(InputError::EmptySelection)
    ));

    let no_view = DrawingRequest {
        viewpoint: None,
        ..request(&OBJECTS)
    };
    let err = LineDrawing::new(no_view, DrawingOptions::default())
        .execute(&services, &mut LayerTable::new())
        .unwrap_err();
    assert!(matches!(
        err,
        LineweightError::Input(InputError::MissingViewpoint)
    ));

    let bad_view = DrawingRequest {
        viewpoint: Some(Viewpoint::parallel(Point3::origin(), Point3::origin())),
        ..request(&OBJECTS)
    };
    let err = LineDrawing::new(bad_view, DrawingOptions::default())
        .execute(&services, &mut LayerTable::new())
        .unwrap_err();
    assert!(matches!(
        err,
        LineweightError::Input(InputError::InvalidViewpoint(_))
    ));

    let options = DrawingOptions {
        tolerance: 0.0,
        ..DrawingOptions::default()
    };
    let err = LineDrawing::new(request(&OBJECTS), options)
        .execute(&services, &mut LayerTable::new())
        .unwrap_err();
    assert!(matches!(
        err,
        LineweightError::Input(InputError::InvalidTolerance(_))
    ));
    assert!(projection.seen.borrow().is_empty());
}

#[test]
fn projection_failure_is_fatal() {
    let projection = FakeProjection {
        fail: true,
        ..FakeProjection::default()
    };
    let services = DrawingServices::new(&projection, &ParityConcavity);
    let mut table = LayerTable::new();
    let err = LineDrawing::new(request(&OBJECTS), DrawingOptions::default())
        .execute(&services, &mut table)
        .unwrap_err();
    assert!(matches!(
        err,
        LineweightError::Service(ServiceError::Projection(_))
    ));
    assert!(table.is_empty());
}

//! Interfaces of the external collaborators the engine drives.
//!
//! The engine never computes projections, solid intersections or edge
//! concavity itself; a host implements these traits on top of its own
//! geometry kernel.

use crate::error::{InputError, ServiceError};
use crate::geometry::curve::DrawCurve;
use crate::math::{Matrix4, Point3, Vector3, TOLERANCE};

use super::types::{Color, Concavity, EdgeRef, ObjectRef, ParentCurveRecord, Segment};

/// Camera placement for a projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    /// Eye position.
    pub camera: Point3,
    /// Point looked at.
    pub target: Point3,
    /// Approximate up direction.
    pub up: Vector3,
    /// Perspective instead of parallel projection.
    pub perspective: bool,
}

impl Viewpoint {
    /// Parallel view looking from `camera` at `target` with +Z up, or +Y up
    /// when looking straight along the Z axis.
    #[must_use]
    pub fn parallel(camera: Point3, target: Point3) -> Self {
        let dir = target - camera;
        let up = if dir.cross(&Vector3::z()).norm() < TOLERANCE * dir.norm() {
            Vector3::y()
        } else {
            Vector3::z()
        };
        Self {
            camera,
            target,
            up,
            perspective: false,
        }
    }

    /// Checks that the view direction and up vector define a frame.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidViewpoint`] if the camera sits on the
    /// target or the up vector is parallel to the view direction.
    pub fn validate(&self) -> Result<(), InputError> {
        let dir = self.target - self.camera;
        if dir.norm() < TOLERANCE {
            return Err(InputError::InvalidViewpoint(
                "camera and target coincide".into(),
            ));
        }
        if dir.cross(&self.up).norm() < TOLERANCE * dir.norm() {
            return Err(InputError::InvalidViewpoint(
                "up vector is parallel to the view direction".into(),
            ));
        }
        Ok(())
    }
}

/// Everything the projection service needs for one run.
#[derive(Debug, Clone)]
pub struct ProjectionRequest<'a> {
    /// Geometry to project.
    pub objects: &'a [ObjectRef],
    /// Extra 3D curves to project alongside the objects; segments coming
    /// from them carry `CurveSource::Auxiliary(index)`.
    pub auxiliary_curves: &'a [DrawCurve],
    /// Transform applied to the geometry before projecting.
    pub transform: Matrix4,
    /// Camera.
    pub viewpoint: Viewpoint,
    /// Geometric tolerance.
    pub tolerance: f64,
    /// Emit hidden segments.
    pub include_hidden: bool,
    /// Emit tangent-transition edges.
    pub include_tangent: bool,
    /// Emit the silhouette of the whole scene.
    pub include_scene_silhouette: bool,
    /// Emit section cuts from clipping planes.
    pub include_clipping: bool,
}

/// Computes the hidden-line projection of 3D geometry.
pub trait ProjectionService {
    /// Projects the requested geometry into ordered 2D segments.
    ///
    /// # Errors
    ///
    /// Returns an error if the projection cannot be computed, e.g. for an
    /// unusable viewpoint.
    fn project(&self, request: &ProjectionRequest<'_>) -> Result<Vec<Segment>, ServiceError>;
}

/// A 3D intersection curve between two objects.
#[derive(Debug, Clone)]
pub struct IntersectionCurve {
    /// The curve geometry.
    pub curve: DrawCurve,
    /// The two objects it lies on.
    pub parents: (ObjectRef, ObjectRef),
}

/// Computes intersection curves between solids or surfaces.
pub trait IntersectionService {
    /// Intersects one pair of objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the intersection cannot be computed.
    fn intersect(
        &self,
        a: ObjectRef,
        b: ObjectRef,
        tolerance: f64,
    ) -> Result<Vec<IntersectionCurve>, ServiceError>;
}

/// Samples the concavity of a 3D edge.
pub trait EdgeConcavity {
    /// Concavity of `edge` at `point`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge cannot be resolved or sampled.
    fn concavity(
        &self,
        edge: EdgeRef,
        point: &Point3,
        tolerance: f64,
    ) -> Result<Concavity, ServiceError>;
}

/// Resolves the display color a segment inherits from its source.
pub trait ColorResolver {
    /// Color for a segment with this parent, or `None` to use the layer's.
    fn color_of(&self, parent: &ParentCurveRecord) -> Option<Color>;
}

impl<F> ColorResolver for F
where
    F: Fn(&ParentCurveRecord) -> Option<Color>,
{
    fn color_of(&self, parent: &ParentCurveRecord) -> Option<Color> {
        self(parent)
    }
}

/// Resolver that leaves every segment on its layer color.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByLayer;

impl ColorResolver for ByLayer {
    fn color_of(&self, _parent: &ParentCurveRecord) -> Option<Color> {
        None
    }
}

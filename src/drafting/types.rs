//! Data model for projected linework.

use std::fmt;

use crate::geometry::curve::DrawCurve;
use crate::math::Point3;

/// Opaque host identifier of a selected solid or surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef(pub u64);

/// A source edge: the owning object plus the index of the edge within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeRef {
    /// Object the edge belongs to.
    pub object: ObjectRef,
    /// Index of the edge sub-entity inside the object.
    pub index: usize,
}

/// Visibility of a segment from the viewpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Not occluded.
    Visible,
    /// Occluded by at least one face.
    Hidden,
}

/// Why an edge shows up in the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SilhouetteCategory {
    /// No drawing meaning.
    None,
    /// An ordinary edge seen in projection, neither outline nor cut.
    Projecting,
    /// Outer boundary of the projected object.
    Boundary,
    /// Sharp crease between faces.
    Crease,
    /// Tangent transition between faces.
    Tangent,
    /// Tangent transition that projects onto an outline.
    TangentProjects,
    /// Cut by a clipping plane.
    SectionCut,
}

impl SilhouetteCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::None,
        Self::Projecting,
        Self::Boundary,
        Self::Crease,
        Self::Tangent,
        Self::TangentProjects,
        Self::SectionCut,
    ];
}

/// Local relation between a 3D edge and its adjacent faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concavity {
    /// Faces meet at an outward-pointing angle.
    Convex,
    /// Faces meet at an inward-pointing angle.
    Concave,
    /// Tangent or undetermined.
    None,
}

impl Concavity {
    /// Every concavity value.
    pub const ALL: [Self; 3] = [Self::Convex, Self::Concave, Self::None];
}

/// Drawing-importance bucket of a segment.
///
/// Declaration order is the weight order: earlier classes draw heavier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WeightClass {
    /// Section cut through the model.
    Cut,
    /// Outline of an object.
    Outline,
    /// Convex interior edge.
    Convex,
    /// Concave interior edge.
    Concave,
    /// Hidden edge.
    Hidden,
}

impl WeightClass {
    /// Every class, heaviest first.
    pub const ALL: [Self; 5] = [
        Self::Cut,
        Self::Outline,
        Self::Convex,
        Self::Concave,
        Self::Hidden,
    ];

    /// Layer name used for this class.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Cut => "Cut",
            Self::Outline => "Outline",
            Self::Convex => "Convex",
            Self::Concave => "Concave",
            Self::Hidden => "Hidden",
        }
    }

    /// Classes whose segments may be split where they coincide with an
    /// intersection curve.
    #[must_use]
    pub fn is_repartitionable(self) -> bool {
        matches!(self, Self::Outline | Self::Convex)
    }
}

impl fmt::Display for WeightClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a projected curve came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveSource {
    /// A B-rep edge.
    Edge(EdgeRef),
    /// An object without a specific edge, e.g. a surface silhouette.
    Object(ObjectRef),
    /// The n-th auxiliary curve handed to the projection service.
    Auxiliary(usize),
    /// Generated by the projection itself.
    Synthetic,
}

impl CurveSource {
    /// The source edge, if any.
    #[must_use]
    pub fn edge(&self) -> Option<EdgeRef> {
        match self {
            Self::Edge(edge) => Some(*edge),
            _ => None,
        }
    }

    /// The source object, if any.
    #[must_use]
    pub fn object(&self) -> Option<ObjectRef> {
        match self {
            Self::Edge(edge) => Some(edge.object),
            Self::Object(object) => Some(*object),
            Self::Auxiliary(_) | Self::Synthetic => None,
        }
    }
}

/// Metadata about the 3D source of a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentCurveRecord {
    /// Why the source shows up in the drawing.
    pub silhouette: SilhouetteCategory,
    /// Identity of the source.
    pub source: CurveSource,
    /// Point on the source edge under the segment's midpoint.
    pub source_point: Option<Point3>,
}

/// A projected 2D piece of linework.
#[derive(Debug, Clone)]
pub struct Segment {
    /// The projected geometry.
    pub curve: DrawCurve,
    /// Visibility from the viewpoint.
    pub visibility: Visibility,
    /// Source record; `None` when the projection lost track of it.
    pub parent: Option<ParentCurveRecord>,
}

impl Segment {
    /// Whether the segment was projected from an auxiliary curve.
    #[must_use]
    pub fn is_auxiliary(&self) -> bool {
        matches!(
            self.parent,
            Some(ParentCurveRecord {
                source: CurveSource::Auxiliary(_),
                ..
            })
        )
    }
}

/// An RGBA display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Opaque color from RGB components.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

use std::f64::consts::{PI, TAU};

use crate::error::{GeometryError, Result};
use crate::math::intersect_2d::PlanarArc;
use crate::math::{Interval, Point3, Vector3, TOLERANCE};

use super::{check_interval, check_parameter, Curve};

/// A circular arc in 3D space.
///
/// Defined by a center, radius, normal axis, and a reference direction
/// for the zero angle. The arc sweeps counter-clockwise around the normal
/// from `start_angle` to `end_angle`; the curve parameter is the arc length
/// `radius * (angle - start_angle)`.
#[derive(Debug, Clone)]
pub struct Arc {
    center: Point3,
    radius: f64,
    normal: Vector3,
    ref_dir: Vector3,
    start_angle: f64,
    end_angle: f64,
}

impl Arc {
    /// Creates a new arc.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the arc circle
    /// * `radius` - Radius (must be positive)
    /// * `normal` - Normal vector defining the arc plane
    /// * `ref_dir` - Reference direction for angle = 0 (must be perpendicular to normal)
    /// * `start_angle` - Start angle in radians
    /// * `end_angle` - End angle in radians, `start_angle <= end_angle <= start_angle + 2π`
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, a vector is zero-length,
    /// the reference direction is not perpendicular to the normal, or the
    /// angle range is inverted or wider than a full turn.
    pub fn new(
        center: Point3,
        radius: f64,
        normal: Vector3,
        ref_dir: Vector3,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
        }

        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / normal_len;

        let ref_len = ref_dir.norm();
        if ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let ref_dir = ref_dir / ref_len;

        if normal.dot(&ref_dir).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to normal".into(),
            )
            .into());
        }

        let sweep = end_angle - start_angle;
        if sweep < 0.0 || sweep > TAU + TOLERANCE {
            return Err(GeometryError::Degenerate(format!(
                "arc sweep {sweep} must lie in [0, 2π]"
            ))
            .into());
        }

        Ok(Self {
            center,
            radius,
            normal,
            ref_dir,
            start_angle,
            end_angle: start_angle + sweep.min(TAU),
        })
    }

    /// Creates a counter-clockwise arc in the XY plane.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Arc::new`].
    pub fn planar(center: Point3, radius: f64, start_angle: f64, end_angle: f64) -> Result<Self> {
        Self::new(
            center,
            radius,
            Vector3::z(),
            Vector3::x(),
            start_angle,
            end_angle,
        )
    }

    /// Returns the center of the arc.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius of the arc.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the normal vector of the arc plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Start angle in the arc's own frame.
    #[must_use]
    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    /// Angular extent, always non-negative.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Computes the second axis direction (perpendicular to both normal and `ref_dir`).
    fn binormal(&self) -> Vector3 {
        self.normal.cross(&self.ref_dir)
    }

    fn point_at_angle(&self, angle: f64) -> Point3 {
        self.center
            + self.ref_dir * (self.radius * angle.cos())
            + self.binormal() * (self.radius * angle.sin())
    }

    /// Start point of the arc.
    #[must_use]
    pub fn start_point(&self) -> Point3 {
        self.point_at_angle(self.start_angle)
    }

    /// End point of the arc.
    #[must_use]
    pub fn end_point(&self) -> Point3 {
        self.point_at_angle(self.end_angle)
    }

    /// Angle of `point` around the arc axis, measured in the arc's frame
    /// and unwrapped to `[start_angle, start_angle + 2π)`.
    #[must_use]
    pub fn angle_of(&self, point: &Point3) -> f64 {
        let v = point - self.center;
        let raw = v.dot(&self.binormal()).atan2(v.dot(&self.ref_dir));
        self.start_angle + (raw - self.start_angle).rem_euclid(TAU)
    }

    /// Points where the circle reaches an extreme along X, Y or Z and that
    /// lie within the sweep.
    #[must_use]
    pub fn extreme_points(&self) -> Vec<Point3> {
        let u = self.ref_dir;
        let v = self.binormal();
        let mut points = Vec::with_capacity(6);
        for k in 0..3 {
            if u[k].abs() < TOLERANCE && v[k].abs() < TOLERANCE {
                continue;
            }
            let base = v[k].atan2(u[k]);
            for theta in [base, base + PI] {
                let unwrapped = self.start_angle + (theta - self.start_angle).rem_euclid(TAU);
                if unwrapped <= self.end_angle {
                    points.push(self.point_at_angle(unwrapped));
                }
            }
        }
        points
    }

    /// The arc expressed in the XY drawing plane, when its normal is
    /// parallel to Z.
    #[must_use]
    pub fn to_planar(&self) -> Option<PlanarArc> {
        if self.normal.z.abs() < 1.0 - TOLERANCE.sqrt() {
            return None;
        }
        let phi = self.ref_dir.y.atan2(self.ref_dir.x);
        // A normal along -Z turns the frame clockwise in XY.
        let (start_angle, sweep) = if self.normal.z > 0.0 {
            (phi + self.start_angle, self.sweep())
        } else {
            (phi - self.start_angle, -self.sweep())
        };
        Some(PlanarArc {
            cx: self.center.x,
            cy: self.center.y,
            radius: self.radius,
            start_angle,
            sweep,
        })
    }
}

impl Curve for Arc {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let t = check_parameter(t, self.length())?;
        Ok(self.point_at_angle(self.start_angle + t / self.radius))
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        let t = check_parameter(t, self.length())?;
        let angle = self.start_angle + t / self.radius;
        let tangent = self.ref_dir * -angle.sin() + self.binormal() * angle.cos();
        let len = tangent.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(tangent / len)
    }

    fn length(&self) -> f64 {
        self.radius * self.sweep()
    }

    fn is_closed(&self) -> bool {
        (self.sweep() - TAU).abs() < TOLERANCE
    }

    fn closest_parameter(&self, point: &Point3) -> f64 {
        let angle = self.angle_of(point);
        if angle <= self.end_angle {
            return (angle - self.start_angle) * self.radius;
        }
        let to_start = (point - self.start_point()).norm();
        let to_end = (point - self.end_point()).norm();
        if to_start <= to_end {
            0.0
        } else {
            self.length()
        }
    }

    fn trim(&self, interval: Interval) -> Result<Self> {
        let iv = check_interval(interval, self.length())?;
        Ok(Self {
            center: self.center,
            radius: self.radius,
            normal: self.normal,
            ref_dir: self.ref_dir,
            start_angle: self.start_angle + iv.min() / self.radius,
            end_angle: self.start_angle + iv.max() / self.radius,
        })
    }
}

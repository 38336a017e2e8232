use std::f64::consts::{PI, TAU};

use super::{Point3, Vector3, TOLERANCE};

/// A circular arc in the XY drawing plane.
///
/// `sweep` is signed: positive sweeps counter-clockwise from `start_angle`.
#[derive(Debug, Clone, Copy)]
pub struct PlanarArc {
    /// Center X.
    pub cx: f64,
    /// Center Y.
    pub cy: f64,
    /// Radius.
    pub radius: f64,
    /// Absolute start angle in radians.
    pub start_angle: f64,
    /// Signed angular extent in radians.
    pub sweep: f64,
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
/// Parallel segments never intersect here; collinear overlap is handled by
/// the caller.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point3,
    a1: &Point3,
    b0: &Point3,
    b1: &Point3,
    tol: f64,
) -> Option<(Point3, f64, f64)> {
    let da = Vector3::new(a1.x - a0.x, a1.y - a0.y, 0.0);
    let db = Vector3::new(b1.x - b0.x, b1.y - b0.y, 0.0);
    let len_a = da.norm();
    let len_b = db.norm();
    if len_a < TOLERANCE || len_b < TOLERANCE {
        return None;
    }

    let cross = da.x * db.y - da.y * db.x;
    if (cross / (len_a * len_b)).abs() < TOLERANCE {
        return None;
    }

    let dx = b0.x - a0.x;
    let dy = b0.y - a0.y;
    let t = (dx * db.y - dy * db.x) / cross;
    let u = (dx * da.y - dy * da.x) / cross;

    // Endpoint slack scaled so `tol` is a distance, not a parameter delta.
    let eps_a = tol / len_a;
    let eps_b = tol / len_b;
    if t >= -eps_a && t <= 1.0 + eps_a && u >= -eps_b && u <= 1.0 + eps_b {
        let t_clamped = t.clamp(0.0, 1.0);
        let pt = Point3::new(a0.x + da.x * t_clamped, a0.y + da.y * t_clamped, a0.z);
        Some((pt, t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Intersection of a line segment with a circular arc in 2D.
///
/// Returns a vector of `(point, t_seg, t_arc)` where both parameters are
/// normalised to `[0, 1]`.
#[must_use]
pub fn segment_arc_intersect_2d(
    a0: &Point3,
    a1: &Point3,
    arc: &PlanarArc,
    tol: f64,
) -> Vec<(Point3, f64, f64)> {
    let mut results = Vec::new();
    if arc.radius < TOLERANCE || arc.sweep.abs() < TOLERANCE {
        return results;
    }

    let dx = a1.x - a0.x;
    let dy = a1.y - a0.y;
    let seg_len_sq = dx * dx + dy * dy;
    if seg_len_sq < TOLERANCE * TOLERANCE {
        return results;
    }

    // Substitute the parametric line into the circle equation:
    // (x0 + t*dx - cx)² + (y0 + t*dy - cy)² = r²
    let fx = a0.x - arc.cx;
    let fy = a0.y - arc.cy;
    let a = seg_len_sq;
    let b = 2.0 * (fx * dx + fy * dy);
    let c = fx * fx + fy * fy - arc.radius * arc.radius;
    let discriminant = b * b - 4.0 * a * c;

    // A line passing within `tol` of the circle counts as tangent.
    let closest = ((fx * dy - fy * dx).abs() / a.sqrt() - arc.radius).abs();
    if discriminant < 0.0 && closest > tol {
        return results;
    }
    let disc_sqrt = discriminant.max(0.0).sqrt();

    let eps = tol / a.sqrt();
    let t_roots = if disc_sqrt < TOLERANCE * 100.0 {
        vec![-b / (2.0 * a)]
    } else {
        vec![(-b - disc_sqrt) / (2.0 * a), (-b + disc_sqrt) / (2.0 * a)]
    };

    let ang_eps = tol / arc.radius;
    for t_seg in t_roots {
        if t_seg < -eps || t_seg > 1.0 + eps {
            continue;
        }
        let t_seg = t_seg.clamp(0.0, 1.0);

        let px = a0.x + t_seg * dx;
        let py = a0.y + t_seg * dy;

        let angle = (py - arc.cy).atan2(px - arc.cx);
        if let Some(t_arc) = angle_to_arc_param(angle, arc.start_angle, arc.sweep, ang_eps) {
            results.push((Point3::new(px, py, a0.z), t_seg, t_arc));
        }
    }

    results
}

/// Intersection of two circular arcs in 2D.
///
/// Returns a vector of `(point, t1, t2)` with arc parameters in `[0, 1]`.
/// Concentric arcs produce no points; coincident runs are an overlap, not a
/// crossing.
#[must_use]
pub fn arc_arc_intersect_2d(a1: &PlanarArc, a2: &PlanarArc, tol: f64) -> Vec<(Point3, f64, f64)> {
    let mut results = Vec::new();
    if a1.radius < TOLERANCE || a2.radius < TOLERANCE {
        return results;
    }

    let dx = a2.cx - a1.cx;
    let dy = a2.cy - a1.cy;
    let dist_sq = dx * dx + dy * dy;
    let dist = dist_sq.sqrt();

    if dist < tol {
        return results;
    }

    let (r1, r2) = (a1.radius, a2.radius);
    let sum = r1 + r2;
    let diff = (r1 - r2).abs();
    if dist > sum + tol || dist < diff - tol {
        return results;
    }

    // Distance from c1 along the line c1→c2 to the radical line.
    let a = (r1 * r1 - r2 * r2 + dist_sq) / (2.0 * dist);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();

    let mx = a1.cx + a * dx / dist;
    let my = a1.cy + a * dy / dist;

    let px = -dy / dist;
    let py = dx / dist;

    let candidates = if h < tol {
        vec![(mx, my)]
    } else {
        vec![(mx + h * px, my + h * py), (mx - h * px, my - h * py)]
    };

    for (ix, iy) in candidates {
        let angle1 = (iy - a1.cy).atan2(ix - a1.cx);
        let angle2 = (iy - a2.cy).atan2(ix - a2.cx);

        let t1 = angle_to_arc_param(angle1, a1.start_angle, a1.sweep, tol / r1);
        let t2 = angle_to_arc_param(angle2, a2.start_angle, a2.sweep, tol / r2);

        if let (Some(t1), Some(t2)) = (t1, t2) {
            results.push((Point3::new(ix, iy, 0.0), t1, t2));
        }
    }

    results
}

/// Angular sub-ranges shared by two counter-clockwise spans on the same
/// circle.
///
/// Both spans are given as `(start, sweep)` with `0 <= sweep <= 2π`. The
/// result holds `(lo, hi)` offsets from `a_start`, within `[0, a_sweep]`.
/// Runs not longer than `eps` are dropped.
#[must_use]
pub fn angular_overlaps(
    a_start: f64,
    a_sweep: f64,
    b_start: f64,
    b_sweep: f64,
    eps: f64,
) -> Vec<(f64, f64)> {
    let d = (b_start - a_start).rem_euclid(TAU);
    let mut runs = Vec::with_capacity(2);
    for shift in [0.0, -TAU] {
        let lo = (d + shift).max(0.0);
        let hi = (d + shift + b_sweep).min(a_sweep);
        if hi - lo > eps {
            runs.push((lo, hi));
        }
    }
    runs
}

/// Converts an absolute angle to an arc parameter `t` in `[0, 1]`.
///
/// Returns `None` if the angle is not within the arc's angular range.
fn angle_to_arc_param(angle: f64, start_angle: f64, sweep: f64, eps: f64) -> Option<f64> {
    let mut delta = angle - start_angle;

    if sweep > 0.0 {
        while delta < -eps {
            delta += 2.0 * PI;
        }
        while delta > 2.0 * PI + eps {
            delta -= 2.0 * PI;
        }
    } else {
        while delta > eps {
            delta -= 2.0 * PI;
        }
        while delta < -2.0 * PI - eps {
            delta += 2.0 * PI;
        }
    }

    let t = delta / sweep;
    let t_eps = eps / sweep.abs();
    if t >= -t_eps && t <= 1.0 + t_eps {
        Some(t.clamp(0.0, 1.0))
    } else {
        None
    }
}

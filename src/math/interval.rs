//! Closed 1D intervals over a curve's arc-length parameter.

use std::cmp::Ordering;

/// A closed parameter range `[min, max]`.
///
/// Construction normalises inverted bounds, so `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    min: f64,
    max: f64,
}

impl Interval {
    /// Creates an interval, swapping the bounds if they are inverted.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// Lower bound.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Width of the interval.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Returns whether `t` lies in the closed range.
    #[must_use]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.min && t <= self.max
    }

    /// Overlap test with open boundaries: intervals that only touch at an
    /// endpoint do not overlap.
    #[must_use]
    pub fn overlaps_open(&self, other: &Interval) -> bool {
        self.min < other.max && self.max > other.min
    }

    /// Ordering by lower bound, then upper bound.
    #[must_use]
    pub fn cmp_by_min(&self, other: &Interval) -> Ordering {
        self.min
            .total_cmp(&other.min)
            .then(self.max.total_cmp(&other.max))
    }
}

/// Subtracts `remove` from every interval in `intervals`.
///
/// An interval entirely inside `remove` vanishes, one straddling it yields
/// up to two fragments. Intervals that merely touch `remove` are kept as they
/// are, which makes the operation idempotent.
#[must_use]
pub fn difference(intervals: &[Interval], remove: Interval) -> Vec<Interval> {
    let mut out = Vec::with_capacity(intervals.len() + 1);
    for iv in intervals {
        // Re-normalise in case the caller built the value by hand elsewhere.
        let iv = Interval::new(iv.min, iv.max);
        if !iv.overlaps_open(&remove) {
            out.push(iv);
            continue;
        }
        if iv.min < remove.min {
            out.push(Interval::new(iv.min, remove.min));
        }
        if iv.max > remove.max {
            out.push(Interval::new(remove.max, iv.max));
        }
    }
    out
}

/// Coalesces overlapping or touching intervals into a sorted, disjoint cover.
#[must_use]
pub fn merge(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals
        .iter()
        .map(|iv| Interval::new(iv.min, iv.max))
        .collect();
    sorted.sort_by(Interval::cmp_by_min);

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for iv in sorted {
        match merged.last_mut() {
            Some(last) if iv.min <= last.max => {
                last.max = last.max.max(iv.max);
            }
            _ => merged.push(iv),
        }
    }
    merged
}

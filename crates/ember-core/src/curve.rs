//! Value-over-lifetime curves and color gradients.
//!
//! Both evaluate over a normalized x-domain (usually a particle's `age / life`)
//! and clamp at the domain edges. Control points are expected to be sorted by
//! x; unsorted input is tolerated by only ever interpolating across spans whose
//! x strictly increases, and snapping to the nearest such span otherwise.

use crate::Color;
use serde::{Deserialize, Serialize};

/// A single `(x, y)` control point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
}

impl CurvePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// How a curve is interpolated between control points
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveInterpolation {
    Linear,
    /// Catmull-Rom through the control points, endpoints duplicated.
    #[default]
    Smooth,
}

/// A piecewise curve over user-authored control points.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Curve {
    pub points: Vec<CurvePoint>,
    pub interpolation: CurveInterpolation,
}

impl Curve {
    pub fn new(points: Vec<CurvePoint>, interpolation: CurveInterpolation) -> Self {
        Self {
            points,
            interpolation,
        }
    }

    pub fn linear(points: &[(f32, f32)]) -> Self {
        Self::new(
            points.iter().map(|&(x, y)| CurvePoint::new(x, y)).collect(),
            CurveInterpolation::Linear,
        )
    }

    pub fn smooth(points: &[(f32, f32)]) -> Self {
        Self::new(
            points.iter().map(|&(x, y)| CurvePoint::new(x, y)).collect(),
            CurveInterpolation::Smooth,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Evaluate the curve at `t`. An empty curve yields `neutral`.
    pub fn evaluate(&self, t: f32, neutral: f32) -> f32 {
        let ys = |i: usize| self.points[i].y;
        match locate(self.points.len(), |i| self.points[i].x, t) {
            None => neutral,
            Some(Bracket::Point(i)) => ys(i),
            Some(Bracket::Span { lo, hi, t }) => match self.interpolation {
                CurveInterpolation::Linear => ys(lo) + (ys(hi) - ys(lo)) * t,
                CurveInterpolation::Smooth => {
                    let before = if lo > 0 { ys(lo - 1) } else { ys(lo) };
                    let after = if hi + 1 < self.points.len() {
                        ys(hi + 1)
                    } else {
                        ys(hi)
                    };
                    catmull_rom_scalar(before, ys(lo), ys(hi), after, t)
                }
            },
        }
    }
}

/// A color stop on a gradient.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: f32,
    pub color: Color,
}

impl GradientStop {
    pub const fn new(position: f32, color: Color) -> Self {
        Self { position, color }
    }
}

/// Linear color gradient over `[0, 1]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gradient {
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    pub fn new(stops: Vec<GradientStop>) -> Self {
        Self { stops }
    }

    /// Two-stop gradient from `start` at 0 to `end` at 1.
    pub fn between(start: Color, end: Color) -> Self {
        Self::new(vec![
            GradientStop::new(0.0, start),
            GradientStop::new(1.0, end),
        ])
    }

    /// Sample the gradient at `t`, saturated into [0, 1]. An empty gradient
    /// is white.
    pub fn sample(&self, t: f32) -> Color {
        let color = match locate(self.stops.len(), |i| self.stops[i].position, t) {
            None => Color::WHITE,
            Some(Bracket::Point(i)) => self.stops[i].color,
            Some(Bracket::Span { lo, hi, t }) => self.stops[lo].color.lerp(&self.stops[hi].color, t),
        };
        color.saturate()
    }
}

/// Catmull-Rom interpolation for a single scalar value.
pub fn catmull_rom_scalar(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

enum Bracket {
    Point(usize),
    Span { lo: usize, hi: usize, t: f32 },
}

/// Find the control-point span to interpolate across for `t`.
///
/// Only spans with strictly increasing, finite x are considered. If none of
/// them contains `t`, the nearest one is used with `t` clamped into it.
fn locate(len: usize, x_at: impl Fn(usize) -> f32, t: f32) -> Option<Bracket> {
    if len == 0 {
        return None;
    }
    let t = if t.is_nan() { 0.0 } else { t };

    let mut nearest: Option<(usize, f32)> = None;
    for lo in 0..len.saturating_sub(1) {
        let (a, b) = (x_at(lo), x_at(lo + 1));
        if !(a.is_finite() && b.is_finite() && b > a) {
            continue;
        }
        if t >= a && t <= b {
            return Some(Bracket::Span {
                lo,
                hi: lo + 1,
                t: (t - a) / (b - a),
            });
        }
        let distance = if t < a { a - t } else { t - b };
        if nearest.map_or(true, |(_, d)| distance < d) {
            nearest = Some((lo, distance));
        }
    }

    match nearest {
        Some((lo, _)) => {
            let (a, b) = (x_at(lo), x_at(lo + 1));
            let local = ((t - a) / (b - a)).clamp(0.0, 1.0);
            Some(Bracket::Span {
                lo,
                hi: lo + 1,
                t: local,
            })
        }
        None => {
            // Single point, or every x identical / non-finite: use the closest point.
            let closest = (0..len)
                .filter(|&i| x_at(i).is_finite())
                .min_by(|&i, &j| {
                    (x_at(i) - t)
                        .abs()
                        .total_cmp(&(x_at(j) - t).abs())
                })
                .unwrap_or(0);
            Some(Bracket::Point(closest))
        }
    }
}

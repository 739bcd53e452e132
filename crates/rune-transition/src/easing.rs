//! Easing curves for the frame driver.
//!
//! Handlers name their easing with CSS timing-function syntax in the
//! `easing` option (`"ease-out"`, `"cubic-bezier(0.4, 0, 0.2, 1)"`).
//! [`EasingFunction::parse`] turns that string into a curve.

use serde::{Deserialize, Serialize};

/// Easing function for transition timing.
///
/// Maps linear progress in `[0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    #[default]
    Linear,
    /// CSS `ease`, `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    Ease,
    /// CSS `ease-in`, `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,
    /// CSS `ease-out`, `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,
    /// CSS `ease-in-out`, `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,
    /// Custom curve; x control points lie in `[0, 1]`.
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl EasingFunction {
    /// Parse a CSS timing-function name.
    ///
    /// Returns `None` for names this driver does not understand, including
    /// bezier curves whose x control points fall outside `[0, 1]`.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        match name {
            "linear" => return Some(Self::Linear),
            "ease" => return Some(Self::Ease),
            "ease-in" | "easeIn" => return Some(Self::EaseIn),
            "ease-out" | "easeOut" => return Some(Self::EaseOut),
            "ease-in-out" | "easeInOut" => return Some(Self::EaseInOut),
            _ => {}
        }

        let args = name.strip_prefix("cubic-bezier(")?.strip_suffix(')')?;
        let points: Vec<f32> = args
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<Result<_, _>>()
            .ok()?;
        let &[x1, y1, x2, y2] = points.as_slice() else {
            return None;
        };
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return None;
        }
        Some(Self::CubicBezier { x1, y1, x2, y2 })
    }

    /// Evaluate the curve at progress `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(*x1, *y1, *x2, *y2, t),
        }
    }
}

fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, progress: f32) -> f32 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }
    let t = solve_x(x1, x2, progress);
    bezier(y1, y2, t)
}

/// Newton-Raphson search for the curve parameter whose x equals `target`.
fn solve_x(x1: f32, x2: f32, target: f32) -> f32 {
    let mut t = target;
    for _ in 0..8 {
        let x = bezier(x1, x2, t) - target;
        if x.abs() < 1e-6 {
            break;
        }
        let dx = bezier_derivative(x1, x2, t);
        if dx.abs() < 1e-6 {
            break;
        }
        t = (t - x / dx).clamp(0.0, 1.0);
    }
    t
}

/// One axis of the curve: 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier(p1: f32, p2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

#[inline]
fn bezier_derivative(p1: f32, p2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

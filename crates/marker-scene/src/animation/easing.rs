//! Easing functions for bar timing.
//!
//! Two families are supported:
//! - CSS timing functions (`linear`, `ease`, `ease-in`, `ease-out`,
//!   `ease-in-out`, custom cubic beziers)
//! - Power curves named the way timeline engines name them (`power1` ..
//!   `power4` with `.in`, `.out` or `.inOut`)
//!
//! # Usage
//!
//! ```
//! use marker_scene::animation::easing::{EaseMode, EasingFunction};
//!
//! let ease = EasingFunction::parse("power3.inOut").unwrap();
//! assert_eq!(ease, EasingFunction::Power { power: 3, mode: EaseMode::InOut });
//! assert!((ease.evaluate(0.5) - 0.5).abs() < 1e-6);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which end of a power curve is eased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EaseMode {
    In,
    Out,
    InOut,
}

/// Easing function for animation timing.
///
/// Easing functions map a linear progress value (0.0 to 1.0) to an eased
/// output value, controlling the rate of change over time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,

    /// CSS `ease`, equivalent to `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    Ease,

    /// CSS `ease-in`, equivalent to `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,

    /// CSS `ease-out`, equivalent to `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,

    /// CSS `ease-in-out`, equivalent to `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,

    /// Custom cubic bezier curve.
    /// x values must be in [0, 1], y values can be any float.
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },

    /// Polynomial curve of degree `power + 1` (`power1` is quadratic,
    /// `power3` is quartic). `power` is 1..=4.
    Power { power: u8, mode: EaseMode },
}

impl Default for EasingFunction {
    fn default() -> Self {
        Self::Power {
            power: 3,
            mode: EaseMode::InOut,
        }
    }
}

impl EasingFunction {
    /// Evaluate the easing function at the given progress.
    ///
    /// `t` is clamped to 0.0..=1.0.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(*x1, *y1, *x2, *y2, t),
            Self::Power { power, mode } => power_curve(*power, *mode, t),
        }
    }

    /// Create a custom cubic bezier easing function.
    ///
    /// # Panics
    /// Panics if x1 or x2 are outside [0, 1].
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2),
            "Bezier x values must be in [0, 1]"
        );
        Self::CubicBezier { x1, y1, x2, y2 }
    }

    /// Parse an easing name.
    ///
    /// Accepts CSS keywords, `none`, `power0`..`power4` with an optional
    /// `.in` / `.out` / `.inOut` suffix (bare `powerN` means `.out`), and the
    /// aliases `quad`, `cubic`, `quart`, `quint`, `strong`.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        match name {
            "linear" | "none" | "power0" => return Some(Self::Linear),
            "ease" => return Some(Self::Ease),
            "ease-in" => return Some(Self::EaseIn),
            "ease-out" => return Some(Self::EaseOut),
            "ease-in-out" => return Some(Self::EaseInOut),
            _ => {}
        }

        let (family, mode) = match name.split_once('.') {
            Some((family, "in")) => (family, EaseMode::In),
            Some((family, "out")) => (family, EaseMode::Out),
            Some((family, "inOut")) => (family, EaseMode::InOut),
            Some(_) => return None,
            None => (name, EaseMode::Out),
        };
        let power = match family {
            "power0" => return Some(Self::Linear),
            "power1" | "quad" => 1,
            "power2" | "cubic" => 2,
            "power3" | "quart" => 3,
            "power4" | "quint" | "strong" => 4,
            _ => return None,
        };
        Some(Self::Power { power, mode })
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Ease => write!(f, "ease"),
            Self::EaseIn => write!(f, "ease-in"),
            Self::EaseOut => write!(f, "ease-out"),
            Self::EaseInOut => write!(f, "ease-in-out"),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
            Self::Power { power, mode } => {
                let suffix = match mode {
                    EaseMode::In => "in",
                    EaseMode::Out => "out",
                    EaseMode::InOut => "inOut",
                };
                write!(f, "power{power}.{suffix}")
            }
        }
    }
}

fn power_curve(power: u8, mode: EaseMode, t: f32) -> f32 {
    let exponent = i32::from(power.clamp(1, 4)) + 1;
    match mode {
        EaseMode::In => t.powi(exponent),
        EaseMode::Out => 1.0 - (1.0 - t).powi(exponent),
        EaseMode::InOut => {
            if t < 0.5 {
                (2.0 * t).powi(exponent) / 2.0
            } else {
                1.0 - (2.0 * (1.0 - t)).powi(exponent) / 2.0
            }
        }
    }
}

/// Evaluate a cubic bezier curve at time t.
///
/// Uses Newton-Raphson iteration to find the curve parameter for the input
/// progress, then evaluates the y coordinate at that point.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, progress: f32) -> f32 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let t = solve_bezier_x(x1, x2, progress);
    bezier_y(y1, y2, t)
}

fn solve_bezier_x(x1: f32, x2: f32, target_x: f32) -> f32 {
    let mut t = target_x;

    for _ in 0..8 {
        let x = bezier_x(x1, x2, t) - target_x;
        if x.abs() < 1e-6 {
            break;
        }

        let dx = bezier_x_derivative(x1, x2, t);
        if dx.abs() < 1e-6 {
            break;
        }

        t -= x / dx;
        t = t.clamp(0.0, 1.0);
    }

    t
}

/// x(t) = 3(1-t)²t·x1 + 3(1-t)t²·x2 + t³
#[inline]
fn bezier_x(x1: f32, x2: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;

    3.0 * mt2 * t * x1 + 3.0 * mt * t2 * x2 + t3
}

#[inline]
fn bezier_y(y1: f32, y2: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;

    3.0 * mt2 * t * y1 + 3.0 * mt * t2 * y2 + t3
}

/// dx/dt = 3(1-t)²·x1 + 6(1-t)t·(x2-x1) + 3t²·(1-x2)
#[inline]
fn bezier_x_derivative(x1: f32, x2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * x1 + 6.0 * mt * t * (x2 - x1) + 3.0 * t * t * (1.0 - x2)
}

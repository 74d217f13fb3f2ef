#![forbid(unsafe_code)]

//! Easing curves for layout transitions.
//!
//! The default curve is the "standard" Material curve
//! `cubic-bezier(0.4, 0.0, 0.2, 1)`, which is what grid transitions use
//! unless configured otherwise.
//!
//! # Invariants
//!
//! - `apply(0.0) == 0.0` and `apply(1.0) == 1.0` for every curve.
//! - Input is clamped to `[0.0, 1.0]`.
//! - Non-finite input maps to 0.0.

use serde::{Deserialize, Serialize};

/// Easing function for grid transitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Linear interpolation.
    Linear,
    /// Cubic ease-in (accelerating).
    EaseIn,
    /// Cubic ease-out (decelerating).
    EaseOut,
    /// Cubic S-curve.
    EaseInOut,
    /// CSS-style cubic Bézier with control points `(x1, y1)` and `(x2, y2)`.
    CubicBezier(f64, f64, f64, f64),
}

impl Default for Easing {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl Easing {
    /// `cubic-bezier(0.4, 0.0, 0.2, 1)`.
    pub const STANDARD: Self = Self::CubicBezier(0.4, 0.0, 0.2, 1.0);

    /// Apply the easing function to a progress value (0.0 to 1.0).
    pub fn apply(self, t: f64) -> f64 {
        if !t.is_finite() {
            return 0.0;
        }
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t * t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
            Self::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, t),
        }
    }

    /// CSS `<easing-function>` text for hosts that animate natively.
    pub fn css(&self) -> String {
        match self {
            Self::Linear => "linear".to_owned(),
            Self::EaseIn => "ease-in".to_owned(),
            Self::EaseOut => "ease-out".to_owned(),
            Self::EaseInOut => "ease-in-out".to_owned(),
            Self::CubicBezier(x1, y1, x2, y2) => format!("cubic-bezier({x1}, {y1}, {x2}, {y2})"),
        }
    }
}

// Solve x(s) = t for the curve parameter s, then evaluate y(s).
// Newton-Raphson first, bisection when the slope is too flat.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    // CSS requires x control points in [0, 1] so x(s) stays monotonic.
    let x1 = x1.clamp(0.0, 1.0);
    let x2 = x2.clamp(0.0, 1.0);

    let bezier = |a: f64, b: f64, s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * a + 3.0 * inv * s * s * b + s * s * s
    };
    let slope = |a: f64, b: f64, s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * a + 6.0 * inv * s * (b - a) + 3.0 * s * s * (1.0 - b)
    };

    let mut s = t;
    for _ in 0..8 {
        let err = bezier(x1, x2, s) - t;
        if err.abs() < 1e-7 {
            return bezier(y1, y2, s);
        }
        let d = slope(x1, x2, s);
        if d.abs() < 1e-6 {
            break;
        }
        s -= err / d;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = t;
    for _ in 0..64 {
        let x = bezier(x1, x2, s);
        if (x - t).abs() < 1e-7 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    bezier(y1, y2, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::STANDARD,
    ];

    #[test]
    fn endpoints_are_fixed() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{easing:?}");
        }
    }

    #[test]
    fn curves_are_monotonic() {
        for easing in ALL {
            let mut prev = 0.0;
            for i in 0..=100 {
                let v = easing.apply(f64::from(i) / 100.0);
                assert!(v >= prev - 1e-6, "{easing:?} not monotonic at {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
        assert_eq!(Easing::EaseOut.apply(f64::NAN), 0.0);
    }

    #[test]
    fn bezier_linear_controls_match_linear() {
        let lin = Easing::CubicBezier(0.25, 0.25, 0.75, 0.75);
        for i in 1..10 {
            let t = f64::from(i) / 10.0;
            assert!((lin.apply(t) - t).abs() < 1e-4, "t={t}");
        }
    }

    #[test]
    fn standard_curve_decelerates() {
        // Fast start, slow finish: ahead of linear at the midpoint.
        assert!(Easing::STANDARD.apply(0.5) > 0.5);
    }

    #[test]
    fn css_rendering() {
        assert_eq!(Easing::STANDARD.css(), "cubic-bezier(0.4, 0, 0.2, 1)");
        assert_eq!(Easing::EaseInOut.css(), "ease-in-out");
    }

    #[test]
    fn default_is_standard() {
        assert_eq!(Easing::default(), Easing::STANDARD);
    }
}

//! Smooth hand-off masks.
//!
//! ## Purpose
//!
//! Two places need a smooth transition instead of a hard cut: the outer
//! taper that returns the adaptive scale to its canonical value, and the
//! cut-off of a real-space kernel before it wraps around a periodic box.
//!
//! ## Key concepts
//!
//! * **Sigmoid**: `m(x) = 1 / (1 + exp(-k (x - x0)))`, ~0 below `x0`, ~1 above.
//!   The exponent argument is clamped to ±60 to keep `exp` finite.
//! * **Cosine roll-off**: 1 up to `0.85 r_cut`, then `½ (1 + cos(π t))` with
//!   `t` running 0→1 up to `r_cut`, and 0 beyond.
//!
//! ## Invariants
//!
//! * Both masks take values in `[0, 1]` and are monotone in their argument.

// External dependencies
use num_traits::Float;

/// Default sigmoid midpoint, as a fraction of the outermost radius.
pub const DEFAULT_TAPER_R0: f64 = 0.70;

/// Default sigmoid steepness.
pub const DEFAULT_TAPER_K: f64 = 80.0;

/// Start of the cosine roll-off as a fraction of the cut radius.
pub const COSINE_START: f64 = 0.85;

const EXP_CLAMP: f64 = 60.0;

/// Logistic mask rising from 0 to 1 around `x0`.
#[inline]
pub fn sigmoid_mask<T: Float>(x: T, x0: T, k: T) -> T {
    let lim = T::from(EXP_CLAMP).unwrap();
    let z = (k * (x - x0)).max(-lim).min(lim);
    T::one() / (T::one() + (-z).exp())
}

/// Cosine roll-off from 1 to 0 between `0.85 r_cut` and `r_cut`.
#[inline]
pub fn cosine_taper<T: Float>(r: T, r_cut: T) -> T {
    let r0 = T::from(COSINE_START).unwrap() * r_cut;
    if r <= r0 {
        return T::one();
    }
    if r >= r_cut {
        return T::zero();
    }
    let t = (r - r0) / (r_cut - r0).max(T::from(1e-12).unwrap());
    let pi = T::from(core::f64::consts::PI).unwrap();
    T::from(0.5).unwrap() * (T::one() + (pi * t).cos())
}

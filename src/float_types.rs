// Re-export parry for the appropriate float size
#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;

#[cfg(feature = "f32")]
pub use parry3d;

// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Distance tolerance of a boolean operation, as a fraction of the diagonal of
/// the operands' combined bounds. A [`crate::CsgContext`] multiplies the two and
/// clamps the product to at least [`MIN_DISTANCE_TOLERANCE`], so vertices closer
/// than that are welded and points that close to a plane count as on it.
///
/// Fixed on first use. `POLYCSG_TOLERANCE` read at build time replaces the
/// default, and [`set_tolerance_fraction`] replaces it at runtime if called
/// before the first operation.
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

const fn default_tolerance_fraction() -> Real {
    #[cfg(feature = "f32")]
    {
        1e-4
    }
    #[cfg(feature = "f64")]
    {
        1e-6
    }
}

/// Fraction of the bounds diagonal used as distance tolerance.
pub fn tolerance_fraction() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        option_env!("POLYCSG_TOLERANCE")
            .and_then(|value| Real::from_str(value).ok())
            .map_or_else(default_tolerance_fraction, |value| value.max(Real::EPSILON))
    })
}

/// Fix the tolerance fraction. Has no effect once an operation has read it.
pub fn set_tolerance_fraction(value: Real) {
    let _ = TOLERANCE_CELL.set(value.max(Real::EPSILON));
}

/// Smallest distance epsilon a context will ever use, whatever the operand scale.
#[cfg(feature = "f32")]
pub const MIN_DISTANCE_TOLERANCE: Real = 1e-6;
/// Smallest distance epsilon a context will ever use, whatever the operand scale.
#[cfg(feature = "f64")]
pub const MIN_DISTANCE_TOLERANCE: Real = 1e-12;

/// Sine of the largest angle at which two directions still count as parallel.
#[cfg(feature = "f32")]
pub const ANGLE_TOLERANCE: Real = 1e-3;
/// Sine of the largest angle at which two directions still count as parallel.
#[cfg(feature = "f64")]
pub const ANGLE_TOLERANCE: Real = 1e-5;

// Pi
/// Archimedes' constant (π)
#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;
/// Archimedes' constant (π)
#[cfg(feature = "f64")]
pub const PI: Real = core::f64::consts::PI;

// Tau
/// The full circle constant (τ)
#[cfg(feature = "f32")]
pub const TAU: Real = core::f32::consts::TAU;
/// The full circle constant (τ)
#[cfg(feature = "f64")]
pub const TAU: Real = core::f64::consts::TAU;

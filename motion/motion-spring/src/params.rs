//! Parameters for inertialization.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Blending parameters for a [`PoseInertializer`](crate::PoseInertializer).
///
/// # Example
///
/// ```
/// use motion_spring::InertializeParams;
///
/// let params = InertializeParams::default();
/// assert!((params.halflife - 0.1).abs() < 1e-6);
///
/// let smooth = InertializeParams::smooth().halflife(0.3);
/// assert!((smooth.halflife - 0.3).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InertializeParams {
    /// Time (seconds) for the remaining offset to halve.
    pub halflife: f32,
    /// Offsets below this magnitude count as settled.
    pub settle_tolerance: f32,
}

impl Default for InertializeParams {
    fn default() -> Self {
        Self {
            halflife: 0.1, // half the mismatch gone every 0.1s
            settle_tolerance: 1e-4,
        }
    }
}

impl InertializeParams {
    /// Quick blends for responsive characters.
    #[must_use]
    pub const fn responsive() -> Self {
        Self {
            halflife: 0.05,
            settle_tolerance: 1e-4,
        }
    }

    /// Slow blends that hide large pose jumps.
    #[must_use]
    pub const fn smooth() -> Self {
        Self {
            halflife: 0.2,
            settle_tolerance: 1e-4,
        }
    }

    /// Set the half-life.
    #[must_use]
    pub const fn halflife(mut self, halflife: f32) -> Self {
        self.halflife = halflife;
        self
    }

    /// Set the settle tolerance.
    #[must_use]
    pub const fn settle_tolerance(mut self, tolerance: f32) -> Self {
        self.settle_tolerance = tolerance;
        self
    }
}

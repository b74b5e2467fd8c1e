//! Error types for field construction.
//!
//! Only settings can be rejected. Once a field exists every operation on it
//! is total and bad runtime input is ignored.

use core::fmt;

/// Reasons a [`Settings`](crate::Settings) value cannot drive a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsError {
    /// Size range is empty, inverted or not strictly positive.
    SizeRange { min: f32, max: f32 },
    /// Speed range is empty, inverted or not strictly positive.
    SpeedRange { min: f32, max: f32 },
    /// Elasticity must lie in (0, 1].
    Elasticity(f32),
    /// Collision radius must be strictly positive.
    CollisionRadius(f32),
    /// Lifetime must be positive and jitter non-negative.
    Lifetime { base: f32, jitter: f32 },
    /// A timing interval was negative or not finite.
    Interval(f32),
    /// A probability fell outside [0, 1].
    Probability(f32),
    /// A cosmetic or force coefficient was negative or not finite.
    Coefficient(f32),
    /// Container size is negative or not finite.
    Bounds { width: f32, height: f32 },
    /// No colors to draw from.
    EmptyPalette,
    /// Requested particle count does not fit the arena.
    CapacityExceedsPool { requested: usize, pool: usize },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::SizeRange { min, max } => {
                write!(f, "Invalid size range {}..{}: bounds must be positive and ordered", min, max)
            }
            SettingsError::SpeedRange { min, max } => {
                write!(f, "Invalid speed range {}..{}: bounds must be positive and ordered", min, max)
            }
            SettingsError::Elasticity(e) => {
                write!(f, "Boundary elasticity {} is outside (0, 1]", e)
            }
            SettingsError::CollisionRadius(r) => {
                write!(f, "Collision radius {} must be greater than zero", r)
            }
            SettingsError::Lifetime { base, jitter } => write!(
                f,
                "Invalid lifetime {} ms with jitter {} ms: lifetime must be positive, jitter non-negative",
                base, jitter
            ),
            SettingsError::Interval(ms) => write!(f, "Interval {} ms must be finite and non-negative", ms),
            SettingsError::Probability(p) => write!(f, "Probability {} is outside [0, 1]", p),
            SettingsError::Coefficient(c) => write!(f, "Coefficient {} must be finite and non-negative", c),
            SettingsError::Bounds { width, height } => {
                write!(f, "Invalid container size {}x{}", width, height)
            }
            SettingsError::EmptyPalette => write!(f, "Palette must contain at least one color"),
            SettingsError::CapacityExceedsPool { requested, pool } => write!(
                f,
                "Particle count {} exceeds the arena size {}",
                requested, pool
            ),
        }
    }
}

impl core::error::Error for SettingsError {}

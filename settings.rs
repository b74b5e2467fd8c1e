//! Field configuration.

use heapless::Vec;

use crate::error::SettingsError;
use crate::particle::Rgba;

/// Most colors a palette can hold.
pub const PALETTE_CAPACITY: usize = 8;

/// Spice orange, ancient gold, accent blue.
pub const DEFAULT_PALETTE: [Rgba; 3] = [
    Rgba::new(255, 138, 0, 179),
    Rgba::new(179, 135, 40, 153),
    Rgba::new(100, 255, 218, 128),
];

/// Every tunable of a [`ParticleField`](crate::ParticleField).
///
/// Distances are in container pixels, speeds in pixels per tick, times in
/// milliseconds of the host clock.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    // Population
    /// Initial burst size and target count for periodic emission.
    pub particle_count: usize,

    // Appearance
    pub min_size: f32,
    pub max_size: f32,
    pub palette: Vec<Rgba, PALETTE_CAPACITY>,
    /// Passed through to the renderer untouched.
    pub glow_intensity: f32,

    // Motion
    pub min_speed: f32,
    pub max_speed: f32,
    /// Fraction of velocity kept (sign-reversed) after a wall bounce.
    pub boundary_elasticity: f32,
    /// Scale of the pairwise repulsion impulse.
    pub collision_force: f32,
    /// Chance a colliding particle adopts its neighbour's color.
    pub color_bleed_chance: f32,

    // Interaction
    /// Initial pointer interaction radius.
    pub collision_radius: f32,

    // Timing
    pub lifetime: f32,
    /// Upper bound (exclusive) of the random extra lifetime.
    pub lifetime_jitter: f32,
    pub emission_interval: f32,
    /// Gap between particles released by a transmission burst.
    pub burst_spacing: f32,

    pub rng_seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let mut palette = Vec::new();
        for color in DEFAULT_PALETTE {
            let _ = palette.push(color);
        }

        Self {
            particle_count: 30,
            min_size: 5.0,
            max_size: 20.0,
            palette,
            glow_intensity: 0.7,
            min_speed: 0.5,
            max_speed: 2.0,
            boundary_elasticity: 0.8,
            collision_force: 0.05,
            color_bleed_chance: 0.2,
            collision_radius: 20.0,
            lifetime: 8000.0,
            lifetime_jitter: 2000.0,
            emission_interval: 500.0,
            burst_spacing: 100.0,
            rng_seed: 0x5EED_CAFE,
        }
    }
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

fn non_negative(v: f32) -> bool {
    v.is_finite() && v >= 0.0
}

impl Settings {
    /// Checks the construction preconditions.
    ///
    /// The arena size is not known here; [`ParticleField::new`](crate::ParticleField::new)
    /// checks `particle_count` against it separately.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !positive(self.min_size) || !positive(self.max_size) || self.min_size > self.max_size {
            return Err(SettingsError::SizeRange { min: self.min_size, max: self.max_size });
        }
        if !positive(self.min_speed) || !positive(self.max_speed) || self.min_speed > self.max_speed {
            return Err(SettingsError::SpeedRange { min: self.min_speed, max: self.max_speed });
        }
        if !positive(self.boundary_elasticity) || self.boundary_elasticity > 1.0 {
            return Err(SettingsError::Elasticity(self.boundary_elasticity));
        }
        if !positive(self.collision_radius) {
            return Err(SettingsError::CollisionRadius(self.collision_radius));
        }
        if !positive(self.lifetime) || !non_negative(self.lifetime_jitter) {
            return Err(SettingsError::Lifetime { base: self.lifetime, jitter: self.lifetime_jitter });
        }
        for interval in [self.emission_interval, self.burst_spacing] {
            if !non_negative(interval) {
                return Err(SettingsError::Interval(interval));
            }
        }
        if !non_negative(self.color_bleed_chance) || self.color_bleed_chance > 1.0 {
            return Err(SettingsError::Probability(self.color_bleed_chance));
        }
        for coefficient in [self.collision_force, self.glow_intensity] {
            if !non_negative(coefficient) {
                return Err(SettingsError::Coefficient(coefficient));
            }
        }
        if self.palette.is_empty() {
            return Err(SettingsError::EmptyPalette);
        }
        Ok(())
    }
}

/// Planar container size. Depth is always `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Finite and non-negative in both axes.
    pub fn is_valid(&self) -> bool {
        non_negative(self.width) && non_negative(self.height)
    }
}

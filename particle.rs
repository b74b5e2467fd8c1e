//! Particle entity and its per-tick motion steps.

use core::f32::consts::TAU;

use rand::Rng;

use crate::render::Visual;
use crate::settings::{Bounds, Settings};

/// Depth range is `0..=DEPTH`; depth only scales apparent size.
pub const DEPTH: f32 = 100.0;

/// 8-bit color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Apparent size at depth `z`: half size at the back, one and a half at the front.
#[inline]
pub fn display_size(base_size: f32, z: f32) -> f32 {
    base_size * (z / DEPTH + 0.5)
}

/// Fade curve over normalized age.
///
/// Linear ramp up over the first tenth of the lifetime, full opacity until
/// nine tenths, linear ramp down to zero at the end.
pub fn opacity(life: f32) -> f32 {
    if life < 0.1 {
        life * 10.0
    } else if life > 0.9 {
        (1.0 - life) * 10.0
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
    pub base_size: f32,
    /// Always `display_size(base_size, z)` for the current `z`.
    pub size: f32,
    pub color: Rgba,
    /// Host clock at admission, in milliseconds.
    pub created_at: f64,
    pub lifetime: f32,
    /// Last computed fade value.
    pub opacity: f32,
}

impl Particle {
    /// A particle at rest.
    pub fn new(x: f32, y: f32, z: f32, base_size: f32, color: Rgba, created_at: f64, lifetime: f32) -> Self {
        Self {
            x,
            y,
            z,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            base_size,
            size: display_size(base_size, z),
            color,
            created_at,
            lifetime,
            opacity: 0.0,
        }
    }

    pub fn with_velocity(mut self, vx: f32, vy: f32, vz: f32) -> Self {
        self.vx = vx;
        self.vy = vy;
        self.vz = vz;
        self
    }

    /// Draws a fresh particle somewhere inside `bounds`.
    pub(crate) fn spawn<R: Rng>(rng: &mut R, settings: &Settings, bounds: Bounds, now: f64) -> Self {
        let x = rng.gen::<f32>() * bounds.width;
        let y = rng.gen::<f32>() * bounds.height;
        let z = rng.gen::<f32>() * DEPTH;
        let base_size = settings.min_size + rng.gen::<f32>() * (settings.max_size - settings.min_size);

        let angle = rng.gen::<f32>() * TAU;
        let speed = settings.min_speed + rng.gen::<f32>() * (settings.max_speed - settings.min_speed);
        let vz = (rng.gen::<f32>() - 0.5) * speed;

        let color = settings.palette[rng.gen_range(0..settings.palette.len())];
        let lifetime = settings.lifetime + rng.gen::<f32>() * settings.lifetime_jitter;

        Particle::new(x, y, z, base_size, color, now, lifetime).with_velocity(
            libm::cosf(angle) * speed,
            libm::sinf(angle) * speed,
            vz,
        )
    }

    /// Age over lifetime; `>= 1.0` means expired.
    pub fn life_fraction(&self, now: f64) -> f32 {
        ((now - self.created_at) / self.lifetime as f64) as f32
    }

    /// One tick of motion. Velocity is per tick, there is no time step.
    #[inline]
    pub fn integrate(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.z += self.vz;
    }

    pub fn reflect_depth(&mut self, elasticity: f32) {
        if self.z < 0.0 {
            self.z = 0.0;
            self.vz *= -elasticity;
        } else if self.z > DEPTH {
            self.z = DEPTH;
            self.vz *= -elasticity;
        }
    }

    #[inline]
    pub fn refresh_size(&mut self) {
        self.size = display_size(self.base_size, self.z);
    }

    pub fn reflect_planar(&mut self, bounds: Bounds, elasticity: f32) {
        if self.x < 0.0 {
            self.x = 0.0;
            self.vx *= -elasticity;
        } else if self.x > bounds.width {
            self.x = bounds.width;
            self.vx *= -elasticity;
        }

        if self.y < 0.0 {
            self.y = 0.0;
            self.vy *= -elasticity;
        } else if self.y > bounds.height {
            self.y = bounds.height;
            self.vy *= -elasticity;
        }
    }

    /// Pushes the particle away from a pointer at `(px, py)`.
    ///
    /// Returns the impulse magnitude, or `None` when out of reach. The
    /// magnitude falls off linearly from 1 at the pointer to 0 at `radius`;
    /// it turns slightly negative between `radius` and the particle's edge.
    pub fn repel_from(&mut self, px: f32, py: f32, radius: f32) -> Option<f32> {
        let dx = self.x - px;
        let dy = self.y - py;
        let distance = libm::sqrtf(dx * dx + dy * dy);

        if distance >= radius + self.size / 2.0 {
            return None;
        }

        let angle = libm::atan2f(dy, dx);
        let force = (radius - distance) / radius;
        self.vx += libm::cosf(angle) * force;
        self.vy += libm::sinf(angle) * force;
        Some(force)
    }

    pub fn visual(&self) -> Visual {
        Visual {
            x: self.x,
            y: self.y,
            z: self.z,
            size: self.size,
            opacity: self.opacity,
            color: self.color,
        }
    }
}

//! spice_field - particle emitter core
//!
//! A fixed arena of drifting, bouncing, fading particles. The host calls
//! [`ParticleField::tick`] once per display refresh with its clock in
//! milliseconds and forwards pointer and resize events in between. Painting
//! is left to a [`RenderSink`].
//!
//! No heap allocation, no_std compatible.

#![cfg_attr(not(test), no_std)]

mod control;
mod error;
mod particle;
mod render;
mod settings;

pub use control::{Controls, Pointer};
pub use error::SettingsError;
pub use particle::{display_size, opacity, Particle, Rgba, DEPTH};
pub use render::{ParticleId, RenderSink, Visual};
pub use settings::{Bounds, Settings, DEFAULT_PALETTE, PALETTE_CAPACITY};

use core::f32::consts::PI;

use heapless::Vec;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

#[derive(Clone, Copy)]
struct Slot {
    particle: Particle,
    generation: u16,
    /// Admission order, for last-in-first-out removal.
    seq: u64,
    active: bool,
}

impl Slot {
    const VACANT: Slot = Slot {
        particle: Particle {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            base_size: 0.0,
            size: 0.0,
            color: Rgba::new(0, 0, 0, 0),
            created_at: 0.0,
            lifetime: 0.0,
            opacity: 0.0,
        },
        generation: 0,
        seq: 0,
        active: false,
    };

    fn id(&self, index: usize) -> ParticleId {
        ParticleId { slot: index as u16, generation: self.generation }
    }
}

/// Post-motion state of one survivor, read by the pairwise pass.
#[derive(Clone, Copy)]
struct Contact {
    slot: usize,
    x: f32,
    y: f32,
    z: f32,
    size: f32,
    color: Rgba,
}

impl Contact {
    fn of(slot: usize, p: &Particle) -> Self {
        Self { slot, x: p.x, y: p.y, z: p.z, size: p.size, color: p.color }
    }
}

/// Pending transmission burst.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Burst {
    remaining: usize,
    next_at: f64,
}

/// Owner of every live particle and of the interaction state they react to.
///
/// `MAX` is the arena size and the hard ceiling on live particles.
/// `Settings::particle_count` is the softer capacity kept up by periodic
/// emission; forced additions may exceed it up to `MAX`.
pub struct ParticleField<const MAX: usize> {
    slots: [Slot; MAX],
    active: usize,
    next_seq: u64,

    bounds: Bounds,
    pointer: Pointer,
    interaction_radius: f32,

    /// Host clock seen by the last tick (or construction).
    now: f64,
    last_emission: f64,
    burst: Option<Burst>,

    rng: SmallRng,
    settings: Settings,
}

impl<const MAX: usize> ParticleField<MAX> {
    /// Builds a field holding `settings.particle_count` fresh particles.
    ///
    /// Every initial particle is announced to `sink`. The emission clock
    /// starts at `now`.
    pub fn new<S: RenderSink>(
        settings: Settings,
        bounds: Bounds,
        now: f64,
        sink: &mut S,
    ) -> Result<Self, SettingsError> {
        const { assert!(MAX <= u16::MAX as usize, "arena slots are addressed by u16") };

        Self::check(&settings)?;
        if !bounds.is_valid() {
            return Err(SettingsError::Bounds { width: bounds.width, height: bounds.height });
        }

        let mut field = Self {
            slots: [Slot::VACANT; MAX],
            active: 0,
            next_seq: 0,
            bounds,
            pointer: Pointer::default(),
            interaction_radius: settings.collision_radius,
            now,
            last_emission: now,
            burst: None,
            rng: SmallRng::seed_from_u64(settings.rng_seed),
            settings,
        };

        for _ in 0..field.settings.particle_count {
            field.admit_random(sink);
        }

        debug!(
            count = field.active,
            pool = MAX,
            width = bounds.width,
            height = bounds.height,
            "particle field ready"
        );
        Ok(field)
    }

    fn check(settings: &Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        if settings.particle_count > MAX {
            return Err(SettingsError::CapacityExceedsPool {
                requested: settings.particle_count,
                pool: MAX,
            });
        }
        Ok(())
    }

    /// Replaces the tunables. Live particles keep their drawn attributes;
    /// the interaction radius and RNG state carry over.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        Self::check(&settings)?;
        debug!(count = settings.particle_count, "particle settings updated");
        self.settings = settings;
        Ok(())
    }

    // ========== Simulation ==========

    /// Advances every particle by one step.
    ///
    /// Expired particles are retired first, survivors move and bounce, get
    /// pushed by the pointer and by each other, then are reported to `sink`.
    /// Finally periodic emission and any pending burst may admit newcomers.
    pub fn tick<S: RenderSink>(&mut self, now: f64, sink: &mut S) {
        self.now = now;

        let elasticity = self.settings.boundary_elasticity;
        let bounds = self.bounds;
        let pointer = self.pointer.position();
        let radius = self.interaction_radius;

        let mut contacts: Vec<Contact, MAX> = Vec::new();

        for index in 0..MAX {
            if !self.slots[index].active {
                continue;
            }

            let life = self.slots[index].particle.life_fraction(now);
            if life >= 1.0 {
                self.retire(index, sink);
                continue;
            }

            let p = &mut self.slots[index].particle;
            p.opacity = opacity(life);
            p.integrate();
            p.reflect_depth(elasticity);
            p.refresh_size();
            p.reflect_planar(bounds, elasticity);

            if let Some((px, py)) = pointer {
                p.repel_from(px, py, radius);
            }

            // Cannot overflow: one contact per slot.
            let _ = contacts.push(Contact::of(index, p));
        }

        self.collide(&contacts);

        for contact in &contacts {
            let slot = &self.slots[contact.slot];
            sink.update(slot.id(contact.slot), &slot.particle.visual());
        }

        self.emit(now, sink);
        self.release_burst(now, sink);
    }

    /// Pairwise repulsion between overlapping survivors.
    ///
    /// Every impulse is computed from the snapshot in `contacts`, so the
    /// result does not depend on slot order. Colors are adopted from the
    /// snapshot too, at most once per particle per tick.
    // PERF: O(n^2) over live particles; n is bounded by MAX
    fn collide(&mut self, contacts: &[Contact]) {
        let strength = self.settings.collision_force;
        let bleed = self.settings.color_bleed_chance;

        for a in contacts {
            let (mut ix, mut iy, mut iz) = (0.0f32, 0.0f32, 0.0f32);
            let mut adopted = None;

            for b in contacts {
                if a.slot == b.slot {
                    continue;
                }

                let dx = a.x - b.x;
                let dy = a.y - b.y;
                let dz = a.z - b.z;
                let distance = libm::sqrtf(dx * dx + dy * dy + dz * dz);
                let min_distance = (a.size + b.size) / 2.0;

                if distance >= min_distance {
                    continue;
                }

                let force = (min_distance - distance) / min_distance * strength;

                // Coincident pairs split along slot order.
                let lower = a.slot < b.slot;
                let angle = if dx == 0.0 && dy == 0.0 {
                    if lower {
                        PI
                    } else {
                        0.0
                    }
                } else {
                    libm::atan2f(dy, dx)
                };

                ix += libm::cosf(angle) * force;
                iy += libm::sinf(angle) * force;
                iz += if dz > 0.0 || (dz == 0.0 && !lower) { force } else { -force };

                if adopted.is_none() && self.rng.gen::<f32>() < bleed {
                    adopted = Some(b.color);
                }
            }

            let p = &mut self.slots[a.slot].particle;
            p.vx += ix;
            p.vy += iy;
            p.vz += iz;
            if let Some(color) = adopted {
                p.color = color;
            }
        }
    }

    /// Periodic top-up towards `particle_count`.
    fn emit<S: RenderSink>(&mut self, now: f64, sink: &mut S) {
        if now - self.last_emission >= self.settings.emission_interval as f64
            && self.active < self.settings.particle_count
        {
            self.admit_random(sink);
            self.last_emission = now;
        }
    }

    fn release_burst<S: RenderSink>(&mut self, now: f64, sink: &mut S) {
        while let Some(mut burst) = self.burst {
            if now < burst.next_at {
                break;
            }

            self.force_add(sink);
            burst.remaining -= 1;
            burst.next_at += self.settings.burst_spacing as f64;
            self.burst = if burst.remaining == 0 { None } else { Some(burst) };
        }
    }

    // ========== Admission and retirement ==========

    fn admit_random<S: RenderSink>(&mut self, sink: &mut S) -> Option<ParticleId> {
        let particle = Particle::spawn(&mut self.rng, &self.settings, self.bounds, self.now);
        self.admit(particle, sink)
    }

    /// Places `particle` in the first vacant slot.
    pub(crate) fn admit<S: RenderSink>(&mut self, particle: Particle, sink: &mut S) -> Option<ParticleId> {
        let Some(index) = self.slots.iter().position(|slot| !slot.active) else {
            warn!(pool = MAX, "particle arena full, admission dropped");
            return None;
        };

        let slot = &mut self.slots[index];
        slot.particle = particle;
        slot.seq = self.next_seq;
        slot.active = true;
        self.next_seq += 1;
        self.active += 1;

        let id = slot.id(index);
        sink.create(id, &slot.particle.visual());
        trace!(slot = index, generation = id.generation, "particle admitted");
        Some(id)
    }

    fn retire<S: RenderSink>(&mut self, index: usize, sink: &mut S) -> ParticleId {
        let slot = &mut self.slots[index];
        let id = slot.id(index);
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.active -= 1;

        sink.dispose(id);
        trace!(slot = index, generation = id.generation, "particle retired");
        id
    }

    // ========== Control surface ==========

    /// Admits one particle now, ignoring capacity and the emission clock.
    ///
    /// Returns `None` only when every arena slot is taken.
    pub fn force_add<S: RenderSink>(&mut self, sink: &mut S) -> Option<ParticleId> {
        let id = self.admit_random(sink);
        debug!(count = self.active, "particle force-added");
        id
    }

    /// Retires the most recently admitted particle, if any.
    pub fn force_remove<S: RenderSink>(&mut self, sink: &mut S) -> Option<ParticleId> {
        let index = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .max_by_key(|(_, slot)| slot.seq)
            .map(|(index, _)| index)?;

        let id = self.retire(index, sink);
        debug!(count = self.active, "particle force-removed");
        Some(id)
    }

    /// Queues `count` forced additions, released from the next tick on at
    /// `burst_spacing` intervals. Adds to a burst already pending.
    pub fn schedule_burst(&mut self, count: usize) {
        if count == 0 {
            return;
        }

        self.burst = Some(match self.burst {
            Some(burst) => Burst { remaining: burst.remaining + count, ..burst },
            None => Burst { remaining: count, next_at: self.now },
        });
        debug!(pending = self.pending_burst(), "burst scheduled");
    }

    /// Ignored unless `radius` is finite and positive.
    pub fn set_interaction_radius(&mut self, radius: f32) {
        if radius.is_finite() && radius > 0.0 {
            self.interaction_radius = radius;
        }
    }

    /// New container size for the next tick's clamping. Negative or
    /// non-finite sizes are ignored.
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        let bounds = Bounds::new(width, height);
        if bounds.is_valid() {
            self.bounds = bounds;
        }
    }

    pub fn pointer_enter(&mut self) {
        self.pointer.enter();
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pointer.move_to(x, y);
    }

    pub fn pointer_leave(&mut self) {
        self.pointer.leave();
    }

    /// Enter and move in one step.
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer.enter();
        self.pointer.move_to(x, y);
    }

    pub fn clear_pointer(&mut self) {
        self.pointer.leave();
    }

    /// Handle for triggers that live outside the animation loop.
    pub fn controls<'a, S: RenderSink>(&'a mut self, sink: &'a mut S) -> Controls<'a, MAX, S> {
        Controls { field: self, sink }
    }

    // ========== Accessors ==========

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.slots
            .get(id.slot())
            .filter(|slot| slot.active && slot.generation == id.generation)
            .map(|slot| &slot.particle)
    }

    pub fn particles(&self) -> impl Iterator<Item = (ParticleId, &Particle)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(index, slot)| (slot.id(index), &slot.particle))
    }

    pub fn len(&self) -> usize {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Target count for periodic emission.
    pub fn capacity(&self) -> usize {
        self.settings.particle_count
    }

    pub fn pool_size(&self) -> usize {
        MAX
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn interaction_radius(&self) -> f32 {
        self.interaction_radius
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Particles still to be released by the current burst.
    pub fn pending_burst(&self) -> usize {
        self.burst.map_or(0, |burst| burst.remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Recorder;

    const ORANGE: Rgba = DEFAULT_PALETTE[0];
    const BLUE: Rgba = DEFAULT_PALETTE[2];

    fn long_lived(count: usize) -> Settings {
        Settings {
            particle_count: count,
            lifetime: 1.0e7,
            lifetime_jitter: 0.0,
            ..Settings::default()
        }
    }

    fn empty_field<const MAX: usize>(settings: Settings, bounds: Bounds) -> ParticleField<MAX> {
        let mut field = ParticleField::new(settings, bounds, 0.0, &mut ()).unwrap();
        while field.force_remove(&mut ()).is_some() {}
        field
    }

    fn resting(x: f32, y: f32, z: f32) -> Particle {
        Particle::new(x, y, z, 10.0, ORANGE, 0.0, 1.0e7)
    }

    #[test]
    fn test_construct_announces_initial_burst() {
        let mut sink = Recorder::default();
        let field: ParticleField<64> =
            ParticleField::new(Settings::default(), Bounds::new(320.0, 170.0), 5.0, &mut sink).unwrap();

        assert_eq!(field.len(), 30);
        assert_eq!(field.capacity(), 30);
        assert_eq!(sink.created.len(), 30);
        assert!(sink.created.iter().all(|(_, visual)| visual.opacity == 0.0));
        assert_eq!(field.pointer().position(), None);
        assert_eq!(field.interaction_radius(), 20.0);
        assert_eq!(field.now(), 5.0);
    }

    #[test]
    fn test_construct_rejects_bad_input() {
        let result: Result<ParticleField<8>, _> =
            ParticleField::new(long_lived(9), Bounds::new(10.0, 10.0), 0.0, &mut ());
        assert_eq!(
            result.err(),
            Some(SettingsError::CapacityExceedsPool { requested: 9, pool: 8 })
        );

        let result: Result<ParticleField<8>, _> =
            ParticleField::new(long_lived(2), Bounds::new(-1.0, 10.0), 0.0, &mut ());
        assert!(matches!(result, Err(SettingsError::Bounds { .. })));
    }

    #[test]
    fn test_invariants_hold_over_a_long_run() {
        let bounds = Bounds::new(300.0, 200.0);
        let mut field: ParticleField<64> =
            ParticleField::new(Settings::default(), bounds, 0.0, &mut ()).unwrap();
        field.set_pointer(150.0, 100.0);

        let mut now = 0.0;
        for step in 0..2000 {
            now += 16.0;
            if step == 1000 {
                field.set_bounds(120.0, 80.0);
            }
            field.tick(now, &mut ());

            let bounds = field.bounds();
            for (_, p) in field.particles() {
                assert!((0.0..=DEPTH).contains(&p.z));
                assert!((0.0..=bounds.width).contains(&p.x));
                assert!((0.0..=bounds.height).contains(&p.y));
                assert_eq!(p.size, display_size(p.base_size, p.z));
                assert!(p.size > 0.0);
                assert!(p.life_fraction(now) < 1.0);
            }
        }
        assert!(field.len() <= field.capacity());
    }

    #[test]
    fn test_reports_fade_to_the_sink() {
        let mut field: ParticleField<4> = empty_field(long_lived(0), Bounds::new(100.0, 100.0));
        let id = field
            .admit(Particle::new(50.0, 50.0, 50.0, 10.0, ORANGE, 0.0, 1000.0), &mut ())
            .unwrap();

        let mut sink = Recorder::default();
        field.tick(50.0, &mut sink);
        assert_eq!(sink.updated.len(), 1);
        assert_eq!(sink.updated[0].0, id);
        assert!((sink.updated[0].1.opacity - 0.5).abs() < 1e-6);

        sink.clear();
        field.tick(500.0, &mut sink);
        assert_eq!(sink.updated[0].1.opacity, 1.0);
    }

    #[test]
    fn test_expired_particle_is_retired_on_next_tick() {
        let mut field: ParticleField<4> = empty_field(long_lived(0), Bounds::new(100.0, 100.0));
        let id = field
            .admit(Particle::new(50.0, 50.0, 50.0, 10.0, ORANGE, 0.0, 100.0), &mut ())
            .unwrap();

        let mut sink = Recorder::default();
        field.tick(99.0, &mut sink);
        assert!(field.get(id).is_some());

        sink.clear();
        field.tick(100.0, &mut sink);
        assert!(field.get(id).is_none());
        assert!(field.is_empty());
        assert_eq!(sink.disposed, [id]);
        assert!(sink.updated.is_empty());
    }

    #[test]
    fn test_emission_grows_to_capacity_then_stops() {
        let settings = Settings { emission_interval: 500.0, ..long_lived(3) };
        let mut field: ParticleField<16> = empty_field(settings, Bounds::new(200.0, 200.0));
        assert!(field.is_empty());

        let mut counts = std::vec::Vec::new();
        for step in 1..=6 {
            field.tick(step as f64 * 500.0, &mut ());
            counts.push(field.len());
        }
        assert_eq!(counts, [1, 2, 3, 3, 3, 3]);
    }

    #[test]
    fn test_no_emission_between_intervals() {
        let settings = Settings { emission_interval: 500.0, ..long_lived(3) };
        let mut field: ParticleField<16> = empty_field(settings, Bounds::new(200.0, 200.0));

        field.tick(499.0, &mut ());
        assert_eq!(field.len(), 0);
        field.tick(500.0, &mut ());
        assert_eq!(field.len(), 1);
        field.tick(900.0, &mut ());
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn test_force_add_bypasses_capacity() {
        let mut field: ParticleField<16> =
            ParticleField::new(long_lived(5), Bounds::new(200.0, 200.0), 0.0, &mut ()).unwrap();
        assert!(field.force_add(&mut ()).is_some());
        assert_eq!(field.len(), 6);

        // Emission never trims or tops up past capacity.
        field.tick(10_000.0, &mut ());
        assert_eq!(field.len(), 6);
    }

    #[test]
    fn test_force_add_into_full_arena_is_dropped() {
        let mut field: ParticleField<4> =
            ParticleField::new(long_lived(4), Bounds::new(200.0, 200.0), 0.0, &mut ()).unwrap();
        let mut sink = Recorder::default();
        assert_eq!(field.force_add(&mut sink), None);
        assert_eq!(field.len(), 4);
        assert!(sink.created.is_empty());
    }

    #[test]
    fn test_force_remove_is_last_in_first_out() {
        let mut field: ParticleField<8> = empty_field(long_lived(2), Bounds::new(100.0, 100.0));
        let mut sink = Recorder::default();
        assert_eq!(field.force_remove(&mut sink), None);

        let first = field.force_add(&mut sink).unwrap();
        let second = field.force_add(&mut sink).unwrap();
        assert_eq!(field.force_remove(&mut sink), Some(second));
        assert_eq!(field.force_remove(&mut sink), Some(first));
        assert_eq!(sink.disposed, [second, first]);
        assert!(field.is_empty());
    }

    #[test]
    fn test_stale_handle_does_not_resolve() {
        let mut field: ParticleField<1> = empty_field(long_lived(0), Bounds::new(100.0, 100.0));
        let old = field.admit(resting(10.0, 10.0, 10.0), &mut ()).unwrap();
        field.force_remove(&mut ());
        let new = field.admit(resting(20.0, 20.0, 20.0), &mut ()).unwrap();

        assert_eq!(old.slot(), new.slot());
        assert_ne!(old, new);
        assert!(field.get(old).is_none());
        assert_eq!(field.get(new).map(|p| p.x), Some(20.0));
    }

    #[test]
    fn test_wall_bounce_scenario() {
        let settings = Settings { boundary_elasticity: 0.8, ..long_lived(0) };
        let mut field: ParticleField<4> = ParticleField::new(settings, Bounds::new(100.0, 100.0), 0.0, &mut ()).unwrap();
        let id = field
            .admit(resting(0.0, 50.0, 50.0).with_velocity(-1.0, 0.0, 0.0), &mut ())
            .unwrap();

        field.tick(1.0, &mut ());

        let p = field.get(id).unwrap();
        assert_eq!((p.x, p.y, p.z), (0.0, 50.0, 50.0));
        assert!((p.vx - 0.8).abs() < 1e-6);
        assert_eq!((p.vy, p.vz), (0.0, 0.0));
    }

    #[test]
    fn test_coincident_particles_separate() {
        let settings = Settings { color_bleed_chance: 0.0, ..long_lived(0) };
        let mut field: ParticleField<4> = ParticleField::new(settings, Bounds::new(100.0, 100.0), 0.0, &mut ()).unwrap();
        let a = field.admit(resting(50.0, 50.0, 50.0), &mut ()).unwrap();
        let b = field.admit(resting(50.0, 50.0, 50.0), &mut ()).unwrap();

        field.tick(1.0, &mut ());
        let (pa, pb) = (*field.get(a).unwrap(), *field.get(b).unwrap());
        assert!(pa.vx < 0.0 && pb.vx > 0.0);
        assert!((pa.vx + 0.05).abs() < 1e-6 && (pb.vx - 0.05).abs() < 1e-6);
        assert!(pa.vz < 0.0 && pb.vz > 0.0);

        for step in 2..5 {
            field.tick(step as f64, &mut ());
        }
        let (pa, pb) = (field.get(a).unwrap(), field.get(b).unwrap());
        assert!(pb.x - pa.x > 0.0);
    }

    #[test]
    fn test_pairwise_impulse_is_symmetric() {
        let settings = Settings { color_bleed_chance: 0.0, ..long_lived(0) };
        let mut field: ParticleField<4> = ParticleField::new(settings, Bounds::new(100.0, 100.0), 0.0, &mut ()).unwrap();
        // Both size 10 at z=50: minimum separation 10, distance 2.
        let a = field.admit(resting(50.0, 50.0, 50.0), &mut ()).unwrap();
        let b = field.admit(resting(52.0, 50.0, 50.0), &mut ()).unwrap();

        field.tick(1.0, &mut ());
        let (pa, pb) = (field.get(a).unwrap(), field.get(b).unwrap());
        assert!((pa.vx + 0.04).abs() < 1e-6);
        assert!((pb.vx - 0.04).abs() < 1e-6);
        assert!((pa.vx + pb.vx).abs() < 1e-6);
        assert!((pa.vy + pb.vy).abs() < 1e-6);
    }

    #[test]
    fn test_distant_particles_do_not_interact() {
        let mut field: ParticleField<4> = ParticleField::new(long_lived(0), Bounds::new(100.0, 100.0), 0.0, &mut ()).unwrap();
        let a = field.admit(resting(10.0, 10.0, 50.0), &mut ()).unwrap();
        let b = field.admit(resting(80.0, 80.0, 50.0), &mut ()).unwrap();

        field.tick(1.0, &mut ());
        for id in [a, b] {
            let p = field.get(id).unwrap();
            assert_eq!((p.vx, p.vy, p.vz), (0.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_color_bleed_reads_snapshot() {
        let settings = Settings { color_bleed_chance: 1.0, ..long_lived(0) };
        let mut field: ParticleField<4> = ParticleField::new(settings, Bounds::new(100.0, 100.0), 0.0, &mut ()).unwrap();
        let a = field.admit(resting(50.0, 50.0, 50.0), &mut ()).unwrap();
        let b = field
            .admit(Particle::new(51.0, 50.0, 50.0, 10.0, BLUE, 0.0, 1.0e7), &mut ())
            .unwrap();

        field.tick(1.0, &mut ());
        assert_eq!(field.get(a).unwrap().color, BLUE);
        assert_eq!(field.get(b).unwrap().color, ORANGE);
    }

    #[test]
    fn test_pointer_repels_only_during_hover() {
        let mut field: ParticleField<4> = ParticleField::new(long_lived(0), Bounds::new(100.0, 100.0), 0.0, &mut ()).unwrap();
        let id = field.admit(resting(40.0, 40.0, 50.0), &mut ()).unwrap();

        field.pointer_move(40.0, 40.0);
        field.tick(1.0, &mut ());
        assert_eq!(field.get(id).unwrap().vx, 0.0);

        field.pointer_enter();
        field.pointer_move(40.0, 40.0);
        field.tick(2.0, &mut ());
        let p = *field.get(id).unwrap();
        assert!((p.vx - 1.0).abs() < 1e-6);

        field.pointer_leave();
        field.tick(3.0, &mut ());
        assert!((field.get(id).unwrap().vx - p.vx).abs() < 1e-6);
    }

    #[test]
    fn test_pointer_radius_controls_reach() {
        let mut field: ParticleField<4> = ParticleField::new(long_lived(0), Bounds::new(100.0, 100.0), 0.0, &mut ()).unwrap();
        // size 10, so reach with radius 20 is 25
        let id = field.admit(resting(70.0, 40.0, 50.0), &mut ()).unwrap();
        field.set_pointer(40.0, 40.0);

        field.tick(1.0, &mut ());
        assert_eq!(field.get(id).unwrap().vx, 0.0);

        field.set_interaction_radius(-5.0);
        assert_eq!(field.interaction_radius(), 20.0);
        field.set_interaction_radius(60.0);
        field.tick(2.0, &mut ());
        let p = field.get(id).unwrap();
        assert!((p.vx - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_set_bounds_with_current_size_is_a_no_op() {
        let bounds = Bounds::new(150.0, 90.0);
        let mut plain: ParticleField<32> =
            ParticleField::new(Settings::default(), bounds, 0.0, &mut ()).unwrap();
        let mut resized: ParticleField<32> =
            ParticleField::new(Settings::default(), bounds, 0.0, &mut ()).unwrap();

        resized.set_bounds(150.0, 90.0);
        for step in 1..=50 {
            plain.tick(step as f64 * 16.0, &mut ());
            resized.tick(step as f64 * 16.0, &mut ());
        }

        assert!(plain.particles().eq(resized.particles()));
    }

    #[test]
    fn test_invalid_bounds_are_ignored() {
        let mut field: ParticleField<4> = empty_field(long_lived(0), Bounds::new(100.0, 100.0));
        field.set_bounds(-10.0, 50.0);
        field.set_bounds(f32::INFINITY, 50.0);
        assert_eq!(field.bounds(), Bounds::new(100.0, 100.0));
    }

    #[test]
    fn test_shrinking_bounds_clamps_on_next_tick() {
        let mut field: ParticleField<4> = empty_field(long_lived(0), Bounds::new(100.0, 100.0));
        let id = field.admit(resting(90.0, 90.0, 50.0).with_velocity(1.0, 0.0, 0.0), &mut ()).unwrap();

        field.set_bounds(50.0, 50.0);
        assert_eq!(field.get(id).unwrap().x, 90.0);

        field.tick(1.0, &mut ());
        let p = field.get(id).unwrap();
        assert_eq!((p.x, p.y), (50.0, 50.0));
        assert!(p.vx < 0.0);
    }

    #[test]
    fn test_burst_releases_on_spacing() {
        let settings = Settings { burst_spacing: 100.0, ..long_lived(1) };
        let mut field: ParticleField<16> =
            ParticleField::new(settings, Bounds::new(100.0, 100.0), 0.0, &mut ()).unwrap();

        field.schedule_burst(3);
        field.schedule_burst(0);
        assert_eq!(field.pending_burst(), 3);

        field.tick(0.0, &mut ());
        assert_eq!(field.len(), 2);
        field.tick(50.0, &mut ());
        assert_eq!(field.len(), 2);
        field.tick(100.0, &mut ());
        assert_eq!(field.len(), 3);
        field.tick(250.0, &mut ());
        assert_eq!(field.len(), 4);
        assert_eq!(field.pending_burst(), 0);
    }

    #[test]
    fn test_late_tick_catches_up_burst() {
        let settings = Settings { burst_spacing: 100.0, ..long_lived(0) };
        let mut field: ParticleField<16> =
            ParticleField::new(settings, Bounds::new(100.0, 100.0), 0.0, &mut ()).unwrap();

        field.schedule_burst(10);
        field.tick(450.0, &mut ());
        assert_eq!(field.len(), 5);
        assert_eq!(field.pending_burst(), 5);
    }

    #[test]
    fn test_update_settings_validates() {
        let mut field: ParticleField<8> =
            ParticleField::new(long_lived(2), Bounds::new(100.0, 100.0), 0.0, &mut ()).unwrap();

        let bad = Settings { boundary_elasticity: 2.0, ..long_lived(2) };
        assert!(field.update_settings(bad).is_err());
        assert_eq!(field.settings().boundary_elasticity, 0.8);

        let good = Settings { boundary_elasticity: 0.5, ..long_lived(6) };
        assert!(field.update_settings(good).is_ok());
        assert_eq!(field.capacity(), 6);
        assert_eq!(field.len(), 2);
    }

    #[test]
    fn test_every_survivor_updated_once_per_tick() {
        let mut sink = Recorder::default();
        let mut field: ParticleField<32> =
            ParticleField::new(long_lived(12), Bounds::new(200.0, 200.0), 0.0, &mut sink).unwrap();

        sink.clear();
        field.tick(16.0, &mut sink);
        let mut ids: std::vec::Vec<_> = sink.updated.iter().map(|(id, _)| *id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 12);
        assert_eq!(sink.updated.len(), 12);
    }
}

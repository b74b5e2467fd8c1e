//! Signals sent to whatever paints the particles.
//!
//! The field never draws. It tells a [`RenderSink`] when a particle appears,
//! where it is after each tick, and when it is gone. The sink owns any DOM
//! nodes, sprites or GPU buffers it needs for that.

use crate::particle::Rgba;

/// Stable handle to an arena slot.
///
/// The generation changes every time the slot is reused, so a handle held
/// past its particle's retirement no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId {
    pub(crate) slot: u16,
    pub(crate) generation: u16,
}

impl ParticleId {
    pub fn slot(&self) -> usize {
        self.slot as usize
    }

    pub fn generation(&self) -> u16 {
        self.generation
    }
}

/// What a renderer needs to paint one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visual {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub size: f32,
    pub opacity: f32,
    pub color: Rgba,
}

pub trait RenderSink {
    /// A particle was admitted.
    fn create(&mut self, _id: ParticleId, _visual: &Visual) {}

    /// A particle survived a tick.
    fn update(&mut self, _id: ParticleId, _visual: &Visual) {}

    /// A particle was retired; its handle is now stale.
    fn dispose(&mut self, _id: ParticleId) {}
}

/// Headless sink.
impl RenderSink for () {}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn create(&mut self, id: ParticleId, visual: &Visual) {
        (**self).create(id, visual)
    }

    fn update(&mut self, id: ParticleId, visual: &Visual) {
        (**self).update(id, visual)
    }

    fn dispose(&mut self, id: ParticleId) {
        (**self).dispose(id)
    }
}

/// Sink that keeps every signal, for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub created: std::vec::Vec<(ParticleId, Visual)>,
    pub updated: std::vec::Vec<(ParticleId, Visual)>,
    pub disposed: std::vec::Vec<ParticleId>,
}

#[cfg(test)]
impl Recorder {
    pub fn clear(&mut self) {
        self.created.clear();
        self.updated.clear();
        self.disposed.clear();
    }
}

#[cfg(test)]
impl RenderSink for Recorder {
    fn create(&mut self, id: ParticleId, visual: &Visual) {
        self.created.push((id, *visual));
    }

    fn update(&mut self, id: ParticleId, visual: &Visual) {
        self.updated.push((id, *visual));
    }

    fn dispose(&mut self, id: ParticleId) {
        self.disposed.push(id);
    }
}

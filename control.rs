//! Pointer hover tracking and the external control handle.

use crate::render::{ParticleId, RenderSink};
use crate::ParticleField;

/// Hover session of the host pointer over the container.
///
/// Moves only count between an enter and a leave; a move outside a session
/// leaves the pointer absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    hovering: bool,
    position: Option<(f32, f32)>,
}

impl Pointer {
    pub fn enter(&mut self) {
        self.hovering = true;
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        if self.hovering && x.is_finite() && y.is_finite() {
            self.position = Some((x, y));
        }
    }

    pub fn leave(&mut self) {
        self.hovering = false;
        self.position = None;
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Container-relative position, if the pointer is interacting.
    pub fn position(&self) -> Option<(f32, f32)> {
        if self.hovering {
            self.position
        } else {
            None
        }
    }
}

/// Borrowed handle for triggers outside the animation loop.
///
/// Obtained from [`ParticleField::controls`]; carries the sink so that
/// particles added or removed here are announced like any other.
pub struct Controls<'a, const MAX: usize, S: RenderSink> {
    pub(crate) field: &'a mut ParticleField<MAX>,
    pub(crate) sink: &'a mut S,
}

impl<'a, const MAX: usize, S: RenderSink> Controls<'a, MAX, S> {
    pub fn add_particle(&mut self) -> Option<ParticleId> {
        self.field.force_add(&mut *self.sink)
    }

    pub fn remove_particle(&mut self) -> Option<ParticleId> {
        self.field.force_remove(&mut *self.sink)
    }

    pub fn set_collision_radius(&mut self, radius: f32) {
        self.field.set_interaction_radius(radius);
    }

    /// Queues `count` particles released one per burst spacing by later ticks.
    pub fn transmit(&mut self, count: usize) {
        self.field.schedule_burst(count);
    }
}

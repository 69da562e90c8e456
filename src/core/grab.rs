use glam::Vec3;

use crate::core::soa::ParticlesSoA;

/// Pin-to-target interaction state for one soft body.
///
/// While a particle is grabbed its position is overwritten with `target` at
/// the end of every substep, overriding constraints and collisions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GrabState {
    particle: Option<usize>,
    target: Vec3,
}

impl GrabState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grabs the particle nearest to `point` with a linear scan.
    ///
    /// Returns the grabbed index; an empty particle set leaves the grab
    /// inactive.
    pub fn start(&mut self, particles: &ParticlesSoA, point: Vec3) -> Option<usize> {
        self.particle = particles.nearest(point);
        self.target = point;
        self.particle
    }

    /// Moves the pin target; ignored when nothing is grabbed.
    pub fn move_to(&mut self, point: Vec3) {
        if self.particle.is_some() {
            self.target = point;
        }
    }

    pub fn end(&mut self) {
        self.particle = None;
    }

    pub fn particle(&self) -> Option<usize> {
        self.particle
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn is_active(&self) -> bool {
        self.particle.is_some()
    }

    /// Forces the grabbed particle onto the target.
    #[inline]
    pub fn apply(&self, particles: &mut ParticlesSoA) {
        if let Some(index) = self.particle {
            particles.positions[index] = self.target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_until_released() {
        let mut particles = ParticlesSoA::from_positions(&[Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)]);
        let mut grab = GrabState::new();

        assert_eq!(grab.start(&particles, Vec3::new(0.0, 0.9, 0.0)), Some(1));
        assert!(grab.is_active());
        grab.move_to(Vec3::new(0.5, 2.0, 0.0));
        grab.apply(&mut particles);
        assert_eq!(particles.positions[1], Vec3::new(0.5, 2.0, 0.0));

        grab.end();
        assert!(!grab.is_active());
        particles.positions[1] = Vec3::ZERO;
        grab.apply(&mut particles);
        assert_eq!(particles.positions[1], Vec3::ZERO);
    }

    #[test]
    fn empty_body_leaves_grab_inactive() {
        let mut grab = GrabState::new();
        assert_eq!(grab.start(&ParticlesSoA::default(), Vec3::ONE), None);
        assert!(!grab.is_active());
    }

    #[test]
    fn nan_point_does_not_pin_anything() {
        let mut particles = ParticlesSoA::from_positions(&[Vec3::ZERO, Vec3::X]);
        let mut grab = GrabState::new();

        assert_eq!(grab.start(&particles, Vec3::splat(f32::NAN)), None);
        assert!(!grab.is_active());
        grab.apply(&mut particles);
        assert!(particles.all_finite());
    }
}

//! World-box clamping and the kinematic floor friction approximation.

use glam::Vec3;

use crate::{core::mesh::Aabb, core::soa::ParticlesSoA, utils::math::clamp_to_bounds};

/// Ground contact model: the world box plus a floor plane at `y = 0`.
///
/// Friction here is not a force law. A particle pushed onto the floor has its
/// tangential (X/Z) displacement for the substep pulled back towards where it
/// started, by a fraction `min(1, dt * coefficient)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorFriction {
    pub bounds: Aabb,
    pub coefficient: f32,
}

impl FloorFriction {
    pub fn new(bounds: Aabb, coefficient: f32) -> Self {
        Self {
            bounds,
            coefficient,
        }
    }

    /// Fraction of the substep's tangential motion undone on contact.
    #[inline]
    pub fn damping(&self, dt: f32) -> f32 {
        (dt * self.coefficient).min(1.0)
    }

    /// Clamps every particle into the box and applies floor friction.
    ///
    /// Returns the number of particles that touched the floor.
    pub fn apply(&self, particles: &mut ParticlesSoA, dt: f32) -> usize {
        let damping = self.damping(dt);
        let mut contacts = 0;
        for (x, prev) in particles
            .positions
            .iter_mut()
            .zip(particles.prev_positions.iter())
        {
            if self.resolve_particle(x, *prev, damping) {
                contacts += 1;
            }
        }
        contacts
    }

    #[inline]
    fn resolve_particle(&self, x: &mut Vec3, prev: Vec3, damping: f32) -> bool {
        *x = clamp_to_bounds(*x, self.bounds.min, self.bounds.max);
        if x.y >= 0.0 {
            return false;
        }

        x.y = 0.0;
        let delta = prev - *x;
        x.x += delta.x * damping;
        x.z += delta.z * damping;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_WORLD_BOUNDS;

    fn floor(coefficient: f32) -> FloorFriction {
        FloorFriction::new(Aabb::from_array(DEFAULT_WORLD_BOUNDS), coefficient)
    }

    #[test]
    fn particle_above_floor_is_untouched() {
        let mut particles = ParticlesSoA::from_positions(&[Vec3::new(0.3, 0.5, -0.2)]);
        particles.prev_positions[0] = Vec3::new(0.0, 0.6, 0.0);

        assert_eq!(floor(1000.0).apply(&mut particles, 0.01), 0);
        assert_eq!(particles.positions[0], Vec3::new(0.3, 0.5, -0.2));
    }

    #[test]
    fn full_damping_restores_tangential_start() {
        let mut particles = ParticlesSoA::from_positions(&[Vec3::new(0.5, -0.1, 0.25)]);
        particles.prev_positions[0] = Vec3::new(0.0, 0.05, 0.0);

        assert_eq!(floor(1000.0).apply(&mut particles, 0.01), 1);
        assert_eq!(particles.positions[0], Vec3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn partial_damping_scales_the_pullback() {
        let mut particles = ParticlesSoA::from_positions(&[Vec3::new(1.0, -0.1, 0.0)]);
        particles.prev_positions[0] = Vec3::ZERO;
        let friction = floor(10.0);

        assert!((friction.damping(0.01) - 0.1).abs() < 1e-6);
        friction.apply(&mut particles, 0.01);
        assert!((particles.positions[0].x - 0.9).abs() < 1e-6);
        assert_eq!(particles.positions[0].y, 0.0);
    }

    #[test]
    fn box_clamp_applies_on_every_axis() {
        let mut particles = ParticlesSoA::from_positions(&[Vec3::new(9.0, 20.0, -9.0)]);
        particles.prev_positions[0] = particles.positions[0];

        floor(0.0).apply(&mut particles, 0.01);
        assert_eq!(particles.positions[0], Vec3::new(2.5, 10.0, -2.5));
    }
}

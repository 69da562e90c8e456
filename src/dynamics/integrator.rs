use glam::Vec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::soa::ParticlesSoA;

/// Explicit prediction and XPBD velocity recovery for soft body particles.
///
/// Both passes touch each particle independently, so the optional rayon path
/// produces the same bits as the sequential one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Integrator {
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    parallel: bool,
}

impl Integrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_parallel(&mut self, enabled: bool) {
        self.parallel = enabled;
    }

    /// `v += g * dt; prev = x; x += v * dt` for every particle.
    pub fn predict(&self, particles: &mut ParticlesSoA, gravity: Vec3, dt: f32) {
        let ParticlesSoA {
            positions,
            prev_positions,
            velocities,
            ..
        } = particles;

        #[cfg(feature = "parallel")]
        if self.parallel {
            positions
                .par_iter_mut()
                .zip(prev_positions.par_iter_mut())
                .zip(velocities.par_iter_mut())
                .for_each(|((x, prev), v)| predict_particle(x, prev, v, gravity, dt));
            return;
        }

        for ((x, prev), v) in positions
            .iter_mut()
            .zip(prev_positions.iter_mut())
            .zip(velocities.iter_mut())
        {
            predict_particle(x, prev, v, gravity, dt);
        }
    }

    /// `v = (x - prev) / dt` for every particle, overwriting the old velocity.
    pub fn update_velocities(&self, particles: &mut ParticlesSoA, dt: f32) {
        let inv_dt = 1.0 / dt;
        let ParticlesSoA {
            positions,
            prev_positions,
            velocities,
            ..
        } = particles;

        #[cfg(feature = "parallel")]
        if self.parallel {
            velocities
                .par_iter_mut()
                .zip(positions.par_iter())
                .zip(prev_positions.par_iter())
                .for_each(|((v, x), prev)| *v = (*x - *prev) * inv_dt);
            return;
        }

        for ((v, x), prev) in velocities
            .iter_mut()
            .zip(positions.iter())
            .zip(prev_positions.iter())
        {
            *v = (*x - *prev) * inv_dt;
        }
    }
}

#[inline]
fn predict_particle(x: &mut Vec3, prev: &mut Vec3, v: &mut Vec3, gravity: Vec3, dt: f32) {
    *v += gravity * dt;
    *prev = *x;
    *x += *v * dt;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn predict_then_recover_gives_gravity_velocity() {
        let mut particles = ParticlesSoA::from_positions(&[Vec3::new(0.0, 1.0, 0.0)]);
        let integrator = Integrator::new();
        let dt = 0.01;

        integrator.predict(&mut particles, Vec3::new(0.0, -10.0, 0.0), dt);
        assert_eq!(particles.prev_positions[0], Vec3::new(0.0, 1.0, 0.0));
        assert_abs_diff_eq!(particles.positions[0].y, 1.0 - 0.001, epsilon = 1e-6);

        integrator.update_velocities(&mut particles, dt);
        assert_abs_diff_eq!(particles.velocities[0].y, -0.1, epsilon = 1e-4);
    }

    #[test]
    fn velocity_only_reflects_last_displacement() {
        let mut particles = ParticlesSoA::from_positions(&[Vec3::ZERO]);
        particles.velocities[0] = Vec3::new(100.0, 0.0, 0.0);
        particles.prev_positions[0] = Vec3::ZERO;
        particles.positions[0] = Vec3::new(0.0, 0.5, 0.0);

        Integrator::new().update_velocities(&mut particles, 0.5);
        assert_eq!(particles.velocities[0], Vec3::new(0.0, 1.0, 0.0));
    }
}

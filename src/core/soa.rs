use glam::Vec3;

/// Structure-of-Arrays storage for soft body particles.
///
/// Every buffer has one entry per particle and is sized once at construction,
/// so the simulation step never allocates.
#[derive(Debug, Clone, Default)]
pub struct ParticlesSoA {
    /// Current positions, rewritten every substep.
    pub positions: Vec<Vec3>,
    /// Positions at the start of the current substep.
    pub prev_positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    /// Zero marks an immovable particle.
    pub inverse_masses: Vec<f32>,
}

impl ParticlesSoA {
    /// Creates particles at rest at `positions` with no mass assigned yet.
    pub fn from_positions(positions: &[Vec3]) -> Self {
        let count = positions.len();
        Self {
            positions: positions.to_vec(),
            prev_positions: positions.to_vec(),
            velocities: vec![Vec3::ZERO; count],
            inverse_masses: vec![0.0; count],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sum of `1 / inv_mass` over movable particles.
    pub fn total_mass(&self) -> f32 {
        self.inverse_masses
            .iter()
            .filter(|&&w| w > 0.0)
            .map(|&w| 1.0 / w)
            .sum()
    }

    /// Index of the particle closest to `point`; the first minimum wins ties.
    ///
    /// Returns `None` when no distance is comparable, e.g. for a NaN point.
    pub fn nearest(&self, point: Vec3) -> Option<usize> {
        let mut best = None;
        let mut min_d2 = f32::INFINITY;
        for (index, position) in self.positions.iter().enumerate() {
            let d2 = crate::utils::math::distance_squared(point, *position);
            if d2 < min_d2 {
                min_d2 = d2;
                best = Some(index);
            }
        }
        best
    }

    /// Writes positions into a flat 3-per-particle buffer.
    ///
    /// Copies `min(len, out.len() / 3)` particles.
    pub fn write_positions_flat(&self, out: &mut [f32]) {
        for (dst, p) in out.chunks_exact_mut(3).zip(&self.positions) {
            dst[0] = p.x;
            dst[1] = p.y;
            dst[2] = p.z;
        }
    }

    pub fn all_finite(&self) -> bool {
        self.positions.iter().all(|p| p.is_finite())
            && self.velocities.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_prefers_first_on_ties() {
        let particles = ParticlesSoA::from_positions(&[
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 5.0, 0.0),
        ]);
        assert_eq!(particles.nearest(Vec3::ZERO), Some(0));
        assert_eq!(particles.nearest(Vec3::new(0.0, 4.0, 0.0)), Some(2));
        assert_eq!(ParticlesSoA::default().nearest(Vec3::ZERO), None);
    }

    #[test]
    fn nearest_ignores_nan_point() {
        let particles = ParticlesSoA::from_positions(&[Vec3::ZERO, Vec3::X, Vec3::Y]);
        assert_eq!(particles.nearest(Vec3::new(f32::NAN, 0.0, 0.0)), None);
    }

    #[test]
    fn flat_positions_follow_particle_order() {
        let particles = ParticlesSoA::from_positions(&[Vec3::new(1.0, 2.0, 3.0), Vec3::splat(4.0)]);
        let mut flat = [0.0f32; 6];
        particles.write_positions_flat(&mut flat);
        assert_eq!(flat, [1.0, 2.0, 3.0, 4.0, 4.0, 4.0]);
    }
}

//! Per-tetrahedron rest-pose data and mass distribution.

use glam::Mat3;
use log::{debug, warn};

use crate::core::soa::ParticlesSoA;
use crate::utils::math::{determinant, edge_matrix, inverse_or_zero};

/// Rest quantities for every tetrahedron of a soft body.
///
/// Derived once by [`TetElements::init_physics`] and never recomputed.
#[derive(Debug, Clone, Default)]
pub struct TetElements {
    pub ids: Vec<[usize; 4]>,
    /// Inverse of the rest edge matrix `Dm`; zero for degenerate tets.
    pub inv_rest_poses: Vec<Mat3>,
    /// Signed rest volume `det(Dm) / 6`.
    pub rest_volumes: Vec<f32>,
    /// Reciprocal of the unsigned rest volume, `1 / |V|`, or zero for
    /// degenerate tets. Never negative, so the compliance term stays
    /// non-negative for inverted tets too.
    pub inv_rest_volumes: Vec<f32>,
    degenerate_count: usize,
    inverted_count: usize,
}

impl TetElements {
    /// Derives rest poses and volumes from the current particle positions and
    /// distributes tet mass to particles.
    ///
    /// Each tet adds a quarter of `|V| * density` to each of its vertices; the
    /// accumulated masses are then inverted in place. Particles that belong to
    /// no (non-degenerate) tet keep an inverse mass of zero and are immovable.
    /// Must be run on rest positions: running it on a deformed body bakes the
    /// deformation into the rest pose.
    pub fn init_physics(tets: &[[usize; 4]], particles: &mut ParticlesSoA, density: f32) -> Self {
        let count = tets.len();
        let mut elements = Self {
            ids: tets.to_vec(),
            inv_rest_poses: Vec::with_capacity(count),
            rest_volumes: Vec::with_capacity(count),
            inv_rest_volumes: Vec::with_capacity(count),
            degenerate_count: 0,
            inverted_count: 0,
        };

        particles.inverse_masses.iter_mut().for_each(|w| *w = 0.0);

        for ids in tets {
            let dm = edge_matrix(&particles.positions, ids);
            let volume = determinant(&dm) / 6.0;
            elements.inv_rest_poses.push(inverse_or_zero(&dm));
            elements.rest_volumes.push(volume);

            if volume == 0.0 {
                elements.degenerate_count += 1;
                elements.inv_rest_volumes.push(0.0);
                continue;
            }
            if volume < 0.0 {
                elements.inverted_count += 1;
            }

            let particle_mass = volume.abs() / 4.0 * density;
            for &id in ids {
                particles.inverse_masses[id] += particle_mass;
            }
            elements.inv_rest_volumes.push(1.0 / volume.abs());
        }

        for w in particles.inverse_masses.iter_mut() {
            if *w != 0.0 {
                *w = 1.0 / *w;
            }
        }

        if elements.degenerate_count > 0 {
            warn!(
                "{} of {} tetrahedra have zero rest volume and will stay inert",
                elements.degenerate_count, count
            );
        }
        if elements.inverted_count > 0 {
            warn!(
                "{} of {} tetrahedra have negative orientation",
                elements.inverted_count, count
            );
        }
        debug!(
            "initialised {} tetrahedra over {} particles (total mass {:.4})",
            count,
            particles.len(),
            particles.total_mass()
        );

        elements
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn is_degenerate(&self, tet: usize) -> bool {
        self.rest_volumes[tet] == 0.0
    }

    pub fn degenerate_count(&self) -> usize {
        self.degenerate_count
    }

    pub fn inverted_count(&self) -> usize {
        self.inverted_count
    }

    /// Sum of `|V|` over all tetrahedra.
    pub fn total_rest_volume(&self) -> f32 {
        self.rest_volumes.iter().map(|v| v.abs()).sum()
    }
}

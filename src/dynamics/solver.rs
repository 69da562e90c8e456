//! XPBD projection of the per-tetrahedron deviatoric and hydrostatic constraints.
//!
//! Each tetrahedron carries two constraints on its deformation gradient
//! `F = Ds * Dm^-1`:
//!
//! - deviatoric: `C_D = sqrt(|f0|^2 + |f1|^2 + |f2|^2)`, the Frobenius norm of `F`;
//! - hydrostatic: `C_H = det(F) - 1 - vol_compliance / dev_compliance`.
//!
//! The compliance ratio in `C_H` shifts the volume the hydrostatic constraint
//! settles at.
//!
//! Tets are projected one at a time in index order (Gauss-Seidel); each
//! correction sees positions already moved by earlier tets, so the order
//! determines the exact result.

use glam::{Mat3, Vec3};

use crate::{
    config::PhysicsParams,
    core::{soa::ParticlesSoA, tetrahedra::TetElements},
    utils::math::{cross, determinant, edge_matrix, length_squared, mat_ij, mat_mul},
};

/// Why a constraint projection left the positions untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The constraint value was exactly zero.
    Satisfied,
    /// All four particles are immovable, or every gradient vanished.
    ZeroWeight,
}

/// Result of projecting a single constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstraintOutcome {
    Applied { delta_lambda: f32 },
    Skipped(SkipReason),
}

impl ConstraintOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ConstraintOutcome::Applied { .. })
    }
}

/// Outcome of both projections for one tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementSolve {
    pub deviatoric: ConstraintOutcome,
    pub volume: ConstraintOutcome,
    /// `|det(F) - 1|` measured before the hydrostatic correction.
    pub volume_error: f32,
}

/// Aggregate counters for one pass over all tetrahedra.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SolverStepMetrics {
    pub elements_solved: usize,
    pub deviatoric_applied: usize,
    pub volume_applied: usize,
    pub skipped: usize,
    /// Mean `|det(F) - 1|` over all tetrahedra.
    pub volume_error: f32,
}

impl SolverStepMetrics {
    pub fn record(&mut self, solve: &ElementSolve) {
        self.elements_solved += 1;
        if solve.deviatoric.is_applied() {
            self.deviatoric_applied += 1;
        } else {
            self.skipped += 1;
        }
        if solve.volume.is_applied() {
            self.volume_applied += 1;
        } else {
            self.skipped += 1;
        }
        self.volume_error += solve.volume_error;
    }
}

/// Neo-Hookean style XPBD element solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XpbdSolver {
    pub dev_compliance: f32,
    pub vol_compliance: f32,
}

impl XpbdSolver {
    pub fn new(dev_compliance: f32, vol_compliance: f32) -> Self {
        Self {
            dev_compliance,
            vol_compliance,
        }
    }

    pub fn from_params(params: &PhysicsParams) -> Self {
        Self::new(params.dev_compliance, params.vol_compliance)
    }

    /// Projects every tetrahedron once, in ascending index order.
    pub fn solve(
        &self,
        particles: &mut ParticlesSoA,
        elements: &TetElements,
        dt: f32,
    ) -> SolverStepMetrics {
        let mut metrics = SolverStepMetrics::default();
        for tet in 0..elements.len() {
            let solve = self.solve_elem(particles, elements, tet, dt);
            metrics.record(&solve);
        }
        if metrics.elements_solved > 0 {
            metrics.volume_error /= metrics.elements_solved as f32;
        }
        metrics
    }

    /// Deviatoric then hydrostatic projection of one tetrahedron.
    pub fn solve_elem(
        &self,
        particles: &mut ParticlesSoA,
        elements: &TetElements,
        tet: usize,
        dt: f32,
    ) -> ElementSolve {
        let ids = &elements.ids[tet];
        let inv_rest_pose = &elements.inv_rest_poses[tet];

        let f = deformation_gradient(&particles.positions, ids, inv_rest_pose);
        let r_s = (length_squared(f.x_axis) + length_squared(f.y_axis) + length_squared(f.z_axis))
            .sqrt();
        let deviatoric = if r_s == 0.0 {
            ConstraintOutcome::Skipped(SkipReason::Satisfied)
        } else {
            let grads = element_gradients(&f, inv_rest_pose, 1.0 / r_s);
            apply_to_elem(particles, elements, tet, &grads, r_s, self.dev_compliance, dt)
        };

        let f = deformation_gradient(&particles.positions, ids, inv_rest_pose);
        let df = Mat3::from_cols(
            cross(f.y_axis, f.z_axis),
            cross(f.z_axis, f.x_axis),
            cross(f.x_axis, f.y_axis),
        );
        let grads = element_gradients(&df, inv_rest_pose, 1.0);
        let det_f = determinant(&f);
        let c = det_f - 1.0 - self.vol_compliance / self.dev_compliance;
        let volume = apply_to_elem(particles, elements, tet, &grads, c, self.vol_compliance, dt);

        ElementSolve {
            deviatoric,
            volume,
            volume_error: (det_f - 1.0).abs(),
        }
    }
}

/// `F = Ds * Dm^-1` from current positions.
#[inline]
fn deformation_gradient(positions: &[Vec3], ids: &[usize; 4], inv_rest_pose: &Mat3) -> Mat3 {
    mat_mul(&edge_matrix(positions, ids), inv_rest_pose)
}

/// Gradients for particles 1..=3: `g_k = sum_j m_j * (scale * invRestPose[k-1][j])`.
#[inline]
fn element_gradients(m: &Mat3, inv_rest_pose: &Mat3, scale: f32) -> [Vec3; 3] {
    let mut grads = [Vec3::ZERO; 3];
    for (row, g) in grads.iter_mut().enumerate() {
        *g += m.x_axis * (scale * mat_ij(inv_rest_pose, row, 0));
        *g += m.y_axis * (scale * mat_ij(inv_rest_pose, row, 1));
        *g += m.z_axis * (scale * mat_ij(inv_rest_pose, row, 2));
    }
    grads
}

/// Generalised XPBD update for one constraint of tetrahedron `tet`.
///
/// `grads` holds the gradients for particles 1..=3; particle 0 receives their
/// negated sum so rigid translation produces no correction.
pub fn apply_to_elem(
    particles: &mut ParticlesSoA,
    elements: &TetElements,
    tet: usize,
    grads: &[Vec3; 3],
    c: f32,
    compliance: f32,
    dt: f32,
) -> ConstraintOutcome {
    if c == 0.0 {
        return ConstraintOutcome::Skipped(SkipReason::Satisfied);
    }

    let mut g0 = Vec3::ZERO;
    g0 += grads[0] * -1.0;
    g0 += grads[1] * -1.0;
    g0 += grads[2] * -1.0;
    let g = [g0, grads[0], grads[1], grads[2]];
    let ids = &elements.ids[tet];

    let mut w = 0.0;
    for (gi, &id) in g.iter().zip(ids) {
        w += length_squared(*gi) * particles.inverse_masses[id];
    }
    if w == 0.0 {
        return ConstraintOutcome::Skipped(SkipReason::ZeroWeight);
    }

    let alpha = compliance / dt / dt * elements.inv_rest_volumes[tet];
    let delta_lambda = -c / (w + alpha);

    for (gi, &id) in g.iter().zip(ids) {
        particles.positions[id] += *gi * (delta_lambda * particles.inverse_masses[id]);
    }

    ConstraintOutcome::Applied { delta_lambda }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tet(density: f32) -> (ParticlesSoA, TetElements) {
        let mut particles =
            ParticlesSoA::from_positions(&[Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z]);
        let elements = TetElements::init_physics(&[[0, 1, 2, 3]], &mut particles, density);
        (particles, elements)
    }

    #[test]
    fn rigid_translation_keeps_volume_satisfied() {
        let (mut particles, elements) = unit_tet(1000.0);
        for p in particles.positions.iter_mut() {
            *p += Vec3::new(3.0, -2.0, 0.5);
        }
        let solver = XpbdSolver::new(1.0, 0.0);
        let solve = solver.solve_elem(&mut particles, &elements, 0, 1.0 / 1200.0);

        assert!(solve.deviatoric.is_applied(), "C_D = r_s is never zero for a live tet");
        assert!(solve.volume_error < 1e-5);
    }

    #[test]
    fn immovable_particles_report_zero_weight() {
        let (mut particles, elements) = unit_tet(1000.0);
        particles.inverse_masses.iter_mut().for_each(|w| *w = 0.0);
        let before = particles.positions.clone();

        let solver = XpbdSolver::new(1e-5, 0.0);
        let solve = solver.solve_elem(&mut particles, &elements, 0, 1.0 / 1200.0);

        assert_eq!(solve.deviatoric, ConstraintOutcome::Skipped(SkipReason::ZeroWeight));
        assert_eq!(particles.positions, before);
    }

    #[test]
    fn zero_constraint_value_is_a_no_op() {
        let (mut particles, elements) = unit_tet(1000.0);
        let before = particles.positions.clone();
        let grads = [Vec3::X, Vec3::Y, Vec3::Z];

        let outcome = apply_to_elem(&mut particles, &elements, 0, &grads, 0.0, 0.0, 0.01);

        assert_eq!(outcome, ConstraintOutcome::Skipped(SkipReason::Satisfied));
        assert_eq!(particles.positions, before);
    }

    #[test]
    fn compressed_tet_expands_under_rigid_volume() {
        let (mut particles, elements) = unit_tet(1000.0);
        particles.positions[3] = Vec3::new(0.0, 0.0, 0.5);

        let solver = XpbdSolver::new(1e-5, 0.0);
        let solve = solver.solve_elem(&mut particles, &elements, 0, 1.0 / 1200.0);

        assert!(solve.volume.is_applied());
        assert!((solve.volume_error - 0.5).abs() < 1e-2);
        let f = deformation_gradient(
            &particles.positions,
            &elements.ids[0],
            &elements.inv_rest_poses[0],
        );
        assert!((determinant(&f) - 1.0).abs() < 0.5);
    }

    #[test]
    fn metrics_average_volume_error() {
        let mut metrics = SolverStepMetrics::default();
        let solve = ElementSolve {
            deviatoric: ConstraintOutcome::Applied { delta_lambda: -0.1 },
            volume: ConstraintOutcome::Skipped(SkipReason::Satisfied),
            volume_error: 0.5,
        };
        metrics.record(&solve);
        metrics.record(&solve);
        assert_eq!(metrics.elements_solved, 2);
        assert_eq!(metrics.deviatoric_applied, 2);
        assert_eq!(metrics.volume_applied, 0);
        assert_eq!(metrics.skipped, 2);
        assert_eq!(metrics.volume_error, 1.0);
    }

    #[test]
    fn metrics_count_each_skipped_constraint() {
        let mut metrics = SolverStepMetrics::default();
        metrics.record(&ElementSolve {
            deviatoric: ConstraintOutcome::Skipped(SkipReason::Satisfied),
            volume: ConstraintOutcome::Skipped(SkipReason::ZeroWeight),
            volume_error: 1.0,
        });
        metrics.record(&ElementSolve {
            deviatoric: ConstraintOutcome::Applied { delta_lambda: 0.2 },
            volume: ConstraintOutcome::Applied { delta_lambda: -0.3 },
            volume_error: 0.0,
        });
        assert_eq!(metrics.skipped, 2);
        assert_eq!(metrics.deviatoric_applied, 1);
        assert_eq!(metrics.volume_applied, 1);
    }
}

//! A single tetrahedral soft body and its XPBD substep driver.

use glam::Vec3;
use log::debug;

use crate::{
    config::PhysicsParams,
    core::{
        grab::GrabState, mesh::TetMesh, skin::SurfaceSkin, soa::ParticlesSoA,
        tetrahedra::TetElements,
    },
    dynamics::{ElementSolve, FloorFriction, Integrator, SolverStepMetrics, XpbdSolver},
    error::{TetSimError, TetSimResult},
    utils::profiling::{PhaseTimer, StepProfiler},
};

/// A deformable body simulated with per-tet deviatoric and volume constraints.
///
/// Topology and rest data are fixed at construction. Each call to
/// [`SoftBody::simulate`] advances one substep:
/// predict, project every tet in index order, collide with the world box and
/// floor, pin the grabbed particle, then recover velocities.
#[derive(Debug, Clone)]
pub struct SoftBody {
    particles: ParticlesSoA,
    elements: TetElements,
    edges: Vec<[usize; 2]>,
    grab: GrabState,
    vol_error: f32,
    skin: Option<SurfaceSkin>,
    skinned_positions: Vec<Vec3>,
    integrator: Integrator,
    last_metrics: SolverStepMetrics,
    profiler: StepProfiler,
}

impl SoftBody {
    /// Builds a body at rest on the mesh vertices and derives masses and rest
    /// poses with `params.density`.
    pub fn new(mesh: &TetMesh, params: &PhysicsParams) -> TetSimResult<Self> {
        params.validate()?;

        let mut particles = ParticlesSoA::from_positions(mesh.vertices());
        let elements = TetElements::init_physics(mesh.tets(), &mut particles, params.density);

        debug!(
            "soft body created: {} particles, {} tets, rest volume {:.5}",
            particles.len(),
            elements.len(),
            elements.total_rest_volume()
        );

        Ok(Self {
            particles,
            elements,
            edges: mesh.edges(),
            grab: GrabState::new(),
            vol_error: 0.0,
            skin: None,
            skinned_positions: Vec::new(),
            integrator: Integrator::new(),
            last_metrics: SolverStepMetrics::default(),
            profiler: StepProfiler::default(),
        })
    }

    /// Attaches a display surface driven by barycentric weights.
    pub fn set_skin(&mut self, skin: SurfaceSkin) -> TetSimResult<()> {
        let num_tets = self.elements.len();
        if let Some(binding) = skin.bindings().iter().find(|b| b.tet >= num_tets) {
            return Err(TetSimError::IndexOutOfBounds {
                index: binding.tet,
                count: num_tets,
            });
        }
        self.skinned_positions = vec![Vec3::ZERO; skin.len()];
        skin.update(
            &self.particles.positions,
            &self.elements.ids,
            &mut self.skinned_positions,
        );
        self.skin = Some(skin);
        Ok(())
    }

    pub fn set_parallel(&mut self, enabled: bool) {
        self.integrator.set_parallel(enabled);
    }

    // ---------------------------------------------------------------- phases

    /// Applies gravity and moves particles ballistically.
    pub fn predict(&mut self, dt: f32, params: &PhysicsParams) {
        let _timer = PhaseTimer::new(&mut self.profiler.predict_time);
        self.integrator
            .predict(&mut self.particles, params.gravity_vector(), dt);
    }

    /// Projects every tetrahedron once and records the mean volume error.
    pub fn solve_constraints(&mut self, dt: f32, params: &PhysicsParams) -> SolverStepMetrics {
        let _timer = PhaseTimer::new(&mut self.profiler.solve_time);
        let solver = XpbdSolver::from_params(params);
        let metrics = solver.solve(&mut self.particles, &self.elements, dt);
        self.vol_error = metrics.volume_error;
        self.last_metrics = metrics;
        self.profiler.elements_solved += metrics.elements_solved;
        self.profiler.skipped_projections += metrics.skipped;
        metrics
    }

    /// Clamps into the world box and applies floor friction.
    ///
    /// Returns the number of particles that touched the floor.
    pub fn collide(&mut self, dt: f32, params: &PhysicsParams) -> usize {
        let _timer = PhaseTimer::new(&mut self.profiler.collide_time);
        let contacts = FloorFriction::new(params.world_bounds, params.friction)
            .apply(&mut self.particles, dt);
        self.profiler.floor_contacts += contacts;
        contacts
    }

    /// Forces the grabbed particle onto the grab target.
    pub fn apply_grab(&mut self) {
        self.grab.apply(&mut self.particles);
    }

    /// Recovers velocities from this substep's displacement.
    pub fn update_velocities(&mut self, dt: f32) {
        let _timer = PhaseTimer::new(&mut self.profiler.velocity_time);
        self.integrator.update_velocities(&mut self.particles, dt);
    }

    // ---------------------------------------------------------------- driver

    /// Advances one substep of length `dt`.
    pub fn simulate(&mut self, dt: f32, params: &PhysicsParams) {
        self.predict(dt, params);
        self.solve_constraints(dt, params);
        self.collide(dt, params);
        self.apply_grab();
        self.update_velocities(dt);
        self.profiler.substeps += 1;

        debug_assert!(
            self.particles.all_finite(),
            "soft body state became non-finite"
        );
    }

    /// Runs `num_substeps` substeps of `time_scale * time_step / num_substeps`
    /// and finishes the frame.
    pub fn step_frame(&mut self, params: &PhysicsParams) {
        self.begin_frame();
        let dt = params.substep_dt();
        for _ in 0..params.num_substeps {
            self.simulate(dt, params);
        }
        self.end_frame();
    }

    /// Clears the per-frame profile.
    pub fn begin_frame(&mut self) {
        self.profiler.reset();
    }

    /// Refreshes derived display geometry from the final positions.
    pub fn end_frame(&mut self) {
        if let Some(skin) = &self.skin {
            skin.update(
                &self.particles.positions,
                &self.elements.ids,
                &mut self.skinned_positions,
            );
        }
    }

    /// Deviatoric then volume projection of a single tetrahedron.
    pub fn solve_elem(&mut self, tet: usize, dt: f32, params: &PhysicsParams) -> ElementSolve {
        XpbdSolver::from_params(params).solve_elem(&mut self.particles, &self.elements, tet, dt)
    }

    // ------------------------------------------------------------------ grab

    /// Grabs the particle nearest to `point`, returning its index.
    pub fn start_grab(&mut self, point: Vec3) -> Option<usize> {
        let grabbed = self.grab.start(&self.particles, point);
        if let Some(index) = grabbed {
            debug!("grabbed particle {index}");
        }
        grabbed
    }

    pub fn move_grabbed(&mut self, point: Vec3) {
        self.grab.move_to(point);
    }

    pub fn end_grab(&mut self) {
        self.grab.end();
    }

    pub fn grab_id(&self) -> Option<usize> {
        self.grab.particle()
    }

    pub fn grab_target(&self) -> Vec3 {
        self.grab.target()
    }

    // ------------------------------------------------------------- read side

    pub fn positions(&self) -> &[Vec3] {
        &self.particles.positions
    }

    /// Copies positions into a flat 3-per-particle vertex buffer.
    pub fn write_positions_flat(&self, out: &mut [f32]) {
        self.particles.write_positions_flat(out);
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.particles.velocities
    }

    pub fn inv_masses(&self) -> &[f32] {
        &self.particles.inverse_masses
    }

    /// Mean `|det(F) - 1|` measured during the last constraint pass.
    pub fn volume_error(&self) -> f32 {
        self.vol_error
    }

    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    pub fn skinned_positions(&self) -> &[Vec3] {
        &self.skinned_positions
    }

    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn num_tets(&self) -> usize {
        self.elements.len()
    }

    pub fn particles(&self) -> &ParticlesSoA {
        &self.particles
    }

    /// Direct particle access for scripted setups; not for use mid-step.
    pub fn particles_mut(&mut self) -> &mut ParticlesSoA {
        &mut self.particles
    }

    pub fn elements(&self) -> &TetElements {
        &self.elements
    }

    pub fn last_metrics(&self) -> SolverStepMetrics {
        self.last_metrics
    }

    pub fn profiler(&self) -> &StepProfiler {
        &self.profiler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::skin::SkinBinding;

    #[test]
    fn construction_rejects_invalid_params() {
        let params = PhysicsParams::default().with_substeps(0);
        let err = SoftBody::new(&TetMesh::unit_tetrahedron(), &params).unwrap_err();
        assert!(matches!(err, TetSimError::InvalidConfig(_)));
    }

    #[test]
    fn grab_lifecycle() {
        let mut body =
            SoftBody::new(&TetMesh::unit_tetrahedron(), &PhysicsParams::default()).unwrap();
        assert_eq!(body.grab_id(), None);

        assert_eq!(body.start_grab(Vec3::new(0.9, 0.0, 0.0)), Some(1));
        body.move_grabbed(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(body.grab_target(), Vec3::new(0.0, 2.0, 0.0));

        body.end_grab();
        assert_eq!(body.grab_id(), None);
        body.move_grabbed(Vec3::splat(5.0));
        assert_eq!(body.grab_target(), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn skin_follows_body_at_end_of_frame() {
        let mesh = TetMesh::unit_tetrahedron();
        let params = PhysicsParams::default();
        let mut body = SoftBody::new(&mesh, &params).unwrap();
        let skin = SurfaceSkin::new(
            vec![SkinBinding {
                tet: 0,
                weights: [0.25, 0.25, 0.25],
            }],
            1,
        )
        .unwrap();
        body.set_skin(skin).unwrap();
        assert!(body.skinned_positions()[0].abs_diff_eq(Vec3::splat(0.25), 1e-6));

        body.step_frame(&params);
        let centroid = body.positions().iter().copied().sum::<Vec3>() / 4.0;
        assert!(body.skinned_positions()[0].abs_diff_eq(centroid, 1e-5));
    }

    #[test]
    fn frame_profile_counts_substeps() {
        let params = PhysicsParams::default().with_substeps(4);
        let mut body = SoftBody::new(&TetMesh::unit_tetrahedron(), &params).unwrap();
        body.step_frame(&params);
        assert_eq!(body.profiler().substeps, 4);
        assert_eq!(body.profiler().elements_solved, 4);
    }
}

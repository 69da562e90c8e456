//! tetsim: tetrahedral soft body simulation with XPBD.
//!
//! Bodies are tetrahedral meshes whose elements carry a deviatoric (shape)
//! and a hydrostatic (volume) constraint, projected per substep with Extended
//! Position-Based Dynamics. Contact is limited to a world box with a floor at
//! `y = 0` and a kinematic friction approximation; a grab interaction pins a
//! single particle to a moving target.

pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod utils;
pub mod world;

pub use glam::{Mat3, Vec3};

pub use config::PhysicsParams;
pub use crate::core::{
    grab::GrabState,
    mesh::{Aabb, TetMesh, TetMeshBuilder},
    skin::{SkinBinding, SurfaceSkin},
    soa::ParticlesSoA,
    softbody::SoftBody,
    tetrahedra::TetElements,
};
pub use dynamics::{
    ConstraintOutcome, ElementSolve, FloorFriction, Integrator, SkipReason, SolverStepMetrics,
    XpbdSolver,
};
pub use error::{TetSimError, TetSimResult};
pub use utils::allocator::{BodyArena, BodyId};
pub use utils::profiling::StepProfiler;
pub use world::PhysicsWorld;

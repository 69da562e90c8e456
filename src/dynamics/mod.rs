//! Simulation dynamics: prediction, XPBD element projection and floor contact.

pub mod friction;
pub mod integrator;
pub mod solver;

pub use friction::FloorFriction;
pub use integrator::Integrator;
pub use solver::{
    apply_to_elem, ConstraintOutcome, ElementSolve, SkipReason, SolverStepMetrics, XpbdSolver,
};

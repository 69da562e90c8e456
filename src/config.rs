//! Global configuration constants and the per-step physics parameter record.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::mesh::Aabb;
use crate::error::{TetSimError, TetSimResult};

/// Default gravitational acceleration along Y (Y-up).
pub const DEFAULT_GRAVITY: f32 = -9.81;

/// Default simulation speed multiplier.
pub const DEFAULT_TIME_SCALE: f32 = 1.0;

/// Default frame time step (in seconds).
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Number of XPBD substeps run per frame.
pub const DEFAULT_NUM_SUBSTEPS: u32 = 20;

/// Floor friction coefficient used by the kinematic drag approximation.
pub const DEFAULT_FRICTION: f32 = 1000.0;

/// Default material density (kg/m^3).
pub const DEFAULT_DENSITY: f32 = 1000.0;

/// Default deviatoric (shape) compliance.
pub const DEFAULT_DEV_COMPLIANCE: f32 = 1.0 / 100_000.0;

/// Default volumetric compliance; zero keeps volume rigid.
pub const DEFAULT_VOL_COMPLIANCE: f32 = 0.0;

/// Default world box as `[min_x, min_y, min_z, max_x, max_y, max_z]`.
pub const DEFAULT_WORLD_BOUNDS: [f32; 6] = [-2.5, -1.0, -2.5, 2.5, 10.0, 2.5];

/// Frame budget used when warning about slow frames (milliseconds).
pub const DEFAULT_FRAME_BUDGET_MS: f32 = 1000.0 / 60.0;

/// Most frames a single accumulator step may run before dropping the backlog.
pub const DEFAULT_MAX_FRAMES_PER_STEP: usize = 5;

/// Physics configuration read by the solver every step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Acceleration along the Y axis.
    pub gravity: f32,
    pub time_scale: f32,
    pub time_step: f32,
    pub num_substeps: u32,
    pub friction: f32,
    /// Only read when a body is constructed.
    pub density: f32,
    pub dev_compliance: f32,
    pub vol_compliance: f32,
    /// Serialized as `[min_x, min_y, min_z, max_x, max_y, max_z]`.
    #[serde(with = "bounds_array")]
    pub world_bounds: Aabb,
    /// Display-only; the solver ignores it.
    pub compute_normals: bool,
    /// Display-only; the solver ignores it.
    pub show_tet_mesh: bool,
}

mod bounds_array {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::core::mesh::Aabb;

    pub fn serialize<S: Serializer>(bounds: &Aabb, serializer: S) -> Result<S::Ok, S::Error> {
        bounds.to_array().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Aabb, D::Error> {
        <[f32; 6]>::deserialize(deserializer).map(Aabb::from_array)
    }
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            time_scale: DEFAULT_TIME_SCALE,
            time_step: DEFAULT_TIME_STEP,
            num_substeps: DEFAULT_NUM_SUBSTEPS,
            friction: DEFAULT_FRICTION,
            density: DEFAULT_DENSITY,
            dev_compliance: DEFAULT_DEV_COMPLIANCE,
            vol_compliance: DEFAULT_VOL_COMPLIANCE,
            world_bounds: Aabb::from_array(DEFAULT_WORLD_BOUNDS),
            compute_normals: true,
            show_tet_mesh: false,
        }
    }
}

impl PhysicsParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_substeps(mut self, num_substeps: u32) -> Self {
        self.num_substeps = num_substeps;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_compliance(mut self, dev_compliance: f32, vol_compliance: f32) -> Self {
        self.dev_compliance = dev_compliance;
        self.vol_compliance = vol_compliance;
        self
    }

    pub fn with_world_bounds(mut self, bounds: Aabb) -> Self {
        self.world_bounds = bounds;
        self
    }

    /// Gravity as a Y-up acceleration vector.
    #[inline]
    pub fn gravity_vector(&self) -> Vec3 {
        Vec3::new(0.0, self.gravity, 0.0)
    }

    /// Substep length: `time_scale * time_step / num_substeps`.
    #[inline]
    pub fn substep_dt(&self) -> f32 {
        self.time_scale * self.time_step / self.num_substeps.max(1) as f32
    }

    /// Rejects parameter sets the solver cannot step meaningfully.
    pub fn validate(&self) -> TetSimResult<()> {
        let finite = [
            ("gravity", self.gravity),
            ("time_scale", self.time_scale),
            ("time_step", self.time_step),
            ("friction", self.friction),
            ("density", self.density),
            ("dev_compliance", self.dev_compliance),
            ("vol_compliance", self.vol_compliance),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(TetSimError::invalid_config(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        if self.num_substeps == 0 {
            return Err(TetSimError::invalid_config("num_substeps must be at least 1"));
        }
        if self.time_step <= 0.0 {
            return Err(TetSimError::invalid_config("time_step must be positive"));
        }
        if self.time_scale <= 0.0 {
            return Err(TetSimError::invalid_config("time_scale must be positive"));
        }
        if self.density <= 0.0 {
            return Err(TetSimError::invalid_config("density must be positive"));
        }
        if self.dev_compliance <= 0.0 {
            return Err(TetSimError::invalid_config(
                "dev_compliance must be positive (it divides the volume offset)",
            ));
        }
        if self.vol_compliance < 0.0 {
            return Err(TetSimError::invalid_config("vol_compliance must not be negative"));
        }
        if self.friction < 0.0 {
            return Err(TetSimError::invalid_config("friction must not be negative"));
        }
        if !self.world_bounds.is_valid() {
            return Err(TetSimError::invalid_config(
                "world_bounds min must not exceed max on any axis",
            ));
        }
        Ok(())
    }
}

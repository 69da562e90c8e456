//! Utility helpers: vector micro-kernels, body storage, logging and timing.

pub mod allocator;
pub mod logging;
pub mod math;
pub mod profiling;

pub use allocator::{BodyArena, BodyId};
pub use profiling::StepProfiler;

//! Soft body state: mesh input, particle buffers, tet rest data, grab and skin.

pub mod grab;
pub mod mesh;
pub mod skin;
pub mod soa;
pub mod softbody;
pub mod tetrahedra;

pub use grab::GrabState;
pub use mesh::{Aabb, TetMesh, TetMeshBuilder};
pub use skin::{SkinBinding, SurfaceSkin};
pub use soa::ParticlesSoA;
pub use softbody::SoftBody;
pub use tetrahedra::TetElements;

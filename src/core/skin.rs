//! Barycentric embedding of display vertices into simulation tetrahedra.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{TetSimError, TetSimResult};

/// One display vertex bound to a tetrahedron.
///
/// The fourth weight is implied: `1 - b0 - b1 - b2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkinBinding {
    pub tet: usize,
    pub weights: [f32; 3],
}

impl SkinBinding {
    #[inline]
    pub fn full_weights(&self) -> [f32; 4] {
        let [b0, b1, b2] = self.weights;
        [b0, b1, b2, 1.0 - b0 - b1 - b2]
    }
}

/// Drives a display surface from the positions of a tetrahedral body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSkin {
    bindings: Vec<SkinBinding>,
}

impl SurfaceSkin {
    /// Validates every binding against `num_tets`.
    pub fn new(bindings: Vec<SkinBinding>, num_tets: usize) -> TetSimResult<Self> {
        if let Some(binding) = bindings.iter().find(|b| b.tet >= num_tets) {
            return Err(TetSimError::IndexOutOfBounds {
                index: binding.tet,
                count: num_tets,
            });
        }
        Ok(Self { bindings })
    }

    /// Parses records of four floats: `tet, b0, b1, b2`.
    pub fn from_flat(records: &[f32], num_tets: usize) -> TetSimResult<Self> {
        if records.len() % 4 != 0 {
            return Err(TetSimError::invalid_mesh(format!(
                "skin buffer length {} is not a multiple of 4",
                records.len()
            )));
        }
        let bindings = records
            .chunks_exact(4)
            .map(|r| {
                Ok(SkinBinding {
                    tet: tet_number(r[0])?,
                    weights: [r[1], r[2], r[3]],
                })
            })
            .collect::<TetSimResult<Vec<_>>>()?;
        Self::new(bindings, num_tets)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn bindings(&self) -> &[SkinBinding] {
        &self.bindings
    }

    /// Writes skinned positions for `min(len, out.len())` vertices.
    pub fn update(&self, positions: &[Vec3], tets: &[[usize; 4]], out: &mut [Vec3]) {
        for (dst, binding) in out.iter_mut().zip(&self.bindings) {
            let ids = tets[binding.tet];
            let weights = binding.full_weights();
            let mut p = Vec3::ZERO;
            for (id, w) in ids.iter().zip(weights) {
                p += positions[*id] * w;
            }
            *dst = p;
        }
    }
}

/// Tet numbers arrive as floats; only non-negative whole values are indices.
fn tet_number(value: f32) -> TetSimResult<usize> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f32 {
        return Err(TetSimError::invalid_mesh(format!(
            "skin tet number {value} is not a valid tet index"
        )));
    }
    Ok(value as usize)
}

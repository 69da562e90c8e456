//! Vector and 3x3 matrix micro-kernels layered on top of `glam`.
//!
//! Matrices are column-major: the columns of a rest-pose matrix are the three
//! edge vectors `x1 - x0`, `x2 - x0`, `x3 - x0`. The determinant and inverse use
//! an explicit cofactor expansion so the evaluation order is fixed regardless of
//! how `glam` implements its own versions.
//!
//! The slice kernels address arenas of `Vec3` by entity index; none of them
//! allocate.

use glam::{Mat3, Vec3};

/// `a[i] = 0`.
#[inline]
pub fn vec_set_zero(a: &mut [Vec3], i: usize) {
    a[i] = Vec3::ZERO;
}

/// `a[i] = b[j]`.
#[inline]
pub fn vec_copy(a: &mut [Vec3], i: usize, b: &[Vec3], j: usize) {
    a[i] = b[j];
}

/// `a[i] += b * scale`.
#[inline]
pub fn vec_add_scaled(a: &mut [Vec3], i: usize, b: Vec3, scale: f32) {
    a[i] += b * scale;
}

/// `(a - b) * scale`.
#[inline]
pub fn vec_diff_scaled(a: Vec3, b: Vec3, scale: f32) -> Vec3 {
    (a - b) * scale
}

/// `dst[d] = (a[i] - b[j]) * scale`.
#[inline]
pub fn vec_set_diff(
    dst: &mut [Vec3],
    d: usize,
    a: &[Vec3],
    i: usize,
    b: &[Vec3],
    j: usize,
    scale: f32,
) {
    dst[d] = vec_diff_scaled(a[i], b[j], scale);
}

#[inline]
pub fn length_squared(v: Vec3) -> f32 {
    v.x * v.x + v.y * v.y + v.z * v.z
}

#[inline]
pub fn distance_squared(a: Vec3, b: Vec3) -> f32 {
    length_squared(a - b)
}

/// Right-handed cross product `b x c`.
#[inline]
pub fn cross(b: Vec3, c: Vec3) -> Vec3 {
    Vec3::new(
        b.y * c.z - b.z * c.y,
        b.z * c.x - b.x * c.z,
        b.x * c.y - b.y * c.x,
    )
}

/// Per-axis `max(min, min(max, v))`.
#[inline]
pub fn clamp_to_bounds(v: Vec3, min: Vec3, max: Vec3) -> Vec3 {
    Vec3::new(
        min.x.max(max.x.min(v.x)),
        min.y.max(max.y.min(v.y)),
        min.z.max(max.z.min(v.z)),
    )
}

/// Element at `row`, `col` of a column-major matrix.
#[inline]
pub fn mat_ij(m: &Mat3, row: usize, col: usize) -> f32 {
    m.col(col)[row]
}

/// `A * b`, accumulated column by column.
#[inline]
pub fn mat_vec(a: &Mat3, b: Vec3) -> Vec3 {
    let mut r = Vec3::ZERO;
    r += a.x_axis * b.x;
    r += a.y_axis * b.y;
    r += a.z_axis * b.z;
    r
}

/// `A * B`.
#[inline]
pub fn mat_mul(a: &Mat3, b: &Mat3) -> Mat3 {
    Mat3::from_cols(mat_vec(a, b.x_axis), mat_vec(a, b.y_axis), mat_vec(a, b.z_axis))
}

/// Six-term determinant expansion.
#[inline]
pub fn determinant(m: &Mat3) -> f32 {
    let (a11, a12, a13) = (m.x_axis.x, m.y_axis.x, m.z_axis.x);
    let (a21, a22, a23) = (m.x_axis.y, m.y_axis.y, m.z_axis.y);
    let (a31, a32, a33) = (m.x_axis.z, m.y_axis.z, m.z_axis.z);

    a11 * a22 * a33 + a12 * a23 * a31 + a13 * a21 * a32
        - a13 * a22 * a31
        - a12 * a21 * a33
        - a11 * a23 * a32
}

/// Cofactor inverse. A singular input yields the zero matrix.
pub fn inverse_or_zero(m: &Mat3) -> Mat3 {
    let det = determinant(m);
    if det == 0.0 {
        return Mat3::ZERO;
    }
    let inv_det = 1.0 / det;

    let (a11, a12, a13) = (m.x_axis.x, m.y_axis.x, m.z_axis.x);
    let (a21, a22, a23) = (m.x_axis.y, m.y_axis.y, m.z_axis.y);
    let (a31, a32, a33) = (m.x_axis.z, m.y_axis.z, m.z_axis.z);

    Mat3::from_cols(
        Vec3::new(
            (a22 * a33 - a23 * a32) * inv_det,
            -(a21 * a33 - a23 * a31) * inv_det,
            (a21 * a32 - a22 * a31) * inv_det,
        ),
        Vec3::new(
            -(a12 * a33 - a13 * a32) * inv_det,
            (a11 * a33 - a13 * a31) * inv_det,
            -(a11 * a32 - a12 * a31) * inv_det,
        ),
        Vec3::new(
            (a12 * a23 - a13 * a22) * inv_det,
            -(a11 * a23 - a13 * a21) * inv_det,
            (a11 * a22 - a12 * a21) * inv_det,
        ),
    )
}

/// Edge matrix `[x1 - x0, x2 - x0, x3 - x0]` of a tetrahedron.
#[inline]
pub fn edge_matrix(positions: &[Vec3], ids: &[usize; 4]) -> Mat3 {
    let x0 = positions[ids[0]];
    Mat3::from_cols(
        vec_diff_scaled(positions[ids[1]], x0, 1.0),
        vec_diff_scaled(positions[ids[2]], x0, 1.0),
        vec_diff_scaled(positions[ids[3]], x0, 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> Mat3 {
        Mat3::from_cols(
            Vec3::new(2.0, 0.5, -1.0),
            Vec3::new(0.0, 3.0, 0.25),
            Vec3::new(1.0, -2.0, 4.0),
        )
    }

    #[test]
    fn determinant_matches_glam() {
        let m = sample();
        assert_abs_diff_eq!(determinant(&m), m.determinant(), epsilon = 1e-4);
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let m = sample();
        let product = mat_mul(&m, &inverse_or_zero(&m));
        assert!(product.abs_diff_eq(Mat3::IDENTITY, 1e-5), "{product:?}");
    }

    #[test]
    fn singular_inverse_is_zero() {
        let m = Mat3::from_cols(Vec3::X, Vec3::X, Vec3::Z);
        assert_eq!(determinant(&m), 0.0);
        assert_eq!(inverse_or_zero(&m), Mat3::ZERO);
    }

    #[test]
    fn mat_ij_is_column_major() {
        let m = sample();
        assert_eq!(mat_ij(&m, 0, 1), 0.0);
        assert_eq!(mat_ij(&m, 1, 1), 3.0);
        assert_eq!(mat_ij(&m, 2, 0), -1.0);
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        assert_eq!(cross(Vec3::X, Vec3::Y), Vec3::Z);
        assert_eq!(cross(Vec3::Y, Vec3::Z), Vec3::X);
    }

    #[test]
    fn clamp_keeps_points_inside() {
        let min = Vec3::new(-1.0, 0.0, -1.0);
        let max = Vec3::new(1.0, 2.0, 1.0);
        let clamped = clamp_to_bounds(Vec3::new(-3.0, 1.0, 5.0), min, max);
        assert_eq!(clamped, Vec3::new(-1.0, 1.0, 1.0));
    }

    #[test]
    fn slice_kernels_address_by_index() {
        let mut a = vec![Vec3::ONE; 3];
        let b = vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)];

        vec_set_zero(&mut a, 0);
        vec_copy(&mut a, 1, &b, 1);
        vec_add_scaled(&mut a, 2, b[0], 2.0);

        assert_eq!(a[0], Vec3::ZERO);
        assert_eq!(a[1], Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(a[2], Vec3::new(3.0, 5.0, 7.0));

        let mut d = vec![Vec3::ZERO];
        vec_set_diff(&mut d, 0, &b, 1, &b, 0, 0.5);
        assert_eq!(d[0], Vec3::splat(1.5));
        assert_eq!(distance_squared(b[0], b[1]), 27.0);
    }
}

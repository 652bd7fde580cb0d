// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Instance transforms
//!
//! Parser transforms arrive as flat 4x4 matrices. Scene nodes carry
//! translation / rotation / scale, so every matrix is decomposed once.
//!
//! Flat layout: elements 12, 13, 14 hold the translation, i.e. the array is
//! the column-major storage of a column-vector matrix (nalgebra's own layout).

use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, UnitQuaternion, Vector3};

/// Scale below which an axis is treated as collapsed
const DEGENERATE_SCALE: f64 = 1e-12;

/// Translation, rotation and scale of a node relative to its parent.
///
/// A mirroring matrix keeps its reflection as a negative Y scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trs {
    pub translation: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub scale: Vector3<f64>,
}

impl Default for Trs {
    fn default() -> Self {
        Self::identity()
    }
}

impl Trs {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Decompose a flat 16-element parser matrix
    #[inline]
    pub fn from_flat_matrix(flat: &[f64; 16]) -> Self {
        Self::from_matrix(&Matrix4::from_column_slice(flat))
    }

    /// Decompose an affine matrix.
    ///
    /// Scale is the length of each basis column. A negative determinant flips
    /// the Y scale so the remaining basis is a proper rotation. Shear is not
    /// representable; a sheared basis yields an approximate rotation.
    /// Collapsed axes (flat or linear elements) take their direction from the
    /// axes that survive, so the orientation of the rest is kept.
    pub fn from_matrix(matrix: &Matrix4<f64>) -> Self {
        let translation = Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);
        let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();

        let mut scale = Vector3::new(
            linear.column(0).norm(),
            linear.column(1).norm(),
            linear.column(2).norm(),
        );
        if linear.determinant() < 0.0 {
            scale.y = -scale.y;
        }

        let basis = rotation_basis(&linear, &scale);
        // Shepperd extraction, stable for half turns
        let rotation = UnitQuaternion::new_normalize(
            UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(basis))
                .into_inner(),
        );

        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Recompose into a matrix: `T * R * S`
    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.translation)
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    /// Map a point from node space into parent space
    #[inline]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        let scaled = Point3::from(point.coords.component_mul(&self.scale));
        self.rotation.transform_point(&scaled) + self.translation
    }

    /// True when the transform mirrors geometry
    #[inline]
    pub fn is_reflection(&self) -> bool {
        self.scale.x * self.scale.y * self.scale.z < 0.0
    }

    /// True when the transform changes nothing (within `epsilon`)
    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.translation.norm() <= epsilon
            && self.rotation.angle() <= epsilon
            && (self.scale - Vector3::new(1.0, 1.0, 1.0)).norm() <= epsilon
    }

    /// Translation as single precision `[x, y, z]`
    #[inline]
    pub fn translation_f32(&self) -> [f32; 3] {
        [
            self.translation.x as f32,
            self.translation.y as f32,
            self.translation.z as f32,
        ]
    }

    /// Rotation as single precision `[x, y, z, w]`
    #[inline]
    pub fn rotation_f32(&self) -> [f32; 4] {
        let q = self.rotation.quaternion();
        [q.i as f32, q.j as f32, q.k as f32, q.w as f32]
    }

    /// Scale as single precision `[x, y, z]`
    #[inline]
    pub fn scale_f32(&self) -> [f32; 3] {
        [self.scale.x as f32, self.scale.y as f32, self.scale.z as f32]
    }
}

/// Orthonormal rotation basis of `linear` given its signed column scales.
///
/// Columns whose scale collapsed are rebuilt from the remaining ones as a
/// right-handed frame. All three collapsed gives the identity.
fn rotation_basis(linear: &Matrix3<f64>, scale: &Vector3<f64>) -> Matrix3<f64> {
    let mut axes: [Option<Vector3<f64>>; 3] = [None; 3];
    for (i, axis) in axes.iter_mut().enumerate() {
        if scale[i].abs() >= DEGENERATE_SCALE {
            *axis = Some(linear.column(i) / scale[i]);
        }
    }

    let axes = match axes {
        [Some(x), Some(y), Some(z)] => [x, y, z],
        [None, None, None] => return Matrix3::identity(),
        _ => complete_frame(axes),
    };
    Matrix3::from_columns(&axes)
}

/// Fill the missing axes of a partial frame, axis order x, y, z cyclic
fn complete_frame(mut axes: [Option<Vector3<f64>>; 3]) -> [Vector3<f64>; 3] {
    let present: Vec<(usize, Vector3<f64>)> = axes
        .iter()
        .enumerate()
        .filter_map(|(i, axis)| axis.map(|axis| (i, axis)))
        .collect();

    if let [(single, u)] = present[..] {
        // Helper along the world axis least aligned with `u`
        let helper = if u.x.abs() <= u.y.abs() && u.x.abs() <= u.z.abs() {
            Vector3::x()
        } else if u.y.abs() <= u.z.abs() {
            Vector3::y()
        } else {
            Vector3::z()
        };
        axes[(single + 1) % 3] = Some(u.cross(&helper).normalize());
    }

    // Exactly one axis missing now: k = (k + 1) x (k + 2)
    for k in 0..3 {
        if axes[k].is_none() {
            if let (Some(a), Some(b)) = (axes[(k + 1) % 3], axes[(k + 2) % 3]) {
                let cross = a.cross(&b);
                let norm = cross.norm();
                axes[k] = Some(if norm > DEGENERATE_SCALE {
                    cross / norm
                } else {
                    cross
                });
            }
        }
    }

    axes.map(|axis| axis.unwrap_or_else(Vector3::zeros))
}

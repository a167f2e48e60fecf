use glam::{Mat4, Quat, Vec3};

/// Model transform of a drawable.
///
/// Rotation is kept as an axis and an angle (radians) because that is what
/// the UI edits. The composed matrix is cached and only rebuilt when one of
/// the public fields differs from the values it was last built from.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation_axis: Vec3,
    pub rotation_angle: f32,

    matrix: Mat4,

    last_position: Vec3,
    last_scale: Vec3,
    last_axis: Vec3,
    last_angle: f32,
    force_update: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation_axis: Vec3::Y,
            rotation_angle: 0.0,
            matrix: Mat4::IDENTITY,
            last_position: Vec3::ZERO,
            last_scale: Vec3::ONE,
            last_axis: Vec3::Y,
            last_angle: 0.0,
            force_update: true,
        }
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Sets a uniform scale factor.
    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vec3::splat(scale);
    }

    #[must_use]
    pub fn rotation(&self) -> Quat {
        let axis = self.rotation_axis.normalize_or(Vec3::Y);
        Quat::from_axis_angle(axis, self.rotation_angle)
    }

    /// Rebuilds the cached matrix if any field changed.
    ///
    /// Returns whether a rebuild happened.
    pub fn update_matrix(&mut self) -> bool {
        let changed = self.force_update
            || self.position != self.last_position
            || self.scale != self.last_scale
            || self.rotation_axis != self.last_axis
            || self.rotation_angle != self.last_angle;

        if changed {
            self.matrix =
                Mat4::from_scale_rotation_translation(self.scale, self.rotation(), self.position);
            self.last_position = self.position;
            self.last_scale = self.scale;
            self.last_axis = self.rotation_axis;
            self.last_angle = self.rotation_angle;
            self.force_update = false;
        }

        changed
    }

    /// Model matrix `T * R * S`, rebuilt on demand.
    pub fn matrix(&mut self) -> Mat4 {
        self.update_matrix();
        self.matrix
    }

    /// The matrix as of the last [`update_matrix`](Self::update_matrix).
    #[inline]
    #[must_use]
    pub fn cached_matrix(&self) -> Mat4 {
        self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_is_translate_rotate_scale() {
        let mut t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        t.set_uniform_scale(2.0);
        t.rotation_angle = std::f32::consts::FRAC_PI_2;

        let p = t.matrix().transform_point3(Vec3::X);
        // scale to (2,0,0), rotate about +Y to (0,0,-2), then translate
        assert!((p - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn update_only_reports_real_changes() {
        let mut t = Transform::new();
        assert!(t.update_matrix());
        assert!(!t.update_matrix());
        t.rotation_angle = 0.5;
        assert!(t.update_matrix());
    }
}

use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person fly camera.
///
/// Angles are in degrees. Yaw −90° looks down −Z.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub world_up: Vec3,
    yaw: f32,
    pitch: f32,
    fov_degrees: f32,

    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// World units per second.
    pub speed: f32,
    /// Degrees per pixel of mouse motion.
    pub sensitivity: f32,

    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Camera {
    pub const MIN_FOV: f32 = 1.0;
    pub const MAX_FOV: f32 = 45.0;
    pub const PITCH_LIMIT: f32 = 89.0;

    #[must_use]
    pub fn new(position: Vec3, aspect: f32) -> Self {
        let mut camera = Self {
            position,
            world_up: Vec3::Y,
            yaw: -90.0,
            pitch: 0.0,
            fov_degrees: Self::MAX_FOV,
            aspect,
            near: 0.1,
            far: 100.0,
            speed: 4.0,
            sensitivity: 0.1,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        camera.update_vectors();
        camera
    }

    #[inline]
    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[inline]
    #[must_use]
    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    #[inline]
    #[must_use]
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    #[inline]
    #[must_use]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    #[inline]
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.right
    }

    #[inline]
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection with a `[0, 1]` depth range.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_radians(), self.aspect, self.near, self.far)
    }

    pub fn process_movement(&mut self, direction: CameraMovement, delta_seconds: f32) {
        let velocity = self.speed * delta_seconds;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Applies a mouse delta in pixels. `dy` is positive upwards.
    pub fn process_mouse(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        self.update_vectors();
    }

    /// Zooms by narrowing the field of view, one degree per scroll line.
    pub fn process_scroll(&mut self, lines: f32) {
        self.fov_degrees = (self.fov_degrees - lines).clamp(Self::MIN_FOV, Self::MAX_FOV);
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 4.0), 1280.0 / 720.0)
    }
}

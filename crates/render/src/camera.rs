use glam::{Mat4, Vec2, Vec3};

/// Orientation source for the viewer's head.
///
/// A tracked headset would implement this by polling its pose; the desktop
/// build drives it from mouse motion.
pub trait ViewControls {
    /// Apply any pending orientation input. Called once per frame.
    fn update(&mut self, dt: f32);

    /// Treat the current orientation as looking straight ahead.
    fn zero_sensor(&mut self);

    fn view_matrix(&self) -> Mat4;
}

/// Camera fixed at the ring centre that can only look around.
pub struct HeadCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
    /// Yaw that `zero_sensor` returns to.
    rest_yaw: f32,
    pending: Vec2,
}

impl Default for HeadCamera {
    fn default() -> Self {
        Self::at_eye_height(0.0)
    }
}

impl HeadCamera {
    /// Camera at the ring centre looking down -Z.
    pub fn at_eye_height(eye_height: f32) -> Self {
        let yaw = -90.0_f32.to_radians();
        Self {
            position: Vec3::new(0.0, eye_height, 0.0),
            yaw,
            pitch: 0.0,
            fov: 75.0_f32.to_radians(),
            near: 0.1,
            far: 10_000.0,
            sensitivity: 0.003,
            rest_yaw: yaw,
            pending: Vec2::ZERO,
        }
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Queue a look delta in pixels; applied on the next `update`.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.pending += Vec2::new(dx, dy);
    }

    /// View matrix of an eye displaced `offset` along the camera's right axis.
    pub fn eye_view_matrix(&self, offset: f32) -> Mat4 {
        let eye = self.position + self.right() * offset;
        Mat4::look_at_rh(eye, eye + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }
}

impl ViewControls for HeadCamera {
    fn update(&mut self, _dt: f32) {
        if self.pending == Vec2::ZERO {
            return;
        }
        self.yaw += self.pending.x * self.sensitivity;
        self.pitch -= self.pending.y * self.sensitivity;
        self.pitch = self
            .pitch
            .clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
        self.pending = Vec2::ZERO;
    }

    fn zero_sensor(&mut self) {
        self.yaw = self.rest_yaw;
        self.pitch = 0.0;
        self.pending = Vec2::ZERO;
        tracing::debug!("head orientation zeroed");
    }

    fn view_matrix(&self) -> Mat4 {
        self.eye_view_matrix(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_looks_down_negative_z() {
        let cam = HeadCamera::default();
        assert!(cam.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(cam.right().abs_diff_eq(Vec3::X, 1e-6));
        let vp = cam.projection_matrix(16.0 / 9.0) * cam.view_matrix();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn look_is_applied_on_update() {
        let mut cam = HeadCamera::default();
        let start = cam.forward();
        cam.look(100.0, 0.0);
        assert_eq!(cam.forward(), start);
        cam.update(0.016);
        assert_ne!(cam.forward(), start);
        // Pending input is consumed.
        let after = cam.forward();
        cam.update(0.016);
        assert_eq!(cam.forward(), after);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = HeadCamera::default();
        cam.look(0.0, -1_000_000.0);
        cam.update(0.016);
        assert!(cam.pitch <= 89.0_f32.to_radians());
        assert!(!cam.view_matrix().is_nan());
    }

    #[test]
    fn zero_sensor_restores_rest_pose() {
        let mut cam = HeadCamera::at_eye_height(1.7);
        cam.look(250.0, 80.0);
        cam.update(0.016);
        cam.zero_sensor();
        assert!(cam.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert_eq!(cam.position.y, 1.7);
    }
}

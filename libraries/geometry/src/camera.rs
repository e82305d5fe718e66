use glam::{Mat4, Vec3};

pub struct Camera {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
}

impl Camera {
    #[must_use]
    pub fn new(eye: Vec3, center: Vec3) -> Self {
        Self {
            position: eye,
            look_at: center,
            up: Vec3::Z,
        }
    }

    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, self.up)
    }

    /// Unit vector from the eye towards the look-at target.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalize()
    }

    /// Unit vector pointing right in view space.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    /// Up vector of the view plane. Orthogonal to [`Self::forward`] even
    /// when the camera pitches, unlike the fixed world `up`.
    #[must_use]
    pub fn billboard_up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_basis_is_orthonormal() {
        let camera = Camera::new(Vec3::new(0.0, -10.0, 3.0), Vec3::ZERO);
        let forward = camera.forward();
        let right = camera.right();
        let up = camera.billboard_up();

        assert!((forward.length() - 1.0).abs() < 1e-6);
        assert!(forward.dot(right).abs() < 1e-6);
        assert!(forward.dot(up).abs() < 1e-6);
        assert!(right.dot(up).abs() < 1e-6);
    }
}

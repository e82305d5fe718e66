use core::ops::Range;

use glam::Mat4;

/// Perspective projection derived from the render surface dimensions.
pub struct Projection {
    surface_dimensions: (u32, u32),
    fov_y: f32,
    depth_range: Range<f32>,
}

impl Projection {
    #[must_use]
    pub fn new_perspective(
        surface_dimensions: (u32, u32),
        fov_y: f32,
        depth_range: Range<f32>,
    ) -> Self {
        Self {
            surface_dimensions,
            fov_y,
            depth_range,
        }
    }

    /// Recompute the aspect ratio after the surface was resized.
    pub fn set_surface_dimensions(&mut self, surface_dimensions: (u32, u32)) {
        self.surface_dimensions = surface_dimensions;
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        let (width, height) = self.surface_dimensions;
        if height == 0 {
            // a zero-sized surface never reaches the screen anyway
            return 1.0;
        }
        #[expect(clippy::cast_precision_loss, reason = "surface dimensions are small")]
        let aspect = width as f32 / height as f32;
        aspect
    }

    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y,
            self.aspect(),
            self.depth_range.start,
            self.depth_range.end,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_updates_aspect() {
        let mut projection =
            Projection::new_perspective((800, 600), 75_f32.to_radians(), 0.1..1000.0);
        assert!((projection.aspect() - 800.0 / 600.0).abs() < 1e-6);

        let before = projection.matrix();
        projection.set_surface_dimensions((1920, 1080));
        assert!((projection.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
        assert_ne!(before, projection.matrix());
    }

    #[test]
    fn degenerate_height_does_not_divide_by_zero() {
        let projection = Projection::new_perspective((800, 0), 75_f32.to_radians(), 0.1..1000.0);
        assert!((projection.aspect() - 1.0).abs() < 1e-6);
    }
}

use glam::{Mat4, Vec2, Vec3};

use crate::{Camera, Projection};

/// Axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Grow the box to enclose `point`.
    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Axis-aligned box enclosing `self` with `transform` applied. All eight
    /// corners go through the matrix, so rotations are accounted for.
    #[must_use]
    pub fn transformed(&self, transform: Mat4) -> Self {
        let mut result = Self::default();
        for x in [self.min.x, self.max.x] {
            for y in [self.min.y, self.max.y] {
                for z in [self.min.z, self.max.z] {
                    result.extend(transform.transform_point3(Vec3::new(x, y, z)));
                }
            }
        }
        result
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }
}

/// A world-space ray used for picking. All intersection tests return the
/// distance along the ray to the nearest hit, so callers can order hits by
/// distance from the camera.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Project a 2D pixel position through the camera into a world-space ray.
    ///
    /// The pixel is mapped to normalized device coordinates, then the near
    /// and far plane points are unprojected through the inverted
    /// view-projection matrix.
    #[must_use]
    pub fn from_screen(
        pixel: Vec2,
        surface_dimensions: (u32, u32),
        camera: &Camera,
        projection: &Projection,
    ) -> Self {
        let (width, height) = surface_dimensions;
        #[expect(clippy::cast_precision_loss, reason = "surface dimensions are small")]
        let ndc = Vec2::new(
            pixel.x / width.max(1) as f32 * 2.0 - 1.0,
            1.0 - pixel.y / height.max(1) as f32 * 2.0,
        );

        let view_projection_inverse = (projection.matrix() * camera.matrix()).inverse();
        // wgpu clip space has a [0, 1] depth range
        let near = view_projection_inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = view_projection_inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));

        Self {
            origin: near,
            direction: (far - near).normalize(),
        }
    }

    /// Slab test against an axis-aligned box. A ray starting inside the box
    /// reports distance zero.
    #[must_use]
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        let inverse_direction = self.direction.recip();
        let to_min = (aabb.min - self.origin) * inverse_direction;
        let to_max = (aabb.max - self.origin) * inverse_direction;

        let enter = to_min.min(to_max);
        let exit = to_min.max(to_max);

        let entry = enter.max_element();
        let exit = exit.min_element();
        if entry > exit || exit < 0.0 {
            return None;
        }
        Some(entry.max(0.0))
    }

    /// Test against a camera-facing quad of `half_extents` centered at
    /// `center`. The quad lies in the view plane, so this matches what the
    /// user sees of a billboarded sprite.
    #[must_use]
    pub fn intersect_billboard(
        &self,
        center: Vec3,
        half_extents: Vec2,
        camera: &Camera,
    ) -> Option<f32> {
        let normal = -camera.forward();
        let denominator = self.direction.dot(normal);
        if denominator.abs() < f32::EPSILON {
            return None;
        }

        let distance = (center - self.origin).dot(normal) / denominator;
        if distance <= 0.0 {
            return None;
        }

        let hit = self.origin + self.direction * distance;
        let local = hit - center;
        let within_x = local.dot(camera.right()).abs() <= half_extents.x;
        let within_y = local.dot(camera.billboard_up()).abs() <= half_extents.y;
        (within_x && within_y).then_some(distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> (Camera, Projection) {
        let camera = Camera::new(Vec3::new(0.0, -10.0, 0.0), Vec3::ZERO);
        let projection = Projection::new_perspective((800, 600), 75_f32.to_radians(), 0.1..1000.0);
        (camera, projection)
    }

    #[test]
    fn center_pixel_maps_to_camera_forward() {
        let (camera, projection) = test_camera();
        let ray = Ray::from_screen(Vec2::new(400.0, 300.0), (800, 600), &camera, &projection);

        assert!((ray.direction - camera.forward()).length() < 1e-3);
    }

    #[test]
    fn aabb_entry_distance() {
        let ray = Ray {
            origin: Vec3::new(0.0, -10.0, 0.0),
            direction: Vec3::Y,
        };
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        let distance = ray.intersect_aabb(&aabb);
        assert!(distance.is_some_and(|distance| (distance - 9.0).abs() < 1e-6));
    }

    #[test]
    fn aabb_miss() {
        let ray = Ray {
            origin: Vec3::new(5.0, -10.0, 0.0),
            direction: Vec3::Y,
        };
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        assert!(ray.intersect_aabb(&aabb).is_none());
    }

    #[test]
    fn ray_starting_inside_aabb_hits_at_zero() {
        let ray = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::Y,
        };
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        assert_eq!(ray.intersect_aabb(&aabb), Some(0.0));
    }

    #[test]
    fn billboard_respects_half_extents() {
        let (camera, _) = test_camera();
        let ray = Ray {
            origin: camera.position,
            direction: camera.forward(),
        };

        // dead center: hit
        assert!(ray
            .intersect_billboard(Vec3::ZERO, Vec2::new(0.5, 1.0), &camera)
            .is_some());

        // a quad shifted further than its half extent: miss
        assert!(ray
            .intersect_billboard(Vec3::new(0.6, 0.0, 0.0), Vec2::new(0.5, 1.0), &camera)
            .is_none());
    }

    #[test]
    fn aabb_transform_accounts_for_rotation() {
        let aabb = Aabb {
            min: Vec3::new(-1.0, 0.0, -1.0),
            max: Vec3::new(1.0, 2.0, 1.0),
        };
        // a quarter turn about x maps the box's +y height onto +z
        let transform = Mat4::from_rotation_x(core::f32::consts::FRAC_PI_2);
        let rotated = aabb.transformed(transform);

        assert!((rotated.min.z - 0.0).abs() < 1e-6);
        assert!((rotated.max.z - 2.0).abs() < 1e-6);
        assert!((rotated.min.y - -1.0).abs() < 1e-6);
        assert!((rotated.max.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn aabb_extend_grows_bounds() {
        let mut aabb = Aabb::default();
        aabb.extend(Vec3::new(-1.0, 0.0, 0.0));
        aabb.extend(Vec3::new(2.0, 3.0, 1.0));
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 3.0, 1.0));
    }
}

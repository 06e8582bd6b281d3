//! Orbital camera plus the screen/world conversions used for picking

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

/// Ray in world space, `direction` is normalized
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the first intersection with a sphere.
    ///
    /// Returns `None` on a miss or when the sphere lies entirely behind the origin.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let near = -b - sqrt_d;
        if near >= 0.0 {
            return Some(near);
        }
        // Origin inside the sphere
        let far = -b + sqrt_d;
        (far >= 0.0).then_some(far)
    }
}

/// Convert window pixel coordinates to normalized device coordinates.
///
/// Both axes land in [-1, 1] with +Y pointing up.
pub fn screen_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new((x / width) * 2.0 - 1.0, -(y / height) * 2.0 + 1.0)
}

/// 3D perspective camera with orbital controls
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    // Orbital parameters
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Camera3D {
    pub fn new(aspect_ratio: f32) -> Self {
        let distance = 10.0;
        let yaw = 0.0f32;
        let pitch = 0.3f32;

        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45.0f32.to_radians(),
            aspect_ratio,
            near: 0.1,
            far: 1000.0,
            distance,
            yaw,
            pitch,
        };
        camera.update_orbital();
        camera
    }

    /// Update camera position based on orbital parameters
    pub fn update_orbital(&mut self) {
        self.position = self.target
            + Vec3::new(
                self.distance * self.pitch.cos() * self.yaw.sin(),
                self.distance * self.pitch.sin(),
                self.distance * self.pitch.cos() * self.yaw.cos(),
            );
    }

    /// Orbit the camera around the target
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-1.5, 1.5);
        self.update_orbital();
    }

    /// Zoom in/out
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).max(1.0);
        self.update_orbital();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn update_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Camera-space right and up axes in world coordinates, used for billboards
    pub fn basis(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.position).normalize_or_zero();
        let right = forward.cross(self.up).normalize_or_zero();
        let up = right.cross(forward);
        (right, up)
    }

    /// Ray from the eye through a point given in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(near, far - near)
    }

    /// Project a world point to normalized device coordinates.
    ///
    /// Returns `None` for points behind the camera.
    pub fn project_to_ndc(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(clip.xy() / clip.w)
    }

    /// Project a world point to window pixel coordinates (origin top-left)
    pub fn project_to_screen(&self, point: Vec3, width: f32, height: f32) -> Option<Vec2> {
        self.project_to_ndc(point).map(|ndc| {
            Vec2::new((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height)
        })
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
    pub right: [f32; 4],
    pub up: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera_3d(camera: &Camera3D) -> Self {
        let (right, up) = camera.basis();
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            position: [camera.position.x, camera.position.y, camera.position.z, 1.0],
            right: [right.x, right.y, right.z, 0.0],
            up: [up.x, up.y, up.z, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_to_ndc_flips_y() {
        let center = screen_to_ndc(640.0, 360.0, 1280.0, 720.0);
        assert!(center.length() < 1e-6);

        let top_left = screen_to_ndc(0.0, 0.0, 1280.0, 720.0);
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));

        let bottom_right = screen_to_ndc(1280.0, 720.0, 1280.0, 720.0);
        assert_eq!(bottom_right, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_center_ray_hits_target() {
        let camera = Camera3D::new(16.0 / 9.0);
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        let t = ray.intersect_sphere(camera.target, 0.5);
        assert!(t.is_some(), "Ray through screen center should hit the orbit target");
    }

    #[test]
    fn test_sphere_behind_ray_is_missed() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(ray.intersect_sphere(Vec3::new(-5.0, 0.0, 0.0), 1.0).is_none());
        let t = ray.intersect_sphere(Vec3::new(5.0, 0.0, 0.0), 1.0).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_projection_round_trips_through_pick_ray() {
        let camera = Camera3D::new(1.5);
        let point = Vec3::new(1.0, 0.5, -0.5);
        let ndc = camera.project_to_ndc(point).unwrap();
        let ray = camera.ray_from_ndc(ndc);
        assert!(ray.intersect_sphere(point, 0.05).is_some());
    }
}

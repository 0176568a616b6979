//! Camera and viewport geometry for ray generation.
//!
//! All geometry is derived once from [`RenderParams`] and immutable
//! afterward: camera basis vectors, per-pixel viewport deltas, the world
//! position of pixel (0,0), and the defocus-disk basis for depth of field.

use glam::DVec3;

use crate::random;
use crate::ray::Ray;
use crate::renderer::RenderParams;

/// Pinhole/thin-lens camera with precomputed pixel-sampling geometry.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Rendered image width in pixels, `round(height * aspect_ratio)`
    pub image_width: u32,
    /// Rendered image height in pixels
    pub image_height: u32,

    /// Camera position in world space (the look-from point)
    center: DVec3,
    /// World position of pixel (0,0)
    pixel00_loc: DVec3,
    /// Offset vector from pixel to pixel horizontally
    pixel_delta_u: DVec3,
    /// Offset vector from pixel to pixel vertically (down the image)
    pixel_delta_v: DVec3,
    /// Cone half-angle in degrees controlling depth-of-field blur
    defocus_angle: f64,
    /// Defocus disk horizontal radius vector
    defocus_disk_u: DVec3,
    /// Defocus disk vertical radius vector
    defocus_disk_v: DVec3,
}

impl Camera {
    /// Derive the full viewport geometry from high-level parameters.
    pub fn new(params: &RenderParams) -> Self {
        let image_height = params.image_height.max(1);
        let image_width = ((image_height as f64 * params.aspect_ratio).round() as u32).max(1);

        let center = params.look_from;

        let theta = params.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * params.focus_distance;
        let viewport_width = viewport_height * (image_width as f64 / image_height as f64);

        // Orthonormal camera frame: w opposes the view direction.
        // look_from != look_at and vup not parallel to the view direction are
        // caller contracts; both cross products below are then non-zero.
        let w = (params.look_from - params.look_at).normalize();
        let u = params.vup.cross(w).normalize();
        let v = w.cross(u);

        let viewport_u = viewport_width * u;
        let viewport_v = viewport_height * -v;
        let pixel_delta_u = viewport_u / image_width as f64;
        let pixel_delta_v = viewport_v / image_height as f64;

        let viewport_upper_left =
            center - (params.focus_distance * w) - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius = params.focus_distance * (params.defocus_angle.to_radians() / 2.0).tan();
        let defocus_disk_u = u * defocus_radius;
        let defocus_disk_v = v * defocus_radius;

        Self {
            image_width,
            image_height,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            defocus_angle: params.defocus_angle,
            defocus_disk_u,
            defocus_disk_v,
        }
    }

    /// Generate a ray through the given pixel with random jitter.
    ///
    /// The sample point is jittered within one pixel cell for anti-aliasing.
    /// The origin is the camera center for a pinhole camera, or a random
    /// point on the defocus disk when `defocus_angle > 0`.
    pub fn get_ray(&self, col: u32, row: u32) -> Ray {
        let pixel_center = self.pixel00_loc
            + (col as f64 * self.pixel_delta_u)
            + (row as f64 * self.pixel_delta_v);
        let pixel_sample = pixel_center + self.sample_unit_square();

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample()
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    /// Random offset within one pixel cell, expressed in viewport deltas.
    fn sample_unit_square(&self) -> DVec3 {
        let px = -0.5 + random::random_f64();
        let py = -0.5 + random::random_f64();
        (px * self.pixel_delta_u) + (py * self.pixel_delta_v)
    }

    /// Random point on the defocus disk for depth-of-field blur.
    fn defocus_disk_sample(&self) -> DVec3 {
        let p = random::random_in_unit_disk();
        self.center + (p.x * self.defocus_disk_u) + (p.y * self.defocus_disk_v)
    }
}

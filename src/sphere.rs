//! Sphere primitive for ray tracing.
//!
//! Implements ray-sphere intersection with the half-b quadratic formula and
//! delegates the continuation decision to the sphere's material.

use glam::DVec3;

use crate::hittable::{HitRecord, HitResult, Hittable};
use crate::interval::Interval;
use crate::material::Material;
use crate::ray::Ray;

/// Sphere defined by center, radius, and an optional material.
///
/// Each sphere exclusively owns its material. A bare sphere (no material)
/// reports raw hit records without scattering, which is what
/// normal-visualization modes want.
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    /// Center point of the sphere in world coordinates.
    pub center: DVec3,

    /// Radius of the sphere (negative values are clamped to 0.0).
    pub radius: f64,

    material: Option<Material>,
}

impl Sphere {
    /// Create a sphere with the given material.
    pub fn new(center: DVec3, radius: f64, material: Material) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material: Some(material),
        }
    }

    /// Create a sphere with no material; hits are returned unscattered.
    pub fn bare(center: DVec3, radius: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material: None,
        }
    }

    /// Create a sphere with the default neutral diffuse gray material.
    pub fn matte(center: DVec3, radius: f64) -> Self {
        Self::new(center, radius, Material::default())
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, t_range: Interval) -> HitResult {
        let oc = self.center - ray.origin;

        // Half-b form of the quadratic |O + tD - C|² = r²
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return HitResult::Miss;
        }

        // Prefer the nearer root inside the valid window
        let sqrt_d = discriminant.sqrt();
        let mut root = (h - sqrt_d) / a;
        if !t_range.surrounds(root) {
            root = (h + sqrt_d) / a;
            if !t_range.surrounds(root) {
                return HitResult::Miss;
            }
        }

        let point = ray.at(root);
        let outward_normal = (point - self.center) / self.radius;
        let record = HitRecord::from_outward(ray, outward_normal, point, root);

        match &self.material {
            Some(material) => match material.scatter(ray, &record) {
                Some(scatter) => HitResult::Scattered(scatter),
                None => HitResult::Hit(record),
            },
            None => HitResult::Hit(record),
        }
    }
}

//! Material system for ray tracing.
//!
//! Implements three material models: Lambertian (diffuse), Metal (specular
//! with optional fuzz), and Dielectric (transparent with refraction). A
//! material answers a single scatter query: given an incoming ray and a hit
//! record, does the ray continue, and with what attenuation.

use glam::DVec3;

use crate::color::Color;
use crate::hittable::{HitRecord, ScatterResult};
use crate::random;
use crate::ray::Ray;

/// Closed set of surface materials.
///
/// Each surface owns exactly one material. `scatter` returns `None` when the
/// material absorbs the ray (declines to continue it).
#[derive(Debug, Clone, Copy)]
pub enum Material {
    /// Lambertian diffuse material for matte surfaces.
    Lambertian {
        /// Surface color/reflectance.
        albedo: Color,
    },

    /// Metallic material with specular reflection.
    Metal {
        /// Metal color.
        albedo: Color,
        /// Surface roughness in [0, 1] (0 = mirror).
        fuzz: f64,
    },

    /// Dielectric (transparent) material with refraction.
    Dielectric {
        /// Index of refraction (1.0 = air, 1.5 = glass).
        refraction_index: f64,
    },
}

impl Material {
    /// Create a Lambertian diffuse material.
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian { albedo }
    }

    /// Create a metal material. Fuzz outside [0, 1] is clamped, not rejected.
    pub fn metal(albedo: Color, fuzz: f64) -> Self {
        Material::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    /// Create a dielectric material with the given refractive index.
    pub fn dielectric(refraction_index: f64) -> Self {
        Material::Dielectric { refraction_index }
    }

    /// Compute ray scattering for this material.
    ///
    /// Returns the continuing ray and its attenuation, or `None` when the
    /// ray is absorbed.
    pub fn scatter(&self, ray: &Ray, record: &HitRecord) -> Option<ScatterResult> {
        match *self {
            Material::Lambertian { albedo } => scatter_lambertian(albedo, record),
            Material::Metal { albedo, fuzz } => scatter_metal(albedo, fuzz, ray, record),
            Material::Dielectric { refraction_index } => {
                scatter_dielectric(refraction_index, ray, record)
            }
        }
    }
}

impl Default for Material {
    /// Neutral diffuse gray, used when a surface gets no explicit material.
    fn default() -> Self {
        Material::lambertian(Color::splat(0.5))
    }
}

/// Lambertian scattering: new direction is the normal plus a random unit
/// vector. Always succeeds.
fn scatter_lambertian(albedo: Color, record: &HitRecord) -> Option<ScatterResult> {
    let mut scatter_direction = record.normal + random::random_unit_vector();

    // Catch the degenerate case where the random vector nearly cancels the
    // normal; normalizing such a vector would be meaningless.
    if scatter_direction.length_squared() < 1e-16 {
        scatter_direction = record.normal;
    }

    Some(ScatterResult {
        ray: Ray::new(record.point, scatter_direction),
        attenuation: albedo,
        t: record.t,
    })
}

/// Metallic reflection with optional roughness. Declines when the fuzzed
/// reflection points into the surface.
fn scatter_metal(albedo: Color, fuzz: f64, ray: &Ray, record: &HitRecord) -> Option<ScatterResult> {
    let reflected = reflect(ray.direction.normalize(), record.normal);
    let scattered = Ray::new(
        record.point,
        reflected + fuzz * random::random_in_unit_sphere(),
    );

    if scattered.direction.dot(record.normal) <= 0.0 {
        return None;
    }

    Some(ScatterResult {
        ray: scattered,
        attenuation: albedo,
        t: record.t,
    })
}

/// Dielectric scattering: refract when Snell's law allows it, otherwise
/// reflect; near grazing angles the Schlick reflectance decides
/// probabilistically. Always succeeds, with opaque white attenuation.
fn scatter_dielectric(
    refraction_index: f64,
    ray: &Ray,
    record: &HitRecord,
) -> Option<ScatterResult> {
    let ratio = if record.front_face {
        1.0 / refraction_index
    } else {
        refraction_index
    };

    let unit_direction = ray.direction.normalize();
    let cos_theta = (-unit_direction).dot(record.normal).min(1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

    let cannot_refract = ratio * sin_theta > 1.0;
    let direction = if cannot_refract || reflectance(cos_theta, ratio) > random::random_f64() {
        reflect(unit_direction, record.normal)
    } else {
        refract(unit_direction, record.normal, ratio)
    };

    Some(ScatterResult {
        ray: Ray::new(record.point, direction),
        attenuation: Color::ONE,
        t: record.t,
    })
}

/// Reflect a vector off a surface with the given normal.
fn reflect(v: DVec3, n: DVec3) -> DVec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through an interface using Snell's law.
fn refract(uv: DVec3, n: DVec3, etai_over_etat: f64) -> DVec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Fresnel reflectance via the Schlick approximation.
fn reflectance(cosine: f64, refraction_index: f64) -> f64 {
    let r0 = (1.0 - refraction_index) / (1.0 + refraction_index);
    let r0 = r0 * r0;
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

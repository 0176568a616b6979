//! Ray-surface intersection system.
//!
//! Defines the [`Hittable`] trait for geometric primitives, [`HitRecord`] and
//! [`ScatterResult`] value types, and [`HittableList`], the flat scene
//! aggregate that resolves the closest hit.

use glam::DVec3;

use crate::color::Color;
use crate::interval::Interval;
use crate::ray::Ray;

/// Ray-surface intersection information.
///
/// Contains the intersection point, the surface normal (unit length, always
/// facing against the incident ray), the ray parameter, and which side of
/// the surface was struck.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    /// Point where the ray intersects the surface
    pub point: DVec3,
    /// Surface normal at the intersection point (unit vector)
    pub normal: DVec3,
    /// Distance along the ray to the intersection point
    pub t: f64,
    /// True if the ray struck the front face, false for the back face
    pub front_face: bool,
}

impl HitRecord {
    /// Build a record from the outward surface normal.
    ///
    /// Derives `front_face` and the stored normal together: the normal is
    /// flipped so it always points against the incident ray.
    pub fn from_outward(ray: &Ray, outward_normal: DVec3, point: DVec3, t: f64) -> Self {
        let front_face = ray.direction.dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        Self {
            point,
            normal,
            t,
            front_face,
        }
    }
}

/// A material's decision about how a ray continues after a hit.
///
/// The ray goes on in a new direction and its contribution is multiplied by
/// the attenuation color.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// The continuing ray
    pub ray: Ray,
    /// Multiplicative color factor applied to the continuing ray's contribution
    pub attenuation: Color,
    /// Distance along the incoming ray to the hit that produced this scatter
    pub t: f64,
}

/// Outcome of an intersection query.
///
/// Three meanings are possible and callers must discriminate explicitly:
/// nothing was hit, something was hit but the material absorbed the ray (or
/// the surface has no material), or the ray continues as a scatter. Treating
/// an absorbed hit as a miss is a bug: it would let rays pass through
/// geometry that in fact blocked them.
#[derive(Debug, Clone, Copy)]
pub enum HitResult {
    /// The ray struck nothing within the valid interval
    Miss,
    /// The ray struck a surface but does not continue
    Hit(HitRecord),
    /// The ray struck a surface and continues in a new direction
    Scattered(ScatterResult),
}

impl HitResult {
    /// Ray parameter of the hit, if anything was struck.
    pub fn t(&self) -> Option<f64> {
        match self {
            HitResult::Miss => None,
            HitResult::Hit(record) => Some(record.t),
            HitResult::Scattered(scatter) => Some(scatter.t),
        }
    }

    /// True when nothing was struck.
    pub fn is_miss(&self) -> bool {
        matches!(self, HitResult::Miss)
    }
}

/// Trait for surfaces that can be intersected by rays.
///
/// Core abstraction for geometric primitives. Must be thread-safe
/// (`Sync + Send`) so immutable scenes can be shared by render workers.
pub trait Hittable: Sync + Send {
    /// Test for ray intersection within the given parameter range.
    fn hit(&self, ray: &Ray, t_range: Interval) -> HitResult;
}

/// Collection of surfaces forming a scene.
///
/// Exclusively owns its children and resolves the nearest hit with a linear
/// scan, progressively narrowing the valid-t upper bound as candidates are
/// found.
#[derive(Default)]
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a surface to the scene.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    /// Remove all surfaces from the scene.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Number of surfaces in the scene.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when the scene holds no surfaces.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, t_range: Interval) -> HitResult {
        let mut closest = HitResult::Miss;
        let mut t_closest = t_range.max;

        for object in &self.objects {
            let candidate = object.hit(ray, Interval::new(t_range.min, t_closest));
            if let Some(t) = candidate.t() {
                t_closest = t;
                closest = candidate;
            }
        }

        closest
    }
}

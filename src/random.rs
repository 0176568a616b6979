//! Random number generation for ray tracing.
//!
//! Provides thread-local ChaCha20 PRNG state with sampling helpers for unit
//! vectors, unit spheres/disks, and colors. The generator can be reseeded
//! for reproducible renders.

use std::cell::RefCell;

use glam::DVec3;
use rand::{rng, Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

thread_local! {
    /// Thread-local ChaCha20 PRNG for quality random numbers.
    static RNG: RefCell<ChaCha20Rng> = RefCell::new(ChaCha20Rng::from_rng(&mut rng()));
}

/// Reseed the current thread's generator.
///
/// Only affects the calling thread. For byte-identical renders seed the
/// renderer itself ([`crate::renderer::Renderer::with_seed`]), which derives
/// a per-worker seed for every render thread.
pub fn reseed(seed: u64) {
    RNG.with(|rng| *rng.borrow_mut() = ChaCha20Rng::seed_from_u64(seed));
}

/// Generate a random f64 in [0.0, 1.0)
pub fn random_f64() -> f64 {
    RNG.with(|rng| rng.borrow_mut().random())
}

/// Generate a random f64 in [min, max)
pub fn random_f64_range(min: f64, max: f64) -> f64 {
    min + (max - min) * random_f64()
}

/// Generate a random DVec3 with components in [min, max)
pub fn random_dvec3_range(min: f64, max: f64) -> DVec3 {
    DVec3::new(
        random_f64_range(min, max),
        random_f64_range(min, max),
        random_f64_range(min, max),
    )
}

/// Generate a random point inside the unit sphere using rejection sampling.
pub fn random_in_unit_sphere() -> DVec3 {
    loop {
        let p = random_dvec3_range(-1.0, 1.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Generate a random unit vector uniformly distributed on the unit sphere.
pub fn random_unit_vector() -> DVec3 {
    RNG.with(|rng| {
        let mut rng = rng.borrow_mut();

        // Uniform θ in [0, 2π), uniform cos(φ) in [-1, 1]
        let theta = 2.0 * std::f64::consts::PI * rng.random::<f64>();
        let cos_phi = 2.0 * rng.random::<f64>() - 1.0;
        let sin_phi = (1.0 - cos_phi * cos_phi).sqrt();

        DVec3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi)
    })
}

/// Generate a random point inside the unit disk (z = 0) using rejection sampling.
pub fn random_in_unit_disk() -> DVec3 {
    loop {
        let p = DVec3::new(
            random_f64_range(-1.0, 1.0),
            random_f64_range(-1.0, 1.0),
            0.0,
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Generate a random RGB color with components in [0.0, 1.0).
pub fn random_color() -> DVec3 {
    DVec3::new(random_f64(), random_f64(), random_f64())
}

/// Generate a random RGB color with components in [min, max).
pub fn random_color_range(min: f64, max: f64) -> DVec3 {
    random_dvec3_range(min, max)
}

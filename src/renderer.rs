//! Parallel renderer and recursive path integrator.
//!
//! The renderer partitions image rows across a fixed set of OS worker
//! threads with an interleaved (stride-W) assignment, runs the Monte-Carlo
//! path integrator for every pixel, and collects the result into a single
//! row-major pixel buffer. Workers write disjoint row slices, so the buffer
//! itself needs no synchronization.

use std::thread;
use std::time::Instant;

use glam::DVec3;
use log::info;

use crate::camera::Camera;
use crate::color::{self, Color};
use crate::hittable::{HitResult, Hittable, HittableList};
use crate::interval::Interval;
use crate::progress::ProgressSink;
use crate::random;
use crate::ray::Ray;

/// High-level render configuration.
///
/// Plain numeric parameters supplied by the caller; the core parses no
/// flags, files, or environment variables.
#[derive(Debug, Clone)]
pub struct RenderParams {
    /// Width / height ratio; image width = round(height * aspect_ratio)
    pub aspect_ratio: f64,
    /// Output image height in pixels
    pub image_height: u32,
    /// Number of Monte-Carlo samples per pixel
    pub samples_per_pixel: u32,
    /// Recursion cutoff for ray bounces
    pub max_depth: u32,
    /// Vertical field of view in degrees
    pub vfov: f64,
    /// Distance from the camera to the plane of perfect focus
    pub focus_distance: f64,
    /// Cone half-angle in degrees controlling depth-of-field blur (<= 0 disables)
    pub defocus_angle: f64,
    /// Camera position
    pub look_from: DVec3,
    /// Point the camera looks at
    pub look_at: DVec3,
    /// World up direction
    pub vup: DVec3,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            aspect_ratio: 16.0 / 9.0,
            image_height: 360,
            samples_per_pixel: 100,
            max_depth: 10,
            vfov: 90.0,
            focus_distance: 1.0,
            defocus_angle: 0.0,
            look_from: DVec3::ZERO,
            look_at: DVec3::new(0.0, 0.0, -1.0),
            vup: DVec3::new(0.0, 1.0, 0.0),
        }
    }
}

/// Rendered pixel buffer, row-major, immutable once produced.
///
/// This is the sole hand-off artifact to the output stage.
#[derive(Debug, Clone)]
pub struct Image {
    /// Pixel colors, row-major, gamma-corrected and clamped to [0, 0.999]
    pub pixels: Vec<Color>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl Image {
    /// Color of the pixel at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }
}

/// Stochastic renderer over an immutable camera and integrator settings.
pub struct Renderer {
    camera: Camera,
    samples_per_pixel: u32,
    max_depth: u32,
    workers: usize,
    seed: Option<u64>,
}

impl Renderer {
    /// Build a renderer from high-level parameters.
    ///
    /// The worker count defaults to the host's available parallelism.
    pub fn new(params: RenderParams) -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            camera: Camera::new(&params),
            samples_per_pixel: params.samples_per_pixel.max(1),
            max_depth: params.max_depth,
            workers,
            seed: None,
        }
    }

    /// Override the worker count. Zero falls back to one synchronous worker.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Seed the render deterministically.
    ///
    /// Each worker thread seeds its generator from this value plus the
    /// worker index, so repeated renders with the same seed and worker
    /// count produce byte-identical pixel buffers. A synchronous render
    /// reseeds the calling thread's generator instead.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The viewport geometry this renderer samples through.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Render the scene into a pixel buffer.
    ///
    /// Registers one progress entry per worker and posts at least one update
    /// per completed row; pass [`crate::progress::NoopProgress`] for
    /// headless operation. Worker threads join before the image is returned.
    pub fn render(&self, world: &HittableList, progress: &dyn ProgressSink) -> Image {
        let width = self.camera.image_width as usize;
        let height = self.camera.image_height as usize;
        let workers = self.workers.min(height).max(1);

        info!(
            "rendering {}x{} pixels, {} samples/pixel, {} workers",
            width, height, self.samples_per_pixel, workers
        );
        let start = Instant::now();

        let mut pixels = vec![Color::ZERO; width * height];

        if workers == 1 {
            // Degenerate host concurrency: render synchronously on the
            // calling thread.
            if let Some(seed) = self.seed {
                random::reseed(seed);
            }
            let label = "worker 0";
            progress.add(label, 0, height as u64);
            for (row, slice) in pixels.chunks_mut(width).enumerate() {
                self.render_row(world, row, slice);
                progress.update(label, row as u64 + 1);
            }
        } else {
            let buckets = interleave(pixels.chunks_mut(width).enumerate(), workers);
            thread::scope(|scope| {
                for (id, bucket) in buckets.into_iter().enumerate() {
                    let label = format!("worker {id}");
                    progress.add(&label, 0, bucket.len() as u64);
                    let seed = self.seed;
                    scope.spawn(move || {
                        // Each worker samples from its own stream derived
                        // from the base seed and the worker index.
                        if let Some(seed) = seed {
                            random::reseed(seed.wrapping_add(1 + id as u64));
                        }
                        for (done, (row, slice)) in bucket.into_iter().enumerate() {
                            self.render_row(world, row, slice);
                            progress.update(&label, done as u64 + 1);
                        }
                    });
                }
            });
        }

        info!("render finished in {:.2?}", start.elapsed());

        Image {
            pixels,
            width: width as u32,
            height: height as u32,
        }
    }

    fn render_row(&self, world: &HittableList, row: usize, slice: &mut [Color]) {
        for (col, pixel) in slice.iter_mut().enumerate() {
            *pixel = self.sample_color_at(world, col as u32, row as u32);
        }
    }

    /// Monte-Carlo estimate of one pixel's color.
    ///
    /// Averages `samples_per_pixel` independent jittered estimates, then
    /// gamma-corrects and clamps into [0, 0.999] for the output stage.
    fn sample_color_at(&self, world: &HittableList, col: u32, row: u32) -> Color {
        let mut accumulated = Color::ZERO;
        for _ in 0..self.samples_per_pixel {
            let ray = self.camera.get_ray(col, row);
            accumulated += self.ray_color(world, &ray, 0);
        }

        let averaged = accumulated / self.samples_per_pixel as f64;
        color::clamp(color::correct_gamma(averaged), Interval::new(0.0, 0.999))
    }

    /// Recursive radiance estimate for one ray.
    ///
    /// Truncates to black at the depth limit (an energy cutoff, not a
    /// physical statement). The lower t bound of 0.001 avoids re-hitting the
    /// surface a bounced ray just left.
    fn ray_color(&self, world: &HittableList, ray: &Ray, depth: u32) -> Color {
        if depth >= self.max_depth {
            return Color::ZERO;
        }

        match world.hit(ray, Interval::new(0.001, f64::INFINITY)) {
            HitResult::Scattered(scatter) => {
                scatter.attenuation * self.ray_color(world, &scatter.ray, depth + 1)
            }
            HitResult::Hit(_) => Color::ZERO,
            HitResult::Miss => background(ray),
        }
    }
}

/// Background gradient: vertical lerp between white and sky blue.
fn background(ray: &Ray) -> Color {
    let direction = ray.direction.normalize();
    let a = 0.5 * (direction.y + 1.0);

    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    (1.0 - a) * white + a * blue
}

/// Distribute indexed items across workers with a stride-W interleave.
///
/// Item `i` lands in bucket `i % workers`, so each worker's load stays
/// balanced even when per-row cost varies across the image.
fn interleave<T>(
    items: impl IntoIterator<Item = (usize, T)>,
    workers: usize,
) -> Vec<Vec<(usize, T)>> {
    let mut buckets: Vec<Vec<(usize, T)>> = (0..workers).map(|_| Vec::new()).collect();
    for (index, item) in items {
        buckets[index % workers].push((index, item));
    }
    buckets
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::material::Material;
    use crate::progress::NoopProgress;
    use crate::sphere::Sphere;

    /// Sink that records every call for later inspection.
    #[derive(Default)]
    struct RecordingSink {
        adds: Mutex<Vec<(String, u64, u64)>>,
        updates: Mutex<Vec<(String, u64)>>,
    }

    impl ProgressSink for RecordingSink {
        fn add(&self, label: &str, min: u64, max: u64) {
            self.adds.lock().unwrap().push((label.to_string(), min, max));
        }

        fn update(&self, label: &str, current: u64) {
            self.updates.lock().unwrap().push((label.to_string(), current));
        }
    }

    fn unit_scene_params() -> RenderParams {
        RenderParams {
            aspect_ratio: 1.0,
            image_height: 21,
            samples_per_pixel: 1,
            max_depth: 1,
            vfov: 90.0,
            focus_distance: 1.0,
            defocus_angle: 0.0,
            ..RenderParams::default()
        }
    }

    #[test]
    fn partition_covers_every_row_exactly_once() {
        for (height, workers) in [(97usize, 8usize), (8, 8), (5, 16), (1, 1), (360, 7)] {
            let buckets = interleave((0..height).map(|r| (r, ())), workers);
            assert_eq!(buckets.len(), workers);

            let mut seen = vec![0u32; height];
            for (id, bucket) in buckets.iter().enumerate() {
                for (row, ()) in bucket {
                    assert_eq!(row % workers, id);
                    seen[*row] += 1;
                }
            }
            assert!(seen.iter().all(|&count| count == 1));
        }
    }

    #[test]
    fn miss_returns_exact_background_gradient() {
        let renderer = Renderer::new(RenderParams::default());
        let world = HittableList::new();

        let up = Ray::new(DVec3::ZERO, DVec3::new(0.0, 1.0, 0.0));
        assert_eq!(
            renderer.ray_color(&world, &up, 0),
            Color::new(0.5, 0.7, 1.0)
        );

        let down = Ray::new(DVec3::ZERO, DVec3::new(0.0, -1.0, 0.0));
        assert_eq!(renderer.ray_color(&world, &down, 0), Color::ONE);

        // arbitrary direction matches the closed form
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.3, 0.4, -1.0));
        let a = 0.5 * (ray.direction.normalize().y + 1.0);
        let expected = (1.0 - a) * Color::ONE + a * Color::new(0.5, 0.7, 1.0);
        assert!((renderer.ray_color(&world, &ray, 0) - expected).length() < 1e-12);
    }

    #[test]
    fn depth_limit_truncates_to_black() {
        let renderer = Renderer::new(RenderParams {
            max_depth: 0,
            ..RenderParams::default()
        });
        let world = HittableList::new();
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 1.0, 0.0));
        assert_eq!(renderer.ray_color(&world, &ray, 0), Color::ZERO);
    }

    #[test]
    fn attenuation_multiplies_along_the_bounce() {
        // One bounce off a matte sphere, then the scattered ray resolves
        // against the background. The bounce direction is random, so only
        // bounds are asserted: every channel sits inside [0, albedo].
        let renderer = Renderer::new(RenderParams {
            max_depth: 2,
            ..RenderParams::default()
        });
        let mut world = HittableList::new();
        world.add(Box::new(Sphere::new(
            DVec3::new(0.0, 0.0, -1.0),
            0.5,
            Material::lambertian(Color::splat(0.5)),
        )));

        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        let color = renderer.ray_color(&world, &ray, 0);
        // after one 0.5 attenuation the brightest possible background is 1.0
        assert!(color.max_element() <= 0.5 + 1e-12);
        assert!(color.min_element() >= 0.0);
    }

    #[test]
    fn single_sphere_scene_center_dark_corner_background() {
        let renderer = Renderer::new(unit_scene_params()).with_workers(1);
        let mut world = HittableList::new();
        world.add(Box::new(Sphere::matte(DVec3::new(0.0, 0.0, -1.0), 0.5)));

        random::reseed(3);
        let image = renderer.render(&world, &NoopProgress);

        // Center ray hits the sphere; at depth 1 its scatter terminates
        // black, so the material response dominates (non-background).
        let center = image.pixel(10, 10);
        assert_eq!(center, Color::ZERO);

        // Corner ray misses; the pixel must lie exactly on the white/blue
        // gradient line. Invert the gamma and check both channels agree on
        // the blend factor.
        let corner = image.pixel(0, 0);
        let a_from_r = 2.0 * (1.0 - corner.x * corner.x);
        let a_from_g = (1.0 - corner.y * corner.y) / 0.3;
        assert!((a_from_r - a_from_g).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&a_from_r));
        // blue channel of the gradient is 1.0, clamped to 0.999
        assert_eq!(corner.z, 0.999);
    }

    #[test]
    fn seeded_single_worker_render_is_deterministic() {
        let params = RenderParams {
            aspect_ratio: 1.0,
            image_height: 12,
            samples_per_pixel: 4,
            max_depth: 5,
            ..RenderParams::default()
        };
        let renderer = Renderer::new(params).with_workers(1);

        let mut world = HittableList::new();
        world.add(Box::new(Sphere::matte(DVec3::new(0.0, 0.0, -1.0), 0.5)));
        world.add(Box::new(Sphere::new(
            DVec3::new(0.0, -100.5, -1.0),
            100.0,
            Material::lambertian(Color::new(0.8, 0.8, 0.0)),
        )));

        random::reseed(42);
        let first = renderer.render(&world, &NoopProgress);
        random::reseed(42);
        let second = renderer.render(&world, &NoopProgress);

        assert_eq!(first.pixels, second.pixels);
    }

    #[test]
    fn multithreaded_render_completes_and_clamps() {
        let params = RenderParams {
            aspect_ratio: 2.0,
            image_height: 10,
            samples_per_pixel: 2,
            max_depth: 4,
            ..RenderParams::default()
        };
        let renderer = Renderer::new(params).with_workers(4);

        let mut world = HittableList::new();
        world.add(Box::new(Sphere::new(
            DVec3::new(0.0, 0.0, -1.0),
            0.5,
            Material::dielectric(1.5),
        )));

        let image = renderer.render(&world, &NoopProgress);
        assert_eq!(image.width, 20);
        assert_eq!(image.height, 10);
        assert_eq!(image.pixels.len(), 200);
        for pixel in &image.pixels {
            assert!(pixel.min_element() >= 0.0);
            assert!(pixel.max_element() <= 0.999);
        }
    }

    #[test]
    fn synchronous_render_reports_one_update_per_row_in_order() {
        let params = RenderParams {
            aspect_ratio: 1.0,
            image_height: 6,
            samples_per_pixel: 1,
            max_depth: 1,
            ..RenderParams::default()
        };
        let renderer = Renderer::new(params).with_workers(1);
        let world = HittableList::new();

        let sink = RecordingSink::default();
        renderer.render(&world, &sink);

        let height = renderer.camera().image_height as u64;
        let adds = sink.adds.lock().unwrap();
        assert_eq!(*adds, vec![("worker 0".to_string(), 0, height)]);

        // One update per row, strictly in order, ending at the full range.
        let updates = sink.updates.lock().unwrap();
        let expected: Vec<(String, u64)> = (1..=height)
            .map(|row| ("worker 0".to_string(), row))
            .collect();
        assert_eq!(*updates, expected);
    }

    #[test]
    fn parallel_render_registers_one_entry_per_worker() {
        let params = RenderParams {
            aspect_ratio: 1.0,
            image_height: 10,
            samples_per_pixel: 1,
            max_depth: 1,
            ..RenderParams::default()
        };
        let workers = 4u64;
        let renderer = Renderer::new(params).with_workers(workers as usize);
        let world = HittableList::new();

        let sink = RecordingSink::default();
        renderer.render(&world, &sink);

        let height = renderer.camera().image_height as u64;
        let adds = sink.adds.lock().unwrap();
        assert_eq!(adds.len(), workers as usize);
        for (id, (label, min, max)) in adds.iter().enumerate() {
            assert_eq!(label, &format!("worker {id}"));
            assert_eq!(*min, 0);
            // stride-W assignment: worker i owns rows i, i+W, i+2W, ...
            let rows = (height - id as u64).div_ceil(workers);
            assert_eq!(*max, rows);
        }

        // Every row posts exactly one update, and each worker's counter
        // reaches the range it registered.
        let updates = sink.updates.lock().unwrap();
        assert_eq!(updates.len(), height as usize);
        for (label, _, max) in adds.iter() {
            let per_worker: Vec<u64> = updates
                .iter()
                .filter(|(l, _)| l == label)
                .map(|&(_, current)| current)
                .collect();
            assert_eq!(per_worker.len(), *max as usize);
            assert_eq!(per_worker.last(), Some(max));
        }
    }

    #[test]
    fn seeded_render_is_deterministic_across_worker_threads() {
        let params = RenderParams {
            aspect_ratio: 1.0,
            image_height: 12,
            samples_per_pixel: 4,
            max_depth: 5,
            ..RenderParams::default()
        };
        let renderer = Renderer::new(params).with_workers(3).with_seed(9);

        let mut world = HittableList::new();
        world.add(Box::new(Sphere::matte(DVec3::new(0.0, 0.0, -1.0), 0.5)));
        world.add(Box::new(Sphere::new(
            DVec3::new(0.0, -100.5, -1.0),
            100.0,
            Material::lambertian(Color::new(0.8, 0.8, 0.0)),
        )));

        let first = renderer.render(&world, &NoopProgress);
        let second = renderer.render(&world, &NoopProgress);

        assert_eq!(first.pixels, second.pixels);
    }
}

//! Lumen path tracer
//!
//! Renders a static scene of analytic surfaces into a pixel buffer with
//! stochastic ray tracing: many jittered rays per pixel, recursive material
//! bounces, Monte-Carlo averaging. Rendering is partitioned across OS worker
//! threads by interleaved image rows, with per-worker progress reporting.

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod camera;
pub mod color;
pub mod hittable;
pub mod interval;
pub mod material;
pub mod progress;
pub mod random;
pub mod ray;
pub mod renderer;
pub mod sphere;

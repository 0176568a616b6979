//! Command line entry point: build a scene, render it, save a PNG.

use clap::Parser;
use glam::DVec3;
use log::{error, info};

use lumen::color::Color;
use lumen::hittable::HittableList;
use lumen::material::Material;
use lumen::progress::{NoopProgress, ProgressBoard};
use lumen::random;
use lumen::renderer::{RenderParams, Renderer};
use lumen::sphere::Sphere;

mod cli;
mod logger;
mod output;

use cli::{Args, ScenePreset};
use logger::init_logger;

/// Ground sphere plus one matte, one glass, and one metal sphere.
fn trio_scene() -> (HittableList, RenderParams) {
    let mut world = HittableList::new();

    world.add(Box::new(Sphere::new(
        DVec3::new(0.0, -100.5, -1.0),
        100.0,
        Material::lambertian(Color::new(0.8, 0.8, 0.0)),
    )));
    world.add(Box::new(Sphere::new(
        DVec3::new(0.0, 0.0, -1.2),
        0.5,
        Material::lambertian(Color::new(0.1, 0.2, 0.5)),
    )));
    world.add(Box::new(Sphere::new(
        DVec3::new(-1.0, 0.0, -1.0),
        0.5,
        Material::dielectric(1.5),
    )));
    world.add(Box::new(Sphere::new(
        DVec3::new(1.0, 0.0, -1.0),
        0.5,
        Material::metal(Color::new(0.8, 0.6, 0.2), 0.3),
    )));

    let params = RenderParams {
        vfov: 20.0,
        look_from: DVec3::new(-2.0, 2.0, 1.0),
        look_at: DVec3::new(0.0, 0.0, -1.0),
        defocus_angle: 10.0,
        focus_distance: 3.4,
        ..RenderParams::default()
    };

    (world, params)
}

/// Random field of small spheres around three large feature spheres.
fn cover_scene() -> (HittableList, RenderParams) {
    let mut world = HittableList::new();

    let ground = Material::lambertian(Color::splat(0.5));
    world.add(Box::new(Sphere::new(
        DVec3::new(0.0, -1000.0, 0.0),
        1000.0,
        ground,
    )));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = random::random_f64();
            let center = DVec3::new(
                a as f64 + 0.9 * random::random_f64(),
                0.2,
                b as f64 + 0.9 * random::random_f64(),
            );

            // Keep the small spheres away from the large feature spheres
            if (center - DVec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let material = if choose_mat < 0.8 {
                Material::lambertian(random::random_color() * random::random_color())
            } else if choose_mat < 0.95 {
                Material::metal(
                    random::random_color_range(0.5, 1.0),
                    random::random_f64_range(0.0, 0.5),
                )
            } else {
                Material::dielectric(1.5)
            };

            world.add(Box::new(Sphere::new(center, 0.2, material)));
        }
    }

    world.add(Box::new(Sphere::new(
        DVec3::new(0.0, 1.0, 0.0),
        1.0,
        Material::dielectric(1.5),
    )));
    world.add(Box::new(Sphere::new(
        DVec3::new(-4.0, 1.0, 0.0),
        1.0,
        Material::lambertian(Color::new(0.4, 0.2, 0.1)),
    )));
    world.add(Box::new(Sphere::new(
        DVec3::new(4.0, 1.0, 0.0),
        1.0,
        Material::metal(Color::new(0.7, 0.6, 0.5), 0.0),
    )));

    let params = RenderParams {
        vfov: 20.0,
        look_from: DVec3::new(13.0, 2.0, 3.0),
        look_at: DVec3::ZERO,
        defocus_angle: 0.6,
        focus_distance: 10.0,
        ..RenderParams::default()
    };

    (world, params)
}

fn main() {
    let args = Args::parse();
    init_logger(args.debug_level.into());

    if let Some(seed) = args.seed {
        random::reseed(seed);
        info!("random generator seeded with {seed}");
    }

    let (world, mut params) = match args.scene {
        ScenePreset::Trio => trio_scene(),
        ScenePreset::Cover => cover_scene(),
    };
    params.aspect_ratio = args.aspect_ratio;
    params.image_height = args.height;
    params.samples_per_pixel = args.samples_per_pixel;
    params.max_depth = args.max_depth;

    let mut renderer = Renderer::new(params);
    if let Some(workers) = args.workers {
        renderer = renderer.with_workers(workers);
    }
    if let Some(seed) = args.seed {
        renderer = renderer.with_seed(seed);
    }

    let image = if args.no_progress {
        renderer.render(&world, &NoopProgress)
    } else {
        let board = ProgressBoard::new();
        let image = renderer.render(&world, &board);
        board.finish();
        image
    };

    let path = args
        .output
        .unwrap_or_else(|| output::timestamped_name("out", "png"));
    if let Err(err) = output::save_png(&image, &path) {
        error!("failed to save image to {path}: {err}");
        std::process::exit(1);
    }
}

//! Color helpers shared by the integrator and the output stage.

use glam::DVec3;

use crate::interval::Interval;

/// RGB color with components interpreted as R, G, B.
///
/// Linear light values in [0, ∞) before tone mapping.
pub type Color = DVec3;

/// Convert one linear channel to gamma space (gamma = 2, so inverse is sqrt).
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Gamma-correct all three channels of a color.
pub fn correct_gamma(color: Color) -> Color {
    Color::new(
        linear_to_gamma(color.x),
        linear_to_gamma(color.y),
        linear_to_gamma(color.z),
    )
}

/// Clamp all three channels of a color into the given interval.
pub fn clamp(color: Color, interval: Interval) -> Color {
    Color::new(
        interval.clamp(color.x),
        interval.clamp(color.y),
        interval.clamp(color.z),
    )
}

/// Convert a tone-mapped color in [0, 1) to 8-bit RGB.
pub fn to_rgb8(color: Color) -> [u8; 3] {
    [
        (256.0 * color.x) as u8,
        (256.0 * color.y) as u8,
        (256.0 * color.z) as u8,
    ]
}

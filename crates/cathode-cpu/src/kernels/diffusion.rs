use cathode_core::passes::{GaussianBlurConstants, TonemapConstants};
use glam::{Vec3, Vec4};

use super::{Bound, Texel};

/// Binomial weights, row 12 of Pascal's triangle over 2^12.
const BLUR_WEIGHTS: [f32; 13] = [
    1.0 / 4096.0,
    12.0 / 4096.0,
    66.0 / 4096.0,
    220.0 / 4096.0,
    495.0 / 4096.0,
    792.0 / 4096.0,
    924.0 / 4096.0,
    792.0 / 4096.0,
    495.0 / 4096.0,
    220.0 / 4096.0,
    66.0 / 4096.0,
    12.0 / 4096.0,
    1.0 / 4096.0,
];

pub fn tonemap(c: &TonemapConstants, image: &Bound, texel: Texel) -> Vec4 {
    let rgb = image.sample(texel.uv()).truncate();
    let lifted = (rgb - Vec3::splat(c.min_luminosity)).max(Vec3::ZERO);
    lifted.powf(c.color_power).extend(1.0)
}

pub fn gaussian_blur(c: &GaussianBlurConstants, image: &Bound, texel: Texel) -> Vec4 {
    let uv = texel.uv();
    let mut sum = Vec3::ZERO;
    for (i, weight) in BLUR_WEIGHTS.iter().enumerate() {
        let offset = i as f32 - 6.0;
        sum += *weight * image.sample(uv + c.direction * offset).truncate();
    }
    sum.extend(1.0)
}

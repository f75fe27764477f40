//! Per-texel implementations of every [`ShaderId`](cathode_core::ShaderId).
//!
//! Each kernel mirrors the GLSL program of the same name in `cathode-gl`.

pub mod crt;
pub mod decode;
pub mod diffusion;
pub mod signal;

use std::f32::consts::TAU;

use cathode_core::{PassConstants, SamplerType, SIGNAL_SAMPLES_PER_COLOR_CYCLE};
use glam::{Mat3, Vec2, Vec3, Vec4};

use crate::texture::CpuTexture;

/// FCC RGB to YIQ, column-major.
pub const RGB_TO_YIQ: Mat3 = Mat3::from_cols(
    Vec3::new(0.299, 0.595716, 0.211456),
    Vec3::new(0.587, -0.274453, -0.522591),
    Vec3::new(0.114, -0.321263, 0.311135),
);

/// Exact inverse of [`RGB_TO_YIQ`].
pub const YIQ_TO_RGB: Mat3 = Mat3::from_cols(
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(0.956_295_7, -0.272_122_1, -1.106_989),
    Vec3::new(0.621_024_4, -0.647_380_6, 1.704_615),
);

/// An input texture as a kernel sees it: the texture plus how to sample it.
#[derive(Clone, Copy)]
pub struct Bound<'a> {
    pub texture: &'a CpuTexture,
    pub sampler: SamplerType,
}

impl<'a> Bound<'a> {
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        self.texture.sample(uv, self.sampler)
    }

    pub fn fetch(&self, x: i32, y: i32) -> Vec4 {
        self.texture.fetch(x, y, self.sampler)
    }

    /// Fetch that moves out-of-range columns back by whole carrier periods,
    /// so the carrier phase of the returned sample matches the requested one.
    pub fn fetch_in_period(&self, x: i32, y: i32) -> Vec4 {
        let period = SIGNAL_SAMPLES_PER_COLOR_CYCLE as i32;
        let width = self.texture.width() as i32;
        let mut x = x;
        if x < 0 {
            x += period * ((-x + period - 1) / period);
        }
        if x >= width {
            x -= period * ((x - width) / period + 1);
        }
        self.fetch(x.clamp(0, width - 1), y)
    }
}

/// Where the kernel is running.
#[derive(Debug, Clone, Copy)]
pub struct Texel {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Texel {
    /// Normalized coordinates of the texel center.
    pub fn uv(&self) -> Vec2 {
        Vec2::new(
            (self.x as f32 + 0.5) / self.width as f32,
            (self.y as f32 + 0.5) / self.height as f32,
        )
    }
}

/// Angle of the color carrier at signal sample `x` of a line with the given phase.
pub fn carrier_angle(line_phase: f32, x: i32) -> f32 {
    let cycles = line_phase + x as f32 / SIGNAL_SAMPLES_PER_COLOR_CYCLE as f32;
    TAU * cycles.rem_euclid(1.0)
}

/// Run the kernel selected by `constants` for one output texel.
pub fn shade(constants: &PassConstants, inputs: &[Bound], texel: Texel) -> Vec4 {
    match constants {
        PassConstants::Copy => inputs[0].sample(texel.uv()),
        PassConstants::GenerateSignal(c) => signal::generate_signal(c, &inputs[0], texel),
        PassConstants::ApplyArtifacts(c) => signal::apply_artifacts(c, &inputs[0], texel),
        PassConstants::CompositeToSVideo(c) => decode::composite_to_svideo(c, &inputs[0], texel),
        PassConstants::SVideoToYiq(c) => decode::svideo_to_yiq(c, &inputs[0], texel),
        PassConstants::YiqToRgb(_) => decode::yiq_to_rgb(&inputs[0], texel),
        PassConstants::GenerateSlotMask(_) => crt::slot_mask(texel),
        PassConstants::GenerateShadowMask(_) => crt::shadow_mask(texel),
        PassConstants::GenerateApertureGrille(_) => crt::aperture_grille(texel),
        PassConstants::Tonemap(c) => diffusion::tonemap(c, &inputs[0], texel),
        PassConstants::GaussianBlur(c) => diffusion::gaussian_blur(c, &inputs[0], texel),
        PassConstants::RgbToCrt(c) => {
            crt::rgb_to_crt(c, &inputs[0], &inputs[1], &inputs[2], &inputs[3], texel)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cathode_core::TextureFormat;

    #[test]
    fn yiq_matrices_invert() {
        let product = YIQ_TO_RGB * RGB_TO_YIQ;
        assert!(product.abs_diff_eq(Mat3::IDENTITY, 1e-5));
    }

    #[test]
    fn gray_has_no_chroma() {
        let yiq = RGB_TO_YIQ * Vec3::splat(0.5);
        assert!((yiq.x - 0.5).abs() < 1e-6);
        assert!(yiq.y.abs() < 1e-6 && yiq.z.abs() < 1e-6);
    }

    #[test]
    fn period_fetch_keeps_carrier_phase() {
        let mut texture = CpuTexture::new(10, 1, TextureFormat::Rgba32Float);
        for x in 0..10 {
            texture.store(x, 0, Vec4::splat(x as f32));
        }
        let bound = Bound { texture: &texture, sampler: SamplerType::NearestClamp };
        assert_eq!(bound.fetch_in_period(-1, 0).x, 3.0);
        assert_eq!(bound.fetch_in_period(10, 0).x, 6.0);
        assert_eq!(bound.fetch_in_period(11, 0).x, 7.0);
        assert_eq!(bound.fetch_in_period(5, 0).x, 5.0);
    }
}

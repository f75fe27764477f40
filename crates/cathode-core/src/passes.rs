//! Per-pass constants.
//!
//! One variant per [`ShaderId`]. The CPU device reads the structs directly;
//! the GL device flattens them into named uniforms with [`PassConstants::uniforms`].

use glam::Vec2;

use crate::device::ShaderId;
use crate::settings::MaskType;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Float(f32),
    Int(i32),
    UInt(u32),
    Vec2(Vec2),
}

impl From<f32> for Uniform {
    fn from(v: f32) -> Self {
        Uniform::Float(v)
    }
}

impl From<u32> for Uniform {
    fn from(v: u32) -> Self {
        Uniform::UInt(v)
    }
}

impl From<bool> for Uniform {
    fn from(v: bool) -> Self {
        Uniform::Int(v as i32)
    }
}

impl From<Vec2> for Uniform {
    fn from(v: Vec2) -> Self {
        Uniform::Vec2(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateSignalConstants {
    pub signal_width: u32,
    pub scanline_count: u32,
    pub input_width: u32,
    pub frame_phase: f32,
    pub prev_frame_phase: f32,
    pub phase_increment_per_line: f32,
    /// Sum luma and chroma into one channel instead of keeping them apart.
    pub composite: bool,
    /// Also encode the previous frame's phase into the second half of each texel.
    pub doubled: bool,
    pub chroma_scale: f32,
    /// Per-line horizontal offset, in input pixels.
    pub instability_scale: f32,
    pub noise_seed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplyArtifactsConstants {
    pub signal_width: u32,
    pub scanline_count: u32,
    pub ghost_visibility: f32,
    pub ghost_spread_scale: f32,
    /// In color cycles.
    pub ghost_distance: f32,
    pub noise_strength: f32,
    pub noise_seed: u32,
    /// S-Video carries four live channels, composite two.
    pub svideo: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeToSVideoConstants {
    pub signal_width: u32,
    pub doubled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SVideoToYiqConstants {
    pub signal_width: u32,
    pub scanline_count: u32,
    pub frame_phase: f32,
    pub prev_frame_phase: f32,
    pub phase_increment_per_line: f32,
    pub tint: f32,
    pub saturation: f32,
    pub brightness: f32,
    pub gamma: f32,
    pub sharpness: f32,
    pub black_level: f32,
    pub white_level: f32,
    pub saturation_scale: f32,
    /// Weight of the second phase variant. Zero unless the signal is doubled.
    pub temporal_blend: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YiqToRgbConstants {
    pub signal_width: u32,
    pub scanline_count: u32,
}

/// Tile size shared by the three mask generators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskConstants {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TonemapConstants {
    /// Subtracted before the power curve so only bright areas bloom.
    pub min_luminosity: f32,
    pub color_power: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianBlurConstants {
    /// One tap step in uv. `(1 / width, 0)` for the horizontal pass.
    pub direction: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbToCrtConstants {
    /// Scales the screen rectangle so the image keeps its aspect in the output.
    pub view_scale: Vec2,
    /// Maps `0..1` screen coordinates onto the visible part of the input.
    pub overscan_scale: Vec2,
    pub overscan_offset: Vec2,
    pub distortion: Vec2,
    pub edge_rounding: Vec2,
    pub corner_rounding: f32,
    /// Mask tiles per unit of source uv.
    pub mask_uv_scale: Vec2,
    pub mask_strength: f32,
    pub phosphor_decay: f32,
    /// Input scanlines; the screen has two physical lines per input line.
    pub scanline_count: u32,
    pub scanline_strength: f32,
    pub scanline_parity: u32,
    /// Display-side jitter, in input pixels.
    pub instability_scale: f32,
    pub input_width: u32,
    pub noise_seed: u32,
    pub black_level: f32,
    pub white_level: f32,
    pub diffusion_strength: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassConstants {
    Copy,
    GenerateSignal(GenerateSignalConstants),
    ApplyArtifacts(ApplyArtifactsConstants),
    CompositeToSVideo(CompositeToSVideoConstants),
    SVideoToYiq(SVideoToYiqConstants),
    YiqToRgb(YiqToRgbConstants),
    GenerateSlotMask(MaskConstants),
    GenerateShadowMask(MaskConstants),
    GenerateApertureGrille(MaskConstants),
    Tonemap(TonemapConstants),
    GaussianBlur(GaussianBlurConstants),
    RgbToCrt(RgbToCrtConstants),
}

impl PassConstants {
    /// Constants for the generator of `mask`.
    pub fn mask(mask: MaskType, tile: MaskConstants) -> Self {
        match mask {
            MaskType::SlotMask => PassConstants::GenerateSlotMask(tile),
            MaskType::ShadowMask => PassConstants::GenerateShadowMask(tile),
            MaskType::ApertureGrille => PassConstants::GenerateApertureGrille(tile),
        }
    }

    /// The shader these constants were built for.
    pub fn shader_id(&self) -> ShaderId {
        match self {
            PassConstants::Copy => ShaderId::Copy,
            PassConstants::GenerateSignal(_) => ShaderId::GenerateSignal,
            PassConstants::ApplyArtifacts(_) => ShaderId::ApplyArtifacts,
            PassConstants::CompositeToSVideo(_) => ShaderId::CompositeToSVideo,
            PassConstants::SVideoToYiq(_) => ShaderId::SVideoToYiq,
            PassConstants::YiqToRgb(_) => ShaderId::YiqToRgb,
            PassConstants::GenerateSlotMask(_) => ShaderId::GenerateSlotMask,
            PassConstants::GenerateShadowMask(_) => ShaderId::GenerateShadowMask,
            PassConstants::GenerateApertureGrille(_) => ShaderId::GenerateApertureGrille,
            PassConstants::Tonemap(_) => ShaderId::Tonemap,
            PassConstants::GaussianBlur(_) => ShaderId::GaussianBlur,
            PassConstants::RgbToCrt(_) => ShaderId::RgbToCrt,
        }
    }

    /// Flatten into `(uniform name, value)` pairs matching the GLSL sources.
    pub fn uniforms(&self) -> Vec<(&'static str, Uniform)> {
        match self {
            PassConstants::Copy => Vec::new(),
            PassConstants::GenerateSignal(c) => vec![
                ("u_signal_width", c.signal_width.into()),
                ("u_scanline_count", c.scanline_count.into()),
                ("u_input_width", c.input_width.into()),
                ("u_frame_phase", c.frame_phase.into()),
                ("u_prev_frame_phase", c.prev_frame_phase.into()),
                ("u_phase_increment_per_line", c.phase_increment_per_line.into()),
                ("u_composite", c.composite.into()),
                ("u_doubled", c.doubled.into()),
                ("u_chroma_scale", c.chroma_scale.into()),
                ("u_instability_scale", c.instability_scale.into()),
                ("u_noise_seed", c.noise_seed.into()),
            ],
            PassConstants::ApplyArtifacts(c) => vec![
                ("u_signal_width", c.signal_width.into()),
                ("u_scanline_count", c.scanline_count.into()),
                ("u_ghost_visibility", c.ghost_visibility.into()),
                ("u_ghost_spread_scale", c.ghost_spread_scale.into()),
                ("u_ghost_distance", c.ghost_distance.into()),
                ("u_noise_strength", c.noise_strength.into()),
                ("u_noise_seed", c.noise_seed.into()),
                ("u_svideo", c.svideo.into()),
            ],
            PassConstants::CompositeToSVideo(c) => vec![
                ("u_signal_width", c.signal_width.into()),
                ("u_doubled", c.doubled.into()),
            ],
            PassConstants::SVideoToYiq(c) => vec![
                ("u_signal_width", c.signal_width.into()),
                ("u_scanline_count", c.scanline_count.into()),
                ("u_frame_phase", c.frame_phase.into()),
                ("u_prev_frame_phase", c.prev_frame_phase.into()),
                ("u_phase_increment_per_line", c.phase_increment_per_line.into()),
                ("u_tint", c.tint.into()),
                ("u_saturation", c.saturation.into()),
                ("u_brightness", c.brightness.into()),
                ("u_gamma", c.gamma.into()),
                ("u_sharpness", c.sharpness.into()),
                ("u_black_level", c.black_level.into()),
                ("u_white_level", c.white_level.into()),
                ("u_saturation_scale", c.saturation_scale.into()),
                ("u_temporal_blend", c.temporal_blend.into()),
            ],
            PassConstants::YiqToRgb(c) => vec![
                ("u_signal_width", c.signal_width.into()),
                ("u_scanline_count", c.scanline_count.into()),
            ],
            PassConstants::GenerateSlotMask(c)
            | PassConstants::GenerateShadowMask(c)
            | PassConstants::GenerateApertureGrille(c) => vec![
                ("u_mask_width", c.width.into()),
                ("u_mask_height", c.height.into()),
            ],
            PassConstants::Tonemap(c) => vec![
                ("u_min_luminosity", c.min_luminosity.into()),
                ("u_color_power", c.color_power.into()),
            ],
            PassConstants::GaussianBlur(c) => vec![("u_direction", c.direction.into())],
            PassConstants::RgbToCrt(c) => vec![
                ("u_view_scale", c.view_scale.into()),
                ("u_overscan_scale", c.overscan_scale.into()),
                ("u_overscan_offset", c.overscan_offset.into()),
                ("u_distortion", c.distortion.into()),
                ("u_edge_rounding", c.edge_rounding.into()),
                ("u_corner_rounding", c.corner_rounding.into()),
                ("u_mask_uv_scale", c.mask_uv_scale.into()),
                ("u_mask_strength", c.mask_strength.into()),
                ("u_phosphor_decay", c.phosphor_decay.into()),
                ("u_scanline_count", c.scanline_count.into()),
                ("u_scanline_strength", c.scanline_strength.into()),
                ("u_scanline_parity", c.scanline_parity.into()),
                ("u_instability_scale", c.instability_scale.into()),
                ("u_input_width", c.input_width.into()),
                ("u_noise_seed", c.noise_seed.into()),
                ("u_black_level", c.black_level.into()),
                ("u_white_level", c.white_level.into()),
                ("u_diffusion_strength", c.diffusion_strength.into()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_names_are_unique_per_pass() {
        let constants = PassConstants::SVideoToYiq(SVideoToYiqConstants {
            signal_width: 4,
            scanline_count: 1,
            frame_phase: 0.0,
            prev_frame_phase: 0.0,
            phase_increment_per_line: 0.0,
            tint: 0.0,
            saturation: 1.0,
            brightness: 1.0,
            gamma: 1.0,
            sharpness: 0.0,
            black_level: 0.0,
            white_level: 1.0,
            saturation_scale: 0.5,
            temporal_blend: 0.0,
        });
        let mut names: Vec<&str> = constants.uniforms().iter().map(|(n, _)| *n).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(constants.shader_id(), ShaderId::SVideoToYiq);
    }

    #[test]
    fn mask_constants_follow_the_mask_type() {
        let tile = MaskConstants { width: 48, height: 32 };
        for mask in [MaskType::SlotMask, MaskType::ShadowMask, MaskType::ApertureGrille] {
            assert_eq!(PassConstants::mask(mask, tile).shader_id(), ShaderId::mask_generator(mask));
        }
    }

    #[test]
    fn flags_become_ints() {
        assert_eq!(Uniform::from(true), Uniform::Int(1));
        assert!(PassConstants::Copy.uniforms().is_empty());
    }
}

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;
use crate::passes::PassConstants;
use crate::settings::MaskType;

/// Every fullscreen program the pipeline can ask a device for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderId {
    /// Straight texel copy, used to present the phosphor accumulator.
    Copy,
    /// RGB to composite or S-Video, with per-line instability.
    GenerateSignal,
    /// Ghosting and noise over an already generated signal.
    ApplyArtifacts,
    /// Split composite into luma and chroma.
    CompositeToSVideo,
    /// Demodulate luma/chroma into YIQ and apply the TV knobs.
    SVideoToYiq,
    YiqToRgb,
    /// Renders one tile of a slot mask.
    GenerateSlotMask,
    /// Renders one tile of a delta-dot shadow mask.
    GenerateShadowMask,
    /// Renders one tile of an aperture grille.
    GenerateApertureGrille,
    /// Squashes dark values before the diffusion blur.
    Tonemap,
    /// One direction of the separable diffusion blur.
    GaussianBlur,
    /// The screen itself: overscan, warp, scanlines, mask, diffusion and phosphor.
    RgbToCrt,
}

impl ShaderId {
    pub const ALL: [ShaderId; 12] = [
        ShaderId::Copy,
        ShaderId::GenerateSignal,
        ShaderId::ApplyArtifacts,
        ShaderId::CompositeToSVideo,
        ShaderId::SVideoToYiq,
        ShaderId::YiqToRgb,
        ShaderId::GenerateSlotMask,
        ShaderId::GenerateShadowMask,
        ShaderId::GenerateApertureGrille,
        ShaderId::Tonemap,
        ShaderId::GaussianBlur,
        ShaderId::RgbToCrt,
    ];

    /// The generator that draws one tile of `mask`.
    pub fn mask_generator(mask: MaskType) -> ShaderId {
        match mask {
            MaskType::SlotMask => ShaderId::GenerateSlotMask,
            MaskType::ShadowMask => ShaderId::GenerateShadowMask,
            MaskType::ApertureGrille => ShaderId::GenerateApertureGrille,
        }
    }

    /// Number of input textures the shader samples, in binding order.
    pub fn input_count(self) -> usize {
        match self {
            ShaderId::GenerateSlotMask | ShaderId::GenerateShadowMask | ShaderId::GenerateApertureGrille => 0,
            ShaderId::Copy
            | ShaderId::GenerateSignal
            | ShaderId::ApplyArtifacts
            | ShaderId::CompositeToSVideo
            | ShaderId::SVideoToYiq
            | ShaderId::YiqToRgb
            | ShaderId::Tonemap
            | ShaderId::GaussianBlur => 1,
            ShaderId::RgbToCrt => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    R32Float,
    Rg32Float,
    Rgba32Float,
}

impl TextureFormat {
    pub fn channels(self) -> usize {
        match self {
            TextureFormat::R32Float => 1,
            TextureFormat::Rg32Float => 2,
            TextureFormat::Rgba8Unorm | TextureFormat::Rgba32Float => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerType {
    NearestClamp,
    NearestWrap,
    LinearClamp,
    LinearWrap,
}

impl SamplerType {
    pub fn is_linear(self) -> bool {
        matches!(self, SamplerType::LinearClamp | SamplerType::LinearWrap)
    }

    pub fn wraps(self) -> bool {
        matches!(self, SamplerType::NearestWrap | SamplerType::LinearWrap)
    }
}

/// Opaque reference to a device texture. Cheap to copy; ownership is by
/// convention with whichever stage created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// A compiled shader. Not `Copy`: the stage that created it owns it and
/// hands it back through [`GraphicsDevice::release_shader`].
#[derive(Debug, PartialEq, Eq)]
pub struct ShaderHandle {
    id: ShaderId,
    raw: u32,
}

impl ShaderHandle {
    pub fn new(id: ShaderId, raw: u32) -> Self {
        Self { id, raw }
    }

    pub fn id(&self) -> ShaderId {
        self.id
    }

    pub fn raw(&self) -> u32 {
        self.raw
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderInput {
    pub texture: TextureHandle,
    pub sampler: SamplerType,
}

impl ShaderInput {
    pub fn new(texture: TextureHandle, sampler: SamplerType) -> Self {
        Self { texture, sampler }
    }
}

/// The device the pipeline renders through.
///
/// Every pass is one fullscreen quad: the shader runs once per texel of
/// `output`, with texture coordinates spanning `0..1` and texel centers at
/// `(x + 0.5) / width`. Row 0 is the first scanline.
pub trait GraphicsDevice {
    fn create_shader(&mut self, id: ShaderId) -> Result<ShaderHandle, DeviceError>;

    /// New targets start cleared to transparent black.
    fn create_render_target(
        &mut self,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Result<TextureHandle, DeviceError>;

    /// `(0, 0)` for a handle the device does not know.
    fn texture_size(&self, texture: TextureHandle) -> (u32, u32);

    fn begin_rendering(&mut self) {}

    /// Run `shader` over every texel of `output`. Misuse (unknown handles,
    /// wrong input count, constants for another shader, reading the output)
    /// is logged and the pass skipped.
    fn render_quad(
        &mut self,
        shader: &ShaderHandle,
        output: TextureHandle,
        inputs: &[ShaderInput],
        constants: &PassConstants,
    );

    fn end_rendering(&mut self) {}

    fn release_shader(&mut self, shader: ShaderHandle);

    fn release_texture(&mut self, texture: TextureHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crt_pass_reads_image_history_mask_and_diffusion() {
        assert_eq!(ShaderId::RgbToCrt.input_count(), 4);
        assert_eq!(ShaderId::GenerateShadowMask.input_count(), 0);
    }

    #[test]
    fn every_mask_type_has_a_generator() {
        for mask in [MaskType::SlotMask, MaskType::ShadowMask, MaskType::ApertureGrille] {
            let id = ShaderId::mask_generator(mask);
            assert!(ShaderId::ALL.contains(&id));
            assert_eq!(id.input_count(), 0);
        }
    }

    #[test]
    fn sampler_flags() {
        assert!(SamplerType::LinearWrap.is_linear() && SamplerType::LinearWrap.wraps());
        assert!(!SamplerType::NearestClamp.is_linear() && !SamplerType::NearestClamp.wraps());
    }
}

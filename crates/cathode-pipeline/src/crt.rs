use cathode_core::passes::{GaussianBlurConstants, MaskConstants, RgbToCrtConstants, TonemapConstants};
use cathode_core::{
    DeviceError, GraphicsDevice, MaskType, PassConstants, SamplerType, ScanlineType, ScreenSettings, ShaderHandle,
    ShaderId, ShaderInput, SignalLevels, TextureFormat, TextureHandle,
};
use glam::Vec2;

/// One mask tile holds two RGB triads across.
pub const MASK_TILE_WIDTH: u32 = 48;
pub const MASK_TILE_HEIGHT: u32 = 32;

/// Tonemap applied before the diffusion blur.
const DIFFUSION_MIN_LUMINOSITY: f32 = 0.0;
const DIFFUSION_COLOR_POWER: f32 = 1.3;

/// Extra tile density per mask type, so each pattern reads at a similar pitch.
fn mask_pitch(mask_type: MaskType) -> Vec2 {
    match mask_type {
        MaskType::SlotMask => Vec2::splat(1.3),
        MaskType::ShadowMask => Vec2::splat(0.6),
        MaskType::ApertureGrille => Vec2::new(1.4, 1.0),
    }
}

/// Renders decoded RGB as it would look on a CRT.
///
/// Keeps a pair of output-sized accumulators: each frame blends into one
/// while reading the other, and the fresh one is copied to the caller's output.
/// The mask tile is drawn lazily on the first frame after it changes, so every
/// pass runs inside the device's rendering bracket.
pub struct CrtRenderer {
    input_width: u32,
    input_height: u32,
    settings: ScreenSettings,
    output_width: u32,
    output_height: u32,

    crt_shader: ShaderHandle,
    copy_shader: ShaderHandle,
    mask_shader: ShaderHandle,
    tonemap_shader: ShaderHandle,
    blur_shader: ShaderHandle,

    mask: TextureHandle,
    needs_mask: bool,
    /// Tonemapped image, then ping-ponged through the two blur directions.
    diffusion: [TextureHandle; 2],
    accumulators: [TextureHandle; 2],
    current: usize,
    frame: u32,
}

impl CrtRenderer {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        input_width: u32,
        input_height: u32,
        settings: &ScreenSettings,
        output_width: u32,
        output_height: u32,
    ) -> Result<Self, DeviceError> {
        let settings = settings.clamped();
        let input_width = input_width.max(1);
        let input_height = input_height.max(1);

        let crt_shader = device.create_shader(ShaderId::RgbToCrt)?;
        let copy_shader = device.create_shader(ShaderId::Copy)?;
        let mask_shader = device.create_shader(ShaderId::mask_generator(settings.mask_type))?;
        let tonemap_shader = device.create_shader(ShaderId::Tonemap)?;
        let blur_shader = device.create_shader(ShaderId::GaussianBlur)?;

        let mask = device.create_render_target(MASK_TILE_WIDTH, MASK_TILE_HEIGHT, TextureFormat::Rgba8Unorm)?;
        let diffusion = [
            device.create_render_target(input_width, input_height, TextureFormat::Rgba8Unorm)?,
            device.create_render_target(input_width, input_height, TextureFormat::Rgba8Unorm)?,
        ];
        let accumulators = create_accumulators(device, output_width, output_height)?;
        log::debug!("crt: {input_width}x{input_height} -> {output_width}x{output_height}");

        Ok(Self {
            input_width,
            input_height,
            settings,
            output_width,
            output_height,
            crt_shader,
            copy_shader,
            mask_shader,
            tonemap_shader,
            blur_shader,
            mask,
            needs_mask: true,
            diffusion,
            accumulators,
            current: 0,
            frame: 0,
        })
    }

    /// Switching mask type swaps the generator; the tile is redrawn on the next frame.
    pub fn set_settings(&mut self, device: &mut dyn GraphicsDevice, settings: &ScreenSettings) -> Result<(), DeviceError> {
        let settings = settings.clamped();
        if settings.mask_type != self.settings.mask_type {
            let shader = device.create_shader(ShaderId::mask_generator(settings.mask_type))?;
            device.release_shader(std::mem::replace(&mut self.mask_shader, shader));
            self.needs_mask = true;
            log::debug!("crt: mask type now {:?}", settings.mask_type);
        }
        self.settings = settings;
        Ok(())
    }

    pub fn settings(&self) -> &ScreenSettings {
        &self.settings
    }

    pub fn input_size(&self) -> (u32, u32) {
        (self.input_width, self.input_height)
    }

    pub fn output_size(&self) -> (u32, u32) {
        (self.output_width, self.output_height)
    }

    /// Recreate the accumulators at a new size. Phosphor history is lost.
    pub fn set_output_size(
        &mut self,
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
    ) -> Result<(), DeviceError> {
        if (width, height) == (self.output_width, self.output_height) {
            return Ok(());
        }
        let accumulators = create_accumulators(device, width, height)?;
        for old in std::mem::replace(&mut self.accumulators, accumulators) {
            device.release_texture(old);
        }
        self.output_width = width;
        self.output_height = height;
        self.current = 0;
        log::debug!("crt: output resized to {width}x{height}");
        Ok(())
    }

    /// The accumulator holding the last rendered frame.
    pub fn last_frame(&self) -> TextureHandle {
        self.accumulators[self.current]
    }

    fn constants(&self, levels: SignalLevels, scanline_type: ScanlineType) -> RgbToCrtConstants {
        let s = &self.settings;
        let (left, top, visible_width, visible_height) = s.visible_region(self.input_width, self.input_height);
        let input = Vec2::new(self.input_width as f32, self.input_height as f32);

        let image_aspect = visible_width as f32 * s.input_pixel_aspect_ratio / visible_height as f32;
        let output_aspect = self.output_width as f32 / self.output_height.max(1) as f32;
        let view_scale = if output_aspect > image_aspect {
            Vec2::new(output_aspect / image_aspect, 1.0)
        } else {
            Vec2::new(1.0, image_aspect / output_aspect)
        };

        let mask_uv_scale =
            Vec2::new(input.x * s.input_pixel_aspect_ratio, input.y) * 0.5 / s.shadow_mask_scale * mask_pitch(s.mask_type);

        RgbToCrtConstants {
            view_scale,
            overscan_scale: Vec2::new(visible_width as f32, visible_height as f32) / input,
            overscan_offset: Vec2::new(left as f32, top as f32) / input,
            distortion: Vec2::new(s.horizontal_distortion, s.vertical_distortion),
            edge_rounding: Vec2::new(s.screen_edge_rounding_x, s.screen_edge_rounding_y),
            corner_rounding: s.corner_rounding,
            mask_uv_scale,
            mask_strength: s.shadow_mask_strength,
            phosphor_decay: s.phosphor_decay,
            scanline_count: self.input_height,
            scanline_strength: s.scanline_strength,
            scanline_parity: scanline_type.parity(),
            instability_scale: s.instability_scale,
            input_width: self.input_width,
            noise_seed: self.frame,
            black_level: levels.black_level,
            white_level: levels.white_level,
            diffusion_strength: s.diffusion_strength,
        }
    }

    /// Tonemap `rgb` into the first diffusion target, then blur it across and down.
    fn render_diffusion(&self, device: &mut dyn GraphicsDevice, rgb: TextureHandle) {
        let [blurred, scratch] = self.diffusion;
        let tonemap = PassConstants::Tonemap(TonemapConstants {
            min_luminosity: DIFFUSION_MIN_LUMINOSITY,
            color_power: DIFFUSION_COLOR_POWER,
        });
        device.render_quad(&self.tonemap_shader, blurred, &[ShaderInput::new(rgb, SamplerType::LinearClamp)], &tonemap);

        let pixel_width = self.input_width as f32 * self.settings.input_pixel_aspect_ratio;
        let across = PassConstants::GaussianBlur(GaussianBlurConstants { direction: Vec2::new(1.0 / pixel_width, 0.0) });
        let down = PassConstants::GaussianBlur(GaussianBlurConstants {
            direction: Vec2::new(0.0, 1.0 / self.input_height as f32),
        });
        device.render_quad(&self.blur_shader, scratch, &[ShaderInput::new(blurred, SamplerType::LinearClamp)], &across);
        device.render_quad(&self.blur_shader, blurred, &[ShaderInput::new(scratch, SamplerType::LinearClamp)], &down);
    }

    /// Render `rgb` into `output`, blending with the previous frame.
    pub fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        rgb: TextureHandle,
        levels: SignalLevels,
        scanline_type: ScanlineType,
        output: TextureHandle,
    ) {
        if self.needs_mask {
            let tile = MaskConstants { width: MASK_TILE_WIDTH, height: MASK_TILE_HEIGHT };
            device.render_quad(&self.mask_shader, self.mask, &[], &PassConstants::mask(self.settings.mask_type, tile));
            self.needs_mask = false;
        }
        if self.settings.diffusion_strength > 0.0 {
            self.render_diffusion(device, rgb);
        }

        let previous = self.accumulators[self.current];
        let next = self.accumulators[1 - self.current];

        let constants = PassConstants::RgbToCrt(self.constants(levels, scanline_type));
        device.render_quad(
            &self.crt_shader,
            next,
            &[
                ShaderInput::new(rgb, SamplerType::LinearClamp),
                ShaderInput::new(previous, SamplerType::NearestClamp),
                ShaderInput::new(self.mask, SamplerType::LinearWrap),
                ShaderInput::new(self.diffusion[0], SamplerType::LinearClamp),
            ],
            &constants,
        );

        let sampler = if device.texture_size(output) == (self.output_width, self.output_height) {
            SamplerType::NearestClamp
        } else {
            log::warn!("crt: output is not {}x{}, scaling", self.output_width, self.output_height);
            SamplerType::LinearClamp
        };
        device.render_quad(&self.copy_shader, output, &[ShaderInput::new(next, sampler)], &PassConstants::Copy);

        self.current = 1 - self.current;
        self.frame = self.frame.wrapping_add(1);
    }

    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        for shader in [self.crt_shader, self.copy_shader, self.mask_shader, self.tonemap_shader, self.blur_shader] {
            device.release_shader(shader);
        }
        device.release_texture(self.mask);
        for texture in self.diffusion.into_iter().chain(self.accumulators) {
            device.release_texture(texture);
        }
    }
}

fn create_accumulators(
    device: &mut dyn GraphicsDevice,
    width: u32,
    height: u32,
) -> Result<[TextureHandle; 2], DeviceError> {
    Ok([
        device.create_render_target(width, height, TextureFormat::Rgba8Unorm)?,
        device.create_render_target(width, height, TextureFormat::Rgba8Unorm)?,
    ])
}

use cathode_core::passes::{CompositeToSVideoConstants, SVideoToYiqConstants, YiqToRgbConstants};
use cathode_core::{
    DeviceError, GraphicsDevice, PassConstants, SamplerType, ShaderHandle, ShaderId, ShaderInput, SignalLevels,
    SignalPhases, SignalProperties, SignalType, TVKnobSettings, TextureFormat, TextureHandle,
};

/// Luma/chroma separation for composite input.
struct Separator {
    shader: ShaderHandle,
    svideo: TextureHandle,
}

/// Turns a generated signal back into RGB the way a TV would.
pub struct SignalDecoder {
    properties: SignalProperties,
    knobs: TVKnobSettings,
    separator: Option<Separator>,
    yiq_shader: ShaderHandle,
    rgb_shader: ShaderHandle,
    yiq: TextureHandle,
    rgb: TextureHandle,
}

impl SignalDecoder {
    pub fn new(device: &mut dyn GraphicsDevice, properties: &SignalProperties) -> Result<Self, DeviceError> {
        let (width, height) = (properties.scanline_width, properties.scanline_count);

        let separator = match properties.signal_type {
            SignalType::Composite => Some(Separator {
                shader: device.create_shader(ShaderId::CompositeToSVideo)?,
                svideo: device.create_render_target(width, height, TextureFormat::Rgba32Float)?,
            }),
            SignalType::SVideo | SignalType::Rgb => None,
        };

        let yiq_shader = device.create_shader(ShaderId::SVideoToYiq)?;
        let rgb_shader = device.create_shader(ShaderId::YiqToRgb)?;
        let yiq = device.create_render_target(width, height, TextureFormat::Rgba32Float)?;
        let rgb = device.create_render_target(width, height, TextureFormat::Rgba8Unorm)?;

        log::debug!("decoder: {:?} {width}x{height}", properties.signal_type);
        Ok(Self {
            properties: *properties,
            knobs: TVKnobSettings::default(),
            separator,
            yiq_shader,
            rgb_shader,
            yiq,
            rgb,
        })
    }

    pub fn set_knob_settings(&mut self, knobs: &TVKnobSettings) {
        self.knobs = knobs.clamped();
    }

    pub fn knob_settings(&self) -> &TVKnobSettings {
        &self.knobs
    }

    pub fn signal_properties(&self) -> &SignalProperties {
        &self.properties
    }

    /// Decoded RGB, `scanline_width` x `scanline_count`.
    pub fn rgb_output(&self) -> TextureHandle {
        self.rgb
    }

    /// Decode `signal` into [`rgb_output`](Self::rgb_output) and return the
    /// levels of the decoded image: normalized and no longer doubled.
    pub fn decode(
        &mut self,
        device: &mut dyn GraphicsDevice,
        signal: TextureHandle,
        phases: &SignalPhases,
        levels: SignalLevels,
    ) -> SignalLevels {
        let (width, height) = (self.properties.scanline_width, self.properties.scanline_count);

        let svideo = match &self.separator {
            Some(separator) => {
                let constants = PassConstants::CompositeToSVideo(CompositeToSVideoConstants {
                    signal_width: width,
                    doubled: levels.is_doubled,
                });
                device.render_quad(
                    &separator.shader,
                    separator.svideo,
                    &[ShaderInput::new(signal, SamplerType::NearestClamp)],
                    &constants,
                );
                separator.svideo
            }
            None => signal,
        };

        let constants = PassConstants::SVideoToYiq(SVideoToYiqConstants {
            signal_width: width,
            scanline_count: height,
            frame_phase: phases.frame_phase,
            prev_frame_phase: phases.prev_frame_phase,
            phase_increment_per_line: phases.phase_increment_per_line,
            tint: self.knobs.tint,
            saturation: self.knobs.saturation,
            brightness: self.knobs.brightness,
            gamma: self.knobs.gamma,
            sharpness: self.knobs.sharpness,
            black_level: levels.black_level,
            white_level: levels.white_level,
            saturation_scale: levels.saturation_scale,
            temporal_blend: levels.temporal_blend(),
        });
        device.render_quad(
            &self.yiq_shader,
            self.yiq,
            &[ShaderInput::new(svideo, SamplerType::NearestClamp)],
            &constants,
        );

        let constants = PassConstants::YiqToRgb(YiqToRgbConstants { signal_width: width, scanline_count: height });
        device.render_quad(
            &self.rgb_shader,
            self.rgb,
            &[ShaderInput::new(self.yiq, SamplerType::LinearClamp)],
            &constants,
        );

        SignalLevels {
            temporal_artifact_reduction: levels.temporal_artifact_reduction,
            ..SignalLevels::default()
        }
    }

    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        if let Some(separator) = self.separator {
            device.release_shader(separator.shader);
            device.release_texture(separator.svideo);
        }
        device.release_shader(self.yiq_shader);
        device.release_shader(self.rgb_shader);
        device.release_texture(self.yiq);
        device.release_texture(self.rgb);
    }
}

use cathode_core::passes::{ApplyArtifactsConstants, GenerateSignalConstants};
use cathode_core::{
    ArtifactSettings, DeviceError, GraphicsDevice, PassConstants, SamplerType, ScanlineType, ShaderHandle, ShaderId,
    ShaderInput, SignalLevels, SignalPhases, SignalProperties, SignalType, SourceSettings, TextureFormat,
    TextureHandle,
};

/// Chroma is generated at half amplitude so saturated colors stay in range.
pub const CHROMA_SCALE: f32 = 0.5;
const NOISE_SEED_MASK: u32 = 0x000F_FFFF;

/// Turns RGB frames into a simulated composite or S-Video signal.
///
/// The signal texture is RGBA32F, `scanline_width` x `scanline_count`:
/// composite keeps the frame in `.r` and the doubled variant in `.g`;
/// S-Video keeps `(Y, C)` in `.rg` and the doubled `(Y, C)` in `.ba`.
pub struct SignalGenerator {
    properties: SignalProperties,
    input_width: u32,
    source: SourceSettings,
    artifacts: ArtifactSettings,

    generate_shader: ShaderHandle,
    artifacts_shader: ShaderHandle,
    signal: TextureHandle,
    scratch: TextureHandle,

    frame_phase: u32,
    prev_frame_phase: u32,
    is_even_frame: bool,
    noise_seed: u32,

    phases: SignalPhases,
    levels: SignalLevels,
}

impl SignalGenerator {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        signal_type: SignalType,
        input_width: u32,
        input_height: u32,
        source: &SourceSettings,
    ) -> Result<Self, DeviceError> {
        let source = source.clamped();
        let properties = SignalProperties::new(signal_type, input_width, input_height, &source);
        let (width, height) = (properties.scanline_width, properties.scanline_count);

        let generate_shader = device.create_shader(ShaderId::GenerateSignal)?;
        let artifacts_shader = device.create_shader(ShaderId::ApplyArtifacts)?;
        let signal = device.create_render_target(width, height, TextureFormat::Rgba32Float)?;
        let scratch = device.create_render_target(width, height, TextureFormat::Rgba32Float)?;

        let initial_phase = source.initial_frame_phase;
        log::debug!(
            "encoder: {signal_type:?} {input_width}x{input_height} -> {width}x{height} signal, {} cycles/pixel",
            properties.color_cycles_per_input_pixel
        );

        Ok(Self {
            properties,
            input_width: input_width.max(1),
            source,
            artifacts: ArtifactSettings::default(),
            generate_shader,
            artifacts_shader,
            signal,
            scratch,
            frame_phase: initial_phase,
            prev_frame_phase: initial_phase,
            is_even_frame: false,
            noise_seed: 0,
            phases: SignalPhases::default(),
            levels: SignalLevels::default(),
        })
    }

    pub fn set_artifact_settings(&mut self, artifacts: &ArtifactSettings) {
        self.artifacts = artifacts.clamped();
    }

    pub fn artifact_settings(&self) -> &ArtifactSettings {
        &self.artifacts
    }

    pub fn signal_properties(&self) -> &SignalProperties {
        &self.properties
    }

    pub fn source_settings(&self) -> &SourceSettings {
        &self.source
    }

    /// The most recently generated signal.
    pub fn signal_texture(&self) -> TextureHandle {
        self.signal
    }

    /// Levels of the most recently generated signal.
    pub fn signal_levels(&self) -> SignalLevels {
        self.levels
    }

    /// Carrier phases of the most recently generated signal.
    pub fn phases(&self) -> SignalPhases {
        self.phases
    }

    /// Generate one frame of signal from `input`.
    ///
    /// `frame_start_phase` overrides the phase numerator the frame starts at,
    /// for hosts that track the real machine's phase themselves.
    pub fn generate(
        &mut self,
        device: &mut dyn GraphicsDevice,
        input: TextureHandle,
        scanline_type: ScanlineType,
        frame_start_phase: Option<u32>,
    ) -> SignalLevels {
        if let Some(numerator) = frame_start_phase {
            self.frame_phase = numerator % self.source.denominator;
        }

        let reduction = self.artifacts.temporal_artifact_reduction;
        let is_doubled = reduction > 0.0 && self.prev_frame_phase != self.frame_phase;

        // The even field sits half a line lower, so its carrier is half a line increment on.
        let field_offset = match scanline_type {
            ScanlineType::Odd => 0.0,
            ScanlineType::Even => 0.5 * self.source.phase(self.source.phase_increment_per_line),
        };
        self.phases = SignalPhases {
            frame_phase: self.source.phase(self.frame_phase) + field_offset,
            prev_frame_phase: self.source.phase(self.prev_frame_phase) + field_offset,
            phase_increment_per_line: self.source.phase(self.source.phase_increment_per_line),
        };

        self.generate_clean_signal(device, input, is_doubled);

        let ghost_gain = 1.0 + self.artifacts.ghost_visibility;
        if self.artifacts.has_signal_artifacts() {
            self.apply_artifacts(device);
        }

        self.levels = SignalLevels {
            temporal_artifact_reduction: reduction,
            is_doubled,
            white_level: ghost_gain,
            black_level: 0.0,
            saturation_scale: CHROMA_SCALE,
        };

        self.is_even_frame = !self.is_even_frame;
        self.prev_frame_phase = self.frame_phase;
        let increment = if self.is_even_frame {
            self.source.phase_increment_per_even_frame
        } else {
            self.source.phase_increment_per_odd_frame
        };
        let next = u64::from(self.frame_phase) + u64::from(increment);
        self.frame_phase = (next % u64::from(self.source.denominator)) as u32;
        self.noise_seed = (self.noise_seed + 1) & NOISE_SEED_MASK;

        self.levels
    }

    fn generate_clean_signal(&mut self, device: &mut dyn GraphicsDevice, input: TextureHandle, is_doubled: bool) {
        let constants = PassConstants::GenerateSignal(GenerateSignalConstants {
            signal_width: self.properties.scanline_width,
            scanline_count: self.properties.scanline_count,
            input_width: self.input_width,
            frame_phase: self.phases.frame_phase,
            prev_frame_phase: self.phases.prev_frame_phase,
            phase_increment_per_line: self.phases.phase_increment_per_line,
            composite: self.properties.signal_type == SignalType::Composite,
            doubled: is_doubled,
            chroma_scale: CHROMA_SCALE,
            instability_scale: self.artifacts.instability_scale,
            noise_seed: self.noise_seed,
        });
        device.render_quad(
            &self.generate_shader,
            self.signal,
            &[ShaderInput::new(input, SamplerType::LinearClamp)],
            &constants,
        );
    }

    fn apply_artifacts(&mut self, device: &mut dyn GraphicsDevice) {
        let constants = PassConstants::ApplyArtifacts(ApplyArtifactsConstants {
            signal_width: self.properties.scanline_width,
            scanline_count: self.properties.scanline_count,
            ghost_visibility: self.artifacts.ghost_visibility,
            ghost_spread_scale: self.artifacts.ghost_spread_scale,
            ghost_distance: self.artifacts.ghost_distance,
            noise_strength: self.artifacts.noise_strength,
            noise_seed: self.noise_seed,
            svideo: self.properties.signal_type == SignalType::SVideo,
        });
        device.render_quad(
            &self.artifacts_shader,
            self.scratch,
            &[ShaderInput::new(self.signal, SamplerType::NearestClamp)],
            &constants,
        );
        std::mem::swap(&mut self.signal, &mut self.scratch);
    }

    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        device.release_shader(self.generate_shader);
        device.release_shader(self.artifacts_shader);
        device.release_texture(self.signal);
        device.release_texture(self.scratch);
    }
}

use cathode_core::{
    ArtifactSettings, DeviceError, GraphicsDevice, ScanlineType, ScreenSettings, SignalLevels, SignalProperties,
    SignalType, SourceSettings, TVKnobSettings, TextureHandle,
};
use serde::{Deserialize, Serialize};

use crate::crt::CrtRenderer;
use crate::decoder::SignalDecoder;
use crate::encoder::SignalGenerator;

/// Everything needed to build a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub signal_type: SignalType,
    pub input_width: u32,
    pub input_height: u32,
    pub output_width: u32,
    pub output_height: u32,
    pub source: SourceSettings,
    pub artifacts: ArtifactSettings,
    pub knobs: TVKnobSettings,
    pub screen: ScreenSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            signal_type: SignalType::Composite,
            input_width: 320,
            input_height: 240,
            output_width: 1280,
            output_height: 960,
            source: SourceSettings::default(),
            artifacts: ArtifactSettings::default(),
            knobs: TVKnobSettings::default(),
            screen: ScreenSettings::default(),
        }
    }
}

impl PipelineConfig {
    pub fn signal_properties(&self) -> SignalProperties {
        SignalProperties::new(self.signal_type, self.input_width, self.input_height, &self.source)
    }
}

/// Encoder and decoder, present unless the signal type is [`SignalType::Rgb`].
struct SignalPath {
    encoder: SignalGenerator,
    decoder: SignalDecoder,
}

impl SignalPath {
    fn new(device: &mut dyn GraphicsDevice, config: &PipelineConfig) -> Result<Option<Self>, DeviceError> {
        if config.signal_type == SignalType::Rgb {
            return Ok(None);
        }
        let mut encoder = SignalGenerator::new(
            device,
            config.signal_type,
            config.input_width,
            config.input_height,
            &config.source,
        )?;
        encoder.set_artifact_settings(&config.artifacts);
        let mut decoder = SignalDecoder::new(device, encoder.signal_properties())?;
        decoder.set_knob_settings(&config.knobs);
        Ok(Some(Self { encoder, decoder }))
    }

    fn destroy(self, device: &mut dyn GraphicsDevice) {
        self.encoder.destroy(device);
        self.decoder.destroy(device);
    }
}

/// The whole chain: encoder, decoder and CRT renderer over one device.
pub struct Pipeline {
    config: PipelineConfig,
    signal: Option<SignalPath>,
    crt: CrtRenderer,
    last_levels: SignalLevels,
}

impl Pipeline {
    pub fn new(device: &mut dyn GraphicsDevice, config: &PipelineConfig) -> Result<Self, DeviceError> {
        let signal = SignalPath::new(device, config)?;
        let crt = CrtRenderer::new(
            device,
            config.input_width,
            config.input_height,
            &config.screen,
            config.output_width,
            config.output_height,
        )?;
        log::debug!(
            "pipeline: {:?} {}x{} -> {}x{}",
            config.signal_type,
            config.input_width,
            config.input_height,
            config.output_width,
            config.output_height
        );

        Ok(Self {
            config: *config,
            signal,
            crt,
            last_levels: SignalLevels::default(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Levels the renderer used for the last frame.
    pub fn last_levels(&self) -> SignalLevels {
        self.last_levels
    }

    /// Apply a new configuration, rebuilding only the stages it invalidates.
    pub fn update_settings(&mut self, device: &mut dyn GraphicsDevice, config: &PipelineConfig) -> Result<(), DeviceError> {
        let old = self.config;
        let input_changed = (old.input_width, old.input_height) != (config.input_width, config.input_height);
        // Signal properties derive from exactly these, so the decoder is
        // stale whenever the encoder is.
        let signal_stale = input_changed || old.signal_type != config.signal_type || old.source != config.source;

        // Replacements are built before anything is released, so a failed
        // rebuild leaves the pipeline rendering with its previous config.
        let signal = if signal_stale {
            log::debug!("pipeline: rebuilding encoder and decoder");
            Some(SignalPath::new(device, config)?)
        } else {
            None
        };

        let crt = if input_changed {
            log::debug!("pipeline: rebuilding crt renderer");
            CrtRenderer::new(
                device,
                config.input_width,
                config.input_height,
                &config.screen,
                config.output_width,
                config.output_height,
            )
            .map(Some)
        } else {
            self.crt
                .set_settings(device, &config.screen)
                .and_then(|()| self.crt.set_output_size(device, config.output_width, config.output_height))
                .map(|()| None)
        };
        let crt = match crt {
            Ok(crt) => crt,
            Err(err) => {
                if let Some(Some(path)) = signal {
                    path.destroy(device);
                }
                return Err(err);
            }
        };

        match signal {
            Some(signal) => {
                if let Some(old) = std::mem::replace(&mut self.signal, signal) {
                    old.destroy(device);
                }
            }
            None => {
                if let Some(path) = &mut self.signal {
                    path.encoder.set_artifact_settings(&config.artifacts);
                    path.decoder.set_knob_settings(&config.knobs);
                }
            }
        }
        if let Some(crt) = crt {
            std::mem::replace(&mut self.crt, crt).destroy(device);
        }

        self.config = *config;
        Ok(())
    }

    pub fn set_output_size(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<(), DeviceError> {
        self.crt.set_output_size(device, width, height)?;
        self.config.output_width = width;
        self.config.output_height = height;
        Ok(())
    }

    /// Run one frame from `input` to `output`.
    pub fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        input: TextureHandle,
        scanline_type: ScanlineType,
        output: TextureHandle,
    ) {
        device.begin_rendering();

        let (rgb, levels) = match &mut self.signal {
            Some(path) => {
                let levels = path.encoder.generate(device, input, scanline_type, None);
                let phases = path.encoder.phases();
                let levels = path.decoder.decode(device, path.encoder.signal_texture(), &phases, levels);
                (path.decoder.rgb_output(), levels)
            }
            None => (input, SignalLevels::default()),
        };
        self.crt.render(device, rgb, levels, scanline_type, output);
        self.last_levels = levels;

        device.end_rendering();
    }

    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        if let Some(path) = self.signal {
            path.destroy(device);
        }
        self.crt.destroy(device);
    }
}

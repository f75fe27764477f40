pub mod device;
pub mod error;
pub mod passes;
pub mod presets;
pub mod settings;
pub mod signal;

pub use device::{GraphicsDevice, SamplerType, ShaderHandle, ShaderId, ShaderInput, TextureFormat, TextureHandle};
pub use error::DeviceError;
pub use passes::PassConstants;
pub use settings::{ArtifactSettings, MaskType, ScreenSettings, SourceSettings, TVKnobSettings};
pub use signal::{
    ScanlineType, SignalLevels, SignalPhases, SignalProperties, SignalType, SIGNAL_SAMPLES_PER_COLOR_CYCLE,
};

//! Composite video and CRT emulation over any [`GraphicsDevice`](cathode_core::GraphicsDevice).
//!
//! A frame flows encoder -> decoder -> CRT renderer. Each stage owns its
//! device resources and gives them back through `destroy`.

pub mod crt;
pub mod decoder;
pub mod encoder;
pub mod pipeline;

pub use crt::CrtRenderer;
pub use decoder::SignalDecoder;
pub use encoder::SignalGenerator;
pub use pipeline::{Pipeline, PipelineConfig};

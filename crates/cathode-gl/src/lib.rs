pub mod device;
pub mod fbo;
pub mod program;
pub mod quad;
pub mod shaders;
mod state;

pub use device::GlDevice;

pub mod device;
pub mod hash;
pub mod kernels;
pub mod texture;

pub use device::{CpuDevice, DeviceStats};
pub use texture::CpuTexture;

use cathode_core::{
    DeviceError, GraphicsDevice, PassConstants, ShaderHandle, ShaderId, ShaderInput, TextureFormat,
    TextureHandle,
};
use image::RgbaImage;

use crate::kernels::{self, Bound, Texel};
use crate::texture::CpuTexture;

/// Resource counters, mostly useful to tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub shaders_created: u64,
    pub targets_created: u64,
    pub passes_rendered: u64,
    pub passes_skipped: u64,
}

/// Reference [`GraphicsDevice`] that runs every pass on the CPU.
///
/// Slow but exact and deterministic, so it is what the pipeline tests run on.
#[derive(Default)]
pub struct CpuDevice {
    textures: Vec<Option<CpuTexture>>,
    shaders: Vec<Option<ShaderId>>,
    stats: DeviceStats,
}

impl CpuDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> DeviceStats {
        self.stats
    }

    pub fn live_textures(&self) -> usize {
        self.textures.iter().filter(|t| t.is_some()).count()
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.iter().filter(|s| s.is_some()).count()
    }

    /// Adopt an existing texture, e.g. a frame produced by an emulator.
    pub fn insert_texture(&mut self, texture: CpuTexture) -> TextureHandle {
        let index = match self.textures.iter().position(Option::is_none) {
            Some(free) => {
                self.textures[free] = Some(texture);
                free
            }
            None => {
                self.textures.push(Some(texture));
                self.textures.len() - 1
            }
        };
        TextureHandle::from_raw(index as u32)
    }

    pub fn upload_image(&mut self, image: &RgbaImage) -> TextureHandle {
        self.insert_texture(CpuTexture::from_image(image))
    }

    /// Replace the contents of an existing texture with an image of the same size.
    pub fn write_image(&mut self, handle: TextureHandle, image: &RgbaImage) -> Result<(), DeviceError> {
        let slot = self
            .textures
            .get_mut(handle.raw() as usize)
            .and_then(Option::as_mut)
            .ok_or(DeviceError::UnknownTexture(handle.raw()))?;
        if slot.size() != image.dimensions() {
            return Err(DeviceError::TextureCreation {
                width: image.width(),
                height: image.height(),
                message: format!("texture {} is {:?}", handle.raw(), slot.size()),
            });
        }
        *slot = CpuTexture::from_image(image);
        Ok(())
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&CpuTexture> {
        self.textures.get(handle.raw() as usize).and_then(Option::as_ref)
    }

    pub fn read_image(&self, handle: TextureHandle) -> Option<RgbaImage> {
        self.texture(handle).map(CpuTexture::to_image)
    }

    fn skip(&mut self, reason: std::fmt::Arguments) {
        log::error!("skipping pass: {reason}");
        self.stats.passes_skipped += 1;
    }
}

impl GraphicsDevice for CpuDevice {
    fn create_shader(&mut self, id: ShaderId) -> Result<ShaderHandle, DeviceError> {
        let index = match self.shaders.iter().position(Option::is_none) {
            Some(free) => {
                self.shaders[free] = Some(id);
                free
            }
            None => {
                self.shaders.push(Some(id));
                self.shaders.len() - 1
            }
        };
        self.stats.shaders_created += 1;
        log::debug!("cpu: created shader {id:?} as {index}");
        Ok(ShaderHandle::new(id, index as u32))
    }

    fn create_render_target(
        &mut self,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Result<TextureHandle, DeviceError> {
        if width == 0 || height == 0 {
            return Err(DeviceError::TextureCreation {
                width,
                height,
                message: "render targets need a non-zero size".into(),
            });
        }
        self.stats.targets_created += 1;
        let handle = self.insert_texture(CpuTexture::new(width, height, format));
        log::debug!("cpu: created {width}x{height} {format:?} target {}", handle.raw());
        Ok(handle)
    }

    fn texture_size(&self, texture: TextureHandle) -> (u32, u32) {
        self.texture(texture).map_or((0, 0), CpuTexture::size)
    }

    fn render_quad(
        &mut self,
        shader: &ShaderHandle,
        output: TextureHandle,
        inputs: &[ShaderInput],
        constants: &PassConstants,
    ) {
        let id = shader.id();
        if self.shaders.get(shader.raw() as usize).copied().flatten() != Some(id) {
            return self.skip(format_args!("unknown shader {id:?}/{}", shader.raw()));
        }
        if constants.shader_id() != id {
            return self.skip(format_args!("{:?} constants given to {id:?}", constants.shader_id()));
        }
        if inputs.len() != id.input_count() {
            return self.skip(format_args!("{id:?} takes {} inputs, got {}", id.input_count(), inputs.len()));
        }
        if inputs.iter().any(|input| input.texture == output) {
            return self.skip(format_args!("{id:?} reads its own output {}", output.raw()));
        }
        if let Some(missing) = inputs.iter().find(|input| self.texture(input.texture).is_none()) {
            return self.skip(format_args!("{id:?} input {} does not exist", missing.texture.raw()));
        }

        let Some(mut target) = self.textures.get_mut(output.raw() as usize).and_then(Option::take) else {
            return self.skip(format_args!("{id:?} output {} does not exist", output.raw()));
        };

        let bound: Vec<Bound> = inputs
            .iter()
            .filter_map(|input| {
                self.texture(input.texture).map(|texture| Bound { texture, sampler: input.sampler })
            })
            .collect();

        let (width, height) = target.size();
        for y in 0..height {
            for x in 0..width {
                let value = kernels::shade(constants, &bound, Texel { x, y, width, height });
                target.store(x, y, value);
            }
        }

        self.textures[output.raw() as usize] = Some(target);
        self.stats.passes_rendered += 1;
        log::trace!("cpu: {id:?} -> {} ({width}x{height})", output.raw());
    }

    fn release_shader(&mut self, shader: ShaderHandle) {
        if let Some(slot) = self.shaders.get_mut(shader.raw() as usize) {
            *slot = None;
        }
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if let Some(slot) = self.textures.get_mut(texture.raw() as usize) {
            *slot = None;
        }
    }
}

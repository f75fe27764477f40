use std::sync::Arc;

use cathode_core::{
    DeviceError, GraphicsDevice, PassConstants, SamplerType, ShaderHandle, ShaderId, ShaderInput, TextureFormat,
    TextureHandle,
};
use glow::HasContext;
use image::RgbaImage;

use crate::fbo::RenderTarget;
use crate::program::Program;
use crate::quad::FullscreenQuad;
use crate::state::{reset_for_passes, HostStateGuard, SavedGlState, TEXTURE_UNITS};

/// A texture the device knows about: either a render target it owns, or a
/// texture the host lent it as an input.
enum Slot {
    Target(RenderTarget),
    Borrowed { texture: glow::Texture, width: u32, height: u32 },
}

impl Slot {
    fn texture(&self) -> glow::Texture {
        match self {
            Slot::Target(target) => target.texture,
            Slot::Borrowed { texture, .. } => *texture,
        }
    }

    fn size(&self) -> (u32, u32) {
        match self {
            Slot::Target(target) => (target.width, target.height),
            Slot::Borrowed { width, height, .. } => (*width, *height),
        }
    }
}

/// OpenGL 3.3 implementation of [`GraphicsDevice`].
pub struct GlDevice {
    gl: Arc<glow::Context>,
    quad: FullscreenQuad,
    /// Indexed by [`sampler_index`].
    samplers: [glow::Sampler; 4],
    programs: Vec<Option<Program>>,
    slots: Vec<Option<Slot>>,
    saved: Option<SavedGlState>,
}

fn sampler_index(sampler: SamplerType) -> usize {
    match sampler {
        SamplerType::NearestClamp => 0,
        SamplerType::NearestWrap => 1,
        SamplerType::LinearClamp => 2,
        SamplerType::LinearWrap => 3,
    }
}

fn insert<T>(list: &mut Vec<Option<T>>, value: T) -> u32 {
    match list.iter().position(Option::is_none) {
        Some(free) => {
            list[free] = Some(value);
            free as u32
        }
        None => {
            list.push(Some(value));
            (list.len() - 1) as u32
        }
    }
}

impl GlDevice {
    /// Must be called with a current GL 3.3 context.
    pub fn new(gl: Arc<glow::Context>) -> Result<Self, DeviceError> {
        let quad = FullscreenQuad::new(&gl)?;

        let mut samplers = Vec::with_capacity(4);
        for kind in [
            SamplerType::NearestClamp,
            SamplerType::NearestWrap,
            SamplerType::LinearClamp,
            SamplerType::LinearWrap,
        ] {
            let filter = if kind.is_linear() { glow::LINEAR } else { glow::NEAREST };
            let wrap = if kind.wraps() { glow::REPEAT } else { glow::CLAMP_TO_EDGE };
            unsafe {
                let sampler = gl.create_sampler().map_err(DeviceError::BufferCreation)?;
                gl.sampler_parameter_i32(sampler, glow::TEXTURE_MIN_FILTER, filter as i32);
                gl.sampler_parameter_i32(sampler, glow::TEXTURE_MAG_FILTER, filter as i32);
                gl.sampler_parameter_i32(sampler, glow::TEXTURE_WRAP_S, wrap as i32);
                gl.sampler_parameter_i32(sampler, glow::TEXTURE_WRAP_T, wrap as i32);
                samplers.push(sampler);
            }
        }
        let samplers: [glow::Sampler; 4] = samplers
            .try_into()
            .map_err(|_| DeviceError::BufferCreation("sampler setup".into()))?;

        log::debug!("gl: device ready");
        Ok(Self {
            gl,
            quad,
            samplers,
            programs: Vec::new(),
            slots: Vec::new(),
            saved: None,
        })
    }

    pub fn gl(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    /// Let the pipeline read a texture the host owns. The device never
    /// deletes it; releasing the handle only forgets it.
    pub fn import_texture(&mut self, texture: glow::Texture, width: u32, height: u32) -> TextureHandle {
        TextureHandle::from_raw(insert(&mut self.slots, Slot::Borrowed { texture, width, height }))
    }

    /// Upload an image into a new RGBA8 texture owned by the device.
    pub fn upload_image(&mut self, image: &RgbaImage) -> Result<TextureHandle, DeviceError> {
        let _guard = self.host_guard();
        let target = RenderTarget::new(&self.gl, image.width(), image.height(), TextureFormat::Rgba8Unorm)?;
        target.upload_rgba8(&self.gl, image.as_raw());
        Ok(TextureHandle::from_raw(insert(&mut self.slots, Slot::Target(target))))
    }

    /// Replace the contents of an RGBA8 target with an image of the same size.
    pub fn write_image(&mut self, handle: TextureHandle, image: &RgbaImage) -> Result<(), DeviceError> {
        let _guard = self.host_guard();
        match self.slots.get(handle.raw() as usize).and_then(Option::as_ref) {
            Some(Slot::Target(target))
                if target.format == TextureFormat::Rgba8Unorm && (target.width, target.height) == image.dimensions() =>
            {
                target.upload_rgba8(&self.gl, image.as_raw());
                Ok(())
            }
            Some(_) => Err(DeviceError::TextureCreation {
                width: image.width(),
                height: image.height(),
                message: format!("texture {} cannot take this image", handle.raw()),
            }),
            None => Err(DeviceError::UnknownTexture(handle.raw())),
        }
    }

    /// Read an owned target back as an image, row 0 first.
    pub fn read_image(&self, handle: TextureHandle) -> Option<RgbaImage> {
        let _guard = self.host_guard();
        match self.slots.get(handle.raw() as usize).and_then(Option::as_ref) {
            Some(Slot::Target(target)) => {
                RgbaImage::from_raw(target.width, target.height, target.read_rgba8(&self.gl))
            }
            _ => None,
        }
    }

    /// The GL texture behind a handle, e.g. to draw the final frame.
    pub fn gl_texture(&self, handle: TextureHandle) -> Option<glow::Texture> {
        self.slots.get(handle.raw() as usize).and_then(Option::as_ref).map(Slot::texture)
    }

    /// Free every GPU object the device still owns.
    pub fn destroy(mut self) {
        for program in self.programs.drain(..).flatten() {
            program.destroy(&self.gl);
        }
        for slot in self.slots.drain(..).flatten() {
            if let Slot::Target(target) = slot {
                target.destroy(&self.gl);
            }
        }
        unsafe {
            for sampler in self.samplers {
                self.gl.delete_sampler(sampler);
            }
        }
        self.quad.destroy(&self.gl);
    }

    /// Outside a frame every GL call is bracketed so the host's bindings survive.
    fn host_guard(&self) -> Option<HostStateGuard> {
        self.saved.is_none().then(|| HostStateGuard::enter(&self.gl))
    }

    fn slot(&self, handle: TextureHandle) -> Option<&Slot> {
        self.slots.get(handle.raw() as usize).and_then(Option::as_ref)
    }
}

impl GraphicsDevice for GlDevice {
    fn create_shader(&mut self, id: ShaderId) -> Result<ShaderHandle, DeviceError> {
        let _guard = self.host_guard();
        let program = Program::new(&self.gl, id)?;
        let raw = insert(&mut self.programs, program);
        log::debug!("gl: compiled {id:?} as {raw}");
        Ok(ShaderHandle::new(id, raw))
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
        let _guard = self.host_guard();
        let target = RenderTarget::new(&self.gl, width, height, format)?;
        let raw = insert(&mut self.slots, Slot::Target(target));
        log::debug!("gl: created {width}x{height} {format:?} target {raw}");
        Ok(TextureHandle::from_raw(raw))
    }

    fn texture_size(&self, texture: TextureHandle) -> (u32, u32) {
        self.slot(texture).map_or((0, 0), Slot::size)
    }

    fn begin_rendering(&mut self) {
        if self.saved.is_some() {
            log::warn!("gl: begin_rendering called twice");
            return;
        }
        unsafe {
            self.saved = Some(SavedGlState::save(&self.gl));
            reset_for_passes(&self.gl);
        }
    }

    fn render_quad(
        &mut self,
        shader: &ShaderHandle,
        output: TextureHandle,
        inputs: &[ShaderInput],
        constants: &PassConstants,
    ) {
        let id = shader.id();
        if constants.shader_id() != id || inputs.len() != id.input_count() || inputs.len() > TEXTURE_UNITS {
            log::error!("gl: skipping {id:?}: wrong constants or input count");
            return;
        }
        if inputs.iter().any(|input| input.texture == output) {
            log::error!("gl: skipping {id:?}: reads its own output {}", output.raw());
            return;
        }

        let mut textures = Vec::with_capacity(inputs.len());
        for input in inputs {
            match self.slot(input.texture) {
                Some(slot) => textures.push((slot.texture(), self.samplers[sampler_index(input.sampler)])),
                None => {
                    log::error!("gl: skipping {id:?}: unknown input {}", input.texture.raw());
                    return;
                }
            }
        }

        let _guard = self.host_guard();
        let gl = Arc::clone(&self.gl);
        let Some(Slot::Target(target)) = self.slots.get(output.raw() as usize).and_then(Option::as_ref) else {
            log::error!("gl: skipping {id:?}: output {} is not a render target", output.raw());
            return;
        };
        target.bind(&gl);

        let Some(program) = self.programs.get_mut(shader.raw() as usize).and_then(Option::as_mut) else {
            log::error!("gl: skipping {id:?}: unknown shader {}", shader.raw());
            return;
        };
        if program.id != id {
            log::error!("gl: skipping {id:?}: handle {} is {:?}", shader.raw(), program.id);
            return;
        }

        unsafe {
            gl.use_program(Some(program.program));
            for (unit, (texture, sampler)) in textures.iter().enumerate() {
                gl.active_texture(glow::TEXTURE0 + unit as u32);
                gl.bind_texture(glow::TEXTURE_2D, Some(*texture));
                gl.bind_sampler(unit as u32, Some(*sampler));
            }
        }
        for (name, value) in constants.uniforms() {
            program.set(&gl, name, value);
        }

        self.quad.draw(&gl);

        unsafe {
            for unit in 0..textures.len() {
                gl.active_texture(glow::TEXTURE0 + unit as u32);
                gl.bind_texture(glow::TEXTURE_2D, None);
                gl.bind_sampler(unit as u32, None);
            }
            gl.active_texture(glow::TEXTURE0);
            gl.use_program(None);
        }
        log::trace!("gl: {id:?} -> {}", output.raw());
    }

    fn end_rendering(&mut self) {
        match self.saved.take() {
            Some(saved) => unsafe { saved.restore(&self.gl) },
            None => log::warn!("gl: end_rendering without begin_rendering"),
        }
    }

    fn release_shader(&mut self, shader: ShaderHandle) {
        if let Some(program) = self.programs.get_mut(shader.raw() as usize).and_then(Option::take) {
            program.destroy(&self.gl);
        }
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if let Some(Slot::Target(target)) = self.slots.get_mut(texture.raw() as usize).and_then(Option::take) {
            target.destroy(&self.gl);
        }
    }
}

use std::num::NonZeroU32;
use std::sync::Arc;

use glow::HasContext;

/// Texture units the passes may touch.
pub const TEXTURE_UNITS: usize = 4;

fn object(id: i32) -> Option<NonZeroU32> {
    NonZeroU32::new(id as u32)
}

/// GL state the host had bound before a frame, restored afterwards so the
/// pipeline can run inside someone else's renderer.
pub struct SavedGlState {
    framebuffer: Option<glow::Framebuffer>,
    viewport: [i32; 4],
    blend_enabled: bool,
    scissor_enabled: bool,
    depth_test_enabled: bool,
    program: Option<glow::Program>,
    vao: Option<glow::VertexArray>,
    active_texture: i32,
    bound_textures: [Option<glow::Texture>; TEXTURE_UNITS],
}

impl SavedGlState {
    pub unsafe fn save(gl: &glow::Context) -> Self {
        let framebuffer = object(gl.get_parameter_i32(glow::FRAMEBUFFER_BINDING)).map(glow::NativeFramebuffer);

        let mut viewport = [0i32; 4];
        gl.get_parameter_i32_slice(glow::VIEWPORT, &mut viewport);

        let program = object(gl.get_parameter_i32(glow::CURRENT_PROGRAM)).map(glow::NativeProgram);
        let vao = object(gl.get_parameter_i32(glow::VERTEX_ARRAY_BINDING)).map(glow::NativeVertexArray);
        let active_texture = gl.get_parameter_i32(glow::ACTIVE_TEXTURE);

        let mut bound_textures = [None; TEXTURE_UNITS];
        for (unit, bound) in bound_textures.iter_mut().enumerate() {
            gl.active_texture(glow::TEXTURE0 + unit as u32);
            *bound = object(gl.get_parameter_i32(glow::TEXTURE_BINDING_2D)).map(glow::NativeTexture);
        }
        gl.active_texture(active_texture as u32);

        Self {
            framebuffer,
            viewport,
            blend_enabled: gl.is_enabled(glow::BLEND),
            scissor_enabled: gl.is_enabled(glow::SCISSOR_TEST),
            depth_test_enabled: gl.is_enabled(glow::DEPTH_TEST),
            program,
            vao,
            active_texture,
            bound_textures,
        }
    }

    pub unsafe fn restore(&self, gl: &glow::Context) {
        gl.bind_framebuffer(glow::FRAMEBUFFER, self.framebuffer);
        gl.viewport(self.viewport[0], self.viewport[1], self.viewport[2], self.viewport[3]);

        set_capability(gl, glow::BLEND, self.blend_enabled);
        set_capability(gl, glow::SCISSOR_TEST, self.scissor_enabled);
        set_capability(gl, glow::DEPTH_TEST, self.depth_test_enabled);

        gl.use_program(self.program);
        gl.bind_vertex_array(self.vao);

        for (unit, texture) in self.bound_textures.iter().enumerate() {
            gl.active_texture(glow::TEXTURE0 + unit as u32);
            gl.bind_texture(glow::TEXTURE_2D, *texture);
            gl.bind_sampler(unit as u32, None);
        }
        gl.active_texture(self.active_texture as u32);
    }
}

/// Turn off the fixed-function state that would change what a pass writes.
pub unsafe fn reset_for_passes(gl: &glow::Context) {
    gl.disable(glow::BLEND);
    gl.disable(glow::SCISSOR_TEST);
    gl.disable(glow::DEPTH_TEST);
}

/// Saves host state on creation and restores it on drop. Used for device
/// calls made outside a `begin_rendering`/`end_rendering` bracket.
pub struct HostStateGuard {
    gl: Arc<glow::Context>,
    saved: SavedGlState,
}

impl HostStateGuard {
    pub fn enter(gl: &Arc<glow::Context>) -> Self {
        unsafe {
            let saved = SavedGlState::save(gl);
            reset_for_passes(gl);
            Self { gl: Arc::clone(gl), saved }
        }
    }
}

impl Drop for HostStateGuard {
    fn drop(&mut self) {
        unsafe { self.saved.restore(&self.gl) }
    }
}

unsafe fn set_capability(gl: &glow::Context, capability: u32, enabled: bool) {
    if enabled {
        gl.enable(capability);
    } else {
        gl.disable(capability);
    }
}

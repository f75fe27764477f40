use std::collections::HashMap;

use cathode_core::passes::Uniform;
use cathode_core::{DeviceError, ShaderId};
use glow::HasContext;

use crate::shaders;

/// A linked fullscreen program plus its uniform locations, looked up on first use.
pub struct Program {
    pub id: ShaderId,
    pub program: glow::Program,
    locations: HashMap<&'static str, Option<glow::UniformLocation>>,
}

impl Program {
    pub fn new(gl: &glow::Context, id: ShaderId) -> Result<Self, DeviceError> {
        let program = compile_fullscreen_program(gl, id, &shaders::fragment_source(id))?;

        // Input samplers sit on consecutive texture units.
        unsafe {
            gl.use_program(Some(program));
            for unit in 0..id.input_count() {
                let name = format!("u_input{unit}");
                if let Some(location) = gl.get_uniform_location(program, &name) {
                    gl.uniform_1_i32(Some(&location), unit as i32);
                }
            }
            gl.use_program(None);
        }

        Ok(Self { id, program, locations: HashMap::new() })
    }

    /// Set a uniform by name. Names the compiler optimized away are ignored.
    pub fn set(&mut self, gl: &glow::Context, name: &'static str, value: Uniform) {
        let program = self.program;
        let location = self
            .locations
            .entry(name)
            .or_insert_with(|| unsafe { gl.get_uniform_location(program, name) });
        let Some(location) = location.as_ref() else {
            return;
        };

        unsafe {
            match value {
                Uniform::Float(v) => gl.uniform_1_f32(Some(location), v),
                Uniform::Int(v) => gl.uniform_1_i32(Some(location), v),
                Uniform::UInt(v) => gl.uniform_1_u32(Some(location), v),
                Uniform::Vec2(v) => gl.uniform_2_f32(Some(location), v.x, v.y),
            }
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) }
    }
}

fn compile_stage(gl: &glow::Context, id: ShaderId, kind: u32, source: &str) -> Result<glow::Shader, DeviceError> {
    unsafe {
        let shader = gl
            .create_shader(kind)
            .map_err(|message| DeviceError::ShaderCreation { id, message })?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let message = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            log::error!("{id:?} shader failed:\n{message}");
            return Err(DeviceError::ShaderCreation { id, message });
        }
        Ok(shader)
    }
}

/// Compile `frag_src` against the shared fullscreen vertex shader and link.
pub fn compile_fullscreen_program(
    gl: &glow::Context,
    id: ShaderId,
    frag_src: &str,
) -> Result<glow::Program, DeviceError> {
    let vert = compile_stage(gl, id, glow::VERTEX_SHADER, shaders::FULLSCREEN_VERTEX)?;
    let frag = match compile_stage(gl, id, glow::FRAGMENT_SHADER, frag_src) {
        Ok(frag) => frag,
        Err(err) => {
            unsafe { gl.delete_shader(vert) };
            return Err(err);
        }
    };

    unsafe {
        let cleanup = || {
            gl.delete_shader(vert);
            gl.delete_shader(frag);
        };

        let program = match gl.create_program() {
            Ok(program) => program,
            Err(message) => {
                cleanup();
                return Err(DeviceError::ProgramLink { id, message });
            }
        };

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        let linked = gl.get_program_link_status(program);
        cleanup();

        if !linked {
            let message = gl.get_program_info_log(program);
            gl.delete_program(program);
            log::error!("{id:?} program linking failed:\n{message}");
            return Err(DeviceError::ProgramLink { id, message });
        }
        Ok(program)
    }
}

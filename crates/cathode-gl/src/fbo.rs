use cathode_core::{DeviceError, TextureFormat};
use glow::HasContext;

/// `(internal format, pixel format, pixel type)` for a texture format.
pub fn gl_format(format: TextureFormat) -> (u32, u32, u32) {
    match format {
        TextureFormat::Rgba8Unorm => (glow::RGBA8, glow::RGBA, glow::UNSIGNED_BYTE),
        TextureFormat::R32Float => (glow::R32F, glow::RED, glow::FLOAT),
        TextureFormat::Rg32Float => (glow::RG32F, glow::RG, glow::FLOAT),
        TextureFormat::Rgba32Float => (glow::RGBA32F, glow::RGBA, glow::FLOAT),
    }
}

/// A framebuffer object with a single color texture attachment.
pub struct RenderTarget {
    pub fbo: glow::Framebuffer,
    pub texture: glow::Texture,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

impl RenderTarget {
    /// Create a render target cleared to transparent black.
    pub fn new(gl: &glow::Context, width: u32, height: u32, format: TextureFormat) -> Result<Self, DeviceError> {
        let failed = |message: String| DeviceError::TextureCreation { width, height, message };
        let (internal, pixel_format, pixel_type) = gl_format(format);

        unsafe {
            let texture = gl.create_texture().map_err(failed)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal as i32,
                width as i32,
                height as i32,
                0,
                pixel_format,
                pixel_type,
                glow::PixelUnpackData::Slice(None),
            );
            // Filtering and addressing come from sampler objects at draw time.
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);

            let fbo = match gl.create_framebuffer() {
                Ok(fbo) => fbo,
                Err(message) => {
                    gl.delete_texture(texture);
                    return Err(failed(message));
                }
            };
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(texture),
                0,
            );

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            if status != glow::FRAMEBUFFER_COMPLETE {
                log::error!("Framebuffer incomplete: 0x{:X}", status);
                gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                gl.delete_framebuffer(fbo);
                gl.delete_texture(texture);
                return Err(failed(format!("framebuffer incomplete: 0x{status:X}")));
            }

            gl.viewport(0, 0, width as i32, height as i32);
            gl.clear_color(0.0, 0.0, 0.0, 0.0);
            gl.clear(glow::COLOR_BUFFER_BIT);

            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self { fbo, texture, width, height, format })
        }
    }

    /// Bind this render target and set its viewport.
    pub fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
            gl.viewport(0, 0, self.width as i32, self.height as i32);
        }
    }

    /// Overwrite the whole texture with tightly packed RGBA8 rows.
    pub fn upload_rgba8(&self, gl: &glow::Context, pixels: &[u8]) {
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                0,
                0,
                self.width as i32,
                self.height as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels)),
            );
            gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    /// Read back the color attachment as RGBA8, row 0 first.
    pub fn read_rgba8(&self, gl: &glow::Context) -> Vec<u8> {
        let mut pixels = vec![0u8; (self.width * self.height * 4) as usize];
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
            gl.pixel_store_i32(glow::PACK_ALIGNMENT, 1);
            gl.read_pixels(
                0,
                0,
                self.width as i32,
                self.height as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(Some(&mut pixels)),
            );
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
        pixels
    }

    /// Destroy GPU resources.
    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_framebuffer(self.fbo);
            gl.delete_texture(self.texture);
        }
    }
}

use cathode_core::{SamplerType, TextureFormat};
use glam::{Vec2, Vec4};
use image::{Rgba, RgbaImage};

/// A render target held in host memory.
///
/// Texels are always stored as `Vec4`; the format only decides how writes
/// are quantized and which channels survive, matching what a GPU would keep.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuTexture {
    width: u32,
    height: u32,
    format: TextureFormat,
    texels: Vec<Vec4>,
}

impl CpuTexture {
    /// Zero-filled, like a freshly cleared render target.
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            format,
            texels: vec![Vec4::ZERO; (width * height) as usize],
        }
    }

    pub fn from_image(image: &RgbaImage) -> Self {
        let mut texture = Self::new(image.width(), image.height(), TextureFormat::Rgba8Unorm);
        for (x, y, pixel) in image.enumerate_pixels() {
            let [r, g, b, a] = pixel.0;
            let texel = Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0;
            texture.store(x, y, texel);
        }
        texture
    }

    /// Quantize to 8 bits per channel, clamping out-of-range values.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let texel = self.texel(x, y).clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
            Rgba([
                texel.x.round() as u8,
                texel.y.round() as u8,
                texel.z.round() as u8,
                texel.w.round() as u8,
            ])
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn texels(&self) -> &[Vec4] {
        &self.texels
    }

    pub fn texel(&self, x: u32, y: u32) -> Vec4 {
        self.texels[(y * self.width + x) as usize]
    }

    pub fn store(&mut self, x: u32, y: u32, value: Vec4) {
        let index = (y * self.width + x) as usize;
        self.texels[index] = quantize(self.format, value);
    }

    pub fn clear(&mut self) {
        self.texels.fill(Vec4::ZERO);
    }

    /// Texel fetch with the sampler's addressing mode applied to integer coordinates.
    pub fn fetch(&self, x: i32, y: i32, sampler: SamplerType) -> Vec4 {
        let x = address(x, self.width, sampler.wraps());
        let y = address(y, self.height, sampler.wraps());
        self.texel(x, y)
    }

    /// Filtered lookup at normalized coordinates, following GL rules: texel
    /// centers sit at `(i + 0.5) / size`, linear filtering blends the four
    /// nearest centers.
    pub fn sample(&self, uv: Vec2, sampler: SamplerType) -> Vec4 {
        let size = Vec2::new(self.width as f32, self.height as f32);
        let coord = uv * size;
        if !sampler.is_linear() {
            let texel = coord.floor();
            return self.fetch(texel.x as i32, texel.y as i32, sampler);
        }

        let coord = coord - 0.5;
        let base = coord.floor();
        let f = coord - base;
        let (x0, y0) = (base.x as i32, base.y as i32);

        let top = self.fetch(x0, y0, sampler).lerp(self.fetch(x0 + 1, y0, sampler), f.x);
        let bottom = self.fetch(x0, y0 + 1, sampler).lerp(self.fetch(x0 + 1, y0 + 1, sampler), f.x);
        top.lerp(bottom, f.y)
    }
}

fn address(i: i32, size: u32, wrap: bool) -> u32 {
    let size = size as i32;
    if wrap {
        i.rem_euclid(size) as u32
    } else {
        i.clamp(0, size - 1) as u32
    }
}

fn quantize(format: TextureFormat, value: Vec4) -> Vec4 {
    match format {
        TextureFormat::Rgba8Unorm => (value.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round() / 255.0,
        TextureFormat::R32Float => Vec4::new(value.x, 0.0, 0.0, 1.0),
        TextureFormat::Rg32Float => Vec4::new(value.x, value.y, 0.0, 1.0),
        TextureFormat::Rgba32Float => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: u32) -> CpuTexture {
        let mut texture = CpuTexture::new(width, 1, TextureFormat::Rgba32Float);
        for x in 0..width {
            texture.store(x, 0, Vec4::splat(x as f32));
        }
        texture
    }

    #[test]
    fn linear_sample_at_texel_center_is_exact() {
        let texture = ramp(8);
        let value = texture.sample(Vec2::new(3.5 / 8.0, 0.5), SamplerType::LinearClamp);
        assert!((value.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn linear_sample_between_centers_interpolates() {
        let texture = ramp(8);
        let value = texture.sample(Vec2::new(4.0 / 8.0, 0.5), SamplerType::LinearClamp);
        assert!((value.x - 3.5).abs() < 1e-5);
    }

    #[test]
    fn wrap_and_clamp_addressing() {
        let texture = ramp(4);
        assert_eq!(texture.fetch(-1, 0, SamplerType::NearestWrap).x, 3.0);
        assert_eq!(texture.fetch(-1, 0, SamplerType::NearestClamp).x, 0.0);
        assert_eq!(texture.fetch(9, 0, SamplerType::NearestClamp).x, 3.0);
    }

    #[test]
    fn unorm_writes_are_quantized() {
        let mut texture = CpuTexture::new(1, 1, TextureFormat::Rgba8Unorm);
        texture.store(0, 0, Vec4::new(1.5, -0.2, 0.5, 1.0));
        let texel = texture.texel(0, 0);
        assert_eq!(texel.x, 1.0);
        assert_eq!(texel.y, 0.0);
        assert_eq!(texel.z, 128.0 / 255.0);
    }

    #[test]
    fn image_round_trip_is_lossless() {
        let image = RgbaImage::from_fn(5, 3, |x, y| Rgba([x as u8 * 40, y as u8 * 80, 7, 255]));
        let texture = CpuTexture::from_image(&image);
        assert_eq!(texture.to_image(), image);
    }
}

use cathode_core::passes::{ApplyArtifactsConstants, GenerateSignalConstants};
use cathode_core::SIGNAL_SAMPLES_PER_COLOR_CYCLE;
use glam::{Vec2, Vec4};

use super::{carrier_angle, Bound, Texel, RGB_TO_YIQ};
use crate::hash::{hash2, unit, wang_hash};

/// Taps on each side of the ghost's center.
const GHOST_HALF_TAPS: i32 = 3;

pub fn generate_signal(c: &GenerateSignalConstants, input: &Bound, texel: Texel) -> Vec4 {
    let x = texel.x as i32;
    let line = texel.y;

    let mut u = (texel.x as f32 + 0.5) / c.signal_width as f32;
    if c.instability_scale > 0.0 {
        let wobble = unit(hash2(line, c.noise_seed)) - 0.5;
        u += wobble * c.instability_scale / c.input_width as f32;
    }
    let v = (line as f32 + 0.5) / c.scanline_count as f32;

    let rgb = input.sample(Vec2::new(u, v)).truncate();
    let yiq = RGB_TO_YIQ * rgb;

    let chroma = |frame_phase: f32| {
        let theta = carrier_angle(frame_phase + line as f32 * c.phase_increment_per_line, x);
        c.chroma_scale * (yiq.y * theta.cos() + yiq.z * theta.sin())
    };

    let chroma_a = chroma(c.frame_phase);
    let chroma_b = if c.doubled { chroma(c.prev_frame_phase) } else { 0.0 };
    let luma_b = if c.doubled { yiq.x } else { 0.0 };

    if c.composite {
        Vec4::new(yiq.x + chroma_a, luma_b + chroma_b, 0.0, 0.0)
    } else {
        Vec4::new(yiq.x, chroma_a, luma_b, chroma_b)
    }
}

pub fn apply_artifacts(c: &ApplyArtifactsConstants, signal: &Bound, texel: Texel) -> Vec4 {
    let x = texel.x as i32;
    let y = texel.y as i32;
    let original = signal.fetch(x, y);
    let mut out = original;

    if c.ghost_visibility > 0.0 {
        let center = c.ghost_distance * SIGNAL_SAMPLES_PER_COLOR_CYCLE as f32;
        let mut sum = Vec4::ZERO;
        let mut weight_sum = 0.0;
        for tap in -GHOST_HALF_TAPS..=GHOST_HALF_TAPS {
            let weight = c.ghost_spread_scale.powi(tap.abs());
            let source = x as f32 - (center + tap as f32);
            let left = source.floor();
            let f = source - left;
            let sample = signal.fetch(left as i32, y).lerp(signal.fetch(left as i32 + 1, y), f);
            sum += sample * weight;
            weight_sum += weight;
        }
        out += sum * (c.ghost_visibility / weight_sum);
    }

    if c.noise_strength > 0.0 {
        let index = texel.y * c.signal_width + texel.x;
        let seed = wang_hash(c.noise_seed);
        let channels = if c.svideo { 4 } else { 2 };
        for channel in 0..channels {
            let n = unit(wang_hash((index * 4 + channel) ^ seed)) - 0.5;
            out[channel as usize] += n * c.noise_strength;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::CpuTexture;
    use cathode_core::{SamplerType, TextureFormat};

    fn constants(composite: bool) -> GenerateSignalConstants {
        GenerateSignalConstants {
            signal_width: 16,
            scanline_count: 1,
            input_width: 4,
            frame_phase: 0.0,
            prev_frame_phase: 0.5,
            phase_increment_per_line: 0.0,
            composite,
            doubled: false,
            chroma_scale: 0.5,
            instability_scale: 0.0,
            noise_seed: 0,
        }
    }

    fn flat(value: Vec4) -> CpuTexture {
        let mut texture = CpuTexture::new(4, 1, TextureFormat::Rgba32Float);
        for x in 0..4 {
            texture.store(x, 0, value);
        }
        texture
    }

    fn texel(x: u32) -> Texel {
        Texel { x, y: 0, width: 16, height: 1 }
    }

    #[test]
    fn gray_encodes_to_pure_luma() {
        let input = flat(Vec4::new(0.25, 0.25, 0.25, 1.0));
        let bound = Bound { texture: &input, sampler: SamplerType::LinearClamp };
        for x in 0..16 {
            let out = generate_signal(&constants(true), &bound, texel(x));
            assert!((out.x - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn svideo_keeps_chroma_apart() {
        let input = flat(Vec4::new(1.0, 0.0, 0.0, 1.0));
        let bound = Bound { texture: &input, sampler: SamplerType::LinearClamp };
        let out = generate_signal(&constants(false), &bound, texel(0));
        assert!((out.x - 0.299).abs() < 1e-5);
        // At phase zero the carrier is pure cosine, so chroma is half of I.
        assert!((out.y - 0.5 * 0.595716).abs() < 1e-5);
    }

    #[test]
    fn chroma_cancels_over_a_cycle() {
        let input = flat(Vec4::new(0.8, 0.2, 0.6, 1.0));
        let bound = Bound { texture: &input, sampler: SamplerType::LinearClamp };
        let sum: f32 = (0..4).map(|x| generate_signal(&constants(false), &bound, texel(x)).y).sum();
        assert!(sum.abs() < 1e-5);
    }
}

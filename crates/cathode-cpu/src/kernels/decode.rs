use std::f32::consts::PI;

use cathode_core::passes::{CompositeToSVideoConstants, SVideoToYiqConstants};
use glam::{Vec2, Vec3, Vec4};

use super::{carrier_angle, Bound, Texel, YIQ_TO_RGB};

/// Two overlapping color-cycle windows averaged, so the filter is centered
/// on the texel. The alternating sum of the weights is zero, which nulls the
/// carrier at any phase.
const CYCLE_TAPS: [(i32, f32); 5] = [(-2, 0.125), (-1, 0.25), (0, 0.25), (1, 0.25), (2, 0.125)];
const SHARPEN_HALF_TAPS: i32 = 4;

pub fn composite_to_svideo(c: &CompositeToSVideoConstants, signal: &Bound, texel: Texel) -> Vec4 {
    let x = texel.x as i32;
    let y = texel.y as i32;

    let mut luma = Vec2::ZERO;
    for (tap, weight) in CYCLE_TAPS {
        let s = signal.fetch_in_period(x + tap, y);
        luma += weight * Vec2::new(s.x, s.y);
    }
    let here = signal.fetch(x, y);

    if c.doubled {
        Vec4::new(luma.x, here.x - luma.x, luma.y, here.y - luma.y)
    } else {
        Vec4::new(luma.x, here.x - luma.x, 0.0, 0.0)
    }
}

/// Luma, then I/Q recovered by synchronous demodulation over one cycle.
/// `second` selects the phase variant packed in `.zw`.
fn demodulate(c: &SVideoToYiqConstants, signal: &Bound, x: i32, y: i32, second: bool) -> Vec3 {
    let pick = |s: Vec4| if second { Vec2::new(s.z, s.w) } else { Vec2::new(s.x, s.y) };
    let base = if second { c.prev_frame_phase } else { c.frame_phase };
    let line_phase = base + y as f32 * c.phase_increment_per_line;

    let luma = pick(signal.fetch(x, y)).x;
    let mut blurred = 0.0;
    for tap in -SHARPEN_HALF_TAPS..=SHARPEN_HALF_TAPS {
        blurred += pick(signal.fetch(x + tap, y)).x;
    }
    blurred /= (2 * SHARPEN_HALF_TAPS + 1) as f32;
    let luma = luma + c.sharpness * (luma - blurred);

    let mut iq = Vec2::ZERO;
    for (tap, weight) in CYCLE_TAPS {
        let chroma = pick(signal.fetch_in_period(x + tap, y)).y;
        let theta = carrier_angle(line_phase, x + tap);
        iq += weight * chroma * Vec2::new(theta.cos(), theta.sin());
    }
    iq *= 2.0 / c.saturation_scale;

    Vec3::new(luma, iq.x, iq.y)
}

pub fn svideo_to_yiq(c: &SVideoToYiqConstants, signal: &Bound, texel: Texel) -> Vec4 {
    let x = texel.x as i32;
    let y = texel.y as i32;

    let mut yiq = demodulate(c, signal, x, y, false);
    if c.temporal_blend > 0.0 {
        yiq = yiq.lerp(demodulate(c, signal, x, y, true), c.temporal_blend);
    }

    let range = (c.white_level - c.black_level).max(1e-6);
    let luma = ((yiq.x - c.black_level) / range).max(0.0).powf(1.0 / c.gamma) * c.brightness;

    let (sin, cos) = (c.tint * PI).sin_cos();
    let iq = Vec2::new(yiq.y * cos - yiq.z * sin, yiq.y * sin + yiq.z * cos);
    let iq = iq * (c.saturation * c.brightness / range);

    Vec4::new(luma, iq.x, iq.y, 1.0)
}

pub fn yiq_to_rgb(yiq: &Bound, texel: Texel) -> Vec4 {
    let rgb = YIQ_TO_RGB * yiq.sample(texel.uv()).truncate();
    rgb.clamp(Vec3::ZERO, Vec3::ONE).extend(1.0)
}

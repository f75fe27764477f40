use cathode_core::passes::RgbToCrtConstants;
use glam::{Vec2, Vec3, Vec4};

use super::{Bound, Texel};
use crate::hash::{hash2, unit};

/// Brightness of a mask texel outside its own phosphor stripe.
const MASK_FLOOR: f32 = 0.25;
/// Fraction of each slot taken by the dark gap between slots.
const SLOT_GAP: f32 = 0.1;

/// Radius of a shadow mask dot, in cells.
const DOT_RADIUS: f32 = 0.45;

/// One tile of a slot mask: two triads of red, green and blue stripes, the
/// second triad's slots offset by half a slot.
pub fn slot_mask(texel: Texel) -> Vec4 {
    let uv = texel.uv();
    let stripe = (uv.x * 6.0).floor() as usize % 3;
    let triad = (uv.x * 2.0).floor();
    let slot = (uv.y + 0.5 * triad).fract();

    let mut mask = Vec3::splat(MASK_FLOOR);
    if slot < 1.0 - SLOT_GAP {
        mask[stripe] = 1.0;
    }
    mask.extend(1.0)
}

/// One tile of a delta shadow mask: two rows of round dots, three to a row,
/// the second row shifted by half a triad.
pub fn shadow_mask(texel: Texel) -> Vec4 {
    let uv = texel.uv();
    let row = (uv.y * 2.0).floor();
    let cell_x = uv.x * 3.0 + 1.5 * row;
    let channel = cell_x.floor() as usize % 3;
    let local = Vec2::new(cell_x.fract(), (uv.y * 2.0).fract()) - Vec2::splat(0.5);

    let mut mask = Vec3::splat(MASK_FLOOR);
    if local.length() < DOT_RADIUS {
        mask[channel] = 1.0;
    }
    mask.extend(1.0)
}

/// One tile of an aperture grille: two triads of unbroken stripes.
pub fn aperture_grille(texel: Texel) -> Vec4 {
    let stripe = (texel.uv().x * 6.0).floor() as usize % 3;
    let mut mask = Vec3::splat(MASK_FLOOR);
    mask[stripe] = 1.0;
    mask.extend(1.0)
}

/// Rounded-rectangle coverage of a point in `-1..1` screen space.
fn screen_coverage(p: Vec2, corner_rounding: f32) -> f32 {
    let radius = corner_rounding.clamp(0.0, 1.0);
    let q = p.abs() - Vec2::splat(1.0 - radius);
    let distance = q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0) - radius;
    if distance <= 0.0 {
        1.0
    } else {
        0.0
    }
}

fn barrel(p: Vec2, amount: Vec2) -> Vec2 {
    p * (Vec2::ONE + amount * Vec2::new(p.y * p.y, p.x * p.x))
}

pub fn rgb_to_crt(
    c: &RgbToCrtConstants,
    image: &Bound,
    previous: &Bound,
    mask: &Bound,
    diffusion: &Bound,
    texel: Texel,
) -> Vec4 {
    let uv = texel.uv();
    let p = (uv * 2.0 - Vec2::ONE) * c.view_scale;

    let p_source = barrel(p, c.distortion);
    let p_bezel = barrel(p, c.distortion + c.edge_rounding);
    let coverage = screen_coverage(p_bezel, c.corner_rounding);

    let mut source_uv = (p_source * 0.5 + Vec2::splat(0.5)) * c.overscan_scale + c.overscan_offset;

    if c.instability_scale > 0.0 {
        let line = (source_uv.y * c.scanline_count as f32).floor() as i32;
        let wobble = unit(hash2(line as u32, c.noise_seed)) - 0.5;
        source_uv.x += wobble * c.instability_scale / c.input_width as f32;
    }

    let mut raw = image.sample(source_uv).truncate();
    if c.diffusion_strength > 0.0 {
        let scattered = diffusion.sample(source_uv).truncate();
        raw += (scattered - raw).max(Vec3::ZERO) * c.diffusion_strength;
    }

    let range = (c.white_level - c.black_level).max(1e-6);
    let rgb = (raw - Vec3::splat(c.black_level)) / range;

    let physical_line = (source_uv.y * c.scanline_count as f32 * 2.0).floor() as i32;
    let lit = (physical_line.rem_euclid(2) == 0) == (c.scanline_parity == 0);
    let scanline = if lit { 1.0 } else { 1.0 - c.scanline_strength };

    let mask_rgb = mask.sample(source_uv * c.mask_uv_scale).truncate();
    let mask_factor = Vec3::ONE.lerp(mask_rgb, c.mask_strength);

    let history = previous.sample(uv).truncate();
    let out = rgb * scanline * mask_factor * coverage + history * c.phosphor_decay;
    out.clamp(Vec3::ZERO, Vec3::ONE).extend(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_screen_covers_its_corners() {
        assert_eq!(screen_coverage(Vec2::new(0.99, 0.99), 0.0), 1.0);
        assert_eq!(screen_coverage(Vec2::new(1.01, 0.0), 0.0), 0.0);
    }

    #[test]
    fn rounding_cuts_corners() {
        assert_eq!(screen_coverage(Vec2::new(0.99, 0.99), 0.5), 0.0);
        assert_eq!(screen_coverage(Vec2::new(0.99, 0.0), 0.5), 1.0);
    }

    #[test]
    fn barrel_leaves_center_alone() {
        assert_eq!(barrel(Vec2::ZERO, Vec2::splat(0.5)), Vec2::ZERO);
        let edge = barrel(Vec2::new(1.0, 1.0), Vec2::new(0.25, 0.0));
        assert_eq!(edge, Vec2::new(1.25, 1.0));
    }

    #[test]
    fn mask_stripes_cycle_through_channels() {
        let texel = |x| Texel { x, y: 0, width: 6, height: 10 };
        assert_eq!(slot_mask(texel(0)).truncate(), Vec3::new(1.0, MASK_FLOOR, MASK_FLOOR));
        assert_eq!(slot_mask(texel(1)).truncate(), Vec3::new(MASK_FLOOR, 1.0, MASK_FLOOR));
        assert_eq!(slot_mask(texel(5)).truncate(), Vec3::new(MASK_FLOOR, MASK_FLOOR, 1.0));
    }

    #[test]
    fn slots_end_in_a_gap() {
        let bottom = slot_mask(Texel { x: 0, y: 9, width: 6, height: 10 });
        assert_eq!(bottom.truncate(), Vec3::splat(MASK_FLOOR));
    }

    #[test]
    fn grille_stripes_never_break() {
        for x in 0..6 {
            let top = aperture_grille(Texel { x, y: 0, width: 6, height: 10 });
            for y in 1..10 {
                assert_eq!(aperture_grille(Texel { x, y, width: 6, height: 10 }), top, "column {x}");
            }
        }
    }

    #[test]
    fn shadow_mask_rows_are_staggered() {
        let texel = |x, y| Texel { x, y, width: 12, height: 8 };
        // Dot centers: row 0 at the middle of each third, row 1 half a triad over.
        assert_eq!(shadow_mask(texel(2, 1)).truncate(), Vec3::new(1.0, MASK_FLOOR, MASK_FLOOR));
        assert_ne!(shadow_mask(texel(2, 5)), shadow_mask(texel(2, 1)));
        // Cell corners fall between dots.
        assert_eq!(shadow_mask(texel(0, 0)).truncate(), Vec3::splat(MASK_FLOOR));
    }
}

use serde::{Deserialize, Serialize};

/// Timings of the hypothetical machine generating the signal.
///
/// Every phase value is a numerator over `denominator`, measured in cycles of
/// the color carrier, since in practice they are all rational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Common denominator of every other field. Never zero.
    pub denominator: u32,
    /// Color carrier cycles per input pixel (usually <= 1).
    pub color_cycles_per_input_pixel: u32,
    /// Phase of the first scanline of the first frame.
    pub initial_frame_phase: u32,
    /// Phase advance from one scanline to the next.
    pub phase_increment_per_line: u32,
    /// Phase advance applied after an even frame.
    pub phase_increment_per_even_frame: u32,
    /// Phase advance applied after an odd frame.
    pub phase_increment_per_odd_frame: u32,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            denominator: 1,
            color_cycles_per_input_pixel: 1,
            initial_frame_phase: 0,
            phase_increment_per_line: 0,
            phase_increment_per_even_frame: 0,
            phase_increment_per_odd_frame: 0,
        }
    }
}

impl SourceSettings {
    /// Phases are reduced modulo the denominator, so whole-cycle offsets
    /// of any size are accepted.
    pub fn clamped(&self) -> Self {
        let denominator = self.denominator.max(1);
        Self {
            denominator,
            color_cycles_per_input_pixel: self.color_cycles_per_input_pixel.max(1),
            initial_frame_phase: self.initial_frame_phase % denominator,
            phase_increment_per_line: self.phase_increment_per_line % denominator,
            phase_increment_per_even_frame: self.phase_increment_per_even_frame % denominator,
            phase_increment_per_odd_frame: self.phase_increment_per_odd_frame % denominator,
        }
    }

    /// Convert a phase numerator to a fraction of a color cycle.
    pub fn phase(&self, numerator: u32) -> f32 {
        numerator as f32 / self.denominator.max(1) as f32
    }
}

/// How noisy the generated signal is: a bad cable or RF link between the
/// clean source and the back of the TV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactSettings {
    /// How visible the ghost is. Range: 0.0..1.0
    pub ghost_visibility: f32,
    /// Falloff of each ghost tap relative to its neighbor. Range: 0.0..0.99
    pub ghost_spread_scale: f32,
    /// Distance of the ghost's center, in color cycles. Range: 0.0..32.0
    pub ghost_distance: f32,
    /// Amount of noise added to the signal. Range: 0.0..1.0
    pub noise_strength: f32,
    /// Horizontal wobble per scanline, in input pixels. Range: 0.0..16.0
    pub instability_scale: f32,
    /// Blend between two phases to hide temporal aliasing. Range: 0.0..1.0
    pub temporal_artifact_reduction: f32,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            ghost_visibility: 0.0,
            ghost_spread_scale: 0.71,
            ghost_distance: 3.1,
            noise_strength: 0.0,
            instability_scale: 0.0,
            temporal_artifact_reduction: 0.0,
        }
    }
}

impl ArtifactSettings {
    pub fn clamped(&self) -> Self {
        Self {
            ghost_visibility: sane(self.ghost_visibility, 0.0, 1.0),
            ghost_spread_scale: sane(self.ghost_spread_scale, 0.0, 0.99),
            ghost_distance: sane(self.ghost_distance, 0.0, 32.0),
            noise_strength: sane(self.noise_strength, 0.0, 1.0),
            instability_scale: sane(self.instability_scale, 0.0, 16.0),
            temporal_artifact_reduction: sane(self.temporal_artifact_reduction, 0.0, 1.0),
        }
    }

    /// Whether the artifacts pass has anything to do.
    pub fn has_signal_artifacts(&self) -> bool {
        self.ghost_visibility > 0.0 || self.noise_strength > 0.0
    }
}

/// The knobs on the front of an old TV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TVKnobSettings {
    /// Range: 0.0..4.0
    pub saturation: f32,
    /// Range: 0.0..4.0
    pub brightness: f32,
    /// Hue rotation in half-turns. Range: -1.0..1.0
    pub tint: f32,
    /// 0 is unfiltered, 1 fully sharpened, -1 fully blurred. Range: -1.0..1.0
    pub sharpness: f32,
    /// Power curve applied to luma. Range: 0.1..4.0
    pub gamma: f32,
}

impl Default for TVKnobSettings {
    fn default() -> Self {
        Self {
            saturation: 1.0,
            brightness: 1.0,
            tint: 0.0,
            sharpness: 0.0,
            gamma: 1.0,
        }
    }
}

impl TVKnobSettings {
    pub fn clamped(&self) -> Self {
        Self {
            saturation: sane(self.saturation, 0.0, 4.0),
            brightness: sane(self.brightness, 0.0, 4.0),
            tint: sane(self.tint, -1.0, 1.0),
            sharpness: sane(self.sharpness, -1.0, 1.0),
            gamma: if self.gamma.is_finite() { self.gamma.clamp(0.1, 4.0) } else { 1.0 },
        }
    }
}

/// Phosphor layout of the tube.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskType {
    /// Vertical RGB stripes broken into staggered slots.
    #[default]
    SlotMask,
    /// Round phosphor dots in a delta arrangement.
    ShadowMask,
    /// Unbroken vertical stripes.
    ApertureGrille,
}

/// Physical properties of the virtual CRT.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSettings {
    /// Display aspect of one input pixel: 1 for square pixels, 8/7 for the NES.
    pub input_pixel_aspect_ratio: f32,

    /// Input pixels hidden behind the bezel on each side.
    pub overscan_left: u32,
    pub overscan_right: u32,
    pub overscan_top: u32,
    pub overscan_bottom: u32,

    /// Barrel distortion to emulate a curved screen. Range: 0.0..1.0
    pub horizontal_distortion: f32,
    pub vertical_distortion: f32,

    /// Extra rounding of the bezel edges. Range: 0.0..1.0
    pub screen_edge_rounding_x: f32,
    pub screen_edge_rounding_y: f32,

    /// Corner radius. 0 is square, 1 is an oval. Range: 0.0..1.0
    pub corner_rounding: f32,

    pub mask_type: MaskType,
    /// Range: 0.1..10.0
    pub shadow_mask_scale: f32,
    /// Range: 0.0..1.0
    pub shadow_mask_strength: f32,

    /// Fraction of the previous frame kept on the next. Range: 0.0..0.99
    pub phosphor_decay: f32,

    /// Dimming of the unlit scanline parity. Range: 0.0..1.0
    pub scanline_strength: f32,

    /// Display-side horizontal jitter per scanline, in input pixels. Range: 0.0..16.0
    pub instability_scale: f32,

    /// Light scattered by the glass in front of the phosphors. Range: 0.0..1.0
    pub diffusion_strength: f32,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            input_pixel_aspect_ratio: 1.0,
            overscan_left: 0,
            overscan_right: 0,
            overscan_top: 0,
            overscan_bottom: 0,
            horizontal_distortion: 0.0,
            vertical_distortion: 0.0,
            screen_edge_rounding_x: 0.0,
            screen_edge_rounding_y: 0.0,
            corner_rounding: 0.0,
            mask_type: MaskType::SlotMask,
            shadow_mask_scale: 1.1,
            shadow_mask_strength: 0.85,
            phosphor_decay: 0.05,
            scanline_strength: 0.25,
            instability_scale: 0.0,
            diffusion_strength: 0.0,
        }
    }
}

impl ScreenSettings {
    /// A screen that changes nothing: no warp, mask, decay, diffusion or scanlines.
    pub fn flat() -> Self {
        Self {
            shadow_mask_scale: 1.0,
            shadow_mask_strength: 0.0,
            phosphor_decay: 0.0,
            scanline_strength: 0.0,
            ..Self::default()
        }
    }

    pub fn clamped(&self) -> Self {
        Self {
            input_pixel_aspect_ratio: if self.input_pixel_aspect_ratio.is_finite() {
                self.input_pixel_aspect_ratio.clamp(0.1, 10.0)
            } else {
                1.0
            },
            horizontal_distortion: sane(self.horizontal_distortion, 0.0, 1.0),
            vertical_distortion: sane(self.vertical_distortion, 0.0, 1.0),
            screen_edge_rounding_x: sane(self.screen_edge_rounding_x, 0.0, 1.0),
            screen_edge_rounding_y: sane(self.screen_edge_rounding_y, 0.0, 1.0),
            corner_rounding: sane(self.corner_rounding, 0.0, 1.0),
            shadow_mask_scale: if self.shadow_mask_scale.is_finite() {
                self.shadow_mask_scale.clamp(0.1, 10.0)
            } else {
                1.0
            },
            shadow_mask_strength: sane(self.shadow_mask_strength, 0.0, 1.0),
            phosphor_decay: sane(self.phosphor_decay, 0.0, 0.99),
            scanline_strength: sane(self.scanline_strength, 0.0, 1.0),
            instability_scale: sane(self.instability_scale, 0.0, 16.0),
            diffusion_strength: sane(self.diffusion_strength, 0.0, 1.0),
            ..*self
        }
    }

    /// Visible input area after overscan, as `(left, top, width, height)` in
    /// input pixels. At least one pixel always stays visible on each axis.
    pub fn visible_region(&self, input_width: u32, input_height: u32) -> (u32, u32, u32, u32) {
        let (left, width) = visible_span(self.overscan_left, self.overscan_right, input_width);
        let (top, height) = visible_span(self.overscan_top, self.overscan_bottom, input_height);
        (left, top, width, height)
    }
}

fn visible_span(start_margin: u32, end_margin: u32, size: u32) -> (u32, u32) {
    let size = size.max(1);
    let start = start_margin.min(size - 1);
    let end = end_margin.min(size - 1 - start);
    (start, size - start - end)
}

/// Clamp to a range, mapping NaN to the lower bound.
fn sane(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_defaults() {
        let artifacts = ArtifactSettings::default();
        assert_eq!(artifacts.ghost_visibility, 0.0);
        assert_eq!(artifacts.noise_strength, 0.0);
        assert_eq!(artifacts.temporal_artifact_reduction, 0.0);

        let knobs = TVKnobSettings::default();
        assert_eq!((knobs.saturation, knobs.brightness, knobs.tint, knobs.sharpness), (1.0, 1.0, 0.0, 0.0));

        let screen = ScreenSettings::default();
        assert_eq!(screen.shadow_mask_scale, 1.1);
        assert_eq!(screen.shadow_mask_strength, 0.85);
        assert_eq!(screen.phosphor_decay, 0.05);
        assert_eq!(screen.scanline_strength, 0.25);
        assert_eq!(screen.mask_type, MaskType::SlotMask);
        assert_eq!(screen.diffusion_strength, 0.0);
    }

    #[test]
    fn clamping_never_rejects() {
        let wild = ArtifactSettings {
            ghost_visibility: 12.0,
            noise_strength: -3.0,
            temporal_artifact_reduction: f32::NAN,
            ..Default::default()
        };
        let clamped = wild.clamped();
        assert_eq!(clamped.ghost_visibility, 1.0);
        assert_eq!(clamped.noise_strength, 0.0);
        assert_eq!(clamped.temporal_artifact_reduction, 0.0);

        let knobs = TVKnobSettings { gamma: 0.0, ..Default::default() }.clamped();
        assert_eq!(knobs.gamma, 0.1);

        let source = SourceSettings { denominator: 0, ..Default::default() }.clamped();
        assert_eq!(source.denominator, 1);
    }

    #[test]
    fn huge_phases_reduce_to_the_same_fraction() {
        let source = SourceSettings {
            denominator: 3,
            initial_frame_phase: 7,
            phase_increment_per_line: u32::MAX,
            phase_increment_per_even_frame: u32::MAX,
            phase_increment_per_odd_frame: u32::MAX - 1,
            ..Default::default()
        }
        .clamped();
        assert_eq!(source.initial_frame_phase, 1);
        // u32::MAX is a multiple of 3.
        assert_eq!(source.phase_increment_per_line, 0);
        assert_eq!(source.phase_increment_per_even_frame, 0);
        assert_eq!(source.phase_increment_per_odd_frame, 2);
        assert_eq!(source, source.clamped());
    }

    #[test]
    fn overscan_keeps_one_pixel_visible() {
        let screen = ScreenSettings {
            overscan_left: 160,
            overscan_right: 160,
            overscan_top: 300,
            overscan_bottom: 0,
            ..ScreenSettings::flat()
        };
        let (left, top, width, height) = screen.visible_region(320, 240);
        assert_eq!((left, width), (160, 1));
        assert_eq!((top, height), (239, 1));

        let (_, _, width, height) = ScreenSettings::flat().visible_region(320, 240);
        assert_eq!((width, height), (320, 240));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let screen: ScreenSettings = serde_json::from_str(r#"{ "scanline_strength": 0.5 }"#).unwrap();
        assert_eq!(screen.scanline_strength, 0.5);
        assert_eq!(screen.shadow_mask_scale, 1.1);

        let screen: ScreenSettings = serde_json::from_str(r#"{ "mask_type": "ApertureGrille" }"#).unwrap();
        assert_eq!(screen.mask_type, MaskType::ApertureGrille);
    }
}

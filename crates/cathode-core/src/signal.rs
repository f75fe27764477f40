use serde::{Deserialize, Serialize};

use crate::settings::SourceSettings;

/// Number of signal texels generated per cycle of the color carrier.
///
/// Four samples per cycle puts the carrier at quarter-phase steps, which is
/// what lets a one-cycle box filter null it exactly.
pub const SIGNAL_SAMPLES_PER_COLOR_CYCLE: u32 = 4;

/// How the simulated signal carries color to the (virtual) TV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignalType {
    /// Perfect RGB end to end. The encoder and decoder are skipped.
    Rgb,
    /// Luma and chroma on separate wires: chroma modulation artifacts but no
    /// luma/chroma crosstalk.
    SVideo,
    /// Luma and chroma summed onto one wire, so the decoder has to separate them.
    #[default]
    Composite,
}

/// Which physical scanline parity is lit for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanlineType {
    /// The (1-based) odd scanlines are full brightness.
    #[default]
    Odd,
    /// The (1-based) even scanlines are full brightness.
    Even,
}

impl ScanlineType {
    /// Progressive scan is an odd frame every frame, paired with a scanline
    /// strength of zero.
    pub const PROGRESSIVE: ScanlineType = ScanlineType::Odd;

    /// The other field of an interlaced pair.
    pub fn flipped(self) -> Self {
        match self {
            ScanlineType::Odd => ScanlineType::Even,
            ScanlineType::Even => ScanlineType::Odd,
        }
    }

    /// Shader-side encoding: 0 for odd, 1 for even.
    pub fn parity(self) -> u32 {
        match self {
            ScanlineType::Odd => 0,
            ScanlineType::Even => 1,
        }
    }
}

/// Per-frame signal level record.
///
/// Produced by the encoder, refined by the decoder and consumed by the CRT
/// renderer. Always passed by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalLevels {
    /// Blend amount between the two phase variants, only meaningful when
    /// `is_doubled` is set.
    pub temporal_artifact_reduction: f32,
    /// The signal texture holds two phase variants of the same frame.
    pub is_doubled: bool,
    pub white_level: f32,
    pub black_level: f32,
    /// Scale applied to chroma at generation time; the decoder divides it back out.
    pub saturation_scale: f32,
}

impl Default for SignalLevels {
    fn default() -> Self {
        Self {
            temporal_artifact_reduction: 0.0,
            is_doubled: false,
            white_level: 1.0,
            black_level: 0.0,
            saturation_scale: 1.0,
        }
    }
}

impl SignalLevels {
    /// Distance between white and black, never below a small positive epsilon.
    pub fn range(&self) -> f32 {
        (self.white_level - self.black_level).max(1e-6)
    }

    pub fn is_valid(&self) -> bool {
        self.white_level > self.black_level
            && self.saturation_scale > 0.0
            && (0.0..=1.0).contains(&self.temporal_artifact_reduction)
    }

    /// The blend weight of the second phase variant. Zero unless doubled.
    pub fn temporal_blend(&self) -> f32 {
        if self.is_doubled {
            0.5 * self.temporal_artifact_reduction.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Carrier phases a frame was generated with, in color cycles.
///
/// The decoder demodulates with exactly these, so the encoder hands them over
/// alongside the signal texture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignalPhases {
    /// Phase of scanline 0, field offset included.
    pub frame_phase: f32,
    /// Phase of the second variant when the signal is doubled.
    pub prev_frame_phase: f32,
    pub phase_increment_per_line: f32,
}

impl SignalPhases {
    /// Carrier phase of scanline `line` for the first (or second) variant.
    pub fn line_phase(&self, line: u32, second: bool) -> f32 {
        let base = if second { self.prev_frame_phase } else { self.frame_phase };
        base + line as f32 * self.phase_increment_per_line
    }
}

/// Shape of the generated signal, derived from the source timings and input size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalProperties {
    pub signal_type: SignalType,
    /// Signal texels per scanline.
    pub scanline_width: u32,
    pub scanline_count: u32,
    /// Color carrier cycles per input pixel, as a float.
    pub color_cycles_per_input_pixel: f32,
}

impl SignalProperties {
    pub fn new(signal_type: SignalType, input_width: u32, input_height: u32, source: &SourceSettings) -> Self {
        let source = source.clamped();
        let samples = input_width as u64
            * source.color_cycles_per_input_pixel as u64
            * SIGNAL_SAMPLES_PER_COLOR_CYCLE as u64;
        let denominator = source.denominator as u64;
        let scanline_width = samples.div_ceil(denominator).max(1) as u32;

        Self {
            signal_type,
            scanline_width,
            scanline_count: input_height.max(1),
            color_cycles_per_input_pixel: source.color_cycles_per_input_pixel as f32 / source.denominator as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progressive_is_odd() {
        assert_eq!(ScanlineType::PROGRESSIVE, ScanlineType::Odd);
        assert_eq!(ScanlineType::Odd.flipped(), ScanlineType::Even);
    }

    #[test]
    fn default_levels_are_identity() {
        let levels = SignalLevels::default();
        assert!(levels.is_valid());
        assert_eq!(levels.range(), 1.0);
        assert_eq!(levels.temporal_blend(), 0.0);
    }

    #[test]
    fn temporal_blend_ignored_unless_doubled() {
        let mut levels = SignalLevels { temporal_artifact_reduction: 1.0, ..Default::default() };
        assert_eq!(levels.temporal_blend(), 0.0);
        levels.is_doubled = true;
        assert_eq!(levels.temporal_blend(), 0.5);
    }

    #[test]
    fn scanline_width_follows_source_timings() {
        let square = SignalProperties::new(SignalType::Composite, 320, 240, &SourceSettings::default());
        assert_eq!(square.scanline_width, 1280);

        // NES: 2/3 of a color cycle per pixel.
        let nes = SourceSettings {
            denominator: 3,
            color_cycles_per_input_pixel: 2,
            ..Default::default()
        };
        let props = SignalProperties::new(SignalType::Composite, 256, 240, &nes);
        assert_eq!(props.scanline_width, 683);
        assert!((props.color_cycles_per_input_pixel - 2.0 / 3.0).abs() < 1e-6);
    }
}

use crate::settings::{ArtifactSettings, ScreenSettings, SourceSettings};

/// A named settings bundle for pickers and defaults.
#[derive(Debug, Clone)]
pub struct Preset<T> {
    pub name: &'static str,
    pub settings: T,
}

/// A source preset also carries the pixel aspect the machine displayed with,
/// which belongs to the screen settings at render time.
#[derive(Debug, Clone)]
pub struct SourcePreset {
    pub name: &'static str,
    pub settings: SourceSettings,
    pub input_pixel_aspect_ratio: f32,
}

pub fn source_presets() -> Vec<SourcePreset> {
    // NES/SNES timings are in thirds of a color cycle, and the per-frame
    // increments (2/3 then 1/3) make consecutive frames alternate phase.
    let nes = SourceSettings {
        denominator: 3,
        color_cycles_per_input_pixel: 2,
        initial_frame_phase: 0,
        phase_increment_per_line: 1,
        phase_increment_per_even_frame: 2,
        phase_increment_per_odd_frame: 1,
    };
    // PC composite adapters never change phase per line or frame.
    let pc = |denominator| SourceSettings { denominator, ..SourceSettings::default() };

    vec![
        SourcePreset { name: "NES/SNES", settings: nes, input_pixel_aspect_ratio: 8.0 / 7.0 },
        SourcePreset { name: "NES/SNES (Square Pixels)", settings: nes, input_pixel_aspect_ratio: 1.0 },
        SourcePreset {
            name: "SNES 512 mode",
            settings: SourceSettings { color_cycles_per_input_pixel: 1, ..nes },
            input_pixel_aspect_ratio: 4.0 / 7.0,
        },
        SourcePreset { name: "PC Composite 320x240", settings: pc(2), input_pixel_aspect_ratio: 1.0 },
        SourcePreset { name: "PC Composite 320x200", settings: pc(2), input_pixel_aspect_ratio: 5.0 / 6.0 },
        SourcePreset { name: "PC Composite 640x480", settings: pc(4), input_pixel_aspect_ratio: 1.0 },
        SourcePreset { name: "PC Composite 640x400", settings: pc(4), input_pixel_aspect_ratio: 5.0 / 6.0 },
    ]
}

pub fn artifact_presets() -> Vec<Preset<ArtifactSettings>> {
    let clean = ArtifactSettings {
        ghost_visibility: 0.0,
        ghost_spread_scale: 0.0,
        ghost_distance: 0.0,
        noise_strength: 0.0,
        instability_scale: 0.0,
        temporal_artifact_reduction: 1.0,
    };
    let analogue = ArtifactSettings { noise_strength: 0.025, instability_scale: 0.375, ..clean };

    vec![
        Preset { name: "Pristine", settings: clean },
        Preset { name: "Basic Analogue", settings: analogue },
        Preset {
            name: "Basic Analogue (w/temporal artifacts)",
            settings: ArtifactSettings { temporal_artifact_reduction: 0.0, ..analogue },
        },
        Preset {
            name: "Bad Reception",
            settings: ArtifactSettings {
                ghost_visibility: 0.35,
                ghost_spread_scale: 0.90,
                ghost_distance: 3.0,
                noise_strength: 0.20,
                instability_scale: 1.25,
                temporal_artifact_reduction: 0.0,
            },
        },
    ]
}

pub fn screen_presets() -> Vec<Preset<ScreenSettings>> {
    let nothing = ScreenSettings::flat();
    let scanlines = ScreenSettings { phosphor_decay: 0.25, scanline_strength: 0.47, ..nothing };
    let flat_crt = ScreenSettings { shadow_mask_strength: 0.65, diffusion_strength: 0.5, ..scanlines };
    let standard = ScreenSettings {
        horizontal_distortion: 0.35,
        vertical_distortion: 0.25,
        corner_rounding: 0.03,
        ..flat_crt
    };

    vec![
        Preset { name: "Nothing At All", settings: nothing },
        Preset { name: "Scanlines Only", settings: scanlines },
        Preset { name: "Flat CRT", settings: flat_crt },
        Preset { name: "Standard CRT", settings: standard },
        Preset {
            name: "Standard CRT (No Scanlines)",
            settings: ScreenSettings { scanline_strength: 0.0, ..standard },
        },
        Preset {
            name: "Old CRT",
            settings: ScreenSettings {
                horizontal_distortion: 0.30,
                vertical_distortion: 0.40,
                screen_edge_rounding_x: 0.3,
                screen_edge_rounding_y: 0.15,
                corner_rounding: 0.17,
                shadow_mask_scale: 1.2,
                scanline_strength: 0.63,
                ..standard
            },
        },
    ]
}

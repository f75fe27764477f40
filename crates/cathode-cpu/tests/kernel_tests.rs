use cathode_core::passes::{
    ApplyArtifactsConstants, CompositeToSVideoConstants, GenerateSignalConstants, MaskConstants,
    SVideoToYiqConstants, YiqToRgbConstants,
};
use cathode_core::{
    GraphicsDevice, MaskType, PassConstants, SamplerType, ShaderId, ShaderInput, TextureFormat, TextureHandle,
};
use cathode_cpu::CpuDevice;
use image::{Rgba, RgbaImage};

// ── Helpers ──────────────────────────────────────────────────────

const WIDTH: u32 = 16;
const LINES: u32 = 4;
const SIGNAL_WIDTH: u32 = WIDTH * 4;

fn signal_constants(composite: bool) -> GenerateSignalConstants {
    GenerateSignalConstants {
        signal_width: SIGNAL_WIDTH,
        scanline_count: LINES,
        input_width: WIDTH,
        frame_phase: 0.0,
        prev_frame_phase: 0.0,
        phase_increment_per_line: 0.25,
        composite,
        doubled: false,
        chroma_scale: 0.5,
        instability_scale: 0.0,
        noise_seed: 0,
    }
}

fn decode_constants() -> SVideoToYiqConstants {
    SVideoToYiqConstants {
        signal_width: SIGNAL_WIDTH,
        scanline_count: LINES,
        frame_phase: 0.0,
        prev_frame_phase: 0.0,
        phase_increment_per_line: 0.25,
        tint: 0.0,
        saturation: 1.0,
        brightness: 1.0,
        gamma: 1.0,
        sharpness: 0.0,
        black_level: 0.0,
        white_level: 1.0,
        saturation_scale: 0.5,
        temporal_blend: 0.0,
    }
}

fn flat_image(color: [u8; 3]) -> RgbaImage {
    RgbaImage::from_pixel(WIDTH, LINES, Rgba([color[0], color[1], color[2], 255]))
}

fn pass(device: &mut CpuDevice, output: TextureHandle, inputs: &[TextureHandle], constants: PassConstants) {
    let shader = device.create_shader(constants.shader_id()).unwrap();
    let inputs: Vec<ShaderInput> =
        inputs.iter().map(|&t| ShaderInput::new(t, SamplerType::NearestClamp)).collect();
    device.render_quad(&shader, output, &inputs, &constants);
    device.release_shader(shader);
}

/// Encode then decode a flat image entirely through device passes.
fn round_trip(color: [u8; 3], composite: bool) -> RgbaImage {
    let mut device = CpuDevice::new();
    let input = device.upload_image(&flat_image(color));
    let signal = device.create_render_target(SIGNAL_WIDTH, LINES, TextureFormat::Rgba32Float).unwrap();
    let svideo = device.create_render_target(SIGNAL_WIDTH, LINES, TextureFormat::Rgba32Float).unwrap();
    let yiq = device.create_render_target(SIGNAL_WIDTH, LINES, TextureFormat::Rgba32Float).unwrap();
    let rgb = device.create_render_target(SIGNAL_WIDTH, LINES, TextureFormat::Rgba8Unorm).unwrap();

    pass(&mut device, signal, &[input], PassConstants::GenerateSignal(signal_constants(composite)));
    let separated = if composite {
        let constants = CompositeToSVideoConstants { signal_width: SIGNAL_WIDTH, doubled: false };
        pass(&mut device, svideo, &[signal], PassConstants::CompositeToSVideo(constants));
        svideo
    } else {
        signal
    };
    pass(&mut device, yiq, &[separated], PassConstants::SVideoToYiq(decode_constants()));
    let constants = YiqToRgbConstants { signal_width: SIGNAL_WIDTH, scanline_count: LINES };
    pass(&mut device, rgb, &[yiq], PassConstants::YiqToRgb(constants));

    assert_eq!(device.stats().passes_skipped, 0);
    device.read_image(rgb).unwrap()
}

fn max_channel_error(image: &RgbaImage, color: [u8; 3]) -> u8 {
    image
        .pixels()
        .flat_map(|p| (0..3).map(move |c| p.0[c].abs_diff(color[c])))
        .max()
        .unwrap_or(0)
}

// ── 1. Signal round trips ────────────────────────────────────────

#[test]
fn composite_round_trip_of_flat_colors() {
    for color in [[128, 128, 128], [200, 40, 90], [10, 220, 180], [255, 255, 255], [0, 0, 0]] {
        let image = round_trip(color, true);
        assert_eq!(image.width(), SIGNAL_WIDTH);
        assert!(max_channel_error(&image, color) <= 1, "color {color:?}");
    }
}

#[test]
fn svideo_round_trip_of_flat_colors() {
    for color in [[128, 128, 128], [30, 90, 240]] {
        let image = round_trip(color, false);
        assert!(max_channel_error(&image, color) <= 1, "color {color:?}");
    }
}

// ── 2. Artifacts and instability ─────────────────────────────────

fn artifacts(noise_seed: u32) -> Vec<f32> {
    let mut device = CpuDevice::new();
    let input = device.upload_image(&flat_image([100, 100, 100]));
    let signal = device.create_render_target(SIGNAL_WIDTH, LINES, TextureFormat::Rgba32Float).unwrap();
    let noisy = device.create_render_target(SIGNAL_WIDTH, LINES, TextureFormat::Rgba32Float).unwrap();
    pass(&mut device, signal, &[input], PassConstants::GenerateSignal(signal_constants(true)));
    let constants = ApplyArtifactsConstants {
        signal_width: SIGNAL_WIDTH,
        scanline_count: LINES,
        ghost_visibility: 0.0,
        ghost_spread_scale: 0.0,
        ghost_distance: 0.0,
        noise_strength: 0.5,
        noise_seed,
        svideo: false,
    };
    pass(&mut device, noisy, &[signal], PassConstants::ApplyArtifacts(constants));
    device.texture(noisy).unwrap().texels().iter().map(|t| t.x).collect()
}

#[test]
fn noise_is_deterministic_per_seed() {
    assert_eq!(artifacts(7), artifacts(7));
    assert_ne!(artifacts(7), artifacts(8));
}

#[test]
fn noise_stays_within_strength() {
    let clean = 100.0 / 255.0;
    for value in artifacts(3) {
        assert!((value - clean).abs() <= 0.25 + 1e-5);
    }
}

/// Luma of every signal sample of a horizontal gray ramp, line by line.
fn ramp_luma(instability_scale: f32) -> Vec<Vec<f32>> {
    let mut device = CpuDevice::new();
    let ramp = RgbaImage::from_fn(WIDTH, LINES, |x, _| {
        let v = (x * 16) as u8;
        Rgba([v, v, v, 255])
    });
    let input = device.upload_image(&ramp);
    let signal = device.create_render_target(SIGNAL_WIDTH, LINES, TextureFormat::Rgba32Float).unwrap();
    let constants = GenerateSignalConstants { instability_scale, noise_seed: 3, ..signal_constants(false) };
    pass(&mut device, signal, &[input], PassConstants::GenerateSignal(constants));

    let texels = device.texture(signal).unwrap().texels();
    texels.chunks(SIGNAL_WIDTH as usize).map(|line| line.iter().map(|t| t.x).collect()).collect()
}

#[test]
fn stable_signal_repeats_every_line() {
    let lines = ramp_luma(0.0);
    assert!(lines.iter().all(|line| *line == lines[0]));
}

#[test]
fn instability_shifts_lines_independently() {
    let steady = ramp_luma(0.0);
    let shaky = ramp_luma(16.0);
    assert_ne!(shaky, steady);
    assert!(shaky.iter().any(|line| *line != shaky[0]));
    assert_eq!(shaky, ramp_luma(16.0));
}

// ── 3. Masks and misuse ──────────────────────────────────────────

fn mask_tile(mask_type: MaskType) -> RgbaImage {
    let mut device = CpuDevice::new();
    let mask = device.create_render_target(48, 32, TextureFormat::Rgba8Unorm).unwrap();
    let constants = MaskConstants { width: 48, height: 32 };
    pass(&mut device, mask, &[], PassConstants::mask(mask_type, constants));
    assert_eq!(device.stats().passes_skipped, 0);
    device.read_image(mask).unwrap()
}

#[test]
fn every_mask_has_every_primary() {
    for mask_type in [MaskType::SlotMask, MaskType::ShadowMask, MaskType::ApertureGrille] {
        let image = mask_tile(mask_type);
        for channel in 0..3 {
            assert!(image.pixels().any(|p| p.0[channel] == 255), "{mask_type:?} channel {channel}");
        }
        assert!(image.pixels().all(|p| p.0[3] == 255));
    }
}

#[test]
fn masks_differ_in_vertical_structure() {
    let column_is_constant = |image: &RgbaImage, x: u32| (0..32).all(|y| image.get_pixel(x, y) == image.get_pixel(x, 0));

    let grille = mask_tile(MaskType::ApertureGrille);
    assert!((0..48).all(|x| column_is_constant(&grille, x)));

    let slots = mask_tile(MaskType::SlotMask);
    assert!(!(0..48).all(|x| column_is_constant(&slots, x)));

    let dots = mask_tile(MaskType::ShadowMask);
    assert!(!(0..48).all(|x| column_is_constant(&dots, x)));
    assert_ne!(dots, slots);
}

#[test]
fn mismatched_constants_skip_the_pass() {
    let mut device = CpuDevice::new();
    let target = device.create_render_target(4, 4, TextureFormat::Rgba8Unorm).unwrap();
    let shader = device.create_shader(ShaderId::GenerateShadowMask).unwrap();
    device.render_quad(&shader, target, &[], &PassConstants::Copy);
    assert_eq!(device.stats().passes_skipped, 1);
    assert_eq!(device.stats().passes_rendered, 0);
}

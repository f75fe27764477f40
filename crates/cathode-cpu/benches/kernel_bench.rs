use cathode_core::passes::{CompositeToSVideoConstants, GenerateSignalConstants};
use cathode_core::{GraphicsDevice, PassConstants, SamplerType, ShaderId, ShaderInput, TextureFormat};
use cathode_cpu::CpuDevice;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};

const INPUT_WIDTH: u32 = 256;
const LINES: u32 = 240;
// NES timings: 2/3 of a color cycle per pixel.
const SIGNAL_WIDTH: u32 = 683;

fn test_frame() -> RgbaImage {
    RgbaImage::from_fn(INPUT_WIDTH, LINES, |x, y| Rgba([x as u8, y as u8, (x ^ y) as u8, 255]))
}

fn bench_generate_signal(c: &mut Criterion) {
    let mut device = CpuDevice::new();
    let input = device.upload_image(&test_frame());
    let signal = device.create_render_target(SIGNAL_WIDTH, LINES, TextureFormat::Rgba32Float).unwrap();
    let shader = device.create_shader(ShaderId::GenerateSignal).unwrap();
    let constants = PassConstants::GenerateSignal(GenerateSignalConstants {
        signal_width: SIGNAL_WIDTH,
        scanline_count: LINES,
        input_width: INPUT_WIDTH,
        frame_phase: 0.0,
        prev_frame_phase: 2.0 / 3.0,
        phase_increment_per_line: 1.0 / 3.0,
        composite: true,
        doubled: true,
        chroma_scale: 0.5,
        instability_scale: 0.375,
        noise_seed: 1,
    });
    let inputs = [ShaderInput::new(input, SamplerType::LinearClamp)];

    c.bench_function("generate_signal_256x240", |b| {
        b.iter(|| device.render_quad(&shader, signal, black_box(&inputs), &constants));
    });
}

fn bench_composite_to_svideo(c: &mut Criterion) {
    let mut device = CpuDevice::new();
    let signal = device.create_render_target(SIGNAL_WIDTH, LINES, TextureFormat::Rgba32Float).unwrap();
    let svideo = device.create_render_target(SIGNAL_WIDTH, LINES, TextureFormat::Rgba32Float).unwrap();
    let shader = device.create_shader(ShaderId::CompositeToSVideo).unwrap();
    let constants = PassConstants::CompositeToSVideo(CompositeToSVideoConstants {
        signal_width: SIGNAL_WIDTH,
        doubled: true,
    });
    let inputs = [ShaderInput::new(signal, SamplerType::NearestClamp)];

    c.bench_function("composite_to_svideo_683x240", |b| {
        b.iter(|| device.render_quad(&shader, svideo, black_box(&inputs), &constants));
    });
}

criterion_group!(benches, bench_generate_signal, bench_composite_to_svideo);
criterion_main!(benches);

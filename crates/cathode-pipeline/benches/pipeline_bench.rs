use cathode_core::presets::{artifact_presets, screen_presets, source_presets};
use cathode_core::{GraphicsDevice, ScanlineType, SignalType, TextureFormat};
use cathode_cpu::CpuDevice;
use cathode_pipeline::{Pipeline, PipelineConfig};
use criterion::{criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};

fn test_frame(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, (x ^ y) as u8, 255]))
}

fn nes_config(signal_type: SignalType) -> PipelineConfig {
    let source = &source_presets()[0];
    PipelineConfig {
        signal_type,
        input_width: 256,
        input_height: 240,
        output_width: 640,
        output_height: 480,
        source: source.settings,
        artifacts: artifact_presets()[2].settings,
        screen: screen_presets()[3].settings,
        ..PipelineConfig::default()
    }
}

fn bench_frame(c: &mut Criterion, label: &str, config: PipelineConfig) {
    let mut device = CpuDevice::new();
    let mut pipeline = Pipeline::new(&mut device, &config).unwrap();
    let input = device.upload_image(&test_frame(config.input_width, config.input_height));
    let output = device
        .create_render_target(config.output_width, config.output_height, TextureFormat::Rgba8Unorm)
        .unwrap();

    let mut scanline_type = ScanlineType::Odd;
    c.bench_function(label, |b| {
        b.iter(|| {
            pipeline.render(&mut device, input, scanline_type, output);
            scanline_type = scanline_type.flipped();
        });
    });

    pipeline.destroy(&mut device);
}

fn bench_composite_frame(c: &mut Criterion) {
    bench_frame(c, "composite_frame_256x240_to_640x480", nes_config(SignalType::Composite));
}

fn bench_svideo_frame(c: &mut Criterion) {
    bench_frame(c, "svideo_frame_256x240_to_640x480", nes_config(SignalType::SVideo));
}

fn bench_rgb_frame(c: &mut Criterion) {
    bench_frame(c, "rgb_frame_256x240_to_640x480", nes_config(SignalType::Rgb));
}

criterion_group!(benches, bench_composite_frame, bench_svideo_frame, bench_rgb_frame);
criterion_main!(benches);

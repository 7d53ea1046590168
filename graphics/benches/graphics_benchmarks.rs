use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use ngine_graphics::backend::opengl::{GlProfile, RecordingGl, RecordingPresenter};
use ngine_graphics::{
    BufferDescriptor, BufferUsage, ContextDescriptor, DeviceConfig, DummyBackend, GraphicsDevice,
    PixelFormat, PrimitiveType, ShaderProgramDescriptor, ShaderStage, TextureDescriptor,
    VertexLayout, pixel_data_size,
};

const VERTEX: &str = "in vec3 NG_VertexPos;\nin vec2 NG_VertexTexCoord;\nin vec4 NG_VertexColor;\nvoid main() {}";
const FRAGMENT: &str = "uniform sampler2D NGU_TEXTURE[8];\nvoid main() {}";

fn dummy_device() -> GraphicsDevice {
    GraphicsDevice::new(Box::new(DummyBackend::new()), DeviceConfig::default())
}

// ---------------------------------------------------------------------------
// Format math
// ---------------------------------------------------------------------------

fn bench_pixel_data_size(c: &mut Criterion) {
    c.bench_function("pixel_data_size_all_formats", |b| {
        b.iter(|| {
            let total: usize = PixelFormat::ALL
                .iter()
                .map(|format| pixel_data_size(black_box(512), black_box(256), *format))
                .sum();
            black_box(total);
        });
    });
}

// ---------------------------------------------------------------------------
// Binding cache
// ---------------------------------------------------------------------------

fn bench_bind_texture_cached(c: &mut Criterion) {
    let mut device = dummy_device();
    let descriptor = TextureDescriptor::new_2d(4, 4, PixelFormat::UncompressedR8G8B8A8);
    let texture = device.create_texture(&descriptor, Some(&[0; 64])).unwrap();

    c.bench_function("bind_texture_same_unit", |b| {
        b.iter(|| device.bind_texture(black_box(0), &texture));
    });
}

fn bench_sprite_batch_on_gl(c: &mut Criterion) {
    let gl = RecordingGl::new(GlProfile::desktop(3, 3));
    let mut device = GraphicsDevice::from_descriptor(
        &ContextDescriptor::OPENGL_3_3,
        gl.clone(),
        RecordingPresenter::new(1280, 720),
        DeviceConfig::default(),
    )
    .unwrap();

    let layout = Arc::new(VertexLayout::sprite());
    let vertices = device
        .create_buffer(
            &BufferDescriptor::vertex(BufferUsage::Stream, layout.stride(), 4 * 256),
            None,
        )
        .unwrap();
    let array = device
        .create_vertex_array(&vertices, None, layout.clone())
        .unwrap();
    let vs = device.create_shader(ShaderStage::Vertex, VERTEX).unwrap();
    let fs = device.create_shader(ShaderStage::Fragment, FRAGMENT).unwrap();
    let mut program = device
        .create_shader_program(
            &ShaderProgramDescriptor::new(layout.clone()).with_samplers("NGU_TEXTURE", 8),
        )
        .unwrap();
    device.attach_shader(&mut program, &vs);
    device.attach_shader(&mut program, &fs);
    device.link_program(&mut program).unwrap();
    device.use_program(&program);

    let textures: Vec<_> = (0..4)
        .map(|_| {
            device
                .create_texture(
                    &TextureDescriptor::new_2d(2, 2, PixelFormat::UncompressedR8G8B8A8),
                    Some(&[0; 16]),
                )
                .unwrap()
        })
        .collect();
    let batch = vec![0u8; layout.stride() as usize * 4 * 256];

    c.bench_function("sprite_batch_4_textures", |b| {
        b.iter(|| {
            device.write_buffer(&vertices, &batch, 4 * 256);
            device.bind_vertex_array(&array);
            for texture in &textures {
                device.bind_texture(0, texture);
                device.draw_primitives(PrimitiveType::TriangleList, 0, 4 * 256);
            }
            device.present();
            gl.clear_calls();
        });
    });
}

// ---------------------------------------------------------------------------
// Deferred destruction
// ---------------------------------------------------------------------------

fn bench_free_and_present(c: &mut Criterion) {
    let mut device = dummy_device();
    let descriptor = BufferDescriptor::vertex(BufferUsage::Dynamic, 16, 64);

    c.bench_function("free_64_buffers_then_present", |b| {
        b.iter(|| {
            for _ in 0..64 {
                let buffer = device.create_buffer(&descriptor, None).unwrap();
                device.free(buffer);
            }
            device.present();
        });
    });
}

criterion_group!(
    benches,
    bench_pixel_data_size,
    bench_bind_texture_cached,
    bench_sprite_batch_on_gl,
    bench_free_and_present,
);
criterion_main!(benches);

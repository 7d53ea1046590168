//! Common utilities for device integration tests.
//!
//! Devices run either on the headless [`DummyBackend`] or on the OpenGL
//! backend over a [`RecordingGl`], which lets a test assert on the exact GL
//! traffic a sequence of device calls produces.

#![allow(dead_code)]

use std::sync::Arc;

use ngine_graphics::backend::opengl::{GlProfile, RecordingGl, RecordingPresenter};
use ngine_graphics::{
    ContextDescriptor, DeviceConfig, DummyBackend, GraphicsDevice, ShaderProgram,
    ShaderProgramDescriptor, ShaderStage, VertexLayout,
};

pub const SPRITE_VERTEX: &str = "\
in vec3 NG_VertexPos;
in vec2 NG_VertexTexCoord;
in vec4 NG_VertexColor;
uniform mat4 NGU_MATRIX_MVP;
out vec2 fragTexCoord;
out vec4 fragColor;
void main() {
    fragTexCoord = NG_VertexTexCoord;
    fragColor = NG_VertexColor;
    gl_Position = NGU_MATRIX_MVP * vec4(NG_VertexPos, 1.0);
}";

pub const SPRITE_FRAGMENT: &str = "\
in vec2 fragTexCoord;
in vec4 fragColor;
uniform sampler2D NGU_TEXTURE[8];
out vec4 finalColor;
void main() {
    finalColor = texture(NGU_TEXTURE[0], fragTexCoord) * fragColor;
}";

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Device on the headless backend.
pub fn dummy_device() -> GraphicsDevice {
    init_logging();
    GraphicsDevice::new(Box::new(DummyBackend::new()), DeviceConfig::default())
}

/// Device on the OpenGL backend over a recording context.
pub fn recording_device(profile: GlProfile) -> (GraphicsDevice, RecordingGl) {
    init_logging();
    let descriptor = if profile.version.is_embedded {
        ContextDescriptor::new(
            ngine_graphics::ContextType::OpenGLES,
            profile.version.major,
            profile.version.minor,
        )
    } else {
        ContextDescriptor::OPENGL_3_3
    };
    let gl = RecordingGl::new(profile);
    let device = GraphicsDevice::from_descriptor(
        &descriptor,
        gl.clone(),
        RecordingPresenter::new(800, 600),
        DeviceConfig::default(),
    )
    .expect("recording device");
    (device, gl)
}

/// Compile and link the default sprite program.
pub fn sprite_program(device: &mut GraphicsDevice) -> ShaderProgram {
    let vertex = device
        .create_shader(ShaderStage::Vertex, SPRITE_VERTEX)
        .expect("vertex shader");
    let fragment = device
        .create_shader(ShaderStage::Fragment, SPRITE_FRAGMENT)
        .expect("fragment shader");
    let descriptor = ShaderProgramDescriptor::new(Arc::new(VertexLayout::sprite()))
        .with_label("sprite")
        .with_samplers("NGU_TEXTURE", 8);
    let mut program = device
        .create_shader_program(&descriptor)
        .expect("program");
    device.attach_shader(&mut program, &vertex);
    device.attach_shader(&mut program, &fragment);
    device.link_program(&mut program).expect("link");
    device.free(vertex);
    device.free(fragment);
    program
}

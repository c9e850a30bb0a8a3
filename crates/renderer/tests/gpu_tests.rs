//! Headless GPU-resource tests against the recording dummy backend.

use asset::mesh::MeshData;
use asset::texture::TextureData;
use corelib::camera::CameraInput;

use renderer::DummyBackend;
use renderer::backend::dummy::Call;
use renderer::device::BufferTarget;
use renderer::framebuffer::{Framebuffer, PostQuad};
use renderer::model::Model;
use renderer::scene::{SceneDesc, SceneRenderer};
use renderer::shader::ShaderProgram;
use renderer::texture::Texture2d;

const VS: &str = "void main() {}";
const FS: &str = "void main() {}";

fn test_shader(gl: &DummyBackend) -> ShaderProgram {
    ShaderProgram::from_sources(gl, VS, FS).expect("dummy program")
}

#[test]
fn attribute_slots_follow_call_order() {
    let gl = DummyBackend::new();
    let mesh = MeshData::unit_quad();
    let model = Model::from_mesh(&gl, &mesh).expect("upload quad");

    let pointers: Vec<(u32, i32, bool)> = gl
        .calls()
        .iter()
        .filter_map(|call| match call {
            Call::VertexAttribPointer {
                slot,
                components,
                normalized,
            } => Some((*slot, *components, *normalized)),
            _ => None,
        })
        .collect();
    // Positions, tex coords, normals (normalized), in that slot order.
    assert_eq!(pointers, vec![(0, 3, false), (1, 2, false), (2, 3, true)]);

    model.destroy(&gl);
}

#[test]
fn draw_issues_the_full_index_count() {
    let gl = DummyBackend::new();
    let mesh = MeshData::unit_quad();
    let model = Model::from_mesh(&gl, &mesh).expect("upload quad");
    let shader = test_shader(&gl);

    model.bind(&gl, &shader);
    model.draw(&gl);
    model.unbind(&gl);

    assert_eq!(model.index_count(), mesh.indices.len() as i32);
    assert!(
        gl.calls()
            .contains(&Call::DrawIndexedTriangles(mesh.indices.len() as i32))
    );

    model.destroy(&gl);
    shader.destroy(&gl);
}

#[test]
fn replacing_the_index_buffer_releases_the_old_one() {
    let gl = DummyBackend::new();
    let mut model = Model::new(&gl).expect("vao");
    model.set_index_buffer(&gl, &[0, 1, 2]).expect("first upload");

    let first_buffer = gl
        .calls()
        .iter()
        .find_map(|call| match call {
            Call::CreateBuffer(id) => Some(*id),
            _ => None,
        })
        .expect("an index buffer was created");

    model
        .set_index_buffer(&gl, &[0, 1, 2, 2, 1, 0])
        .expect("second upload");
    assert_eq!(model.index_count(), 6);
    assert!(gl.calls().contains(&Call::DeleteBuffer(first_buffer)));

    model.destroy(&gl);
    assert_eq!(gl.live_resources(), 0);
}

#[test]
fn bind_then_unbind_restores_nothing_bound() {
    let gl = DummyBackend::new();
    let mesh = MeshData::unit_quad();
    let mut model = Model::from_mesh(&gl, &mesh).expect("upload quad");
    let texture = Texture2d::from_data(&gl, &TextureData::checkerboard(16), false)
        .expect("upload texture");
    model.attach_texture(&texture);
    let shader = test_shader(&gl);

    model.bind(&gl, &shader);
    let before_unbind = gl.calls().len();
    model.unbind(&gl);

    let tail = gl.calls()[before_unbind..].to_vec();
    assert_eq!(
        tail,
        vec![
            Call::BindTexture {
                unit: 0,
                texture: None
            },
            Call::DisableVertexAttrib(2),
            Call::DisableVertexAttrib(1),
            Call::DisableVertexAttrib(0),
            Call::BindBuffer(BufferTarget::ElementArray, None),
            Call::BindVertexArray(None),
        ]
    );

    model.destroy(&gl);
    texture.destroy(&gl);
    shader.destroy(&gl);
}

#[test]
fn bind_places_textures_on_sequential_units_and_reports_presence() {
    let gl = DummyBackend::new();
    let mesh = MeshData::unit_quad();
    let mut model = Model::from_mesh(&gl, &mesh).expect("upload quad");
    let checker = TextureData::checkerboard(16);
    let first = Texture2d::from_data(&gl, &checker, false).expect("texture");
    let second = Texture2d::from_data(&gl, &checker, true).expect("texture");
    model.attach_texture(&first);
    model.attach_texture(&second);
    let shader = test_shader(&gl);

    let before_bind = gl.calls().len();
    model.bind(&gl, &shader);
    let tail = gl.calls()[before_bind..].to_vec();

    let units: Vec<u32> = tail
        .iter()
        .filter_map(|call| match call {
            Call::BindTexture {
                unit,
                texture: Some(id),
            } => {
                assert!(*id == first.id() || *id == second.id());
                Some(*unit)
            }
            _ => None,
        })
        .collect();
    assert_eq!(units, vec![0, 1]);
    assert!(
        tail.iter()
            .any(|call| matches!(call, Call::SetUniformF32(_, value) if *value == 1.0))
    );

    model.unbind(&gl);
    model.destroy(&gl);
    first.destroy(&gl);
    second.destroy(&gl);
    shader.destroy(&gl);
}

#[test]
fn bind_without_textures_reports_flat_color() {
    let gl = DummyBackend::new();
    let model = Model::from_mesh(&gl, &MeshData::unit_quad()).expect("upload quad");
    let shader = test_shader(&gl);

    model.bind(&gl, &shader);
    assert!(
        gl.calls()
            .iter()
            .any(|call| matches!(call, Call::SetUniformF32(_, value) if *value == 0.0))
    );

    model.unbind(&gl);
    model.destroy(&gl);
    shader.destroy(&gl);
}

#[test]
fn uniform_locations_are_looked_up_once_per_name() {
    let gl = DummyBackend::new();
    let shader = test_shader(&gl);

    shader.set_f32(&gl, "red", 0.25);
    shader.set_f32(&gl, "red", 0.5);
    shader.set_f32(&gl, "red", 0.75);

    let lookups = gl
        .calls()
        .iter()
        .filter(|call| matches!(call, Call::UniformLookup(name) if name == "red"))
        .count();
    assert_eq!(lookups, 1);

    shader.destroy(&gl);
}

#[test]
fn framebuffer_attachments_use_sequential_indices() {
    let gl = DummyBackend::new();
    let mut framebuffer = Framebuffer::new(&gl, 640, 480).expect("framebuffer");
    framebuffer.add_color_attachment(&gl).expect("color 0");
    framebuffer.add_color_attachment(&gl).expect("color 1");
    framebuffer.add_depth_stencil(&gl).expect("depth/stencil");
    assert!(framebuffer.is_complete(&gl));

    let indices: Vec<u32> = gl
        .calls()
        .iter()
        .filter_map(|call| match call {
            Call::AttachColorTexture { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(indices, vec![0, 1]);

    framebuffer.destroy(&gl);
    assert_eq!(gl.live_resources(), 0);
}

#[test]
fn framebuffer_draw_binds_attachments_through_the_quad() {
    let gl = DummyBackend::new();
    let mut framebuffer = Framebuffer::new(&gl, 320, 240).expect("framebuffer");
    framebuffer.add_color_attachment(&gl).expect("color 0");
    let quad = PostQuad::new(&gl).expect("quad");
    let shader = test_shader(&gl);

    let before_draw = gl.calls().len();
    framebuffer.draw(&gl, &quad, &shader);
    let tail = gl.calls()[before_draw..].to_vec();

    let draw_at = tail
        .iter()
        .position(|call| matches!(call, Call::DrawIndexedTriangles(6)))
        .expect("quad drawn");
    let color_bound_at = tail
        .iter()
        .position(|call| matches!(call, Call::BindTexture { unit: 0, texture: Some(_) }))
        .expect("attachment bound");
    assert!(color_bound_at < draw_at);

    quad.destroy(&gl);
    framebuffer.destroy(&gl);
    shader.destroy(&gl);
    assert_eq!(gl.live_resources(), 0);
}

#[test]
fn scene_renderer_frame_and_shutdown_release_everything() {
    let desc = SceneDesc {
        mesh: MeshData::unit_quad(),
        texture: Some(TextureData::checkerboard(16)),
        mipmap: true,
        post_process: true,
        width: 640,
        height: 480,
    };
    let mut scene = SceneRenderer::new(DummyBackend::new(), desc).expect("build scene");

    scene.update(0.016, &CameraInput::default());
    scene.render();

    let gl = scene.shutdown();
    let draws = gl
        .calls()
        .iter()
        .filter(|call| matches!(call, Call::DrawIndexedTriangles(_)))
        .count();
    // One scene pass draw plus the post quad.
    assert_eq!(draws, 2);
    assert_eq!(gl.live_resources(), 0);
}

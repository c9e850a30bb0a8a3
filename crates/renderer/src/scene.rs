//! Frame driver: owns the scene resources and draws one frame at a time.

use asset::mesh::MeshData;
use asset::texture::TextureData;
use corelib::camera::{Camera, CameraInput};
use corelib::transform::Transform;
use corelib::world::{Renderable, World};
use corelib::{Vec3, vec3};

use crate::device::GlApi;
use crate::error::DeviceError;
use crate::framebuffer::{Framebuffer, PostQuad};
use crate::model::Model;
use crate::shader::ShaderProgram;
use crate::texture::Texture2d;

const SCENE_VERT: &str = include_str!("shaders/scene.vert");
const SCENE_FRAG: &str = include_str!("shaders/scene.frag");
const POST_VERT: &str = include_str!("shaders/post.vert");
const POST_FRAG: &str = include_str!("shaders/post.frag");

const CLEAR_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.0];
const FLAT_COLOR: Vec3 = Vec3::new(0.8, 0.3, 0.3);

/// Everything needed to build the initial scene.
pub struct SceneDesc {
    pub mesh: MeshData,
    pub texture: Option<TextureData>,
    pub mipmap: bool,
    pub post_process: bool,
    pub width: u32,
    pub height: u32,
}

struct PostChain {
    framebuffer: Framebuffer,
    quad: PostQuad,
    shader: ShaderProgram,
}

/// The whole drawable scene: shader, models, textures, camera, entities,
/// optional post-processing chain.
pub struct SceneRenderer<G: GlApi> {
    gl: G,
    scene_shader: ShaderProgram,
    models: Vec<Model>,
    textures: Vec<Texture2d>,
    world: World,
    camera: Camera,
    post: Option<PostChain>,
    spin: Vec3,
}

impl<G: GlApi> SceneRenderer<G> {
    pub fn new(gl: G, desc: SceneDesc) -> Result<Self, DeviceError> {
        gl.viewport(desc.width as i32, desc.height as i32);
        gl.enable_depth_test();

        let scene_shader = ShaderProgram::from_sources(&gl, SCENE_VERT, SCENE_FRAG)?;

        let mut model = Model::from_mesh(&gl, &desc.mesh)?;
        let mut textures = Vec::new();
        if let Some(data) = &desc.texture {
            let texture = Texture2d::from_data(&gl, data, desc.mipmap)?;
            model.attach_texture(&texture);
            textures.push(texture);
        }

        let post = if desc.post_process {
            Some(build_post_chain(&gl, desc.width, desc.height)?)
        } else {
            None
        };

        let mut world = World::new();
        world.spawn(
            Transform::from_trs(vec3(0.0, 0.0, -2.5), Vec3::ZERO, Vec3::ONE),
            Some(Renderable { model: 0 }),
        );

        let camera = Camera::new(Vec3::ZERO, desc.width as f32 / desc.height.max(1) as f32);

        Ok(Self {
            gl,
            scene_shader,
            models: vec![model],
            textures,
            world,
            camera,
            post,
            spin: vec3(0.0, 0.6, 0.0),
        })
    }

    /// Advance animation and camera by one frame.
    pub fn update(&mut self, dt: f32, input: &CameraInput) {
        self.world.rotate_all(dt, self.spin);
        self.camera.apply_input(input, dt);
    }

    /// Draw one frame into the current surface.
    pub fn render(&self) {
        let gl = &self.gl;
        match &self.post {
            Some(post) => {
                post.framebuffer.bind_and_clear(gl);
                self.draw_scene();
                post.framebuffer.unbind(gl);

                let [r, g, b, a] = CLEAR_COLOR;
                gl.clear(r, g, b, a);
                post.shader.bind(gl);
                post.shader.set_i32(gl, "screenTexture", 0);
                post.framebuffer.draw(gl, &post.quad, &post.shader);
                post.shader.unbind(gl);
            }
            None => {
                let [r, g, b, a] = CLEAR_COLOR;
                gl.clear(r, g, b, a);
                self.draw_scene();
            }
        }

        if let Some(code) = gl.poll_error() {
            log::warn!("GL error 0x{code:04x} during frame");
        }
    }

    fn draw_scene(&self) {
        let gl = &self.gl;
        self.scene_shader.bind(gl);
        self.scene_shader
            .set_mat4(gl, "projectionMatrix", &self.camera.proj());
        self.scene_shader
            .set_mat4(gl, "viewMatrix", &self.camera.view());
        self.scene_shader.set_i32(gl, "modelTexture", 0);
        self.scene_shader.set_vec3(gl, "flatColor", FLAT_COLOR);

        for (transform, renderable) in self.world.iter_renderables() {
            let Some(model) = self.models.get(renderable.model) else {
                log::warn!("Renderable references missing model slot {}", renderable.model);
                continue;
            };
            self.scene_shader
                .set_mat4(gl, "modelMatrix", &transform.matrix());
            model.bind(gl, &self.scene_shader);
            model.draw(gl);
            model.unbind(gl);
        }

        self.scene_shader.unbind(gl);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gl.viewport(width as i32, height as i32);
        self.camera
            .set_aspect(width as f32 / height.max(1) as f32);
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Release every device resource and hand the device back.
    pub fn shutdown(self) -> G {
        let Self {
            gl,
            scene_shader,
            models,
            textures,
            post,
            ..
        } = self;
        if let Some(post) = post {
            post.quad.destroy(&gl);
            post.shader.destroy(&gl);
            post.framebuffer.destroy(&gl);
        }
        for model in models {
            model.destroy(&gl);
        }
        for texture in textures {
            texture.destroy(&gl);
        }
        scene_shader.destroy(&gl);
        gl
    }
}

fn build_post_chain<G: GlApi>(
    gl: &G,
    width: u32,
    height: u32,
) -> Result<PostChain, DeviceError> {
    let mut framebuffer = Framebuffer::new(gl, width, height)?;
    framebuffer.add_color_attachment(gl)?;
    framebuffer.add_depth_stencil(gl)?;
    if !framebuffer.is_complete(gl) {
        framebuffer.destroy(gl);
        return Err(DeviceError::ResourceAllocation("complete framebuffer"));
    }
    let quad = PostQuad::new(gl)?;
    let shader = match ShaderProgram::from_sources(gl, POST_VERT, POST_FRAG) {
        Ok(shader) => shader,
        Err(err) => {
            quad.destroy(gl);
            framebuffer.destroy(gl);
            return Err(err);
        }
    };
    Ok(PostChain {
        framebuffer,
        quad,
        shader,
    })
}

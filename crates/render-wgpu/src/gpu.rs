use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use lantern_assets::{AssetId, ModelData};
use lantern_render::{RenderSettings, RenderView, Renderer};
use lantern_scene::{Geometry, SceneGraph};
use std::collections::HashMap;
use wgpu::util::DeviceExt;

const MAX_INSTANCES: u32 = 10_000;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    sky_color: [f32; 4],
    ground_color: [f32; 4],
    sun_color: [f32; 4],
    sun_dir: [f32; 4],
    fog_color: [f32; 4],
    fog_range: [f32; 4],
}

impl Uniforms {
    fn new(settings: &RenderSettings, view: &RenderView, aspect: f32) -> Self {
        let rgb_w = |c: lantern_common::Color, w: f32| [c.r, c.g, c.b, w];
        Self {
            view_proj: view.view_projection(aspect).to_cols_array_2d(),
            camera_pos: view.eye.extend(1.0).to_array(),
            sky_color: rgb_w(settings.hemisphere.sky, settings.hemisphere.intensity),
            ground_color: rgb_w(settings.hemisphere.ground, 1.0),
            sun_color: rgb_w(settings.sun.color, settings.sun.intensity),
            sun_dir: settings.sun.direction.extend(0.0).to_array(),
            fog_color: rgb_w(settings.fog.color, 1.0),
            fog_range: [settings.fog.near, settings.fog.far, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: [f32; 4]) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color,
        }
    }
}

/// Counts from one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub cubes: u32,
    pub meshes: u32,
    pub triangles: u64,
    /// Instances dropped because the instance buffer was full.
    pub skipped: u32,
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    base_color: [f32; 4],
}

/// One mesh draw: which cached mesh, and which instance slot holds its transform.
struct MeshDraw {
    asset: AssetId,
    mesh: usize,
    instance: u32,
}

/// Generate unit cube vertices and indices.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

/// Interleave a model mesh's positions and normals.
fn mesh_vertices(positions: &[[f32; 3]], normals: &[[f32; 3]]) -> Vec<Vertex> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
        })
        .collect()
}

fn modulate(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    [a[0] * b[0], a[1] * b[1], a[2] * b[2], a[3] * b[3]]
}

/// wgpu scene renderer: lit, fogged cubes and model meshes.
pub struct WgpuRenderer {
    settings: RenderSettings,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    instance_buffer: wgpu::Buffer,
    meshes: HashMap<AssetId, Vec<GpuMesh>>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        settings: RenderSettings,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::new(&settings, &RenderView::default(), 1.0)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // Imported meshes come with either winding.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let (cube_verts, cube_indices) = cube_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let cube_index_count = cube_indices.len() as u32;

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (MAX_INSTANCES as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            settings,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count,
            instance_buffer,
            meshes: HashMap::new(),
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Models with buffers resident on the GPU.
    pub fn cached_models(&self) -> usize {
        self.meshes.len()
    }

    /// Bind this renderer to one surface texture so it can serve as a
    /// [`Renderer`] for a single frame.
    pub fn frame<'a>(
        &'a mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        target: &'a wgpu::TextureView,
        aspect: f32,
    ) -> GpuFrame<'a> {
        GpuFrame {
            renderer: self,
            device,
            queue,
            target,
            aspect,
        }
    }

    /// Upload a model's meshes once; later frames reuse them.
    fn ensure_model(&mut self, device: &wgpu::Device, model: &ModelData) {
        if self.meshes.contains_key(&model.id) {
            return;
        }

        let meshes: Vec<GpuMesh> = model
            .meshes
            .iter()
            .filter(|m| !m.indices.is_empty())
            .map(|m| {
                let vertices = mesh_vertices(&m.positions, &m.normals);
                GpuMesh {
                    vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{}_vertices", m.name)),
                        contents: bytemuck::cast_slice(&vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                    index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{}_indices", m.name)),
                        contents: bytemuck::cast_slice(&m.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                    index_count: m.indices.len() as u32,
                    base_color: m.base_color,
                }
            })
            .collect();

        tracing::info!(
            id = model.id.0,
            name = %model.name,
            meshes = meshes.len(),
            "model uploaded to GPU"
        );
        self.meshes.insert(model.id, meshes);
    }

    /// Render one frame of `scene` into `target`.
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        aspect: f32,
        scene: &SceneGraph,
        view: &RenderView,
    ) -> DrawStats {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::new(&self.settings, view, aspect)),
        );

        let mut stats = DrawStats::default();

        // Cubes occupy the first instance slots so one instanced draw covers them.
        let mut instances: Vec<InstanceData> = Vec::new();
        for node in scene.visible() {
            if let Geometry::Box = node.geometry {
                if instances.len() >= MAX_INSTANCES as usize {
                    stats.skipped += 1;
                    continue;
                }
                instances.push(InstanceData::new(
                    node.transform.matrix(),
                    node.material.to_array(),
                ));
            }
        }
        stats.cubes = instances.len() as u32;

        let mut draws: Vec<MeshDraw> = Vec::new();
        for node in scene.visible() {
            let Geometry::Model(model) = &node.geometry else {
                continue;
            };
            self.ensure_model(device, model);
            let Some(meshes) = self.meshes.get(&model.id) else {
                continue;
            };
            for (i, mesh) in meshes.iter().enumerate() {
                if instances.len() >= MAX_INSTANCES as usize {
                    stats.skipped += 1;
                    continue;
                }
                draws.push(MeshDraw {
                    asset: model.id,
                    mesh: i,
                    instance: instances.len() as u32,
                });
                instances.push(InstanceData::new(
                    node.transform.matrix(),
                    modulate(node.material.to_array(), mesh.base_color),
                ));
                stats.triangles += u64::from(mesh.index_count / 3);
            }
        }
        stats.meshes = draws.len() as u32;
        stats.triangles += u64::from(stats.cubes) * u64::from(self.cube_index_count / 3);

        if stats.skipped > 0 {
            tracing::warn!(skipped = stats.skipped, "instance buffer full");
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let bg = self.settings.background;
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.r as f64,
                            g: bg.g as f64,
                            b: bg.b as f64,
                            a: bg.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            if stats.cubes > 0 {
                pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
                pass.set_index_buffer(self.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.cube_index_count, 0, 0..stats.cubes);
            }

            for draw in &draws {
                let Some(mesh) = self.meshes.get(&draw.asset).and_then(|m| m.get(draw.mesh)) else {
                    continue;
                };
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, draw.instance..draw.instance + 1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        stats
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// A [`WgpuRenderer`] bound to one surface texture.
pub struct GpuFrame<'a> {
    renderer: &'a mut WgpuRenderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    target: &'a wgpu::TextureView,
    aspect: f32,
}

impl Renderer for GpuFrame<'_> {
    type Output = DrawStats;

    fn render(&mut self, scene: &SceneGraph, view: &RenderView) -> DrawStats {
        self.renderer
            .draw(self.device, self.queue, self.target, self.aspect, scene, view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn uniform_layout_is_std140_friendly() {
        // mat4 + 7 vec4
        assert_eq!(std::mem::size_of::<Uniforms>(), 64 + 7 * 16);
        assert_eq!(std::mem::size_of::<InstanceData>(), 5 * 16);
    }

    #[test]
    fn uniforms_carry_settings() {
        let settings = RenderSettings::default();
        let view = RenderView::default();
        let u = Uniforms::new(&settings, &view, 16.0 / 9.0);
        assert_eq!(u.sky_color[3], settings.hemisphere.intensity);
        assert_eq!(u.sun_color[3], settings.sun.intensity);
        assert_eq!(u.fog_range[0], settings.fog.near);
        assert_eq!(u.fog_range[1], settings.fog.far);
        assert_eq!(Vec3::from_slice(&u.camera_pos[..3]), view.eye);
    }

    #[test]
    fn cube_is_closed() {
        let (verts, indices) = cube_mesh();
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < verts.len()));
    }

    #[test]
    fn missing_normals_default_up() {
        let v = mesh_vertices(&[[0.0; 3], [1.0, 0.0, 0.0]], &[[0.0, 0.0, 1.0]]);
        assert_eq!(v[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(v[1].normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn material_modulates_base_color() {
        assert_eq!(
            modulate([0.5, 1.0, 1.0, 1.0], [1.0, 0.5, 0.0, 1.0]),
            [0.5, 0.5, 0.0, 1.0]
        );
    }
}

use bytemuck::{Pod, Zeroable};
use glam::Mat3;
use sierpinski_geometry::{IndexedMesh, MeshBuffers};
use sierpinski_render::{DrawCommand, FramePlan, MeshId};
use wgpu::util::DeviceExt;

use crate::shaders;

/// Clear color, the same tone as the fog's ground color.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.173,
    g: 0.180,
    b: 0.301,
    a: 1.0,
};

/// The plan never holds more than primary + ornament + cube.
const MAX_DRAWS: u64 = 3;

/// Stride between per-draw uniform slots; wgpu's minimum dynamic offset
/// alignment.
const UNIFORM_STRIDE: u64 = 256;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    projection: [[f32; 4]; 4],
    model_view: [[f32; 4]; 4],
    // mat3x3 columns are 16-byte aligned in WGSL uniform layout.
    normal_matrix: [[f32; 4]; 3],
    ambient_color: [f32; 3],
    _pad0: f32,
    light_position: [f32; 3],
    _pad1: f32,
    light_color: [f32; 3],
    _pad2: f32,
    viewport: [f32; 2],
    _pad3: [f32; 2],
}

impl Uniforms {
    fn for_draw(plan: &FramePlan, draw: &DrawCommand) -> Self {
        Self {
            projection: plan.projection.to_cols_array_2d(),
            model_view: draw.model_view.to_cols_array_2d(),
            normal_matrix: pad_mat3(draw.normal_matrix),
            ambient_color: plan.ambient_color.to_array(),
            _pad0: 0.0,
            light_position: plan.light_position.to_array(),
            _pad1: 0.0,
            light_color: plan.light_color.to_array(),
            _pad2: 0.0,
            viewport: plan.viewport.to_array(),
            _pad3: [0.0; 2],
        }
    }
}

fn pad_mat3(m: Mat3) -> [[f32; 4]; 3] {
    [
        [m.x_axis.x, m.x_axis.y, m.x_axis.z, 0.0],
        [m.y_axis.x, m.y_axis.y, m.y_axis.z, 0.0],
        [m.z_axis.x, m.z_axis.y, m.z_axis.z, 0.0],
    ]
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    color: [f32; 4],
}

/// Interleave the generator's parallel arrays into one vertex stream.
fn interleave(positions: &[f32], normals: &[f32], colors: &[f32]) -> Vec<Vertex> {
    let count = positions.len() / 3;
    debug_assert_eq!(count, normals.len() / 3);
    debug_assert_eq!(count, colors.len() / 4);

    (0..count)
        .map(|i| Vertex {
            position: [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]],
            normal: [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
            color: [
                colors[i * 4],
                colors[i * 4 + 1],
                colors[i * 4 + 2],
                colors[i * 4 + 3],
            ],
        })
        .collect()
}

struct FractalMesh {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

struct CubeMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// wgpu renderer for the pyramid scene: one pipeline, one dynamic-offset
/// uniform slot per draw.
pub struct PyramidRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    fractal: FractalMesh,
    cube: CubeMesh,
    depth_texture: wgpu::TextureView,
}

impl PyramidRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        fractal: &MeshBuffers,
        cube: &IndexedMesh,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: MAX_DRAWS * UNIFORM_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
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
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(UNIFORM_STRIDE),
                }),
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
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x4,
                    ],
                }],
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
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // The shader lights both sides, so no culling.
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

        let fractal = Self::upload_fractal(device, fractal);

        let cube_vertices = interleave(&cube.positions, &cube.normals, &cube.colors);
        let cube = CubeMesh {
            vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("cube_vertex_buffer"),
                contents: bytemuck::cast_slice(&cube_vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("cube_index_buffer"),
                contents: bytemuck::cast_slice(&cube.indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: cube.indices.len() as u32,
        };

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            fractal,
            cube,
            depth_texture,
        }
    }

    fn upload_fractal(device: &wgpu::Device, mesh: &MeshBuffers) -> FractalMesh {
        let vertices = interleave(&mesh.positions, &mesh.normals, &mesh.colors);
        FractalMesh {
            vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("fractal_vertex_buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            vertex_count: vertices.len() as u32,
        }
    }

    /// Swap in a regenerated fractal mesh. The old buffer is dropped
    /// here; wgpu keeps it alive for any draw already submitted.
    pub fn replace_fractal(&mut self, device: &wgpu::Device, mesh: &MeshBuffers) {
        self.fractal = Self::upload_fractal(device, mesh);
        tracing::debug!(
            triangles = mesh.triangle_count(),
            "fractal vertex buffer replaced"
        );
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one composed frame plan.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        plan: &FramePlan,
    ) {
        for (i, draw) in plan.draws.iter().take(MAX_DRAWS as usize).enumerate() {
            queue.write_buffer(
                &self.uniform_buffer,
                i as u64 * UNIFORM_STRIDE,
                bytemuck::bytes_of(&Uniforms::for_draw(plan, draw)),
            );
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
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
            for (i, draw) in plan.draws.iter().take(MAX_DRAWS as usize).enumerate() {
                let offset = (i as u64 * UNIFORM_STRIDE) as u32;
                pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                match draw.mesh {
                    MeshId::Fractal => {
                        pass.set_vertex_buffer(0, self.fractal.vertex_buffer.slice(..));
                        pass.draw(0..self.fractal.vertex_count, 0..1);
                    }
                    MeshId::LightMarker => {
                        pass.set_vertex_buffer(0, self.cube.vertex_buffer.slice(..));
                        pass.set_index_buffer(
                            self.cube.index_buffer.slice(..),
                            wgpu::IndexFormat::Uint16,
                        );
                        pass.draw_indexed(0..self.cube.index_count, 0, 0..1);
                    }
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
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

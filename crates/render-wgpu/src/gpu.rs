use crate::shaders;
use bytemuck::{Pod, Zeroable};
use coverring_assets::CoverImage;
use coverring_kernel::SceneState;
use coverring_render::EyeView;
use glam::Mat4;
use wgpu::util::DeviceExt;

/// Brightness of covers outside the current row.
const DIM_TINT: [f32; 4] = [0.7, 0.7, 0.7, 1.0];
const FULL_TINT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    tint: [f32; 4],
    layer: u32,
    _pad: [u32; 3],
}

/// Box of edge 2 with every face mapped to the full cover image.
fn cover_box_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 1.0_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], uv: [0.0, 1.0] },
        Vertex { position: [ p, -p,  p], uv: [1.0, 1.0] },
        Vertex { position: [ p,  p,  p], uv: [1.0, 0.0] },
        Vertex { position: [-p,  p,  p], uv: [0.0, 0.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], uv: [0.0, 1.0] },
        Vertex { position: [-p, -p, -p], uv: [1.0, 1.0] },
        Vertex { position: [-p,  p, -p], uv: [1.0, 0.0] },
        Vertex { position: [ p,  p, -p], uv: [0.0, 0.0] },
        // +X face
        Vertex { position: [ p, -p,  p], uv: [0.0, 1.0] },
        Vertex { position: [ p, -p, -p], uv: [1.0, 1.0] },
        Vertex { position: [ p,  p, -p], uv: [1.0, 0.0] },
        Vertex { position: [ p,  p,  p], uv: [0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], uv: [0.0, 1.0] },
        Vertex { position: [-p, -p,  p], uv: [1.0, 1.0] },
        Vertex { position: [-p,  p,  p], uv: [1.0, 0.0] },
        Vertex { position: [-p,  p, -p], uv: [0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], uv: [0.0, 1.0] },
        Vertex { position: [ p,  p,  p], uv: [1.0, 1.0] },
        Vertex { position: [ p,  p, -p], uv: [1.0, 0.0] },
        Vertex { position: [-p,  p, -p], uv: [0.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], uv: [0.0, 1.0] },
        Vertex { position: [ p, -p, -p], uv: [1.0, 1.0] },
        Vertex { position: [ p, -p,  p], uv: [1.0, 0.0] },
        Vertex { position: [-p, -p,  p], uv: [0.0, 0.0] },
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

/// Per-cover instance data in row-major order. Layer `i` holds cover `i`,
/// wrapping when there are more covers than layers.
fn build_instances(scene: &SceneState, layer_count: u32, max: usize) -> Vec<InstanceData> {
    let current = scene.current_row();
    scene
        .rows()
        .iter()
        .enumerate()
        .flat_map(|(row, covers)| covers.iter().map(move |cover| (row, cover)))
        .take(max)
        .enumerate()
        .map(|(i, (row, cover))| {
            let t = &cover.transform;
            let model = Mat4::from_scale_rotation_translation(t.scale, t.rotation, t.position);
            let cols = model.to_cols_array_2d();
            InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
                tint: if row == current { FULL_TINT } else { DIM_TINT },
                layer: i as u32 % layer_count.max(1),
                _pad: [0; 3],
            }
        })
        .collect()
}

struct EyeBinding {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// wgpu-based cover renderer.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    eyes: [EyeBinding; 2],
    texture_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    layer_count: u32,
    depth_texture: wgpu::TextureView,
}

impl WgpuRenderer {
    /// Build the pipeline and upload `covers` into the texture array, one
    /// layer per cover in scene order.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        covers: &[CoverImage],
    ) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let eyes = ["left", "right"].map(|eye| {
            let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{eye}_uniform_buffer")),
                contents: bytemuck::bytes_of(&Uniforms {
                    view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                }),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{eye}_uniform_bind_group")),
                layout: &uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
            EyeBinding {
                uniform_buffer,
                bind_group,
            }
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cover_texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let max_layers = device.limits().max_texture_array_layers;
        let (cover_view, layer_count) = Self::upload_covers(device, queue, covers, max_layers);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("cover_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cover_texture_bind_group"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&cover_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cover_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::COVER_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cover_pipeline"),
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
                            1 => Float32x2,
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
                            7 => Uint32,
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
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
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

        let (box_verts, box_indices) = cover_box_mesh();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cover_vertex_buffer"),
            contents: bytemuck::cast_slice(&box_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cover_index_buffer"),
            contents: bytemuck::cast_slice(&box_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let index_count = box_indices.len() as u32;

        // The ring never gains covers after setup.
        let max_instances = (covers.len() as u32).max(1);
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::info!(
            "cover renderer ready: {} covers in {} texture layers",
            covers.len(),
            layer_count
        );

        Self {
            pipeline,
            eyes,
            texture_bind_group,
            vertex_buffer,
            index_buffer,
            index_count,
            instance_buffer,
            max_instances,
            layer_count,
            depth_texture,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame: every cover, once per eye viewport.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        eyes: &[EyeView],
        scene: &SceneState,
    ) {
        for (binding, eye) in self.eyes.iter().zip(eyes) {
            queue.write_buffer(
                &binding.uniform_buffer,
                0,
                bytemuck::bytes_of(&Uniforms {
                    view_proj: eye.view_proj.to_cols_array_2d(),
                }),
            );
        }

        let instances = build_instances(scene, self.layer_count, self.max_instances as usize);
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cover_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.03,
                            a: 1.0,
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

            if !instances.is_empty() {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(1, &self.texture_bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

                for (binding, eye) in self.eyes.iter().zip(eyes) {
                    let vp = eye.viewport;
                    pass.set_viewport(vp.x, vp.y, vp.width, vp.height, 0.0, 1.0);
                    pass.set_bind_group(0, &binding.bind_group, &[]);
                    pass.draw_indexed(0..self.index_count, 0, 0..instances.len() as u32);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Create the cover texture array and write each cover into its layer.
    fn upload_covers(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        covers: &[CoverImage],
        max_layers: u32,
    ) -> (wgpu::TextureView, u32) {
        let (width, height) = covers
            .first()
            .map(|c| (c.width, c.height))
            .unwrap_or((1, 1));
        let wanted = (covers.len() as u32).max(1);
        let layer_count = wanted.min(max_layers.max(1));
        if layer_count < wanted {
            tracing::warn!(
                "{wanted} covers exceed the {layer_count} texture layers available; covers will repeat"
            );
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cover_texture_array"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: layer_count,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, cover) in covers.iter().take(layer_count as usize).enumerate() {
            if (cover.width, cover.height) != (width, height) {
                tracing::warn!(
                    "cover {} is {}x{}, expected {width}x{height}; layer left blank",
                    cover.key,
                    cover.width,
                    cover.height
                );
                continue;
            }
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                &cover.rgba,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("cover_texture_array_view"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });
        (view, layer_count)
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

#[cfg(test)]
mod tests {
    use super::*;
    use coverring_kernel::{LayoutConfig, SceneBuilder};
    use glam::Vec3;

    #[test]
    fn box_mesh_is_closed() {
        let (verts, indices) = cover_box_mesh();
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < verts.len()));
        assert!(verts
            .iter()
            .all(|v| v.uv.iter().all(|c| (0.0..=1.0).contains(c))));
    }

    #[test]
    fn box_faces_wind_outward() {
        let (verts, indices) = cover_box_mesh();
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(verts[i as usize].position));
            let normal = (b - a).cross(c - a);
            let centre = (a + b + c) / 3.0;
            assert!(normal.dot(centre) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn instance_layout_matches_vertex_attributes() {
        // 5 vec4 attributes, one u32 layer, padded to 16 bytes.
        assert_eq!(std::mem::size_of::<InstanceData>(), 96);
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
    }

    #[test]
    fn instances_follow_scene_order_and_highlight_cursor_row() {
        let scene = SceneBuilder::build(&LayoutConfig {
            total_objects: 30,
            ..LayoutConfig::default()
        });
        let instances = build_instances(&scene, 256, 1000);
        assert_eq!(instances.len(), 30);
        assert_eq!(instances[13].layer, 13);

        // Three rows; the cursor starts on row 1.
        assert_eq!(instances[0].tint, DIM_TINT);
        assert_eq!(instances[12].tint, FULL_TINT);
        assert_eq!(instances[24].tint, DIM_TINT);

        let first = scene.cover(0, 0).unwrap().transform.position;
        assert_eq!(instances[0].model_3, [first.x, first.y, first.z, 1.0]);
    }

    #[test]
    fn instances_wrap_layers_and_respect_capacity() {
        let scene = SceneBuilder::build(&LayoutConfig::default());
        let instances = build_instances(&scene, 100, 110);
        assert_eq!(instances.len(), 110);
        assert_eq!(instances[105].layer, 5);
    }
}

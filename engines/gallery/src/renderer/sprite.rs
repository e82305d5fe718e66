use std::{
    borrow::Cow,
    mem::{offset_of, size_of},
};

use glam::{Vec2, Vec3, Vec4};
use lib_geometry::{Camera, Projection};
use wgpu::{util::DeviceExt, PipelineCompilationOptions, Queue, RenderPass, TextureFormat};

use super::DepthTexture;
use crate::RenderState;

/// Sprites plus the hover label marker all fit comfortably in here.
const MAX_INSTANCES: usize = 16;

/// One camera-facing quad, expanded in the vertex shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct SpriteInstance {
    pub(crate) center: [f32; 4],
    pub(crate) half_extents: [f32; 2],
    pub(crate) _padding: [f32; 2],
    pub(crate) color: [f32; 4],
}

impl SpriteInstance {
    pub(crate) fn new(center: Vec3, half_extents: Vec2, color: Vec4) -> Self {
        Self {
            center: center.extend(1.0).to_array(),
            half_extents: half_extents.to_array(),
            _padding: [0.0; 2],
            color: color.to_array(),
        }
    }
}

/// Matches `SpriteCamera` in `sprite.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    view_projection: [f32; 16],
    right: [f32; 4],
    up: [f32; 4],
}

pub(super) struct SpriteRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    camera_buf: wgpu::Buffer,
    instance_buf: wgpu::Buffer,
}

impl SpriteRenderer {
    #[must_use]
    pub(super) fn new(device: &wgpu::Device, view_format: TextureFormat) -> Self {
        let instance_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite instance buffer"),
            size: (MAX_INSTANCES * size_of::<SpriteInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprite camera uniform buffer"),
            contents: &[0_u8; size_of::<CameraUniform>()],
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = Self::create_bind_group_layout(device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: None,
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buf.as_entire_binding(),
            }],
            label: None,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: None,
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "../../shaders/sprite.wgsl"
            ))),
        });

        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: size_of::<SpriteInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: offset_of!(SpriteInstance, center) as u64,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: offset_of!(SpriteInstance, half_extents) as u64,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: offset_of!(SpriteInstance, color) as u64,
                    shader_location: 2,
                },
            ],
        }];

        let pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            &vertex_buffers,
            view_format,
        );

        Self {
            pipeline,
            bind_group,
            camera_buf,
            instance_buf,
        }
    }

    pub(super) fn render<'pipeline>(
        &'pipeline mut self,
        queue: &Queue,
        render_pass: &mut RenderPass<'pipeline>,
        state: &RenderState,
        projection: &Projection,
    ) {
        let instances = &state.sprite_instances[..state.sprite_instances.len().min(MAX_INSTANCES)];
        if instances.is_empty() {
            return;
        }
        queue.write_buffer(&self.instance_buf, 0, bytemuck::cast_slice(instances));
        self.update_camera(projection, &state.camera, queue);

        let instance_count =
            u32::try_from(instances.len()).expect("instance count is bounded by MAX_INSTANCES");

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.instance_buf.slice(..));
        render_pass.draw(0..4, 0..instance_count);
    }

    fn update_camera(&self, projection: &Projection, camera: &Camera, queue: &Queue) {
        let view_projection = projection.matrix() * camera.matrix();
        let uniform = CameraUniform {
            view_projection: view_projection.to_cols_array(),
            right: camera.right().extend(0.0).to_array(),
            up: camera.billboard_up().extend(0.0).to_array(),
        };
        queue.write_buffer(&self.camera_buf, 0, bytemuck::bytes_of(&uniform));
    }

    fn create_pipeline(
        device: &wgpu::Device,
        pipeline_layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        vertex_buffers: &[wgpu::VertexBufferLayout<'_>],
        view_format: TextureFormat,
    ) -> wgpu::RenderPipeline {
        let vertex = wgpu::VertexState {
            module: shader,
            entry_point: "vs_sprite",
            compilation_options: PipelineCompilationOptions::default(),
            buffers: vertex_buffers,
        };

        let fragment_state = wgpu::FragmentState {
            module: shader,
            entry_point: "fs_sprite",
            compilation_options: PipelineCompilationOptions::default(),
            targets: &[Some(view_format.into())],
        };

        let primitive = wgpu::PrimitiveState {
            cull_mode: None,
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            ..Default::default()
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: None,
            layout: Some(pipeline_layout),
            vertex,
            fragment: Some(fragment_state),
            primitive,
            depth_stencil: Some(DepthTexture::depth_stencil_state()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: None,
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        size_of::<CameraUniform>() as u64
                    ),
                },
                count: None,
            }],
        })
    }
}

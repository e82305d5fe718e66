use std::{borrow::Cow, mem::size_of};

use glam::{Mat4, Vec4};
use lib_geometry::{Camera, Projection};
use wgpu::{self, util::DeviceExt};

use crate::model::{Mesh, ModelData};

/// Draws one uploaded model with a world/camera/projection matrix set, a
/// color uniform and an optional generated texture layer.
pub struct Renderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buf: wgpu::Buffer,
    index_buf: wgpu::Buffer,
    index_count: u32,
    bind_group: wgpu::BindGroup,
    world_matrix_buf: wgpu::Buffer,
    camera_matrix_buf: wgpu::Buffer,
    projection_matrix_buf: wgpu::Buffer,
    color_buf: wgpu::Buffer,
    layer_buf: wgpu::Buffer,
}

impl Renderer {
    #[expect(
        clippy::too_many_lines,
        reason = "TODO partition this function into smaller parts"
    )]
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view_format: wgpu::TextureFormat,
        shader_source: Cow<'_, str>,
        depth_stencil_state: wgpu::DepthStencilState,
        model: &ModelData,
        label: &str,
    ) -> Self {
        let Mesh {
            vertex_buffer,
            index_buffer,
            index_count,
        } = Mesh::upload(model, device, label);

        // Create pipeline layout
        let matrix_binding_type = wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(64),
        };

        let bind_group_layout_descriptor = wgpu::BindGroupLayoutDescriptor {
            label: None,
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: matrix_binding_type,
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: matrix_binding_type,
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: matrix_binding_type,
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        sample_type: wgpu::TextureSampleType::Uint,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(4 * 4),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(4 * 4),
                    },
                    count: None,
                },
            ],
        };
        let bind_group_layout = device.create_bind_group_layout(&bind_group_layout_descriptor);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: None,
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let texture_view = Self::create_texture_view(device, queue);

        let uniform = |label, contents| wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        };

        let uniform_matrix = |label| uniform(label, &[0_u8; size_of::<[f32; 16]>()]);
        let uniform_vec = |label| uniform(label, &[0_u8; size_of::<[f32; 4]>()]);

        let world_matrix_buf =
            device.create_buffer_init(&uniform_matrix("world matrix uniform buffer"));
        let camera_matrix_buf =
            device.create_buffer_init(&uniform_matrix("camera matrix uniform buffer"));
        let projection_matrix_buf =
            device.create_buffer_init(&uniform_matrix("projection matrix uniform buffer"));
        let color_buf = device.create_buffer_init(&uniform_vec("color uniform buffer"));
        let layer_buf = device.create_buffer_init(&uniform_vec("texture layer uniform buffer"));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: world_matrix_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: camera_matrix_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: projection_matrix_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: color_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: layer_buf.as_entire_binding(),
                },
            ],
            label: None,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: None,
            source: wgpu::ShaderSource::Wgsl(shader_source),
        });

        let pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            &[crate::Vertex::buffer_layout()],
            view_format,
            depth_stencil_state,
        );

        Self {
            pipeline,
            vertex_buf: vertex_buffer,
            index_buf: index_buffer,
            index_count,
            bind_group,
            world_matrix_buf,
            camera_matrix_buf,
            projection_matrix_buf,
            color_buf,
            layer_buf,
        }
    }

    pub fn render<'pipeline>(
        &'pipeline mut self,
        queue: &wgpu::Queue,
        render_pass: &mut wgpu::RenderPass<'pipeline>,
        world_matrix: Mat4,
        camera: &Camera,
        projection: &Projection,
        color: Vec4,
        textured: bool,
    ) {
        self.update_color(color, textured, queue);
        self.update_matrices(projection, camera, queue, world_matrix);

        render_pass.push_debug_group("Prepare data for draw.");
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_index_buffer(self.index_buf.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.set_vertex_buffer(0, self.vertex_buf.slice(..));
        render_pass.pop_debug_group();
        render_pass.insert_debug_marker("Draw!");
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    fn update_matrices(
        &self,
        projection: &Projection,
        camera: &Camera,
        queue: &wgpu::Queue,
        world_matrix: Mat4,
    ) {
        queue.write_buffer(
            &self.world_matrix_buf,
            0,
            bytemuck::cast_slice(world_matrix.as_ref()),
        );

        let camera_matrix = camera.matrix();
        queue.write_buffer(
            &self.camera_matrix_buf,
            0,
            bytemuck::cast_slice(camera_matrix.as_ref()),
        );

        let projection_matrix = projection.matrix();
        queue.write_buffer(
            &self.projection_matrix_buf,
            0,
            bytemuck::cast_slice(projection_matrix.as_ref()),
        );
    }

    fn update_color(&self, color: Vec4, textured: bool, queue: &wgpu::Queue) {
        queue.write_buffer(&self.color_buf, 0, bytemuck::cast_slice(color.as_ref()));
        let layer = [u32::from(textured), 0, 0, 0];
        queue.write_buffer(&self.layer_buf, 0, bytemuck::cast_slice(&layer));
    }

    fn create_pipeline(
        device: &wgpu::Device,
        pipeline_layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        vertex_buffers: &[wgpu::VertexBufferLayout<'_>; 1],
        view_format: wgpu::TextureFormat,
        depth_stencil_state: wgpu::DepthStencilState,
    ) -> wgpu::RenderPipeline {
        let vertex = wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: vertex_buffers,
        };

        let fragment_state = wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(view_format.into())],
        };

        let primitive = wgpu::PrimitiveState {
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: None,
            layout: Some(pipeline_layout),
            vertex,
            fragment: Some(fragment_state),
            primitive,
            depth_stencil: Some(depth_stencil_state),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_texture_view(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::TextureView {
        // Generated texture for the toggleable layer
        let size = 256;
        let texels = Self::create_texels(size as usize);
        let texture_extent = wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: None,
            size: texture_extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Uint,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        queue.write_texture(
            texture.as_image_copy(),
            &texels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(size),
                rows_per_image: None,
            },
            texture_extent,
        );
        texture_view
    }

    fn create_texels(size: usize) -> Vec<u8> {
        // checker pattern with a slight diagonal gradient so the toggle is
        // obvious on untextured models
        (0..size * size)
            .map(|id| {
                let x = id % size;
                let y = id / size;
                let checker = u8::from((x / 32 + y / 32) % 2 == 0) * 160;
                let gradient = ((x + y) * 95 / (2 * size)) as u8;
                checker + gradient
            })
            .collect()
    }
}

use std::{borrow::Cow, path::Path};

use anyhow::Context;
use lib_geometry::Projection;
use lib_gltf_model::{GltfModelRenderer, ModelData};
use log::{debug, info};

use crate::{
    render_state::RenderState,
    scene_state::{DEPTH_RANGE, FOV_Y},
    SharedSceneState,
};

pub(crate) mod sprite;

use sprite::SpriteRenderer;

const BACKGROUND_COLOR: wgpu::Color = wgpu::Color {
    r: 0.05,
    g: 0.05,
    b: 0.08,
    a: 1.0,
};

/// Loads every asset the renderer needs before any window exists, so a
/// missing or broken model aborts startup with a proper error instead of a
/// black screen.
pub struct RendererBuilder {
    scene_state: SharedSceneState,
    duck: ModelData,
    avocado: ModelData,
    bottle: ModelData,
}

impl RendererBuilder {
    /// # Errors
    /// Fails when one of the glTF models cannot be read or parsed.
    pub fn new(scene_state: SharedSceneState, asset_root: &Path) -> anyhow::Result<Self> {
        let duck = ModelData::load(&asset_root.join("Duck.glb")).context("loading duck model")?;
        let avocado =
            ModelData::load(&asset_root.join("Avocado.glb")).context("loading avocado model")?;
        let bottle = ModelData::load(&asset_root.join("WaterBottle.glb"))
            .context("loading water bottle model")?;
        info!("all models loaded");

        // the cloned duck is the click target; give it the real model extents
        scene_state
            .write()
            .unwrap()
            .set_click_bounds(&duck.bounds);

        Ok(Self {
            scene_state,
            duck,
            avocado,
            bottle,
        })
    }
}

impl gallery_framework::renderer::RendererBuilder for RendererBuilder {
    type Renderer = Renderer;

    fn build(
        self,
        _adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface: &wgpu::SurfaceConfiguration,
    ) -> Renderer {
        let state = RenderState::new(&self.scene_state.read().unwrap());

        let projection =
            Projection::new_perspective((surface.width, surface.height), FOV_Y, DEPTH_RANGE);
        let depth_map = DepthTexture::create(device, surface, "depth texture");

        let view_format = surface
            .view_formats
            .first()
            .copied()
            .unwrap_or(surface.format);
        let shader_source: Cow<'static, str> = Cow::Borrowed(include_str!("../shaders/model.wgsl"));

        let duck_renderer = GltfModelRenderer::new(
            device,
            queue,
            view_format,
            shader_source.clone(),
            DepthTexture::depth_stencil_state(),
            &self.duck,
            "duck",
        );
        let cloned_duck_renderer = GltfModelRenderer::new(
            device,
            queue,
            view_format,
            shader_source.clone(),
            DepthTexture::depth_stencil_state(),
            &self.duck,
            "cloned duck",
        );
        let avocado_renderer = GltfModelRenderer::new(
            device,
            queue,
            view_format,
            shader_source.clone(),
            DepthTexture::depth_stencil_state(),
            &self.avocado,
            "avocado",
        );
        let bottle_renderer = GltfModelRenderer::new(
            device,
            queue,
            view_format,
            shader_source,
            DepthTexture::depth_stencil_state(),
            &self.bottle,
            "water bottle",
        );
        let sprite_renderer = SpriteRenderer::new(device, view_format);

        Renderer {
            scene_state: self.scene_state,
            state,
            projection,
            depth_map,
            duck_renderer,
            cloned_duck_renderer,
            avocado_renderer,
            bottle_renderer,
            sprite_renderer,
        }
    }
}

pub struct Renderer {
    scene_state: SharedSceneState,
    state: RenderState,
    projection: Projection,
    depth_map: DepthTexture,
    duck_renderer: GltfModelRenderer,
    cloned_duck_renderer: GltfModelRenderer,
    avocado_renderer: GltfModelRenderer,
    bottle_renderer: GltfModelRenderer,
    sprite_renderer: SpriteRenderer,
}

impl gallery_framework::renderer::Renderer for Renderer {
    fn update(&mut self) {
        let scene = self.scene_state.read().unwrap();
        self.state.update(&scene);
    }

    fn resize(
        &mut self,
        device: &wgpu::Device,
        _queue: &wgpu::Queue,
        surface: &wgpu::SurfaceConfiguration,
    ) {
        debug!("resizing projection and depth map to {}×{}", surface.width, surface.height);
        self.projection
            .set_surface_dimensions((surface.width, surface.height));
        self.depth_map = DepthTexture::create(device, surface, "depth texture");
    }

    fn render(
        &mut self,
        texture_view: &wgpu::TextureView,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) {
        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.duck_renderer.render(
                queue,
                &mut render_pass,
                self.state.duck.world,
                &self.state.camera,
                &self.projection,
                self.state.duck.color,
                false,
            );
            self.cloned_duck_renderer.render(
                queue,
                &mut render_pass,
                self.state.cloned_duck.world,
                &self.state.camera,
                &self.projection,
                self.state.cloned_duck.color,
                false,
            );
            self.avocado_renderer.render(
                queue,
                &mut render_pass,
                self.state.avocado.world,
                &self.state.camera,
                &self.projection,
                self.state.avocado.color,
                false,
            );
            self.bottle_renderer.render(
                queue,
                &mut render_pass,
                self.state.bottle.world,
                &self.state.camera,
                &self.projection,
                self.state.bottle.color,
                self.state.texture_layer,
            );
            self.sprite_renderer
                .render(queue, &mut render_pass, &self.state, &self.projection);
        }

        queue.submit(Some(encoder.finish()));
    }
}

pub(crate) struct DepthTexture {
    pub(crate) view: wgpu::TextureView,
}

impl DepthTexture {
    pub(crate) const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub(crate) fn create(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
        }
    }

    pub(crate) fn depth_stencil_state() -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: Self::FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

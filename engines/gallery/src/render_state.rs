use glam::{Mat4, Vec4};
use lib_geometry::Camera;

use crate::{renderer::sprite::SpriteInstance, scene_state::ModelInstance, SceneState};

/// Marker quad drawn at the label anchor of the hovered sprite.
const LABEL_MARKER_COLOR: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
const LABEL_MARKER_HALF_EXTENTS: glam::Vec2 = glam::Vec2::new(0.15, 0.15);

/// Per-model draw parameters copied out of the scene.
#[derive(Clone, Copy)]
pub(crate) struct ModelDraw {
    pub(crate) world: Mat4,
    pub(crate) color: Vec4,
}

impl ModelDraw {
    fn from_instance(instance: &ModelInstance) -> Self {
        Self {
            world: instance.world_matrix(),
            color: instance.color,
        }
    }
}

/// Snapshot of everything the renderer needs for one frame. Copied from the
/// shared [`SceneState`] while holding its lock, then rendered without it.
pub struct RenderState {
    pub(crate) camera: Camera,
    pub(crate) duck: ModelDraw,
    pub(crate) cloned_duck: ModelDraw,
    pub(crate) avocado: ModelDraw,
    pub(crate) bottle: ModelDraw,
    pub(crate) texture_layer: bool,
    pub(crate) sprite_instances: Vec<SpriteInstance>,
}

impl RenderState {
    #[must_use]
    pub(crate) fn new(scene: &SceneState) -> Self {
        let mut state = Self {
            camera: scene.camera(),
            duck: ModelDraw::from_instance(&scene.duck),
            cloned_duck: ModelDraw::from_instance(&scene.cloned_duck),
            avocado: ModelDraw::from_instance(&scene.avocado),
            bottle: ModelDraw::from_instance(&scene.bottle),
            texture_layer: scene.texture_layer,
            sprite_instances: Vec::with_capacity(scene.sprites.len() + 1),
        };
        state.refresh_sprites(scene);
        state
    }

    pub(crate) fn update(&mut self, scene: &SceneState) {
        self.camera = scene.camera();
        self.duck = ModelDraw::from_instance(&scene.duck);
        self.cloned_duck = ModelDraw::from_instance(&scene.cloned_duck);
        self.avocado = ModelDraw::from_instance(&scene.avocado);
        self.bottle = ModelDraw::from_instance(&scene.bottle);
        self.texture_layer = scene.texture_layer;
        self.refresh_sprites(scene);
    }

    fn refresh_sprites(&mut self, scene: &SceneState) {
        self.sprite_instances.clear();
        self.sprite_instances.extend(scene.sprites.iter().map(|sprite| {
            SpriteInstance::new(sprite.position, sprite.half_extents, sprite.color)
        }));
        if let Some(label) = &scene.label {
            self.sprite_instances.push(SpriteInstance::new(
                label.anchor,
                LABEL_MARKER_HALF_EXTENTS,
                LABEL_MARKER_COLOR,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RenderState;
    use crate::SceneState;
    use glam::{Vec2, Vec3, Vec4Swizzles};

    fn screen_position(state: &SceneState, world: Vec3) -> Vec2 {
        let clip = state.projection().matrix() * state.camera().matrix() * world.extend(1.0);
        let ndc = clip.xyz() / clip.w;
        Vec2::new((ndc.x + 1.0) / 2.0 * 800.0, (1.0 - ndc.y) / 2.0 * 600.0)
    }

    #[test]
    fn snapshot_contains_one_instance_per_sprite() {
        let scene = SceneState::new();
        let state = RenderState::new(&scene);
        assert_eq!(state.sprite_instances.len(), scene.sprites.len());
    }

    #[test]
    fn hovering_adds_a_label_marker_instance() {
        let mut scene = SceneState::new();
        let mut state = RenderState::new(&scene);

        let pixel = screen_position(&scene, scene.sprites[0].position);
        scene.pointer_moved(pixel);
        state.update(&scene);
        assert_eq!(state.sprite_instances.len(), scene.sprites.len() + 1);

        let empty = screen_position(&scene, Vec3::new(0.0, 0.0, 50.0));
        scene.pointer_moved(empty);
        state.update(&scene);
        assert_eq!(state.sprite_instances.len(), scene.sprites.len());
    }
}

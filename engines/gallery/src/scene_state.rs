use std::time::{Duration, Instant};

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use lib_geometry::{Aabb, Camera, Projection, Ray};
use log::{debug, trace};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

mod highlight;
mod picking;
mod tween;

use highlight::HighlightAnimator;
use picking::{HoverChange, Picker};
use tween::{CameraTween, ColorTween, Easing};

/// Color every sprite starts out with (`#6699ff`).
const SPRITE_BASE_COLOR: Vec4 = Vec4::new(0.4, 0.6, 1.0, 1.0);
/// Color of the hovered sprite (`#ff0000`).
const SPRITE_HOVER_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
/// Target of the one-shot click tween on the cloned duck (`#ff00ff`).
const CLICK_TWEEN_COLOR: Vec4 = Vec4::new(1.0, 0.0, 1.0, 1.0);
/// Peak of the repeating highlight pulse on the avocado (`#ff6666`).
const HIGHLIGHT_COLOR: Vec4 = Vec4::new(1.0, 0.4, 0.4, 1.0);

const TWEEN_DURATION: Duration = Duration::from_secs(1);
const HIGHLIGHT_PERIOD: Duration = Duration::from_secs(1);

/// Vertical fov of the scene camera.
pub(crate) const FOV_Y: f32 = 75.0_f32 * (core::f32::consts::PI / 180.0);
pub(crate) const DEPTH_RANGE: core::ops::Range<f32> = 0.1..1000.0;

const INITIAL_EYE: Vec3 = Vec3::new(0.0, -10.0, 3.0);
const PRESET_EYE: Vec3 = Vec3::new(5.0, -10.0, 3.0);
const PRESET_TARGET: Vec3 = Vec3::new(5.0, 0.0, 0.0);

/// Gap between the top edge of a sprite and its floating label.
const LABEL_OFFSET: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick(pub u64);

/// External control surface of the scene. Commands are what key bindings,
/// scripts or UI buttons talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    /// Glide the camera to a preset pose, suspending orbit input on the way.
    TweenCamera,
    /// Start or stop the repeating highlight pulse on the avocado.
    ToggleHighlight,
    /// Swap the bottle between its textured and plain-color material.
    ToggleTextureLayer,
}

/// A camera-facing colored quad with a name shown while hovered.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub name: &'static str,
    pub position: Vec3,
    pub half_extents: Vec2,
    pub color: Vec4,
}

/// Floating text anchored above the hovered sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub anchor: Vec3,
}

/// Placement of one rendered glTF model.
#[derive(Debug, Clone, Copy)]
pub struct ModelInstance {
    pub position: Vec3,
    pub scale: f32,
    pub color: Vec4,
}

impl ModelInstance {
    fn new(position: Vec3, scale: f32) -> Self {
        Self {
            position,
            scale,
            color: Vec4::ONE,
        }
    }

    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        // the glTF sample models are y-up; stand them upright in our z-up world
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_rotation_x(core::f32::consts::FRAC_PI_2),
            self.position,
        )
    }
}

/// Orbit camera: the eye circles a target point at a fixed distance,
/// steered by pointer drags and the scroll wheel.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
    enabled: bool,
}

impl OrbitCamera {
    const DRAG_SENSITIVITY: f32 = 0.005;
    const ZOOM_SENSITIVITY: f32 = 0.5;
    const MIN_DISTANCE: f32 = 1.0;
    const MAX_DISTANCE: f32 = 100.0;
    const MAX_PITCH: f32 = core::f32::consts::FRAC_PI_2 - 0.01;

    fn from_eye_target(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(Self::MIN_DISTANCE);
        let pitch = (offset.z / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(-offset.y);
        Self {
            target,
            yaw,
            pitch,
            distance,
            enabled: true,
        }
    }

    fn set_pose(&mut self, eye: Vec3, target: Vec3) {
        let enabled = self.enabled;
        *self = Self::from_eye_target(eye, target);
        self.enabled = enabled;
    }

    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let horizontal = self.pitch.cos() * self.distance;
        self.target
            + Vec3::new(
                self.yaw.sin() * horizontal,
                -self.yaw.cos() * horizontal,
                self.pitch.sin() * self.distance,
            )
    }

    fn drag(&mut self, delta: Vec2) {
        if !self.enabled {
            return;
        }
        self.yaw += delta.x * Self::DRAG_SENSITIVITY;
        self.pitch = (self.pitch + delta.y * Self::DRAG_SENSITIVITY)
            .clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
    }

    fn zoom(&mut self, amount: f32) {
        if !self.enabled {
            return;
        }
        self.distance = (self.distance - amount * Self::ZOOM_SENSITIVITY)
            .clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }
}

/// The complete mutable state of the gallery scene. Updated by the scene
/// loop at a fixed tick rate; the renderer only ever takes snapshots.
pub struct SceneState {
    pub tick: Tick,
    viewport: (u32, u32),
    pub orbit: OrbitCamera,
    camera_tween: Option<CameraTween>,

    pub sprites: Vec<Sprite>,
    picker: Picker,
    pub label: Option<Label>,

    pub duck: ModelInstance,
    pub cloned_duck: ModelInstance,
    /// World-space bounds of the cloned duck, the click target.
    click_bounds: Aabb,
    click_tween: Option<ColorTween>,

    pub avocado: ModelInstance,
    highlight: HighlightAnimator,
    highlight_on: bool,

    pub bottle: ModelInstance,
    pub texture_layer: bool,

    cursor: Option<Vec2>,
    dragging: bool,
}

impl SceneState {
    #[must_use]
    pub fn new() -> Self {
        let cloned_duck = ModelInstance::new(Vec3::new(-5.0, 5.0, 0.0), 1.0);
        // placeholder until the real model bounds are known
        let click_bounds =
            Aabb::from_center_half_extents(cloned_duck.position, Vec3::splat(1.0));

        Self {
            tick: Tick(0),
            viewport: (800, 600),
            orbit: OrbitCamera::from_eye_target(INITIAL_EYE, Vec3::ZERO),
            camera_tween: None,
            sprites: vec![
                Sprite {
                    name: "sprite 1",
                    position: Vec3::new(5.0, -5.0, 0.0),
                    half_extents: Vec2::new(0.5, 1.0),
                    color: SPRITE_BASE_COLOR,
                },
                Sprite {
                    name: "sprite 2",
                    position: Vec3::new(-5.0, -3.0, 0.0),
                    half_extents: Vec2::new(0.05, 0.25),
                    color: SPRITE_BASE_COLOR,
                },
            ],
            picker: Picker::default(),
            label: None,
            duck: ModelInstance::new(Vec3::ZERO, 1.0),
            cloned_duck,
            click_bounds,
            click_tween: None,
            avocado: ModelInstance::new(Vec3::new(5.0, 5.0, 0.0), 50.0),
            highlight: HighlightAnimator::new(HIGHLIGHT_COLOR, HIGHLIGHT_PERIOD),
            highlight_on: false,
            bottle: ModelInstance::new(Vec3::new(0.0, 5.0, 0.0), 2.0),
            texture_layer: true,
            cursor: None,
            dragging: false,
        }
    }

    /// Replace the placeholder click bounds with the model's real extents,
    /// carried through the instance's full transform so the box covers the
    /// model as rendered.
    pub fn set_click_bounds(&mut self, model_bounds: &Aabb) {
        self.click_bounds = model_bounds.transformed(self.cloned_duck.world_matrix());
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        Camera::new(self.orbit.eye(), self.orbit.target)
    }

    #[must_use]
    pub fn projection(&self) -> Projection {
        Projection::new_perspective(self.viewport, FOV_Y, DEPTH_RANGE)
    }

    pub fn set_viewport(&mut self, viewport: (u32, u32)) {
        if viewport.0 == 0 || viewport.1 == 0 {
            return;
        }
        self.viewport = viewport;
    }

    pub fn process_command(&mut self, command: SceneCommand, now: Instant) {
        debug!("scene command: {command:?}");
        match command {
            SceneCommand::TweenCamera => {
                self.orbit.enabled = false;
                self.camera_tween = Some(CameraTween::new(
                    (self.orbit.eye(), PRESET_EYE),
                    (self.orbit.target, PRESET_TARGET),
                    now,
                    TWEEN_DURATION,
                    Easing::QuadraticInOut,
                ));
            }
            SceneCommand::ToggleHighlight => {
                self.highlight_on = !self.highlight_on;
                if self.highlight_on {
                    self.highlight.activate(self.avocado.color, now);
                } else if let Some(original) = self.highlight.deactivate() {
                    self.avocado.color = original;
                }
            }
            SceneCommand::ToggleTextureLayer => {
                self.texture_layer = !self.texture_layer;
            }
        }
    }

    /// Routes raw window events into pointer and viewport handling.
    pub fn handle_window_event(&mut self, event: &WindowEvent, now: Instant) {
        match event {
            WindowEvent::Resized(size) => {
                self.set_viewport((size.width, size.height));
            }
            WindowEvent::CursorMoved { position, .. } => {
                #[expect(clippy::cast_possible_truncation, reason = "pixel coordinates")]
                let position = Vec2::new(position.x as f32, position.y as f32);
                if self.dragging {
                    if let Some(previous) = self.cursor {
                        self.orbit.drag(position - previous);
                    }
                }
                self.cursor = Some(position);
                self.pointer_moved(position);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.dragging = true;
                    if let Some(cursor) = self.cursor {
                        self.clicked(cursor, now);
                    }
                }
                ElementState::Released => self.dragging = false,
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, vertical) => *vertical,
                    #[expect(clippy::cast_possible_truncation, reason = "pixel coordinates")]
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / 20.0,
                };
                self.orbit.zoom(amount);
            }
            _ => {}
        }
    }

    /// Re-evaluates the hover pick for the given pointer position.
    pub fn pointer_moved(&mut self, position: Vec2) {
        let ray = self.pointer_ray(position);
        let hit = Picker::nearest_hit(&ray, &self.sprites, &self.camera());
        match self.picker.hover(hit) {
            HoverChange::Unchanged => {}
            HoverChange::Deselected { previous } => self.undecorate(previous),
            HoverChange::Selected { previous, next } => {
                if let Some(previous) = previous {
                    self.undecorate(previous);
                }
                self.decorate(next);
            }
        }
    }

    /// Starts the one-shot color tween when the click ray hits the cloned
    /// duck. Clicks anywhere else are ignored.
    pub fn clicked(&mut self, position: Vec2, now: Instant) {
        let ray = self.pointer_ray(position);
        if ray.intersect_aabb(&self.click_bounds).is_none() {
            return;
        }
        trace!("click hit the cloned duck");
        self.click_tween = Some(ColorTween::new(
            self.cloned_duck.color,
            CLICK_TWEEN_COLOR,
            now,
            TWEEN_DURATION,
            Easing::Linear,
        ));
    }

    /// Advances one tick: running tweens and the highlight pulse.
    pub fn update(&mut self, now: Instant) {
        self.tick.0 = self.tick.0.wrapping_add(1);

        if let Some(tween) = self.click_tween.take() {
            self.cloned_duck.color = tween.sample(now);
            if !tween.is_complete(now) {
                self.click_tween = Some(tween);
            }
        }

        if let Some(tween) = self.camera_tween.take() {
            let (eye, target) = tween.sample(now);
            self.orbit.set_pose(eye, target);
            if tween.is_complete(now) {
                self.orbit.enabled = true;
            } else {
                self.camera_tween = Some(tween);
            }
        }

        if let Some(color) = self.highlight.color(now) {
            self.avocado.color = color;
        }
    }

    #[must_use]
    pub fn hovered_sprite(&self) -> Option<usize> {
        self.picker.selection()
    }

    fn pointer_ray(&self, position: Vec2) -> Ray {
        Ray::from_screen(position, self.viewport, &self.camera(), &self.projection())
    }

    fn undecorate(&mut self, index: usize) {
        if let Some(sprite) = self.sprites.get_mut(index) {
            sprite.color = SPRITE_BASE_COLOR;
        }
        self.label = None;
    }

    fn decorate(&mut self, index: usize) {
        let Some(sprite) = self.sprites.get_mut(index) else {
            return;
        };
        sprite.color = SPRITE_HOVER_COLOR;
        self.label = Some(Label {
            text: sprite.name.to_owned(),
            anchor: sprite.position + Vec3::Z * (sprite.half_extents.y + LABEL_OFFSET),
        });
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        SceneCommand, SceneState, CLICK_TWEEN_COLOR, PRESET_EYE, PRESET_TARGET,
        SPRITE_BASE_COLOR, SPRITE_HOVER_COLOR,
    };
    use glam::{Vec2, Vec3, Vec4Swizzles};
    use lib_geometry::Aabb;
    use std::time::{Duration, Instant};
    use winit::{dpi::PhysicalSize, event::WindowEvent};

    /// Pixel position a world point projects to with the current camera.
    fn screen_position(state: &SceneState, world: Vec3) -> Vec2 {
        let clip = state.projection().matrix() * state.camera().matrix() * world.extend(1.0);
        let ndc = clip.xyz() / clip.w;
        Vec2::new((ndc.x + 1.0) / 2.0 * 800.0, (1.0 - ndc.y) / 2.0 * 600.0)
    }

    #[test]
    fn hover_selects_sprite_under_pointer() {
        let mut state = SceneState::new();
        let pixel = screen_position(&state, state.sprites[0].position);

        state.pointer_moved(pixel);

        assert_eq!(state.hovered_sprite(), Some(0));
        assert_eq!(state.sprites[0].color, SPRITE_HOVER_COLOR);
        let label = state.label.as_ref().unwrap();
        assert_eq!(label.text, "sprite 1");
        assert!(label.anchor.z > state.sprites[0].position.z);
    }

    #[test]
    fn repeated_hover_changes_nothing() {
        let mut state = SceneState::new();
        let pixel = screen_position(&state, state.sprites[0].position);

        state.pointer_moved(pixel);
        let label = state.label.clone();
        state.pointer_moved(pixel);

        assert_eq!(state.hovered_sprite(), Some(0));
        assert_eq!(state.label, label);
        assert_eq!(state.sprites[0].color, SPRITE_HOVER_COLOR);
    }

    #[test]
    fn leaving_a_sprite_restores_base_color_and_label() {
        let mut state = SceneState::new();
        let on_sprite = screen_position(&state, state.sprites[0].position);
        // far away from all scene content
        let empty = screen_position(&state, Vec3::new(0.0, 0.0, 50.0));

        state.pointer_moved(on_sprite);
        state.pointer_moved(empty);

        assert_eq!(state.hovered_sprite(), None);
        assert_eq!(state.sprites[0].color, SPRITE_BASE_COLOR);
        assert!(state.label.is_none());
    }

    #[test]
    fn switching_sprites_undoes_previous_decoration() {
        let mut state = SceneState::new();
        let first = screen_position(&state, state.sprites[0].position);
        let second = screen_position(&state, state.sprites[1].position);

        state.pointer_moved(first);
        state.pointer_moved(second);

        assert_eq!(state.hovered_sprite(), Some(1));
        assert_eq!(state.sprites[0].color, SPRITE_BASE_COLOR);
        assert_eq!(state.sprites[1].color, SPRITE_HOVER_COLOR);
        assert_eq!(state.label.as_ref().unwrap().text, "sprite 2");
    }

    #[test]
    fn clicking_the_cloned_duck_tweens_to_magenta_once() {
        let mut state = SceneState::new();
        let start = Instant::now();
        let pixel = screen_position(&state, state.cloned_duck.position);

        state.clicked(pixel, start);
        state.update(start + Duration::from_millis(500));
        let midway = state.cloned_duck.color;
        assert_ne!(midway, CLICK_TWEEN_COLOR);

        state.update(start + Duration::from_secs(1));
        assert_eq!(state.cloned_duck.color, CLICK_TWEEN_COLOR);

        // one-shot: no further change afterwards
        state.update(start + Duration::from_secs(3));
        assert_eq!(state.cloned_duck.color, CLICK_TWEEN_COLOR);
    }

    #[test]
    fn click_bounds_follow_the_model_rotation() {
        let mut state = SceneState::new();
        let start = Instant::now();
        // y-up object-space bounds the way a glTF model reports them
        state.set_click_bounds(&Aabb {
            min: Vec3::new(-1.0, 0.0, -1.0),
            max: Vec3::new(1.0, 2.0, 1.0),
        });

        // the instance stands upright, so a point high on the rendered model
        // sits above its position along world z
        let head = state.cloned_duck.position + Vec3::Z * 1.8;
        state.clicked(screen_position(&state, head), start);
        state.update(start + Duration::from_secs(1));

        assert_eq!(state.cloned_duck.color, CLICK_TWEEN_COLOR);
    }

    #[test]
    fn clicking_empty_space_changes_nothing() {
        let mut state = SceneState::new();
        let start = Instant::now();
        let before = state.cloned_duck.color;
        let pixel = screen_position(&state, Vec3::new(0.0, 0.0, 50.0));

        state.clicked(pixel, start);
        state.update(start + Duration::from_secs(1));

        assert_eq!(state.cloned_duck.color, before);
    }

    #[test]
    fn highlight_toggle_restores_original_color_exactly() {
        let mut state = SceneState::new();
        let start = Instant::now();
        let original = state.avocado.color;

        state.process_command(SceneCommand::ToggleHighlight, start);
        state.update(start + Duration::from_millis(400));
        assert_ne!(state.avocado.color, original);

        state.process_command(SceneCommand::ToggleHighlight, start + Duration::from_millis(400));
        assert_eq!(state.avocado.color, original);
    }

    #[test]
    fn camera_tween_reaches_preset_and_reenables_orbit() {
        let mut state = SceneState::new();
        let start = Instant::now();

        state.process_command(SceneCommand::TweenCamera, start);
        // orbit input is suspended while the camera glides
        let eye_before = state.orbit.eye();
        state.orbit.zoom(3.0);
        assert_eq!(state.orbit.eye(), eye_before);

        state.update(start + Duration::from_secs(1));
        assert!((state.orbit.eye() - PRESET_EYE).length() < 1e-3);
        assert!((state.orbit.target - PRESET_TARGET).length() < 1e-3);

        // orbit input works again after the tween
        state.orbit.zoom(3.0);
        assert_ne!(state.orbit.eye(), PRESET_EYE);
    }

    #[test]
    fn texture_layer_toggle_flips_flag() {
        let mut state = SceneState::new();
        let now = Instant::now();
        assert!(state.texture_layer);
        state.process_command(SceneCommand::ToggleTextureLayer, now);
        assert!(!state.texture_layer);
        state.process_command(SceneCommand::ToggleTextureLayer, now);
        assert!(state.texture_layer);
    }

    #[test]
    fn resize_changes_projection_aspect() {
        let mut state = SceneState::new();
        let before = state.projection().matrix();
        state.handle_window_event(
            &WindowEvent::Resized(PhysicalSize::new(1920, 1080)),
            Instant::now(),
        );
        assert_ne!(state.projection().matrix(), before);
        assert!((state.projection().aspect() - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn zero_sized_viewport_is_ignored() {
        let mut state = SceneState::new();
        let before = state.projection().aspect();
        state.set_viewport((0, 0));
        assert!((state.projection().aspect() - before).abs() < 1e-6);
    }
}

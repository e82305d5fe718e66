#![allow(missing_docs, reason = "TODO add before release")]

use std::sync::{Arc, RwLock};

mod render_state;
mod renderer;
mod scene_loop;
mod scene_state;

pub use render_state::RenderState;
pub use renderer::{Renderer, RendererBuilder};
pub use scene_loop::SceneLoop;
pub use scene_state::{
    Label, ModelInstance, OrbitCamera, SceneCommand, SceneState, Sprite, Tick,
};

/// The scene is written by the scene loop and read by the renderer.
/// A `RwLock` rather than a `Mutex` so multiple renderers could share it.
pub type SharedSceneState = Arc<RwLock<SceneState>>;

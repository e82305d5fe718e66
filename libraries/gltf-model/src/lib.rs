#![allow(missing_docs, reason = "TODO add later")]

mod model;
mod renderer;

pub use model::{ModelData, Vertex};
pub use renderer::Renderer as GltfModelRenderer;

#![allow(missing_docs, reason = "TODO add later")]

mod camera;
mod projection;
mod ray;

pub use camera::Camera;
pub use projection::Projection;
pub use ray::{Aabb, Ray};

#![allow(missing_docs, reason = "TODO remove before release")]

pub mod application;
pub mod event;
pub mod logging;
mod render_surface;
pub mod renderer;

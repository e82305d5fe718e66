//! Starts the interactive model gallery.
//!
//! Key bindings: `c` glides the camera to its preset pose, `h` toggles the
//! highlight pulse on the avocado, `t` toggles the bottle's texture layer
//! and `Escape` exits.

use std::path::Path;
use std::sync::mpsc::channel;
use std::thread::{self, JoinHandle};

use anyhow::Context;
use engine_gallery::{RendererBuilder, SceneLoop};
use gallery_framework::application::Application;
use gallery_framework::event::{ApplicationEvent, FrameworkEvent};
use gallery_framework::logging::init_logger;
use log::{error, info};
use winit::event_loop::{ControlFlow, EventLoop};

fn main() -> anyhow::Result<()> {
    init_logger();

    let scene_loop = SceneLoop::default();
    let scene_state = scene_loop.clone_state();

    // load all models up front; a broken asset should abort the start
    // instead of presenting an incomplete scene
    let renderer_builder = RendererBuilder::new(scene_state, Path::new("assets"))
        .context("loading the gallery assets")?;

    let (application_sender, application_receiver) = channel();
    let (scene_sender, scene_receiver) = channel();

    let scene_loop_thread = thread::spawn(move || scene_loop.run(&scene_receiver));

    let event_loop = EventLoop::with_user_event().build()?;
    // ControlFlow::Poll continuously runs the event loop, even if the OS hasn't
    // dispatched any events. This is ideal for games and similar applications.
    event_loop.set_control_flow(ControlFlow::Poll);
    let proxy = event_loop.create_proxy();

    // Routes events from the window into the scene loop. An exit request is
    // bounced back into the winit event loop as well, so both loops stop.
    let router_thread = thread::spawn(move || {
        while let Ok(event) = application_receiver.recv() {
            let exit = matches!(
                event,
                FrameworkEvent::Application {
                    event: ApplicationEvent::Exit,
                }
            );
            if scene_sender.send(event).is_err() {
                break;
            }
            if exit {
                let _ = proxy.send_event(ApplicationEvent::Exit.into());
                break;
            }
        }
    });

    let mut application =
        Application::new("model gallery".into(), application_sender, renderer_builder);

    info!("entering event loop");
    event_loop.run_app(&mut application)?;

    // dropping the application closes its event channel, which in turn lets
    // the router and scene loop threads run to completion
    drop(application);

    join(router_thread, "event router");
    join(scene_loop_thread, "scene loop");

    Ok(())
}

fn join(handle: JoinHandle<()>, name: &str) {
    if handle.join().is_err() {
        error!("{name} thread panicked");
    } else {
        info!("{name} thread stopped");
    }
}

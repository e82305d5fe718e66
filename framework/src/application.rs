use crate::{
    event::{ApplicationEvent, FrameworkEvent},
    render_surface::RenderSurface,
    renderer,
};
use log::{debug, info, trace};
use std::{
    sync::{mpsc::Sender, Arc},
    time::{Duration, Instant},
};
use winit::{
    application::ApplicationHandler,
    event::{KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};

/// Owns the window and render surface and forwards every input event the
/// engine cares about into the `event_sink` channel.
pub struct Application<RendererBuilder: renderer::RendererBuilder> {
    renderer_builder: Option<RendererBuilder>,
    surface: Option<RenderSurface<RendererBuilder::Renderer>>,
    window: Option<Arc<Window>>,
    title: String,
    frame_counter: u32,
    frame_time: Instant,
    event_sink: Sender<FrameworkEvent>,
}

impl<RendererBuilder: renderer::RendererBuilder> Application<RendererBuilder> {
    #[must_use]
    pub fn new(
        title: String,
        event_sink: Sender<FrameworkEvent>,
        renderer_builder: RendererBuilder,
    ) -> Self {
        Self {
            renderer_builder: Some(renderer_builder),
            surface: None,
            window: None,
            title,
            frame_counter: 0,
            frame_time: Instant::now(),
            event_sink,
        }
    }

    fn update_fps(&mut self) {
        self.frame_counter += 1;
        let span = self.frame_time.elapsed();
        if span >= Duration::from_secs(1) {
            let fps = (f64::from(self.frame_counter) / span.as_secs_f64()).round();
            debug!("{fps} fps");
            self.frame_counter = 0;
            self.frame_time += span;
        }
    }

    fn forward(&self, event: WindowEvent) {
        self.send(FrameworkEvent::Window { event });
    }

    /// Events arriving while the engine is already shutting down have no
    /// receiver anymore and are dropped.
    fn send(&self, event: FrameworkEvent) {
        if self.event_sink.send(event).is_err() {
            trace!("dropping event, sink is closed");
        }
    }
}

impl<RendererBuilder: renderer::RendererBuilder> ApplicationHandler<FrameworkEvent>
    for Application<RendererBuilder>
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = WindowAttributes::default().with_title(&self.title);

        let window = Arc::new(event_loop.create_window(attributes).unwrap());

        // First-time init of the surface and renderer
        if self.surface.is_none() {
            let renderer_builder = self.renderer_builder.take().unwrap();
            let surface = pollster::block_on(RenderSurface::new(
                Arc::clone(&window),
                renderer_builder,
            ));
            self.surface = Some(surface);
        }

        self.window = Some(window);
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FrameworkEvent) {
        match event {
            FrameworkEvent::Application {
                event: ApplicationEvent::Exit,
            } => {
                info!("Window event loop received an Exit event. Shutting down event loop.");
                event_loop.exit();
            }
            FrameworkEvent::Window { .. } => {
                trace!("ignoring window event sent to the event loop proxy");
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::Resized(size) => {
                trace!("WindowEvent::Resized({size:?})");

                if let Some(surface) = self.surface.as_mut() {
                    surface.resize(size);
                }

                // the engine tracks the viewport for picking
                self.forward(event);
            }

            WindowEvent::CloseRequested => {
                trace!("WindowEvent::CloseRequested()");
                self.send(ApplicationEvent::Exit.into());
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        ..
                    },
                ..
            } => {
                trace!("WindowEvent::KeyboardInput(Escape)");
                self.send(ApplicationEvent::Exit.into());
            }

            WindowEvent::RedrawRequested => {
                // On MacOS, currently redraw requested comes in _before_ Init does.
                // If this happens, just drop the requested redraw on the floor.
                //
                // See https://github.com/rust-windowing/winit/issues/3235 for some discussion
                let Some(surface) = self.surface.as_mut() else {
                    return;
                };

                surface.redraw();
                self.update_fps();
            }

            _ => {
                self.forward(event);
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        trace!("window event loop is exiting");
    }
}

use std::{
    sync::{
        mpsc::{Receiver, TryRecvError},
        Arc, RwLock,
    },
    thread,
    time::{Duration, Instant},
};

use gallery_framework::event::{ApplicationEvent, FrameworkEvent};
use log::debug;
use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::Key,
};

use crate::{scene_state::SceneCommand, SceneState, SharedSceneState};

/// Number of scene loop iterations per second.
/// This is a multiple of common frame rates.
const TICKS_PER_SECOND: u32 = 240;

/// Duration of each scene tick. Same as
/// `Duration::from_secs_f64(f64::from(TICKS_PER_SECOND).recip())`
/// but with const support
const TICK_DURATION: Duration = Duration::from_nanos(
    (1_000_000_000_u64 + TICKS_PER_SECOND as u64 / 2) / TICKS_PER_SECOND as u64,
);

/// Drives the scene at a fixed tick rate, feeding it the window events
/// forwarded by the application thread.
#[derive(Default)]
pub struct SceneLoop {
    /// Current scene state, shared with the renderer.
    /// In order to allow multiple renderers, this is a `RwLock` rather than a `Mutex`.
    scene_state: SharedSceneState,
}

impl SceneLoop {
    pub fn run(self, event_source: &Receiver<FrameworkEvent>) {
        let mut time = Instant::now();
        'scene_loop: loop {
            {
                let mut scene_state = self.scene_state.write().unwrap();
                let now = Instant::now();
                'next_event: loop {
                    match event_source.try_recv() {
                        Ok(FrameworkEvent::Window { event }) => {
                            if let Some(command) = command_for_key(&event) {
                                scene_state.process_command(command, now);
                            } else {
                                scene_state.handle_window_event(&event, now);
                            }
                        }
                        Ok(FrameworkEvent::Application {
                            event: ApplicationEvent::Exit,
                        }) => {
                            debug!("received exit event, leaving scene loop");
                            break 'scene_loop;
                        }
                        Err(TryRecvError::Disconnected) => {
                            debug!("event source disconnected, leaving scene loop");
                            break 'scene_loop;
                        }
                        Err(TryRecvError::Empty) => break 'next_event,
                    }
                }

                scene_state.update(Instant::now());
            }

            // compute the timestamp of the next scene loop iteration
            time += TICK_DURATION;
            if let Some(delay) = time.checked_duration_since(Instant::now()) {
                thread::sleep(delay);
            } else {
                // scene loop is running too slow
            }
        }
    }

    #[must_use]
    pub fn clone_state(&self) -> Arc<RwLock<SceneState>> {
        Arc::clone(&self.scene_state)
    }
}

/// Maps the gallery's key bindings onto scene commands. Repeats are
/// ignored so holding a key doesn't re-trigger the command every frame.
fn command_for_key(event: &WindowEvent) -> Option<SceneCommand> {
    let WindowEvent::KeyboardInput {
        event:
            KeyEvent {
                logical_key: Key::Character(character),
                state: ElementState::Pressed,
                repeat: false,
                ..
            },
        ..
    } = event
    else {
        return None;
    };

    match character.as_str() {
        "c" => Some(SceneCommand::TweenCamera),
        "h" => Some(SceneCommand::ToggleHighlight),
        "t" => Some(SceneCommand::ToggleTextureLayer),
        _ => None,
    }
}

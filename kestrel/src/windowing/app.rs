use crate::AppState;
use crate::utils::FrameCounter;
use crate::world::World;
use kestrel_asset::AssetStore;
use kestrel_render::Renderer;
use kestrel_utils::EngineArgs;
use std::error::Error;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{error, info, trace};
use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::{DeviceEvent, DeviceId, StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Fullscreen, Window, WindowAttributes, WindowId};

pub struct App<S: AppState> {
    main_window_attributes: WindowAttributes,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    world: Option<World>,
    state: S,
    frame_counter: FrameCounter,
    fps_log_accumulator: f32,
}

pub struct AppSettings<S: AppState> {
    pub main_window: WindowAttributes,
    pub(crate) _state_type: PhantomData<S>,
}

impl<S: AppState> AppSettings<S> {
    pub fn run(self) -> Result<(), Box<dyn Error>> {
        let (event_loop, mut app) = self.init_state()?;
        event_loop.run_app(&mut app)?;
        Ok(())
    }

    fn init_state(self) -> Result<(EventLoop<()>, App<S>), Box<dyn Error>> {
        let event_loop = match EventLoop::new() {
            Err(EventLoopError::NotSupported(_)) => {
                return Err("No graphics backend found that could be used.".into());
            }
            e => e?,
        };
        event_loop.set_control_flow(ControlFlow::Poll);

        let app = App {
            main_window_attributes: self.main_window,
            window: None,
            renderer: None,
            world: None,
            state: S::default(),
            frame_counter: FrameCounter::default(),
            fps_log_accumulator: 0.0,
        };

        Ok((event_loop, app))
    }
}

impl<S: AppState> App<S> {
    fn init(&mut self, event_loop: &ActiveEventLoop) {
        info!("Initializing engine core");

        let window = match event_loop.create_window(self.main_window_attributes.clone()) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("Couldn't create window: {err}");
                event_loop.exit();
                return;
            }
        };

        if EngineArgs::get().fullscreen {
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        trace!("Created main window");

        let assets = AssetStore::new();

        let renderer = match Renderer::new(window.clone(), assets.clone()) {
            Ok(renderer) => renderer,
            Err(err) => {
                error!("Couldn't create render state: {err}");
                event_loop.exit();
                return;
            }
        };

        trace!("Created render state");

        let mut world = World::new(assets);
        world.set_viewport_size(window.inner_size());

        if let Err(err) = self.state.init(&mut world) {
            error!("App state failed to initialize: {err}");
            event_loop.exit();
            return;
        }

        window.request_redraw();

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.world = Some(world);
    }

    fn apply_cursor_request(window: &Window, lock: bool) {
        if lock {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(err) = grabbed {
                error!("Couldn't grab cursor: {err}");
                return;
            }
            window.set_cursor_visible(false);
            trace!("Captured cursor");
        } else {
            if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
                error!("Couldn't release cursor: {err}");
                return;
            }
            window.set_cursor_visible(true);
            trace!("Released cursor");
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(renderer), Some(world)) =
            (&self.window, &mut self.renderer, &mut self.world)
        else {
            return;
        };

        world.update();

        if world.input.is_key_released(KeyCode::Escape) {
            world.request_shutdown();
        }

        if let Err(err) = self.state.update(world) {
            error!("App state update failed: {err}");
            event_loop.exit();
            return;
        }

        if let Some(lock) = world.input.take_cursor_request() {
            Self::apply_cursor_request(window.as_ref(), lock);
        }

        if world.is_shutdown_requested() {
            event_loop.exit();
            return;
        }

        let frame = world.extract_draw_list();
        if !renderer.render(&frame) {
            error!("Fatal render error, shutting down");
            event_loop.exit();
            return;
        }

        let delta_time = world.delta_time().as_secs_f32();
        self.frame_counter.new_frame(delta_time);
        self.fps_log_accumulator += delta_time;
        if self.fps_log_accumulator >= 1.0 {
            self.fps_log_accumulator = 0.0;
            info!(
                "{} FPS ({:.3} ms/frame)",
                self.frame_counter.fps_mean(),
                self.frame_counter.delta_mean() * 1000.0
            );
        }
    }
}

impl<S: AppState> ApplicationHandler for App<S> {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
        if cause == StartCause::Init {
            self.init(event_loop);
        }
    }

    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if event_loop.exiting() {
            return;
        }

        let Some(window) = &self.window else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
                if let Some(world) = &mut self.world {
                    world.set_viewport_size(size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(_),
                        ..
                    },
                ..
            }
            | WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseWheel { .. }
            | WindowEvent::MouseInput { .. } => {
                if let Some(world) = &mut self.world {
                    world.input.process_window_event(&event);
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(world) = &mut self.world {
            world.input.process_device_event(&event);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(world) = &mut self.world
            && let Err(err) = self.state.destroy(world)
        {
            error!("App state failed to shut down cleanly: {err}");
        }
    }
}

use std::collections::HashSet;
use std::num::NonZeroU32;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::{Duration, Instant};

use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::error::EventLoopError;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::camera::{Camera, FrameInput, Motion};
use crate::config::{Config, ConfigError};
use crate::scaler::{ScaleLut, blit_nearest, build_scale_lut};
use crate::timing::{FrameClock, fps_label};
use crate::world::World;

mod camera;
mod collision;
mod config;
mod raycast;
mod renderer;
mod scaler;
mod timing;
mod world;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("event loop failed: {0}")]
    EventLoop(#[from] EventLoopError),
}

struct App {
    config: Config,
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    world: World,
    camera: Camera,
    motion: Motion,

    // Fixed-resolution frame, stretched onto the window
    frame: Vec<u32>,
    frame_w: usize,
    frame_h: usize,
    scale_lut: ScaleLut,

    // Input and timing
    keys_down: HashSet<KeyCode>,
    focused: bool,
    clock: FrameClock,
    frame_interval: Option<Duration>,
    next_frame: Instant,
    last_fps_title: Instant,
}

impl App {
    fn new(config: Config, world: World) -> Self {
        let frame_w = config.screen_width as usize;
        let frame_h = config.screen_height as usize;
        let frame_interval = (config.frame_rate_limit > 0)
            .then(|| Duration::from_secs_f64(1.0 / config.frame_rate_limit as f64));

        Self {
            window: None,
            surface: None,
            world,
            camera: config.player.camera(),
            motion: config.player.motion(),

            frame: vec![0; frame_w * frame_h],
            frame_w,
            frame_h,
            scale_lut: ScaleLut::empty(),

            keys_down: HashSet::new(),
            focused: true,
            clock: FrameClock::new(),
            frame_interval,
            next_frame: Instant::now(),
            last_fps_title: Instant::now(),
            config,
        }
    }

    fn frame_input(&self) -> FrameInput {
        let held = |codes: &[KeyCode]| codes.iter().any(|c| self.keys_down.contains(c));
        FrameInput {
            forward: FrameInput::intent(
                held(&[KeyCode::ArrowDown, KeyCode::KeyS]),
                held(&[KeyCode::ArrowUp, KeyCode::KeyW]),
            ),
            rotate: FrameInput::intent(
                held(&[KeyCode::ArrowLeft, KeyCode::KeyA]),
                held(&[KeyCode::ArrowRight, KeyCode::KeyD]),
            ),
            focused: self.focused,
        }
    }

    fn tick(&mut self) {
        let dt = self.clock.restart();

        let now = Instant::now();
        if now.duration_since(self.last_fps_title) >= Duration::from_secs(1) {
            let label = fps_label(dt);
            log::debug!("{label}");
            if let Some(window) = &self.window {
                window.set_title(&format!("{} - {label}", self.config.title));
            }
            self.last_fps_title = now;
        }

        // Cap the step so a stalled window does not teleport the player
        let step = dt.min(self.config.max_frame_step());
        let input = self.frame_input();
        self.camera = self
            .camera
            .update(&input, step, &self.motion, &self.world.map);
    }

    fn draw(&mut self, id: WindowId) {
        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w, s),
            _ => return,
        };

        let size = window.inner_size();
        let (Some(dw), Some(dh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return; // Minimized window, skip drawing
        };
        let (dw_us, dh_us) = (dw.get() as usize, dh.get() as usize);

        if let Err(err) = surface.resize(dw, dh) {
            log::warn!("surface resize failed: {err}");
            return;
        }
        if !self.scale_lut.matches(dw_us, dh_us) {
            self.scale_lut = build_scale_lut(dw_us, dh_us, self.frame_w, self.frame_h);
        }

        renderer::render_frame(
            &mut self.frame,
            self.frame_w,
            self.frame_h,
            &self.world,
            &self.camera,
        );

        let mut buf = match surface.buffer_mut() {
            Ok(buf) => buf,
            Err(err) => {
                log::warn!("surface buffer unavailable: {err}");
                return;
            }
        };
        blit_nearest(&mut buf, dw_us, &self.frame, &self.scale_lut);
        if let Err(err) = buf.present() {
            log::warn!("present failed: {err}");
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.screen_width,
                self.config.screen_height,
            ));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Rc::new(window),
            Err(err) => {
                log::error!("cannot create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let surface = softbuffer::Context::new(window.clone())
            .and_then(|context| softbuffer::Surface::new(&context, window.clone()));
        let surface = match surface {
            Ok(surface) => surface,
            Err(err) => {
                log::error!("cannot create drawing surface: {err}");
                event_loop.exit();
                return;
            }
        };

        log::info!(
            "window created, rendering at {}x{}",
            self.frame_w,
            self.frame_h
        );

        self.surface = Some(surface);
        self.window = Some(window);

        self.clock = FrameClock::new();
        self.next_frame = Instant::now();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested, stopping");
                event_loop.exit();
            }

            WindowEvent::Focused(focused) => {
                self.focused = focused;
                if !focused {
                    self.keys_down.clear();
                }
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed if code == KeyCode::Escape => {
                    log::info!("escape pressed, stopping");
                    event_loop.exit();
                }
                ElementState::Pressed => {
                    self.keys_down.insert(code);
                }
                ElementState::Released => {
                    self.keys_down.remove(&code);
                }
            },

            WindowEvent::RedrawRequested => {
                self.tick();
                self.draw(id);
            }

            WindowEvent::Resized(_) => {
                // LUT is rebuilt lazily on the next draw
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = &self.window else {
            return;
        };

        match self.frame_interval {
            Some(interval) => {
                let now = Instant::now();
                if now >= self.next_frame {
                    window.request_redraw();
                    self.next_frame = (self.next_frame + interval).max(now);
                }
                event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
            }
            None => {
                event_loop.set_control_flow(ControlFlow::Poll);
                window.request_redraw();
            }
        }
    }
}

fn load_config() -> Result<Config, ConfigError> {
    match std::env::args_os().nth(1) {
        Some(path) => {
            log::info!("loading config from {}", path.to_string_lossy());
            Config::load(path)
        }
        None => {
            log::info!("no config file given, using defaults");
            Ok(Config::default())
        }
    }
}

fn run() -> Result<(), AppError> {
    // A bad map must stop us before any window exists
    let config = load_config()?;
    let world = config.build_world()?;
    log::info!(
        "map loaded: {}x{} cells",
        world.map.width(),
        world.map.height()
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, world);
    event_loop.run_app(&mut app)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#![forbid(unsafe_code)]

pub mod config;
pub mod controller;
pub mod error;
pub mod life;
pub mod pattern;
pub mod render;

use std::path::Path;
use std::time::{Duration, Instant};

use error_iter::ErrorIter as _;
use log::{debug, error, info};
use pixels::{Pixels, SurfaceTexture};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::WindowBuilder;
use winit_input_helper::WinitInputHelper;

use crate::config::{Settings, MIN_HEIGHT, MIN_WIDTH};
use crate::controller::{Command, Flow, Simulation};
pub use crate::error::{Error, Result};

const LEFT_BUTTON: usize = 0;
const RIGHT_BUTTON: usize = 1;

const KEY_BINDINGS: [(KeyCode, Command); 16] = [
    (KeyCode::KeyP, Command::TogglePause),
    (KeyCode::Space, Command::TogglePause),
    (KeyCode::KeyN, Command::Step),
    (KeyCode::KeyR, Command::Randomize),
    (KeyCode::KeyC, Command::Clear),
    (KeyCode::KeyA, Command::FillAlive),
    (KeyCode::KeyX, Command::GrowCells),
    (KeyCode::KeyZ, Command::ShrinkCells),
    (KeyCode::KeyT, Command::CycleCellSize),
    (KeyCode::Period, Command::SpeedUp),
    (KeyCode::Comma, Command::SlowDown),
    (KeyCode::KeyG, Command::ToggleGrid),
    (KeyCode::KeyW, Command::ToggleTrail),
    (KeyCode::KeyE, Command::NextTrailColor),
    (KeyCode::KeyQ, Command::Quit),
    (KeyCode::Escape, Command::Quit),
];

/// Wheel up speeds the simulation up, wheel down slows it down.
fn scroll_command(scroll_y: f32) -> Option<Command> {
    if scroll_y > 0.0 {
        Some(Command::SpeedUp)
    } else if scroll_y < 0.0 {
        Some(Command::SlowDown)
    } else {
        None
    }
}

/// Lines printed when F1 is pressed.
fn help() -> Vec<String> {
    let mut lines: Vec<String> = KEY_BINDINGS
        .iter()
        .map(|(key, command)| format!("{key:?}: {command:?}"))
        .collect();
    lines.push(format!("{:?}: save pattern", KeyCode::KeyS));
    lines.push("left mouse: set cells alive".to_string());
    lines.push("right mouse: set cells dead".to_string());
    lines.push("mouse wheel: generations per second".to_string());
    lines
}

/// Paces redraws to at most `fps` frames per second.
struct FrameLimiter {
    budget: Duration,
    next_frame: Instant,
}

impl FrameLimiter {
    fn new(fps: u32, now: Instant) -> Self {
        Self {
            budget: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            next_frame: now,
        }
    }

    /// `true` when a frame is due at `now`; schedules the following one.
    fn frame_due(&mut self, now: Instant) -> bool {
        if now < self.next_frame {
            return false;
        }
        self.next_frame += self.budget;
        // after a stall, restart the schedule instead of bursting to catch up
        if self.next_frame <= now {
            self.next_frame = now + self.budget;
        }
        true
    }

    fn deadline(&self) -> Instant {
        self.next_frame
    }
}

pub fn run(settings: Settings) -> Result<()> {
    let mut sim = Simulation::new(&settings)?;

    let event_loop = EventLoop::new()?;
    let mut input = WinitInputHelper::new();

    let window = {
        let viewport = sim.viewport();
        WindowBuilder::new()
            .with_title(sim.hud())
            .with_inner_size(LogicalSize::new(viewport.width, viewport.height))
            .with_min_inner_size(LogicalSize::new(MIN_WIDTH, MIN_HEIGHT))
            .build(&event_loop)?
    };

    let mut buffer_size = sim.viewport();
    let mut pixels = {
        let window_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
        Pixels::new(buffer_size.width, buffer_size.height, surface_texture)?
    };

    let mut limiter = FrameLimiter::new(settings.fps, Instant::now());
    let mut last_generation = Instant::now();
    let mut title = sim.hud();
    let mut failure: Option<Error> = None;

    let res = event_loop.run(|event, elwt| {
        // The one and only event that winit_input_helper doesn't have for us...
        if let Event::WindowEvent {
            event: WindowEvent::RedrawRequested,
            ..
        } = event
        {
            render::draw(&sim, pixels.frame_mut());
            if let Err(err) = pixels.render() {
                log_error("pixels.render", &err);
                failure = Some(err.into());
                elwt.exit();
                return;
            }
        }

        // For everything else, let winit_input_helper collect events to build its state.
        // It returns `true` when it is time to update our game state and request a redraw.
        if !input.update(&event) {
            return;
        }

        if input.close_requested() {
            elwt.exit();
            return;
        }

        for (key, command) in KEY_BINDINGS {
            if input.key_pressed(key) && sim.apply(command) == Flow::Quit {
                elwt.exit();
                return;
            }
        }

        if let Some(command) = scroll_command(input.scroll_diff().1) {
            sim.apply(command);
        }

        if input.key_pressed(KeyCode::F1) {
            for line in help() {
                info!("{line}");
            }
        }

        if input.key_pressed(KeyCode::KeyS) {
            // a failed save is reported but never ends the game
            if let Err(err) = pattern::save(sim.grid(), Path::new(".")) {
                log_error("pattern::save", &err);
            }
        }

        let paint = if input.mouse_held(LEFT_BUTTON) || input.mouse_pressed(LEFT_BUTTON) {
            Some(true)
        } else if input.mouse_held(RIGHT_BUTTON) || input.mouse_pressed(RIGHT_BUTTON) {
            Some(false)
        } else {
            None
        };
        if let Some(alive) = paint {
            paint_under_cursor(&mut sim, &input, &pixels, alive);
        }

        if let Some(size) = input.window_resized() {
            if let Err(err) = pixels.resize_surface(size.width, size.height) {
                log_error("pixels.resize_surface", &err);
                failure = Some(err.into());
                elwt.exit();
                return;
            }
            let logical: LogicalSize<u32> = size.to_logical(window.scale_factor());
            sim.apply(Command::ResizeViewport {
                width: logical.width,
                height: logical.height,
            });
        }

        let viewport = sim.viewport();
        if viewport != buffer_size {
            debug!("resizing pixel buffer to {}x{}", viewport.width, viewport.height);
            if let Err(err) = pixels.resize_buffer(viewport.width, viewport.height) {
                log_error("pixels.resize_buffer", &err);
                failure = Some(err.into());
                elwt.exit();
                return;
            }
            buffer_size = viewport;
        }

        if limiter.frame_due(Instant::now()) {
            window.request_redraw();
        }

        if last_generation.elapsed() >= sim.generation_interval() {
            sim.tick();
            last_generation = Instant::now();
        }

        let hud = sim.hud();
        if hud != title {
            window.set_title(&hud);
            title = hud;
        }

        elwt.set_control_flow(ControlFlow::WaitUntil(limiter.deadline()));
    });

    if let Some(err) = failure {
        return Err(err);
    }
    res.map_err(Error::from)
}

/// Paint every cell the pointer crossed since the last update. Positions
/// outside the window are ignored.
fn paint_under_cursor(
    sim: &mut Simulation,
    input: &WinitInputHelper,
    pixels: &Pixels,
    alive: bool,
) {
    let Some((mx, my)) = input.cursor() else {
        return;
    };
    let Ok((x, y)) = pixels.window_pos_to_pixel((mx, my)) else {
        return;
    };
    let (dx, dy) = input.cursor_diff();
    let (px, py) = pixels
        .window_pos_to_pixel((mx - dx, my - dy))
        .unwrap_or_else(|pos| pixels.clamp_pixel_pos(pos));

    let to = sim.cell_coords(x as isize, y as isize);
    let from = sim.cell_coords(px as isize, py as isize);
    if from == to {
        if let Some((x, y)) = sim.cell_at(x as isize, y as isize) {
            sim.apply(Command::Paint { x, y, alive });
        }
    } else {
        debug!("painting from {from:?} to {to:?}");
        sim.paint_line(from, to, alive);
    }
}

pub fn log_error<E: std::error::Error + 'static>(method_name: &str, err: &E) {
    error!("{method_name}() failed: {err}");
    for source in err.sources().skip(1) {
        error!("  Caused by: {source}");
    }
}

use std::convert::Infallible;
use std::path::PathBuf;

use clap::Parser;
use log::warn;

pub const TITLE: &str = "Conway's Game of Life";

pub const DEFAULT_CELL_SIZE: u32 = 16;
pub const MIN_CELL_SIZE: u32 = 8;
pub const MAX_CELL_SIZE: u32 = 100;
pub const CELL_SIZE_STEP: u32 = 2;
pub const CELL_SIZE_PRESETS: [u32; 4] = [8, 16, 32, 64];

pub const DEFAULT_FPS: u32 = 144;
pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 1000;

pub const DEFAULT_GENS_PER_SEC: u32 = 20;
pub const MIN_GENS_PER_SEC: u32 = 1;
pub const MAX_GENS_PER_SEC: u32 = 50;
pub const GENS_PER_SEC_STEP: u32 = 1;

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;
pub const MIN_WIDTH: u32 = 640;
pub const MIN_HEIGHT: u32 = 360;
pub const MAX_WIDTH: u32 = 8192;
pub const MAX_HEIGHT: u32 = 8192;

/// An integer flag as typed. Anything that does not parse is kept as `None`
/// so it can fall back to the default instead of aborting startup.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntArg(Option<i64>);

fn lenient_int(value: &str) -> Result<IntArg, Infallible> {
    Ok(IntArg(value.trim().parse().ok()))
}

#[derive(Debug, Parser)]
#[command(version, about = "Conway's Game of Life on a wrapping grid")]
pub struct Args {
    /// Startup size of each cell in pixels, between 8 and 100.
    #[arg(short = 's', long = "size", value_name = "INT", value_parser = lenient_int)]
    size: Option<IntArg>,
    /// Framerate cap, at least 1.
    #[arg(short = 'f', long = "fps", value_name = "INT", value_parser = lenient_int)]
    fps: Option<IntArg>,
    /// Startup number of generations per second, between 1 and 50.
    #[arg(short = 'g', long = "gens", value_name = "INT", value_parser = lenient_int)]
    gens: Option<IntArg>,
    /// Startup window width, at least 640.
    #[arg(short = 'W', long = "width", value_name = "INT", value_parser = lenient_int)]
    width: Option<IntArg>,
    /// Startup window height, at least 360.
    #[arg(short = 'H', long = "height", value_name = "INT", value_parser = lenient_int)]
    height: Option<IntArg>,
    /// Pattern file to start from instead of a random grid.
    #[arg(short = 'F', long = "file", value_name = "PATH")]
    file: Option<PathBuf>,
    /// Start paused, waiting for a manual step.
    #[arg(long)]
    paused: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub cell_size: u32,
    pub fps: u32,
    pub gens_per_sec: u32,
    pub width: u32,
    pub height: u32,
    pub pattern: Option<PathBuf>,
    pub start_paused: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            fps: DEFAULT_FPS,
            gens_per_sec: DEFAULT_GENS_PER_SEC,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            pattern: None,
            start_paused: false,
        }
    }
}

/// Resolve one integer flag: absent means default, unparsable or non-positive
/// falls back to the default, anything else is clamped into `[min, max]`.
fn resolve(name: &str, arg: Option<IntArg>, default: u32, min: u32, max: u32) -> u32 {
    let Some(IntArg(value)) = arg else {
        return default;
    };
    match value {
        Some(v) if v > 0 => {
            let clamped = v.clamp(min as i64, max as i64) as u32;
            if clamped as i64 != v {
                warn!("{name} {v} is out of range, using {clamped}");
            }
            clamped
        }
        _ => {
            warn!("invalid {name}, using default {default}");
            default
        }
    }
}

impl From<Args> for Settings {
    fn from(args: Args) -> Self {
        Self {
            cell_size: resolve(
                "cell size",
                args.size,
                DEFAULT_CELL_SIZE,
                MIN_CELL_SIZE,
                MAX_CELL_SIZE,
            ),
            fps: resolve("fps", args.fps, DEFAULT_FPS, MIN_FPS, MAX_FPS),
            gens_per_sec: resolve(
                "generations per second",
                args.gens,
                DEFAULT_GENS_PER_SEC,
                MIN_GENS_PER_SEC,
                MAX_GENS_PER_SEC,
            ),
            width: resolve("width", args.width, DEFAULT_WIDTH, MIN_WIDTH, MAX_WIDTH),
            height: resolve("height", args.height, DEFAULT_HEIGHT, MIN_HEIGHT, MAX_HEIGHT),
            pattern: args.file,
            start_paused: args.paused,
        }
    }
}

impl Settings {
    pub fn from_cli() -> Self {
        Args::parse().into()
    }
}

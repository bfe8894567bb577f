use std::path::PathBuf;

use thiserror::Error;

use crate::config::MIN_CELL_SIZE;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read pattern file {}", .path.display())]
    ReadPattern {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("illegal character {found:?} in pattern at line {line}, column {column}")]
    IllegalCharacter {
        found: char,
        line: usize,
        column: usize,
    },

    #[error("pattern file contains no cells")]
    EmptyPattern,

    #[error(
        "a {columns}x{rows} pattern needs cells of {cell_size}px to fit, below the minimum of {}px",
        MIN_CELL_SIZE
    )]
    CellSizeTooSmall {
        columns: usize,
        rows: usize,
        cell_size: u32,
    },

    #[error("cannot save pattern to {}", .path.display())]
    SavePattern {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Pixels(#[from] pixels::Error),

    #[error(transparent)]
    Texture(#[from] pixels::TextureError),

    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error(transparent)]
    Window(#[from] winit::error::OsError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

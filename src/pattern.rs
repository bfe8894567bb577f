//! Plain-text patterns: one line per row, one character per cell.
//!
//! `1`, `o` and `O` mark live cells; `0`, `.` and `_` mark dead ones. Short
//! rows are padded with dead cells up to the longest row. Saved patterns use
//! `1` and `.` only.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::{MAX_CELL_SIZE, MIN_CELL_SIZE};
use crate::error::{Error, Result};
use crate::life::Grid;

const ALIVE_MARKERS: [char; 3] = ['1', 'o', 'O'];
const DEAD_MARKERS: [char; 3] = ['0', '.', '_'];

/// Parse pattern text into a grid exactly as large as the pattern.
pub fn parse(text: &str) -> Result<Grid> {
    let mut rows = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let row = line
            .chars()
            .enumerate()
            .map(|(col, found)| {
                if ALIVE_MARKERS.contains(&found) {
                    Ok(true)
                } else if DEAD_MARKERS.contains(&found) {
                    Ok(false)
                } else {
                    Err(Error::IllegalCharacter {
                        found,
                        line: line_no + 1,
                        column: col + 1,
                    })
                }
            })
            .collect::<Result<Vec<bool>>>()?;
        rows.push(row);
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return Err(Error::EmptyPattern);
    }
    Ok(Grid::from_fn(width, rows.len(), |x, y| {
        rows[y].get(x).copied().unwrap_or(false)
    }))
}

pub fn load(path: &Path) -> Result<Grid> {
    let text = fs::read_to_string(path).map_err(|source| Error::ReadPattern {
        path: path.to_owned(),
        source,
    })?;
    let grid = parse(&text)?;
    info!(
        "loaded {}x{} pattern from {}",
        grid.width(),
        grid.height(),
        path.display()
    );
    Ok(grid)
}

/// Largest cell size that shows the whole pattern in a `width` x `height`
/// viewport, capped at `MAX_CELL_SIZE`.
pub fn fit_cell_size(pattern: &Grid, width: u32, height: u32) -> Result<u32> {
    let by_width = width as usize / pattern.width();
    let by_height = height as usize / pattern.height();
    let cell_size = by_width.min(by_height).min(MAX_CELL_SIZE as usize) as u32;
    if cell_size < MIN_CELL_SIZE {
        return Err(Error::CellSizeTooSmall {
            columns: pattern.width(),
            rows: pattern.height(),
            cell_size,
        });
    }
    Ok(cell_size)
}

/// Row-major text, one newline-terminated line per grid row.
pub fn format(grid: &Grid) -> String {
    let mut out = String::with_capacity((grid.width() + 1) * grid.height());
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            out.push(if grid.is_alive(x, y) { '1' } else { '.' });
        }
        out.push('\n');
    }
    out
}

/// Write the grid into `dir` under a timestamped file name.
pub fn save(grid: &Grid, dir: &Path) -> Result<PathBuf> {
    let name = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S%.3f.txt");
    let path = dir.join(name.to_string());
    fs::write(&path, format(grid)).map_err(|source| Error::SavePattern {
        path: path.clone(),
        source,
    })?;
    info!("saved {}x{} pattern to {}", grid.width(), grid.height(), path.display());
    Ok(path)
}

use crate::controller::Simulation;
use crate::life::cell::{Color, GREY, WHITE};

const BACKGROUND: Color = WHITE;
const GRID_LINE: Color = GREY;

/// A mutable view of an RGBA frame `width` pixels wide.
struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl Canvas<'_> {
    fn clear(&mut self, color: Color) {
        let rgba = color.to_rgba();
        for pix in self.frame.chunks_exact_mut(4) {
            pix.copy_from_slice(&rgba);
        }
    }

    /// Fill a rectangle, clipped to the frame.
    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Color) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        if x >= x_end {
            return;
        }
        let rgba = color.to_rgba();
        for row in y..y_end {
            let start = (row * self.width + x) * 4;
            let end = (row * self.width + x_end) * 4;
            for pix in self.frame[start..end].chunks_exact_mut(4) {
                pix.copy_from_slice(&rgba);
            }
        }
    }
}

/// Draw the grid into `frame`, an RGBA buffer the size of the viewport.
pub fn draw(sim: &Simulation, frame: &mut [u8]) {
    let viewport = sim.viewport();
    let mut canvas = Canvas {
        frame,
        width: viewport.width as usize,
        height: viewport.height as usize,
    };
    debug_assert_eq!(canvas.frame.len(), 4 * canvas.width * canvas.height);

    canvas.clear(BACKGROUND);

    let size = sim.cell_size() as usize;
    let margin = sim.margin_x() as usize;
    for (x, y, cell) in sim.grid().iter() {
        canvas.fill_rect(margin + x * size, y * size, size, size, cell.color);
    }

    if sim.show_grid() {
        let grid = sim.grid();
        let (w, h) = (grid.width() * size, grid.height() * size);
        for x in 0..=grid.width() {
            canvas.fill_rect(margin + x * size, 0, 1, h + 1, GRID_LINE);
        }
        for y in 0..=grid.height() {
            canvas.fill_rect(margin, y * size, w + 1, 1, GRID_LINE);
        }
    }
}

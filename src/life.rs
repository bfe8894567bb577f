pub mod cell;

use crate::life::cell::{Cell, CellStyle};

/// Generate a pseudorandom seed for the game's PRNG.
fn generate_seed() -> (u64, u64) {
    use byteorder::{ByteOrder, NativeEndian};

    let mut seed = [0_u8; 16];

    if let Err(err) = getrandom::getrandom(&mut seed) {
        log::warn!("getrandom failed ({err}), falling back to the clock for a seed");
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        seed.copy_from_slice(&nanos.to_ne_bytes());
    }

    (
        NativeEndian::read_u64(&seed[0..8]),
        NativeEndian::read_u64(&seed[8..16]),
    )
}

/// The eight toroidal neighbor offsets; the cell itself is not among them.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FillMode {
    Random,
    AllDead,
    AllAlive,
}

/// A fixed-size toroidal grid of cells, stored column-major (`x * height + y`).
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    // Same size as `cells`. `step` reads from `cells`, writes here, then swaps.
    scratch_cells: Vec<Cell>,
    generation: u64,
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.generation == other.generation
            && self.cells == other.cells
    }
}

impl Grid {
    pub fn new_empty(width: usize, height: usize) -> Self {
        assert!(width != 0 && height != 0, "grid must be at least 1x1");
        let size = width.checked_mul(height).expect("grid too big");
        Self {
            width,
            height,
            cells: vec![Cell::dead(); size],
            scratch_cells: vec![Cell::dead(); size],
            generation: 0,
        }
    }

    pub fn new_random(width: usize, height: usize) -> Self {
        let mut result = Self::new_empty(width, height);
        result.fill(FillMode::Random);
        result
    }

    /// Build a grid whose liveness is given by `alive(x, y)`.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut alive: impl FnMut(usize, usize) -> bool,
    ) -> Self {
        let mut result = Self::new_empty(width, height);
        for x in 0..width {
            for y in 0..height {
                let i = result.index(x, y);
                result.cells[i] = Cell::new(alive(x, y));
            }
        }
        result
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn index(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_some_and(|c| c.alive)
    }

    /// Cells with their coordinates, column by column.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        let height = self.height;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| (i / height, i % height, c))
    }

    /// Set every cell per `mode`, restarting the generation count.
    pub fn fill(&mut self, mode: FillMode) {
        match mode {
            FillMode::Random => {
                let mut rng: randomize::PCG32 = generate_seed().into();
                for c in self.cells.iter_mut() {
                    let alive = randomize::f32_half_open_right(rng.next_u32()) < 0.5;
                    *c = Cell::new(alive);
                }
            }
            FillMode::AllDead => self.cells.fill(Cell::dead()),
            FillMode::AllAlive => self.cells.fill(Cell::alive()),
        }
        self.generation = 0;
    }

    /// Set a single cell. Returns `true` if anything changed; out-of-range
    /// coordinates and cells already in the requested state are left alone.
    pub fn toggle_cell(&mut self, x: usize, y: usize, alive: bool) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let i = self.index(x, y);
        self.cells[i].set_alive(alive)
    }

    pub fn count_alive(&self) -> usize {
        self.cells.iter().filter(|c| c.alive).count()
    }

    /// Live cells among the eight wrapped neighbors of `(x, y)`. On grids one
    /// cell wide or tall the wrapped offsets land on the cell itself, which is
    /// then counted like any other neighbor.
    pub fn count_neighbors(&self, x: usize, y: usize) -> usize {
        let (w, h) = (self.width as isize, self.height as isize);
        NEIGHBOR_OFFSETS
            .iter()
            .filter(|(dx, dy)| {
                let nx = (x as isize + dx).rem_euclid(w) as usize;
                let ny = (y as isize + dy).rem_euclid(h) as usize;
                self.cells[self.index(nx, ny)].alive
            })
            .count()
    }

    /// Advance one generation. All counts are taken from the current cells
    /// before any of them is overwritten.
    pub fn step(&mut self, style: &CellStyle) {
        for x in 0..self.width {
            for y in 0..self.height {
                let neighbors = self.count_neighbors(x, y);
                let i = self.index(x, y);
                // Write into scratch_cells, since we're still reading from `self.cells`
                self.scratch_cells[i] = self.cells[i].update_neighbors(neighbors, style);
            }
        }
        std::mem::swap(&mut self.scratch_cells, &mut self.cells);
        self.generation += 1;
    }

    /// The next generation as a new grid, leaving `self` untouched.
    #[must_use]
    pub fn next_state(&self, style: &CellStyle) -> Self {
        let mut next = self.clone();
        next.step(style);
        next
    }

    /// Copy this grid into a new `width` x `height` grid. Coordinates present
    /// in both keep their cell; the rest start dead. The generation carries over.
    #[must_use]
    pub fn migrate(&self, width: usize, height: usize) -> Self {
        let mut result = Self::new_empty(width, height);
        for x in 0..width {
            for y in 0..height {
                if let Some(cell) = self.get(x, y) {
                    let i = result.index(x, y);
                    result.cells[i] = *cell;
                }
            }
        }
        result.generation = self.generation;
        result
    }
}

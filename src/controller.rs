use std::time::Duration;

use log::{debug, info};

use crate::config::{
    Settings, CELL_SIZE_PRESETS, CELL_SIZE_STEP, GENS_PER_SEC_STEP, MAX_CELL_SIZE, MAX_GENS_PER_SEC,
    MAX_HEIGHT, MAX_WIDTH, MIN_CELL_SIZE, MIN_GENS_PER_SEC, MIN_HEIGHT, MIN_WIDTH, TITLE,
};
use crate::error::Result;
use crate::life::cell::{CellStyle, TRAIL_COLORS};
use crate::life::{FillMode, Grid};
use crate::pattern;

/// Everything the user can ask for, independent of which key or button asked.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    /// Advance a single generation; ignored while running.
    Step,
    Randomize,
    Clear,
    FillAlive,
    /// Bigger cells, so fewer of them.
    GrowCells,
    /// Smaller cells, so more of them.
    ShrinkCells,
    CycleCellSize,
    ResizeViewport { width: u32, height: u32 },
    SpeedUp,
    SlowDown,
    ToggleGrid,
    ToggleTrail,
    NextTrailColor,
    Paint { x: usize, y: usize, alive: bool },
    Quit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Which way the cell count moved when the grid was rebuilt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Reshape {
    Increase,
    Decrease,
    Keep,
}

impl Reshape {
    fn between(old: (usize, usize), new: (usize, usize)) -> Self {
        match (new.0 * new.1).cmp(&(old.0 * old.1)) {
            std::cmp::Ordering::Greater => Reshape::Increase,
            std::cmp::Ordering::Less => Reshape::Decrease,
            std::cmp::Ordering::Equal => Reshape::Keep,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    fn clamped(width: u32, height: u32) -> Self {
        Self {
            width: width.clamp(MIN_WIDTH, MAX_WIDTH),
            height: height.clamp(MIN_HEIGHT, MAX_HEIGHT),
        }
    }

    /// How many whole cells of `cell_size` fit, at least one each way.
    fn grid_dimensions(&self, cell_size: u32) -> (usize, usize) {
        (
            (self.width / cell_size).max(1) as usize,
            (self.height / cell_size).max(1) as usize,
        )
    }
}

/// Owns the grid and every piece of state the user can change.
#[derive(Debug)]
pub struct Simulation {
    grid: Grid,
    viewport: Viewport,
    cell_size: u32,
    preset: usize,
    gens_per_sec: u32,
    paused: bool,
    show_grid: bool,
    trail: bool,
    trail_color: usize,
}

impl Simulation {
    /// Start from the configured pattern file, or a random grid without one.
    pub fn new(settings: &Settings) -> Result<Self> {
        let viewport = Viewport::clamped(settings.width, settings.height);
        match &settings.pattern {
            Some(path) => {
                let pattern = pattern::load(path)?;
                let cell_size = pattern::fit_cell_size(&pattern, viewport.width, viewport.height)?;
                let (width, height) = viewport.grid_dimensions(cell_size);
                Ok(Self::with_grid(settings, cell_size, pattern.migrate(width, height)))
            }
            None => {
                let cell_size = settings.cell_size.clamp(MIN_CELL_SIZE, MAX_CELL_SIZE);
                let (width, height) = viewport.grid_dimensions(cell_size);
                Ok(Self::with_grid(settings, cell_size, Grid::new_random(width, height)))
            }
        }
    }

    fn with_grid(settings: &Settings, cell_size: u32, grid: Grid) -> Self {
        let preset = CELL_SIZE_PRESETS
            .iter()
            .position(|&size| size == cell_size)
            .unwrap_or(CELL_SIZE_PRESETS.len() - 1);
        Self {
            grid,
            viewport: Viewport::clamped(settings.width, settings.height),
            cell_size,
            preset,
            gens_per_sec: settings.gens_per_sec.clamp(MIN_GENS_PER_SEC, MAX_GENS_PER_SEC),
            paused: settings.start_paused,
            show_grid: true,
            trail: false,
            trail_color: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn gens_per_sec(&self) -> u32 {
        self.gens_per_sec
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn style(&self) -> CellStyle {
        CellStyle {
            trail: self.trail,
            trail_color: TRAIL_COLORS[self.trail_color],
        }
    }

    pub fn generation_interval(&self) -> Duration {
        Duration::from_millis(1000 / self.gens_per_sec as u64)
    }

    /// Horizontal offset that centers the grid in the viewport.
    pub fn margin_x(&self) -> u32 {
        let used = self.grid.width() as u32 * self.cell_size;
        self.viewport.width.saturating_sub(used) / 2
    }

    /// Cell coordinates under a viewport pixel, which may lie outside the grid.
    pub fn cell_coords(&self, px: isize, py: isize) -> (isize, isize) {
        let size = self.cell_size as isize;
        (
            (px - self.margin_x() as isize).div_euclid(size),
            py.div_euclid(size),
        )
    }

    /// The grid cell under a viewport pixel, if there is one.
    pub fn cell_at(&self, px: isize, py: isize) -> Option<(usize, usize)> {
        let (x, y) = self.cell_coords(px, py);
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.grid.width() && y < self.grid.height()).then_some((x, y))
    }

    /// Set every cell on the segment between two cells, clipped to the grid.
    pub fn paint_line(&mut self, from: (isize, isize), to: (isize, isize), alive: bool) {
        let far = (
            self.grid.width() as isize - 1,
            self.grid.height() as isize - 1,
        );
        let grid = &mut self.grid;
        let _ = clipline::clipline((from, to), ((0, 0), far), |x, y| {
            grid.toggle_cell(x as usize, y as usize, alive);
        });
    }

    /// Called on every generation timer tick.
    pub fn tick(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.grid.step(&self.style());
        true
    }

    pub fn apply(&mut self, command: Command) -> Flow {
        match command {
            Command::TogglePause => {
                self.paused = !self.paused;
                info!("toggling pause ({})", self.run_state());
            }
            Command::Step => {
                if self.paused {
                    info!("displaying next generation");
                    self.grid.step(&self.style());
                } else {
                    debug!("step ignored while running");
                }
            }
            Command::Randomize => {
                info!("randomizing grid");
                self.grid.fill(FillMode::Random);
            }
            Command::Clear => {
                info!("clearing grid");
                self.grid.fill(FillMode::AllDead);
            }
            Command::FillAlive => {
                info!("filling grid");
                self.grid.fill(FillMode::AllAlive);
            }
            Command::GrowCells => {
                let size = (self.cell_size + CELL_SIZE_STEP).min(MAX_CELL_SIZE);
                info!("cell size increased to {size}");
                self.set_cell_size(size);
            }
            Command::ShrinkCells => {
                let size = self.cell_size.saturating_sub(CELL_SIZE_STEP).max(MIN_CELL_SIZE);
                info!("cell size decreased to {size}");
                self.set_cell_size(size);
            }
            Command::CycleCellSize => {
                self.preset = (self.preset + 1) % CELL_SIZE_PRESETS.len();
                let size = CELL_SIZE_PRESETS[self.preset];
                info!("switching cell size to {size}");
                self.set_cell_size(size);
            }
            Command::ResizeViewport { width, height } => {
                self.viewport = Viewport::clamped(width, height);
                debug!("viewport is now {}x{}", self.viewport.width, self.viewport.height);
                self.reshape();
            }
            Command::SpeedUp => {
                self.gens_per_sec = (self.gens_per_sec + GENS_PER_SEC_STEP).min(MAX_GENS_PER_SEC);
                info!("generations per second increased to {}", self.gens_per_sec);
            }
            Command::SlowDown => {
                self.gens_per_sec = self
                    .gens_per_sec
                    .saturating_sub(GENS_PER_SEC_STEP)
                    .max(MIN_GENS_PER_SEC);
                info!("generations per second decreased to {}", self.gens_per_sec);
            }
            Command::ToggleGrid => {
                self.show_grid = !self.show_grid;
                info!("toggling grid lines");
            }
            Command::ToggleTrail => {
                self.trail = !self.trail;
                info!("toggling trail view");
            }
            Command::NextTrailColor => {
                self.trail_color = (self.trail_color + 1) % TRAIL_COLORS.len();
                info!("next trail color");
            }
            Command::Paint { x, y, alive } => {
                if self.grid.toggle_cell(x, y, alive) {
                    debug!("painted ({x}, {y}) {}", if alive { "alive" } else { "dead" });
                }
            }
            Command::Quit => {
                info!("quitting");
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    fn set_cell_size(&mut self, cell_size: u32) {
        self.cell_size = cell_size.clamp(MIN_CELL_SIZE, MAX_CELL_SIZE);
        self.reshape();
    }

    /// Rebuild the grid for the current viewport and cell size.
    fn reshape(&mut self) {
        let old = (self.grid.width(), self.grid.height());
        let new = self.viewport.grid_dimensions(self.cell_size);
        if old == new {
            return;
        }
        let direction = Reshape::between(old, new);
        debug!("{direction:?} grid from {}x{} to {}x{}", old.0, old.1, new.0, new.1);
        self.grid = self.grid.migrate(new.0, new.1);
    }

    fn run_state(&self) -> &'static str {
        if self.paused {
            "paused"
        } else {
            "running"
        }
    }

    /// Status line shown in the window title.
    pub fn hud(&self) -> String {
        format!(
            "{TITLE} | generation {} | alive {} | {}x{} cells of {}px | {} gen/s | {}",
            self.grid.generation(),
            self.grid.count_alive(),
            self.grid.width(),
            self.grid.height(),
            self.cell_size,
            self.gens_per_sec,
            self.run_state(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::life::cell::{Cell, LIGHTER_GREY};

    fn settings() -> Settings {
        Settings {
            width: 640,
            height: 360,
            ..Settings::default()
        }
    }

    fn cleared() -> Simulation {
        let mut sim = Simulation::new(&settings()).unwrap();
        sim.apply(Command::Clear);
        sim
    }

    #[test]
    fn grid_matches_viewport() {
        let sim = Simulation::new(&settings()).unwrap();
        assert_eq!((sim.grid().width(), sim.grid().height()), (40, 22));
        assert_eq!(sim.margin_x(), 0);
        assert!(!sim.is_paused());
        assert_eq!(sim.grid().generation(), 0);
    }

    #[test]
    fn start_paused_from_settings() {
        let sim = Simulation::new(&Settings {
            start_paused: true,
            ..settings()
        })
        .unwrap();
        assert!(sim.is_paused());
    }

    #[test]
    fn step_only_while_paused() {
        let mut sim = cleared();
        sim.apply(Command::Step);
        assert_eq!(sim.grid().generation(), 0);

        sim.apply(Command::TogglePause);
        assert!(sim.is_paused());
        assert!(!sim.tick());
        sim.apply(Command::Step);
        sim.apply(Command::Step);
        assert_eq!(sim.grid().generation(), 2);

        sim.apply(Command::TogglePause);
        assert!(sim.tick());
        assert_eq!(sim.grid().generation(), 3);
    }

    #[test]
    fn fills_reset_generation() {
        let mut sim = cleared();
        sim.tick();
        sim.apply(Command::FillAlive);
        assert_eq!(sim.grid().count_alive(), 40 * 22);
        assert_eq!(sim.grid().generation(), 0);
        sim.tick();
        sim.apply(Command::Randomize);
        assert_eq!(sim.grid().generation(), 0);
        sim.apply(Command::Clear);
        assert_eq!(sim.grid().count_alive(), 0);
    }

    #[test]
    fn speed_stays_in_bounds() {
        let mut sim = cleared();
        for _ in 0..200 {
            sim.apply(Command::SpeedUp);
            assert!(sim.gens_per_sec() <= MAX_GENS_PER_SEC);
        }
        assert_eq!(sim.gens_per_sec(), MAX_GENS_PER_SEC);
        for _ in 0..200 {
            sim.apply(Command::SlowDown);
            assert!(sim.gens_per_sec() >= MIN_GENS_PER_SEC);
        }
        assert_eq!(sim.gens_per_sec(), MIN_GENS_PER_SEC);
        assert_eq!(sim.generation_interval(), Duration::from_secs(1));
    }

    #[test]
    fn cell_size_stays_in_bounds() {
        let mut sim = cleared();
        for _ in 0..100 {
            sim.apply(Command::GrowCells);
            assert!(sim.cell_size() <= MAX_CELL_SIZE);
        }
        assert_eq!(sim.cell_size(), MAX_CELL_SIZE);
        assert_eq!((sim.grid().width(), sim.grid().height()), (6, 3));
        for _ in 0..100 {
            sim.apply(Command::ShrinkCells);
            assert!(sim.cell_size() >= MIN_CELL_SIZE);
        }
        assert_eq!(sim.cell_size(), MIN_CELL_SIZE);
        assert_eq!((sim.grid().width(), sim.grid().height()), (80, 45));
    }

    #[test]
    fn resizing_cells_migrates_state() {
        let mut sim = cleared();
        sim.apply(Command::Paint { x: 1, y: 1, alive: true });
        sim.apply(Command::Paint { x: 39, y: 21, alive: true });
        sim.apply(Command::TogglePause);
        sim.apply(Command::Step);
        sim.apply(Command::Paint { x: 1, y: 1, alive: true });

        // smaller cells: more of them, everything kept
        sim.apply(Command::ShrinkCells);
        assert_eq!(sim.cell_size(), 14);
        assert_eq!((sim.grid().width(), sim.grid().height()), (45, 25));
        assert!(sim.grid().is_alive(1, 1));
        assert_eq!(sim.grid().count_alive(), 1);
        assert_eq!(sim.grid().generation(), 1);
        assert!(sim.is_paused());

        // bigger cells: fewer of them, the far corner is gone
        sim.apply(Command::Paint { x: 44, y: 24, alive: true });
        sim.apply(Command::GrowCells);
        sim.apply(Command::GrowCells);
        assert_eq!((sim.grid().width(), sim.grid().height()), (35, 20));
        assert_eq!(sim.grid().count_alive(), 1);
        assert_eq!(sim.grid().generation(), 1);
    }

    #[test]
    fn presets_cycle_by_index() {
        let mut sim = cleared();
        assert_eq!(sim.cell_size(), 16);
        let sizes: Vec<u32> = (0..5)
            .map(|_| {
                sim.apply(Command::CycleCellSize);
                sim.cell_size()
            })
            .collect();
        assert_eq!(sizes, vec![32, 64, 8, 16, 32]);
    }

    #[test]
    fn viewport_resize_is_clamped_and_migrates() {
        let mut sim = cleared();
        sim.apply(Command::Paint { x: 2, y: 3, alive: true });
        sim.apply(Command::ResizeViewport { width: 100, height: 100 });
        assert_eq!(
            sim.viewport(),
            Viewport {
                width: MIN_WIDTH,
                height: MIN_HEIGHT
            }
        );
        sim.apply(Command::ResizeViewport { width: 1000, height: 800 });
        assert_eq!((sim.grid().width(), sim.grid().height()), (62, 50));
        assert_eq!(sim.margin_x(), 4);
        assert!(sim.grid().is_alive(2, 3));
        assert_eq!(sim.grid().count_alive(), 1);
    }

    #[test]
    fn pixels_map_to_cells_around_margin() {
        let mut sim = cleared();
        sim.apply(Command::ResizeViewport { width: 1000, height: 800 });
        assert_eq!(sim.cell_at(0, 0), None);
        assert_eq!(sim.cell_at(4, 0), Some((0, 0)));
        assert_eq!(sim.cell_at(4 + 16 * 3 + 15, 16 * 2), Some((3, 2)));
        assert_eq!(sim.cell_at(996, 10), None);
        assert_eq!(sim.cell_at(10, 800), None);
        assert_eq!(sim.cell_coords(-20, -1), (-2, -1));
    }

    #[test]
    fn paint_is_idempotent() {
        let mut sim = cleared();
        sim.apply(Command::Paint { x: 5, y: 5, alive: true });
        let before = sim.grid().clone();
        sim.apply(Command::Paint { x: 5, y: 5, alive: true });
        assert_eq!(sim.grid(), &before);
        sim.apply(Command::Paint { x: 500, y: 5, alive: true });
        assert_eq!(sim.grid(), &before);
    }

    #[test]
    fn paint_line_clips_to_grid() {
        let mut sim = cleared();
        sim.paint_line((-5, 3), (4, 3), true);
        for x in 0..4 {
            assert!(sim.grid().is_alive(x, 3), "({x}, 3) not painted");
        }
        assert!(sim.grid().count_alive() <= 5);
        sim.paint_line((0, 3), (100, 3), false);
        assert_eq!(sim.grid().count_alive(), 0);
    }

    #[test]
    fn trail_settings_flow_into_style() {
        let mut sim = cleared();
        assert!(!sim.style().trail);
        sim.apply(Command::ToggleTrail);
        sim.apply(Command::NextTrailColor);
        assert_eq!(
            sim.style(),
            CellStyle {
                trail: true,
                trail_color: LIGHTER_GREY,
            }
        );
        for _ in 0..TRAIL_COLORS.len() {
            sim.apply(Command::NextTrailColor);
        }
        assert_eq!(sim.style().trail_color, LIGHTER_GREY);

        sim.apply(Command::Paint { x: 0, y: 0, alive: true });
        sim.tick();
        assert_eq!(
            sim.grid().get(0, 0),
            Some(&Cell {
                alive: false,
                color: LIGHTER_GREY
            })
        );
    }

    #[test]
    fn loads_pattern_into_viewport() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glider.txt");
        std::fs::write(&path, ".O.\n..O\nOOO\n").unwrap();
        let sim = Simulation::new(&Settings {
            pattern: Some(path),
            ..settings()
        })
        .unwrap();
        assert_eq!(sim.cell_size(), MAX_CELL_SIZE);
        assert_eq!((sim.grid().width(), sim.grid().height()), (6, 3));
        assert_eq!(sim.grid().count_alive(), 5);
        assert!(sim.grid().is_alive(1, 0));
        assert!(sim.grid().is_alive(2, 2));
    }

    #[test]
    fn oversized_pattern_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.txt");
        std::fs::write(&path, ".".repeat(200)).unwrap();
        let err = Simulation::new(&Settings {
            pattern: Some(path),
            ..settings()
        })
        .unwrap_err();
        assert!(matches!(err, crate::error::Error::CellSizeTooSmall { .. }));
    }

    #[test]
    fn quit_ends_the_loop() {
        let mut sim = cleared();
        assert_eq!(sim.apply(Command::ToggleGrid), Flow::Continue);
        assert!(!sim.show_grid());
        assert_eq!(sim.apply(Command::Quit), Flow::Quit);
    }

    #[test]
    fn resize_to_same_grid_keeps_it() {
        let mut sim = cleared();
        sim.apply(Command::Paint { x: 1, y: 1, alive: true });
        sim.tick();
        let before = sim.grid().clone();
        let (w, h) = (before.width() as u32 * 16, before.height() as u32 * 16);
        // a few extra pixels do not fit another column or row
        sim.apply(Command::ResizeViewport {
            width: w + 3,
            height: h + 3,
        });
        assert_eq!(*sim.grid(), before);
    }

    #[test]
    fn reshape_direction() {
        assert_eq!(Reshape::between((4, 4), (5, 4)), Reshape::Increase);
        assert_eq!(Reshape::between((4, 4), (2, 2)), Reshape::Decrease);
        assert_eq!(Reshape::between((4, 4), (4, 4)), Reshape::Keep);
    }

    #[test]
    fn hud_reports_state() {
        let mut sim = cleared();
        sim.apply(Command::TogglePause);
        let hud = sim.hud();
        assert!(hud.contains("generation 0"));
        assert!(hud.contains("alive 0"));
        assert!(hud.contains("40x22 cells of 16px"));
        assert!(hud.contains("paused"));
    }
}

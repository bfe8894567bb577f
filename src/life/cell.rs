/// An RGB display color. Only the renderer looks at it; the rule engine never does.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xff]
    }
}

pub const WHITE: Color = Color::new(255, 255, 255);
pub const LIGHTEST_GREY: Color = Color::new(200, 200, 200);
pub const LIGHTER_GREY: Color = Color::new(150, 150, 150);
pub const LIGHT_GREY: Color = Color::new(110, 110, 110);
pub const GREY: Color = Color::new(64, 64, 64);
pub const BLACK: Color = Color::new(0, 0, 0);

/// Color of a freshly born (or hand-painted) cell.
pub const ALIVE_COLOR: Color = BLACK;
/// Color of a cell that is dead and carries no trail.
pub const DEAD_COLOR: Color = WHITE;

/// Colors a dying cell may leave behind when the trail view is on.
pub const TRAIL_COLORS: [Color; 4] = [LIGHTEST_GREY, LIGHTER_GREY, LIGHT_GREY, WHITE];

/// How cells are painted when a generation changes their state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CellStyle {
    /// Leave `trail_color` behind on cells that die.
    pub trail: bool,
    pub trail_color: Color,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            trail: false,
            trail_color: TRAIL_COLORS[0],
        }
    }
}

impl CellStyle {
    fn death_color(&self) -> Color {
        if self.trail {
            self.trail_color
        } else {
            DEAD_COLOR
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Cell {
    pub alive: bool,
    pub color: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self::dead()
    }
}

impl Cell {
    pub fn new(alive: bool) -> Self {
        if alive {
            Self::alive()
        } else {
            Self::dead()
        }
    }

    pub fn alive() -> Self {
        Self {
            alive: true,
            color: ALIVE_COLOR,
        }
    }

    pub fn dead() -> Self {
        Self {
            alive: false,
            color: DEAD_COLOR,
        }
    }

    /// Apply the birth/survival rule given the number of live neighbors.
    #[must_use]
    pub fn update_neighbors(self, neighbors: usize, style: &CellStyle) -> Self {
        let next_alive = if self.alive {
            neighbors == 2 || neighbors == 3
        } else {
            neighbors == 3
        };
        self.next_state(next_alive, style)
    }

    #[must_use]
    fn next_state(self, alive: bool, style: &CellStyle) -> Self {
        match (self.alive, alive) {
            (true, true) => self.aged(),
            (false, true) => Self::alive(),
            (true, false) => Self {
                alive: false,
                color: style.death_color(),
            },
            // dead cells keep whatever trail they carry
            (false, false) => self,
        }
    }

    /// Survivors drift towards blue, with a little red.
    #[must_use]
    fn aged(mut self) -> Self {
        if self.color.b <= 250 {
            self.color.b += 5;
        }
        if self.color.r < 100 {
            self.color.r += 5;
        }
        self
    }

    /// Set liveness by hand. Returns `true` when the cell actually changed.
    pub fn set_alive(&mut self, alive: bool) -> bool {
        if self.alive == alive {
            return false;
        }
        *self = Self::new(alive);
        true
    }
}

use crate::error::GridError;
use log::debug;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

/// Neighbour enumeration order: Up, Right, Down, Down-Right, Left, Top-Left,
/// Top-Right, Down-Left. Stack based searches expand the last entry first.
pub const DIRECTIONS: [(isize, isize); 8] = [
    (-1, 0),
    (0, 1),
    (1, 0),
    (1, 1),
    (0, -1),
    (-1, -1),
    (-1, 1),
    (1, -1),
];

/// Legend for [`Grid::render`].
pub const LEGEND: &str =
    "Legend: S=Start, T=Target, #=Wall, o=Dynamic wall, *=Path, +=Frontier, x=Explored, .=Empty";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }

    /// The cell displaced by `(dr, dc)`, or `None` when that underflows.
    fn offset(self, dr: isize, dc: isize) -> Option<Cell> {
        Some(Cell {
            row: self.row.checked_add_signed(dr)?,
            col: self.col.checked_add_signed(dc)?,
        })
    }

    /// True when `other` is one of the 8 surrounding cells.
    pub fn is_adjacent(&self, other: &Cell) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        dr <= 1 && dc <= 1 && (dr, dc) != (0, 0)
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Cell { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Parses `ROW,COL`, as accepted on the command line.
impl FromStr for Cell {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s
            .split_once(',')
            .ok_or_else(|| format!("expected ROW,COL but got '{s}'"))?;
        let row = row.trim().parse().map_err(|e| format!("bad row '{row}': {e}"))?;
        let col = col.trim().parse().map_err(|e| format!("bad column '{col}': {e}"))?;
        Ok(Cell { row, col })
    }
}

/// Accumulated movement cost, kept in exact tenths so that 1.0 and 1.4 sums
/// compare without floating point drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathCost(u32);

impl PathCost {
    pub const ZERO: PathCost = PathCost(0);
    pub const ORTHOGONAL: PathCost = PathCost(10);
    pub const DIAGONAL: PathCost = PathCost(14);

    pub const fn from_tenths(tenths: u32) -> Self {
        PathCost(tenths)
    }

    pub const fn tenths(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl Add for PathCost {
    type Output = PathCost;

    fn add(self, rhs: PathCost) -> PathCost {
        PathCost(self.0 + rhs.0)
    }
}

impl fmt::Display for PathCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

/// Search state drawn on top of the grid by [`Grid::render`].
#[derive(Clone, Copy)]
pub struct Overlay<'a> {
    pub frontier: &'a FxHashSet<Cell>,
    pub explored: &'a FxHashSet<Cell>,
    pub path: &'a [Cell],
}

/// A rectangular 8-connected grid with static walls (authored) and dynamic
/// walls (spawned while a search runs). Start and target never hold a wall.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    start: Cell,
    target: Cell,
    static_walls: FxHashSet<Cell>,
    dynamic_walls: FxHashSet<Cell>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize, start: Cell, target: Cell) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyGrid { rows, cols });
        }
        for cell in [start, target] {
            if cell.row >= rows || cell.col >= cols {
                return Err(GridError::OutOfBounds { cell, rows, cols });
            }
        }
        if start == target {
            return Err(GridError::CoincidentEndpoints(start));
        }

        Ok(Grid {
            rows,
            cols,
            start,
            target,
            static_walls: FxHashSet::default(),
            dynamic_walls: FxHashSet::default(),
        })
    }

    /// Start near the bottom-left corner, target near the top-right one.
    pub fn default_endpoints(rows: usize, cols: usize) -> (Cell, Cell) {
        let start = Cell::new(rows.saturating_sub(2), 1.min(cols.saturating_sub(1)));
        let target = Cell::new(1.min(rows.saturating_sub(1)), cols.saturating_sub(2));
        (start, target)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn target(&self) -> Cell {
        self.target
    }

    pub fn static_walls(&self) -> &FxHashSet<Cell> {
        &self.static_walls
    }

    pub fn dynamic_walls(&self) -> &FxHashSet<Cell> {
        &self.dynamic_walls
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.static_walls.contains(&cell) || self.dynamic_walls.contains(&cell)
    }

    /// In-bounds, unblocked neighbours in [`DIRECTIONS`] order, each paired
    /// with the cost of the move.
    pub fn neighbors(&self, cell: Cell) -> Vec<(Cell, PathCost)> {
        let mut neighbors = Vec::with_capacity(8);
        for &(dr, dc) in &DIRECTIONS {
            let Some(next) = cell.offset(dr, dc) else {
                continue;
            };
            if self.in_bounds(next) && !self.is_blocked(next) {
                let cost = if dr != 0 && dc != 0 {
                    PathCost::DIAGONAL
                } else {
                    PathCost::ORTHOGONAL
                };
                neighbors.push((next, cost));
            }
        }
        neighbors
    }

    /// Validates a cell for wall placement.
    fn check_editable(&self, cell: Cell) -> Result<(), GridError> {
        if !self.in_bounds(cell) {
            return Err(GridError::OutOfBounds {
                cell,
                rows: self.rows,
                cols: self.cols,
            });
        }
        if cell == self.start || cell == self.target {
            return Err(GridError::ReservedCell(cell));
        }
        Ok(())
    }

    /// Paints (`present = true`) or erases a wall. Painting turns a dynamic
    /// wall into a static one; erasing removes either kind.
    pub fn set_static_wall(&mut self, cell: Cell, present: bool) -> Result<(), GridError> {
        self.check_editable(cell)?;
        self.dynamic_walls.remove(&cell);
        if present {
            self.static_walls.insert(cell);
        } else {
            self.static_walls.remove(&cell);
        }
        Ok(())
    }

    pub fn clear_walls(&mut self) {
        self.static_walls.clear();
        self.dynamic_walls.clear();
    }

    pub fn clear_dynamic_walls(&mut self) {
        self.dynamic_walls.clear();
    }

    /// Clears every wall and gives each non-endpoint cell an independent
    /// `density` chance of becoming a static wall.
    pub fn randomize<R: Rng + ?Sized>(&mut self, density: f64, rng: &mut R) -> Result<(), GridError> {
        if !(0.0..=1.0).contains(&density) {
            return Err(GridError::InvalidDensity(density));
        }
        self.clear_walls();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = Cell::new(row, col);
                if cell == self.start || cell == self.target {
                    continue;
                }
                if rng.gen_bool(density) {
                    self.static_walls.insert(cell);
                }
            }
        }
        debug!(
            "randomized {}x{} grid at density {density}: {} walls",
            self.rows,
            self.cols,
            self.static_walls.len()
        );
        Ok(())
    }

    /// [`Grid::randomize`] with a seeded generator, or entropy when `seed` is `None`.
    pub fn randomize_seeded(&mut self, density: f64, seed: Option<u64>) -> Result<(), GridError> {
        let mut rng = match seed {
            Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
            None => rand::rngs::StdRng::from_entropy(),
        };
        self.randomize(density, &mut rng)
    }

    /// Unblocked cells other than start and target, in row-major order.
    pub fn open_cells(&self) -> Vec<Cell> {
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| Cell::new(row, col)))
            .filter(|&cell| cell != self.start && cell != self.target && !self.is_blocked(cell))
            .collect()
    }

    /// Marks `cell` as a dynamic wall. Returns whether it lies on `current_path`;
    /// an already blocked cell is left alone and reports false.
    pub fn place_dynamic_obstacle(&mut self, cell: Cell, current_path: &[Cell]) -> Result<bool, GridError> {
        self.check_editable(cell)?;
        if self.is_blocked(cell) {
            return Ok(false);
        }
        self.dynamic_walls.insert(cell);
        Ok(current_path.contains(&cell))
    }

    /// Places a dynamic wall on a uniformly chosen open cell. Returns true
    /// iff the new wall lies on `current_path`; false (and no change) when
    /// no open cell remains.
    pub fn spawn_dynamic_obstacle<R: Rng + ?Sized>(&mut self, current_path: &[Cell], rng: &mut R) -> bool {
        let candidates = self.open_cells();
        let Some(&cell) = candidates.choose(rng) else {
            return false;
        };
        self.dynamic_walls.insert(cell);
        let blocks_path = current_path.contains(&cell);
        debug!("dynamic obstacle at {cell} (on path: {blocks_path})");
        blocks_path
    }

    /// Sum of move costs along `path`.
    pub fn path_cost(path: &[Cell]) -> PathCost {
        path.windows(2)
            .map(|pair| {
                if pair[0].row != pair[1].row && pair[0].col != pair[1].col {
                    PathCost::DIAGONAL
                } else {
                    PathCost::ORTHOGONAL
                }
            })
            .fold(PathCost::ZERO, |total, step| total + step)
    }

    /// True when `path` runs from start to target through unblocked,
    /// pairwise adjacent cells.
    pub fn is_valid_path(&self, path: &[Cell]) -> bool {
        path.first() == Some(&self.start)
            && path.last() == Some(&self.target)
            && path.iter().all(|&cell| self.in_bounds(cell) && !self.is_blocked(cell))
            && path.windows(2).all(|pair| pair[0].is_adjacent(&pair[1]))
    }

    /// Reads a layout with one line per row: `.` free, `#` wall, `S` start,
    /// `T` target. Blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let mut start = None;
        let mut target = None;
        let mut walls = Vec::new();
        let mut cols = None;
        let mut rows = 0;

        for (line_no, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l.trim())) {
            if line.is_empty() {
                continue;
            }
            let width = line.chars().count();
            match cols {
                None => cols = Some(width),
                Some(expected) if expected != width => {
                    return Err(GridError::Layout {
                        line: line_no,
                        reason: format!("expected {expected} columns, found {width}"),
                    });
                }
                Some(_) => {}
            }

            for (col, ch) in line.chars().enumerate() {
                let cell = Cell::new(rows, col);
                let duplicate = |what: &str| GridError::Layout {
                    line: line_no,
                    reason: format!("more than one {what}"),
                };
                match ch {
                    '.' => {}
                    '#' => walls.push(cell),
                    'S' if start.is_some() => return Err(duplicate("start")),
                    'S' => start = Some(cell),
                    'T' if target.is_some() => return Err(duplicate("target")),
                    'T' => target = Some(cell),
                    other => {
                        return Err(GridError::Layout {
                            line: line_no,
                            reason: format!("unexpected character '{other}'"),
                        })
                    }
                }
            }
            rows += 1;
        }

        let missing = |what: &str| GridError::Layout {
            line: rows,
            reason: format!("layout has no {what}"),
        };
        let start = start.ok_or_else(|| missing("start 'S'"))?;
        let target = target.ok_or_else(|| missing("target 'T'"))?;

        let mut grid = Grid::new(rows, cols.unwrap_or(0), start, target)?;
        grid.static_walls.extend(walls);
        Ok(grid)
    }

    /// Draws the grid one line per row, optionally with search state on top.
    /// Without an overlay and dynamic walls the output parses back.
    pub fn render(&self, overlay: Option<Overlay<'_>>) -> String {
        let mut out = String::with_capacity((self.cols + 1) * self.rows);
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = Cell::new(row, col);
                let ch = if cell == self.start {
                    'S'
                } else if cell == self.target {
                    'T'
                } else if self.static_walls.contains(&cell) {
                    '#'
                } else if self.dynamic_walls.contains(&cell) {
                    'o'
                } else {
                    match overlay {
                        Some(o) if o.path.contains(&cell) => '*',
                        Some(o) if o.frontier.contains(&cell) => '+',
                        Some(o) if o.explored.contains(&cell) => 'x',
                        _ => '.',
                    }
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grid::parse(s)
    }
}

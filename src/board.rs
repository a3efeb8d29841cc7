//! Board: tile grid, region flood fill, clear, gravity and column compaction.

use rand::Rng;
use thiserror::Error;

/// Most colours a board may use; the palette has this many tile colours.
pub const MAX_COLORS: u8 = 8;

/// Single cell: either empty or a tile of a given colour index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Tile(u8),
}

impl Cell {
    #[inline]
    pub fn color(self) -> Option<u8> {
        match self {
            Self::Empty => None,
            Self::Tile(c) => Some(c),
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }
}

/// Grid coordinate: `x` is the column, `y` the row (0 = top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardError {
    #[error("board dimensions must be positive (got {rows}x{cols})")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("colour count must be in 1..={max} (got {0})", max = MAX_COLORS)]
    InvalidColorCount(u8),
    #[error("row {row} has {len} cells, expected {expected}")]
    RaggedRow { row: usize, len: usize, expected: usize },
    #[error("tile colour {color} at ({x}, {y}) is outside 0..{num_colors}")]
    ColorOutOfRange {
        x: usize,
        y: usize,
        color: u8,
        num_colors: u8,
    },
    #[error("score multiplier must be a positive number (got {0})")]
    InvalidMultiplier(f64),
    #[error("layout does not match preset {preset}")]
    PresetMismatch { preset: &'static str },
}

/// Maximal 4-connected set of same-coloured tiles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    color: Option<u8>,
    cells: Vec<Pos>,
}

impl Region {
    pub fn color(&self) -> Option<u8> {
        self.color
    }

    pub fn cells(&self) -> &[Pos] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// A lone tile cannot be cleared.
    pub fn is_clearable(&self) -> bool {
        self.cells.len() > 1
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    pub fn into_cells(self) -> Vec<Pos> {
        self.cells
    }
}

/// Playfield: row-major grid of cells, y=0 is top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    num_colors: u8,
    cells: Vec<Cell>,
    /// Layout captured at construction; `reset_to_initial_layout` restores it.
    initial: Vec<Cell>,
}

fn validate(rows: usize, cols: usize, num_colors: u8) -> Result<(), BoardError> {
    if rows == 0 || cols == 0 {
        return Err(BoardError::InvalidDimensions { rows, cols });
    }
    if num_colors == 0 || num_colors > MAX_COLORS {
        return Err(BoardError::InvalidColorCount(num_colors));
    }
    Ok(())
}

impl Board {
    /// Fill a `rows x cols` grid with uniformly random colours in `0..num_colors`.
    pub fn random<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        num_colors: u8,
        rng: &mut R,
    ) -> Result<Self, BoardError> {
        validate(rows, cols, num_colors)?;
        let cells: Vec<Cell> = (0..rows * cols)
            .map(|_| Cell::Tile(rng.gen_range(0..num_colors)))
            .collect();
        Ok(Self {
            rows,
            cols,
            num_colors,
            initial: cells.clone(),
            cells,
        })
    }

    /// Build from explicit rows (top first). The given layout becomes the initial layout.
    pub fn from_grid(num_colors: u8, grid: Vec<Vec<Cell>>) -> Result<Self, BoardError> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, Vec::len);
        validate(rows, cols, num_colors)?;
        let mut cells = Vec::with_capacity(rows * cols);
        for (y, row) in grid.into_iter().enumerate() {
            if row.len() != cols {
                return Err(BoardError::RaggedRow {
                    row: y,
                    len: row.len(),
                    expected: cols,
                });
            }
            for (x, cell) in row.into_iter().enumerate() {
                if let Cell::Tile(color) = cell {
                    if color >= num_colors {
                        return Err(BoardError::ColorOutOfRange {
                            x,
                            y,
                            color,
                            num_colors,
                        });
                    }
                }
                cells.push(cell);
            }
        }
        Ok(Self {
            rows,
            cols,
            num_colors,
            initial: cells.clone(),
            cells,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn num_colors(&self) -> u8 {
        self.num_colors
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.cols + x
    }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.cols && y < self.rows
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.in_bounds(x, y).then(|| self.cells[self.idx(x, y)])
    }

    /// Number of tiles still on the board.
    pub fn remaining(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    /// Flood fill (4-neighbour, iterative) from `(x, y)`. Empty or out-of-bounds seed → empty region.
    pub fn region_at(&self, x: usize, y: usize) -> Region {
        let color = match self.get(x, y) {
            Some(Cell::Tile(c)) => c,
            _ => return Region::default(),
        };
        let mut visited = vec![false; self.cells.len()];
        let mut cells = Vec::new();
        let mut stack = vec![Pos::new(x, y)];
        visited[self.idx(x, y)] = true;

        while let Some(p) = stack.pop() {
            cells.push(p);
            let neighbours = [
                (p.x.checked_sub(1), Some(p.y)),
                (Some(p.x + 1), Some(p.y)),
                (Some(p.x), p.y.checked_sub(1)),
                (Some(p.x), Some(p.y + 1)),
            ];
            for (nx, ny) in neighbours {
                let (Some(nx), Some(ny)) = (nx, ny) else {
                    continue;
                };
                if !self.in_bounds(nx, ny) {
                    continue;
                }
                let i = self.idx(nx, ny);
                if !visited[i] && self.cells[i] == Cell::Tile(color) {
                    visited[i] = true;
                    stack.push(Pos::new(nx, ny));
                }
            }
        }
        Region {
            color: Some(color),
            cells,
        }
    }

    /// Remove a region of two or more tiles, then settle the grid.
    /// Returns the number of tiles removed: 0 when the region is not clearable
    /// or no longer matches the board (every cell must still hold its colour).
    pub fn clear(&mut self, region: &Region) -> usize {
        let Some(color) = region.color() else {
            return 0;
        };
        if !region.is_clearable() {
            return 0;
        }
        let stale = region
            .cells()
            .iter()
            .any(|p| self.get(p.x, p.y) != Some(Cell::Tile(color)));
        if stale {
            return 0;
        }
        for p in region.cells() {
            let i = self.idx(p.x, p.y);
            self.cells[i] = Cell::Empty;
        }
        self.apply_gravity();
        self.shift_columns_left();
        region.len()
    }

    /// Tiles fall to the bottom of their column, keeping their vertical order.
    fn apply_gravity(&mut self) {
        for x in 0..self.cols {
            let mut write_y = self.rows;
            for y in (0..self.rows).rev() {
                let cell = self.cells[self.idx(x, y)];
                if cell.is_empty() {
                    continue;
                }
                write_y -= 1;
                if write_y != y {
                    let (from, to) = (self.idx(x, y), self.idx(x, write_y));
                    self.cells[to] = cell;
                    self.cells[from] = Cell::Empty;
                }
            }
        }
    }

    /// Non-empty columns pack to the left in their original order; empty columns trail.
    fn shift_columns_left(&mut self) {
        let mut write_x = 0;
        for x in 0..self.cols {
            let column_empty = (0..self.rows).all(|y| self.cells[self.idx(x, y)].is_empty());
            if column_empty {
                continue;
            }
            if write_x != x {
                for y in 0..self.rows {
                    let (from, to) = (self.idx(x, y), self.idx(write_x, y));
                    self.cells[to] = self.cells[from];
                    self.cells[from] = Cell::Empty;
                }
            }
            write_x += 1;
        }
    }

    /// True if any tile has a same-coloured orthogonal neighbour, i.e. some region has size > 1.
    pub fn has_valid_move(&self) -> bool {
        for y in 0..self.rows {
            for x in 0..self.cols {
                let Cell::Tile(c) = self.cells[self.idx(x, y)] else {
                    continue;
                };
                if x + 1 < self.cols && self.cells[self.idx(x + 1, y)] == Cell::Tile(c) {
                    return true;
                }
                if y + 1 < self.rows && self.cells[self.idx(x, y + 1)] == Cell::Tile(c) {
                    return true;
                }
            }
        }
        false
    }

    /// Restore the layout the board was created with (Retry).
    pub fn reset_to_initial_layout(&mut self) {
        self.cells.clone_from(&self.initial);
    }

    /// Iterate rows top to bottom as cell slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols)
    }
}

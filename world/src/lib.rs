#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for Mouse Maze.
//!
//! The board is the editable grid of [`CellKind`] values that the editor
//! paints. It always holds exactly one mouse start and converts itself into a
//! [`RewardGrid`](mouse_maze_core::RewardGrid) when a solve is requested.

use mouse_maze_core::{CellCoord, CellKind, Command, Event, PaintError, MAX_BOARD_SIZE};

const DEFAULT_BOARD_SIZE: u32 = 20;
const ORIGIN: CellCoord = CellCoord::new(0, 0);

/// Represents the authoritative Mouse Maze board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: u32,
    cells: Vec<CellKind>,
    mouse_start: CellCoord,
}

impl Board {
    /// Creates an empty board of `size` x `size` cells with the mouse in the
    /// upper-left corner.
    ///
    /// The size is clamped to `1..=MAX_BOARD_SIZE`.
    #[must_use]
    pub fn new(size: u32) -> Self {
        let size = size.clamp(1, MAX_BOARD_SIZE);
        let side = size as usize;
        let mut cells = vec![CellKind::Empty; side * side];
        cells[0] = CellKind::MouseStart;

        Self {
            size,
            cells,
            mouse_start: ORIGIN,
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.row() < self.size && cell.column() < self.size {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn paint(&mut self, cell: CellCoord, kind: CellKind, out_events: &mut Vec<Event>) {
        let Some(index) = self.index(cell) else {
            out_events.push(Event::PaintRejected {
                cell,
                kind,
                reason: PaintError::OutOfBounds,
            });
            return;
        };

        let previous = self.cells[index];
        if previous == kind {
            return;
        }

        if previous == CellKind::MouseStart {
            out_events.push(Event::PaintRejected {
                cell,
                kind,
                reason: PaintError::MouseStartRequired,
            });
            return;
        }

        if kind == CellKind::MouseStart {
            let from = self.mouse_start;
            if let Some(old) = self.index(from) {
                self.cells[old] = CellKind::Empty;
            }
            self.mouse_start = cell;
            out_events.push(Event::MouseStartMoved { from, to: cell });
        }

        self.cells[index] = kind;
        out_events.push(Event::CellPainted {
            cell,
            previous,
            kind,
        });
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE)
    }
}

/// Applies the provided command to the board, mutating state deterministically.
pub fn apply(board: &mut Board, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureBoard { size } => {
            *board = Board::new(size);
            out_events.push(Event::BoardConfigured {
                size: board.size,
                mouse_start: board.mouse_start,
            });
        }
        Command::PaintCell { cell, kind } => board.paint(cell, kind, out_events),
        Command::ClearBoard => {
            for kind in board.cells.iter_mut() {
                if *kind != CellKind::MouseStart {
                    *kind = CellKind::Empty;
                }
            }
            out_events.push(Event::BoardCleared);
        }
    }
}

/// Query functions that provide read-only access to the board state.
pub mod query {
    use mouse_maze_core::{CellCoord, CellKind, GridError, RewardGrid};

    use super::Board;

    /// Number of cells along each side of the board.
    #[must_use]
    pub fn size(board: &Board) -> u32 {
        board.size
    }

    /// Cell currently marked as the mouse start.
    #[must_use]
    pub fn mouse_start(board: &Board) -> CellCoord {
        board.mouse_start
    }

    /// Kind of the provided cell, if it lies on the board.
    #[must_use]
    pub fn kind_at(board: &Board, cell: CellCoord) -> Option<CellKind> {
        board.index(cell).map(|index| board.cells[index])
    }

    /// Rows of cell kinds, top to bottom.
    #[must_use]
    pub fn kinds(board: &Board) -> Vec<Vec<CellKind>> {
        board
            .cells
            .chunks(board.size as usize)
            .map(<[CellKind]>::to_vec)
            .collect()
    }

    /// Maps every cell through the cell-kind reward table.
    pub fn reward_grid(board: &Board) -> Result<RewardGrid, GridError> {
        RewardGrid::from_kinds(&kinds(board))
    }
}

//! Stochastic transition model shared by every solver.
//!
//! The mouse moves in the intended direction with probability 0.8 and slips
//! to either perpendicular direction with probability 0.1 each. Moving into a
//! rock or off the board bounces the mouse back to the cell it left.

use crate::{CellCoord, CellRole, Direction, DiscountFactor, RewardGrid};

/// Probability of moving in the intended direction.
pub const INTENDED_PROBABILITY: f64 = 0.8;
/// Probability of slipping to each perpendicular direction.
pub const SLIP_PROBABILITY: f64 = 0.1;

/// Utilities of the four axis neighbours of a cell.
///
/// `None` marks a blocked neighbour: off the board or a rock.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Neighbors {
    /// Neighbour in the previous row.
    pub up: Option<f64>,
    /// Neighbour in the next row.
    pub down: Option<f64>,
    /// Neighbour in the previous column.
    pub left: Option<f64>,
    /// Neighbour in the next column.
    pub right: Option<f64>,
}

impl Neighbors {
    /// Reads the neighbours of `cell` from a row-major utility buffer.
    ///
    /// Blocked flags come from the reward grid's roles, so a rock neighbour
    /// is blocked no matter what utility the buffer holds for it.
    #[must_use]
    pub fn gather(grid: &RewardGrid, utilities: &[f64], cell: CellCoord) -> Self {
        let read = |direction| {
            let neighbor = cell.step(direction, grid.size())?;
            let index = grid.index(neighbor)?;
            if grid.roles()[index] == CellRole::Wall {
                None
            } else {
                utilities.get(index).copied()
            }
        };

        Self {
            up: read(Direction::Up),
            down: read(Direction::Down),
            left: read(Direction::Left),
            right: read(Direction::Right),
        }
    }
}

/// Expected utility of intending each of the four directions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionValues {
    /// Expected utility when intending to move up.
    pub up: f64,
    /// Expected utility when intending to move down.
    pub down: f64,
    /// Expected utility when intending to move left.
    pub left: f64,
    /// Expected utility when intending to move right.
    pub right: f64,
}

impl DirectionValues {
    /// Expected utility for the provided intended direction.
    #[must_use]
    pub const fn get(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Largest expected utility over the four directions.
    #[must_use]
    pub fn best(&self) -> f64 {
        self.up.max(self.left).max(self.down).max(self.right)
    }
}

/// Computes the four directional expected utilities for a cell.
///
/// Blocked neighbours are replaced by `own` before any sum is formed.
#[must_use]
pub fn direction_values(own: f64, neighbors: Neighbors) -> DirectionValues {
    let up = neighbors.up.unwrap_or(own);
    let down = neighbors.down.unwrap_or(own);
    let left = neighbors.left.unwrap_or(own);
    let right = neighbors.right.unwrap_or(own);

    DirectionValues {
        up: INTENDED_PROBABILITY * up + SLIP_PROBABILITY * left + SLIP_PROBABILITY * right,
        left: INTENDED_PROBABILITY * left + SLIP_PROBABILITY * up + SLIP_PROBABILITY * down,
        down: INTENDED_PROBABILITY * down + SLIP_PROBABILITY * left + SLIP_PROBABILITY * right,
        right: INTENDED_PROBABILITY * right + SLIP_PROBABILITY * up + SLIP_PROBABILITY * down,
    }
}

/// Bellman update for one free cell, reading only from `current`.
///
/// Returns `reward + gamma * max(direction values)`. Cells outside the grid
/// yield `None`.
#[must_use]
pub fn bellman_update(
    grid: &RewardGrid,
    current: &[f64],
    cell: CellCoord,
    discount: DiscountFactor,
) -> Option<f64> {
    let index = grid.index(cell)?;
    let own = *current.get(index)?;
    let values = direction_values(own, Neighbors::gather(grid, current, cell));
    Some(grid.rewards()[index] + discount.get() * values.best())
}

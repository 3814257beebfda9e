#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Mouse Maze solver.
//!
//! This crate defines the data model that connects the board editor, the
//! value-iteration solvers, and the greedy policy walker. Adapters describe
//! board edits with [`Command`] values and observe the resulting [`Event`]
//! values. The board produces a [`RewardGrid`] by mapping each [`CellKind`]
//! through its reward constant, solvers turn that grid into a
//! [`UtilityGrid`], and the walker consumes the utilities read-only.

pub mod transition;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reward applied to every step through an open cell.
pub const DEFAULT_STEP_COST: f64 = -0.04;
/// Reward pinned to the cheese cell.
pub const REWARD_VALUE: f64 = 1.0;
/// Reward pinned to a fire cell.
pub const FIRE_VALUE: f64 = -3.0;
/// Reward pinned to a rock cell. Rocks also act as walls for their neighbours.
pub const ROCK_VALUE: f64 = -0.1;

/// Tolerance used to derive the convergence threshold when none is configured.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Largest number of cells along one side of an editable board.
pub const MAX_BOARD_SIZE: u32 = 1024;

/// Kinds of cells that can be painted onto the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Open floor the mouse may cross at the default step cost.
    #[default]
    Empty,
    /// Open floor that also marks where the mouse starts.
    MouseStart,
    /// Terminal cell holding the positive reward.
    Reward,
    /// Terminal cell holding the fire penalty.
    Fire,
    /// Obstacle that blocks movement and pins its own reward.
    Rock,
}

impl CellKind {
    /// Every cell kind in declaration order.
    pub const ALL: [CellKind; 5] = [
        CellKind::Empty,
        CellKind::MouseStart,
        CellKind::Reward,
        CellKind::Fire,
        CellKind::Rock,
    ];

    /// Scalar reward assigned to the cell kind.
    #[must_use]
    pub const fn reward(self) -> f64 {
        match self {
            Self::Empty | Self::MouseStart => DEFAULT_STEP_COST,
            Self::Reward => REWARD_VALUE,
            Self::Fire => FIRE_VALUE,
            Self::Rock => ROCK_VALUE,
        }
    }
}

/// How a cell participates in value iteration, derived from its reward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellRole {
    /// Reward equals the default step cost; the cell is updated every sweep.
    Free,
    /// Reward equals the rock reward; the cell is pinned and blocks movement.
    Wall,
    /// Any other reward; the cell is pinned to its reward.
    Terminal,
}

impl CellRole {
    /// Classifies a reward value.
    ///
    /// The comparison is exact: only the literal step cost marks a free cell
    /// and only the literal rock reward marks a wall.
    #[must_use]
    pub fn of_reward(reward: f64) -> Self {
        if reward == DEFAULT_STEP_COST {
            Self::Free
        } else if reward == ROCK_VALUE {
            Self::Wall
        } else {
            Self::Terminal
        }
    }

    /// Reports whether the cell is subject to the Bellman update.
    #[must_use]
    pub const fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }

    /// Reports whether the cell is pinned to its reward.
    #[must_use]
    pub const fn is_fixed(self) -> bool {
        !self.is_free()
    }
}

/// Cardinal movement directions, declared in the walker's tie-break order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in tie-break order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell, counted from the top.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell, counted from the left.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Neighbouring cell in the provided direction, if it lies within a
    /// square grid of `size` cells per side.
    #[must_use]
    pub fn step(self, direction: Direction, size: u32) -> Option<CellCoord> {
        let (row, column) = match direction {
            Direction::Up => (self.row.checked_sub(1)?, self.column),
            Direction::Down => (self.row.checked_add(1)?, self.column),
            Direction::Left => (self.row, self.column.checked_sub(1)?),
            Direction::Right => (self.row, self.column.checked_add(1)?),
        };

        (row < size && column < size).then_some(CellCoord::new(row, column))
    }
}

/// Commands that express all permissible board mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resizes the board, resetting every cell to empty floor.
    ConfigureBoard {
        /// Number of cells along each side of the square board.
        size: u32,
    },
    /// Paints a single cell with the provided kind.
    PaintCell {
        /// Cell to repaint.
        cell: CellCoord,
        /// Kind the cell should hold after the command.
        kind: CellKind,
    },
    /// Resets every cell except the mouse start to empty floor.
    ClearBoard,
}

/// Events broadcast by the board after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the board was resized and reset.
    BoardConfigured {
        /// Number of cells along each side of the board.
        size: u32,
        /// Cell holding the mouse start after the reset.
        mouse_start: CellCoord,
    },
    /// Confirms that a cell changed kind.
    CellPainted {
        /// Cell that was repainted.
        cell: CellCoord,
        /// Kind held before the command.
        previous: CellKind,
        /// Kind held after the command.
        kind: CellKind,
    },
    /// Announces that the mouse start moved to a different cell.
    MouseStartMoved {
        /// Previous mouse start, now empty floor.
        from: CellCoord,
        /// New mouse start.
        to: CellCoord,
    },
    /// Confirms that every non-start cell was reset to empty floor.
    BoardCleared,
    /// Reports that a paint request was rejected.
    PaintRejected {
        /// Cell targeted by the request.
        cell: CellCoord,
        /// Kind requested for the cell.
        kind: CellKind,
        /// Specific reason the request failed.
        reason: PaintError,
    },
}

/// Reasons a paint request may be rejected by the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaintError {
    /// The cell lies outside the board.
    OutOfBounds,
    /// The request would leave the board without a mouse start.
    MouseStartRequired,
}

/// Failures raised while building a [`RewardGrid`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GridError {
    /// The grid had no rows.
    #[error("reward grid must contain at least one cell")]
    Empty,
    /// A row did not match the number of rows in the grid.
    #[error("row {row} has {found} cells but the grid is {expected} cells wide")]
    NotSquare {
        /// Index of the offending row.
        row: usize,
        /// Expected row length, equal to the number of rows.
        expected: usize,
        /// Actual row length.
        found: usize,
    },
    /// The grid does not fit the coordinate space.
    #[error("grid side of {0} cells exceeds the supported coordinate range")]
    TooLarge(usize),
    /// A reward was NaN or infinite.
    #[error("reward at {cell:?} is not finite")]
    NonFiniteReward {
        /// Cell holding the offending reward.
        cell: CellCoord,
    },
    /// A utility buffer did not hold one value per grid cell.
    #[error("utility buffer holds {found} values but the grid has {expected} cells")]
    LengthMismatch {
        /// Number of cells in the grid.
        expected: usize,
        /// Number of values provided.
        found: usize,
    },
}

/// Failures raised while validating solver configuration.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The discount factor was outside the open interval (0, 1).
    #[error("discount factor {0} must lie strictly between 0 and 1")]
    DiscountOutOfRange(f64),
    /// The convergence tolerance was zero, negative or not finite.
    #[error("convergence tolerance {0} must be finite and positive")]
    NonPositiveTolerance(f64),
    /// A sweep bound of zero was requested.
    #[error("sweep budget must allow at least one sweep")]
    ZeroSweepBudget,
}

/// Discount factor applied to future utility, validated to lie in (0, 1).
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct DiscountFactor(f64);

impl DiscountFactor {
    /// Validates and wraps a discount factor.
    pub fn new(gamma: f64) -> Result<Self, ConfigError> {
        if gamma > 0.0 && gamma < 1.0 {
            Ok(Self(gamma))
        } else {
            Err(ConfigError::DiscountOutOfRange(gamma))
        }
    }

    /// Retrieves the raw discount factor.
    #[must_use]
    pub const fn get(&self) -> f64 {
        self.0
    }

    /// Largest per-cell change between sweeps that still counts as converged.
    ///
    /// Computed as `epsilon * (1 - gamma) / gamma`, which bounds the distance
    /// between the returned utilities and the true fixed point by `epsilon`.
    #[must_use]
    pub fn convergence_threshold(&self, epsilon: f64) -> f64 {
        epsilon * (1.0 - self.0) / self.0
    }
}

impl Default for DiscountFactor {
    fn default() -> Self {
        Self(0.9)
    }
}

/// Square matrix of rewards consumed by the solvers.
///
/// Each cell's [`CellRole`] is derived once at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardGrid {
    size: u32,
    rewards: Vec<f64>,
    roles: Vec<CellRole>,
}

impl RewardGrid {
    /// Builds a grid from raw reward rows.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, GridError> {
        let size = validate_square(&rows)?;
        let rewards: Vec<f64> = rows.into_iter().flatten().collect();

        if let Some(index) = rewards.iter().position(|reward| !reward.is_finite()) {
            return Err(GridError::NonFiniteReward {
                cell: coord_of(size, index),
            });
        }

        let roles = rewards.iter().copied().map(CellRole::of_reward).collect();
        Ok(Self {
            size,
            rewards,
            roles,
        })
    }

    /// Builds a grid by mapping every cell kind through its reward constant.
    pub fn from_kinds(rows: &[Vec<CellKind>]) -> Result<Self, GridError> {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|kind| kind.reward()).collect())
                .collect(),
        )
    }

    /// Builds a `size` x `size` grid of empty floor, then overrides the listed cells.
    ///
    /// Overrides outside the grid are ignored.
    pub fn with_overrides(size: u32, overrides: &[(CellCoord, f64)]) -> Result<Self, GridError> {
        let side = usize::try_from(size).map_err(|_| GridError::TooLarge(usize::MAX))?;
        let mut rows = vec![vec![DEFAULT_STEP_COST; side]; side];
        for &(cell, reward) in overrides {
            if cell.row() < size && cell.column() < size {
                rows[cell.row() as usize][cell.column() as usize] = reward;
            }
        }
        Self::new(rows)
    }

    /// Number of cells along each side of the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of cells in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Grids are never empty; provided for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Rewards stored in row-major order.
    #[must_use]
    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    /// Roles stored in row-major order.
    #[must_use]
    pub fn roles(&self) -> &[CellRole] {
        &self.roles
    }

    /// Reward of the provided cell, if it lies within the grid.
    #[must_use]
    pub fn reward(&self, cell: CellCoord) -> Option<f64> {
        self.index(cell).map(|index| self.rewards[index])
    }

    /// Role of the provided cell, if it lies within the grid.
    #[must_use]
    pub fn role(&self, cell: CellCoord) -> Option<CellRole> {
        self.index(cell).map(|index| self.roles[index])
    }

    /// Row-major offset of the provided cell, if it lies within the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        index_of(self.size, cell)
    }

    /// Cell stored at the provided row-major offset.
    #[must_use]
    pub fn coord(&self, index: usize) -> CellCoord {
        coord_of(self.size, index)
    }
}

/// Long-run utility estimates produced by a solver.
///
/// The grid keeps a copy of the wall mask from the [`RewardGrid`] it was
/// solved from so consumers can refuse rock cells without the rewards.
#[derive(Clone, Debug, PartialEq)]
pub struct UtilityGrid {
    size: u32,
    values: Vec<f64>,
    walls: Vec<bool>,
}

impl UtilityGrid {
    /// Wraps solved utilities for the provided reward grid.
    ///
    /// `values` must be stored in row-major order, one value per grid cell.
    pub fn new(grid: &RewardGrid, values: Vec<f64>) -> Result<Self, GridError> {
        if values.len() != grid.len() {
            return Err(GridError::LengthMismatch {
                expected: grid.len(),
                found: values.len(),
            });
        }

        Ok(Self {
            size: grid.size(),
            values,
            walls: grid
                .roles()
                .iter()
                .map(|role| *role == CellRole::Wall)
                .collect(),
        })
    }

    /// Number of cells along each side of the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Utilities stored in row-major order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterator over the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.size.max(1) as usize)
    }

    /// Utility of the provided cell, if it lies within the grid.
    #[must_use]
    pub fn utility(&self, cell: CellCoord) -> Option<f64> {
        index_of(self.size, cell).and_then(|index| self.values.get(index).copied())
    }

    /// Reports whether the provided cell is a rock.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        index_of(self.size, cell)
            .and_then(|index| self.walls.get(index).copied())
            .unwrap_or(false)
    }

    /// Largest absolute difference between two grids of equal size.
    ///
    /// Returns `None` when the sizes differ.
    #[must_use]
    pub fn max_abs_difference(&self, other: &UtilityGrid) -> Option<f64> {
        if self.size != other.size {
            return None;
        }

        Some(
            self.values
                .iter()
                .zip(&other.values)
                .map(|(left, right)| (left - right).abs())
                .fold(0.0, f64::max),
        )
    }
}

fn validate_square<T>(rows: &[Vec<T>]) -> Result<u32, GridError> {
    if rows.is_empty() {
        return Err(GridError::Empty);
    }

    let expected = rows.len();
    for (row, cells) in rows.iter().enumerate() {
        if cells.len() != expected {
            return Err(GridError::NotSquare {
                row,
                expected,
                found: cells.len(),
            });
        }
    }

    u32::try_from(expected).map_err(|_| GridError::TooLarge(expected))
}

fn index_of(size: u32, cell: CellCoord) -> Option<usize> {
    if cell.row() < size && cell.column() < size {
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(size).ok()?;
        row.checked_mul(width)?.checked_add(column)
    } else {
        None
    }
}

fn coord_of(size: u32, index: usize) -> CellCoord {
    let width = size.max(1) as usize;
    CellCoord::new((index / width) as u32, (index % width) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_kind_rewards_match_table() {
        assert_eq!(CellKind::Empty.reward(), -0.04);
        assert_eq!(CellKind::MouseStart.reward(), -0.04);
        assert_eq!(CellKind::Reward.reward(), 1.0);
        assert_eq!(CellKind::Fire.reward(), -3.0);
        assert_eq!(CellKind::Rock.reward(), -0.1);
    }

    #[test]
    fn roles_follow_cell_kind_rewards() {
        let roles: Vec<CellRole> = CellKind::ALL
            .iter()
            .map(|kind| CellRole::of_reward(kind.reward()))
            .collect();
        assert_eq!(
            roles,
            vec![
                CellRole::Free,
                CellRole::Free,
                CellRole::Terminal,
                CellRole::Terminal,
                CellRole::Wall,
            ]
        );
    }

    #[test]
    fn arbitrary_rewards_are_terminal() {
        assert_eq!(CellRole::of_reward(-2.0), CellRole::Terminal);
        assert_eq!(CellRole::of_reward(-0.5), CellRole::Terminal);
        assert!(CellRole::of_reward(-0.5).is_fixed());
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(3, 7));
        assert_round_trip(&CellKind::Rock);
    }

    #[test]
    fn step_respects_grid_bounds() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.step(Direction::Up, 3), None);
        assert_eq!(corner.step(Direction::Left, 3), None);
        assert_eq!(corner.step(Direction::Down, 3), Some(CellCoord::new(1, 0)));
        assert_eq!(corner.step(Direction::Right, 3), Some(CellCoord::new(0, 1)));

        let far = CellCoord::new(2, 2);
        assert_eq!(far.step(Direction::Down, 3), None);
        assert_eq!(far.step(Direction::Right, 3), None);
    }

    #[test]
    fn discount_factor_rejects_out_of_range_values() {
        for gamma in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(
                DiscountFactor::new(gamma).is_err(),
                "{gamma} should be rejected"
            );
        }
        assert!(DiscountFactor::new(0.5).is_ok());
    }

    #[test]
    fn convergence_threshold_scales_with_discount() {
        let gamma = DiscountFactor::new(0.9).expect("valid discount");
        let threshold = gamma.convergence_threshold(1e-4);
        assert!((threshold - 1e-4 * 0.1 / 0.9).abs() < 1e-18);
    }

    #[test]
    fn reward_grid_rejects_empty_and_ragged_rows() {
        assert_eq!(RewardGrid::new(Vec::new()), Err(GridError::Empty));
        assert_eq!(
            RewardGrid::new(vec![vec![0.0, 0.0], vec![0.0]]),
            Err(GridError::NotSquare {
                row: 1,
                expected: 2,
                found: 1,
            })
        );
        assert_eq!(
            RewardGrid::new(vec![vec![0.0, 0.0, 0.0]]),
            Err(GridError::NotSquare {
                row: 0,
                expected: 1,
                found: 3,
            })
        );
    }

    #[test]
    fn reward_grid_rejects_non_finite_rewards() {
        let result = RewardGrid::new(vec![vec![0.0, 0.0], vec![0.0, f64::INFINITY]]);
        assert_eq!(
            result,
            Err(GridError::NonFiniteReward {
                cell: CellCoord::new(1, 1),
            })
        );
    }

    #[test]
    fn reward_grid_maps_kinds_through_table() {
        let grid = RewardGrid::from_kinds(&[
            vec![CellKind::MouseStart, CellKind::Reward],
            vec![CellKind::Rock, CellKind::Fire],
        ])
        .expect("valid grid");

        assert_eq!(grid.rewards(), &[-0.04, 1.0, -0.1, -3.0]);
        assert_eq!(grid.role(CellCoord::new(0, 0)), Some(CellRole::Free));
        assert_eq!(grid.role(CellCoord::new(1, 0)), Some(CellRole::Wall));
        assert_eq!(grid.role(CellCoord::new(2, 0)), None);
    }

    #[test]
    fn overrides_land_on_requested_cells() {
        let grid = RewardGrid::with_overrides(
            3,
            &[(CellCoord::new(0, 2), 1.0), (CellCoord::new(9, 9), 5.0)],
        )
        .expect("valid grid");

        assert_eq!(grid.reward(CellCoord::new(0, 2)), Some(1.0));
        assert_eq!(grid.reward(CellCoord::new(1, 1)), Some(DEFAULT_STEP_COST));
        assert_eq!(grid.coord(5), CellCoord::new(1, 2));
    }

    #[test]
    fn utility_grid_tracks_walls() {
        let grid = RewardGrid::from_kinds(&[
            vec![CellKind::Empty, CellKind::Rock],
            vec![CellKind::Empty, CellKind::Empty],
        ])
        .expect("valid grid");
        let utilities =
            UtilityGrid::new(&grid, vec![0.1, -0.1, 0.2, 0.3]).expect("one value per cell");

        assert!(utilities.is_wall(CellCoord::new(0, 1)));
        assert!(!utilities.is_wall(CellCoord::new(0, 0)));
        assert!(!utilities.is_wall(CellCoord::new(5, 5)));
        assert_eq!(utilities.utility(CellCoord::new(1, 0)), Some(0.2));
        assert_eq!(utilities.rows().count(), 2);
    }

    #[test]
    fn utility_grid_rejects_short_buffers() {
        let grid = RewardGrid::with_overrides(2, &[]).expect("valid grid");

        assert_eq!(
            UtilityGrid::new(&grid, vec![0.0]),
            Err(GridError::LengthMismatch {
                expected: 4,
                found: 1,
            })
        );
        assert!(UtilityGrid::new(&grid, vec![0.0; 5]).is_err());
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Greedy policy extraction over a converged utility field.

use std::iter::FusedIterator;

use mouse_maze_core::{CellCoord, Direction, UtilityGrid};

/// Starts a greedy walk from `start` across the provided utilities.
///
/// The walk yields `start` first and then every cell it moves into. At each
/// step the neighbours are checked in [`Direction::ALL`] order (up, down,
/// left, right) and the walk moves only to a neighbour whose utility is
/// strictly greater than the best seen so far, seeded with the current cell's
/// own utility. Rocks and off-grid neighbours are never considered. The walk
/// ends after yielding a cell that no neighbour improves on.
///
/// Utility strictly increases along the path, so no cell is visited twice and
/// the walk yields at most `size * size` cells. A start outside the grid
/// yields nothing.
#[must_use]
pub fn walk(utilities: &UtilityGrid, start: CellCoord) -> GreedyWalk<'_> {
    GreedyWalk {
        utilities,
        next: utilities.utility(start).map(|_| start),
    }
}

/// Lazy sequence of cells visited by a greedy walk.
///
/// Not restartable; call [`walk`] again with the same arguments to replay it.
#[derive(Clone, Debug)]
pub struct GreedyWalk<'a> {
    utilities: &'a UtilityGrid,
    next: Option<CellCoord>,
}

impl GreedyWalk<'_> {
    fn best_neighbor(&self, cell: CellCoord) -> Option<CellCoord> {
        let mut best_value = self.utilities.utility(cell)?;
        let mut best_cell = None;

        for direction in Direction::ALL {
            let Some(neighbor) = cell.step(direction, self.utilities.size()) else {
                continue;
            };
            if self.utilities.is_wall(neighbor) {
                continue;
            }
            let Some(value) = self.utilities.utility(neighbor) else {
                continue;
            };
            if value > best_value {
                best_value = value;
                best_cell = Some(neighbor);
            }
        }

        best_cell
    }
}

impl Iterator for GreedyWalk<'_> {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        let cell = self.next.take()?;
        self.next = self.best_neighbor(cell);
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.next.is_none() {
            return (0, Some(0));
        }
        let side = self.utilities.size() as usize;
        (1, Some(side.saturating_mul(side)))
    }
}

impl FusedIterator for GreedyWalk<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use mouse_maze_core::{CellKind, RewardGrid};

    fn utilities(kinds: &[Vec<CellKind>], values: Vec<f64>) -> UtilityGrid {
        let grid = RewardGrid::from_kinds(kinds).expect("valid grid");
        UtilityGrid::new(&grid, values).expect("one value per cell")
    }

    #[test]
    fn climbs_to_local_maximum() {
        let empty = vec![CellKind::Empty; 3];
        let field = utilities(
            &[empty.clone(), empty.clone(), empty],
            vec![
                0.1, 0.2, 0.9, //
                0.05, 0.3, 0.5, //
                0.0, 0.0, 0.0,
            ],
        );

        let path: Vec<CellCoord> = walk(&field, CellCoord::new(2, 0)).collect();
        assert_eq!(
            path,
            vec![
                CellCoord::new(2, 0),
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
                CellCoord::new(1, 2),
                CellCoord::new(0, 2),
            ]
        );
    }

    #[test]
    fn ties_prefer_earlier_direction() {
        let empty = vec![CellKind::Empty; 3];
        let field = utilities(
            &[empty.clone(), empty.clone(), empty],
            vec![
                0.0, 0.5, 0.0, //
                0.5, 0.1, 0.5, //
                0.0, 0.5, 0.0,
            ],
        );

        let path: Vec<CellCoord> = walk(&field, CellCoord::new(1, 1)).collect();
        assert_eq!(path[1], CellCoord::new(0, 1), "up wins ties");
    }

    #[test]
    fn equal_neighbors_do_not_move_the_walk() {
        let field = utilities(
            &[
                vec![CellKind::Empty, CellKind::Empty],
                vec![CellKind::Empty, CellKind::Empty],
            ],
            vec![0.2; 4],
        );

        let path: Vec<CellCoord> = walk(&field, CellCoord::new(0, 0)).collect();
        assert_eq!(path, vec![CellCoord::new(0, 0)]);
    }

    #[test]
    fn rocks_are_never_entered() {
        let field = utilities(
            &[
                vec![CellKind::Empty, CellKind::Rock],
                vec![CellKind::Empty, CellKind::Empty],
            ],
            vec![0.0, 5.0, 0.1, 0.2],
        );

        let path: Vec<CellCoord> = walk(&field, CellCoord::new(0, 0)).collect();
        assert_eq!(
            path,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn start_outside_grid_yields_nothing() {
        let field = utilities(&[vec![CellKind::Reward]], vec![1.0]);
        let mut path = walk(&field, CellCoord::new(1, 0));
        assert_eq!(path.size_hint(), (0, Some(0)));
        assert_eq!(path.next(), None);
    }

    #[test]
    fn walk_is_fused() {
        let field = utilities(&[vec![CellKind::Reward]], vec![1.0]);
        let mut path = walk(&field, CellCoord::new(0, 0));
        assert_eq!(path.next(), Some(CellCoord::new(0, 0)));
        assert_eq!(path.next(), None);
        assert_eq!(path.next(), None);
    }
}

//! Built-in and seeded random boards.

use clap::ValueEnum;
use mouse_maze_core::{CellCoord, CellKind, Command};
use mouse_maze_world::{self as world, query, Board};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Boards shipped with the command-line adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Scenario {
    /// 20 x 20 board with the reward near the top and a fire beside the start.
    Classic,
    /// 5 x 5 board with a fire, two rocks, and the mouse in the lower-left corner.
    Small,
}

impl Scenario {
    pub(crate) fn board(self) -> Board {
        match self {
            Self::Classic => paint(
                20,
                &[
                    (CellCoord::new(0, 4), CellKind::Reward),
                    (CellCoord::new(1, 1), CellKind::Fire),
                ],
            ),
            Self::Small => paint(
                5,
                &[
                    (CellCoord::new(4, 0), CellKind::MouseStart),
                    (CellCoord::new(0, 4), CellKind::Reward),
                    (CellCoord::new(1, 1), CellKind::Fire),
                    (CellCoord::new(2, 0), CellKind::Rock),
                    (CellCoord::new(3, 3), CellKind::Rock),
                ],
            ),
        }
    }
}

/// Generates a reproducible board from `seed`.
///
/// The mouse starts on a random cell. One reward, `max(size / 4, 1)` fires
/// and `size * size / 10` rocks are then drawn, in that order, from the cells
/// that are still empty; a kind gets fewer cells only when the floor runs out.
/// Every board larger than 1 x 1 therefore holds its reward.
pub(crate) fn random_board(size: u32, seed: u64) -> Board {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut board = Board::new(size);
    let size = query::size(&board);
    let mut events = Vec::new();

    let start = CellCoord::new(rng.gen_range(0..size), rng.gen_range(0..size));
    world::apply(
        &mut board,
        Command::PaintCell {
            cell: start,
            kind: CellKind::MouseStart,
        },
        &mut events,
    );

    let cell_count = size.saturating_mul(size);
    let placements = [
        (CellKind::Reward, 1),
        (CellKind::Fire, (size / 4).max(1)),
        (CellKind::Rock, cell_count / 10),
    ];

    for (kind, count) in placements {
        let floor = empty_cells(&board);
        let chosen: Vec<CellCoord> = floor
            .choose_multiple(&mut rng, count as usize)
            .copied()
            .collect();
        for cell in chosen {
            world::apply(&mut board, Command::PaintCell { cell, kind }, &mut events);
        }
    }

    board
}

fn empty_cells(board: &Board) -> Vec<CellCoord> {
    query::kinds(board)
        .iter()
        .enumerate()
        .flat_map(|(row, kinds)| {
            kinds
                .iter()
                .enumerate()
                .filter(|(_, kind)| **kind == CellKind::Empty)
                .map(move |(column, _)| CellCoord::new(row as u32, column as u32))
        })
        .collect()
}

fn paint(size: u32, cells: &[(CellCoord, CellKind)]) -> Board {
    let mut board = Board::new(size);
    let mut events = Vec::new();
    for &(cell, kind) in cells {
        world::apply(&mut board, Command::PaintCell { cell, kind }, &mut events);
    }
    board
}

//! Row-partitioned synchronous sweep over a rayon thread pool.
//!
//! Each sweep runs in two phases. Phase A updates every free cell from the
//! frozen `current` buffer, writing its new utility and its change into the
//! row slices of `next` and of the delta buffer. Phase B copies every fixed
//! cell's reward into `next`. Rows are handed out with `par_chunks_mut`, so
//! every output slot has exactly one writer and no locking is needed. Each
//! `for_each` returns only after all of its tasks finish, which provides the
//! barrier between the phases, the reduction, and the buffer swap.

use std::{mem, num::NonZeroUsize};

use mouse_maze_core::{transition::bellman_update, CellCoord, RewardGrid, UtilityGrid};
use rayon::{prelude::*, ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tracing::debug;

use crate::{run_sweeps, Solution, SolveError, SolverConfig, SweepReport};

/// Solves the grid on a dedicated rayon thread pool.
pub fn solve_parallel(grid: &RewardGrid, config: &SolverConfig) -> Result<Solution, SolveError> {
    solve_parallel_with_observer(grid, config, |_| {})
}

/// Solves the grid on a dedicated rayon thread pool, reporting progress after
/// every sweep.
///
/// The observer runs on the calling thread between sweeps.
pub fn solve_parallel_with_observer<F>(
    grid: &RewardGrid,
    config: &SolverConfig,
    observer: F,
) -> Result<Solution, SolveError>
where
    F: FnMut(SweepReport),
{
    let pool = build_pool(config.threads())?;
    debug!(workers = pool.current_num_threads(), "solver pool ready");

    let partition = RowPartition::new(grid);
    let discount = config.discount();
    let width = grid.size() as usize;
    let mut current = vec![0.0; grid.len()];
    let mut next = vec![0.0; grid.len()];
    let mut deltas = vec![0.0; grid.len()];

    let summary = run_sweeps(config, observer, || {
        let max_delta = pool.install(|| {
            let frozen = current.as_slice();

            next.par_chunks_mut(width)
                .zip(deltas.par_chunks_mut(width))
                .zip(partition.free.par_iter())
                .for_each(|((next_row, delta_row), cells)| {
                    for &cell in cells {
                        let column = cell.column() as usize;
                        let own = frozen[cell.row() as usize * width + column];
                        let updated = bellman_update(grid, frozen, cell, discount).unwrap_or(own);
                        delta_row[column] = (updated - own).abs();
                        next_row[column] = updated;
                    }
                });

            next.par_chunks_mut(width)
                .zip(partition.fixed.par_iter())
                .for_each(|(next_row, cells)| {
                    for cell in cells {
                        next_row[cell.column] = cell.reward;
                    }
                });

            deltas.par_iter().copied().reduce(|| 0.0, f64::max)
        });

        mem::swap(&mut current, &mut next);
        deltas.fill(0.0);
        max_delta
    })?;

    Ok(summary.into_solution(UtilityGrid::new(grid, current)?))
}

fn build_pool(threads: Option<NonZeroUsize>) -> Result<ThreadPool, ThreadPoolBuildError> {
    let mut builder =
        ThreadPoolBuilder::new().thread_name(|index| format!("mouse-maze-sweep-{index}"));
    if let Some(threads) = threads {
        builder = builder.num_threads(threads.get());
    }
    builder.build()
}

#[derive(Clone, Copy, Debug)]
struct FixedCell {
    column: usize,
    reward: f64,
}

/// Free and fixed cells grouped by row, computed once per solve so Phase A
/// never branches on a cell's role.
#[derive(Debug)]
struct RowPartition {
    free: Vec<Vec<CellCoord>>,
    fixed: Vec<Vec<FixedCell>>,
}

impl RowPartition {
    fn new(grid: &RewardGrid) -> Self {
        let rows = grid.size() as usize;
        let mut free = vec![Vec::new(); rows];
        let mut fixed = vec![Vec::new(); rows];

        for (index, role) in grid.roles().iter().enumerate() {
            let cell = grid.coord(index);
            let row = cell.row() as usize;
            if role.is_free() {
                free[row].push(cell);
            } else {
                fixed[row].push(FixedCell {
                    column: cell.column() as usize,
                    reward: grid.rewards()[index],
                });
            }
        }

        Self { free, fixed }
    }
}

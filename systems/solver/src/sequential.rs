//! Single-threaded synchronous sweep.

use std::mem;

use mouse_maze_core::{transition::bellman_update, CellRole, RewardGrid, UtilityGrid};

use crate::{run_sweeps, Solution, SolveError, SolverConfig, SweepReport};

/// Solves the grid on the calling thread.
pub fn solve_sequential(grid: &RewardGrid, config: &SolverConfig) -> Result<Solution, SolveError> {
    solve_sequential_with_observer(grid, config, |_| {})
}

/// Solves the grid on the calling thread, reporting progress after every sweep.
pub fn solve_sequential_with_observer<F>(
    grid: &RewardGrid,
    config: &SolverConfig,
    observer: F,
) -> Result<Solution, SolveError>
where
    F: FnMut(SweepReport),
{
    let discount = config.discount();
    let mut current = vec![0.0; grid.len()];
    let mut next = vec![0.0; grid.len()];

    let summary = run_sweeps(config, observer, || {
        let mut max_delta: f64 = 0.0;

        for (index, role) in grid.roles().iter().enumerate() {
            match role {
                CellRole::Free => {
                    let updated =
                        bellman_update(grid, &current, grid.coord(index), discount)
                            .unwrap_or(current[index]);
                    max_delta = max_delta.max((updated - current[index]).abs());
                    next[index] = updated;
                }
                CellRole::Wall | CellRole::Terminal => next[index] = grid.rewards()[index],
            }
        }

        mem::swap(&mut current, &mut next);
        max_delta
    })?;

    Ok(summary.into_solution(UtilityGrid::new(grid, current)?))
}

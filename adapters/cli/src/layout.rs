//! Plain-text board layouts.
//!
//! One row per line, one glyph per cell: `.` empty floor, `M` mouse start,
//! `R` reward, `F` fire, `#` rock. Blank lines are ignored.

use mouse_maze_core::{CellCoord, CellKind, Command, MAX_BOARD_SIZE};
use mouse_maze_world::{self as world, query, Board};
use thiserror::Error;

/// Errors that can occur while parsing a text layout.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum LayoutError {
    /// The layout contained no rows.
    #[error("layout contains no rows")]
    Empty,
    /// A character did not map to any cell kind.
    #[error("unknown glyph {glyph:?} at line {line}, column {column}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// One-based line number.
        line: usize,
        /// One-based column number.
        column: usize,
    },
    /// A row's width differed from the number of rows.
    #[error("line {line} has {found} cells but the layout has {expected} rows")]
    NotSquare {
        /// One-based line number.
        line: usize,
        /// Width required for a square layout.
        expected: usize,
        /// Width found on the line.
        found: usize,
    },
    /// The layout has more rows than a board can hold.
    #[error("layout has {0} rows but boards hold at most {max} per side", max = MAX_BOARD_SIZE)]
    TooLarge(usize),
    /// The layout did not contain exactly one mouse start.
    #[error("layout must contain exactly one mouse start, found {0}")]
    MouseStartCount(usize),
}

fn glyph_kind(glyph: char) -> Option<CellKind> {
    match glyph {
        '.' => Some(CellKind::Empty),
        'M' => Some(CellKind::MouseStart),
        'R' => Some(CellKind::Reward),
        'F' => Some(CellKind::Fire),
        '#' => Some(CellKind::Rock),
        _ => None,
    }
}

pub(crate) fn kind_glyph(kind: CellKind) -> char {
    match kind {
        CellKind::Empty => '.',
        CellKind::MouseStart => 'M',
        CellKind::Reward => 'R',
        CellKind::Fire => 'F',
        CellKind::Rock => '#',
    }
}

/// Parses a text layout into a board.
pub(crate) fn parse(text: &str) -> Result<Board, LayoutError> {
    let mut rows: Vec<(usize, Vec<CellKind>)> = Vec::new();
    for (offset, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let kinds = trimmed
            .chars()
            .enumerate()
            .map(|(column, glyph)| {
                glyph_kind(glyph).ok_or(LayoutError::UnknownGlyph {
                    glyph,
                    line: offset + 1,
                    column: column + 1,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push((offset + 1, kinds));
    }

    if rows.is_empty() {
        return Err(LayoutError::Empty);
    }

    let expected = rows.len();
    if expected > MAX_BOARD_SIZE as usize {
        return Err(LayoutError::TooLarge(expected));
    }
    if let Some((line, kinds)) = rows.iter().find(|(_, kinds)| kinds.len() != expected) {
        return Err(LayoutError::NotSquare {
            line: *line,
            expected,
            found: kinds.len(),
        });
    }

    let starts = rows
        .iter()
        .flat_map(|(_, kinds)| kinds.iter())
        .filter(|kind| **kind == CellKind::MouseStart)
        .count();
    if starts != 1 {
        return Err(LayoutError::MouseStartCount(starts));
    }

    let mut board = Board::new(expected as u32);
    let mut events = Vec::new();

    // The mouse start moves first so the origin is free for any other kind.
    let mut cells: Vec<(CellCoord, CellKind)> = rows
        .iter()
        .enumerate()
        .flat_map(|(row, (_, kinds))| {
            kinds.iter().enumerate().map(move |(column, kind)| {
                (CellCoord::new(row as u32, column as u32), *kind)
            })
        })
        .filter(|(_, kind)| *kind != CellKind::Empty)
        .collect();
    cells.sort_by_key(|(_, kind)| *kind != CellKind::MouseStart);

    for (cell, kind) in cells {
        world::apply(&mut board, Command::PaintCell { cell, kind }, &mut events);
    }

    Ok(board)
}

/// Renders a board back into its text layout.
pub(crate) fn render(board: &Board) -> String {
    query::kinds(board)
        .iter()
        .map(|row| row.iter().copied().map(kind_glyph).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
....R
.F...
#....
...#.
M....
";

    #[test]
    fn parses_sample_layout() {
        let board = parse(SAMPLE).expect("valid layout");

        assert_eq!(query::size(&board), 5);
        assert_eq!(query::mouse_start(&board), CellCoord::new(4, 0));
        assert_eq!(
            query::kind_at(&board, CellCoord::new(0, 4)),
            Some(CellKind::Reward)
        );
        assert_eq!(
            query::kind_at(&board, CellCoord::new(2, 0)),
            Some(CellKind::Rock)
        );
        assert_eq!(query::kind_at(&board, CellCoord::new(0, 0)), Some(CellKind::Empty));
        assert_eq!(render(&board), SAMPLE.trim_end());
    }

    #[test]
    fn origin_can_hold_other_kinds() {
        let board = parse("R.\n.M\n").expect("valid layout");
        assert_eq!(query::kind_at(&board, CellCoord::new(0, 0)), Some(CellKind::Reward));
        assert_eq!(query::mouse_start(&board), CellCoord::new(1, 1));
    }

    #[test]
    fn blank_lines_are_ignored() {
        let board = parse("\nM.\n\n..\n").expect("valid layout");
        assert_eq!(query::size(&board), 2);
    }

    #[test]
    fn rejects_unknown_glyphs() {
        assert_eq!(
            parse("M.\n.x\n"),
            Err(LayoutError::UnknownGlyph {
                glyph: 'x',
                line: 2,
                column: 2,
            })
        );
    }

    #[test]
    fn rejects_non_square_layouts() {
        assert_eq!(
            parse("M..\n...\n"),
            Err(LayoutError::NotSquare {
                line: 1,
                expected: 2,
                found: 3,
            })
        );
        assert_eq!(parse("   \n"), Err(LayoutError::Empty));
    }

    #[test]
    fn rejects_layouts_larger_than_a_board() {
        let side = MAX_BOARD_SIZE as usize + 1;
        let text = vec![".".repeat(side); side].join("\n");
        assert_eq!(parse(&text), Err(LayoutError::TooLarge(side)));
    }

    #[test]
    fn requires_exactly_one_mouse_start() {
        assert_eq!(parse("..\n..\n"), Err(LayoutError::MouseStartCount(0)));
        assert_eq!(parse("MM\n..\n"), Err(LayoutError::MouseStartCount(2)));
    }
}

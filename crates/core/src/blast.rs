//! Blast propagation shared by bombs, rockets and landmines.
//! This module exists so every explosive and every hazard estimate agrees on which cells burn.
//! It does not own detonation timing or the side effects of an explosion.

use crate::state::Grid;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlastReach {
    Origin,
    Open,
    /// The blast burns this soft wall and stops.
    Absorbed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlastCell {
    pub pos: Pos,
    pub reach: BlastReach,
}

/// Cells reached by an explosion of `range` arms centred on `origin`.
///
/// Each arm stops before a hard wall or the grid edge, and stops after the first soft
/// wall it reaches. The origin is always included while it lies inside the grid.
pub fn compute_blast_cells(origin: Pos, range: u32, grid: &Grid) -> Vec<BlastCell> {
    let mut cells = Vec::with_capacity(1 + 4 * range as usize);
    if grid.in_bounds(origin) {
        cells.push(BlastCell { pos: origin, reach: BlastReach::Origin });
    }
    for dir in Direction::ALL {
        let mut pos = origin;
        for _ in 0..range {
            pos = pos.step(dir);
            match grid.cell_at(pos) {
                CellKind::HardWall => break,
                CellKind::SoftWall => {
                    cells.push(BlastCell { pos, reach: BlastReach::Absorbed });
                    break;
                }
                CellKind::Floor => cells.push(BlastCell { pos, reach: BlastReach::Open }),
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn positions(cells: &[BlastCell]) -> Vec<Pos> {
        let mut out: Vec<Pos> = cells.iter().map(|cell| cell.pos).collect();
        out.sort();
        out
    }

    #[test]
    fn open_floor_blast_is_a_cross() {
        let grid = Grid::new(5, 5);
        let cells = compute_blast_cells(Pos { y: 2, x: 2 }, 1, &grid);
        assert_eq!(
            positions(&cells),
            vec![
                Pos { y: 1, x: 2 },
                Pos { y: 2, x: 1 },
                Pos { y: 2, x: 2 },
                Pos { y: 2, x: 3 },
                Pos { y: 3, x: 2 },
            ]
        );
    }

    #[test]
    fn hard_wall_is_not_marked_and_stops_the_arm() {
        let grid = Grid::from_ascii(&["..#.."]).expect("grid");
        let cells = compute_blast_cells(Pos { y: 0, x: 0 }, 4, &grid);
        assert_eq!(positions(&cells), vec![Pos { y: 0, x: 0 }, Pos { y: 0, x: 1 }]);
    }

    #[test]
    fn soft_wall_absorbs_the_arm() {
        let grid = Grid::from_ascii(&[".*.."]).expect("grid");
        let cells = compute_blast_cells(Pos { y: 0, x: 0 }, 3, &grid);
        assert_eq!(
            cells,
            vec![
                BlastCell { pos: Pos { y: 0, x: 0 }, reach: BlastReach::Origin },
                BlastCell { pos: Pos { y: 0, x: 1 }, reach: BlastReach::Absorbed },
            ]
        );
    }

    #[test]
    fn zero_range_burns_only_the_origin() {
        let grid = Grid::new(3, 3);
        let cells = compute_blast_cells(Pos { y: 1, x: 1 }, 0, &grid);
        assert_eq!(positions(&cells), vec![Pos { y: 1, x: 1 }]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn blast_never_crosses_a_hard_wall(wall_x in 1i32..8, range in 0u32..10) {
            let mut grid = Grid::new(9, 1);
            grid.set_cell(Pos { y: 0, x: wall_x }, CellKind::HardWall);
            let cells = compute_blast_cells(Pos { y: 0, x: 0 }, range, &grid);
            prop_assert!(cells.iter().all(|cell| cell.pos.x < wall_x));
        }
    }
}

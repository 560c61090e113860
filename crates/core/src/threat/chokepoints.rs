use crate::state::Grid;
use crate::types::{CellKind, Pos, neighbors};

/// A floor cell with at least two non-floor cardinal neighbours; the grid edge counts as wall.
pub fn is_chokepoint(grid: &Grid, pos: Pos) -> bool {
    grid.cell_at(pos) == CellKind::Floor
        && neighbors(pos).iter().filter(|n| grid.cell_at(**n) != CellKind::Floor).count() >= 2
}

pub fn find_chokepoints(grid: &Grid) -> Vec<Pos> {
    grid.positions().filter(|pos| is_chokepoint(grid, *pos)).collect()
}

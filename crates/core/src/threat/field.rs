use crate::types::Pos;

/// Grid-shaped storage for one value per cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Field<T> {
    pub width: usize,
    pub height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Field<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self { width, height, cells: vec![value; width * height] }
    }
}

impl<T> Field<T> {
    pub fn get(&self, pos: Pos) -> Option<&T> {
        self.index(pos).map(|idx| &self.cells[idx])
    }

    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut T> {
        self.index(pos).map(|idx| &mut self.cells[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, &T)> + '_ {
        self.cells.iter().enumerate().map(|(idx, value)| {
            (Pos { y: (idx / self.width) as i32, x: (idx % self.width) as i32 }, value)
        })
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }
}

impl<T: Copy> Field<T> {
    pub fn value_or(&self, pos: Pos, fallback: T) -> T {
        self.get(pos).copied().unwrap_or(fallback)
    }
}

impl Field<f32> {
    /// Risk in `[0, 1]`; anything outside the grid counts as lethal.
    pub fn risk_at(&self, pos: Pos) -> f32 {
        self.value_or(pos, 1.0)
    }

    pub fn raise_to(&mut self, pos: Pos, value: f32) {
        if let Some(cell) = self.get_mut(pos) {
            *cell = cell.max(value);
        }
    }

    pub fn add(&mut self, pos: Pos, value: f32) {
        if let Some(cell) = self.get_mut(pos) {
            *cell += value;
        }
    }
}

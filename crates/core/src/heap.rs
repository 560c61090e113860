//! Comparator-driven binary heap used as the A* open list.

pub struct PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    items: Vec<T>,
    /// Returns true when the first argument must leave the queue before the second.
    precedes: F,
}

impl<T, F> PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    pub fn new(precedes: F) -> Self {
        Self { items: Vec::new(), precedes }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    /// Removes and returns the extreme element.
    ///
    /// # Panics
    /// Panics when the queue is empty; check `is_empty` first.
    pub fn pop(&mut self) -> T {
        assert!(!self.items.is_empty(), "pop called on an empty PriorityQueue");
        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let top = self.items.pop().expect("queue checked non-empty above");
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        top
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !(self.precedes)(&self.items[idx], &self.items[parent]) {
                break;
            }
            self.items.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * idx + 1;
            let right = left + 1;
            let mut best = idx;
            if left < len && (self.precedes)(&self.items[left], &self.items[best]) {
                best = left;
            }
            if right < len && (self.precedes)(&self.items[right], &self.items[best]) {
                best = right;
            }
            if best == idx {
                break;
            }
            self.items.swap(idx, best);
            idx = best;
        }
    }
}

impl<T, F> Extend<T> for PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

use std::collections::VecDeque;

use crate::{Cell, GridInt};
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    /// Unit step as (col, row); rows grow downwards.
    pub fn delta(self) -> (GridInt, GridInt) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        matches!((self, other), (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right))
    }

    pub fn head_char(self) -> char {
        match self {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

/// Snake body, head first. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Cell>,
}

impl Snake {
    /// Builds a straight snake of `size` cells whose head is at `head`, trailing
    /// away from `direction`.
    pub fn new(head: Cell, size: GridInt, direction: Direction) -> Self {
        let diff = direction.delta();

        let body = (0..size.max(1))
            .map(|i| (head.0 - diff.0 * i, head.1 - diff.1 * i))
            .collect();
        Snake { body }
    }

    #[cfg(test)]
    pub fn from_cells(cells: &[Cell]) -> Self {
        assert!(!cells.is_empty(), "a snake needs at least one cell");
        Snake { body: cells.iter().copied().collect() }
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().copied()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    pub fn next_head(&self, direction: Direction) -> Cell {
        let (head, diff) = (self.head(), direction.delta());
        (head.0 + diff.0, head.1 + diff.1)
    }

    /// Puts `new_head` in front. Unless growing, the tail is dropped and returned.
    pub fn advance(&mut self, new_head: Cell, grow: bool) -> Option<Cell> {
        self.body.push_front(new_head);

        if grow {
            None
        } else {
            self.body.pop_back()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites() {
        assert!(Up.is_opposite(Down));
        assert!(Left.is_opposite(Right));
        assert!(!Up.is_opposite(Up));
        assert!(!Up.is_opposite(Left));
        assert!(!Right.is_opposite(Down));
    }

    #[test]
    fn test_new_trails_behind_head() {
        let snake = Snake::new((10, 10), 3, Right);
        assert_eq!(snake.cells().collect::<Vec<_>>(), vec![(10, 10), (9, 10), (8, 10)]);

        let snake = Snake::new((4, 4), 2, Up);
        assert_eq!(snake.cells().collect::<Vec<_>>(), vec![(4, 4), (4, 5)]);
    }

    #[test]
    fn test_advance_without_growth_drops_tail() {
        let mut snake = Snake::new((5, 5), 3, Right);
        let tail = snake.advance(snake.next_head(Right), false);

        assert_eq!(tail, Some((3, 5)));
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), (6, 5));
    }

    #[test]
    fn test_advance_with_growth_keeps_tail() {
        let mut snake = Snake::new((5, 5), 3, Right);
        let tail = snake.advance(snake.next_head(Down), true);

        assert_eq!(tail, None);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.cells().collect::<Vec<_>>(), vec![(5, 6), (5, 5), (4, 5), (3, 5)]);
    }
}

use crate::{Coords, TermInt};
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }
}

/// A snake stored in a fixed-capacity ring buffer.
///
/// Live segments sit between `tail_index` (inclusive) and `head_index`
/// (exclusive). The current head is kept apart and only written into the
/// buffer when the snake advances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    body: Vec<Coords>,
    head_index: usize,
    tail_index: usize,
    head: Coords,
    direction: Direction,
}

impl Snake {
    /// Builds a snake of `len` live segments trailing behind `head`, away from
    /// `direction`, saturating at the edges of a `bounds`-sized grid.
    pub fn new(
        head: Coords,
        len: usize,
        capacity: usize,
        direction: Direction,
        bounds: Coords,
    ) -> Self {
        debug_assert!(len < capacity, "snake length must stay below the buffer capacity");
        let capacity = capacity.max(1);
        let len = len.min(capacity - 1);

        let (dx, dy) = direction.delta();
        let (max_x, max_y) = (bounds.0.max(1) as i32 - 1, bounds.1.max(1) as i32 - 1);

        let mut body = vec![(0, 0); capacity];
        for (slot, back) in (1..=len).rev().enumerate() {
            let x = (head.0 as i32 - dx * back as i32).clamp(0, max_x);
            let y = (head.1 as i32 - dy * back as i32).clamp(0, max_y);
            body[slot] = (x as TermInt, y as TermInt);
        }

        Snake {
            body,
            head_index: len,
            tail_index: 0,
            head,
            direction,
        }
    }

    /// Number of live segments, not counting the detached head.
    pub fn len(&self) -> usize {
        (self.head_index + self.capacity() - self.tail_index) % self.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Coords {
        self.head
    }

    pub fn head_index(&self) -> usize {
        self.head_index
    }

    pub fn tail_index(&self) -> usize {
        self.tail_index
    }

    pub fn slot(&self, index: usize) -> Coords {
        self.body[index % self.capacity()]
    }

    pub fn segments(&self) -> Segments<'_> {
        Segments {
            snake: self,
            index: self.tail_index,
        }
    }

    /// Moves the snake one cell inside a `width` x `height` grid.
    ///
    /// The old head becomes the newest body segment and the oldest one drops
    /// off, so the length never changes. Movement past an edge is suppressed.
    pub fn advance(&mut self, (width, height): Coords) {
        self.body[self.head_index] = self.head;
        self.head_index = (self.head_index + 1) % self.capacity();
        self.tail_index = (self.tail_index + 1) % self.capacity();

        let (max_x, max_y) = (width.max(1) - 1, height.max(1) - 1);
        // The grid may have shrunk since the last tick.
        let (mut x, mut y) = (self.head.0.min(max_x), self.head.1.min(max_y));

        match self.direction {
            Down => {
                if y < max_y {
                    y += 1;
                }
            }
            Up => {
                if y > 0 {
                    y -= 1;
                }
            }
            Left => {
                if x > 0 {
                    x -= 1;
                }
            }
            Right => {
                if x < max_x {
                    x += 1;
                }
            }
        }

        self.head = (x, y);
    }

    /// Any direction is accepted, including a reversal into the body.
    pub fn set_direction(&mut self, new_direction: Direction) {
        self.direction = new_direction;
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

/// Live segments from the tail towards the head.
pub struct Segments<'a> {
    snake: &'a Snake,
    index: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Coords;

    fn next(&mut self) -> Option<Coords> {
        if self.index == self.snake.head_index {
            return None;
        }

        let pos = self.snake.slot(self.index);
        self.index = (self.index + 1) % self.snake.capacity();
        Some(pos)
    }
}

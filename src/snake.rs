// the snake is stored head first, it moves by pushing a new head and dropping the tail
// unless food was eaten on that move
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl Coordinates {
    pub fn new(x: i32, y: i32) -> Coordinates {
        Coordinates { x, y }
    }

    pub fn get_left(&self) -> Coordinates {
        Coordinates::new(self.x - 1, self.y)
    }
    pub fn get_right(&self) -> Coordinates {
        Coordinates::new(self.x + 1, self.y)
    }
    pub fn get_up(&self) -> Coordinates {
        Coordinates::new(self.x, self.y - 1)
    }
    pub fn get_down(&self) -> Coordinates {
        Coordinates::new(self.x, self.y + 1)
    }

    /// The neighbouring cell one step towards `direction`
    pub fn step(&self, direction: Direction) -> Coordinates {
        match direction {
            Direction::Up => self.get_up(),
            Direction::Down => self.get_down(),
            Direction::Left => self.get_left(),
            Direction::Right => self.get_right(),
        }
    }

    pub fn is_in_bound(&self, grid_size: i32) -> bool {
        self.x >= 0 && self.x < grid_size && self.y >= 0 && self.y < grid_size
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snake {
    body: VecDeque<Coordinates>, // The head is the first element
}

impl Snake {
    /// A horizontal snake with its head at `head` and the body trailing towards negative x
    pub fn horizontal(head: Coordinates, length: usize) -> Self {
        let body = (0..length as i32)
            .map(|i| Coordinates::new(head.x - i, head.y))
            .collect();
        Snake { body }
    }

    pub fn from_segments<I: IntoIterator<Item = Coordinates>>(segments: I) -> Self {
        Snake {
            body: segments.into_iter().collect(),
        }
    }

    pub fn head(&self) -> Option<Coordinates> {
        self.body.front().copied()
    }

    pub fn tail(&self) -> Option<Coordinates> {
        self.body.back().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, position: &Coordinates) -> bool {
        self.body.contains(position)
    }

    pub fn segments(&self) -> impl Iterator<Item = &Coordinates> {
        self.body.iter()
    }

    /// Pushes `new_head` and drops the tail unless `grow` is set.
    /// Returns the vacated tail cell, if any.
    pub fn advance(&mut self, new_head: Coordinates, grow: bool) -> Option<Coordinates> {
        self.body.push_front(new_head);
        if grow {
            None
        } else {
            self.body.pop_back()
        }
    }
}

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use tracing::{debug, trace};

use Direction::*;

/// Grid cell, `x` is the column and `y` the row, origin at the top-left.
/// Signed so a head that walks off the top or left edge is representable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    fn step(self, direction: Direction) -> Self {
        match direction {
            Down => Position::new(self.x, self.y + 1),
            Up => Position::new(self.x, self.y - 1),
            Left => Position::new(self.x - 1, self.y),
            Right => Position::new(self.x + 1, self.y),
        }
    }

    fn within(self, width: i32, height: i32) -> bool {
        (0..width).contains(&self.x) && (0..height).contains(&self.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Down,
    Up,
    Left,
    Right,
}

/// Why a transition refused to continue the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Crash {
    OffGrid,
    SelfCollision,
}

/// Snake body (head first) plus the food on the board.
#[derive(Clone, Debug)]
pub struct GameState {
    snake: Vec<Position>,
    food: HashSet<Position>,
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        GameState::with_parts(vec![Position::new(0, 0)], &[Position::new(0, 1)])
    }

    /// Builds an arbitrary board. Panics if `snake` is empty.
    pub fn with_parts(snake: Vec<Position>, food: &[Position]) -> Self {
        assert!(!snake.is_empty(), "a snake needs at least a head");
        GameState { snake, food: food.iter().copied().collect() }
    }

    pub fn snake(&self) -> &[Position] {
        &self.snake
    }

    pub fn head(&self) -> Position {
        self.snake[0]
    }

    pub fn food(&self) -> &HashSet<Position> {
        &self.food
    }

    /// Moves the snake one cell. Returns `false` once the game is over; the
    /// body is left half-moved in that case and must not be advanced again.
    pub fn transition<R: Rng>(&mut self, direction: Direction, width: i32, height: i32, rng: &mut R) -> bool {
        match self.advance(direction, width, height, rng) {
            Ok(()) => true,
            Err(crash) => {
                debug!(?crash, length = self.snake.len(), "Snake crashed");
                false
            }
        }
    }

    pub fn advance<R: Rng>(&mut self, direction: Direction, width: i32, height: i32, rng: &mut R) -> Result<(), Crash> {
        trace!(state = ?self, ?direction, "Before transition");

        // Kept so a feeding can grow the chain at the spot the tail just left.
        let old_tail = self.snake[self.snake.len() - 1];
        for i in (1..self.snake.len()).rev() {
            self.snake[i] = self.snake[i - 1];
        }
        self.snake[0] = self.snake[0].step(direction);

        let head = self.snake[0];
        if !head.within(width, height) {
            return Err(Crash::OffGrid);
        }

        let mut seen = HashSet::with_capacity(self.snake.len());
        if !self.snake.iter().all(|pos| seen.insert(*pos)) {
            return Err(Crash::SelfCollision);
        }

        if self.food.contains(&head) {
            // Growing back into the cell the head just entered would repeat it.
            if old_tail == head {
                return Err(Crash::SelfCollision);
            }
            self.food.remove(&head);
            debug!(%head, "Ate food");
            self.snake.push(old_tail);
            // Placement ignores the snake on purpose: food may land on the body.
            let fresh = Position::new(rng.gen_range(0..width), rng.gen_range(0..height));
            debug!(%fresh, "New food");
            self.food.insert(fresh);
        }

        trace!(state = ?self, "After transition");
        Ok(())
    }
}

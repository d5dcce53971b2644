//! Simulation core: snake, food, score and the episode state machine.
//!
//! The engine does no I/O and knows nothing about time. Something outside
//! calls [`Engine::tick`] at a fixed period and reads the state back for
//! drawing.

use log::{debug, error, info};
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::snake::{Direction, Snake};
use crate::{Cell, GridInt};

pub const INITIAL_SNAKE_LENGTH: GridInt = 3;
pub const FOOD_SCORE: u32 = 10;

// Random draws per grid cell before falling back to enumerating free cells.
const SPAWN_ATTEMPTS_PER_CELL: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Raised when the score of the current episode beats the best one so far.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NewHighScore {
    pub old: u32,
    pub new: u32,
}

/// Owned copy of everything a renderer needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub tile_count: GridInt,
    pub snake: Vec<Cell>,
    pub food: Cell,
    pub direction: Direction,
    pub score: u32,
    pub high_score: u32,
    pub phase: Phase,
}

pub struct Engine<R = ThreadRng> {
    tile_count: GridInt,
    snake: Snake,
    direction: Direction,
    pending_direction: Option<Direction>,
    food: Cell,
    score: u32,
    high_score: u32,
    high_score_event: Option<NewHighScore>,
    phase: Phase,
    rng: R,
}

impl Engine<ThreadRng> {
    pub fn new(tile_count: GridInt, high_score: u32) -> Self {
        Engine::with_rng(tile_count, high_score, rand::thread_rng())
    }
}

impl<R: Rng> Engine<R> {
    /// `tile_count` must leave room for the starting snake, i.e. be at least
    /// `INITIAL_SNAKE_LENGTH + 1`.
    pub fn with_rng(tile_count: GridInt, high_score: u32, rng: R) -> Self {
        let mut engine = Engine {
            tile_count,
            snake: Snake::new((0, 0), 1, Direction::Right),
            direction: Direction::Right,
            pending_direction: None,
            food: (0, 0),
            score: 0,
            high_score,
            high_score_event: None,
            phase: Phase::Idle,
            rng,
        };

        engine.reset_layout();
        engine
    }

    pub fn init_episode(&mut self) {
        self.phase = if self.reset_layout() { Phase::Running } else { Phase::GameOver };
        info!("Episode started on a {0}x{0} grid (high score {1})", self.tile_count, self.high_score);
    }

    /// Queues `requested` for the next tick. Reversals of the current
    /// direction are refused, as is any request outside a running episode.
    pub fn set_direction(&mut self, requested: Direction) -> bool {
        if self.phase != Phase::Running || requested.is_opposite(self.direction) {
            return false;
        }

        self.pending_direction = Some(requested);
        true
    }

    pub fn tick(&mut self) -> Phase {
        if self.phase != Phase::Running {
            return self.phase;
        }

        if let Some(dir) = self.pending_direction.take() {
            self.direction = dir;
        }

        let new_head = self.snake.next_head(self.direction);

        if !self.in_bounds(new_head) {
            debug!("Hit the wall at {:?}", new_head);
            return self.end_episode();
        }

        // The tail has not moved yet, so it still counts as occupied
        if self.snake.contains(new_head) {
            debug!("Ran into itself at {:?}", new_head);
            return self.end_episode();
        }

        let ate_food = new_head == self.food;
        self.snake.advance(new_head, ate_food);

        if ate_food {
            self.score += FOOD_SCORE;

            if self.score > self.high_score {
                let old = self.high_score_event.map_or(self.high_score, |ev| ev.old);
                self.high_score = self.score;
                self.high_score_event = Some(NewHighScore { old, new: self.score });
            }

            match self.spawn_food() {
                Some(food) => self.food = food,
                None => {
                    error!("No free cell left for food with a snake of length {}", self.snake.len());
                    return self.end_episode();
                }
            }
        }

        self.phase
    }

    pub fn pause(&mut self) -> Phase {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused;
        }
        self.phase
    }

    pub fn resume(&mut self) -> Phase {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
        }
        self.phase
    }

    pub fn toggle_pause(&mut self) -> Phase {
        match self.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            phase => phase,
        }
    }

    /// Hands out the pending high score signal, if any. Several records set
    /// between two calls are merged into one covering the whole rise.
    pub fn take_high_score(&mut self) -> Option<NewHighScore> {
        self.high_score_event.take()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tile_count: self.tile_count,
            snake: self.snake.cells().collect(),
            food: self.food,
            direction: self.direction,
            score: self.score,
            high_score: self.high_score,
            phase: self.phase,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn tile_count(&self) -> GridInt {
        self.tile_count
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    ///////////////////////////////////////////////////////////////////////////

    // Returns false if no food could be placed.
    fn reset_layout(&mut self) -> bool {
        let center = self.tile_count / 2;

        self.snake = Snake::new((center, center), INITIAL_SNAKE_LENGTH, Direction::Right);
        self.direction = Direction::Right;
        self.pending_direction = None;
        self.score = 0;

        match self.spawn_food() {
            Some(food) => {
                self.food = food;
                true
            }
            None => {
                error!("No free cell for the first food on a {0}x{0} grid", self.tile_count);
                false
            }
        }
    }

    fn end_episode(&mut self) -> Phase {
        self.phase = Phase::GameOver;
        self.pending_direction = None;
        info!("Game over with score {} (high score {})", self.score, self.high_score);
        self.phase
    }

    fn in_bounds(&self, (col, row): Cell) -> bool {
        (0..self.tile_count).contains(&col) && (0..self.tile_count).contains(&row)
    }

    fn spawn_food(&mut self) -> Option<Cell> {
        let tile_count = self.tile_count.max(0);
        let cell_count = tile_count as usize * tile_count as usize;

        if self.snake.len() >= cell_count {
            return None;
        }

        for _ in 0..cell_count * SPAWN_ATTEMPTS_PER_CELL {
            let cell = (self.rng.gen_range(0..tile_count), self.rng.gen_range(0..tile_count));
            if !self.snake.contains(cell) {
                return Some(cell);
            }
        }

        let free: Vec<Cell> = (0..tile_count)
            .flat_map(|row| (0..tile_count).map(move |col| (col, row)))
            .filter(|cell| !self.snake.contains(*cell))
            .collect();
        free.choose(&mut self.rng).copied()
    }
}

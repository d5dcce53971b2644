use std::{thread::sleep, time::{Duration, Instant}};

use crate::{Cell, Coords, GridInt, TermInt};
use crate::config::GameConfig;
use crate::engine::{Engine, NewHighScore, Phase, Snapshot};
use crate::highscore::HighScoreStore;
use crate::input::{self, Command};
use crate::term::TermManager;
use crate::ticker::Ticker;

use anyhow::{ensure, Result};
use log::{info, warn};

const POLL_INTERVAL_MS: u64 = 5;

// Every grid cell is two characters wide so the board looks roughly square
const CELL_WIDTH: TermInt = 2;

const SNAKE_BODY_CHAR: char = '█';
const DEAD_SNAKE_CHAR: char = 'X';
const FOOD_GLYPH: [char; 2] = ['(', ')'];
const EMPTY_GLYPH: [char; 2] = [' ', ' '];

/// Terminal front end: owns the engine, feeds it keys and timer ticks, and
/// draws whatever state it ends up in.
pub struct SnakeGame {
    engine: Engine,
    term: TermManager,
    store: HighScoreStore,
    ticker: Ticker,
    board_origin: Coords,
    quit: bool,
}

impl SnakeGame {
    pub fn new(config: &GameConfig) -> Result<Self> {
        let store = HighScoreStore::new(&config.storage.high_score_file);
        let high_score = store.load();
        info!("Loaded high score {} from {}", high_score, store.path().display());

        let tile_count = config.tile_count();
        let term = TermManager::new()?;
        let (w, h) = term.get_terminal_size();
        let (board_w, board_h) = board_size(tile_count);

        // One extra row above the board for the score line
        ensure!(
            w >= board_w && h > board_h,
            "Terminal is {}x{} but a {}x{} grid needs at least {}x{}",
            w, h, tile_count, tile_count, board_w, board_h + 1
        );
        let board_origin = ((w - board_w) / 2, (h - board_h - 1) / 2 + 1);

        Ok(SnakeGame {
            engine: Engine::new(tile_count, high_score),
            term,
            store,
            ticker: Ticker::new(config.tick_interval()),
            board_origin,
            quit: false,
        })
    }

    /// Runs until the player quits. The terminal is restored even when the
    /// game loop fails.
    pub fn run(&mut self) -> Result<()> {
        self.term.setup()?;
        let res = self.game_loop();
        let restored = self.term.restore();
        res.and(restored)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn game_loop(&mut self) -> Result<()> {
        self.term.clear()?;
        self.term.draw_borders(self.board_origin, board_size(self.engine.tile_count()))?;
        self.draw_state()?;
        self.show_intro()?;

        while !self.quit {
            sleep(Duration::from_millis(POLL_INTERVAL_MS));

            for key_ev in self.term.read_key_events_queue()? {
                if let Some(cmd) = input::command_for(&key_ev) {
                    self.apply(cmd)?;
                }
            }

            if !self.quit && self.ticker.poll(Instant::now()) {
                self.step()?;
            }
        }

        info!("Player quit");
        Ok(())
    }

    fn apply(&mut self, cmd: Command) -> Result<()> {
        match cmd {
            Command::Turn(dir) => {
                self.engine.set_direction(dir);
            }
            Command::TogglePause => self.toggle_pause()?,
            Command::Start => {
                if matches!(self.engine.phase(), Phase::Idle | Phase::GameOver) {
                    self.start_episode()?;
                }
            }
            Command::Restart => self.start_episode()?,
            Command::Quit => self.quit = true,
        }

        Ok(())
    }

    fn start_episode(&mut self) -> Result<()> {
        // Drop the old schedule first so only one tick stream ever drives the engine
        self.ticker.stop();
        self.engine.init_episode();
        self.term.hide_message()?;
        self.draw_state()?;

        if self.engine.phase() == Phase::Running {
            self.ticker.start(Instant::now());
        } else {
            self.show_game_over()?;
        }

        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        let phase = self.engine.tick();

        if let Some(record) = self.engine.take_high_score() {
            self.persist_high_score(record);
        }

        self.draw_state()?;

        if phase == Phase::GameOver {
            self.ticker.stop();
            self.show_game_over()?;
        }

        Ok(())
    }

    fn toggle_pause(&mut self) -> Result<()> {
        match self.engine.toggle_pause() {
            Phase::Paused => {
                self.ticker.stop();
                info!("Paused at score {}", self.engine.score());
                self.term.show_message(&["Paused", "Space or Esc to resume", "R to restart, Q to quit"])?;
            }
            Phase::Running => {
                info!("Resumed");
                self.term.hide_message()?;
                self.ticker.start(Instant::now());
            }
            _ => {}
        }

        Ok(())
    }

    fn persist_high_score(&mut self, record: NewHighScore) {
        info!("New high score {} (was {})", record.new, record.old);

        // Losing the record on disk should not end the game
        if let Err(e) = self.store.save(record.new) {
            warn!("{:#}", e);
        }
    }

    fn show_intro(&mut self) -> Result<()> {
        self.term.show_message(&[
            "Arrow keys or WASD to move",
            "Space or Esc to pause",
            "R to restart, Q or CTRL+C to quit",
            "",
            "Press Enter to begin"
        ])
    }

    fn show_game_over(&mut self) -> Result<()> {
        let snap = self.engine.snapshot();

        self.term.show_message(&[
            "Game over!",
            &*format!("Score: {}", snap.score),
            &*format!("High score: {}", snap.high_score),
            "",
            "Press Enter to play again,",
            "or Q to quit."
        ])
    }

    fn draw_state(&mut self) -> Result<()> {
        let snap = self.engine.snapshot();
        let glyphs = board_glyphs(&snap);
        let t = snap.tile_count;

        for row in 0..t {
            for col in 0..t {
                let glyph = glyphs[cell_index(t, (col, row))];
                let (x, y) = self.cell_coords((col, row));
                self.term.print_at((x, y), glyph[0])?;
                self.term.print_at((x + 1, y), glyph[1])?;
            }
        }

        let (board_w, _) = board_size(t);
        let status = format!("Score: {:<6} High score: {}", snap.score, snap.high_score);
        let status = format!("{:<width$}", status, width = board_w as usize);
        self.term.print_str_at((self.board_origin.0, self.board_origin.1 - 1), &status)?;

        self.term.flush()
    }

    fn cell_coords(&self, (col, row): Cell) -> Coords {
        let (x0, y0) = self.board_origin;
        (x0 + 1 + col as TermInt * CELL_WIDTH, y0 + 1 + row as TermInt)
    }
}

/// Outer size of the bordered board for a grid of `tile_count` cells a side.
fn board_size(tile_count: GridInt) -> Coords {
    let tiles = tile_count as TermInt;
    (tiles * CELL_WIDTH + 2, tiles + 2)
}

fn cell_index(tile_count: GridInt, (col, row): Cell) -> usize {
    row as usize * tile_count as usize + col as usize
}

/// What to show in every grid cell, row-major.
fn board_glyphs(snap: &Snapshot) -> Vec<[char; 2]> {
    let t = snap.tile_count;
    let mut glyphs = vec![EMPTY_GLYPH; t as usize * t as usize];
    glyphs[cell_index(t, snap.food)] = FOOD_GLYPH;

    let dead = snap.phase == Phase::GameOver;
    for (i, cell) in snap.snake.iter().enumerate() {
        glyphs[cell_index(t, *cell)] = if dead {
            [DEAD_SNAKE_CHAR; 2]
        } else if i == 0 {
            [snap.direction.head_char(); 2]
        } else {
            [SNAKE_BODY_CHAR; 2]
        };
    }

    glyphs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction;

    fn snapshot(phase: Phase) -> Snapshot {
        Snapshot {
            tile_count: 5,
            snake: vec![(2, 1), (1, 1), (0, 1)],
            food: (4, 4),
            direction: Direction::Right,
            score: 0,
            high_score: 0,
            phase,
        }
    }

    #[test]
    fn test_board_size() {
        assert_eq!(board_size(20), (42, 22));
        assert_eq!(board_size(4), (10, 6));
    }

    #[test]
    fn test_glyphs_running() {
        let glyphs = board_glyphs(&snapshot(Phase::Running));

        assert_eq!(glyphs.len(), 25);
        assert_eq!(glyphs[cell_index(5, (2, 1))], ['>', '>']);
        assert_eq!(glyphs[cell_index(5, (1, 1))], [SNAKE_BODY_CHAR; 2]);
        assert_eq!(glyphs[cell_index(5, (0, 1))], [SNAKE_BODY_CHAR; 2]);
        assert_eq!(glyphs[cell_index(5, (4, 4))], FOOD_GLYPH);
        assert_eq!(glyphs[cell_index(5, (3, 3))], EMPTY_GLYPH);
    }

    #[test]
    fn test_glyphs_game_over() {
        let glyphs = board_glyphs(&snapshot(Phase::GameOver));

        for cell in &[(2, 1), (1, 1), (0, 1)] {
            assert_eq!(glyphs[cell_index(5, *cell)], [DEAD_SNAKE_CHAR; 2]);
        }
    }
}

//! Game state machine and per-tick simulation.
//!
//! The engine owns the whole game state, the tick schedule and the high score store.
//! Hosts feed it input (`set_direction`, `start`, `toggle_pause`) and time (`update`),
//! then read [`GameEngine::state`] back to draw it.

use std::sync::mpsc::Sender;
use std::time::Instant;

use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GameConfig;
use crate::error::Result;
use crate::snake::{Coordinates, Direction, Snake};
use crate::storage::HighScoreStore;
use crate::ticker::{TickId, Ticker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Idle,
    Running,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Wall,
    SelfBite,
}

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Collision(Collision),
    /// The snake covers every cell, there is nowhere left to put food
    BoardFilled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Ate,
    Finished(GameOutcome),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub status: GameStatus,
    pub snake: Snake,
    pub food: Option<Coordinates>,
    /// Direction applied on the last step
    pub direction: Direction,
    /// Direction requested by input, applied at the start of the next step
    pub next_direction: Direction,
    pub score: u32,
    pub high_score: u32,
}

impl GameState {
    fn new(direction: Direction, high_score: u32) -> Self {
        GameState {
            status: GameStatus::Idle,
            snake: Snake::default(),
            food: None,
            direction,
            next_direction: direction,
            score: 0,
            high_score,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status, GameStatus::Running | GameStatus::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.status == GameStatus::Paused
    }

    /// Direction changes are only taken while the game is running and not paused
    pub fn accepts_input(&self) -> bool {
        self.status == GameStatus::Running
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ScoreChanged(u32),
    HighScoreChanged(u32),
    GameOver { score: u32, outcome: GameOutcome },
}

/// Receives score updates and the end-of-game notification.
/// Presenting them is up to the host.
pub trait GameListener {
    fn score_changed(&mut self, _score: u32) {}
    fn high_score_changed(&mut self, _high_score: u32) {}
    fn game_over(&mut self, _final_score: u32, _outcome: GameOutcome) {}
}

pub struct NoopListener;

impl GameListener for NoopListener {}

/// Forwards every notification as a [`GameEvent`] over a channel
pub struct ChannelListener {
    sender: Sender<GameEvent>,
}

impl ChannelListener {
    pub fn new(sender: Sender<GameEvent>) -> Self {
        ChannelListener { sender }
    }

    fn send(&self, event: GameEvent) {
        // the receiver may already be gone
        let _ = self.sender.send(event);
    }
}

impl GameListener for ChannelListener {
    fn score_changed(&mut self, score: u32) {
        self.send(GameEvent::ScoreChanged(score));
    }

    fn high_score_changed(&mut self, high_score: u32) {
        self.send(GameEvent::HighScoreChanged(high_score));
    }

    fn game_over(&mut self, final_score: u32, outcome: GameOutcome) {
        self.send(GameEvent::GameOver {
            score: final_score,
            outcome,
        });
    }
}

pub struct GameEngine {
    config: GameConfig,
    state: GameState,
    ticker: Ticker,
    rng: StdRng,
    store: Box<dyn HighScoreStore>,
    listener: Box<dyn GameListener>,
}

impl GameEngine {
    pub fn new(
        config: GameConfig,
        store: Box<dyn HighScoreStore>,
        listener: Box<dyn GameListener>,
    ) -> Result<Self> {
        Self::with_rng(config, store, listener, StdRng::from_os_rng())
    }

    pub fn with_rng(
        config: GameConfig,
        store: Box<dyn HighScoreStore>,
        listener: Box<dyn GameListener>,
        rng: StdRng,
    ) -> Result<Self> {
        config.validate()?;
        let high_score = match store.load() {
            Ok(score) => score.unwrap_or(0),
            Err(e) => {
                warn!("Error loading high score, starting from 0: {}", e);
                0
            }
        };
        Ok(GameEngine {
            state: GameState::new(config.initial_direction, high_score),
            ticker: Ticker::new(config.tick_period()),
            config,
            rng,
            store,
            listener,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// Starts a fresh game. A game already in progress is thrown away.
    pub fn start(&mut self, now: Instant) {
        if self.state.is_running() {
            info!("Restarting, abandoning game at score {}", self.state.score);
            self.ticker.cancel();
        }
        self.init_game();
        self.state.status = GameStatus::Running;
        self.ticker.schedule(now);
        info!("Game started");
    }

    /// Flips between running and paused. Returns false if no game is running.
    pub fn toggle_pause(&mut self) -> bool {
        self.state.status = match self.state.status {
            GameStatus::Running => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Running,
            _ => return false,
        };
        info!("Paused: {}", self.state.is_paused());
        true
    }

    /// Queues a turn for the next step. Returns whether the request was taken.
    pub fn set_direction(&mut self, requested: Direction) -> bool {
        if !self.state.accepts_input() {
            return false;
        }
        // compared with the committed direction so a double press can't reverse the snake
        if requested.is_opposite(self.state.direction) {
            return false;
        }
        if self.state.next_direction != requested {
            debug!("Next direction {:?}", requested);
        }
        self.state.next_direction = requested;
        true
    }

    /// Advances the schedule to `now` and runs a tick if one was due.
    /// Returns true if the board needs to be redrawn.
    pub fn update(&mut self, now: Instant) -> bool {
        match self.ticker.poll(now) {
            Some(id) => self.tick(id),
            None => false,
        }
    }

    /// Runs one scheduled tick. Ticks from a cancelled or replaced schedule are ignored,
    /// ticks while paused are consumed without effect.
    pub fn tick(&mut self, id: TickId) -> bool {
        if !self.ticker.is_current(id) {
            trace!("Ignoring stale tick");
            return false;
        }
        self.step().is_some()
    }

    /// Moves the snake one cell. Does nothing unless the game is running and not paused.
    pub fn step(&mut self) -> Option<StepOutcome> {
        if self.state.status != GameStatus::Running {
            return None;
        }
        let head = self.state.snake.head()?;
        self.state.direction = self.state.next_direction;
        let new_head = head.step(self.state.direction);

        if !new_head.is_in_bound(self.config.grid_size as i32) {
            return Some(self.finish(GameOutcome::Collision(Collision::Wall)));
        }
        // the tail still counts, it has not moved yet
        if self.state.snake.contains(&new_head) {
            return Some(self.finish(GameOutcome::Collision(Collision::SelfBite)));
        }

        let eating = self.state.food == Some(new_head);
        self.state.snake.advance(new_head, eating);
        if !eating {
            return Some(StepOutcome::Moved);
        }

        self.state.score = self.state.score.saturating_add(self.config.food_reward);
        self.update_score();
        self.state.food = self.place_food();
        if self.state.food.is_none() {
            return Some(self.finish(GameOutcome::BoardFilled));
        }
        Some(StepOutcome::Ate)
    }

    fn init_game(&mut self) {
        let center = (self.config.grid_size / 2) as i32;
        self.state.snake = Snake::horizontal(
            Coordinates::new(center, center),
            self.config.initial_snake_length,
        );
        self.state.food = self.place_food();
        self.state.score = 0;
        self.update_score();
        self.state.direction = self.config.initial_direction;
        self.state.next_direction = self.config.initial_direction;
    }

    /// Picks a free cell uniformly at random, or `None` if the snake covers the board.
    fn place_food(&mut self) -> Option<Coordinates> {
        let grid_size = self.config.grid_size as i32;
        let cell_count = self.config.cell_count();
        let snake = &self.state.snake;
        if snake.len() >= cell_count {
            return None;
        }

        let food = if snake.len() * 5 > cell_count * 4 {
            // past 80% coverage, drawing until a free cell comes up gets slow
            let free: Vec<Coordinates> = (0..grid_size)
                .flat_map(|y| (0..grid_size).map(move |x| Coordinates::new(x, y)))
                .filter(|cell| !snake.contains(cell))
                .collect();
            if free.is_empty() {
                return None;
            }
            free[self.rng.random_range(0..free.len())]
        } else {
            loop {
                let candidate = Coordinates::new(
                    self.rng.random_range(0..grid_size),
                    self.rng.random_range(0..grid_size),
                );
                if !snake.contains(&candidate) {
                    break candidate;
                }
            }
        };
        debug!("Food placed at ({}, {})", food.x, food.y);
        Some(food)
    }

    fn update_score(&mut self) {
        self.listener.score_changed(self.state.score);
        if self.state.score <= self.state.high_score {
            return;
        }
        self.state.high_score = self.state.score;
        info!("New high score: {}", self.state.high_score);
        if let Err(e) = self.store.save(self.state.high_score) {
            warn!("Error saving high score: {}", e);
        }
        self.listener.high_score_changed(self.state.high_score);
    }

    fn finish(&mut self, outcome: GameOutcome) -> StepOutcome {
        self.ticker.cancel();
        self.state.status = GameStatus::GameOver;
        info!("Game over ({:?}), final score {}", outcome, self.state.score);
        self.listener.game_over(self.state.score, outcome);
        StepOutcome::Finished(outcome)
    }
}

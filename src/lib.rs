//! gridsnake - Snake on a fixed square grid
//!
//! - `engine`: game state machine, per-tick movement, collisions, scoring
//! - `ticker`: the cancellable fixed-period schedule that drives the engine
//! - `render`: turns a game state into 2D drawing instructions
//! - `input`: keyboard and drag decoding
//! - `terminal`: the terminal host that ties it all together

pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod render;
pub mod snake;
pub mod storage;
pub mod terminal;
pub mod ticker;

pub use config::GameConfig;
pub use engine::{
    ChannelListener, Collision, GameEngine, GameEvent, GameListener, GameOutcome, GameState,
    GameStatus, StepOutcome,
};
pub use error::{Result, SnakeError};
pub use snake::{Coordinates, Direction, Snake};
pub use storage::{FileStore, HighScoreStore, MemoryStore};

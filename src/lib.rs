//! Terminal snake: a grid game advanced on a fixed tick while a second
//! thread feeds it keyboard input.
//!
//! [`GameLoop::run`] is the entry point. It drives a [`GameState`] through an
//! [`InputBridge`] and draws through any [`Display`].

pub mod cancel;
pub mod config;
pub mod display;
pub mod error;
pub mod game;
pub mod input;
pub mod snake;
pub mod term;

pub use cancel::CancelToken;
pub use config::LoopConfig;
pub use display::{Display, Event, MemoryDisplay, Style};
pub use error::{DisplayError, LoopError};
pub use game::{GameLoop, LoopStatus, Session};
pub use input::InputBridge;
pub use snake::{Crash, Direction, GameState, Position};
pub use term::CrosstermDisplay;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("display unavailable: {0}")]
    Unavailable(String),
}

/// The only way the game loop fails: the display never came up.
#[derive(Debug, Error)]
pub enum LoopError {
    #[error("problem creating screen")]
    Init(#[source] DisplayError),
}

use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tick_snake::{CancelToken, CrosstermDisplay, Display, GameLoop, LoopConfig};

fn main() -> Result<()> {
    init_tracing();

    let config = LoopConfig::from_env();
    tracing::debug!(?config, "Loaded config");

    let cancel = CancelToken::new();
    let game = GameLoop::new(config, StdRng::from_entropy());

    // The terminal is already restored by the time an error comes back.
    if let Err(err) = game.run(CrosstermDisplay::init, &cancel) {
        let err = anyhow::Error::from(err);
        tracing::error!("Game loop failed: {err:#}");
        return Err(err);
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let path = log_file_path();
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            tracing::info!(path = %path.display(), "Logging initialized");
        }
        // Writing to stderr would scribble over the game screen.
        Err(_) => tracing_subscriber::registry().with(env_filter).init(),
    }
}

fn log_file_path() -> PathBuf {
    env::var_os("SNAKE_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("snake.log"))
}

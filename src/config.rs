use std::env;
use std::time::Duration;

use tracing::warn;

const DEFAULT_TICK: Duration = Duration::from_millis(100);
const DEFAULT_INPUT_POLL: Duration = Duration::from_millis(25); // cancellation responsiveness

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopConfig {
    /// Period of the tick path.
    pub tick_interval: Duration,
    /// Longest single wait on the display for input before re-checking for
    /// cancellation.
    pub input_poll_interval: Duration,
    /// Keep moving in the last direction on ticks without new input.
    pub repeat_last_direction: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig {
            tick_interval: DEFAULT_TICK,
            input_poll_interval: DEFAULT_INPUT_POLL,
            repeat_last_direction: false,
        }
    }
}

impl LoopConfig {
    /// Reads `SNAKE_TICK_MS` and `SNAKE_REPEAT` from the environment.
    pub fn from_env() -> Self {
        LoopConfig::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = LoopConfig::default();

        if let Some(raw) = lookup("SNAKE_TICK_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.tick_interval = Duration::from_millis(ms),
                _ => warn!("Ignoring invalid SNAKE_TICK_MS: {raw}"),
            }
        }

        if let Some(raw) = lookup("SNAKE_REPEAT") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.repeat_last_direction = true,
                "0" | "false" | "no" | "off" => config.repeat_last_direction = false,
                _ => warn!("Ignoring invalid SNAKE_REPEAT: {raw}"),
            }
        }

        config
    }
}

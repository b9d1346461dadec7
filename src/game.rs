use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::cancel::CancelToken;
use crate::config::LoopConfig;
use crate::display::{Display, Event, Style};
use crate::error::{DisplayError, LoopError};
use crate::input::InputBridge;
use crate::snake::{Direction, GameState, Position};

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const GAME_OVER_TEXT: &str = "game over";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopStatus {
    Running,
    Ended,
}

/// Why the input path gave up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Shutdown {
    Quit,
    Cancelled,
    InputFailed,
}

/// State owned by the tick path: the board, whether it may still move, and
/// the randomness used to place food.
pub struct Session<R> {
    state: GameState,
    status: LoopStatus,
    rng: R,
    repeat_last: bool,
    last_direction: Option<Direction>,
}

impl<R: Rng> Session<R> {
    pub fn new(state: GameState, rng: R, repeat_last: bool) -> Self {
        Session { state, status: LoopStatus::Running, rng, repeat_last, last_direction: None }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> LoopStatus {
        self.status
    }

    /// One period of the tick path: advance (at most once) and redraw.
    pub fn tick<D: Display + ?Sized>(&mut self, display: &D, input: &InputBridge) {
        display.clear();

        if self.status == LoopStatus::Running {
            let fallback = if self.repeat_last { self.last_direction } else { None };
            if let Some(direction) = input.consume_latest().or(fallback) {
                self.last_direction = Some(direction);
                let (width, height) = display.size();
                if !self.state.transition(direction, width.into(), height.into(), &mut self.rng) {
                    debug!(length = self.state.snake().len(), "Game over");
                    self.status = LoopStatus::Ended;
                }
            }
        }

        self.render(display);
    }

    pub fn redraw<D: Display + ?Sized>(&self, display: &D) {
        display.clear();
        self.render(display);
    }

    /// Draws the current board, or the end screen, and flushes it.
    pub fn render<D: Display + ?Sized>(&self, display: &D) {
        match self.status {
            LoopStatus::Running => {
                // Food goes down first so it never hides a snake segment.
                for pos in self.state.food() {
                    put(display, *pos, FOOD_CHAR, Style::Food);
                }
                for pos in self.state.snake() {
                    put(display, *pos, SNAKE_BODY_CHAR, Style::Snake);
                }
            }
            LoopStatus::Ended => {
                display.draw_text(0, 0, GAME_OVER_TEXT.len() as u16, 0, Style::Banner, GAME_OVER_TEXT);
            }
        }

        if let Err(err) = display.show() {
            warn!(%err, "Failed to flush frame");
        }
    }
}

fn put<D: Display + ?Sized>(display: &D, pos: Position, glyph: char, style: Style) {
    if let (Ok(x), Ok(y)) = (u16::try_from(pos.x), u16::try_from(pos.y)) {
        display.set_cell(x, y, glyph, style);
    }
}

/// Ties a ticking [`Session`] to a live display and an input thread.
pub struct GameLoop<R> {
    config: LoopConfig,
    session: Session<R>,
}

impl<R: Rng + Send> GameLoop<R> {
    pub fn new(config: LoopConfig, rng: R) -> Self {
        let session = Session::new(GameState::new(), rng, config.repeat_last_direction);
        GameLoop { config, session }
    }

    /// Runs until the quit key, an input failure, or `cancel`. Only a failed
    /// `init` is reported as an error; a finished game keeps showing its end
    /// screen until one of those happens.
    pub fn run<D, F>(self, init: F, cancel: &CancelToken) -> Result<(), LoopError>
    where
        D: Display,
        F: FnOnce() -> Result<D, DisplayError>,
    {
        let display = init().map_err(LoopError::Init)?;
        let _finish = FinishOnDrop(&display);

        let GameLoop { config, mut session } = self;
        let cancel = cancel.child();
        let input = InputBridge::new();

        info!("Starting loop");
        thread::scope(|scope| {
            scope.spawn(|| {
                let _stop = CancelOnDrop(&cancel);
                tick_path(&mut session, &display, &input, &cancel, config.tick_interval);
            });

            let reason = input_path(&display, &input, &cancel, config.input_poll_interval);
            debug!(?reason, "Input path stopped");
            cancel.cancel();
        });

        info!(length = session.state().snake().len(), status = ?session.status(), "Loop finished");
        Ok(())
    }
}

fn tick_path<R: Rng, D: Display>(
    session: &mut Session<R>,
    display: &D,
    input: &InputBridge,
    cancel: &CancelToken,
    interval: Duration,
) {
    session.redraw(display);

    let mut next = Instant::now() + interval;
    loop {
        if cancel.wait_timeout(next.saturating_duration_since(Instant::now())) {
            return;
        }

        // A late wake-up skips the missed periods instead of bursting.
        next += interval;
        let now = Instant::now();
        if next <= now {
            next = now + interval;
        }

        session.tick(display, input);
    }
}

fn input_path<D: Display>(display: &D, input: &InputBridge, cancel: &CancelToken, poll: Duration) -> Shutdown {
    loop {
        if cancel.is_cancelled() {
            return Shutdown::Cancelled;
        }

        match display.poll_event(poll) {
            Ok(Some(Event::Direction(direction))) => {
                debug!(?direction, "Key");
                input.publish(direction);
            }
            Ok(Some(Event::Quit)) => return Shutdown::Quit,
            Ok(Some(Event::Resize(width, height))) => debug!(width, height, "Resized"),
            Ok(Some(Event::Other) | None) => {}
            Err(err) => {
                error!(%err, "Polling input failed");
                return Shutdown::InputFailed;
            }
        }
    }
}

struct FinishOnDrop<'a, D: Display>(&'a D);

impl<D: Display> Drop for FinishOnDrop<'_, D> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

struct CancelOnDrop<'a>(&'a CancelToken);

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

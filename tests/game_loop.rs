use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use tick_snake::{CancelToken, Direction, DisplayError, Event, GameLoop, LoopConfig, LoopError, MemoryDisplay};

fn fast_config() -> LoopConfig {
    LoopConfig {
        tick_interval: Duration::from_millis(10),
        input_poll_interval: Duration::from_millis(2),
        ..LoopConfig::default()
    }
}

fn game(config: LoopConfig) -> GameLoop<StdRng> {
    GameLoop::new(config, StdRng::seed_from_u64(42))
}

fn cancel_after(token: &CancelToken, delay: Duration) -> thread::JoinHandle<()> {
    let token = token.clone();
    thread::spawn(move || {
        thread::sleep(delay);
        token.cancel();
    })
}

fn count(frame: &[String], glyph: char) -> usize {
    frame.iter().map(|row| row.chars().filter(|&ch| ch == glyph).count()).sum()
}

#[test]
fn quit_key_ends_the_loop_and_releases_the_display() {
    let display = Arc::new(MemoryDisplay::new(10, 10).with_events([Event::Quit]));
    let cancel = CancelToken::new();

    let result = game(fast_config()).run(|| Ok(Arc::clone(&display)), &cancel);

    assert!(result.is_ok());
    assert_eq!(display.finish_count(), 1);
    assert!(!display.frames().is_empty());
    assert!(!cancel.is_cancelled(), "quitting must not cancel the caller's token");
}

#[test]
fn cancellation_stops_both_paths() {
    let display = Arc::new(MemoryDisplay::new(10, 10));
    let cancel = CancelToken::new();
    let canceller = cancel_after(&cancel, Duration::from_millis(60));

    let start = Instant::now();
    let result = game(fast_config()).run(|| Ok(Arc::clone(&display)), &cancel);
    canceller.join().unwrap();

    assert!(result.is_ok());
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(display.finish_count(), 1);

    // Ticks kept redrawing the untouched start position.
    let frames = display.frames();
    assert!(frames.len() > 1);
    let last = frames.last().unwrap();
    assert!(last[0].starts_with('█'));
    assert_eq!(count(last, '█'), 1);
}

#[test]
fn already_cancelled_token_returns_promptly() {
    let display = Arc::new(MemoryDisplay::new(10, 10));
    let cancel = CancelToken::new();
    cancel.cancel();

    let start = Instant::now();
    assert!(game(LoopConfig::default()).run(|| Ok(Arc::clone(&display)), &cancel).is_ok());
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(display.finish_count(), 1);
}

#[test]
fn one_key_press_moves_and_feeds_once() {
    let display = Arc::new(MemoryDisplay::new(10, 10).with_events([Event::Direction(Direction::Down)]));
    let cancel = CancelToken::new();
    let canceller = cancel_after(&cancel, Duration::from_millis(150));

    game(fast_config()).run(|| Ok(Arc::clone(&display)), &cancel).unwrap();
    canceller.join().unwrap();

    let last = display.last_frame().unwrap();
    assert!(last[0].starts_with('█'));
    assert!(last[1].starts_with('█'));
    assert_eq!(count(&last, '█'), 2);
    assert!(count(&last, 'O') <= 1);
}

#[test]
fn held_direction_keeps_moving_when_repeat_is_on() {
    let display = Arc::new(MemoryDisplay::new(40, 3).with_events([Event::Direction(Direction::Right)]));
    let cancel = CancelToken::new();
    let canceller = cancel_after(&cancel, Duration::from_millis(150));
    let config = LoopConfig { repeat_last_direction: true, ..fast_config() };

    game(config).run(|| Ok(Arc::clone(&display)), &cancel).unwrap();
    canceller.join().unwrap();

    // The snake left the origin cell behind.
    let last = display.last_frame().unwrap();
    assert!(!last[0].starts_with('█'));
}

#[test]
fn leaving_the_board_shows_game_over_until_shutdown() {
    let display = Arc::new(MemoryDisplay::new(12, 4).with_events([Event::Direction(Direction::Up)]));
    let cancel = CancelToken::new();
    let canceller = cancel_after(&cancel, Duration::from_millis(120));

    game(fast_config()).run(|| Ok(Arc::clone(&display)), &cancel).unwrap();
    canceller.join().unwrap();

    let frames = display.frames();
    let first_over = frames.iter().position(|frame| frame[0].starts_with("game over"));
    let first_over = first_over.expect("an end screen was drawn");
    for frame in &frames[first_over..] {
        assert_eq!(frame[0], "game over   ");
        assert_eq!(count(frame, '█'), 0);
    }
}

#[test]
fn display_failure_is_the_only_error() {
    let cancel = CancelToken::new();
    let result = game(fast_config()).run(
        || Err::<Arc<MemoryDisplay>, _>(DisplayError::Unavailable("no terminal".to_string())),
        &cancel,
    );

    match result {
        Err(LoopError::Init(DisplayError::Unavailable(msg))) => assert_eq!(msg, "no terminal"),
        other => panic!("unexpected result: {other:?}"),
    }
}

use std::io::{stdout, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, terminal};
use tracing::debug;

use crate::display::{lock, Display, Event, Frame, Style};
use crate::error::DisplayError;
use crate::snake::Direction;

/// [`Display`] backed by the process terminal.
pub struct CrosstermDisplay {
    stdout: Mutex<Stdout>,
    screen: Mutex<Frame>,
    finished: AtomicBool,
}

impl CrosstermDisplay {
    fn setup(&self) -> Result<(), DisplayError> {
        let mut stdout = lock(&self.stdout);
        let out = &mut *stdout;
        execute!(out, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(out, cursor::Hide, cursor::DisableBlinking, terminal::Clear(ClearType::All))?;
        Ok(())
    }

    fn restore(&self) -> Result<(), DisplayError> {
        let mut stdout = lock(&self.stdout);
        let out = &mut *stdout;
        terminal::disable_raw_mode()?;
        execute!(out, ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)?;
        Ok(())
    }
}

impl Display for CrosstermDisplay {
    fn init() -> Result<Self, DisplayError> {
        let (width, height) = terminal::size()?;
        let display = CrosstermDisplay {
            stdout: Mutex::new(stdout()),
            screen: Mutex::new(Frame::new(width, height)),
            finished: AtomicBool::new(false),
        };

        if let Err(err) = display.setup() {
            // Leave the terminal usable even when setup only got halfway.
            display.finish();
            return Err(err);
        }

        debug!(width, height, "Terminal ready");
        Ok(display)
    }

    fn size(&self) -> (u16, u16) {
        lock(&self.screen).size()
    }

    fn clear(&self) {
        lock(&self.screen).clear();
    }

    fn set_cell(&self, x: u16, y: u16, glyph: char, style: Style) {
        lock(&self.screen).set(x, y, glyph, style);
    }

    fn show(&self) -> Result<(), DisplayError> {
        let screen = lock(&self.screen);
        let mut stdout = lock(&self.stdout);
        let out = &mut *stdout;

        let mut current = None;
        for (y, row) in screen.rows().enumerate() {
            queue!(out, cursor::MoveTo(0, y as u16))?;
            for &(ch, style) in row {
                if current != Some(style) {
                    match color(style) {
                        Some(fg) => queue!(out, SetForegroundColor(fg))?,
                        None => queue!(out, ResetColor)?,
                    }
                    current = Some(style);
                }
                queue!(out, Print(ch))?;
            }
        }

        out.flush()?;
        Ok(())
    }

    fn poll_event(&self, timeout: Duration) -> Result<Option<Event>, DisplayError> {
        if !event::poll(timeout)? {
            return Ok(None);
        }

        let ev = match event::read()? {
            event::Event::Key(key) => translate_key(&key),
            event::Event::Resize(width, height) => {
                lock(&self.screen).resize(width, height);
                Event::Resize(width, height)
            }
            _ => Event::Other,
        };
        Ok(Some(ev))
    }

    fn finish(&self) {
        if self.finished.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Err(err) = self.restore() {
            debug!(%err, "Terminal restore failed");
        }
    }
}

impl Drop for CrosstermDisplay {
    fn drop(&mut self) {
        self.finish();
    }
}

fn color(style: Style) -> Option<Color> {
    match style {
        Style::Plain => None,
        Style::Snake => Some(Color::Green),
        Style::Food => Some(Color::Red),
        Style::Banner => Some(Color::Yellow),
    }
}

fn translate_key(key: &KeyEvent) -> Event {
    if key.kind == KeyEventKind::Release {
        return Event::Other;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Event::Quit,
        KeyCode::Char('w') | KeyCode::Up => Event::Direction(Direction::Up),
        KeyCode::Char('a') | KeyCode::Left => Event::Direction(Direction::Left),
        KeyCode::Char('s') | KeyCode::Down => Event::Direction(Direction::Down),
        KeyCode::Char('d') | KeyCode::Right => Event::Direction(Direction::Right),
        _ => Event::Other,
    }
}

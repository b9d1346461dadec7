//! The drawing and input surface the game runs against.
//!
//! [`Display`] is the only thing the loop knows about the terminal. The real
//! implementation lives in [`crate::term`]; [`MemoryDisplay`] keeps everything
//! in memory so the loop can run headless.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use crate::error::DisplayError;
use crate::snake::Direction;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Plain,
    Snake,
    Food,
    Banner,
}

/// Input events the game cares about. Everything else arrives as `Other`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Direction(Direction),
    Quit,
    Resize(u16, u16),
    Other,
}

/// Drawing happens from the tick path while polling happens from the input
/// path, so every operation takes `&self`.
pub trait Display: Send + Sync {
    fn init() -> Result<Self, DisplayError>
    where
        Self: Sized;

    /// Current (width, height) in cells.
    fn size(&self) -> (u16, u16);

    fn clear(&self);

    /// Cells outside the current size are ignored.
    fn set_cell(&self, x: u16, y: u16, glyph: char, style: Style);

    /// Writes `text` left to right starting at (x1, y1), wrapping back to x1
    /// when the column reaches x2 and stopping once past row y2.
    fn draw_text(&self, x1: u16, y1: u16, x2: u16, y2: u16, style: Style, text: &str) {
        let (mut col, mut row) = (x1, y1);
        for ch in text.chars() {
            self.set_cell(col, row, ch, style);
            col = col.saturating_add(1);
            if col >= x2 {
                row = row.saturating_add(1);
                col = x1;
            }
            if row > y2 {
                break;
            }
        }
    }

    /// Pushes the current buffer to the screen.
    fn show(&self) -> Result<(), DisplayError>;

    /// Waits up to `timeout` for the next input event.
    fn poll_event(&self, timeout: Duration) -> Result<Option<Event>, DisplayError>;

    /// Restores whatever `init` changed. Safe to call more than once.
    fn finish(&self);
}

/// Character grid shared by the display implementations.
#[derive(Clone, Debug)]
pub(crate) struct Frame {
    width: u16,
    height: u16,
    cells: Vec<(char, Style)>,
}

impl Frame {
    pub(crate) fn new(width: u16, height: u16) -> Self {
        Frame { width, height, cells: vec![(' ', Style::Plain); width as usize * height as usize] }
    }

    pub(crate) fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill((' ', Style::Plain));
    }

    pub(crate) fn resize(&mut self, width: u16, height: u16) {
        *self = Frame::new(width, height);
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, glyph: char, style: Style) {
        if x < self.width && y < self.height {
            self.cells[self.width as usize * y as usize + x as usize] = (glyph, style);
        }
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = &[(char, Style)]> {
        // `max(1)` keeps `chunks` happy on a zero-width terminal.
        self.cells.chunks(self.width.max(1) as usize)
    }

    pub(crate) fn text_rows(&self) -> Vec<String> {
        self.rows().map(|row| row.iter().map(|(ch, _)| ch).collect()).collect()
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Headless [`Display`]: events come from a script, shown frames are kept.
#[derive(Debug)]
pub struct MemoryDisplay {
    frame: Mutex<Frame>,
    events: Mutex<VecDeque<Event>>,
    shown: Mutex<Vec<Vec<String>>>,
    finished: AtomicUsize,
}

impl MemoryDisplay {
    pub fn new(width: u16, height: u16) -> Self {
        MemoryDisplay {
            frame: Mutex::new(Frame::new(width, height)),
            events: Mutex::new(VecDeque::new()),
            shown: Mutex::new(vec![]),
            finished: AtomicUsize::new(0),
        }
    }

    pub fn with_events(self, events: impl IntoIterator<Item = Event>) -> Self {
        lock(&self.events).extend(events);
        self
    }

    /// Every frame passed to `show`, oldest first, one string per row.
    pub fn frames(&self) -> Vec<Vec<String>> {
        lock(&self.shown).clone()
    }

    pub fn last_frame(&self) -> Option<Vec<String>> {
        lock(&self.shown).last().cloned()
    }

    pub fn finish_count(&self) -> usize {
        self.finished.load(Ordering::Acquire)
    }
}

impl Display for MemoryDisplay {
    fn init() -> Result<Self, DisplayError> {
        Ok(MemoryDisplay::new(80, 24))
    }

    fn size(&self) -> (u16, u16) {
        lock(&self.frame).size()
    }

    fn clear(&self) {
        lock(&self.frame).clear();
    }

    fn set_cell(&self, x: u16, y: u16, glyph: char, style: Style) {
        lock(&self.frame).set(x, y, glyph, style);
    }

    fn show(&self) -> Result<(), DisplayError> {
        let rows = lock(&self.frame).text_rows();
        lock(&self.shown).push(rows);
        Ok(())
    }

    fn poll_event(&self, timeout: Duration) -> Result<Option<Event>, DisplayError> {
        let next = lock(&self.events).pop_front();
        match next {
            Some(Event::Resize(width, height)) => {
                lock(&self.frame).resize(width, height);
                Ok(Some(Event::Resize(width, height)))
            }
            Some(event) => Ok(Some(event)),
            None => {
                thread::sleep(timeout);
                Ok(None)
            }
        }
    }

    fn finish(&self) {
        self.finished.fetch_add(1, Ordering::AcqRel);
    }
}

/// Lets a caller keep a handle on a display the loop owns.
impl<T: Display> Display for Arc<T> {
    fn init() -> Result<Self, DisplayError> {
        T::init().map(Arc::new)
    }

    fn size(&self) -> (u16, u16) {
        (**self).size()
    }

    fn clear(&self) {
        (**self).clear();
    }

    fn set_cell(&self, x: u16, y: u16, glyph: char, style: Style) {
        (**self).set_cell(x, y, glyph, style);
    }

    fn draw_text(&self, x1: u16, y1: u16, x2: u16, y2: u16, style: Style, text: &str) {
        (**self).draw_text(x1, y1, x2, y2, style, text);
    }

    fn show(&self) -> Result<(), DisplayError> {
        (**self).show()
    }

    fn poll_event(&self, timeout: Duration) -> Result<Option<Event>, DisplayError> {
        (**self).poll_event(timeout)
    }

    fn finish(&self) {
        (**self).finish();
    }
}

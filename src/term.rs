use crate::{Coords, TermInt};
use std::io::{self, stdout, Stdout, Write};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TermError {
    #[error("Error reading terminal size: {0}")]
    Size(#[source] io::Error),

    #[error("Error setting up terminal: {0}")]
    Setup(#[source] io::Error),

    #[error("Error restoring terminal: {0}")]
    Restore(#[source] io::Error),

    #[error("Error drawing to terminal: {0}")]
    Draw(#[source] io::Error),

    #[error("Error reading terminal events: {0}")]
    Input(#[source] io::Error),
}

/// Something the renderer can paint cells onto.
pub trait Surface {
    fn size(&self) -> Coords;

    /// Blanks every pending cell.
    fn clear(&mut self);

    /// Marks a cell for drawing. Positions outside the grid are ignored.
    fn set_cell(&mut self, pos: Coords, ch: char);

    /// Pushes the pending cells to the screen.
    fn show(&mut self) -> Result<(), TermError>;

    /// Re-reads the size and repaints everything from scratch.
    fn sync(&mut self) -> Result<(), TermError>;
}

/// Double-buffered crossterm surface: `show` only writes the cells that
/// changed since the previous frame.
pub struct TermManager<W: Write = Stdout> {
    width: TermInt,
    height: TermInt,
    out: W,
    screen: Vec<char>,
    shown: Vec<char>,
}

impl TermManager {
    pub fn new() -> Result<Self, TermError> {
        let (width, height) = terminal::size().map_err(TermError::Size)?;
        Ok(TermManager::with_writer(width, height, stdout()))
    }
}

impl<W: Write> TermManager<W> {
    pub fn with_writer(width: TermInt, height: TermInt, out: W) -> Self {
        let len = width as usize * height as usize;
        TermManager {
            width,
            height,
            out,
            screen: vec![' '; len],
            shown: vec!['\0'; len],
        }
    }

    fn index(&self, (x, y): Coords) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.width as usize * y as usize + x as usize)
    }

    fn resize(&mut self, (width, height): Coords) {
        self.width = width;
        self.height = height;
        let len = width as usize * height as usize;
        self.screen = vec![' '; len];
        self.shown = vec!['\0'; len];
    }

    /// Forgets what is on screen and repaints everything at `size`.
    fn sync_to(&mut self, size: Coords) -> Result<(), TermError> {
        if size != self.size() {
            tracing::debug!("terminal resized to {}x{}", size.0, size.1);
            self.resize(size);
        } else {
            self.shown.fill('\0');
        }

        execute!(self.out, terminal::Clear(ClearType::All)).map_err(TermError::Draw)?;
        self.show()
    }
}

impl<W: Write> Surface for TermManager<W> {
    fn size(&self) -> Coords {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.screen.fill(' ');
    }

    fn set_cell(&mut self, pos: Coords, ch: char) {
        if let Some(i) = self.index(pos) {
            self.screen[i] = ch;
        }
    }

    fn show(&mut self) -> Result<(), TermError> {
        let width = self.width.max(1) as usize;

        for (i, (&ch, shown)) in self.screen.iter().zip(self.shown.iter_mut()).enumerate() {
            if ch == *shown {
                continue;
            }
            let (x, y) = ((i % width) as TermInt, (i / width) as TermInt);
            queue!(self.out, cursor::MoveTo(x, y), style::Print(ch)).map_err(TermError::Draw)?;
            *shown = ch;
        }

        self.out.flush().map_err(TermError::Draw)
    }

    fn sync(&mut self) -> Result<(), TermError> {
        let size = terminal::size().map_err(TermError::Size)?;
        self.sync_to(size)
    }
}

/// Holds the terminal in game mode. Leaving it restores the terminal exactly
/// once, whichever way the program exits.
pub struct TermGuard {
    stdout: Stdout,
}

impl TermGuard {
    pub fn enter() -> Result<Self, TermError> {
        let mut guard = TermGuard { stdout: stdout() };
        guard.setup()?;
        Ok(guard)
    }

    fn setup(&mut self) -> Result<(), TermError> {
        execute!(self.stdout, EnterAlternateScreen).map_err(TermError::Setup)?;
        terminal::enable_raw_mode().map_err(TermError::Setup)?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking).map_err(TermError::Setup)
    }

    fn restore(&mut self) -> Result<(), TermError> {
        terminal::disable_raw_mode().map_err(TermError::Restore)?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
            .map_err(TermError::Restore)
    }
}

impl Drop for TermGuard {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            tracing::error!("{}", e);
        }
    }
}

/// In-memory surface for tests.
#[cfg(test)]
pub struct GridSurface {
    width: TermInt,
    height: TermInt,
    pending: Vec<char>,
    pub shown: Vec<char>,
    pub shows: usize,
    pub syncs: usize,
}

#[cfg(test)]
impl GridSurface {
    pub fn new(width: TermInt, height: TermInt) -> Self {
        let len = width as usize * height as usize;
        GridSurface {
            width,
            height,
            pending: vec![' '; len],
            shown: vec![' '; len],
            shows: 0,
            syncs: 0,
        }
    }

    pub fn cell(&self, (x, y): Coords) -> char {
        self.shown[self.width as usize * y as usize + x as usize]
    }

    pub fn count(&self, ch: char) -> usize {
        self.shown.iter().filter(|&&c| c == ch).count()
    }
}

#[cfg(test)]
impl Surface for GridSurface {
    fn size(&self) -> Coords {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.pending.fill(' ');
    }

    fn set_cell(&mut self, (x, y): Coords, ch: char) {
        if x < self.width && y < self.height {
            self.pending[self.width as usize * y as usize + x as usize] = ch;
        }
    }

    fn show(&mut self) -> Result<(), TermError> {
        self.shown.copy_from_slice(&self.pending);
        self.shows += 1;
        Ok(())
    }

    fn sync(&mut self) -> Result<(), TermError> {
        self.syncs += 1;
        self.show()
    }
}

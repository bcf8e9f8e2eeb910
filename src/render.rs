use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::game::{Frame, SharedFrame};
use crate::signal::QuitSignal;
use crate::term::{Surface, TermError};

const SNAKE_BODY_CHAR: char = '█';
const FRUIT_CHAR: char = 'O';

/// Paints one frame: body from tail to head, then the head on top of it, then
/// the fruit.
pub fn draw_frame<S: Surface>(surface: &mut S, frame: &Frame) -> Result<(), TermError> {
    surface.clear();

    for pos in frame.snake.segments() {
        surface.set_cell(pos, SNAKE_BODY_CHAR);
    }
    surface.set_cell(frame.snake.head(), frame.snake.head_char());
    surface.set_cell(frame.fruit, FRUIT_CHAR);

    surface.show()
}

/// Repaints the latest frame every `interval` until quit, resyncing the
/// surface whenever the input thread asks for it.
pub fn run_renderer<S: Surface>(
    surface: &mut S,
    frames: &SharedFrame,
    resync: &Receiver<()>,
    quit: &QuitSignal,
    interval: Duration,
) -> Result<(), TermError> {
    let _guard = quit.trigger_on_drop();
    tracing::info!(?interval, "renderer started");

    loop {
        if resync.try_recv().is_ok() {
            // Collapse a burst of resize events into one repaint
            while resync.try_recv().is_ok() {}
            tracing::debug!("resyncing terminal");
            surface.sync()?;
        }

        draw_frame(surface, &frames.latest())?;

        if quit.wait_timeout(interval) {
            break;
        }
    }

    tracing::info!("renderer stopped");
    Ok(())
}

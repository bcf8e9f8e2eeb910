use std::io;
use std::sync::mpsc::Sender;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::signal::QuitSignal;
use crate::snake::Direction::{self, *};
use crate::term::TermError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Resync,
    Turn(Direction),
}

pub fn map_event(ev: &Event) -> Option<Action> {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key),
        Event::Resize(_, _) => Some(Action::Resync),
        _ => None,
    }
}

fn map_key(key: &KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc | KeyCode::Enter => Some(Action::Quit),
        // Raw mode swallows SIGINT
        KeyCode::Char('c') if ctrl => Some(Action::Quit),
        KeyCode::Char('l') if ctrl => Some(Action::Resync),
        KeyCode::Up => Some(Action::Turn(Up)),
        KeyCode::Down => Some(Action::Turn(Down)),
        KeyCode::Left => Some(Action::Turn(Left)),
        KeyCode::Right => Some(Action::Turn(Right)),
        _ => None,
    }
}

/// Blocks on `next_event` forever, forwarding turns to the simulation and
/// resync requests to the renderer. Quitting only raises the signal; the loop
/// itself keeps going until the process exits or a peer thread is gone.
pub fn run_input<F>(
    mut next_event: F,
    turns: Sender<Direction>,
    resync: Sender<()>,
    quit: QuitSignal,
) -> Result<(), TermError>
where
    F: FnMut() -> io::Result<Event>,
{
    tracing::info!("input handler started");

    loop {
        let ev = next_event().map_err(TermError::Input)?;

        let sent = match map_event(&ev) {
            Some(Action::Quit) => {
                quit.trigger();
                Ok(())
            }
            Some(Action::Resync) => resync.send(()).map_err(drop),
            Some(Action::Turn(dir)) => turns.send(dir).map_err(drop),
            None => Ok(()),
        };

        if sent.is_err() {
            tracing::info!("input handler stopped");
            return Ok(());
        }
    }
}

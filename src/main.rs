mod config;
mod game;
mod input;
mod render;
mod signal;
mod snake;
mod term;

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;

use anyhow::{anyhow, Context, Result};
use crossterm::{event, terminal};
use tracing_subscriber::EnvFilter;

use crate::config::GameConfig;
use crate::game::{Game, SharedFrame};
use crate::signal::QuitSignal;
use crate::term::{Surface, TermGuard, TermManager};

pub type TermInt = u16;
pub type Coords = (u16, u16);

/// The screen belongs to the game, so logs go to `~/.snake/snake.log`.
/// Verbosity comes from `SNAKE_LOG` (default `info`).
fn init_logging() {
    let log_path = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".snake").join("snake.log"))
        .unwrap_or_else(|| PathBuf::from("snake.log"));

    if let Some(parent) = log_path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("SNAKE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> Result<()> {
    init_logging();
    tracing::info!("snake {} starting", env!("CARGO_PKG_VERSION"));

    let result = run(GameConfig::default());
    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

fn run(config: GameConfig) -> Result<()> {
    let mut surface = TermManager::new().context("failed to create terminal surface")?;
    let guard = TermGuard::enter().context("failed to initialize terminal")?;

    let bounds = surface.size();
    tracing::info!(?config, "terminal size: {}x{}", bounds.0, bounds.1);

    let game = Game::new(bounds, &config, &mut rand::thread_rng());
    let frames = SharedFrame::new(game.frame());
    let quit = QuitSignal::new();
    let (turn_tx, turn_rx) = mpsc::channel();
    let (resync_tx, resync_rx) = mpsc::channel();

    // Blocked reading events until the process exits, so it is never joined.
    {
        let quit = quit.clone();
        thread::Builder::new()
            .name("input".into())
            .spawn(move || {
                let res = input::run_input(event::read, turn_tx, resync_tx, quit.clone());
                if let Err(e) = res {
                    tracing::error!("{}", e);
                    quit.trigger();
                }
            })
            .context("failed to spawn input thread")?;
    }

    let simulation = {
        let (frames, quit) = (frames.clone(), quit.clone());
        let tick = config.tick_interval();
        thread::Builder::new()
            .name("simulation".into())
            .spawn(move || {
                game::run_simulation(game, turn_rx, frames, quit, tick, terminal::size)
            })
            .context("failed to spawn simulation thread")?
    };

    let renderer = {
        let quit = quit.clone();
        let interval = config.frame_interval;
        thread::Builder::new()
            .name("render".into())
            .spawn(move || render::run_renderer(&mut surface, &frames, &resync_rx, &quit, interval))
            .context("failed to spawn render thread")?
    };

    quit.wait();

    simulation.join().map_err(|_| anyhow!("simulation thread panicked"))?;
    renderer
        .join()
        .map_err(|_| anyhow!("render thread panicked"))?
        .context("rendering failed")?;

    drop(guard);
    tracing::info!("bye");
    Ok(())
}

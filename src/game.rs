use std::io;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::Coords;
use crate::config::GameConfig;
use crate::signal::QuitSignal;
use crate::snake::{Direction::{self, *}, Snake};

use rand::Rng;

/// Simulation state. Owned by the simulation thread alone; everybody else
/// sees it through published [`Frame`]s.
pub struct Game {
    snake: Snake,
    fruit: Coords,
    bounds: Coords,
}

/// Everything the renderer needs for one picture, taken after a whole tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub snake: Snake,
    pub fruit: Coords,
}

impl Game {
    /// Centers the snake heading right and drops the fruit somewhere on the
    /// `bounds`-sized grid.
    pub fn new<R: Rng>(bounds: Coords, config: &GameConfig, rng: &mut R) -> Self {
        let center = (bounds.0 / 2, bounds.1 / 2);
        let snake =
            Snake::new(center, config.initial_len, config.snake_max_len, Right, bounds);
        let fruit = spawn_fruit(bounds, rng);

        tracing::info!(?center, ?fruit, "new game on a {}x{} grid", bounds.0, bounds.1);
        Game {
            snake,
            fruit,
            bounds,
        }
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn fruit(&self) -> Coords {
        self.fruit
    }

    /// Grid size used by the most recent tick.
    pub fn bounds(&self) -> Coords {
        self.bounds
    }

    pub fn turn(&mut self, dir: Direction) {
        if dir != self.snake.get_direction() {
            tracing::debug!(?dir, "direction changed");
        }
        self.snake.set_direction(dir);
    }

    pub fn tick(&mut self, bounds: Coords) {
        self.bounds = bounds;
        self.snake.advance(bounds);
    }

    pub fn frame(&self) -> Frame {
        Frame {
            snake: self.snake.clone(),
            fruit: self.fruit,
        }
    }
}

fn spawn_fruit<R: Rng>((width, height): Coords, rng: &mut R) -> Coords {
    (rng.gen_range(0..width.max(1)), rng.gen_range(0..height.max(1)))
}

/// Latest published frame, replaced as a whole once per tick.
#[derive(Clone)]
pub struct SharedFrame {
    inner: Arc<Mutex<Frame>>,
}

impl SharedFrame {
    pub fn new(frame: Frame) -> Self {
        SharedFrame {
            inner: Arc::new(Mutex::new(frame)),
        }
    }

    pub fn publish(&self, frame: Frame) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = frame;
    }

    pub fn latest(&self) -> Frame {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Advances the game once per `tick` until quit. Turns queued by the input
/// thread are applied in order right before each step. When the grid size
/// can't be read the previous one is kept.
pub fn run_simulation<F>(
    mut game: Game,
    turns: Receiver<Direction>,
    frames: SharedFrame,
    quit: QuitSignal,
    tick: Duration,
    size: F,
) where
    F: Fn() -> io::Result<Coords>,
{
    let _guard = quit.trigger_on_drop();
    tracing::info!(?tick, fruit = ?game.fruit(), "simulation started");
    let mut size_failing = false;

    while !quit.wait_timeout(tick) {
        for dir in turns.try_iter() {
            game.turn(dir);
        }

        let bounds = match size() {
            Ok(bounds) => {
                size_failing = false;
                bounds
            }
            Err(e) => {
                if !size_failing {
                    tracing::warn!(bounds = ?game.bounds(), "keeping grid size: {}", e);
                    size_failing = true;
                }
                game.bounds()
            }
        };

        game.tick(bounds);
        frames.publish(game.frame());
        let snake = game.snake();
        tracing::trace!(
            head = ?snake.head(),
            head_index = snake.head_index(),
            tail_index = snake.tail_index(),
            len = snake.len(),
            "tick"
        );
    }

    tracing::info!("simulation stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::sync::mpsc;
    use std::thread;

    fn new_game(bounds: Coords) -> Game {
        Game::new(bounds, &GameConfig::default(), &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn starts_centered_heading_right() {
        let game = new_game((20, 10));
        assert_eq!(game.snake().head(), (10, 5));
        assert_eq!(game.snake().get_direction(), Right);
        assert_eq!(game.snake().len(), 10);
    }

    #[test]
    fn fruit_lands_inside_the_grid() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let game = Game::new((20, 10), &GameConfig::default(), &mut rng);
            let (x, y) = game.fruit();
            assert!(x < 20 && y < 10);
        }
    }

    #[test]
    fn fruit_on_degenerate_grid() {
        let game = new_game((0, 0));
        assert_eq!(game.fruit(), (0, 0));
    }

    #[test]
    fn fruit_is_never_eaten() {
        let mut game = new_game((20, 10));
        let fruit = game.fruit();
        for _ in 0..50 {
            game.tick((20, 10));
        }

        assert_eq!(game.fruit(), fruit);
        assert_eq!(game.snake().len(), 10);
    }

    #[test]
    fn length_holds_over_many_ticks_with_turns() {
        let mut game = new_game((20, 10));
        for (i, dir) in [Up, Left, Down, Right].iter().cycle().take(400).enumerate() {
            if i % 7 == 0 {
                game.turn(*dir);
            }
            game.tick((20, 10));
            assert_eq!(game.snake().len(), 10);
            let (x, y) = game.snake().head();
            assert!(x < 20 && y < 10);
        }
    }

    #[test]
    fn frame_is_a_copy_of_the_state() {
        let mut game = new_game((20, 10));
        let frame = game.frame();
        game.tick((20, 10));

        assert_eq!(frame.snake.head(), (10, 5));
        assert_eq!(game.snake().head(), (11, 5));
    }

    #[test]
    fn simulation_applies_last_queued_turn_and_stops_on_quit() {
        let game = new_game((20, 10));
        let frames = SharedFrame::new(game.frame());
        let quit = QuitSignal::new();
        let (tx, rx) = mpsc::channel();

        tx.send(Down).unwrap();
        tx.send(Left).unwrap();

        let sim = {
            let (frames, quit) = (frames.clone(), quit.clone());
            thread::spawn(move || {
                let size = || Ok((20, 10));
                run_simulation(game, rx, frames, quit, Duration::from_millis(1), size)
            })
        };

        while frames.latest().snake.tail_index() == 0 {
            thread::yield_now();
        }
        quit.trigger();
        sim.join().unwrap();

        let frame = frames.latest();
        assert_eq!(frame.snake.get_direction(), Left);
        assert_eq!(frame.snake.len(), 10);
        assert!(frame.snake.head().0 < 10);
    }

    #[test]
    fn simulation_keeps_ticking_without_an_input_sender() {
        let game = new_game((20, 10));
        let frames = SharedFrame::new(game.frame());
        let quit = QuitSignal::new();
        let (tx, rx) = mpsc::channel::<Direction>();
        drop(tx);

        let sim = {
            let (frames, quit) = (frames.clone(), quit.clone());
            thread::spawn(move || {
                let size = || Ok((20, 10));
                run_simulation(game, rx, frames, quit, Duration::from_millis(1), size)
            })
        };

        while frames.latest().snake.tail_index() < 3 {
            thread::yield_now();
        }
        quit.trigger();
        sim.join().unwrap();

        assert_eq!(frames.latest().snake.get_direction(), Right);
    }

    #[test]
    fn unreadable_size_keeps_previous_bounds() {
        let mut game = new_game((20, 10));
        game.turn(Down);
        let frames = SharedFrame::new(game.frame());
        let quit = QuitSignal::new();
        let (_tx, rx) = mpsc::channel::<Direction>();

        let sim = {
            let (frames, quit) = (frames.clone(), quit.clone());
            thread::spawn(move || {
                let size = || Err(io::Error::new(io::ErrorKind::Other, "no tty"));
                run_simulation(game, rx, frames, quit, Duration::from_millis(1), size)
            })
        };

        while frames.latest().snake.tail_index() < 20 {
            thread::yield_now();
        }
        quit.trigger();
        sim.join().unwrap();

        let (x, y) = frames.latest().snake.head();
        assert_eq!((x, y), (10, 9));
    }

    #[test]
    fn tick_remembers_bounds() {
        let mut game = new_game((20, 10));
        assert_eq!(game.bounds(), (20, 10));
        game.tick((8, 4));
        assert_eq!(game.bounds(), (8, 4));
        assert_eq!(game.snake().head(), (7, 3));
    }
}

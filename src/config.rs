use std::time::Duration;

/// Capacity of the snake's ring buffer. The live length must stay below it.
pub const SNAKE_MAX_LEN: usize = 1000;

/// 1 to 10, 1 = slow, 10 = fast.
pub const GAME_SPEED: u64 = 2;

pub const INITIAL_SNAKE_LEN: usize = 10;

/// Minimum delay between two repaints.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(10);

const _: () = assert!(INITIAL_SNAKE_LEN < SNAKE_MAX_LEN);
const _: () = assert!(GAME_SPEED >= 1 && GAME_SPEED <= 10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub snake_max_len: usize,
    pub initial_len: usize,
    pub speed: u64,
    pub frame_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            snake_max_len: SNAKE_MAX_LEN,
            initial_len: INITIAL_SNAKE_LEN,
            speed: GAME_SPEED,
            frame_interval: FRAME_INTERVAL,
        }
    }
}

impl GameConfig {
    /// Delay between two simulation ticks; higher speeds tick faster.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(100 / self.speed.clamp(1, 10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_speed_ticks_every_50ms() {
        assert_eq!(GameConfig::default().tick_interval(), Duration::from_millis(50));
    }

    #[test]
    fn fastest_speed_ticks_every_10ms() {
        let config = GameConfig {
            speed: 10,
            ..GameConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(10));
    }

    #[test]
    fn out_of_range_speed_is_clamped() {
        let config = GameConfig {
            speed: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
    }
}

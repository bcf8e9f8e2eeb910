use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// One-shot quit flag shared by every thread. Triggering it more than once is
/// harmless.
#[derive(Clone, Default)]
pub struct QuitSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl QuitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        let mut quit = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if !*quit {
            tracing::info!("quit requested");
            *quit = true;
        }
        cvar.notify_all();
    }

    #[cfg(test)]
    pub fn is_set(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until the signal is triggered.
    pub fn wait(&self) {
        let (lock, cvar) = &*self.inner;
        let quit = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _quit = cvar
            .wait_while(quit, |quit| !*quit)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Sleeps for up to `timeout`, waking early on quit. Returns whether the
    /// signal is set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let quit = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (quit, _) = cvar
            .wait_timeout_while(quit, timeout, |quit| !*quit)
            .unwrap_or_else(PoisonError::into_inner);
        *quit
    }

    /// Returns a guard that triggers the signal when dropped, also during a
    /// panic, so a dying worker never leaves the coordinator waiting.
    pub fn trigger_on_drop(&self) -> TriggerOnDrop {
        TriggerOnDrop(self.clone())
    }
}

pub struct TriggerOnDrop(QuitSignal);

impl Drop for TriggerOnDrop {
    fn drop(&mut self) {
        self.0.trigger();
    }
}

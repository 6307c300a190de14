//! Scoped wall-clock timers that report through `log`.

use std::borrow::Cow;
use std::time::{Duration, Instant};

use log::Level;

/// Logs how long the enclosing scope took when dropped.
pub struct ScopedTimer {
    label: Option<Cow<'static, str>>,
    level: Level,
    start: Instant,
}

impl ScopedTimer {
    /// Timer that logs at `level`.
    pub fn with_level(label: impl Into<Cow<'static, str>>, level: Level) -> Self {
        Self {
            label: Some(label.into()),
            level,
            start: Instant::now(),
        }
    }

    /// Timer that logs at `debug`.
    pub fn debug(label: impl Into<Cow<'static, str>>) -> Self {
        Self::with_level(label, Level::Debug)
    }

    /// Debug timer whose label is only built when debug logging is enabled.
    ///
    /// The timer still measures; it just stays silent on drop.
    pub fn debug_lazy<F>(label_gen: F) -> Self
    where
        F: FnOnce() -> String,
    {
        let label = log::log_enabled!(Level::Debug).then(|| Cow::Owned(label_gen()));
        Self {
            label,
            level: Level::Debug,
            start: Instant::now(),
        }
    }

    /// Time since the timer started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        if let Some(label) = &self.label {
            log::log!(self.level, "{} took {} ms", label, self.start.elapsed().as_millis());
        }
    }
}

/// Run `f` and return its result together with the time it took.
pub fn measure<T, F>(label: impl Into<Cow<'static, str>>, level: Level, f: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let timer = ScopedTimer::with_level(label, level);
    let value = f();
    (value, timer.elapsed())
}

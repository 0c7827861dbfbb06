use std::time::{Duration, Instant};

/// Frame timer with whole-millisecond resolution.
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous restart, truncated to whole milliseconds.
    pub fn restart(&mut self) -> f32 {
        self.restart_at(Instant::now())
    }

    pub fn restart_at(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        whole_millis_secs(elapsed)
    }
}

#[inline]
pub fn whole_millis_secs(elapsed: Duration) -> f32 {
    let ms = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);
    ms as f32 / 1000.0
}

/// `FPS: 33.3` style label; zero elapsed time has no meaningful rate.
pub fn fps_label(dt: f32) -> String {
    if dt > 0.0 {
        format!("FPS: {:.1}", 1.0 / dt)
    } else {
        "FPS: --".to_string()
    }
}

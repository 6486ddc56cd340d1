use std::time::Instant;

/// Wall-clock time between frames, from a monotonic source.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous call (or since construction). Never negative.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;
        elapsed
    }

    /// Restart measuring from now, discarding the time spent so far.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

use std::collections::VecDeque;

const DEFAULT_WINDOW: usize = 120;

/// Rolling frame-time statistics for the overlay.
#[derive(Debug, Clone)]
pub struct FrameStats {
    window: usize,
    samples_ms: VecDeque<f32>,
    total_frames: u64,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the most recent `window` frames (at least one).
    pub fn with_window(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            samples_ms: VecDeque::with_capacity(window),
            total_frames: 0,
        }
    }

    /// Record one frame that took `seconds`. Invalid samples are dropped.
    pub fn record(&mut self, seconds: f32) {
        if !seconds.is_finite() || seconds < 0.0 {
            tracing::trace!(seconds, "dropping invalid frame time");
            return;
        }
        if self.samples_ms.len() == self.window {
            self.samples_ms.pop_front();
        }
        self.samples_ms.push_back(seconds * 1000.0);
        self.total_frames += 1;
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn is_empty(&self) -> bool {
        self.samples_ms.is_empty()
    }

    pub fn last_ms(&self) -> Option<f32> {
        self.samples_ms.back().copied()
    }

    pub fn average_ms(&self) -> Option<f32> {
        if self.samples_ms.is_empty() {
            return None;
        }
        Some(self.samples_ms.iter().sum::<f32>() / self.samples_ms.len() as f32)
    }

    pub fn min_ms(&self) -> Option<f32> {
        self.samples_ms.iter().copied().reduce(f32::min)
    }

    pub fn max_ms(&self) -> Option<f32> {
        self.samples_ms.iter().copied().reduce(f32::max)
    }

    /// Frames per second over the window; zero until a non-zero frame is seen.
    pub fn fps(&self) -> f32 {
        match self.average_ms() {
            Some(ms) if ms > 0.0 => 1000.0 / ms,
            _ => 0.0,
        }
    }
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.average_ms(), self.min_ms(), self.max_ms()) {
            (Some(avg), Some(min), Some(max)) => write!(
                f,
                "{:.0} fps  {:.2} ms (min {:.2} / max {:.2})",
                self.fps(),
                avg,
                min,
                max
            ),
            _ => write!(f, "no frames yet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats() {
        let stats = FrameStats::new();
        assert!(stats.is_empty());
        assert_eq!(stats.average_ms(), None);
        assert_eq!(stats.fps(), 0.0);
        assert_eq!(format!("{stats}"), "no frames yet");
    }

    #[test]
    fn averages_and_extremes() {
        let mut stats = FrameStats::new();
        for s in [0.010, 0.020, 0.030] {
            stats.record(s);
        }
        assert!((stats.average_ms().unwrap() - 20.0).abs() < 1e-3);
        assert!((stats.min_ms().unwrap() - 10.0).abs() < 1e-3);
        assert!((stats.max_ms().unwrap() - 30.0).abs() < 1e-3);
        assert!((stats.fps() - 50.0).abs() < 0.01);
        assert!(format!("{stats}").contains("50 fps"));
    }

    #[test]
    fn window_drops_oldest() {
        let mut stats = FrameStats::with_window(2);
        stats.record(1.0);
        stats.record(0.010);
        stats.record(0.010);
        assert!((stats.max_ms().unwrap() - 10.0).abs() < 1e-3);
        assert_eq!(stats.total_frames(), 3);
    }

    #[test]
    fn invalid_samples_ignored() {
        let mut stats = FrameStats::new();
        stats.record(-1.0);
        stats.record(f32::NAN);
        assert!(stats.is_empty());
        assert_eq!(stats.total_frames(), 0);
    }
}

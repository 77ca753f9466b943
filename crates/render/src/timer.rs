use std::time::Instant;

/// Measures wall-clock time between frames.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    last: Instant,
    delta: f32,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            delta: 0.0,
        }
    }

    /// Mark the start of a new frame and return seconds since the previous one.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        self.delta
    }

    /// Seconds measured by the last [`tick`](Self::tick).
    pub fn delta(&self) -> f32 {
        self.delta
    }
}

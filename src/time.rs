use std::time::Instant;

/// Monotonic millisecond counter
pub trait Clock {
    fn now_millis(&self) -> u64;
}

/// [`Clock`] backed by [`Instant`], counting from its creation
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

pub struct FrameTimer<C = MonotonicClock> {
    clock: C,
    previous: Option<u64>,
    accumulator: f32,
    frame_count: u32,
    /// Time in seconds since the last tick
    pub delta: f32,
    /// Frames per second, updated once per second
    pub fps: u32,
    /// Total number of ticks since start
    pub frame: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(MonotonicClock::default())
    }
}

impl<C: Clock> FrameTimer<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            previous: None,
            accumulator: 0.0,
            frame_count: 0,
            delta: 0.0,
            fps: 0,
            frame: 0,
        }
    }

    /// Returns the seconds elapsed since the previous tick
    ///
    /// The first tick only records the starting timestamp & returns zero
    pub fn tick(&mut self) -> f32 {
        let current = self.clock.now_millis();
        let previous = *self.previous.get_or_insert(current);

        self.delta = current.saturating_sub(previous) as f32 / 1000.0;
        self.previous = Some(current);

        self.accumulator += self.delta;
        self.frame_count += 1;
        self.frame += 1;

        if self.accumulator >= 1.0 {
            self.fps = self.frame_count;
            self.frame_count = 0;
            self.accumulator = 0.0;
        }

        self.delta
    }
}

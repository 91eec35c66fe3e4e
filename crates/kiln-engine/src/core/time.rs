use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick.
    pub dt: f32,
    /// Seconds since the clock started.
    pub elapsed: f32,
    pub frame_index: u64,
}

/// Produces [`FrameTime`] snapshots; delta time is clamped so a stalled or
/// minimized window does not produce a huge step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            dt_max: Duration::from_millis(250),
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last).min(self.dt_max);
        self.last = now;

        let time = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            frame_index: self.frame_index,
        };
        self.frame_index += 1;
        time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_counted() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
    }

    #[test]
    fn delta_is_clamped() {
        let mut clock = FrameClock::new();
        if let Some(earlier) = clock.last.checked_sub(Duration::from_secs(5)) {
            clock.last = earlier;
        }
        let t = clock.tick();
        assert!(t.dt <= 0.25 + f32::EPSILON);
        assert!(t.elapsed >= 0.0);
    }
}

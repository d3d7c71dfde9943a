use std::cell::Cell;
use std::time::Duration;

/// Milliseconds since boot, 32 bits. Wraps after about 49 days.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub struct Instant(u32);

impl Instant {
    pub fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    pub fn to_millis(&self) -> u32 {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, correct across one wrap of the counter.
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        Duration::from_millis(self.0.wrapping_sub(earlier.0) as u64)
    }

    pub fn add_millis(&self, ms: u32) -> Instant {
        Instant(self.0.wrapping_add(ms))
    }
}

pub trait Clock {
    fn now(&self) -> Instant;
}

pub struct StdClock {
    start: std::time::Instant,
}

impl Default for StdClock {
    fn default() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Clock for StdClock {
    fn now(&self) -> Instant {
        let t_ms = std::time::Instant::now()
            .saturating_duration_since(self.start)
            .as_millis();

        // Truncation gives the same wrap-around as a hardware millisecond tick
        Instant(t_ms as u32)
    }
}

/// A clock that only moves when told to.
#[derive(Default, Debug)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Cell::new(start.to_millis()),
        }
    }

    pub fn set(&self, t: Instant) {
        self.now.set(t.to_millis());
    }

    pub fn advance(&self, d: Duration) {
        let ms = d.as_millis() as u32;
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant(self.now.get())
    }
}

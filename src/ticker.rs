use std::time::{Duration, Instant};

/// Fixed-period tick schedule polled from the game loop.
///
/// There is only ever one schedule: `start` replaces whatever was scheduled
/// before, and `stop` drops it so no further ticks fire.
pub struct Ticker {
    period: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Ticker { period, next_due: None }
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// True if a tick is due at `now`. Reports at most one tick per call; a
    /// loop that fell more than a period behind is rebased onto `now` rather
    /// than firing a burst of catch-up ticks.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                let next = due + self.period;
                self.next_due = Some(if next <= now { now + self.period } else { next });
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(100);

    #[test]
    fn test_idle_ticker_never_fires() {
        let mut ticker = Ticker::new(PERIOD);
        let now = Instant::now();

        assert!(!ticker.is_active());
        assert!(!ticker.poll(now + PERIOD * 10));
    }

    #[test]
    fn test_fires_once_per_period() {
        let mut ticker = Ticker::new(PERIOD);
        let t0 = Instant::now();
        ticker.start(t0);

        assert!(!ticker.poll(t0 + Duration::from_millis(99)));
        assert!(ticker.poll(t0 + Duration::from_millis(100)));
        assert!(!ticker.poll(t0 + Duration::from_millis(150)));
        assert!(ticker.poll(t0 + Duration::from_millis(205)));
        // Stays on the 100ms grid instead of drifting by the 5ms of lateness
        assert!(ticker.poll(t0 + Duration::from_millis(300)));
    }

    #[test]
    fn test_no_burst_after_stall() {
        let mut ticker = Ticker::new(PERIOD);
        let t0 = Instant::now();
        ticker.start(t0);

        let late = t0 + Duration::from_millis(1000);
        assert!(ticker.poll(late));
        assert!(!ticker.poll(late));
        assert!(ticker.poll(late + PERIOD));
    }

    #[test]
    fn test_stop_cancels() {
        let mut ticker = Ticker::new(PERIOD);
        let t0 = Instant::now();
        ticker.start(t0);
        ticker.stop();

        assert!(!ticker.is_active());
        assert!(!ticker.poll(t0 + PERIOD * 5));
    }

    #[test]
    fn test_restart_replaces_schedule() {
        let mut ticker = Ticker::new(PERIOD);
        let t0 = Instant::now();
        ticker.start(t0);

        let t1 = t0 + Duration::from_millis(80);
        ticker.start(t1);

        // The old schedule would have fired at t0 + 100
        assert!(!ticker.poll(t0 + Duration::from_millis(120)));
        assert!(ticker.poll(t1 + PERIOD));
    }
}

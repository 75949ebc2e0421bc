use std::time::{Duration, Instant};

/// Trailing-edge debouncer: fires once `delay` has passed since the last poke.
///
/// Time is passed in explicitly so callers decide what "now" is.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Records activity, pushing the deadline back.
    pub fn poke(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// `true` exactly once per burst of pokes, after it has settled.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_quiet_period() {
        let start = Instant::now();
        let ms = Duration::from_millis;
        let mut debounce = Debounce::new(ms(100));

        assert!(!debounce.poll(start));
        debounce.poke(start);
        debounce.poke(start + ms(60));
        assert!(!debounce.poll(start + ms(120)));
        assert!(debounce.poll(start + ms(160)));
        assert!(!debounce.poll(start + ms(500)));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn cancel_drops_pending_work() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(10));
        debounce.poke(start);
        debounce.cancel();
        assert!(!debounce.poll(start + Duration::from_secs(1)));
    }
}

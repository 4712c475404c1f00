use std::time::{Duration, Instant};

/// Presentation clock: accumulated time plus the currently running span.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    elapsed: Duration,
    running_since: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Start or resume. Returns `true` if the clock was stopped.
    pub fn start_at(&mut self, now: Instant) -> bool {
        if self.running_since.is_some() {
            return false;
        }
        self.running_since = Some(now);
        true
    }

    pub fn pause_at(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.elapsed += now.saturating_duration_since(since);
        }
    }

    /// Pause a running clock, start a stopped one.
    pub fn toggle_at(&mut self, now: Instant) {
        if !self.start_at(now) {
            self.pause_at(now);
        }
    }

    /// Stop and clear the clock.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.running_since = None;
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(since) => self.elapsed + now.saturating_duration_since(since),
            None => self.elapsed,
        }
    }

    pub fn start(&mut self) -> bool {
        self.start_at(Instant::now())
    }

    pub fn toggle(&mut self) {
        self.toggle_at(Instant::now());
    }

    pub fn pause(&mut self) {
        self.pause_at(Instant::now());
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }
}

/// `MM:SS`, or `H:MM:SS` past the hour.
pub fn format_clock(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_across_pauses() {
        let t0 = Instant::now();
        let mut timer = Timer::new();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_at(t0), Duration::ZERO);

        assert!(timer.start_at(t0));
        assert!(!timer.start_at(t0 + Duration::from_secs(1)));
        timer.pause_at(t0 + Duration::from_secs(10));
        assert_eq!(timer.elapsed_at(t0 + Duration::from_secs(60)), Duration::from_secs(10));

        timer.toggle_at(t0 + Duration::from_secs(100));
        assert!(timer.is_running());
        assert_eq!(timer.elapsed_at(t0 + Duration::from_secs(105)), Duration::from_secs(15));

        timer.toggle_at(t0 + Duration::from_secs(110));
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_at(t0 + Duration::from_secs(500)), Duration::from_secs(20));
    }

    #[test]
    fn test_reset() {
        let t0 = Instant::now();
        let mut timer = Timer::new();
        timer.start_at(t0);
        timer.reset();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_at(t0 + Duration::from_secs(30)), Duration::ZERO);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Duration::from_secs(0)), "00:00");
        assert_eq!(format_clock(Duration::from_secs(75)), "01:15");
        assert_eq!(format_clock(Duration::from_secs(3725)), "1:02:05");
    }
}

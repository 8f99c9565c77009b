use std::time::{Duration, Instant};

/// Detects double clicks from a stream of press timestamps.
#[derive(Debug, Clone)]
pub struct DoubleClick {
    window: Duration,
    last_press: Option<Instant>,
}

impl Default for DoubleClick {
    fn default() -> Self {
        Self::new(Duration::from_millis(400))
    }
}

impl DoubleClick {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_press: None,
        }
    }

    /// Record a press at `now`. Returns true when it completes a double click;
    /// the next press then starts a fresh pair.
    pub fn press(&mut self, now: Instant) -> bool {
        match self.last_press.take() {
            Some(prev) if now.saturating_duration_since(prev) <= self.window => {
                tracing::trace!("double click");
                true
            }
            _ => {
                self.last_press = Some(now);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_quick_presses() {
        let mut dc = DoubleClick::default();
        let t0 = Instant::now();
        assert!(!dc.press(t0));
        assert!(dc.press(t0 + Duration::from_millis(150)));
    }

    #[test]
    fn slow_presses_do_not_count() {
        let mut dc = DoubleClick::default();
        let t0 = Instant::now();
        assert!(!dc.press(t0));
        assert!(!dc.press(t0 + Duration::from_millis(900)));
        // The slow press starts a new pair.
        assert!(dc.press(t0 + Duration::from_millis(1000)));
    }

    #[test]
    fn triple_click_is_one_double() {
        let mut dc = DoubleClick::new(Duration::from_millis(300));
        let t0 = Instant::now();
        assert!(!dc.press(t0));
        assert!(dc.press(t0 + Duration::from_millis(100)));
        assert!(!dc.press(t0 + Duration::from_millis(200)));
    }
}

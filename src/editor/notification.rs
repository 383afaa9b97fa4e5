use std::time::{Duration, Instant};

/// Transient "saved" toast. Independent of document state.
#[derive(Clone, Debug)]
pub struct Notification {
    shown_at: Option<Instant>,
    timeout: Duration,
}

impl Notification {
    pub fn new(timeout: Duration) -> Self {
        Self {
            shown_at: None,
            timeout,
        }
    }

    pub fn show(&mut self, now: Instant) {
        self.shown_at = Some(now);
    }

    pub fn dismiss(&mut self) {
        self.shown_at = None;
    }

    pub fn is_visible(&self) -> bool {
        self.shown_at.is_some()
    }

    /// Hides the toast once it has been up for longer than the timeout.
    /// Returns `true` if it was hidden by this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.shown_at {
            Some(shown) if now.saturating_duration_since(shown) > self.timeout => {
                self.shown_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_hides_after_timeout() {
        let mut toast = Notification::new(Duration::from_secs(4));
        let start = Instant::now();
        toast.show(start);
        assert!(!toast.tick(start + Duration::from_secs(2)));
        assert!(toast.is_visible());
        assert!(toast.tick(start + Duration::from_secs(5)));
        assert!(!toast.is_visible());
    }

    #[test]
    fn dismiss_hides_immediately() {
        let mut toast = Notification::new(Duration::from_secs(4));
        toast.show(Instant::now());
        toast.dismiss();
        assert!(!toast.is_visible());
        assert!(!toast.tick(Instant::now()));
    }
}

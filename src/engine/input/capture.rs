// Remap capture: "press the input you want to bind"

use std::time::{Duration, Instant};

/// Quiet period applied around a capture
pub const DEFAULT_SUPPRESS_DURATION: Duration = Duration::from_millis(200);

/// Capture progress of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    /// Waiting for the next qualifying input to bind to the binding at
    /// this config position
    Awaiting(usize),
}

/// Capture state plus the input suppression deadline
#[derive(Debug, Clone)]
pub struct RemapCapture {
    state: CaptureState,
    suppress_until: Option<Instant>,
    suppress_for: Duration,
}

impl RemapCapture {
    pub fn new(suppress_for: Duration) -> Self {
        Self {
            state: CaptureState::Idle,
            suppress_until: None,
            suppress_for,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Config position of the pending capture target
    pub fn target(&self) -> Option<usize> {
        match self.state {
            CaptureState::Awaiting(position) => Some(position),
            CaptureState::Idle => None,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        self.target().is_some()
    }

    /// Whether input arriving at `now` must be ignored
    pub fn is_suppressed(&self, now: Instant) -> bool {
        self.suppress_until.is_some_and(|until| now < until)
    }

    pub fn suppressed_until(&self) -> Option<Instant> {
        self.suppress_until
    }

    /// Ignore all input for the configured quiet period
    pub fn suppress(&mut self, now: Instant) {
        self.suppress_until = Some(now + self.suppress_for);
    }

    /// Begin waiting for input for the binding at `position`
    pub fn begin(&mut self, position: usize, now: Instant) {
        self.state = CaptureState::Awaiting(position);
        self.suppress(now);
    }

    /// Finish the pending capture, returning its target
    pub fn complete(&mut self, now: Instant) -> Option<usize> {
        let target = self.target()?;
        self.state = CaptureState::Idle;
        self.suppress(now);
        Some(target)
    }

    /// Abandon the pending capture without suppressing input
    pub fn cancel(&mut self) -> Option<usize> {
        let target = self.target();
        self.state = CaptureState::Idle;
        target
    }
}

impl Default for RemapCapture {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESS_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let capture = RemapCapture::default();
        assert_eq!(capture.state(), CaptureState::Idle);
        assert!(!capture.is_suppressed(Instant::now()));
    }

    #[test]
    fn test_begin_suppresses() {
        let now = Instant::now();
        let mut capture = RemapCapture::default();
        capture.begin(3, now);

        assert_eq!(capture.state(), CaptureState::Awaiting(3));
        assert!(capture.is_suppressed(now));
        assert!(capture.is_suppressed(now + Duration::from_millis(199)));
        assert!(!capture.is_suppressed(now + DEFAULT_SUPPRESS_DURATION));
    }

    #[test]
    fn test_complete_returns_target_and_suppresses_again() {
        let now = Instant::now();
        let mut capture = RemapCapture::default();
        capture.begin(1, now);

        let later = now + Duration::from_millis(500);
        assert_eq!(capture.complete(later), Some(1));
        assert_eq!(capture.state(), CaptureState::Idle);
        assert!(capture.is_suppressed(later + Duration::from_millis(100)));
        assert!(!capture.is_suppressed(later + Duration::from_millis(200)));
    }

    #[test]
    fn test_complete_when_idle() {
        let now = Instant::now();
        let mut capture = RemapCapture::default();
        assert_eq!(capture.complete(now), None);
        assert!(!capture.is_suppressed(now));
    }

    #[test]
    fn test_cancel() {
        let mut capture = RemapCapture::default();
        capture.begin(2, Instant::now());
        assert_eq!(capture.cancel(), Some(2));
        assert!(!capture.is_awaiting());
    }

    #[test]
    fn test_custom_duration() {
        let now = Instant::now();
        let mut capture = RemapCapture::new(Duration::from_millis(50));
        capture.suppress(now);
        assert!(capture.is_suppressed(now + Duration::from_millis(49)));
        assert!(!capture.is_suppressed(now + Duration::from_millis(50)));
    }
}

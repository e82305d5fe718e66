use std::time::{Duration, Instant};

use glam::Vec4;

/// Repeating color pulse: while active, the owning object's color sweeps from
/// the color it had at activation towards `highlight` once per `period`, then
/// snaps back and repeats. Deactivating hands back the original color so the
/// object can be restored exactly.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HighlightAnimator {
    state: HighlightState,
    highlight: Vec4,
    period: Duration,
}

#[derive(Clone, Copy, Debug)]
enum HighlightState {
    Idle,
    Active { original: Vec4, started: Instant },
}

impl HighlightAnimator {
    pub(crate) fn new(highlight: Vec4, period: Duration) -> Self {
        Self {
            state: HighlightState::Idle,
            highlight,
            period,
        }
    }

    /// Starts pulsing from `current`. A second activation is a no-op: the
    /// snapshot taken on the first activation is kept.
    pub(crate) fn activate(&mut self, current: Vec4, now: Instant) {
        if matches!(self.state, HighlightState::Active { .. }) {
            return;
        }
        self.state = HighlightState::Active {
            original: current,
            started: now,
        };
    }

    /// Stops pulsing and returns the color snapshot taken at activation.
    pub(crate) fn deactivate(&mut self) -> Option<Vec4> {
        match self.state {
            HighlightState::Idle => None,
            HighlightState::Active { original, .. } => {
                self.state = HighlightState::Idle;
                Some(original)
            }
        }
    }

    /// The color to display right now, or `None` while idle.
    pub(crate) fn color(&self, now: Instant) -> Option<Vec4> {
        match self.state {
            HighlightState::Idle => None,
            HighlightState::Active { original, started } => {
                let elapsed = now.saturating_duration_since(started);
                let cycle = (elapsed.as_secs_f32() / self.period.as_secs_f32()).fract();
                Some(original.lerp(self.highlight, cycle))
            }
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        matches!(self.state, HighlightState::Active { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::HighlightAnimator;
    use glam::Vec4;
    use std::time::{Duration, Instant};

    const HIGHLIGHT: Vec4 = Vec4::new(1.0, 0.4, 0.4, 1.0);
    const BASE: Vec4 = Vec4::new(0.2, 0.8, 0.3, 1.0);

    fn animator() -> HighlightAnimator {
        HighlightAnimator::new(HIGHLIGHT, Duration::from_secs(1))
    }

    #[test]
    fn idle_animator_produces_no_color() {
        let animator = animator();
        assert!(!animator.is_active());
        assert!(animator.color(Instant::now()).is_none());
    }

    #[test]
    fn pulse_sweeps_towards_highlight_and_wraps() {
        let mut animator = animator();
        let start = Instant::now();
        animator.activate(BASE, start);

        let at_start = animator.color(start).unwrap();
        assert_eq!(at_start, BASE);

        let half = animator.color(start + Duration::from_millis(500)).unwrap();
        let expected = BASE.lerp(HIGHLIGHT, 0.5);
        assert!((half - expected).length() < 1e-5);

        // a full period later the pulse has wrapped back to the original
        let wrapped = animator.color(start + Duration::from_secs(1)).unwrap();
        assert!((wrapped - BASE).length() < 1e-5);
    }

    #[test]
    fn deactivate_returns_activation_snapshot() {
        let mut animator = animator();
        animator.activate(BASE, Instant::now());
        assert_eq!(animator.deactivate(), Some(BASE));
        assert!(!animator.is_active());
        assert_eq!(animator.deactivate(), None);
    }

    #[test]
    fn double_activation_keeps_first_snapshot() {
        let mut animator = animator();
        let start = Instant::now();
        animator.activate(BASE, start);

        // the caller may feed back the currently displayed (pulsed) color
        let pulsed = animator.color(start + Duration::from_millis(250)).unwrap();
        animator.activate(pulsed, start + Duration::from_millis(250));

        assert_eq!(animator.deactivate(), Some(BASE));
    }
}

use std::time::{Duration, Instant};

use glam::{Vec3, Vec4};

/// Interpolation curve applied to the normalized progress of a tween.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Easing {
    Linear,
    QuadraticInOut,
}

impl Easing {
    pub(crate) fn evaluate(self, progress: f32) -> f32 {
        let progress = progress.clamp(0.0, 1.0);
        match self {
            Self::Linear => progress,
            Self::QuadraticInOut => {
                if progress < 0.5 {
                    2.0 * progress * progress
                } else {
                    let remaining = -2.0 * progress + 2.0;
                    1.0 - remaining * remaining / 2.0
                }
            }
        }
    }
}

/// One-shot interpolation between two colors. The sampled value is clamped
/// to the end color once the duration has elapsed.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ColorTween {
    start: Vec4,
    end: Vec4,
    start_time: Instant,
    duration: Duration,
    easing: Easing,
}

impl ColorTween {
    pub(crate) fn new(
        start: Vec4,
        end: Vec4,
        start_time: Instant,
        duration: Duration,
        easing: Easing,
    ) -> Self {
        Self {
            start,
            end,
            start_time,
            duration,
            easing,
        }
    }

    pub(crate) fn sample(&self, now: Instant) -> Vec4 {
        let progress = self.easing.evaluate(progress(self.start_time, self.duration, now));
        self.start.lerp(self.end, progress)
    }

    pub(crate) fn is_complete(&self, now: Instant) -> bool {
        progress(self.start_time, self.duration, now) >= 1.0
    }
}

/// One-shot interpolation of the camera pose (eye and look-at target).
#[derive(Clone, Copy, Debug)]
pub(crate) struct CameraTween {
    eye_start: Vec3,
    eye_end: Vec3,
    target_start: Vec3,
    target_end: Vec3,
    start_time: Instant,
    duration: Duration,
    easing: Easing,
}

impl CameraTween {
    pub(crate) fn new(
        (eye_start, eye_end): (Vec3, Vec3),
        (target_start, target_end): (Vec3, Vec3),
        start_time: Instant,
        duration: Duration,
        easing: Easing,
    ) -> Self {
        Self {
            eye_start,
            eye_end,
            target_start,
            target_end,
            start_time,
            duration,
            easing,
        }
    }

    /// Returns the interpolated `(eye, target)` pose.
    pub(crate) fn sample(&self, now: Instant) -> (Vec3, Vec3) {
        let progress = self.easing.evaluate(progress(self.start_time, self.duration, now));
        (
            self.eye_start.lerp(self.eye_end, progress),
            self.target_start.lerp(self.target_end, progress),
        )
    }

    pub(crate) fn is_complete(&self, now: Instant) -> bool {
        progress(self.start_time, self.duration, now) >= 1.0
    }
}

fn progress(start_time: Instant, duration: Duration, now: Instant) -> f32 {
    let elapsed = now.saturating_duration_since(start_time);
    if duration.is_zero() {
        return 1.0;
    }
    elapsed.as_secs_f32() / duration.as_secs_f32()
}

#[cfg(test)]
mod tests {
    use super::{CameraTween, ColorTween, Easing};
    use glam::{Vec3, Vec4};
    use std::time::{Duration, Instant};

    const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
    const MAGENTA: Vec4 = Vec4::new(1.0, 0.0, 1.0, 1.0);

    #[test]
    fn linear_easing_is_identity() {
        assert_eq!(Easing::Linear.evaluate(0.25), 0.25);
        assert_eq!(Easing::Linear.evaluate(1.0), 1.0);
    }

    #[test]
    fn quadratic_in_out_is_symmetric() {
        let easing = Easing::QuadraticInOut;
        assert_eq!(easing.evaluate(0.0), 0.0);
        assert!((easing.evaluate(0.5) - 0.5).abs() < 1e-6);
        assert!((easing.evaluate(1.0) - 1.0).abs() < 1e-6);
        // slow start, fast middle
        assert!(easing.evaluate(0.25) < 0.25);
        assert!(easing.evaluate(0.75) > 0.75);
    }

    #[test]
    fn color_tween_interpolates_midway() {
        let start = Instant::now();
        let tween = ColorTween::new(RED, MAGENTA, start, Duration::from_secs(1), Easing::Linear);

        let midway = tween.sample(start + Duration::from_millis(500));
        assert!((midway.z - 0.5).abs() < 1e-6);
        assert!(!tween.is_complete(start + Duration::from_millis(500)));
    }

    #[test]
    fn color_tween_ends_exactly_at_target_and_stays_there() {
        let start = Instant::now();
        let tween = ColorTween::new(RED, MAGENTA, start, Duration::from_secs(1), Easing::Linear);

        assert_eq!(tween.sample(start + Duration::from_secs(1)), MAGENTA);
        assert!(tween.is_complete(start + Duration::from_secs(1)));
        // no looping: well past the end the value is still the target
        assert_eq!(tween.sample(start + Duration::from_secs(5)), MAGENTA);
    }

    #[test]
    fn color_tween_before_start_yields_start_value() {
        let start = Instant::now() + Duration::from_secs(10);
        let tween = ColorTween::new(RED, MAGENTA, start, Duration::from_secs(1), Easing::Linear);
        assert_eq!(tween.sample(Instant::now()), RED);
    }

    #[test]
    fn camera_tween_moves_eye_and_target_together() {
        let start = Instant::now();
        let tween = CameraTween::new(
            (Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)),
            (Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0)),
            start,
            Duration::from_secs(1),
            Easing::Linear,
        );

        let (eye, target) = tween.sample(start + Duration::from_millis(500));
        assert!((eye.x - 5.0).abs() < 1e-4);
        assert!((target.y - 5.0).abs() < 1e-4);

        let (eye, target) = tween.sample(start + Duration::from_secs(2));
        assert_eq!(eye, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(target, Vec3::new(0.0, 10.0, 0.0));
    }
}

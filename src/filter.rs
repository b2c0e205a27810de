//! Range smoothing and zero-drift compensation.
//!
//! A time-of-flight sensor looking at the resting carriage drifts slowly
//! with temperature and spring settling. Each sensor runs two moving
//! averages over its raw samples:
//!
//! - **A**: the raw range itself.
//! - **B**: the sample-to-sample change of A, used as a stability gauge.
//!
//! While B is below [`ERR_THRESHOLD`] and A sits above the target reference,
//! the excess is tracked as `drift_offset`. A drop below the reference (a
//! shot or a hand on the carriage) latches `drift_comp_reset` so the next
//! stable reading re-anchors the offset from zero instead of absorbing the
//! transient.

/// Stability threshold on the change average.
pub const ERR_THRESHOLD: f64 = 1.0;

/// Deadband above the tracked rest point before the offset follows.
pub const DRIFT_DEADBAND: f64 = 0.5;

/// Default window size (samples).
pub const DEFAULT_SAMPLE_SIZE: usize = 7;

/// Ring-buffered moving average.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: Vec<f64>,
    next: usize,
    average: f64,
}

impl MovingAverage {
    /// A window of `size` samples (at least 1), all equal to `seed`.
    pub fn new(size: usize, seed: f64) -> Self {
        Self {
            window: vec![seed; size.max(1)],
            next: 0,
            average: seed,
        }
    }

    /// Replace the oldest sample and return the new average.
    pub fn push(&mut self, value: f64) -> f64 {
        self.window[self.next] = value;
        self.next = (self.next + 1) % self.window.len();
        self.average = self.window.iter().sum::<f64>() / self.window.len() as f64;
        self.average
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn size(&self) -> usize {
        self.window.len()
    }
}

/// Moving-average filter with drift compensation for one sensor.
#[derive(Debug, Clone)]
pub struct SensorFilter {
    range: MovingAverage,
    error: MovingAverage,
    drift_offset: f64,
    drift_compensation_enable: bool,
    drift_comp_reset: bool,
    target_reference: i32,
    output: f64,
}

impl Default for SensorFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_SIZE)
    }
}

impl SensorFilter {
    pub fn new(sample_size: usize) -> Self {
        Self {
            range: MovingAverage::new(sample_size, 0.0),
            error: MovingAverage::new(sample_size, 0.0),
            drift_offset: 0.0,
            drift_compensation_enable: false,
            drift_comp_reset: false,
            target_reference: 0,
            output: 0.0,
        }
    }

    /// Feed one raw range sample (mm) and return the filtered range.
    pub fn update(&mut self, raw: i32) -> f64 {
        let previous = self.range.average();
        let current = self.range.push(f64::from(raw));
        let error = self.error.push((previous - current).abs());

        if self.target_reference != 0 {
            let target = f64::from(self.target_reference);
            if current < target {
                self.drift_comp_reset = true;
            }
            if error < ERR_THRESHOLD {
                if self.drift_comp_reset && current > target {
                    log::debug!("drift anchor re-established at {current:.1}");
                    self.drift_comp_reset = false;
                    self.drift_offset = 0.0;
                }
                if current > target + self.drift_offset + DRIFT_DEADBAND {
                    self.drift_offset = current - target;
                }
            }
        }

        self.output = if self.target_reference != 0 && self.drift_compensation_enable {
            current - self.drift_offset
        } else {
            current
        };
        self.output
    }

    /// The last filtered range.
    pub fn output(&self) -> f64 {
        self.output
    }

    /// Moving average of the raw range (A).
    pub fn average(&self) -> f64 {
        self.range.average()
    }

    /// Moving average of the change of A (B).
    pub fn error_average(&self) -> f64 {
        self.error.average()
    }

    pub fn sample_size(&self) -> usize {
        self.range.size()
    }

    pub fn drift_offset(&self) -> f64 {
        self.drift_offset
    }

    pub fn drift_comp_reset(&self) -> bool {
        self.drift_comp_reset
    }

    pub fn drift_compensation_enabled(&self) -> bool {
        self.drift_compensation_enable
    }

    pub fn target_reference(&self) -> i32 {
        self.target_reference
    }

    /// Set the expected at-rest reading. 0 disables drift tracking.
    pub fn set_target_reference(&mut self, target_reference: i32) {
        self.target_reference = target_reference;
    }

    pub fn set_drift_compensation(&mut self, enable: bool) {
        self.drift_compensation_enable = enable;
    }

    /// Resize both windows. Returns the clamped size.
    ///
    /// The range window is refilled with the current raw average, which keeps
    /// it in the same domain as `drift_offset` so the output does not jump.
    /// The change window restarts at rest.
    pub fn set_sample_size(&mut self, size: usize) -> usize {
        let size = size.max(1);
        self.reseed(size);
        size
    }

    /// Refill the windows after a connection drop.
    pub fn reset(&mut self) {
        self.reseed(self.range.size());
    }

    /// Arm the re-anchor latch, e.g. when the sensor is switched back on.
    pub fn request_drift_reset(&mut self) {
        self.drift_comp_reset = true;
    }

    fn reseed(&mut self, size: usize) {
        let seed = self.range.average();
        self.range = MovingAverage::new(size, seed);
        self.error = MovingAverage::new(size, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn drift_filter() -> SensorFilter {
        let mut f = SensorFilter::new(7);
        f.set_target_reference(50);
        f.set_drift_compensation(true);
        f
    }

    fn feed(f: &mut SensorFilter, value: i32, ticks: usize) -> f64 {
        let mut out = f.output();
        for _ in 0..ticks {
            out = f.update(value);
        }
        out
    }

    #[test]
    fn moving_average_window() {
        let mut m = MovingAverage::new(3, 0.0);
        assert_relative_eq!(m.push(3.0), 1.0);
        assert_relative_eq!(m.push(3.0), 2.0);
        assert_relative_eq!(m.push(3.0), 3.0);
        assert_relative_eq!(m.push(6.0), 4.0);
        assert_eq!(MovingAverage::new(0, 1.0).size(), 1);
    }

    #[test]
    fn inert_without_target() {
        let mut f = SensorFilter::new(1);
        f.set_drift_compensation(true);
        assert_eq!(f.update(55), 55.0);
        assert_eq!(f.update(10), 10.0);
        assert_eq!(f.drift_offset(), 0.0);
        assert!(!f.drift_comp_reset());
    }

    #[test]
    fn drift_tracks_stable_rest() {
        let mut f = drift_filter();
        let out = feed(&mut f, 55, 20);
        assert_eq!(f.average(), 55.0);
        assert!(f.error_average() < ERR_THRESHOLD);
        assert_eq!(f.drift_offset(), 5.0);
        assert_eq!(out, 50.0);
        // Warm-up from zero crossed below the target, then re-anchored.
        assert!(!f.drift_comp_reset());
    }

    #[test]
    fn transient_latches_without_recalculating() {
        let mut f = drift_filter();
        feed(&mut f, 55, 20);
        let dipped = feed(&mut f, 10, 2);
        assert!(f.drift_comp_reset());
        assert_eq!(f.drift_offset(), 5.0);
        assert!(f.error_average() >= ERR_THRESHOLD);
        assert_relative_eq!(dipped, f.average() - 5.0);
    }

    #[test]
    fn recovery_reanchors_from_zero() {
        let mut f = drift_filter();
        feed(&mut f, 55, 20);
        feed(&mut f, 10, 2);
        let out = feed(&mut f, 55, 20);
        assert!(!f.drift_comp_reset());
        // Offset rebuilt from the new rest point, not stacked on the old one.
        assert_eq!(f.drift_offset(), 5.0);
        assert_eq!(out, 50.0);
        assert_eq!(f.average(), 55.0);
    }

    #[test]
    fn recovery_to_lower_rest_point() {
        let mut f = drift_filter();
        feed(&mut f, 55, 20);
        feed(&mut f, 10, 2);
        // Without the reset the old offset of 5 would stay (52 < 50 + 5 + 0.5).
        let out = feed(&mut f, 52, 20);
        assert_eq!(f.drift_offset(), 2.0);
        assert_eq!(out, 50.0);
    }

    #[test]
    fn small_drift_inside_deadband() {
        let mut f = drift_filter();
        feed(&mut f, 55, 20);
        // A single 57 lifts the average by 2/7, inside the deadband.
        feed(&mut f, 55, 3);
        let out = f.update(57);
        assert_eq!(f.drift_offset(), 5.0);
        assert!(out > 50.0);
    }

    #[test]
    fn compensation_disabled_passes_average() {
        let mut f = drift_filter();
        f.set_drift_compensation(false);
        let out = feed(&mut f, 55, 20);
        assert_eq!(out, 55.0);
        // Offset is still tracked for when it is switched on.
        assert_eq!(f.drift_offset(), 5.0);
    }

    #[test]
    fn resize_has_no_jump() {
        let mut f = drift_filter();
        feed(&mut f, 55, 20);
        assert_eq!(f.set_sample_size(0), 1);
        assert_eq!(f.sample_size(), 1);
        assert_eq!(f.average(), 55.0);
        assert_eq!(f.error_average(), 0.0);
        assert_eq!(f.set_sample_size(4), 4);
        assert_eq!(f.average(), 55.0);
        for _ in 0..6 {
            assert_eq!(f.update(55), 50.0);
        }
        assert_eq!(f.drift_offset(), 5.0);
    }

    #[test]
    fn reset_keeps_compensated_output() {
        let mut f = drift_filter();
        let before = feed(&mut f, 55, 20);
        f.reset();
        assert_eq!(f.update(55), before);
        assert_eq!(f.drift_offset(), 5.0);
    }

    #[test]
    fn enable_toggle_latches() {
        let mut f = drift_filter();
        feed(&mut f, 55, 20);
        f.request_drift_reset();
        assert!(f.drift_comp_reset());
        f.update(55);
        assert!(!f.drift_comp_reset());
    }

    #[test]
    fn reset_keeps_size() {
        let mut f = SensorFilter::new(5);
        feed(&mut f, 30, 10);
        f.reset();
        assert_eq!(f.sample_size(), 5);
        assert_eq!(f.average(), 30.0);
    }
}

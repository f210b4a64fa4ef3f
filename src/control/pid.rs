use thiserror::Error;

use crate::tuning::ChannelGains;

// ---------------------------------------------------------------------------
// PID channel (single axis, clamped output)
// ---------------------------------------------------------------------------

/// Rejected control update: the elapsed time since the previous update was
/// not strictly positive, so the derivative term is undefined.
///
/// `dt` is NaN when the channel's owner had no reference timestamp at all.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("non-positive control timestep (dt = {dt})")]
pub struct InvalidTimestep {
    pub dt: f64,
}

/// A single-axis PID computation unit.
///
/// The integral is a plain running sum of the errors fed to [`update`]
/// (`integral += error`, with no dt factor). That matches the simplified
/// discrete form the stock gain presets were tuned against; switching to a
/// trapezoidal integral would silently rescale every Ki.
///
/// [`update`]: PidChannel::update
#[derive(Debug, Clone)]
pub struct PidChannel {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    out_min: f64,
    out_max: f64,
    integral: f64,
    prev_error: f64,
}

impl PidChannel {
    pub fn new(gains: ChannelGains) -> Self {
        Self {
            kp: gains.kp,
            ki: gains.ki,
            kd: gains.kd,
            out_min: gains.out_min,
            out_max: gains.out_max,
            integral: 0.0,
            prev_error: 0.0,
        }
    }

    /// Run one control update and return the clamped output.
    ///
    /// Requires `dt > 0`. A zero, negative or NaN dt is rejected with
    /// [`InvalidTimestep`] and leaves the integral and previous-error
    /// state exactly as they were; a rejected cycle must not corrupt
    /// channel history.
    pub fn update(&mut self, error: f64, dt: f64) -> Result<f64, InvalidTimestep> {
        if !(dt > 0.0) {
            return Err(InvalidTimestep { dt });
        }

        self.integral += error;
        let derivative = (error - self.prev_error) / dt;
        self.prev_error = error;

        let raw = self.kp * error + self.ki * self.integral + self.kd * derivative;
        Ok(raw.clamp(self.out_min, self.out_max))
    }

    /// Zero the integral and previous-error history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }

    /// Accumulated error sum since the last reset.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Error seen by the most recent accepted update.
    pub fn prev_error(&self) -> f64 {
        self.prev_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p_only(kp: f64) -> PidChannel {
        PidChannel::new(ChannelGains::new(kp, 0.0, 0.0))
    }

    #[test]
    fn pure_proportional_is_clamped_kp_error() {
        let mut pid = p_only(0.25);
        for &error in &[0.0, 100.0, -40.0, 640.0, -1200.0] {
            let out = pid.update(error, 0.1).unwrap();
            let expected = (0.25 * error).clamp(-100.0, 100.0);
            assert!(
                (out - expected).abs() < 1e-12,
                "P-only output should be clamp(Kp*e): got {} for e={}",
                out,
                error
            );
        }
    }

    #[test]
    fn integral_is_running_sum_of_errors() {
        let mut pid = PidChannel::new(ChannelGains::new(0.0, 1.0, 0.0).with_limits(-1e9, 1e9));
        let errors = [3.0, -1.5, 0.25, 10.0];
        let dts = [0.1, 0.03, 0.2, 0.011];
        let mut sum = 0.0;
        for (&e, &dt) in errors.iter().zip(&dts) {
            let out = pid.update(e, dt).unwrap();
            sum += e;
            assert!((pid.integral() - sum).abs() < 1e-12, "integral should be the plain error sum");
            assert!((out - sum).abs() < 1e-12, "Ki=1 output equals the sum");
        }
    }

    #[test]
    fn derivative_divides_error_delta_by_dt() {
        let mut pid = PidChannel::new(ChannelGains::new(0.0, 0.0, 2.0).with_limits(-1e9, 1e9));
        pid.update(1.0, 0.5).unwrap();
        // d = (4 - 1) / 0.5 = 6, Kd*d = 12
        let out = pid.update(4.0, 0.5).unwrap();
        assert!((out - 12.0).abs() < 1e-12, "derivative term wrong: {}", out);
    }

    #[test]
    fn non_positive_dt_rejected_without_mutation() {
        let mut pid = PidChannel::new(ChannelGains::new(0.25, 0.0002, 0.03));
        pid.update(100.0, 0.1).unwrap();
        let integral = pid.integral();
        let prev = pid.prev_error();

        for dt in [0.0, -0.1, f64::NAN] {
            assert!(pid.update(50.0, dt).is_err(), "dt={} must be rejected", dt);
            assert_eq!(pid.integral(), integral, "integral changed on rejected dt={}", dt);
            assert_eq!(pid.prev_error(), prev, "prev_error changed on rejected dt={}", dt);
        }

        // A twin channel that never saw the rejected calls produces the
        // same output on the next accepted update.
        let mut twin = PidChannel::new(ChannelGains::new(0.25, 0.0002, 0.03));
        twin.update(100.0, 0.1).unwrap();
        let a = pid.update(80.0, 0.1).unwrap();
        let b = twin.update(80.0, 0.1).unwrap();
        assert_eq!(a, b, "rejected updates must leave no trace in later outputs");
    }

    #[test]
    fn output_stays_clamped_for_extreme_errors() {
        let mut pid = PidChannel::new(ChannelGains::new(0.25, 0.0002, 0.03));
        let hi = pid.update(1e9, 0.1).unwrap();
        assert_eq!(hi, 100.0, "huge positive error must saturate at out_max");
        let lo = pid.update(-1e9, 0.1).unwrap();
        assert_eq!(lo, -100.0, "huge negative error must saturate at out_min");
    }

    #[test]
    fn reset_clears_history() {
        let mut pid = PidChannel::new(ChannelGains::new(1.0, 1.0, 1.0));
        pid.update(5.0, 0.1).unwrap();
        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.prev_error(), 0.0);
    }
}

use crate::actuate::command::AXIS_LIMIT;

// ---------------------------------------------------------------------------
// Per-channel PID gains and output clamp bounds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub out_min: f64,
    pub out_max: f64,
}

impl ChannelGains {
    /// Gains with the default RC output clamp of ±[`AXIS_LIMIT`].
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            out_min: -AXIS_LIMIT,
            out_max: AXIS_LIMIT,
        }
    }

    /// Override the output clamp. Flipped bounds are reordered.
    pub fn with_limits(mut self, min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.out_min = min;
        self.out_max = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_clamp_is_rc_range() {
        let g = ChannelGains::new(0.25, 0.0002, 0.03);
        assert_eq!(g.out_min, -100.0);
        assert_eq!(g.out_max, 100.0);
    }

    #[test]
    fn flipped_limits_are_reordered() {
        let g = ChannelGains::new(1.0, 0.0, 0.0).with_limits(50.0, -50.0);
        assert_eq!(g.out_min, -50.0);
        assert_eq!(g.out_max, 50.0);
    }
}

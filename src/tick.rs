//! Mappings between integer slider ticks and parameter values.
//!
//! Each slider stores only an integer tick. A [`TickScale`] converts the tick into the value of the
//! parameter it controls and back again.
use anyhow::{Result, ensure};

/// How a slider's integer tick maps onto a parameter value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickScale {
    /// `value = slope * tick + offset`
    Linear {
        /// Change in value per tick
        slope: f64,
        /// Value at tick zero
        offset: f64,
    },
    /// Linear up to `threshold`, then growing by a constant number of decades per tick.
    ///
    /// The two segments meet at the threshold, so the mapping is continuous and strictly
    /// increasing.
    PiecewiseLog {
        /// The last tick of the linear segment
        threshold: u8,
        /// Change in value per tick on the linear segment
        slope: f64,
        /// Value at tick zero
        offset: f64,
        /// Powers of ten gained per tick above the threshold
        decades_per_tick: f64,
    },
}

impl TickScale {
    /// Convert a tick into a parameter value
    pub fn to_value(&self, tick: u8) -> f64 {
        let tick = f64::from(tick);
        match *self {
            Self::Linear { slope, offset } => slope * tick + offset,
            Self::PiecewiseLog {
                threshold,
                slope,
                offset,
                decades_per_tick,
            } => {
                let threshold = f64::from(threshold);
                if tick <= threshold {
                    slope * tick + offset
                } else {
                    let base = slope * threshold + offset;
                    base * 10f64.powf((tick - threshold) * decades_per_tick)
                }
            }
        }
    }

    /// Convert a parameter value into a (fractional) tick position
    pub fn from_value(&self, value: f64) -> f64 {
        match *self {
            Self::Linear { slope, offset } => (value - offset) / slope,
            Self::PiecewiseLog {
                threshold,
                slope,
                offset,
                decades_per_tick,
            } => {
                let threshold = f64::from(threshold);
                let base = slope * threshold + offset;
                if value <= base {
                    (value - offset) / slope
                } else {
                    threshold + (value / base).log10() / decades_per_tick
                }
            }
        }
    }

    /// The tick closest to `value`, limited to the range `0..=max_tick`
    pub fn nearest_tick(&self, value: f64, max_tick: u8) -> u8 {
        let tick = self.from_value(value).round();
        if tick.is_nan() {
            return 0;
        }

        tick.clamp(0.0, f64::from(max_tick)) as u8
    }

    /// Check that the scale is strictly increasing over `0..=max_tick`
    pub fn check(&self, max_tick: u8) -> Result<()> {
        match *self {
            Self::Linear { slope, offset } => {
                ensure!(
                    slope.is_finite() && slope > 0.0 && offset.is_finite(),
                    "Linear tick scale must have a positive finite slope"
                );
            }
            Self::PiecewiseLog {
                threshold,
                slope,
                offset,
                decades_per_tick,
            } => {
                ensure!(
                    slope.is_finite() && slope > 0.0 && offset.is_finite(),
                    "Piecewise tick scale must have a positive finite slope"
                );
                ensure!(
                    threshold < max_tick,
                    "Piecewise tick scale threshold must be below the maximum tick"
                );
                ensure!(
                    slope * f64::from(threshold) + offset > 0.0,
                    "Piecewise tick scale must be positive at its threshold"
                );
                ensure!(
                    decades_per_tick.is_finite() && decades_per_tick > 0.0,
                    "Piecewise tick scale must grow above its threshold"
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    const CO2: TickScale = TickScale::PiecewiseLog {
        threshold: 20,
        slope: 1.0,
        offset: -10.0,
        decades_per_tick: 2.0 / 183.0,
    };

    #[rstest]
    #[case(0, -10.0)]
    #[case(20, 10.0)]
    #[case(21, 10.0 * 10f64.powf(2.0 / 183.0))]
    #[case(203, 1000.0)]
    fn test_piecewise_to_value(#[case] tick: u8, #[case] expected: f64) {
        assert_approx_eq!(f64, CO2.to_value(tick), expected, epsilon = 1e-9);
    }

    #[rstest]
    #[case(447.0, 171)]
    #[case(927.0, 200)]
    #[case(8.0, 18)]
    #[case(-50.0, 0)]
    #[case(1e9, 200)]
    fn test_nearest_tick(#[case] value: f64, #[case] expected: u8) {
        assert_eq!(CO2.nearest_tick(value, 200), expected);
    }

    #[test]
    fn test_linear_round_trip() {
        let scale = TickScale::Linear {
            slope: 1.0 / 200.0,
            offset: -0.1,
        };
        scale.check(40).unwrap();
        for tick in 0..=40 {
            assert_eq!(scale.nearest_tick(scale.to_value(tick), 40), tick);
        }
        assert_approx_eq!(f64, scale.to_value(32), 0.06, epsilon = 1e-12);
    }

    #[test]
    fn test_piecewise_round_trip() {
        CO2.check(200).unwrap();
        for tick in 0..=200 {
            assert_eq!(CO2.nearest_tick(CO2.to_value(tick), 200), tick);
        }
    }

    #[test]
    fn test_check_invalid() {
        assert!(
            TickScale::Linear {
                slope: 0.0,
                offset: 0.0
            }
            .check(10)
            .is_err()
        );
        assert!(
            TickScale::PiecewiseLog {
                threshold: 5,
                slope: 1.0,
                offset: -5.0,
                decades_per_tick: 0.1
            }
            .check(10)
            .is_err()
        );
    }
}

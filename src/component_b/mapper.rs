//! mapper.rs
//! Raw sensor units → physical units.
//! - pots: 10-bit ADC counts → degrees (`360 * raw / 1024`), wrist channel mounted inverted
//! - FSR: three-segment clamp-and-interpolate onto the gripper cylinder scale
//!
//! Angles are not clamped; out-of-range counts pass through as out-of-range degrees.

use crate::component_a::parser::SensorSample;

pub const ADC_COUNTS: f64 = 1024.0;
pub const DEGREES_PER_TURN: f64 = 360.0;

pub const FSR_LOW: f64 = 100.0;
pub const FSR_HIGH: f64 = 300.0;
pub const SCALE_MIN: f64 = 0.1;
pub const SCALE_MAX: f64 = 1.0;
// 0.9 of scale across the 200-count band, kept as the literal quotient.
pub const SCALE_SLOPE: f64 = 0.9 / 200.0;

/// Joint targets in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngles {
    pub base: f64,
    pub shoulder: f64,
    pub elbow: f64,
    pub wrist: f64,
}

impl JointAngles {
    /// Writer order: base, shoulder, elbow, wrist.
    pub fn as_array(&self) -> [f64; 4] {
        [self.base, self.shoulder, self.elbow, self.wrist]
    }
}

/// Uniform cylinder scale in `[SCALE_MIN, SCALE_MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScaleFactor(pub f64);

impl ScaleFactor {
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

#[inline]
pub fn counts_to_degrees(raw: f64) -> f64 {
    DEGREES_PER_TURN * raw / ADC_COUNTS
}

pub fn map_angles(sample: &SensorSample) -> JointAngles {
    JointAngles {
        base: counts_to_degrees(sample.pot_1),
        shoulder: counts_to_degrees(sample.pot_2),
        elbow: counts_to_degrees(sample.pot_3),
        wrist: -counts_to_degrees(sample.pot_4),
    }
}

/// Strict `<` / `>`: readings of exactly 100 and 300 take the interpolation branch.
pub fn map_scale(fsr_reading: f64) -> ScaleFactor {
    let scale = if fsr_reading < FSR_LOW {
        SCALE_MIN
    } else if fsr_reading > FSR_HIGH {
        SCALE_MAX
    } else {
        SCALE_MIN + (fsr_reading - FSR_LOW) * SCALE_SLOPE
    };
    ScaleFactor(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn sample(p: [f64; 4], fsr: f64) -> SensorSample {
        SensorSample { pot_1: p[0], pot_2: p[1], pot_3: p[2], pot_4: p[3], fsr_reading: fsr }
    }

    #[test]
    fn scale_boundaries() {
        assert!((map_scale(99.0).value() - 0.1).abs() < EPS);
        assert!((map_scale(100.0).value() - 0.1).abs() < EPS);
        assert!((map_scale(200.0).value() - 0.55).abs() < EPS);
        assert!((map_scale(300.0).value() - 1.0).abs() < EPS);
        assert!((map_scale(301.0).value() - 1.0).abs() < EPS);
    }

    #[test]
    fn scale_clamps_far_outside_band() {
        assert_eq!(map_scale(-50.0).value(), SCALE_MIN);
        assert_eq!(map_scale(1023.0).value(), SCALE_MAX);
    }

    #[test]
    fn midscale_angles() {
        let a = map_angles(&sample([512.0; 4], 250.0));
        assert!((a.base - 180.0).abs() < EPS);
        assert!((a.shoulder - 180.0).abs() < EPS);
        assert!((a.elbow - 180.0).abs() < EPS);
        assert!((a.wrist + 180.0).abs() < EPS);
    }

    #[test]
    fn out_of_range_counts_pass_through() {
        let a = map_angles(&sample([2048.0, -1024.0, 0.0, 1024.0], 0.0));
        assert!((a.base - 720.0).abs() < EPS);
        assert!((a.shoulder + 360.0).abs() < EPS);
        assert_eq!(a.elbow, 0.0);
        assert!((a.wrist + 360.0).abs() < EPS);
    }

    proptest! {
        #[test]
        fn angles_are_linear_in_counts(r in 0u32..=1023) {
            let raw = r as f64;
            let a = map_angles(&sample([raw; 4], 0.0));
            let want = 360.0 * raw / 1024.0;
            prop_assert!((a.base - want).abs() < EPS);
            prop_assert!((a.shoulder - want).abs() < EPS);
            prop_assert!((a.elbow - want).abs() < EPS);
            prop_assert!((a.wrist + want).abs() < EPS);
        }

        #[test]
        fn scale_stays_in_range_and_is_monotonic(a in -1000.0f64..2000.0, b in -1000.0f64..2000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let (s_lo, s_hi) = (map_scale(lo).value(), map_scale(hi).value());
            prop_assert!((SCALE_MIN - EPS..=SCALE_MAX + EPS).contains(&s_lo));
            prop_assert!((SCALE_MIN - EPS..=SCALE_MAX + EPS).contains(&s_hi));
            prop_assert!(s_lo <= s_hi + EPS);
        }
    }
}

//! Quadrature decoding with hysteresis.
//!
//! The two encoder lines are sampled each pass and packed into a 2-bit code.
//! On every code change, the previous and current codes form a 4-bit
//! transition value; valid transitions move an accumulator one step in
//! either direction and everything else (repeats, double-edge glitches) is
//! dropped as noise. One discrete step event fires when the accumulator
//! reaches the configured threshold magnitude, which rejects single-edge
//! contact bounce without needing a timer.

/// Transition values that advance the accumulator clockwise.
const STEPS_UP: [u8; 4] = [0x01, 0x07, 0x0E, 0x08];
/// Transition values that advance the accumulator counter-clockwise.
const STEPS_DOWN: [u8; 4] = [0x02, 0x04, 0x0B, 0x0D];

/// Default accumulator magnitude required to emit one step event.
pub const DEFAULT_STEP_THRESHOLD: u8 = 2;

/// Direction of a discrete encoder step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

/// Stateful decoder for one encoder.
#[derive(Debug, Clone)]
pub struct QuadratureDecoder {
    last_code: u8,
    accumulator: i16,
    threshold: i16,
}

impl Default for QuadratureDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_THRESHOLD)
    }
}

impl QuadratureDecoder {
    /// Create a decoder that fires one step per `threshold` accumulated
    /// valid transitions. A zero threshold is treated as 1.
    #[must_use]
    pub fn new(threshold: u8) -> Self {
        Self {
            last_code: 0,
            accumulator: 0,
            threshold: i16::from(threshold.max(1)),
        }
    }

    /// Feed one sample of the A/B lines. Returns a step event when the
    /// accumulator crosses the threshold; the accumulator resets on fire.
    pub fn sample(&mut self, a: bool, b: bool) -> Option<StepDirection> {
        let code = (u8::from(a) << 1) | u8::from(b);
        if code == self.last_code {
            return None;
        }
        let transition = (self.last_code << 2) | code;
        self.last_code = code;

        if STEPS_UP.contains(&transition) {
            self.accumulator += 1;
        } else if STEPS_DOWN.contains(&transition) {
            self.accumulator -= 1;
        } else {
            // Invalid double-edge transition: noise.
            return None;
        }

        if self.accumulator >= self.threshold {
            self.accumulator = 0;
            Some(StepDirection::Up)
        } else if self.accumulator <= -self.threshold {
            self.accumulator = 0;
            Some(StepDirection::Down)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Gray-code cycle for increasing position: 00 → 01 → 11 → 10 → 00.
    const FORWARD_CYCLE: [(bool, bool); 4] =
        [(false, true), (true, true), (true, false), (false, false)];

    fn feed(decoder: &mut QuadratureDecoder, samples: &[(bool, bool)]) -> Vec<StepDirection> {
        samples
            .iter()
            .filter_map(|&(a, b)| decoder.sample(a, b))
            .collect()
    }

    #[test]
    fn should_emit_steps_while_rotating_forward() {
        let mut decoder = QuadratureDecoder::default();
        // One full cycle is four valid transitions; threshold 2 fires every
        // two transitions, so one cycle yields two step events.
        let steps = feed(&mut decoder, &FORWARD_CYCLE);
        assert_eq!(steps, vec![StepDirection::Up, StepDirection::Up]);
    }

    #[test]
    fn should_emit_down_steps_while_rotating_backward() {
        let mut decoder = QuadratureDecoder::default();
        // Reverse sequence starting from rest: 00 → 10 → 11 → 01 → 00.
        let samples = [(true, false), (true, true), (false, true), (false, false)];
        let steps = feed(&mut decoder, &samples);
        assert_eq!(steps, vec![StepDirection::Down, StepDirection::Down]);
    }

    #[test]
    fn should_ignore_single_edge_bounce() {
        let mut decoder = QuadratureDecoder::default();
        // 00 → 01 → 00: one edge out, bounce straight back. The two
        // transitions cancel in the accumulator; no step may fire.
        let steps = feed(&mut decoder, &[(false, true), (false, false)]);
        assert!(steps.is_empty());
    }

    #[test]
    fn should_ignore_repeated_identical_samples() {
        let mut decoder = QuadratureDecoder::default();
        let steps = feed(
            &mut decoder,
            &[(false, false), (false, false), (false, false)],
        );
        assert!(steps.is_empty());
    }

    #[test]
    fn should_ignore_invalid_double_edge_transition() {
        let mut decoder = QuadratureDecoder::default();
        // 00 → 11 flips both lines at once; not a valid quadrature move.
        assert_eq!(decoder.sample(true, true), None);
        // Decoder must keep working afterwards.
        assert_eq!(decoder.sample(true, false), None);
        assert_eq!(decoder.sample(false, false), Some(StepDirection::Up));
    }

    #[test]
    fn should_reset_accumulator_after_firing() {
        let mut decoder = QuadratureDecoder::default();
        let mut total = Vec::new();
        for _ in 0..3 {
            total.extend(feed(&mut decoder, &FORWARD_CYCLE));
        }
        // Three full cycles, two steps each — no drift.
        assert_eq!(total.len(), 6);
        assert!(total.iter().all(|&d| d == StepDirection::Up));
    }

    #[test]
    fn should_respect_custom_threshold() {
        let mut decoder = QuadratureDecoder::new(4);
        // Threshold 4 means one full cycle fires exactly one step.
        let steps = feed(&mut decoder, &FORWARD_CYCLE);
        assert_eq!(steps, vec![StepDirection::Up]);
    }
}

//! Time-based debounce for discrete push buttons.
//!
//! Buttons are wired active-low with a pull-up: the line rests high and a
//! press pulls it low. Only the falling edge is a logical press, and edges
//! closer together than the minimum interval are collapsed into one.

/// Default minimum interval between two accepted presses, in milliseconds.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 200;

/// Debounce window for one digital input.
#[derive(Debug, Clone)]
pub struct Debouncer {
    last_level: bool,
    last_edge_ms: Option<u64>,
    min_interval_ms: u64,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL_MS)
    }
}

impl Debouncer {
    /// Create a debouncer with the given minimum inter-edge interval.
    #[must_use]
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            // Released level for an active-low input.
            last_level: true,
            last_edge_ms: None,
            min_interval_ms,
        }
    }

    /// Feed one level sample taken at `now_ms`. Returns `true` when this
    /// sample is an accepted falling edge (a logical press).
    pub fn sample(&mut self, level: bool, now_ms: u64) -> bool {
        let falling = self.last_level && !level;
        self.last_level = level;
        if !falling {
            return false;
        }
        if let Some(last) = self.last_edge_ms {
            if now_ms.saturating_sub(last) < self.min_interval_ms {
                return false;
            }
        }
        self.last_edge_ms = Some(now_ms);
        true
    }
}

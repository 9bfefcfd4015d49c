//! Debouncing of per-frame deviations into a deliberate answer.

/// How consecutive in-range frames are counted towards acceptance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StabilityPolicy {
    /// Count every consecutive frame whose deviation is inside the
    /// instability threshold.
    ConsecutiveInRange,
    /// Additionally require each deviation to lie within a small delta
    /// of the previous one; a jump resets the count.
    MutuallyClose,
}

#[derive(Clone, Copy, Debug)]
pub struct StabilityConfig {
    pub policy: StabilityPolicy,
    /// Deviations at or beyond this many cents reset the count.
    pub instability_threshold_cents: f32,
    /// Maximum distance to the previous deviation under
    /// [StabilityPolicy::MutuallyClose].
    pub closeness_delta_cents: f32,
    /// The count to exceed before a pitch is accepted, i.e. acceptance
    /// fires on the `required_count + 1`th qualifying frame.
    pub required_count: u32,
}

impl Default for StabilityConfig {
    fn default() -> StabilityConfig {
        StabilityConfig {
            policy: StabilityPolicy::ConsecutiveInRange,
            instability_threshold_cents: 40.0,
            closeness_delta_cents: 5.0,
            required_count: 3,
        }
    }
}

/// Watches the stream of deviations for the active trial and decides
/// when a sustained, self-consistent pitch counts as the answer.
/// Accepts at most once between resets.
#[derive(Clone, Copy, Debug)]
pub struct StabilityTracker {
    config: StabilityConfig,
    stable_count: u32,
    last_cents: Option<f32>,
    accepted: bool,
}

impl StabilityTracker {
    pub fn new(config: StabilityConfig) -> StabilityTracker {
        StabilityTracker {
            config,
            stable_count: 0,
            last_cents: None,
            accepted: false,
        }
    }

    /// Reinitializes the tracker for a new trial.
    pub fn reset(&mut self) {
        self.stable_count = 0;
        self.last_cents = None;
        self.accepted = false;
    }

    pub fn has_accepted(&self) -> bool {
        self.accepted
    }

    /// Feeds one deviation measurement. Returns the accepted deviation
    /// the first time the pitch has been held long enough, `None`
    /// otherwise. Frames without a usable estimate must simply not be
    /// fed; they neither advance nor reset the count.
    pub fn observe(&mut self, cents: f32) -> Option<f32> {
        if cents.abs() < self.config.instability_threshold_cents {
            let qualifies = match self.config.policy {
                StabilityPolicy::ConsecutiveInRange => true,
                StabilityPolicy::MutuallyClose => match self.last_cents {
                    Some(previous) => {
                        (cents - previous).abs() < self.config.closeness_delta_cents
                    }
                    None => true,
                },
            };
            if qualifies {
                self.stable_count += 1;
            } else {
                self.stable_count = 0;
            }
        } else {
            self.stable_count = 0;
        }
        self.last_cents = Some(cents);

        if self.stable_count > self.config.required_count && !self.accepted {
            self.accepted = true;
            return Some(cents);
        }
        None
    }
}

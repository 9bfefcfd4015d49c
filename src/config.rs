//! Session configuration.

use std::time::Duration;

use crate::error::SessionError;
use crate::notes::NoteSet;
use crate::stability::StabilityConfig;

/// When the next trial begins relative to the reveal of the previous
/// outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvancePolicy {
    /// Begin the next trial the moment the outcome is revealed.
    Immediate,
    /// Keep the outcome visible for a fixed pause before the next trial.
    HoldAfterReveal(Duration),
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// The pool target notes are drawn from.
    pub note_set: NoteSet,
    /// How long the reference tone sounds.
    pub tone_duration: Duration,
    /// How long the listening window stays open after the tone ends.
    pub inter_note_delay: Duration,
    /// Report the deviation to the feedback sink on every usable frame,
    /// instead of only revealing the outcome when the window closes.
    pub realtime_feedback: bool,
    pub advance: AdvancePolicy,
    pub stability: StabilityConfig,
    /// Fixed seed for the target note draws. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            note_set: NoteSet::bb_major(),
            tone_duration: Duration::from_millis(1000),
            inter_note_delay: Duration::from_millis(2000),
            realtime_feedback: true,
            advance: AdvancePolicy::HoldAfterReveal(Duration::from_millis(800)),
            stability: StabilityConfig::default(),
            rng_seed: None,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.tone_duration.is_zero() {
            return Err(SessionError::InvalidConfiguration(
                "tone duration must be positive",
            ));
        }
        if self.inter_note_delay.is_zero() {
            return Err(SessionError::InvalidConfiguration(
                "inter note delay must be positive",
            ));
        }
        if let AdvancePolicy::HoldAfterReveal(pause) = self.advance {
            if pause.is_zero() {
                return Err(SessionError::InvalidConfiguration(
                    "visibility pause must be positive",
                ));
            }
        }
        if !(self.stability.instability_threshold_cents > 0.0) {
            return Err(SessionError::InvalidConfiguration(
                "instability threshold must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_durations_rejected() {
        let config = SessionConfig {
            tone_duration: Duration::ZERO,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfig {
            inter_note_delay: Duration::ZERO,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfig {
            advance: AdvancePolicy::HoldAfterReveal(Duration::ZERO),
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

//! Trial scheduling and shared session state.
//!
//! A session runs one trial at a time: a target note is drawn and its
//! reference tone played, the listening window opens, per-frame pitch
//! estimates feed the stability tracker, and when the window closes the
//! outcome is revealed and the next trial scheduled. The per-frame path
//! ([Session::process_frame]) and the timer path ([Session::tick]) both
//! run against the same state, so callers driving them from different
//! threads must serialize access (see [crate::engine::SessionRunner]).

use std::time::{Duration, Instant};

use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::{AdvancePolicy, SessionConfig};
use crate::error::SessionError;
use crate::estimator::{FrequencyEstimator, MAX_WINDOW_SIZE};
use crate::notes::{cents_off, note_frequency, note_name, NoteSet};
use crate::range::OctaveNormalizer;
use crate::scoring::{classify, ScoreState, Verdict};
use crate::stability::StabilityTracker;

/// Plays reference tones. Fire and forget; the session never waits for
/// playback to finish.
pub trait TonePlayer: Send {
    fn play(&mut self, frequency_hz: f32, duration: Duration);
}

/// Receives trial feedback and score updates. Implementations must not
/// block; the session calls into the sink from its hot paths.
pub trait FeedbackSink: Send {
    /// A new trial began and its reference tone started playing.
    fn trial_started(&mut self, target_note: u8);
    /// The deviation measured on one frame, sent only in real time
    /// feedback mode.
    fn deviation_update(&mut self, _cents: f32) {}
    /// The finalized outcome of a trial, sent when the listening window
    /// closes.
    fn trial_outcome(&mut self, outcome: &TrialOutcome);
    /// The score changed, either through an accepted answer or a miss.
    fn score_updated(&mut self, score: &ScoreState);
}

/// The finalized result of one trial.
#[derive(Clone, Copy, Debug)]
pub struct TrialOutcome {
    pub target_note: u8,
    pub verdict: Verdict,
    /// The accepted deviation, absent for missed trials.
    pub cents: Option<f32>,
}

/// Scheduler phase. `Idle` is both the initial state and the terminal
/// state reached through [Session::stop].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// The reference tone is sounding and the listening window is open.
    Presenting,
    /// The tone has finished; still listening until the window closes.
    AwaitingReveal,
    /// The outcome stays visible until the next trial begins. Only
    /// entered under [AdvancePolicy::HoldAfterReveal].
    Revealed,
}

struct Trial {
    target_note: u8,
    target_hz: f32,
    tone_ends_at: Instant,
    window_closes_at: Instant,
    stability: StabilityTracker,
    accepted_cents: Option<f32>,
}

/// Owns the trial lifecycle and every piece of mutable session state:
/// the active trial, the stability tracker and the score.
pub struct Session {
    config: SessionConfig,
    estimator: FrequencyEstimator,
    normalizer: OctaveNormalizer,
    score: ScoreState,
    phase: Phase,
    trial: Option<Trial>,
    next_trial_at: Option<Instant>,
    last_target: Option<u8>,
    rng: Pcg32,
    player: Box<dyn TonePlayer>,
    sink: Box<dyn FeedbackSink>,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        player: Box<dyn TonePlayer>,
        sink: Box<dyn FeedbackSink>,
    ) -> Result<Session, SessionError> {
        config.validate()?;
        let seed = config.rng_seed.unwrap_or_else(rand::random);
        Ok(Session {
            estimator: FrequencyEstimator::new(MAX_WINDOW_SIZE),
            normalizer: OctaveNormalizer::default(),
            score: ScoreState::default(),
            phase: Phase::Idle,
            trial: None,
            next_trial_at: None,
            last_target: None,
            rng: Pcg32::seed_from_u64(seed),
            config,
            player,
            sink,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn score(&self) -> ScoreState {
        self.score
    }

    /// The target of the active trial, if a trial is active.
    pub fn current_target(&self) -> Option<u8> {
        self.trial.as_ref().map(|trial| trial.target_note)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Begins the first trial. Does nothing if the session is already
    /// running.
    pub fn start(&mut self, now: Instant) {
        if self.phase != Phase::Idle {
            return;
        }
        info!("session started");
        self.begin_trial(now);
    }

    /// Returns to `Idle`, discarding the active trial and any pending
    /// transitions. The score survives; see [Session::reset_score].
    pub fn stop(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        self.phase = Phase::Idle;
        self.trial = None;
        self.next_trial_at = None;
        info!("session stopped");
    }

    pub fn reset_score(&mut self) {
        self.score.reset();
    }

    /// Swaps the note pool. Takes effect when the next trial is drawn.
    pub fn set_note_set(&mut self, note_set: NoteSet) {
        self.config.note_set = note_set;
    }

    pub fn set_realtime_feedback(&mut self, enabled: bool) {
        self.config.realtime_feedback = enabled;
    }

    pub fn set_tone_duration(&mut self, duration: Duration) -> Result<(), SessionError> {
        if duration.is_zero() {
            return Err(SessionError::InvalidConfiguration(
                "tone duration must be positive",
            ));
        }
        self.config.tone_duration = duration;
        Ok(())
    }

    pub fn set_inter_note_delay(&mut self, delay: Duration) -> Result<(), SessionError> {
        if delay.is_zero() {
            return Err(SessionError::InvalidConfiguration(
                "inter note delay must be positive",
            ));
        }
        self.config.inter_note_delay = delay;
        Ok(())
    }

    /// Advances every timed transition that is due at `now`. A single
    /// coarse tick may cross several boundaries; they are applied in
    /// order against their scheduled instants, so late ticks do not
    /// drift the trial timing.
    pub fn tick(&mut self, now: Instant) {
        loop {
            match self.phase {
                Phase::Idle => return,
                Phase::Presenting => {
                    let tone_ends_at = match self.trial.as_ref() {
                        Some(trial) => trial.tone_ends_at,
                        None => return,
                    };
                    if now < tone_ends_at {
                        return;
                    }
                    self.phase = Phase::AwaitingReveal;
                }
                Phase::AwaitingReveal => {
                    let window_closes_at = match self.trial.as_ref() {
                        Some(trial) => trial.window_closes_at,
                        None => return,
                    };
                    if now < window_closes_at {
                        return;
                    }
                    self.finalize_trial();
                    match self.config.advance {
                        AdvancePolicy::Immediate => self.begin_trial(window_closes_at),
                        AdvancePolicy::HoldAfterReveal(pause) => {
                            self.phase = Phase::Revealed;
                            self.next_trial_at = Some(window_closes_at + pause);
                        }
                    }
                }
                Phase::Revealed => {
                    let next_trial_at = match self.next_trial_at {
                        Some(at) => at,
                        None => return,
                    };
                    if now < next_trial_at {
                        return;
                    }
                    self.next_trial_at = None;
                    self.begin_trial(next_trial_at);
                }
            }
        }
    }

    /// Runs one frame of audio through the estimation pipeline against
    /// the active trial. Returns the measured deviation in cents, or
    /// `None` when the frame carries no usable estimate (silence, no
    /// clear periodicity, out of range) or no listening window is open.
    ///
    /// Estimates computed while no window is open are discarded here,
    /// which keeps late frames from one trial out of the next.
    pub fn process_frame(&mut self, samples: &[f32], sample_rate: f32) -> Option<f32> {
        if !matches!(self.phase, Phase::Presenting | Phase::AwaitingReveal) {
            return None;
        }
        let samples = &samples[..samples.len().min(MAX_WINDOW_SIZE)];
        let raw_hz = self.estimator.estimate(samples, sample_rate)?;
        let folded_hz = self.normalizer.normalize(raw_hz)?;

        let trial = self.trial.as_mut()?;
        let cents = cents_off(folded_hz, trial.target_hz);
        if self.config.realtime_feedback {
            self.sink.deviation_update(cents);
        }
        if let Some(accepted) = trial.stability.observe(cents) {
            trial.accepted_cents = Some(accepted);
            let verdict = classify(accepted);
            self.score.apply(verdict);
            self.sink.score_updated(&self.score);
            debug!("answer accepted at {:+.1} cents, {:?}", accepted, verdict);
        }
        Some(cents)
    }

    fn begin_trial(&mut self, at: Instant) {
        let target_note = self
            .config
            .note_set
            .draw(&mut self.rng, self.last_target);
        self.last_target = Some(target_note);
        let target_hz = note_frequency(target_note);
        let tone_ends_at = at + self.config.tone_duration;

        self.trial = Some(Trial {
            target_note,
            target_hz,
            tone_ends_at,
            window_closes_at: tone_ends_at + self.config.inter_note_delay,
            stability: StabilityTracker::new(self.config.stability),
            accepted_cents: None,
        });
        self.phase = Phase::Presenting;
        self.player.play(target_hz, self.config.tone_duration);
        self.sink.trial_started(target_note);
        debug!(
            "new trial: {} (note {}, {:.2} Hz)",
            note_name(target_note),
            target_note,
            target_hz
        );
    }

    /// Reveals the outcome of the closing trial. The score for accepted
    /// answers was already applied at acceptance time; a miss resets the
    /// streak here.
    fn finalize_trial(&mut self) {
        let trial = match self.trial.as_ref() {
            Some(trial) => trial,
            None => return,
        };
        let outcome = match trial.accepted_cents {
            Some(cents) => TrialOutcome {
                target_note: trial.target_note,
                verdict: classify(cents),
                cents: Some(cents),
            },
            None => TrialOutcome {
                target_note: trial.target_note,
                verdict: Verdict::Missed,
                cents: None,
            },
        };
        if outcome.verdict == Verdict::Missed {
            self.score.apply(Verdict::Missed);
            self.sink.score_updated(&self.score);
        }
        debug!(
            "trial finished: {} {:?}",
            note_name(outcome.target_note),
            outcome.verdict
        );
        self.sink.trial_outcome(&outcome);
    }
}

//! An ear training core: present a reference note, estimate the pitch
//! of the sung or played response from raw audio frames, and score how
//! close the answer was in cents.
//!
//! The per-frame pipeline is time domain autocorrelation
//! ([estimator::FrequencyEstimator]) followed by octave folding into
//! the instrument's range ([range::OctaveNormalizer]), conversion to a
//! signed cents deviation ([notes::cents_off]) and debouncing into a
//! deliberate answer ([stability::StabilityTracker]). The
//! [session::Session] state machine sequences trials (present tone,
//! listen, reveal, next note) and applies [scoring] updates;
//! [engine::SessionRunner] drives a session from a live audio source on
//! a worker thread.
//!
//! Tone synthesis, microphone capture and rendering stay outside this
//! crate, behind the [session::TonePlayer], [engine::AudioSource] and
//! [session::FeedbackSink] traits.
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use pitch_coach::{
//!     FeedbackSink, NoteSet, ScoreState, Session, SessionConfig, TonePlayer, TrialOutcome,
//! };
//!
//! struct SilentPlayer;
//!
//! impl TonePlayer for SilentPlayer {
//!     fn play(&mut self, _frequency_hz: f32, _duration: Duration) {}
//! }
//!
//! struct ConsoleSink;
//!
//! impl FeedbackSink for ConsoleSink {
//!     fn trial_started(&mut self, target_note: u8) {
//!         println!("sing {}", pitch_coach::notes::note_name(target_note));
//!     }
//!     fn trial_outcome(&mut self, outcome: &TrialOutcome) {
//!         println!("{:?}", outcome.verdict);
//!     }
//!     fn score_updated(&mut self, score: &ScoreState) {
//!         println!("score {} streak {}", score.score, score.streak);
//!     }
//! }
//!
//! let config = SessionConfig {
//!     note_set: NoteSet::chromatic(),
//!     ..SessionConfig::default()
//! };
//! let mut session =
//!     Session::new(config, Box::new(SilentPlayer), Box::new(ConsoleSink)).unwrap();
//!
//! let t0 = Instant::now();
//! session.start(t0);
//!
//! // Feed microphone frames as they arrive; silence yields no estimate.
//! let frame = vec![0.0_f32; 2048];
//! assert_eq!(session.process_frame(&frame, 44100.0), None);
//!
//! // Drive timed transitions from a timer or polling loop.
//! session.tick(t0 + Duration::from_secs(4));
//! session.stop();
//! ```

pub mod common;
pub mod config;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod notes;
pub mod range;
pub mod scoring;
pub mod session;
pub mod stability;

pub use config::{AdvancePolicy, SessionConfig};
pub use engine::{AudioFrame, AudioSource, RingBufferSource, SessionRunner};
pub use error::SessionError;
pub use estimator::FrequencyEstimator;
pub use notes::NoteSet;
pub use range::OctaveNormalizer;
pub use scoring::{classify, ScoreState, Verdict};
pub use session::{FeedbackSink, Phase, Session, TonePlayer, TrialOutcome};
pub use stability::{StabilityConfig, StabilityPolicy, StabilityTracker};

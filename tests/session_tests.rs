//! End-to-end session tests on synthesized input.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use pitch_coach::{
    AdvancePolicy, FeedbackSink, NoteSet, ScoreState, Session, SessionConfig, TonePlayer,
    TrialOutcome, Verdict,
};

#[derive(Default)]
struct EventLog {
    started: Vec<u8>,
    tones: Vec<(f32, Duration)>,
    outcomes: Vec<TrialOutcome>,
    scores: Vec<ScoreState>,
    deviations: Vec<f32>,
}

#[derive(Clone, Default)]
struct SharedLog(Arc<Mutex<EventLog>>);

impl SharedLog {
    fn with<R>(&self, f: impl FnOnce(&EventLog) -> R) -> R {
        f(&self.0.lock())
    }
}

struct RecordingPlayer(SharedLog);

impl TonePlayer for RecordingPlayer {
    fn play(&mut self, frequency_hz: f32, duration: Duration) {
        self.0 .0.lock().tones.push((frequency_hz, duration));
    }
}

struct RecordingSink(SharedLog);

impl FeedbackSink for RecordingSink {
    fn trial_started(&mut self, target_note: u8) {
        self.0 .0.lock().started.push(target_note);
    }

    fn deviation_update(&mut self, cents: f32) {
        self.0 .0.lock().deviations.push(cents);
    }

    fn trial_outcome(&mut self, outcome: &TrialOutcome) {
        self.0 .0.lock().outcomes.push(*outcome);
    }

    fn score_updated(&mut self, score: &ScoreState) {
        self.0 .0.lock().scores.push(*score);
    }
}

fn session_with_log(config: SessionConfig) -> (Session, SharedLog) {
    let log = SharedLog::default();
    let session = Session::new(
        config,
        Box::new(RecordingPlayer(log.clone())),
        Box::new(RecordingSink(log.clone())),
    )
    .unwrap();
    (session, log)
}

fn single_note_config(note: u8) -> SessionConfig {
    SessionConfig {
        note_set: NoteSet::new(vec![note]).unwrap(),
        tone_duration: Duration::from_millis(100),
        inter_note_delay: Duration::from_millis(200),
        realtime_feedback: false,
        advance: AdvancePolicy::Immediate,
        rng_seed: Some(42),
        ..SessionConfig::default()
    }
}

const SAMPLE_RATE: f32 = 44100.0;
const FRAME_SIZE: usize = 2048;

fn sine_frame(frequency: f32) -> Vec<f32> {
    (0..FRAME_SIZE)
        .map(|i| (2.0 * std::f32::consts::PI * frequency * (i as f32) / SAMPLE_RATE).sin())
        .collect()
}

fn window_close(config: &SessionConfig) -> Duration {
    config.tone_duration + config.inter_note_delay
}

#[test]
fn test_excellent_trial() {
    // Target A4, answer a 440 Hz sine. The integer lag estimate lands
    // at 441 Hz, about +4 cents: excellent.
    let config = single_note_config(69);
    let close = window_close(&config);
    let (mut session, log) = session_with_log(config);

    let t0 = Instant::now();
    session.start(t0);
    assert_eq!(session.current_target(), Some(69));
    log.with(|log| {
        assert_eq!(log.started, vec![69]);
        let (tone_hz, _) = log.tones[0];
        assert!((tone_hz - 440.0).abs() <= 0.01);
    });

    let frame = sine_frame(440.0);
    for _ in 0..4 {
        let cents = session.process_frame(&frame, SAMPLE_RATE);
        assert!(cents.is_some());
    }
    // Scored at acceptance time, before the reveal.
    assert_eq!(session.score(), ScoreState { score: 2, streak: 1 });

    session.tick(t0 + close);
    log.with(|log| {
        let outcome = &log.outcomes[0];
        assert_eq!(outcome.verdict, Verdict::Excellent);
        let cents = outcome.cents.unwrap();
        assert!(cents > 0.0 && cents < 10.0);
        // The next trial started.
        assert_eq!(log.started.len(), 2);
    });

    // The score survives trials but not an explicit reset.
    session.reset_score();
    assert_eq!(session.score(), ScoreState::default());
}

#[test]
fn test_good_band_trial() {
    // Target Bb3 (233.08 Hz), answer about 234.6 Hz: just past the
    // excellent band, roughly +11 cents.
    let config = single_note_config(58);
    let close = window_close(&config);
    let (mut session, log) = session_with_log(config);

    let t0 = Instant::now();
    session.start(t0);

    let frame = sine_frame(SAMPLE_RATE / 188.0);
    for _ in 0..4 {
        session.process_frame(&frame, SAMPLE_RATE);
    }
    assert_eq!(session.score(), ScoreState { score: 1, streak: 1 });

    session.tick(t0 + close);
    log.with(|log| {
        assert_eq!(log.outcomes[0].verdict, Verdict::Good);
    });
}

#[test]
fn test_scored_at_most_once() {
    let config = single_note_config(69);
    let (mut session, log) = session_with_log(config);

    session.start(Instant::now());
    let frame = sine_frame(440.0);
    // Keep feeding qualifying frames long after acceptance.
    for _ in 0..104 {
        session.process_frame(&frame, SAMPLE_RATE);
    }
    assert_eq!(session.score(), ScoreState { score: 2, streak: 1 });
    log.with(|log| assert_eq!(log.scores.len(), 1));
}

#[test]
fn test_missed_trial_resets_streak() {
    let config = single_note_config(69);
    let close = window_close(&config);
    let (mut session, log) = session_with_log(config);

    let t0 = Instant::now();
    session.start(t0);

    // First trial: an excellent answer builds up the streak.
    let frame = sine_frame(440.0);
    for _ in 0..4 {
        session.process_frame(&frame, SAMPLE_RATE);
    }
    session.tick(t0 + close);

    // Second trial: nothing but silence until the window closes.
    let silence = vec![0.0; FRAME_SIZE];
    for _ in 0..10 {
        assert_eq!(session.process_frame(&silence, SAMPLE_RATE), None);
    }
    session.tick(t0 + close + close);

    log.with(|log| {
        assert_eq!(log.outcomes[1].verdict, Verdict::Missed);
        assert_eq!(log.outcomes[1].cents, None);
    });
    // Streak gone, score untouched.
    assert_eq!(session.score(), ScoreState { score: 2, streak: 0 });
}

#[test]
fn test_off_target_answer_resets_streak() {
    // Deviations at or past the 40 cents instability threshold never
    // stabilize, so a wildly sharp tone ends in a miss. A tone held in
    // the 25..40 cents gap stabilizes and is scored as off target.
    let config = single_note_config(69);
    let close = window_close(&config);
    let (mut session, log) = session_with_log(config);

    let t0 = Instant::now();
    session.start(t0);

    let frame = sine_frame(SAMPLE_RATE / 97.0); // about 454.6 Hz, +57 cents
    for _ in 0..10 {
        session.process_frame(&frame, SAMPLE_RATE);
    }
    session.tick(t0 + close);
    log.with(|log| assert_eq!(log.outcomes[0].verdict, Verdict::Missed));

    // Second trial.
    let frame = sine_frame(SAMPLE_RATE / 98.0); // 450 Hz, about +39 cents
    let mut cents_seen = None;
    for _ in 0..10 {
        if let Some(cents) = session.process_frame(&frame, SAMPLE_RATE) {
            cents_seen = Some(cents);
        }
    }
    let cents = cents_seen.unwrap();
    assert!(cents > 25.0 && cents < 40.0);
    session.tick(t0 + close + close);
    log.with(|log| assert_eq!(log.outcomes[1].verdict, Verdict::TooSharp));
    assert_eq!(session.score().streak, 0);
}

#[test]
fn test_realtime_feedback_mode() {
    let config = SessionConfig {
        realtime_feedback: true,
        ..single_note_config(69)
    };
    let (mut session, log) = session_with_log(config);

    session.start(Instant::now());
    let frame = sine_frame(440.0);
    for _ in 0..3 {
        session.process_frame(&frame, SAMPLE_RATE);
    }
    log.with(|log| assert_eq!(log.deviations.len(), 3));
}

#[test]
fn test_deferred_feedback_mode_sends_no_deviations() {
    let config = single_note_config(69);
    let (mut session, log) = session_with_log(config);

    session.start(Instant::now());
    let frame = sine_frame(440.0);
    for _ in 0..3 {
        session.process_frame(&frame, SAMPLE_RATE);
    }
    log.with(|log| assert!(log.deviations.is_empty()));
}

#[test]
fn test_out_of_range_frames_do_not_reset_stability() {
    // Three in-range frames, an out-of-range interruption (which must
    // be skipped, not treated as instability), then one more in-range
    // frame: acceptance fires on the fourth qualifying frame.
    let config = single_note_config(69);
    let (mut session, _log) = session_with_log(config);

    session.start(Instant::now());
    let good = sine_frame(440.0);
    let out_of_range = sine_frame(SAMPLE_RATE / 45.0); // 980 Hz, folds to 490 Hz -> rejected
    for _ in 0..3 {
        assert!(session.process_frame(&good, SAMPLE_RATE).is_some());
    }
    assert_eq!(session.process_frame(&out_of_range, SAMPLE_RATE), None);
    assert_eq!(session.score(), ScoreState::default());

    session.process_frame(&good, SAMPLE_RATE);
    assert_eq!(session.score(), ScoreState { score: 2, streak: 1 });
}

#[test]
fn test_no_immediate_target_repeats() {
    let config = SessionConfig {
        note_set: NoteSet::bb_major(),
        ..single_note_config(69)
    };
    let close = window_close(&config);
    let (mut session, log) = session_with_log(config);

    let t0 = Instant::now();
    session.start(t0);
    for i in 1..=200u32 {
        session.tick(t0 + close * i);
    }
    log.with(|log| {
        assert!(log.started.len() > 200);
        for pair in log.started.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    });
}

#[test]
fn test_stop_halts_processing_and_timers() {
    let config = single_note_config(69);
    let close = window_close(&config);
    let (mut session, log) = session_with_log(config);

    let t0 = Instant::now();
    session.start(t0);
    session.stop();

    let frame = sine_frame(440.0);
    assert_eq!(session.process_frame(&frame, SAMPLE_RATE), None);
    session.tick(t0 + close * 10);

    log.with(|log| {
        assert_eq!(log.started.len(), 1);
        assert!(log.outcomes.is_empty());
    });
    assert_eq!(session.score(), ScoreState::default());
}

#[test]
fn test_hold_after_reveal_keeps_outcome_visible() {
    let config = SessionConfig {
        advance: AdvancePolicy::HoldAfterReveal(Duration::from_millis(800)),
        ..single_note_config(69)
    };
    let close = window_close(&config);
    let (mut session, log) = session_with_log(config);

    let t0 = Instant::now();
    session.start(t0);
    session.tick(t0 + close);
    log.with(|log| {
        assert_eq!(log.outcomes.len(), 1);
        // The next tone does not sound during the visibility pause.
        assert_eq!(log.started.len(), 1);
    });

    session.tick(t0 + close + Duration::from_millis(800));
    log.with(|log| assert_eq!(log.started.len(), 2));
}

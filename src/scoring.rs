//! Classification of finalized deviations and score/streak keeping.

/// The outcome category of a single trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Within 10 cents of the target.
    Excellent,
    /// Within 25 cents of the target.
    Good,
    /// 25 cents or more above the target.
    TooSharp,
    /// 25 cents or more below the target.
    TooFlat,
    /// No stable pitch was accepted before the listening window closed.
    Missed,
}

/// Deviation magnitude below which an answer is excellent, in cents.
pub const EXCELLENT_BAND_CENTS: f32 = 10.0;
/// Deviation magnitude below which an answer is good, in cents.
pub const GOOD_BAND_CENTS: f32 = 25.0;

/// Maps a finite cents deviation to exactly one non-missed verdict.
pub fn classify(cents: f32) -> Verdict {
    let magnitude = cents.abs();
    if magnitude < EXCELLENT_BAND_CENTS {
        Verdict::Excellent
    } else if magnitude < GOOD_BAND_CENTS {
        Verdict::Good
    } else if cents > 0.0 {
        Verdict::TooSharp
    } else {
        Verdict::TooFlat
    }
}

/// The session-wide score accumulator. Survives across trials until
/// explicitly reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreState {
    /// Total score. Never decreases.
    pub score: u32,
    /// Consecutive scored answers. Resets on off-target and missed
    /// trials.
    pub streak: u32,
}

impl ScoreState {
    /// Applies one trial verdict. Called exactly once per trial.
    pub fn apply(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Excellent => {
                self.score += 2;
                self.streak += 1;
            }
            Verdict::Good => {
                self.score += 1;
                self.streak += 1;
            }
            Verdict::TooSharp | Verdict::TooFlat | Verdict::Missed => {
                self.streak = 0;
            }
        }
    }

    pub fn reset(&mut self) {
        *self = ScoreState::default();
    }
}

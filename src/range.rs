//! Octave folding and instrument range validation of raw estimates.

/// Folds raw frequency estimates into the instrument's working band and
/// rejects estimates outside its playable range.
///
/// A raw estimate is repeatedly halved while above the fold ceiling and
/// doubled while below the fold floor. The folded value must then land
/// inside the acceptance band (bounds inclusive); otherwise the frame
/// carries no usable estimate.
#[derive(Clone, Copy, Debug)]
pub struct OctaveNormalizer {
    fold_ceiling_hz: f32,
    fold_floor_hz: f32,
    accept_min_hz: f32,
    accept_max_hz: f32,
}

impl Default for OctaveNormalizer {
    fn default() -> OctaveNormalizer {
        OctaveNormalizer::new(500.0, 200.0, 220.0, 480.0)
    }
}

impl OctaveNormalizer {
    pub fn new(
        fold_ceiling_hz: f32,
        fold_floor_hz: f32,
        accept_min_hz: f32,
        accept_max_hz: f32,
    ) -> OctaveNormalizer {
        if !(fold_floor_hz > 0.0 && fold_ceiling_hz >= 2.0 * fold_floor_hz) {
            // Folding only terminates if doubling from below the floor
            // cannot overshoot the ceiling.
            panic!("Fold ceiling must be at least twice the fold floor")
        }
        if accept_min_hz > accept_max_hz {
            panic!("Acceptance band must not be empty")
        }
        OctaveNormalizer {
            fold_ceiling_hz,
            fold_floor_hz,
            accept_min_hz,
            accept_max_hz,
        }
    }

    /// Returns the folded frequency, or `None` if the estimate does not
    /// belong to the instrument's range even after folding.
    pub fn normalize(&self, raw_hz: f32) -> Option<f32> {
        if !raw_hz.is_finite() || raw_hz <= 0.0 {
            return None;
        }
        let mut hz = raw_hz;
        while hz > self.fold_ceiling_hz {
            hz *= 0.5;
        }
        while hz < self.fold_floor_hz {
            hz *= 2.0;
        }
        if hz < self.accept_min_hz || hz > self.accept_max_hz {
            return None;
        }
        Some(hz)
    }
}

//! `[f32]` level measurement extensions.

/// Signal level measurements on sample slices.
pub trait LevelExt {
    /// Returns the maximum absolute value.
    fn peak_level(&self) -> f32;
    /// Returns the [root mean square](https://en.wikipedia.org/wiki/Root_mean_square)
    /// level.
    fn rms_level(&self) -> f32;
}

impl LevelExt for [f32] {
    fn peak_level(&self) -> f32 {
        let mut max: f32 = 0.0;
        for sample in self.iter() {
            let value = sample.abs();
            if value > max {
                max = value
            }
        }
        max
    }

    fn rms_level(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let mut sum: f32 = 0.0;
        for sample in self.iter() {
            sum += sample * sample
        }
        (sum / (self.len() as f32)).sqrt()
    }
}

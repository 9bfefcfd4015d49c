//! Fundamental frequency estimation on raw time domain frames.

use crate::common::{autocorr_fft, autocorr_fft_size, LevelExt};

/// The largest frame size an estimator can be constructed for. Bounded
/// by the largest FFT size available for the autocorrelation.
pub const MAX_WINDOW_SIZE: usize = 2048;

/// Frames with an RMS level below this threshold are treated as silence.
pub const SILENCE_RMS_THRESHOLD: f32 = 0.01;

/// Amplitude threshold used when trimming the head and tail of a frame.
const TRIM_AMPLITUDE_THRESHOLD: f32 = 0.2;

/// Estimates the fundamental frequency of single frames of audio using
/// time domain autocorrelation. All buffers are allocated up front;
/// [estimate](FrequencyEstimator::estimate) does not allocate.
pub struct FrequencyEstimator {
    max_window_size: usize,
    corr: Vec<f32>,
    scratch: Vec<f32>,
}

impl FrequencyEstimator {
    pub fn new(max_window_size: usize) -> FrequencyEstimator {
        if max_window_size < 2 {
            panic!("Max window size must be at least 2")
        }
        if max_window_size > MAX_WINDOW_SIZE {
            panic!("Max window size must not exceed {}", MAX_WINDOW_SIZE)
        }
        let fft_size = autocorr_fft_size(max_window_size, max_window_size);
        FrequencyEstimator {
            max_window_size,
            corr: vec![0.0; fft_size],
            scratch: vec![0.0; fft_size],
        }
    }

    /// Returns the estimated fundamental frequency in Hz of a frame of
    /// samples, or `None` if the frame is too quiet or has no clear
    /// periodicity. The frame must not be longer than the max window
    /// size the estimator was constructed with.
    ///
    /// The estimate is the sample rate divided by the lag of the
    /// dominant autocorrelation peak, skipping the zero lag peak and
    /// its falloff.
    pub fn estimate(&mut self, samples: &[f32], sample_rate: f32) -> Option<f32> {
        if samples.len() > self.max_window_size {
            panic!(
                "Got frame of {} samples, max window size is {}",
                samples.len(),
                self.max_window_size
            )
        }
        if samples.len() < 2 || !(sample_rate.is_finite() && sample_rate > 0.0) {
            return None;
        }
        if samples.rms_level() < SILENCE_RMS_THRESHOLD {
            return None;
        }

        let window = trim(samples);
        let window_size = window.len();

        let fft_size = autocorr_fft_size(window_size, window_size);
        autocorr_fft(
            window,
            &mut self.corr[..fft_size],
            &mut self.scratch[..fft_size],
            window_size,
        );
        let corr = &self.corr[..window_size];

        // Step past the zero lag peak and its initial falloff so the
        // search below cannot lock onto the trivial maximum at lag 0.
        let mut cursor = 0;
        while cursor + 1 < window_size && corr[cursor] > corr[cursor + 1] {
            cursor += 1;
        }
        if cursor + 1 >= window_size {
            // Monotonically decaying correlation, no periodicity.
            return None;
        }

        let mut max_value = f32::NEG_INFINITY;
        let mut max_lag = 0;
        for (lag, &value) in corr.iter().enumerate().skip(cursor) {
            if value > max_value {
                max_value = value;
                max_lag = lag;
            }
        }
        if max_lag == 0 {
            return None;
        }

        Some(sample_rate / (max_lag as f32))
    }
}

/// Clips the head and the tail of a frame at the first low amplitude
/// sample from each end, reducing the influence of partial cycles on
/// the correlation. Best effort: if trimming would leave fewer than two
/// samples the frame is returned untouched.
fn trim(samples: &[f32]) -> &[f32] {
    let size = samples.len();
    let mut start = 0;
    let mut end = size - 1;
    for (index, sample) in samples.iter().take(size / 2).enumerate() {
        if sample.abs() < TRIM_AMPLITUDE_THRESHOLD {
            start = index;
            break;
        }
    }
    for offset in 1..size / 2 {
        if samples[size - offset].abs() < TRIM_AMPLITUDE_THRESHOLD {
            end = size - offset;
            break;
        }
    }
    if end <= start + 1 {
        return samples;
    }
    &samples[start..end]
}

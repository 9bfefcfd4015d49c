use super::fft::real_fft_in_place;

/// Returns the FFT length needed to compute the autocorrelation of a
/// buffer of a given size without circular convolution artifacts.
///
/// # Arguments
///
/// * `buffer_size` - The size of the input buffer.
/// * `lag_count` - The number of autocorrelation lags to compute.
pub fn autocorr_fft_size(buffer_size: usize, lag_count: usize) -> usize {
    assert!(lag_count <= buffer_size);
    let min_length = buffer_size + lag_count - 1;
    // 8 is the smallest real FFT size microfft provides.
    let mut result: usize = 8;
    while result < min_length {
        result <<= 1;
    }
    result
}

/// Computes the autocorrelation `c[lag] = Σ buffer[j] * buffer[j + lag]`
/// of a buffer using a zero padded real FFT.
///
/// The first `lag_count` elements of `result` hold the autocorrelation
/// when the call returns.
///
/// # Arguments
///
/// * `buffer` - The input buffer.
/// * `result` - Receives the result. Must have length [autocorr_fft_size].
/// * `scratch` - Temporary storage, at least as long as `result`.
/// * `lag_count` - The number of lags to compute.
pub fn autocorr_fft(buffer: &[f32], result: &mut [f32], scratch: &mut [f32], lag_count: usize) {
    let fft_size = autocorr_fft_size(buffer.len(), lag_count);
    assert!(
        result.len() == fft_size,
        "Got autocorr fft buffer of length {}, expected {}",
        result.len(),
        fft_size
    );
    assert!(
        scratch.len() >= result.len(),
        "Autocorr fft scratch buffer must not be shorter than the result buffer"
    );

    // Zero padded FFT input signal
    result[..buffer.len()].copy_from_slice(buffer);
    result[buffer.len()..].fill(0.0);

    let fft = real_fft_in_place(result);

    // Power spectral density, expanded to a full length real signal.
    // The Nyquist bin is packed into the imaginary part of bin 0.
    scratch[0] = fft[0].re * fft[0].re;
    let scratch_length = scratch.len();
    for (index, bin) in fft.iter().skip(1).enumerate() {
        let norm_sq = bin.norm_sqr();
        scratch[index + 1] = norm_sq;
        scratch[scratch_length - index - 1] = norm_sq;
    }
    scratch[fft.len()] = fft[0].im * fft[0].im;

    // The PSD is real and even, so a forward FFT acts as the inverse
    // FFT up to a scaling factor.
    let ifft = real_fft_in_place(&mut scratch[..]);
    let scale = 1.0 / (fft_size as f32);
    for (value, bin) in result.iter_mut().zip(ifft.iter()) {
        *value = scale * bin.re;
    }
}

/// Computes the autocorrelation of a buffer by direct summation.
/// Slow. Used as a reference in tests.
pub fn autocorr_conv(buffer: &[f32], result: &mut [f32]) {
    assert!(
        result.len() <= buffer.len(),
        "Result vector must not be longer than the buffer"
    );

    for (tau, value) in result.iter_mut().enumerate() {
        let mut sum: f32 = 0.0;
        for j in 0..buffer.len() - tau {
            sum += buffer[j] * buffer[j + tau];
        }
        *value = sum;
    }
}

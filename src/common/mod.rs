//! Shared DSP utilities.

mod autocorr;
mod fft;
mod levels;

pub use autocorr::{autocorr_conv, autocorr_fft, autocorr_fft_size};
pub use fft::real_fft_in_place;
pub use levels::LevelExt;

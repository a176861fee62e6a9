//! Engine setup: the immutable per-configuration record every effect reads
//!
//! Holds FFT size, overlap factor, sample rate and window type, and
//! provides the unit conversions effects need (Hz/bins, ms/steps).

use crate::error::SetupError;
use crate::storage::StorageFactors;
use crate::window::Window;

/// Smallest supported FFT size
pub const MIN_FFT_SIZE: u16 = 128;
/// Largest supported FFT size
pub const MAX_FFT_SIZE: u16 = 8192;
/// Largest supported overlap factor
pub const MAX_OVERLAP_FACTOR: u8 = 16;

/// Validated engine configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setup {
    fft_size: u16,
    overlap_factor: u8,
    sample_rate: u32,
    window: Window,
}

impl Setup {
    /// Validate and build a setup
    pub fn new(
        fft_size: u32,
        overlap_factor: u32,
        sample_rate: u32,
        window: Window,
    ) -> Result<Self, SetupError> {
        if !fft_size.is_power_of_two()
            || fft_size < u32::from(MIN_FFT_SIZE)
            || fft_size > u32::from(MAX_FFT_SIZE)
        {
            return Err(SetupError::InvalidFftSize(fft_size));
        }
        if !overlap_factor.is_power_of_two()
            || overlap_factor > u32::from(MAX_OVERLAP_FACTOR)
            || overlap_factor > fft_size
        {
            return Err(SetupError::InvalidOverlapFactor {
                overlap: overlap_factor,
                fft_size,
            });
        }
        if sample_rate == 0 {
            return Err(SetupError::InvalidSampleRate);
        }

        Ok(Self {
            fft_size: fft_size as u16,
            overlap_factor: overlap_factor as u8,
            sample_rate,
            window,
        })
    }

    #[inline]
    pub fn fft_size(&self) -> u16 {
        self.fft_size
    }

    /// Analysis frame length in samples (equal to the FFT size)
    #[inline]
    pub fn frame_size(&self) -> u16 {
        self.fft_size
    }

    #[inline]
    pub fn overlap_factor(&self) -> u8 {
        self.overlap_factor
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn window(&self) -> Window {
        self.window
    }

    /// Hop size: samples between successive frames
    #[inline]
    pub fn step_size(&self) -> u16 {
        self.fft_size / u16::from(self.overlap_factor)
    }

    /// Number of bins of a real FFT, DC and Nyquist included
    #[inline]
    pub fn number_of_bins(&self) -> u16 {
        self.fft_size / 2 + 1
    }

    /// Width of one bin in Hz
    #[inline]
    pub fn frequency_range_per_bin(&self) -> f64 {
        f64::from(self.sample_rate) / f64::from(self.fft_size)
    }

    /// Frame duration in seconds
    pub fn frame_time(&self) -> f32 {
        f32::from(self.fft_size) / self.sample_rate as f32
    }

    /// Hop duration in seconds
    pub fn step_time(&self) -> f32 {
        f32::from(self.step_size()) / self.sample_rate as f32
    }

    pub fn steps_per_second(&self) -> f32 {
        self.sample_rate as f32 / f32::from(self.step_size())
    }

    /// Number of hops needed to cover `milliseconds`, rounded up
    pub fn milliseconds_to_steps(&self, milliseconds: f32) -> u16 {
        let steps = f64::from(milliseconds) * f64::from(self.sample_rate)
            / f64::from(self.step_size())
            / 1000.0;
        steps.max(0.0).ceil().min(f64::from(u16::MAX)) as u16
    }

    /// Number of hops needed to cover `seconds`, rounded up
    pub fn seconds_to_steps(&self, seconds: f32) -> u16 {
        self.milliseconds_to_steps(seconds * 1000.0)
    }

    /// Nearest bin for a frequency in Hz, never past the Nyquist bin
    pub fn frequency_in_hz_to_bin(&self, frequency: f32) -> u16 {
        let bin = (f64::from(frequency.max(0.0)) / self.frequency_range_per_bin()).round();
        bin.min(f64::from(self.fft_size / 2)) as u16
    }

    /// Bin for a frequency normalised to the Nyquist frequency (0..=1)
    pub fn normalised_frequency_to_bin(&self, normalised_frequency: f32) -> u16 {
        debug_assert!(
            (0.0..=1.0).contains(&normalised_frequency),
            "frequency out of range"
        );
        let normalised_frequency = normalised_frequency.clamp(0.0, 1.0);
        (normalised_frequency * f32::from(self.fft_size) / 2.0).round() as u16
    }

    pub fn normalised_frequency_to_hz(&self, normalised_frequency: f32) -> f32 {
        normalised_frequency * self.sample_rate as f32 / 2.0
    }

    /// Processing latency for delay compensation: one full frame
    #[inline]
    pub fn latency_in_samples(&self) -> u16 {
        self.fft_size
    }

    /// Factors that drive channel-state storage sizing
    pub fn storage_factors(&self, number_of_channels: u8) -> StorageFactors {
        StorageFactors {
            fft_size: self.fft_size,
            overlap_factor: self.overlap_factor,
            number_of_channels,
            sample_rate: self.sample_rate,
        }
    }
}

use std::f64::consts::TAU;

use swx_engine::Setup;
use tracing::trace;

/// Frequency-domain constants derived from the engine setup
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BaseParameters {
    /// Width of one bin in Hz
    freq_per_bin: f32,
    /// Expected phase advance per frame of bin 1, in radians
    expct_rate: f32,
    /// Radians of per-frame phase deviation to Hz; kept in double
    /// precision, the float product cancels badly in high bins
    deviation_factor: f64,
    inv_deviation_factor: f32,
}

impl BaseParameters {
    pub fn new(setup: &Setup) -> Self {
        let mut parameters = Self::default();
        parameters.setup(setup);
        parameters
    }

    /// Recompute every constant from `setup`
    pub fn setup(&mut self, setup: &Setup) {
        let fft_size = f64::from(setup.fft_size());
        let step_size = f64::from(setup.step_size());
        let freq_per_bin = setup.frequency_range_per_bin();

        self.freq_per_bin = freq_per_bin as f32;
        self.expct_rate = (TAU * step_size / fft_size) as f32;
        self.deviation_factor = freq_per_bin * f64::from(setup.overlap_factor()) / TAU;
        self.inv_deviation_factor = (1.0 / self.deviation_factor) as f32;

        trace!(
            freq_per_bin = self.freq_per_bin,
            expct_rate = self.expct_rate,
            deviation_factor = self.deviation_factor,
            "Phase vocoder constants"
        );
    }

    #[inline]
    pub fn freq_per_bin(&self) -> f32 {
        self.freq_per_bin
    }

    #[inline]
    pub fn expct_rate(&self) -> f32 {
        self.expct_rate
    }

    #[inline]
    pub fn deviation_factor(&self) -> f64 {
        self.deviation_factor
    }

    #[inline]
    pub fn inv_deviation_factor(&self) -> f32 {
        self.inv_deviation_factor
    }
}

/// Pitch-scale ratio, 1.0 leaves the pitch alone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchShiftParameters {
    scale: f32,
}

impl Default for PitchShiftParameters {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl PitchShiftParameters {
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Set the ratio, clamped so at least one bin survives the remap
    ///
    /// Scales at or below `1 / number_of_bins` (zero, negative and NaN
    /// included) would squeeze the whole spectrum into DC; scales past
    /// `number_of_bins` push it beyond Nyquist.
    pub fn set_scaling_factor(&mut self, new_scale: f32, number_of_bins: u16) {
        let bins = f32::from(number_of_bins.max(1));
        self.scale = new_scale.max(1.0 / bins + f32::EPSILON).min(bins);
    }

    /// True when the scale is 1 and shifting would be an identity
    #[inline]
    pub fn skip_processing(&self) -> bool {
        (self.scale - 1.0).abs() <= f32::EPSILON
    }
}

/// Equal-tempered ratio for `semitones`
pub fn scale_from_semitones(semitones: f32) -> f32 {
    (semitones / 12.0).exp2()
}

/// Equal-tempered ratio for `semitones` plus `cents`
pub fn scale_from_semitones_and_cents(semitones: f32, cents: i8) -> f32 {
    scale_from_semitones(semitones + f32::from(cents) / 100.0)
}

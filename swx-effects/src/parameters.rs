//! Parameters shared by every effect
//!
//! Bypass, output gain, wet/dry mix and the Start/Stop frequencies that
//! define the bins an effect works on.

use swx_engine::{IndexRange, Setup};

/// Static description of a user-facing parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterInfo {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub unit: &'static str,
}

impl ParameterInfo {
    /// Clamp `value` into the parameter's range
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

pub const BYPASS: ParameterInfo = ParameterInfo {
    name: "Bypass",
    min: 0.0,
    max: 1.0,
    default: 0.0,
    unit: "",
};

pub const GAIN: ParameterInfo = ParameterInfo {
    name: "Gain",
    min: -20.0,
    max: 20.0,
    default: 0.0,
    unit: " dB",
};

pub const WET: ParameterInfo = ParameterInfo {
    name: "Wet",
    min: 0.0,
    max: 100.0,
    default: 100.0,
    unit: " %",
};

pub const START_FREQUENCY: ParameterInfo = ParameterInfo {
    name: "Start frequency",
    min: 0.0,
    max: 1.0,
    default: 0.0,
    unit: "",
};

pub const STOP_FREQUENCY: ParameterInfo = ParameterInfo {
    name: "Stop frequency",
    min: 0.0,
    max: 1.0,
    default: 1.0,
    unit: "",
};

/// All base parameters in presentation order
pub const BASE_PARAMETERS: [ParameterInfo; 5] =
    [BYPASS, GAIN, WET, START_FREQUENCY, STOP_FREQUENCY];

/// Current values of the base parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseEffectParameters {
    bypass: bool,
    gain_db: f32,
    wet: f32,
    start_frequency: f32,
    stop_frequency: f32,
}

impl Default for BaseEffectParameters {
    fn default() -> Self {
        Self {
            bypass: false,
            gain_db: GAIN.default,
            wet: WET.default,
            start_frequency: START_FREQUENCY.default,
            stop_frequency: STOP_FREQUENCY.default,
        }
    }
}

impl BaseEffectParameters {
    #[inline]
    pub fn bypass(&self) -> bool {
        self.bypass
    }

    #[inline]
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    #[inline]
    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    /// Set output gain in dB (-20 to +20)
    #[inline]
    pub fn set_gain_db(&mut self, gain_db: f32) {
        self.gain_db = GAIN.clamp(gain_db);
    }

    /// Linear output gain
    pub fn gain(&self) -> f32 {
        10.0f32.powf(self.gain_db / 20.0)
    }

    /// Wet amount in percent
    #[inline]
    pub fn wet(&self) -> f32 {
        self.wet
    }

    /// Set wet amount (0 to 100 %)
    #[inline]
    pub fn set_wet(&mut self, wet: f32) {
        self.wet = WET.clamp(wet);
    }

    /// Wet amount as 0.0 - 1.0
    #[inline]
    pub fn wet_ratio(&self) -> f32 {
        self.wet / 100.0
    }

    #[inline]
    pub fn start_frequency(&self) -> f32 {
        self.start_frequency
    }

    /// Set start frequency, normalised to Nyquist
    #[inline]
    pub fn set_start_frequency(&mut self, frequency: f32) {
        self.start_frequency = START_FREQUENCY.clamp(frequency);
    }

    #[inline]
    pub fn stop_frequency(&self) -> f32 {
        self.stop_frequency
    }

    /// Set stop frequency, normalised to Nyquist
    #[inline]
    pub fn set_stop_frequency(&mut self, frequency: f32) {
        self.stop_frequency = STOP_FREQUENCY.clamp(frequency);
    }

    /// Bins between the start and stop frequencies, both included
    ///
    /// A start above the stop frequency collapses onto the stop bin.
    pub fn working_range(&self, setup: &Setup) -> IndexRange {
        let first = setup.normalised_frequency_to_bin(self.start_frequency.min(self.stop_frequency));
        let last = setup.normalised_frequency_to_bin(self.stop_frequency);
        IndexRange::inclusive(first, last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swx_engine::Window;

    fn setup() -> Setup {
        Setup::new(1024, 4, 44100, Window::Hann).unwrap()
    }

    #[test]
    fn test_defaults_match_table() {
        let params = BaseEffectParameters::default();
        assert!(!params.bypass());
        assert_eq!(params.gain_db(), GAIN.default);
        assert_eq!(params.wet(), 100.0);
        assert_eq!(BASE_PARAMETERS.len(), 5);
        assert_eq!(BASE_PARAMETERS[2].name, "Wet");
    }

    #[test]
    fn test_setters_clamp() {
        let mut params = BaseEffectParameters::default();
        params.set_gain_db(40.0);
        params.set_wet(-5.0);
        params.set_start_frequency(2.0);
        assert_eq!(params.gain_db(), 20.0);
        assert_eq!(params.wet(), 0.0);
        assert_eq!(params.start_frequency(), 1.0);
    }

    #[test]
    fn test_gain_is_linear() {
        let mut params = BaseEffectParameters::default();
        assert!((params.gain() - 1.0).abs() < 1e-6);
        params.set_gain_db(20.0);
        assert!((params.gain() - 10.0).abs() < 1e-4);
        params.set_wet(50.0);
        assert!((params.wet_ratio() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_default_working_range_covers_all_bins() {
        let range = BaseEffectParameters::default().working_range(&setup());
        assert_eq!(range, IndexRange::new(0, 513));
    }

    #[test]
    fn test_working_range_from_frequencies() {
        let mut params = BaseEffectParameters::default();
        params.set_start_frequency(0.25);
        params.set_stop_frequency(0.5);
        assert_eq!(params.working_range(&setup()), IndexRange::new(128, 257));

        // inverted start/stop collapses to the stop bin
        params.set_start_frequency(0.75);
        assert_eq!(params.working_range(&setup()), IndexRange::new(256, 257));
    }
}

use swx_engine::{ChannelDataAmPh, Storage, StorageError, StorageFactors};

use super::{wrap_phase, BaseParameters};
use crate::channel_state::{ChannelState, HalfFftBuffer};

/// Analysis history of one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisChannelState {
    last_phases: HalfFftBuffer,
    /// Pitch scale used for the previous frame
    pub previous_scale_factor: f32,
    /// Treat the next frame as the first one, with no phase to diff against
    pub reinitialize_phases: bool,
}

impl Default for AnalysisChannelState {
    fn default() -> Self {
        Self {
            last_phases: HalfFftBuffer::default(),
            previous_scale_factor: 1.0,
            reinitialize_phases: true,
        }
    }
}

impl AnalysisChannelState {
    /// Phases of the previous frame
    pub fn last_phases<'a>(&self, storage: &'a [f32]) -> &'a [f32] {
        self.last_phases.get(storage)
    }
}

impl ChannelState for AnalysisChannelState {
    fn required_storage(factors: &StorageFactors) -> usize {
        HalfFftBuffer::required_storage(factors)
    }

    fn resize(
        &mut self,
        factors: &StorageFactors,
        storage: &mut Storage,
    ) -> Result<(), StorageError> {
        self.last_phases.resize(factors, storage)
    }

    fn reset(&mut self, storage: &mut [f32]) {
        self.last_phases.reset(storage);
        self.previous_scale_factor = 1.0;
        self.reinitialize_phases = true;
    }
}

/// Replace each bin's phase with its true frequency in Hz
///
/// The phase advance since the previous frame, minus the advance expected
/// for the bin centre, is wrapped into (-pi, pi] and added back to the
/// expected advance. DC is left untouched.
pub fn analysis(
    state: &mut AnalysisChannelState,
    storage: &mut [f32],
    data: &mut ChannelDataAmPh<'_>,
    parameters: &BaseParameters,
) {
    let last_phases = state.last_phases.get_mut(storage);
    let (_, phases) = data.full_mut();
    debug_assert_eq!(last_phases.len(), phases.len());

    if state.reinitialize_phases {
        // no previous frame: every bin sits exactly on its centre
        let freq_per_bin = parameters.freq_per_bin();
        for (bin, (phase, last)) in phases.iter_mut().zip(last_phases.iter_mut()).enumerate().skip(1) {
            *last = *phase;
            *phase = bin as f32 * freq_per_bin;
        }
        state.reinitialize_phases = false;
        return;
    }

    let expct_rate = parameters.expct_rate();
    let deviation_factor = parameters.deviation_factor();
    for (bin, (phase, last)) in phases.iter_mut().zip(last_phases.iter_mut()).enumerate().skip(1) {
        let expected = bin as f32 * expct_rate;
        let deviation = wrap_phase(*phase - *last - expected);
        *last = *phase;
        *phase = (f64::from(expected + deviation) * deviation_factor) as f32;
    }
}

use swx_engine::{ChannelDataAmPh, Storage, StorageError, StorageFactors};

use super::{wrap_phase, BaseParameters};
use crate::channel_state::{ChannelState, HalfFftBuffer};

/// Synthesis history of one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisChannelState {
    phase_sums: HalfFftBuffer,
    /// Last bin wrapped back into (-pi, pi] by the rotating reduction
    pub bin_to_reduce: u16,
}

impl SynthesisChannelState {
    /// Accumulated output phases
    pub fn phase_sums<'a>(&self, storage: &'a [f32]) -> &'a [f32] {
        self.phase_sums.get(storage)
    }

    /// Seed the accumulators so the next synthesized frame carries
    /// `input_phases * scale`
    ///
    /// Pairs with an analysis frame that has `reinitialize_phases` set,
    /// which reports every bin at its centre frequency.
    pub fn reinitialize(
        &mut self,
        storage: &mut [f32],
        input_phases: &[f32],
        scale: f32,
        parameters: &BaseParameters,
    ) {
        let phase_sums = self.phase_sums.get_mut(storage);
        debug_assert_eq!(phase_sums.len(), input_phases.len());

        let expct_rate = parameters.expct_rate();
        for (bin, (sum, &phase)) in phase_sums.iter_mut().zip(input_phases).enumerate().skip(1) {
            *sum = wrap_phase(phase * scale - bin as f32 * expct_rate);
        }
    }
}

impl ChannelState for SynthesisChannelState {
    fn required_storage(factors: &StorageFactors) -> usize {
        HalfFftBuffer::required_storage(factors)
    }

    fn resize(
        &mut self,
        factors: &StorageFactors,
        storage: &mut Storage,
    ) -> Result<(), StorageError> {
        self.phase_sums.resize(factors, storage)
    }

    fn reset(&mut self, storage: &mut [f32]) {
        self.phase_sums.reset(storage);
        self.bin_to_reduce = 0;
    }
}

/// Turn per-bin frequencies (Hz) back into output phases
///
/// Each bin's accumulator advances by the phase that frequency rotates
/// through in one hop. A sixteenth of the accumulators is wrapped per
/// frame, cycling through all bins, to keep them bounded. The Nyquist
/// phase is forced to zero and DC is left untouched.
pub fn synthesis(
    state: &mut SynthesisChannelState,
    storage: &mut [f32],
    data: &mut ChannelDataAmPh<'_>,
    parameters: &BaseParameters,
) {
    let phase_sums = state.phase_sums.get_mut(storage);
    let (_, phases) = data.full_mut();
    debug_assert_eq!(phase_sums.len(), phases.len());
    if phases.len() < 2 {
        return;
    }

    // bins after DC, Nyquist included
    let number_of_bins = phases.len() - 1;
    let freq_per_bin = parameters.freq_per_bin();
    let inv_deviation_factor = parameters.inv_deviation_factor();
    let expct_rate = parameters.expct_rate();

    for bin in 1..number_of_bins {
        let k = bin as f32;
        phase_sums[bin] += (phases[bin] - k * freq_per_bin) * inv_deviation_factor + k * expct_rate;
        phases[bin] = phase_sums[bin];
    }

    let bins_to_reduce = (number_of_bins / 16).max(1);
    let start = usize::from(state.bin_to_reduce) + 1;
    let end = (start + bins_to_reduce).min(phase_sums.len());
    for sum in &mut phase_sums[start..end] {
        *sum = wrap_phase(*sum);
    }
    state.bin_to_reduce = ((start + bins_to_reduce - 1) % number_of_bins) as u16;

    phases[number_of_bins] = 0.0;
}

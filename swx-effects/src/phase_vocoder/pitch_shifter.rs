use swx_engine::{
    align, ChannelDataAmPh, IndexRange, Setup, Storage, StorageError, StorageFactors,
};
use tracing::debug;

use super::{
    analysis, pitch_shift_and_scale, scale_from_semitones_and_cents, synthesis,
    AnalysisChannelState, BaseParameters, PitchShiftParameters, SynthesisChannelState,
};
use crate::channel_state::ChannelState;
use crate::effect::{PhaseVocoderEffect, SpectralEffect};

/// Largest distance from a whole number still treated as a whole ratio
const WHOLE_RATIO_TOLERANCE: f32 = 1e-4;

/// True for 2, 3, ... and 1/2, 1/3, ...
fn is_whole_ratio(scale: f32) -> bool {
    let ratio = if scale >= 1.0 { scale } else { scale.recip() };
    (ratio - ratio.round()).abs() <= WHOLE_RATIO_TOLERANCE
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PitchShifterChannelState {
    pub analysis: AnalysisChannelState,
    pub synthesis: SynthesisChannelState,
}

impl ChannelState for PitchShifterChannelState {
    fn required_storage(factors: &StorageFactors) -> usize {
        align(AnalysisChannelState::required_storage(factors))
            + align(SynthesisChannelState::required_storage(factors))
    }

    fn resize(
        &mut self,
        factors: &StorageFactors,
        storage: &mut Storage,
    ) -> Result<(), StorageError> {
        self.analysis.resize(factors, storage)?;
        self.synthesis.resize(factors, storage)
    }

    fn reset(&mut self, storage: &mut [f32]) {
        self.analysis.reset(storage);
        self.synthesis.reset(storage);
    }
}

/// Complete pitch shifter: analysis, bin remapping and synthesis
///
/// Phases are reinitialised after a reset and whenever the scale moves to a
/// whole ratio (octaves, twelfths, ...), where the shifted partials line up
/// with bin centres again.
#[derive(Debug, Clone)]
pub struct PitchShifter {
    base: BaseParameters,
    pitch: PitchShiftParameters,
    requested_scale: f32,
    number_of_bins: u16,
}

impl Default for PitchShifter {
    fn default() -> Self {
        Self {
            base: BaseParameters::default(),
            pitch: PitchShiftParameters::default(),
            requested_scale: 1.0,
            number_of_bins: 0,
        }
    }
}

impl PitchShifter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective scale, after clamping to the current bin count
    pub fn scale(&self) -> f32 {
        self.pitch.scale()
    }

    pub fn base_parameters(&self) -> &BaseParameters {
        &self.base
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.requested_scale = scale;
        if self.number_of_bins > 0 {
            self.pitch.set_scaling_factor(scale, self.number_of_bins);
        }
    }

    pub fn set_semitones(&mut self, semitones: f32, cents: i8) {
        self.set_scale(scale_from_semitones_and_cents(semitones, cents));
    }
}

impl SpectralEffect for PitchShifter {
    type ChannelState = PitchShifterChannelState;

    fn setup(&mut self, _working_range: IndexRange, setup: &Setup) {
        self.base.setup(setup);
        self.number_of_bins = setup.number_of_bins();
        self.pitch
            .set_scaling_factor(self.requested_scale, self.number_of_bins);
        debug!(
            scale = self.pitch.scale(),
            bins = self.number_of_bins,
            "Pitch shifter configured"
        );
    }

    fn process(
        &self,
        state: &mut Self::ChannelState,
        storage: &mut [f32],
        data: &mut ChannelDataAmPh<'_>,
    ) {
        let scale = self.pitch.scale();
        if scale != state.analysis.previous_scale_factor && is_whole_ratio(scale) {
            state.analysis.reinitialize_phases = true;
        }
        if state.analysis.reinitialize_phases {
            state
                .synthesis
                .reinitialize(storage, data.full_phases(), scale, &self.base);
        }
        state.analysis.previous_scale_factor = scale;

        analysis(&mut state.analysis, storage, data, &self.base);
        pitch_shift_and_scale(data, &self.pitch);
        synthesis(&mut state.synthesis, storage, data, &self.base);
    }
}

/// Pitch shifting stage alone, for use inside a chain that already runs
/// analysis and synthesis
#[derive(Debug, Clone)]
pub struct PvPitchShifter {
    pitch: PitchShiftParameters,
    requested_scale: f32,
    number_of_bins: u16,
}

impl Default for PvPitchShifter {
    fn default() -> Self {
        Self {
            pitch: PitchShiftParameters::default(),
            requested_scale: 1.0,
            number_of_bins: 0,
        }
    }
}

impl PvPitchShifter {
    pub fn scale(&self) -> f32 {
        self.pitch.scale()
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.requested_scale = scale;
        if self.number_of_bins > 0 {
            self.pitch.set_scaling_factor(scale, self.number_of_bins);
        }
    }
}

impl PhaseVocoderEffect for PvPitchShifter {
    type ChannelState = ();

    fn setup(&mut self, _working_range: IndexRange, setup: &Setup) {
        self.number_of_bins = setup.number_of_bins();
        self.pitch
            .set_scaling_factor(self.requested_scale, self.number_of_bins);
    }

    fn process(&self, _: &mut (), _: &mut [f32], data: &mut ChannelDataAmPh<'_>) {
        pitch_shift_and_scale(data, &self.pitch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_state::ChannelStates;
    use crate::effect::StandaloneEffect;
    use crate::phase_vocoder::wrap_phase;
    use swx_engine::Window;

    fn setup() -> Setup {
        Setup::new(256, 4, 44100, Window::Hann).unwrap()
    }

    fn full_range(setup: &Setup) -> IndexRange {
        IndexRange::new(0, setup.number_of_bins())
    }

    #[test]
    fn test_whole_ratios() {
        assert!(is_whole_ratio(1.0));
        assert!(is_whole_ratio(2.0));
        assert!(is_whole_ratio(0.5));
        assert!(is_whole_ratio(1.0 / 3.0));
        assert!(!is_whole_ratio(1.5));
        assert!(!is_whole_ratio(0.75));
    }

    #[test]
    fn test_scale_is_applied_on_setup() {
        let setup = setup();
        let mut shifter = PitchShifter::new();
        shifter.set_semitones(12.0, 0);
        // not clamped against a bin count yet
        assert_eq!(shifter.scale(), 1.0);

        shifter.setup(full_range(&setup), &setup);
        assert!((shifter.scale() - 2.0).abs() < 1e-6);

        shifter.set_scale(1e6);
        assert_eq!(shifter.scale(), f32::from(setup.number_of_bins()));
    }

    #[test]
    fn test_scale_change_to_whole_ratio_reinitialises() {
        let setup = setup();
        let mut shifter = PitchShifter::new();
        shifter.set_scale(1.5);
        shifter.setup(full_range(&setup), &setup);

        let mut states = ChannelStates::<PitchShifterChannelState>::new();
        states.configure(setup.storage_factors(1)).unwrap();
        let (state, region) = states.channel_mut(0).unwrap();

        let bins = usize::from(setup.number_of_bins());
        let mut amps = vec![1.0; bins];
        for frame in 0..3 {
            let mut phases: Vec<f32> = (0..bins).map(|bin| (bin * frame) as f32 * 0.1).collect();
            shifter.process(state, region, &mut ChannelDataAmPh::full(&mut amps, &mut phases));
        }
        assert!(!state.analysis.reinitialize_phases);
        assert_eq!(state.analysis.previous_scale_factor, 1.5);

        // 1.5 -> 2.0 restarts from the new input phases
        shifter.set_scale(2.0);
        let input: Vec<f32> = (0..bins).map(|bin| bin as f32 * 0.01).collect();
        let mut phases = input.clone();
        shifter.process(state, region, &mut ChannelDataAmPh::full(&mut amps, &mut phases));
        assert_eq!(state.analysis.previous_scale_factor, 2.0);
        assert_eq!(&state.analysis.last_phases(region)[1..], &input[1..]);
        // moved bins sit on their centres, so output is the seeded phase
        for bin in (2..bins - 1).step_by(2) {
            let expected = input[bin] * 2.0;
            assert!(
                wrap_phase(phases[bin] - expected).abs() < 1e-3,
                "bin {} got {} expected {}",
                bin,
                phases[bin],
                expected
            );
        }
    }

    #[test]
    fn test_repeated_scale_does_not_reinitialise() {
        let setup = setup();
        let mut shifter = PitchShifter::new();
        shifter.set_scale(2.0);
        shifter.setup(full_range(&setup), &setup);

        let mut states = ChannelStates::<PitchShifterChannelState>::new();
        states.configure(setup.storage_factors(1)).unwrap();
        let (state, region) = states.channel_mut(0).unwrap();

        let bins = usize::from(setup.number_of_bins());
        let mut amps = vec![1.0; bins];
        let mut phases = vec![0.0; bins];
        shifter.process(state, region, &mut ChannelDataAmPh::full(&mut amps, &mut phases));
        assert!(!state.analysis.reinitialize_phases);

        let mut phases = vec![0.3; bins];
        shifter.process(state, region, &mut ChannelDataAmPh::full(&mut amps, &mut phases));
        assert!(!state.analysis.reinitialize_phases);
        assert!(state.analysis.last_phases(region)[1..].iter().all(|&phase| phase == 0.3));
    }

    type StandaloneState = <StandaloneEffect<PvPitchShifter> as SpectralEffect>::ChannelState;

    #[test]
    fn test_standalone_pv_pitch_shifter_moves_amplitudes() {
        let setup = setup();
        let mut effect = StandaloneEffect::new(PvPitchShifter::default());
        effect.effect_mut().set_scale(2.0);
        effect.setup(full_range(&setup), &setup);
        assert_eq!(effect.effect().scale(), 2.0);

        let mut states = ChannelStates::<StandaloneState>::new();
        states.configure(setup.storage_factors(1)).unwrap();
        let (state, region) = states.channel_mut(0).unwrap();

        let bins = usize::from(setup.number_of_bins());
        let mut amps = vec![0.0; bins];
        amps[10] = 1.0;
        let mut phases = vec![0.0; bins];
        effect.process(state, region, &mut ChannelDataAmPh::full(&mut amps, &mut phases));

        assert_eq!(amps[20], 1.0);
        assert_eq!(amps[10], 0.0);
    }
}

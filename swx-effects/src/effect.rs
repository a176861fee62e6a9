//! Effect contract
//!
//! An effect is set up whenever the engine configuration or its parameters
//! change and then processes one frame per channel. Per-channel memory lives
//! in its [`ChannelState`], handed in together with that channel's storage
//! region.

use swx_engine::{ChannelDataAmPh, IndexRange, Setup};

use crate::channel_state::ChannelState;
use crate::phase_vocoder::{
    analysis, synthesis, AnalysisChannelState, BaseParameters, SynthesisChannelState,
};

/// Effect working on plain amplitude/phase frames
pub trait SpectralEffect {
    type ChannelState: ChannelState + Default;

    /// Recompute derived values; never called concurrently with `process`
    fn setup(&mut self, working_range: IndexRange, setup: &Setup);

    /// Process one frame of one channel
    fn process(
        &self,
        state: &mut Self::ChannelState,
        storage: &mut [f32],
        data: &mut ChannelDataAmPh<'_>,
    );
}

/// Effect working on analysed frames: amplitudes and true frequencies (Hz)
/// in the phase slots
///
/// Run standalone through [`StandaloneEffect`], which wraps it in
/// analysis and synthesis.
pub trait PhaseVocoderEffect {
    type ChannelState: ChannelState + Default;

    fn setup(&mut self, working_range: IndexRange, setup: &Setup);

    fn process(
        &self,
        state: &mut Self::ChannelState,
        storage: &mut [f32],
        data: &mut ChannelDataAmPh<'_>,
    );
}

/// A [`PhaseVocoderEffect`] between analysis and synthesis
#[derive(Debug, Clone, Default)]
pub struct StandaloneEffect<E> {
    effect: E,
    parameters: BaseParameters,
}

impl<E> StandaloneEffect<E> {
    pub fn new(effect: E) -> Self {
        Self {
            effect,
            parameters: BaseParameters::default(),
        }
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    /// Parameter changes need a following `setup`
    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    pub fn base_parameters(&self) -> &BaseParameters {
        &self.parameters
    }
}

impl<E: PhaseVocoderEffect> SpectralEffect for StandaloneEffect<E> {
    type ChannelState = (AnalysisChannelState, E::ChannelState, SynthesisChannelState);

    fn setup(&mut self, working_range: IndexRange, setup: &Setup) {
        self.parameters.setup(setup);
        self.effect.setup(working_range, setup);
    }

    fn process(
        &self,
        state: &mut Self::ChannelState,
        storage: &mut [f32],
        data: &mut ChannelDataAmPh<'_>,
    ) {
        let (analysis_state, effect_state, synthesis_state) = state;
        analysis(analysis_state, storage, data, &self.parameters);
        self.effect.process(effect_state, storage, data);
        synthesis(synthesis_state, storage, data, &self.parameters);
    }
}

//! Effect-side core for SWX frequency-domain effects
//!
//! This crate provides:
//! - ChannelState: per-channel effect memory carved out of a shared arena
//! - History: reversed traversal of a ring of past frames
//! - Phase vocoder: analysis, pitch shifting and synthesis
//! - Effect contract: spectral and phase-vocoder effects, base parameters

mod channel_state;
mod counter;
mod effect;
mod history;
mod parameters;
pub mod phase_vocoder;

pub use channel_state::{ChannelState, ChannelStates, HalfFftBuffer};
pub use counter::ModuloCounter;
pub use effect::{PhaseVocoderEffect, SpectralEffect, StandaloneEffect};
pub use history::{
    history_storage_bytes, HistoryBuffer, HistoryData, ReversedHistoryBufferState,
    ReversedHistoryChannelState,
};
pub use parameters::{BaseEffectParameters, ParameterInfo, BASE_PARAMETERS};
pub use phase_vocoder::{PitchShifter, PitchShifterChannelState};
pub use swx_engine::IndexRange;

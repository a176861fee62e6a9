//! Phase-vocoder analysis, pitch shifting and synthesis
//!
//! Per frame and channel the order is fixed:
//! 1. [`analysis`] replaces each bin's phase with its true frequency (Hz)
//! 2. effect logic works on amplitudes + frequencies, e.g.
//!    [`pitch_shift_and_scale`]
//! 3. [`synthesis`] integrates the frequencies back into output phases
//!
//! Phase deviations are wrapped into (-pi, pi] everywhere.

mod analysis;
mod parameters;
mod pitch_shift;
mod pitch_shifter;
mod synthesis;

use std::f32::consts::{PI, TAU};

pub use analysis::{analysis, AnalysisChannelState};
pub use parameters::{
    scale_from_semitones, scale_from_semitones_and_cents, BaseParameters, PitchShiftParameters,
};
pub use pitch_shift::pitch_shift_and_scale;
pub use pitch_shifter::{PitchShifter, PitchShifterChannelState, PvPitchShifter};
pub use synthesis::{synthesis, SynthesisChannelState};

/// Wrap a phase into (-pi, pi]
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase - (phase / TAU).round() * TAU;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

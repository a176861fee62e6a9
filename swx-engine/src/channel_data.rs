//! Per-frame amplitude/phase view of one channel

use crate::index_range::IndexRange;

/// One channel's frequency-domain frame, amplitude + phase per bin
///
/// Borrows the frame engine's buffers for the duration of a process call.
/// The full-frame accessors cover every bin; the plain accessors only the
/// working range the effect was set up with.
#[derive(Debug)]
pub struct ChannelDataAmPh<'a> {
    amps: &'a mut [f32],
    phases: &'a mut [f32],
    working_range: IndexRange,
}

impl<'a> ChannelDataAmPh<'a> {
    pub fn new(amps: &'a mut [f32], phases: &'a mut [f32], working_range: IndexRange) -> Self {
        debug_assert_eq!(amps.len(), phases.len());
        debug_assert!(usize::from(working_range.end()) <= amps.len());
        Self {
            amps,
            phases,
            working_range,
        }
    }

    /// View covering every bin
    pub fn full(amps: &'a mut [f32], phases: &'a mut [f32]) -> Self {
        let bins = u16::try_from(amps.len()).unwrap_or(u16::MAX);
        Self::new(amps, phases, IndexRange::new(0, bins))
    }

    /// Number of bins in the full frame
    #[inline]
    pub fn number_of_bins(&self) -> usize {
        self.amps.len()
    }

    #[inline]
    pub fn working_range(&self) -> IndexRange {
        self.working_range
    }

    /// True when the working range reaches the Nyquist bin
    #[inline]
    pub fn includes_nyquist(&self) -> bool {
        usize::from(self.working_range.end()) == self.amps.len()
    }

    pub fn full_amps(&self) -> &[f32] {
        &self.amps[..]
    }

    pub fn full_phases(&self) -> &[f32] {
        &self.phases[..]
    }

    /// Every bin, amplitudes and phases
    pub fn full_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.amps[..], &mut self.phases[..])
    }

    pub fn amps(&self) -> &[f32] {
        &self.amps[self.working_range.as_range()]
    }

    pub fn phases(&self) -> &[f32] {
        &self.phases[self.working_range.as_range()]
    }

    /// Working-range amplitudes and phases
    pub fn working_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        let range = self.working_range.as_range();
        (&mut self.amps[range.clone()], &mut self.phases[range])
    }
}

//! Fixed-duration spectral history with ping-pong traversal
//!
//! Features:
//! - `HistoryBuffer<MS>` sized to hold `MS` milliseconds of analysis frames
//! - Forward/backward (ping-pong) stepping for time-reversed playback
//! - History emulation: until enough frames have been recorded, reads loop
//!   backwards over what is already there instead of exposing silence
//! - Survives live changes of the requested length

use std::mem::size_of;
use std::ops::Range;

use swx_engine::{align_index, BufferRange, Setup, Storage, StorageError, StorageFactors};

use crate::channel_state::ChannelState;

/// Extra floats per frame: the DC/Nyquist pair plus worst-case alignment
/// padding of the amplitude and phase vectors
const fn per_frame_overhead() -> usize {
    let floats_per_vector = 16 / size_of::<f32>();
    2 + 2 * (floats_per_vector - 1)
}

/// Bytes needed to keep `milliseconds` of frames for `factors`
pub fn history_storage_bytes(milliseconds: u16, factors: &StorageFactors) -> usize {
    let frame_size = u64::from(factors.fft_size);
    let samples = (u64::from(milliseconds) * u64::from(factors.sample_rate) + 999) / 1000;
    let overlapped_samples = samples * u64::from(factors.overlap_factor);
    // always adds a frame, also when already a multiple
    let rounded = overlapped_samples + frame_size - overlapped_samples % frame_size;
    let number_of_frames = rounded / frame_size;
    let overhead = number_of_frames * per_frame_overhead() as u64;

    (rounded + overhead) as usize * size_of::<f32>()
}

/// `MILLISECONDS` worth of amplitude/phase frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryBuffer<const MILLISECONDS: u16> {
    range: BufferRange,
}

impl<const MILLISECONDS: u16> HistoryBuffer<MILLISECONDS> {
    /// Steps the buffer holds at `setup`'s hop rate
    pub fn length_in_steps(setup: &Setup) -> u16 {
        setup.milliseconds_to_steps(f32::from(MILLISECONDS))
    }

    #[inline]
    pub fn range(&self) -> BufferRange {
        self.range
    }

    #[inline]
    pub fn get<'a>(&self, storage: &'a [f32]) -> &'a [f32] {
        self.range.slice(storage)
    }

    #[inline]
    pub fn get_mut<'a>(&self, storage: &'a mut [f32]) -> &'a mut [f32] {
        self.range.slice_mut(storage)
    }
}

impl<const MILLISECONDS: u16> ChannelState for HistoryBuffer<MILLISECONDS> {
    fn required_storage(factors: &StorageFactors) -> usize {
        history_storage_bytes(MILLISECONDS, factors)
    }

    fn resize(
        &mut self,
        factors: &StorageFactors,
        storage: &mut Storage,
    ) -> Result<(), StorageError> {
        self.range = storage.allocate(Self::required_storage(factors))?;
        Ok(())
    }

    fn reset(&mut self, storage: &mut [f32]) {
        self.get_mut(storage).fill(0.0);
    }
}

/// Where to write this step's frame and where to read history from
///
/// Offsets index the history buffer slice. Each frame is an aligned run of
/// amplitudes followed by an equally long run of phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryData {
    target: usize,
    source: usize,
    number_of_bins: usize,
    aligned_bins: usize,
}

impl HistoryData {
    /// True when the source frame is looped history, not the target frame
    #[inline]
    pub fn is_emulated(&self) -> bool {
        self.target != self.source
    }

    /// Range of the whole target frame
    pub fn target_range(&self) -> Range<usize> {
        self.target..self.target + 2 * self.aligned_bins
    }

    /// Range of the whole source frame
    pub fn source_range(&self) -> Range<usize> {
        self.source..self.source + 2 * self.aligned_bins
    }

    /// Amplitudes and phases to read
    pub fn source<'a>(&self, history: &'a [f32]) -> (&'a [f32], &'a [f32]) {
        let amps = self.source;
        let phases = amps + self.aligned_bins;
        (
            &history[amps..amps + self.number_of_bins],
            &history[phases..phases + self.number_of_bins],
        )
    }

    /// Amplitudes and phases to overwrite with the current frame
    pub fn target_mut<'a>(&self, history: &'a mut [f32]) -> (&'a mut [f32], &'a mut [f32]) {
        let frame = &mut history[self.target_range()];
        let (amps, phases) = frame.split_at_mut(self.aligned_bins);
        (
            &mut amps[..self.number_of_bins],
            &mut phases[..self.number_of_bins],
        )
    }
}

/// Ping-pong cursor over a history buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReversedHistoryBufferState {
    step: u16,
    increment: i8,
    actual_history_length_in_steps: u16,
    emulated_history_step_offset: u16,
}

impl Default for ReversedHistoryBufferState {
    fn default() -> Self {
        Self {
            // one before the first frame
            step: u16::MAX,
            increment: 1,
            actual_history_length_in_steps: 0,
            emulated_history_step_offset: 0,
        }
    }
}

impl ReversedHistoryBufferState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current step, `u16::MAX` right after a reset
    #[inline]
    pub fn step(&self) -> u16 {
        self.step
    }

    /// Frames recorded so far, capped at the requested length
    #[inline]
    pub fn actual_history_length_in_steps(&self) -> u16 {
        self.actual_history_length_in_steps
    }

    /// Advance one step and locate the target and source frames
    pub fn get_current_step_data(&mut self, length_in_steps: u16, number_of_bins: u16) -> HistoryData {
        debug_assert!(length_in_steps > 0);
        let length = length_in_steps.max(1);

        self.step = self.step.wrapping_add_signed(i16::from(self.increment));
        if self.step >= length {
            if self.increment > 0 {
                self.increment = -1;
                self.step = length - 1;
            } else if self.actual_history_length_in_steps > length {
                // the length shrank underneath us, keep going backwards
                self.step = length - 1;
            } else {
                self.increment = 1;
                self.step = 0;
            }
        }

        let mut source_step = self.step;
        let actual = self.actual_history_length_in_steps;
        if actual < length {
            if self.step >= actual {
                if actual > 0 {
                    // walk backwards over the recorded frames, starting
                    // from the newest one
                    let newest = self.step - actual + 1;
                    let offset = self.emulated_history_step_offset;
                    if offset < newest || offset > self.step {
                        self.emulated_history_step_offset = newest;
                    }
                    source_step = self.step - self.emulated_history_step_offset;
                    // the cursor moves forward while the source moves back
                    self.emulated_history_step_offset += 2;
                }
                self.actual_history_length_in_steps += 1;
            }
        } else {
            self.actual_history_length_in_steps = length;
            self.emulated_history_step_offset = 0;
        }

        let aligned_bins = align_index(usize::from(number_of_bins));
        let full_frame = 2 * aligned_bins;
        HistoryData {
            target: usize::from(self.step) * full_frame,
            source: usize::from(source_step) * full_frame,
            number_of_bins: usize::from(number_of_bins),
            aligned_bins,
        }
    }
}

impl ChannelState for ReversedHistoryBufferState {
    fn required_storage(_: &StorageFactors) -> usize {
        0
    }

    fn resize(&mut self, _: &StorageFactors, _: &mut Storage) -> Result<(), StorageError> {
        Ok(())
    }

    fn reset(&mut self, _: &mut [f32]) {
        ReversedHistoryBufferState::reset(self);
    }
}

/// History buffer together with its ping-pong cursor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReversedHistoryChannelState<const MILLISECONDS: u16> {
    pub history: HistoryBuffer<MILLISECONDS>,
    pub cursor: ReversedHistoryBufferState,
}

impl<const MILLISECONDS: u16> ChannelState for ReversedHistoryChannelState<MILLISECONDS> {
    fn required_storage(factors: &StorageFactors) -> usize {
        <(HistoryBuffer<MILLISECONDS>, ReversedHistoryBufferState)>::required_storage(factors)
    }

    fn resize(
        &mut self,
        factors: &StorageFactors,
        storage: &mut Storage,
    ) -> Result<(), StorageError> {
        self.history.resize(factors, storage)?;
        ChannelState::resize(&mut self.cursor, factors, storage)
    }

    fn reset(&mut self, storage: &mut [f32]) {
        self.history.reset(storage);
        self.cursor.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use swx_engine::Window;

    fn factors() -> StorageFactors {
        StorageFactors {
            fft_size: 1024,
            overlap_factor: 4,
            number_of_channels: 1,
            sample_rate: 44100,
        }
    }

    fn steps(state: &mut ReversedHistoryBufferState, length: u16, count: usize) -> Vec<u16> {
        (0..count)
            .map(|_| {
                state.get_current_step_data(length, 5);
                state.step()
            })
            .collect()
    }

    #[test]
    fn test_required_storage_for_100ms() {
        // 4410 samples * 4 = 17640, rounded to 18 frames of 1024 = 18432,
        // plus 18 * 8 floats of overhead
        assert_eq!(HistoryBuffer::<100>::required_storage(&factors()), 74_304);
        assert_eq!(history_storage_bytes(100, &factors()), (18_432 + 144) * 4);
    }

    #[test]
    fn test_required_storage_minimum_is_one_frame() {
        assert_eq!(HistoryBuffer::<0>::required_storage(&factors()), (1024 + 8) * 4);
    }

    #[test]
    fn test_required_storage_scales_with_duration() {
        let one = history_storage_bytes(100, &factors());
        let two = history_storage_bytes(200, &factors());
        let frame = (1024 + per_frame_overhead()) * 4;
        assert!(two.abs_diff(2 * one) <= frame, "{} vs {}", two, 2 * one);
    }

    #[test]
    fn test_history_holds_every_step() {
        let setup = Setup::new(1024, 4, 44100, Window::Hann).unwrap();
        let length = HistoryBuffer::<100>::length_in_steps(&setup);
        let floats = HistoryBuffer::<100>::required_storage(&factors()) / 4;

        let mut state = ReversedHistoryBufferState::default();
        for _ in 0..3 * usize::from(length) {
            let data = state.get_current_step_data(length, setup.number_of_bins());
            assert!(data.target_range().end <= floats);
            assert!(data.source_range().end <= floats);
        }
    }

    #[test]
    fn test_ping_pong_traversal() {
        let mut state = ReversedHistoryBufferState::default();
        assert_eq!(
            steps(&mut state, 4, 13),
            vec![0, 1, 2, 3, 3, 2, 1, 0, 0, 1, 2, 3, 3]
        );
    }

    #[test]
    fn test_no_emulation_once_history_is_full() {
        let mut state = ReversedHistoryBufferState::default();
        let emulated: Vec<bool> = (0..12)
            .map(|_| state.get_current_step_data(4, 5).is_emulated())
            .collect();
        // nothing recorded on the first step, then looped history
        assert_eq!(&emulated[..4], &[false, true, true, true]);
        assert!(emulated[4..].iter().all(|&e| !e));
        assert_eq!(state.actual_history_length_in_steps(), 4);
    }

    #[test]
    fn test_emulated_source_walks_back_over_recorded_frames() {
        let mut state = ReversedHistoryBufferState::default();
        let frame = 2 * align_index(5);
        let sources: Vec<usize> = (0..6)
            .map(|_| state.get_current_step_data(6, 5).source_range().start / frame)
            .collect();
        // step 1 reads frame 0, step 2 frame 1, step 3 frame 0 again...
        assert_eq!(sources, vec![0, 0, 1, 0, 3, 2]);
    }

    #[test]
    fn test_shrinking_length_while_reversing_keeps_direction() {
        let mut state = ReversedHistoryBufferState::default();
        steps(&mut state, 8, 10); // 0..=7, 7, 6
        assert_eq!(state.step(), 6);
        assert_eq!(steps(&mut state, 4, 5), vec![3, 2, 1, 0, 0]);
    }

    #[test]
    fn test_reset_restarts_traversal() {
        let mut state = ReversedHistoryBufferState::default();
        steps(&mut state, 4, 6);
        state.reset();
        assert_eq!(state, ReversedHistoryBufferState::default());
        assert_eq!(steps(&mut state, 4, 2), vec![0, 1]);
    }

    #[test]
    fn test_frame_views() {
        let mut history = vec![0.0f32; 64];
        let mut state = ReversedHistoryBufferState::default();
        let first = state.get_current_step_data(4, 5);
        let (amps, phases) = first.target_mut(&mut history);
        amps.fill(1.0);
        phases.fill(2.0);

        let second = state.get_current_step_data(4, 5);
        assert!(second.is_emulated());
        let (amps, phases) = second.source(&history);
        assert_eq!(amps, &[1.0; 5]);
        assert_eq!(phases, &[2.0; 5]);
        // aligned layout: 8 amplitudes then 8 phases per frame
        assert_eq!(second.target_range(), 16..32);
    }

    #[test]
    fn test_reversed_channel_state_reset() {
        let mut state = ReversedHistoryChannelState::<10>::default();
        let bytes = ReversedHistoryChannelState::<10>::required_storage(&factors());
        let mut memory = vec![1.0f32; bytes / 4];
        state.resize(&factors(), &mut Storage::new(bytes)).unwrap();
        state.cursor.get_current_step_data(4, 513);

        state.reset(&mut memory);
        assert!(state.history.get(&memory).iter().all(|&x| x == 0.0));
        assert_eq!(state.cursor, ReversedHistoryBufferState::default());
    }

    proptest! {
        #[test]
        fn prop_steady_length_is_ping_pong(length in 1u16..24, calls in 1usize..200) {
            let mut state = ReversedHistoryBufferState::default();
            let period = 2 * usize::from(length);
            for call in 0..calls {
                let data = state.get_current_step_data(length, 9);
                let phase = call % period;
                let expected = if phase < usize::from(length) { phase } else { period - 1 - phase };
                prop_assert_eq!(usize::from(state.step()), expected);
                if call >= usize::from(length) {
                    prop_assert!(!data.is_emulated());
                }
            }
        }

        #[test]
        fn prop_reads_only_recorded_frames(
            lengths in proptest::collection::vec((1u16..12, 1usize..30), 1..8)
        ) {
            let mut state = ReversedHistoryBufferState::default();
            let mut written = vec![false; 16];
            let mut first = true;
            for (length, calls) in lengths {
                for _ in 0..calls {
                    let data = state.get_current_step_data(length, 1);
                    prop_assert!(state.step() < length);

                    let target = usize::from(state.step());
                    let source = data.source_range().start / 8;
                    if data.is_emulated() {
                        prop_assert!(written[source], "read unrecorded frame {}", source);
                    } else if !first {
                        prop_assert!(written[target], "read unrecorded frame {}", target);
                    }
                    written[target] = true;
                    first = false;
                }
            }
        }
    }
}

//! Windowed FFT frame engine
//!
//! Features:
//! - Mono short-time Fourier transform driven by an engine [`Setup`]
//! - Zero-phase framing (frame centre rotated to index 0 before the FFT)
//! - Amplitude/phase output of `fft_size / 2 + 1` bins
//! - Weighted overlap-add resynthesis normalised by the window power
//! - Allocation-free once constructed

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::setup::Setup;

/// Short-Time Fourier Transform processor
pub struct Stft {
    size: usize,
    hop_size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    /// Circular input history of one frame
    input: Vec<f32>,
    input_pos: usize,
    samples_since_frame: usize,
    /// Overlap-add accumulator, index 0 is the oldest sample
    accumulator: Vec<f32>,
    /// Completed output samples waiting to be popped
    ready: Vec<f32>,
    ready_pos: usize,
    work: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    /// IFFT scaling combined with the window-power compensation
    norm_factor: f32,
}

impl Stft {
    pub fn new(setup: &Setup) -> Self {
        let size = usize::from(setup.fft_size());
        let hop_size = usize::from(setup.step_size());

        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        let window = setup.window().coefficients(size);
        let window_power: f32 = window.iter().map(|w| w * w).sum();
        let norm_factor = hop_size as f32 / (size as f32 * window_power);

        Self {
            size,
            hop_size,
            forward,
            inverse,
            window,
            input: vec![0.0; size],
            input_pos: 0,
            samples_since_frame: 0,
            accumulator: vec![0.0; size],
            ready: vec![0.0; hop_size],
            ready_pos: hop_size,
            work: vec![Complex::new(0.0, 0.0); size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            norm_factor,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Number of positive frequency bins (size/2 + 1)
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.size / 2 + 1
    }

    /// Push one input sample, returns true when a new frame is ready
    pub fn push_sample(&mut self, sample: f32) -> bool {
        self.input[self.input_pos] = sample;
        self.input_pos = (self.input_pos + 1) % self.size;
        self.samples_since_frame += 1;

        if self.samples_since_frame == self.hop_size {
            self.samples_since_frame = 0;
            true
        } else {
            false
        }
    }

    /// Transform the current input frame into amplitudes and phases
    pub fn analyze(&mut self, amps: &mut [f32], phases: &mut [f32]) {
        debug_assert!(amps.len() >= self.num_bins());
        debug_assert!(phases.len() >= self.num_bins());

        for (i, (bin, &w)) in self.work.iter_mut().zip(&self.window).enumerate() {
            let sample = self.input[(self.input_pos + i) % self.size];
            *bin = Complex::new(sample * w, 0.0);
        }
        self.work.rotate_left(self.size / 2);

        self.forward
            .process_with_scratch(&mut self.work, &mut self.scratch);

        for ((bin, amp), phase) in self.work[..self.num_bins()]
            .iter()
            .zip(amps.iter_mut())
            .zip(phases.iter_mut())
        {
            *amp = bin.norm();
            *phase = bin.arg();
        }
    }

    /// Inverse-transform one frame and overlap-add it into the output
    pub fn synthesize(&mut self, amps: &[f32], phases: &[f32]) {
        debug_assert!(amps.len() >= self.num_bins());
        debug_assert!(phases.len() >= self.num_bins());

        let half = self.size / 2;
        for k in 0..=half {
            self.work[k] = Complex::from_polar(amps[k], phases[k]);
        }
        for k in 1..half {
            self.work[self.size - k] = self.work[k].conj();
        }

        self.inverse
            .process_with_scratch(&mut self.work, &mut self.scratch);
        self.work.rotate_left(half);

        for ((acc, bin), &w) in self
            .accumulator
            .iter_mut()
            .zip(&self.work)
            .zip(&self.window)
        {
            *acc += bin.re * w * self.norm_factor;
        }

        // The oldest hop is now complete
        self.ready.copy_from_slice(&self.accumulator[..self.hop_size]);
        self.ready_pos = 0;
        self.accumulator.copy_within(self.hop_size.., 0);
        let tail = self.size - self.hop_size;
        self.accumulator[tail..].fill(0.0);
    }

    /// Pop one synthesized sample
    #[inline]
    pub fn pop_sample(&mut self) -> Option<f32> {
        let sample = self.ready.get(self.ready_pos).copied()?;
        self.ready_pos += 1;
        Some(sample)
    }

    /// Clear all buffered audio
    pub fn reset(&mut self) {
        self.input.fill(0.0);
        self.accumulator.fill(0.0);
        self.input_pos = 0;
        self.samples_since_frame = 0;
        self.ready_pos = self.hop_size;
    }
}

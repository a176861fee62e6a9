//! End-to-end pitch shifting of a sinusoid through the frame engine

use std::f32::consts::TAU;

use swx_effects::phase_vocoder::{PitchShifter, PitchShifterChannelState};
use swx_effects::{ChannelStates, SpectralEffect};
use swx_engine::{ChannelDataAmPh, IndexRange, Setup, Stft, Window};

const SAMPLE_RATE: u32 = 44100;
const INPUT_FREQUENCY: f32 = 1000.0;

fn setup() -> Setup {
    Setup::new(1024, 4, SAMPLE_RATE, Window::Hann).unwrap()
}

/// Run one second of a sine through the shifter and return the output
fn render(setup: &Setup, semitones: f32) -> Vec<f32> {
    let mut shifter = PitchShifter::new();
    shifter.set_semitones(semitones, 0);
    shifter.setup(IndexRange::new(0, setup.number_of_bins()), setup);

    let mut states = ChannelStates::<PitchShifterChannelState>::new();
    states.configure(setup.storage_factors(1)).unwrap();

    let mut stft = Stft::new(setup);
    let bins = stft.num_bins();
    let mut amps = vec![0.0; bins];
    let mut phases = vec![0.0; bins];

    let mut output = Vec::new();
    for i in 0..SAMPLE_RATE as usize {
        let sample = 0.5 * (TAU * INPUT_FREQUENCY * i as f32 / SAMPLE_RATE as f32).sin();
        if stft.push_sample(sample) {
            stft.analyze(&mut amps, &mut phases);
            let (state, region) = states.channel_mut(0).unwrap();
            shifter.process(state, region, &mut ChannelDataAmPh::full(&mut amps, &mut phases));
            stft.synthesize(&amps, &phases);
        }
        if let Some(out) = stft.pop_sample() {
            output.push(out);
        }
    }
    output
}

/// Loudest bin of the last full frame of `signal`
fn peak_bin(setup: &Setup, signal: &[f32]) -> usize {
    let mut stft = Stft::new(setup);
    let mut amps = vec![0.0; stft.num_bins()];
    let mut phases = vec![0.0; stft.num_bins()];
    for &sample in signal {
        if stft.push_sample(sample) {
            stft.analyze(&mut amps, &mut phases);
        }
    }
    amps.iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(bin, _)| bin)
        .unwrap()
}

fn rms(signal: &[f32]) -> f32 {
    (signal.iter().map(|x| x * x).sum::<f32>() / signal.len() as f32).sqrt()
}

#[test]
fn test_unity_scale_keeps_the_pitch() {
    let setup = setup();
    let output = render(&setup, 0.0);
    let steady = &output[8192..];

    let expected = INPUT_FREQUENCY / setup.frequency_range_per_bin() as f32;
    let peak = peak_bin(&setup, steady);
    assert!(
        (peak as f32 - expected).abs() <= 1.5,
        "peak {} expected {}",
        peak,
        expected
    );
    assert!(rms(steady) > 0.1, "output level {}", rms(steady));
}

#[test]
fn test_octave_up_doubles_the_frequency() {
    let setup = setup();
    let output = render(&setup, 12.0);
    let steady = &output[8192..];

    let expected = 2.0 * INPUT_FREQUENCY / setup.frequency_range_per_bin() as f32;
    let peak = peak_bin(&setup, steady);
    assert!(
        (peak as f32 - expected).abs() <= 1.5,
        "peak {} expected {}",
        peak,
        expected
    );
    assert!(rms(steady) > 0.05, "output level {}", rms(steady));
}

#[test]
fn test_octave_down_halves_the_frequency() {
    let setup = setup();
    let output = render(&setup, -12.0);
    let steady = &output[8192..];

    let expected = 0.5 * INPUT_FREQUENCY / setup.frequency_range_per_bin() as f32;
    let peak = peak_bin(&setup, steady);
    assert!(
        (peak as f32 - expected).abs() <= 1.5,
        "peak {} expected {}",
        peak,
        expected
    );
}

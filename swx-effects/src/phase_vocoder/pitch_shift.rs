use swx_engine::ChannelDataAmPh;

use super::PitchShiftParameters;

/// Move every bin of the working range to `round(bin * scale)`
///
/// Operates on analysed data: amplitudes plus true frequencies (Hz) in the
/// phase slots. Moved frequencies are multiplied by the scale. Bins that
/// land on the same destination add their amplitudes and the loudest one
/// keeps its frequency; destinations receiving nothing are silenced.
/// Destinations outside the working range, or at/above Nyquist, are
/// dropped. DC neither moves nor receives anything.
///
/// Runs in place: scaling up walks downwards and scaling down walks
/// upwards, so every source bin is read before anything is written to it.
pub fn pitch_shift_and_scale(data: &mut ChannelDataAmPh<'_>, parameters: &PitchShiftParameters) {
    if parameters.skip_processing() {
        return;
    }

    let scale = parameters.scale();
    let range = data.working_range();
    let begin = usize::from(range.begin()).max(1);
    let end = usize::from(range.end());
    if begin >= end {
        return;
    }
    // first destination that is dropped
    let limit = if data.includes_nyquist() { end - 1 } else { end };

    let (amps, freqs) = data.full_mut();
    let destination = |bin: usize| (bin as f32 * scale).round() as usize;

    if scale > 1.0 {
        // everything from here up to the previous destination is silent
        let mut silent_until = end;
        for bin in (begin..end).rev() {
            let target = destination(bin);
            if target >= limit {
                continue;
            }
            let (amp, freq) = (amps[bin], freqs[bin]);
            amps[target + 1..silent_until].fill(0.0);
            amps[target] = amp;
            freqs[target] = freq * scale;
            silent_until = target;
        }
        amps[begin..silent_until].fill(0.0);
    } else {
        let mut last_target = None;
        let mut loudest = 0.0f32;
        for bin in begin..end {
            let target = destination(bin);
            if target < begin || target >= limit {
                continue;
            }
            let (amp, freq) = (amps[bin], freqs[bin]);
            if last_target == Some(target) {
                amps[target] += amp;
                if amp > loudest {
                    freqs[target] = freq * scale;
                    loudest = amp;
                }
            } else {
                amps[target] = amp;
                freqs[target] = freq * scale;
                loudest = amp;
                last_target = Some(target);
            }
        }
        let silent_from = last_target.map_or(begin, |target| target + 1);
        amps[silent_from..end].fill(0.0);
    }
}

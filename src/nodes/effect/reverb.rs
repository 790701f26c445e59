//! Feedback delay network reverb
//!
//! Eight delay lines with coprime lengths, mixed through a Householder
//! matrix (`out[i] = in[i] - (2/N) * sum(in)`) and damped by a one-pole
//! low-pass per line. Each line's feedback gain is derived from its own
//! length so the whole network decays by 60dB over the requested time.

use dasp_graph::Buffer;

use crate::node::{AudioNode, Inputs, ProcessContext};

const LINES: usize = 8;
/// Delay lengths in samples at 44.1kHz, scaled for other rates
const BASE_DELAYS: [usize; LINES] = [1087, 1283, 1511, 1777, 1987, 2243, 2503, 2719];
const BASE_SAMPLE_RATE: f32 = 44_100.0;
const MIN_DECAY_SECS: f32 = 0.001;
const DAMPING: f32 = 0.2;
/// 1/sqrt(LINES), applied on the way in and on the way out
const NORM: f32 = 0.353_553_4;

/// Messages to control a [`Reverb`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReverbMessage {
    /// Time in seconds for the tail to fall by 60dB
    SetDecay(f32),
    /// Wet/dry balance, 0.0 = dry only, 1.0 = reverb only
    SetWet(f32),
}

pub struct Reverb {
    lines: [Vec<f32>; LINES],
    cursors: [usize; LINES],
    damping: [f32; LINES],
    feedback: [f32; LINES],
    decay: f32,
    wet: f32,
    sample_rate: f32,
}

impl Reverb {
    /// A fully wet reverb with a `decay_secs` tail
    pub fn new(decay_secs: f32, sample_rate: u32) -> Self {
        let sample_rate = sample_rate as f32;
        let scale = sample_rate / BASE_SAMPLE_RATE;
        let lines = core::array::from_fn(|i| {
            let len = ((BASE_DELAYS[i] as f32 * scale).round() as usize).max(1);
            vec![0.0; len]
        });

        let mut reverb = Self {
            lines,
            cursors: [0; LINES],
            damping: [0.0; LINES],
            feedback: [0.0; LINES],
            decay: decay_secs,
            wet: 1.0,
            sample_rate,
        };
        reverb.set_decay(decay_secs);
        reverb
    }

    pub fn with_wet(mut self, wet: f32) -> Self {
        self.wet = wet.clamp(0.0, 1.0);
        self
    }

    #[inline]
    pub fn decay(&self) -> f32 {
        self.decay
    }

    #[inline]
    pub fn wet(&self) -> f32 {
        self.wet
    }

    fn set_decay(&mut self, decay_secs: f32) {
        self.decay = decay_secs.max(MIN_DECAY_SECS);
        for (gain, line) in self.feedback.iter_mut().zip(self.lines.iter()) {
            let delay_secs = line.len() as f32 / self.sample_rate;
            *gain = 10f32.powf(-3.0 * delay_secs / self.decay);
        }
    }

    #[inline]
    fn tick(&mut self, input: f32) -> f32 {
        let mut taps = [0.0f32; LINES];
        for (tap, (line, &cursor)) in taps.iter_mut().zip(self.lines.iter().zip(self.cursors.iter())) {
            *tap = line[cursor];
        }

        let output = taps.iter().sum::<f32>() * NORM;
        let reflect = 2.0 / LINES as f32 * taps.iter().sum::<f32>();

        for i in 0..LINES {
            let mixed = taps[i] - reflect;
            self.damping[i] = (1.0 - DAMPING) * mixed + DAMPING * self.damping[i];
            let line = &mut self.lines[i];
            line[self.cursors[i]] = self.damping[i] * self.feedback[i] + input * NORM;
            self.cursors[i] = (self.cursors[i] + 1) % line.len();
        }

        output
    }
}

impl AudioNode for Reverb {
    type Message = ReverbMessage;

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        messages: impl Iterator<Item = ReverbMessage>,
        inputs: &Inputs<'_>,
        output: &mut Buffer,
    ) {
        for msg in messages {
            match msg {
                ReverbMessage::SetDecay(secs) => self.set_decay(secs),
                ReverbMessage::SetWet(wet) => self.wet = wet.clamp(0.0, 1.0),
            }
        }

        let wet = self.wet;
        match inputs.audio() {
            Some(input) => {
                for (out, &dry) in output.iter_mut().zip(input.iter()) {
                    *out = dry * (1.0 - wet) + self.tick(dry) * wet;
                }
            }
            // The tail keeps ringing after its input is disconnected
            None => {
                for out in output.iter_mut() {
                    *out = self.tick(0.0) * wet;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTX: ProcessContext = ProcessContext {
        sample_rate: 48_000,
        buffer_size: 64,
    };

    fn impulse_response(reverb: &mut Reverb, blocks: usize) -> Vec<f32> {
        let mut impulse = Buffer::default();
        impulse[0] = 1.0;
        let silent = Buffer::default();
        let mut out = Buffer::default();
        let mut response = Vec::with_capacity(blocks * 64);

        for block in 0..blocks {
            let input = if block == 0 { &impulse } else { &silent };
            reverb.process(&CTX, core::iter::empty(), &Inputs::new(Some(input), &[]), &mut out);
            response.extend_from_slice(&out);
        }
        response
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn delay_lines_scale_with_sample_rate() {
        let reverb = Reverb::new(1.0, 88_200);
        assert_eq!(reverb.lines[0].len(), 2174);
        assert_eq!(reverb.lines[7].len(), 5438);
    }

    #[test]
    fn tail_rings_then_dies() {
        let mut reverb = Reverb::new(0.8, 48_000);
        // 0.8s of decay: ~2.5s later the tail is far below audibility
        let response = impulse_response(&mut reverb, 2_250);
        let early = &response[..4_800];
        let late = &response[response.len() - 4_800..];

        assert!(rms(early) > 1e-4, "early rms {}", rms(early));
        assert!(rms(late) < 1e-6, "late rms {}", rms(late));
    }

    #[test]
    fn longer_decay_rings_longer() {
        let short = impulse_response(&mut Reverb::new(0.3, 48_000), 750);
        let long = impulse_response(&mut Reverb::new(2.0, 48_000), 750);
        let window = 36_000..48_000;
        assert!(rms(&long[window.clone()]) > rms(&short[window]) * 10.0);
    }

    #[test]
    fn dry_signal_passes_when_wet_is_zero() {
        let mut reverb = Reverb::new(1.0, 48_000).with_wet(0.0);
        let response = impulse_response(&mut reverb, 4);
        assert_eq!(response[0], 1.0);
        assert!(response[1..].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn messages_update_parameters() {
        let mut reverb = Reverb::new(1.0, 48_000);
        let mut out = Buffer::default();
        let messages = [ReverbMessage::SetDecay(3.0), ReverbMessage::SetWet(0.5)];
        reverb.process(&CTX, messages.into_iter(), &Inputs::none(), &mut out);
        assert_eq!(reverb.decay(), 3.0);
        assert_eq!(reverb.wet(), 0.5);
    }
}

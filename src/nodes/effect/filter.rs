//! Biquad low-pass / high-pass filter

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type};
use dasp_graph::Buffer;

use crate::engine::Modulatable;
use crate::node::{silence, AudioNode, Inputs, Param, ProcessContext};

const Q: f32 = 1.0;
const MIN_CUTOFF: f32 = 10.0;

/// Response of a [`Filter`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    HighPass,
}

impl FilterKind {
    fn coefficients(self, sample_rate: f32, cutoff: f32) -> Option<Coefficients<f32>> {
        let response = match self {
            FilterKind::LowPass => Type::LowPass,
            FilterKind::HighPass => Type::HighPass,
        };
        Coefficients::<f32>::from_params(response, sample_rate.hz(), cutoff.hz(), Q).ok()
    }
}

/// Messages to control a [`Filter`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterMessage {
    /// Cutoff in Hz
    SetFrequency(f32),
}

impl Modulatable for FilterMessage {
    const PARAM: Param = Param::Frequency;
}

/// RBJ biquad filter.
///
/// The cutoff follows a [`Param::Frequency`] control signal when one is
/// connected. Coefficients are updated at control rate (once per block).
pub struct Filter {
    kind: FilterKind,
    sample_rate: f32,
    frequency: f32,
    /// Cutoff the current coefficients were built for
    applied: f32,
    biquad: DirectForm2Transposed<f32>,
}

impl Filter {
    pub fn new(frequency: f32, kind: FilterKind, sample_rate: u32) -> Self {
        let sample_rate = sample_rate as f32;
        let passthrough = Coefficients {
            a1: 0.0,
            a2: 0.0,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
        };
        let mut filter = Self {
            kind,
            sample_rate,
            frequency,
            applied: f32::NAN,
            biquad: DirectForm2Transposed::<f32>::new(passthrough),
        };
        filter.retune(frequency);
        filter
    }

    #[inline]
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Cutoff set by message (ignores any control signal)
    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    fn retune(&mut self, cutoff: f32) {
        let cutoff = cutoff.clamp(MIN_CUTOFF, self.sample_rate * 0.5 * 0.99);
        if (cutoff - self.applied).abs() <= 0.1 {
            return;
        }
        // On failure the previous coefficients stay in place
        if let Some(coeffs) = self.kind.coefficients(self.sample_rate, cutoff) {
            self.biquad.update_coefficients(coeffs);
            self.applied = cutoff;
        }
    }
}

impl AudioNode for Filter {
    type Message = FilterMessage;

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        messages: impl Iterator<Item = FilterMessage>,
        inputs: &Inputs<'_>,
        output: &mut Buffer,
    ) {
        for msg in messages {
            match msg {
                FilterMessage::SetFrequency(f) => self.frequency = f,
            }
        }

        let cutoff = inputs
            .param(Param::Frequency)
            .map_or(self.frequency, |control| control[0]);
        self.retune(cutoff);

        let Some(input) = inputs.audio() else {
            silence(output);
            return;
        };

        for (out, &sample) in output.iter_mut().zip(input.iter()) {
            *out = self.biquad.run(sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Noise, NoiseColor, NoiseMessage};

    const CTX: ProcessContext = ProcessContext {
        sample_rate: 48_000,
        buffer_size: 64,
    };

    fn energy_through(filter: &mut Filter, params: &[(Param, Buffer)]) -> f32 {
        let mut noise = Noise::with_seed(NoiseColor::White, 11);
        let mut source = Buffer::default();
        let mut out = Buffer::default();
        let mut energy = 0.0;

        for block in 0..200 {
            let start = (block == 0).then_some(NoiseMessage::Start);
            noise.process(&CTX, start.into_iter(), &Inputs::none(), &mut source);
            filter.process(&CTX, core::iter::empty(), &Inputs::new(Some(&source), params), &mut out);
            energy += out.iter().map(|s| s * s).sum::<f32>();
        }
        energy
    }

    #[test]
    fn low_pass_removes_energy_from_white_noise() {
        let mut wide = Filter::new(20_000.0, FilterKind::LowPass, 48_000);
        let mut narrow = Filter::new(500.0, FilterKind::LowPass, 48_000);
        assert!(energy_through(&mut narrow, &[]) < energy_through(&mut wide, &[]) * 0.2);
    }

    #[test]
    fn high_pass_keeps_the_top_band() {
        let mut low = Filter::new(2_000.0, FilterKind::LowPass, 48_000);
        let mut high = Filter::new(2_000.0, FilterKind::HighPass, 48_000);
        // White noise has far more energy above 2 kHz than below
        assert!(energy_through(&mut high, &[]) > energy_through(&mut low, &[]));
    }

    #[test]
    fn control_signal_drives_cutoff() {
        let mut control = Buffer::default();
        control.iter_mut().for_each(|s| *s = 300.0);
        let params = [(Param::Frequency, control)];

        let mut modulated = Filter::new(20_000.0, FilterKind::LowPass, 48_000);
        let mut fixed = Filter::new(20_000.0, FilterKind::LowPass, 48_000);
        assert!(energy_through(&mut modulated, &params) < energy_through(&mut fixed, &[]) * 0.2);
        assert_eq!(modulated.frequency(), 20_000.0);
    }

    #[test]
    fn cutoff_is_clamped_below_nyquist() {
        let mut filter = Filter::new(1.0e6, FilterKind::LowPass, 48_000);
        let energy = energy_through(&mut filter, &[]);
        assert!(energy.is_finite() && energy > 0.0);
    }
}

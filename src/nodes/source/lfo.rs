//! Low-frequency oscillator for parameter modulation

use dasp_graph::Buffer;

use crate::engine::SourceMessage;
use crate::node::{AudioNode, Inputs, ProcessContext};

/// Messages to control an [`Lfo`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LfoMessage {
    Start,
    Stop,
    /// Oscillation rate in Hz
    SetRate(f32),
}

impl SourceMessage for LfoMessage {
    const RESTARTABLE: bool = true;

    fn start() -> Self {
        LfoMessage::Start
    }

    fn stop() -> Self {
        LfoMessage::Stop
    }
}

/// A slow sine mapped into `[min, max]`.
///
/// Connect it to a parameter with [`Engine::modulate`](crate::Engine::modulate).
/// While stopped it holds the value at its current phase (the midpoint of the
/// range before the first start), so starting and stopping never jumps.
pub struct Lfo {
    rate: f32,
    min: f32,
    max: f32,
    phase: f32,
    running: bool,
}

impl Lfo {
    pub fn new(rate: f32, min: f32, max: f32) -> Self {
        Self {
            rate: rate.max(0.0),
            min,
            max,
            phase: 0.0,
            running: false,
        }
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    #[inline]
    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    fn value(&self) -> f32 {
        let unipolar = 0.5 + 0.5 * (self.phase * core::f32::consts::TAU).sin();
        self.min + (self.max - self.min) * unipolar
    }
}

impl AudioNode for Lfo {
    type Message = LfoMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = LfoMessage>,
        _inputs: &Inputs<'_>,
        output: &mut Buffer,
    ) {
        for msg in messages {
            match msg {
                LfoMessage::Start => self.running = true,
                LfoMessage::Stop => self.running = false,
                LfoMessage::SetRate(rate) => self.rate = rate.max(0.0),
            }
        }

        if !self.running {
            let held = self.value();
            output.iter_mut().for_each(|s| *s = held);
            return;
        }

        let phase_inc = self.rate / ctx.sample_rate as f32;
        for sample in output.iter_mut() {
            *sample = self.value();
            self.phase += phase_inc;
            self.phase -= self.phase.floor();
        }
    }
}

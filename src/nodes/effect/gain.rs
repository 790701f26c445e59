//! Gain/volume control effect

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use atomic_float::AtomicF32;
use dasp_graph::Buffer;

use crate::engine::Modulatable;
use crate::node::{silence, AudioNode, Inputs, Param, ProcessContext};

/// Messages to control gain
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GainMessage {
    /// Set the gain multiplier immediately (1.0 = unity, 0.0 = silence)
    SetGain(f32),
    /// Move linearly to `target` over `samples` samples
    RampTo { target: f32, samples: u32 },
}

impl Modulatable for GainMessage {
    const PARAM: Param = Param::Gain;
}

/// The newest ramp target of a [`Gain`], shared with whoever controls it.
///
/// Each write replaces the previous one, so targets set while nothing is
/// rendering never pile up. The node picks up the latest write at the start
/// of its next block.
#[derive(Debug)]
pub struct GainTarget {
    value: AtomicF32,
    samples: AtomicU32,
    version: AtomicU32,
}

impl GainTarget {
    fn new(value: f32) -> Self {
        Self {
            value: AtomicF32::new(value),
            samples: AtomicU32::new(0),
            version: AtomicU32::new(0),
        }
    }

    /// Ramp linearly to `value` over `samples` samples (0 = immediately)
    pub fn set(&self, value: f32, samples: u32) {
        self.value.store(value, Ordering::Relaxed);
        self.samples.store(samples, Ordering::Relaxed);
        self.version.fetch_add(1, Ordering::Release);
    }

    /// Last value written
    pub fn value(&self) -> f32 {
        self.value.load(Ordering::Relaxed)
    }

    fn load(&self) -> (u32, f32, u32) {
        let version = self.version.load(Ordering::Acquire);
        (version, self.value(), self.samples.load(Ordering::Relaxed))
    }
}

/// A gain (volume) control that passes audio through with amplitude scaling.
///
/// A control signal connected to [`Param::Gain`] replaces the gain value
/// sample by sample while it is connected.
pub struct Gain {
    gain: f32,
    target: f32,
    step: f32,
    remaining: u32,

    shared: Arc<GainTarget>,
    seen: u32,
}

impl Gain {
    /// Create a new gain node with the specified gain value
    pub fn new(gain: f32) -> Self {
        Self {
            gain,
            target: gain,
            step: 0.0,
            remaining: 0,
            shared: Arc::new(GainTarget::new(gain)),
            seen: 0,
        }
    }

    /// The shared target this node follows, for ramps that bypass the message queue
    pub fn target(&self) -> Arc<GainTarget> {
        Arc::clone(&self.shared)
    }

    /// Current gain (mid-ramp values included)
    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain
    }

    fn ramp_to(&mut self, target: f32, samples: u32) {
        if samples == 0 {
            self.gain = target;
            self.target = target;
            self.remaining = 0;
            return;
        }
        self.target = target;
        self.step = (target - self.gain) / samples as f32;
        self.remaining = samples;
    }

    #[inline]
    fn advance(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.gain = if self.remaining == 0 {
                self.target
            } else {
                self.gain + self.step
            };
        }
        self.gain
    }
}

impl AudioNode for Gain {
    type Message = GainMessage;

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        messages: impl Iterator<Item = GainMessage>,
        inputs: &Inputs<'_>,
        output: &mut Buffer,
    ) {
        for msg in messages {
            match msg {
                GainMessage::SetGain(g) => self.ramp_to(g, 0),
                GainMessage::RampTo { target, samples } => self.ramp_to(target, samples),
            }
        }

        let (version, target, samples) = self.shared.load();
        if version != self.seen {
            self.seen = version;
            self.ramp_to(target, samples);
        }

        let Some(input) = inputs.audio() else {
            // Ramps advance with or without input
            for _ in 0..output.len() {
                self.advance();
            }
            silence(output);
            return;
        };

        match inputs.param(Param::Gain) {
            Some(control) => {
                for ((out, &sample), &gain) in output.iter_mut().zip(input.iter()).zip(control.iter()) {
                    *out = sample * gain;
                }
            }
            None => {
                for (out, &sample) in output.iter_mut().zip(input.iter()) {
                    *out = sample * self.advance();
                }
            }
        }
    }
}

//! Ring-buffer output sink

use dasp_graph::Buffer;
use rtrb::Producer;
use tracing::trace;

use crate::node::{AudioNode, Inputs, ProcessContext};

/// The end of every engine graph.
///
/// Interleaves the mono mix into `channels` channels and pushes it into a
/// ring buffer for whoever plays it (a cpal stream, a test, a file writer).
/// Nothing connected means a block of silence is pushed; a ring buffer
/// without room for a whole block makes the block get skipped.
pub struct Destination {
    buffer: Producer<f32>,
    channels: usize,
}

impl Destination {
    pub fn new(buffer: Producer<f32>, channels: usize) -> Self {
        Self {
            buffer,
            channels: channels.max(1),
        }
    }

    /// Single channel output
    pub fn mono(buffer: Producer<f32>) -> Self {
        Self::new(buffer, 1)
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Free space in the ring buffer, in samples
    #[inline]
    pub fn available(&self) -> usize {
        self.buffer.slots()
    }
}

impl AudioNode for Destination {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &Inputs<'_>,
        output: &mut Buffer,
    ) {
        match inputs.audio() {
            Some(mix) => output.copy_from_slice(mix),
            None => output.iter_mut().for_each(|s| *s = 0.0),
        }

        let samples_needed = output.len() * self.channels;
        if self.buffer.slots() < samples_needed {
            trace!(slots = self.buffer.slots(), "output ring buffer full, skipping block");
            return;
        }

        for &sample in output.iter() {
            for _ in 0..self.channels {
                // Slots were checked above
                let _ = self.buffer.push(sample);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtrb::RingBuffer;

    const CTX: ProcessContext = ProcessContext {
        sample_rate: 48_000,
        buffer_size: 64,
    };

    #[test]
    fn interleaves_mono_into_stereo() {
        let (producer, mut consumer) = RingBuffer::new(256);
        let mut sink = Destination::new(producer, 2);

        let mut input = Buffer::default();
        for (i, s) in input.iter_mut().enumerate() {
            *s = i as f32;
        }
        let mut out = Buffer::default();
        sink.process(&CTX, core::iter::empty(), &Inputs::new(Some(&input), &[]), &mut out);

        assert_eq!(consumer.slots(), 128);
        assert_eq!(consumer.pop(), Ok(0.0));
        assert_eq!(consumer.pop(), Ok(0.0));
        assert_eq!(consumer.pop(), Ok(1.0));
        assert_eq!(consumer.pop(), Ok(1.0));
    }

    #[test]
    fn pushes_silence_when_unconnected() {
        let (producer, mut consumer) = RingBuffer::new(64);
        let mut sink = Destination::mono(producer);
        let mut out = Buffer::default();
        sink.process(&CTX, core::iter::empty(), &Inputs::none(), &mut out);

        assert_eq!(consumer.slots(), 64);
        assert!(core::iter::from_fn(|| consumer.pop().ok()).all(|s| s == 0.0));
    }

    #[test]
    fn skips_block_when_full() {
        let (producer, consumer) = RingBuffer::new(100);
        let mut sink = Destination::mono(producer);
        let mut out = Buffer::default();

        sink.process(&CTX, core::iter::empty(), &Inputs::none(), &mut out);
        assert_eq!(sink.available(), 36);
        sink.process(&CTX, core::iter::empty(), &Inputs::none(), &mut out);
        assert_eq!(consumer.slots(), 64);
    }
}

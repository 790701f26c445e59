//! Core node trait and context types.

use dasp_graph::Buffer;

/// Samples per processing block (dasp_graph's fixed buffer length).
pub const BLOCK_SIZE: usize = 64;

/// Information available during audio processing.
///
/// Passed to every [`AudioNode::process`] call.
#[derive(Clone, Copy, Debug)]
pub struct ProcessContext {
    /// Sample rate of the graph in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Number of samples per buffer (always [`BLOCK_SIZE`])
    pub buffer_size: usize,
}

/// Unique identifier for a node within an engine.
///
/// You typically don't interact with this directly - use [`Handle`](crate::Handle) instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub(crate) u32);

/// A node parameter that can be driven by a control signal (e.g. an LFO).
///
/// A connected control signal replaces the parameter's own value for as long
/// as the connection exists.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Param {
    /// Amplitude of a [`Gain`](crate::nodes::Gain)
    Gain,
    /// Cutoff of a [`Filter`](crate::nodes::Filter), in Hz
    Frequency,
}

/// Signals arriving at a node for the current block.
///
/// All audio connections are summed into a single buffer; control
/// connections are delivered per [`Param`].
pub struct Inputs<'a> {
    audio: Option<&'a Buffer>,
    params: &'a [(Param, Buffer)],
}

impl<'a> Inputs<'a> {
    pub fn new(audio: Option<&'a Buffer>, params: &'a [(Param, Buffer)]) -> Self {
        Self { audio, params }
    }

    /// No inputs at all (typical for sources)
    pub fn none() -> Self {
        Self { audio: None, params: &[] }
    }

    /// The summed audio input, or `None` if nothing is connected
    #[inline]
    pub fn audio(&self) -> Option<&'a Buffer> {
        self.audio
    }

    /// The control signal driving `param`, if any
    #[inline]
    pub fn param(&self, param: Param) -> Option<&'a Buffer> {
        self.params
            .iter()
            .find(|(p, _)| *p == param)
            .map(|(_, buffer)| buffer)
    }
}

/// The core trait for audio processing nodes.
///
/// Nodes can be:
/// - **Sources**: generate audio (noise, LFOs)
/// - **Effects**: process audio (gain, filters, reverb)
/// - **Sinks**: consume audio (the engine destination)
///
/// # Message-Based Parameters
///
/// Instead of shared mutable state, nodes receive parameter updates via messages
/// sent through a [`Handle`](crate::Handle). Handle them at the start of `process()`:
///
/// ```
/// use rauschen::{AudioNode, Inputs, ProcessContext};
/// use dasp_graph::Buffer;
///
/// enum DcMessage {
///     SetLevel(f32),
/// }
///
/// struct Dc {
///     level: f32,
/// }
///
/// impl AudioNode for Dc {
///     type Message = DcMessage;
///
///     fn process(
///         &mut self,
///         _ctx: &ProcessContext,
///         messages: impl Iterator<Item = DcMessage>,
///         _inputs: &Inputs<'_>,
///         output: &mut Buffer,
///     ) {
///         for msg in messages {
///             match msg {
///                 DcMessage::SetLevel(level) => self.level = level,
///             }
///         }
///         output.iter_mut().for_each(|s| *s = self.level);
///     }
/// }
/// ```
pub trait AudioNode: Send + 'static {
    /// Message type for parameter updates.
    ///
    /// Use a custom enum for nodes with parameters, or `()` for nodes without.
    type Message: Send + 'static;

    /// Process one block of audio.
    ///
    /// Called once per block. Your implementation should:
    /// 1. Drain and handle all pending messages
    /// 2. Read from `inputs` (if any)
    /// 3. Write the mono result to `output`
    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = Self::Message>,
        inputs: &Inputs<'_>,
        output: &mut Buffer,
    );
}

/// Fill a buffer with silence.
#[inline]
pub(crate) fn silence(buffer: &mut Buffer) {
    buffer.iter_mut().for_each(|s| *s = 0.0);
}

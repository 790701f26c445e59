//! The audio engine: typed handles over a single audio graph
//!
//! Nodes are addressed only through [`Handle`]s. Parameter changes travel
//! as messages through each node's queue and take effect at the start of the
//! next rendered block.

use core::fmt;
use core::time::Duration;
use std::sync::Arc;

use hashbrown::HashMap;
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, trace};

use crate::context::{Backend, ContextState, ImmediateBackend};
use crate::error::EngineError;
use crate::graph::{AudioGraph, Port};
use crate::node::{AudioNode, NodeId, Param};
use crate::nodes::{
    Destination, Filter, FilterKind, FilterMessage, Gain, GainMessage, GainTarget, Lfo, LfoMessage, Noise, NoiseColor,
    NoiseMessage, Reverb, ReverbMessage,
};

const DEFAULT_QUEUE_SIZE: usize = 256;

/// Handle for sending messages to a node.
///
/// Not `Clone`: there is exactly one handle per node, and
/// [`Engine::dispose`] consumes it.
pub struct Handle<M: Send + 'static> {
    pub(crate) node_id: NodeId,
    pub(crate) sender: Producer<M>,
}

impl<M: Send + 'static> Handle<M> {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.node_id
    }

    /// Send a message to the node.
    ///
    /// Sources must be started and stopped through [`Engine::start`] and
    /// [`Engine::stop`] so their playback state stays in sync.
    pub fn send(&mut self, msg: M) -> Result<(), M> {
        self.sender.push(msg).map_err(|rtrb::PushError::Full(m)| m)
    }
}

impl<M: Send + 'static> fmt::Debug for Handle<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle").field("node_id", &self.node_id).finish()
    }
}

/// Scheduling state of a source node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback {
    Idle,
    Started,
    Stopped,
}

/// Messages of nodes that can be started and stopped
pub trait SourceMessage: Send + 'static {
    /// Whether a stopped node may be started again
    const RESTARTABLE: bool;

    fn start() -> Self;
    fn stop() -> Self;
}

/// Messages of nodes with a parameter an LFO can drive
pub trait Modulatable: Send + 'static {
    const PARAM: Param;
}

/// The main audio engine
pub struct Engine {
    graph: AudioGraph,
    sample_rate: u32,
    destination: NodeId,

    state: ContextState,
    backend: Box<dyn Backend>,

    playback: HashMap<NodeId, Playback>,
    gain_targets: HashMap<NodeId, Arc<GainTarget>>,
    queue_size: usize,
    blocks_processed: u64,
}

impl Engine {
    /// Create a suspended engine that renders into `destination`
    pub fn new(sample_rate: u32, destination: Destination) -> Self {
        let mut graph = AudioGraph::new(sample_rate);
        let (destination, _) = graph.add(destination, 1);
        graph.set_terminal(destination);

        Self {
            graph,
            sample_rate,
            destination,
            state: ContextState::Suspended,
            backend: Box::new(ImmediateBackend),
            playback: HashMap::new(),
            gain_targets: HashMap::new(),
            queue_size: DEFAULT_QUEUE_SIZE,
            blocks_processed: 0,
        }
    }

    /// A mono engine without a device, for rendering into memory.
    ///
    /// The returned consumer holds up to one second of output; drain it
    /// while rendering or blocks start getting skipped.
    pub fn offline(sample_rate: u32) -> (Self, Consumer<f32>) {
        let (producer, consumer) = RingBuffer::new(sample_rate as usize);
        (Self::new(sample_rate, Destination::mono(producer)), consumer)
    }

    /// Replace what [`ensure_running`](Self::ensure_running) waits on
    pub fn with_backend(mut self, backend: impl Backend + 'static) -> Self {
        self.backend = Box::new(backend);
        self
    }

    /// Message queue capacity for nodes added from now on
    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size.max(1);
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Resume the context if it is suspended.
    ///
    /// The state flips to running only once the backend's resume resolves;
    /// dropping the future before then leaves the engine suspended.
    pub async fn ensure_running(&mut self) -> Result<(), EngineError> {
        if self.state == ContextState::Running {
            return Ok(());
        }
        self.backend.resume().await?;
        self.state = ContextState::Running;
        debug!(sample_rate = self.sample_rate, "audio context running");
        Ok(())
    }

    pub fn suspend(&mut self) {
        if self.state == ContextState::Suspended {
            return;
        }
        self.backend.suspend();
        self.state = ContextState::Suspended;
        debug!("audio context suspended");
    }

    /// Add a node to the graph
    pub fn add<N: AudioNode>(&mut self, node: N) -> Handle<N::Message> {
        let (node_id, sender) = self.graph.add(node, self.queue_size);
        trace!(node = ?node_id, "added node");
        Handle { node_id, sender }
    }

    pub fn noise(&mut self, color: NoiseColor) -> Handle<NoiseMessage> {
        self.add(Noise::new(color))
    }

    pub fn gain(&mut self, gain: f32) -> Handle<GainMessage> {
        let node = Gain::new(gain);
        let target = node.target();
        let handle = self.add(node);
        self.gain_targets.insert(handle.node_id, target);
        handle
    }

    pub fn filter(&mut self, frequency: f32, kind: FilterKind) -> Handle<FilterMessage> {
        self.add(Filter::new(frequency, kind, self.sample_rate))
    }

    pub fn lfo(&mut self, rate: f32, min: f32, max: f32) -> Handle<LfoMessage> {
        self.add(Lfo::new(rate, min, max))
    }

    pub fn reverb(&mut self, decay_secs: f32) -> Handle<ReverbMessage> {
        self.add(Reverb::new(decay_secs, self.sample_rate))
    }

    /// Feed the audio output of `from` into `to`
    pub fn connect<M1, M2>(&mut self, from: &Handle<M1>, to: &Handle<M2>) -> Result<(), EngineError>
    where
        M1: Send + 'static,
        M2: Send + 'static,
    {
        self.link(from.node_id, to.node_id, Port::Audio)
    }

    /// Let `control` drive the modulatable parameter of `target`
    pub fn modulate<S, M>(&mut self, control: &Handle<S>, target: &Handle<M>) -> Result<(), EngineError>
    where
        S: Send + 'static,
        M: Modulatable,
    {
        self.link(control.node_id, target.node_id, Port::Param(M::PARAM))
    }

    /// Route a node to the engine's destination
    pub fn output<M: Send + 'static>(&mut self, handle: &Handle<M>) -> Result<(), EngineError> {
        self.link(handle.node_id, self.destination, Port::Audio)
    }

    /// Remove the connection between two nodes, returning whether there was one
    pub fn disconnect<M1, M2>(&mut self, from: &Handle<M1>, to: &Handle<M2>) -> bool
    where
        M1: Send + 'static,
        M2: Send + 'static,
    {
        self.graph.disconnect(from.node_id, to.node_id)
    }

    fn link(&mut self, from: NodeId, to: NodeId, port: Port) -> Result<(), EngineError> {
        for id in [from, to] {
            if !self.graph.contains(id) {
                return Err(EngineError::UnknownNode(id));
            }
        }
        self.graph.connect(from, to, port);
        Ok(())
    }

    /// Start a source node
    pub fn start<M: SourceMessage>(&mut self, handle: &mut Handle<M>) -> Result<(), EngineError> {
        let id = handle.node_id;
        match self.playback_of(id)? {
            Playback::Started => return Err(EngineError::AlreadyStarted(id)),
            Playback::Stopped if !M::RESTARTABLE => return Err(EngineError::Restart(id)),
            _ => {}
        }
        handle.send(M::start()).map_err(|_| EngineError::QueueFull(id))?;
        self.playback.insert(id, Playback::Started);
        trace!(node = ?id, "started");
        Ok(())
    }

    /// Stop a source node. Stopping a stopped node does nothing.
    pub fn stop<M: SourceMessage>(&mut self, handle: &mut Handle<M>) -> Result<(), EngineError> {
        let id = handle.node_id;
        match self.playback_of(id)? {
            Playback::Idle => return Err(EngineError::NotStarted(id)),
            Playback::Stopped => return Ok(()),
            Playback::Started => {}
        }
        handle.send(M::stop()).map_err(|_| EngineError::QueueFull(id))?;
        self.playback.insert(id, Playback::Stopped);
        trace!(node = ?id, "stopped");
        Ok(())
    }

    /// Scheduling state of a source, `None` if the node is gone
    pub fn playback<M: SourceMessage>(&self, handle: &Handle<M>) -> Option<Playback> {
        self.playback_of(handle.node_id).ok()
    }

    fn playback_of(&self, id: NodeId) -> Result<Playback, EngineError> {
        if !self.graph.contains(id) {
            return Err(EngineError::UnknownNode(id));
        }
        Ok(self.playback.get(&id).copied().unwrap_or(Playback::Idle))
    }

    /// Move a gain linearly to `value` over `duration`.
    ///
    /// Gains made by [`Engine::gain`] take the newest target directly, so
    /// repeated calls never fill their queue, rendering or not. Other gains
    /// get a [`GainMessage::RampTo`].
    pub fn ramp_to(
        &mut self,
        gain: &mut Handle<GainMessage>,
        value: f32,
        duration: Duration,
    ) -> Result<(), EngineError> {
        let id = gain.node_id;
        if !self.graph.contains(id) {
            return Err(EngineError::UnknownNode(id));
        }
        let samples = (duration.as_secs_f64() * self.sample_rate as f64).round() as u32;
        match self.gain_targets.get(&id) {
            Some(target) => {
                target.set(value, samples);
                Ok(())
            }
            None => gain
                .send(GainMessage::RampTo { target: value, samples })
                .map_err(|_| EngineError::QueueFull(id)),
        }
    }

    /// Send a parameter message, mapping a full queue to an error
    pub fn send<M: Send + 'static>(&mut self, handle: &mut Handle<M>, msg: M) -> Result<(), EngineError> {
        let id = handle.node_id;
        if !self.graph.contains(id) {
            return Err(EngineError::UnknownNode(id));
        }
        handle.send(msg).map_err(|_| EngineError::QueueFull(id))
    }

    /// Remove a node and all of its connections
    pub fn dispose<M: Send + 'static>(&mut self, handle: Handle<M>) -> Result<(), EngineError> {
        let id = handle.node_id;
        self.playback.remove(&id);
        self.gain_targets.remove(&id);
        if !self.graph.remove(id) {
            return Err(EngineError::UnknownNode(id));
        }
        trace!(node = ?id, "disposed");
        Ok(())
    }

    /// Number of nodes in the graph, not counting the destination
    pub fn node_count(&self) -> usize {
        self.graph.node_count().saturating_sub(1)
    }

    /// Number of nodes connected into `handle` (audio and control)
    pub fn input_count<M: Send + 'static>(&self, handle: &Handle<M>) -> usize {
        self.graph.input_count(handle.node_id)
    }

    /// Number of nodes routed straight to the destination
    pub fn output_input_count(&self) -> usize {
        self.graph.input_count(self.destination)
    }

    /// Render one block. Returns false (and renders nothing) while suspended.
    pub fn process(&mut self) -> bool {
        if self.state == ContextState::Suspended {
            return false;
        }
        self.graph.process();
        self.blocks_processed += 1;
        true
    }

    /// Render up to `blocks` blocks, returning how many were rendered
    pub fn render(&mut self, blocks: usize) -> usize {
        (0..blocks).take_while(|_| self.process()).count()
    }

    pub fn blocks_processed(&self) -> u64 {
        self.blocks_processed
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("sample_rate", &self.sample_rate)
            .field("state", &self.state)
            .field("nodes", &self.node_count())
            .field("blocks_processed", &self.blocks_processed)
            .finish()
    }
}

//! Audio graph - owns nodes, their message queues and the wiring between them

use dasp_graph::{Buffer, NodeData};
use hashbrown::HashMap;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{DfsPostOrder, Reversed, Visitable};
use petgraph::Direction;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::node::{silence, AudioNode, Inputs, NodeId, Param, ProcessContext, BLOCK_SIZE};

/// What an edge feeds on the receiving node
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Port {
    /// Summed into the node's audio input
    Audio,
    /// Drives one of the node's parameters
    Param(Param),
}

// Type-erased wrapper so we can store heterogeneous nodes
trait ErasedNode: Send {
    fn process_erased(&mut self, ctx: &ProcessContext, inputs: &Inputs<'_>, output: &mut Buffer);
}

struct NodeWrapper<N: AudioNode> {
    node: N,
    receiver: Consumer<N::Message>,
}

impl<N: AudioNode> ErasedNode for NodeWrapper<N> {
    fn process_erased(&mut self, ctx: &ProcessContext, inputs: &Inputs<'_>, output: &mut Buffer) {
        // Split borrow to avoid conflict between receiver and node
        let receiver = &mut self.receiver;
        let node = &mut self.node;

        // Draining iterator straight off the consumer - no allocation
        let messages = core::iter::from_fn(|| receiver.pop().ok());
        node.process(ctx, messages, inputs, output);
    }
}

type InnerGraph = StableGraph<NodeData<Box<dyn ErasedNode>>, Port>;
type VisitMap = <InnerGraph as Visitable>::Map;

/// An audio processing graph at a fixed sample rate.
///
/// Backed by a `StableGraph` so node indices survive removals.
pub(crate) struct AudioGraph {
    graph: InnerGraph,
    ctx: ProcessContext,

    node_indices: HashMap<NodeId, NodeIndex>,
    next_node_id: u32,

    terminal: Option<NodeIndex>,
    dfs: DfsPostOrder<NodeIndex, VisitMap>,

    // Per-node scratch, reused every block
    mix: Buffer,
    params: Vec<(Param, Buffer)>,
}

impl AudioGraph {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            graph: InnerGraph::with_capacity(64, 64),
            ctx: ProcessContext {
                sample_rate,
                buffer_size: BLOCK_SIZE,
            },
            node_indices: HashMap::new(),
            next_node_id: 0,
            terminal: None,
            dfs: DfsPostOrder::default(),
            mix: Buffer::default(),
            params: Vec::with_capacity(4),
        }
    }

    /// Add a node with a message queue of `queue_size` slots.
    ///
    /// Returns the node's id and the producing end of its queue.
    pub fn add<N: AudioNode>(&mut self, node: N, queue_size: usize) -> (NodeId, Producer<N::Message>) {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let (producer, consumer) = RingBuffer::new(queue_size);
        let wrapper: Box<dyn ErasedNode> = Box::new(NodeWrapper { node, receiver: consumer });

        let idx = self.graph.add_node(NodeData::new1(wrapper));
        self.node_indices.insert(id, idx);

        (id, producer)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node_indices.contains_key(&id)
    }

    /// Connect output of `from` to `port` of `to`.
    ///
    /// Returns false if either node is unknown. Connecting an already
    /// connected pair leaves the existing edge in place.
    pub fn connect(&mut self, from: NodeId, to: NodeId, port: Port) -> bool {
        let (Some(&from_idx), Some(&to_idx)) = (self.node_indices.get(&from), self.node_indices.get(&to)) else {
            return false;
        };
        if self.graph.find_edge(from_idx, to_idx).is_none() {
            self.graph.add_edge(from_idx, to_idx, port);
        }
        true
    }

    /// Remove the edge between `from` and `to`, returning whether one existed
    pub fn disconnect(&mut self, from: NodeId, to: NodeId) -> bool {
        let (Some(&from_idx), Some(&to_idx)) = (self.node_indices.get(&from), self.node_indices.get(&to)) else {
            return false;
        };
        match self.graph.find_edge(from_idx, to_idx) {
            Some(edge) => self.graph.remove_edge(edge).is_some(),
            None => false,
        }
    }

    /// Remove a node and every edge touching it
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(idx) = self.node_indices.remove(&id) else {
            return false;
        };
        if self.terminal == Some(idx) {
            self.terminal = None;
        }
        self.graph.remove_node(idx).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of nodes feeding `id` (audio and control)
    pub fn input_count(&self, id: NodeId) -> usize {
        self.node_indices
            .get(&id)
            .map_or(0, |&idx| self.graph.neighbors_directed(idx, Direction::Incoming).count())
    }

    /// Set which node to process to (the destination)
    pub fn set_terminal(&mut self, id: NodeId) {
        self.terminal = self.node_indices.get(&id).copied();
    }

    /// Process one block through everything upstream of the terminal.
    ///
    /// Nodes are visited in post-order, so every input is rendered before
    /// the node that reads it.
    pub fn process(&mut self) {
        let Some(terminal) = self.terminal else {
            return;
        };

        self.dfs.reset(Reversed(&self.graph));
        self.dfs.move_to(terminal);

        while let Some(idx) = self.dfs.next(Reversed(&self.graph)) {
            let connected = self.gather(idx);

            let audio = if connected { Some(&self.mix) } else { None };
            let inputs = Inputs::new(audio, &self.params);
            let data = &mut self.graph[idx];
            data.node.process_erased(&self.ctx, &inputs, &mut data.buffers[0]);
        }
    }

    // Sum audio inputs into `mix` and copy control inputs into `params`.
    // Returns whether any audio edge was found.
    fn gather(&mut self, idx: NodeIndex) -> bool {
        silence(&mut self.mix);
        self.params.clear();
        let mut connected = false;

        for source in self.graph.neighbors_directed(idx, Direction::Incoming) {
            let Some(port) = self
                .graph
                .find_edge(source, idx)
                .and_then(|edge| self.graph.edge_weight(edge))
            else {
                continue;
            };
            let signal = &self.graph[source].buffers[0];

            match *port {
                Port::Audio => {
                    for (mixed, sample) in self.mix.iter_mut().zip(signal.iter()) {
                        *mixed += *sample;
                    }
                    connected = true;
                }
                Port::Param(param) => {
                    let mut control = Buffer::default();
                    control.copy_from_slice(signal);
                    self.params.push((param, control));
                }
            }
        }

        connected
    }
}

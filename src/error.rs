//! Error types

use crate::node::NodeId;
use crate::noise::Complexity;

/// Invariant violations reported by the [`Engine`](crate::Engine)
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),
    #[error("node {0:?} is already started")]
    AlreadyStarted(NodeId),
    #[error("node {0:?} was never started")]
    NotStarted(NodeId),
    #[error("node {0:?} has been stopped and cannot start again")]
    Restart(NodeId),
    #[error("message queue of node {0:?} is full")]
    QueueFull(NodeId),
    #[error("audio context failed to resume: {0}")]
    Resume(String),
}

/// Errors from [`NoiseManager`](crate::NoiseManager) source creation
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NoiseError {
    #[error("unsupported {complexity} source type `{tag}`")]
    UnsupportedSourceType { tag: String, complexity: Complexity },
    #[error("unknown complexity `{0}`")]
    UnknownComplexity(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

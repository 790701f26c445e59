//! Ambient noise sources on a small message-driven audio graph.
//!
//! The crate has two layers:
//!
//! - An audio [`Engine`]: a graph of [`AudioNode`]s (noise, gain, filter,
//!   LFO, reverb) addressed through typed [`Handle`]s, rendered in blocks
//!   of [`BLOCK_SIZE`] samples into a ring buffer. With the `cpal_sink`
//!   feature the buffer is played on the system's default output.
//! - A [`NoiseManager`] that builds white, pink, brown and composite
//!   "ocean" sources on top of the engine and controls them individually
//!   or all at once.
//!
//! ```
//! use rauschen::{Engine, NoiseManager};
//!
//! let (engine, output) = Engine::offline(48_000);
//! let mut manager = NoiseManager::new(engine);
//!
//! let ids = manager.create_defaults().unwrap();
//! manager.set_volume(ids[1].as_str(), 0.0); // brown stays off
//! manager.set_volume(ids[3].as_str(), 0.8);
//!
//! futures::executor::block_on(manager.start_all_active());
//! manager.engine_mut().render(16);
//! assert_eq!(output.slots(), 16 * rauschen::BLOCK_SIZE);
//! assert_eq!(manager.sources().filter(|s| s.is_playing()).count(), 3);
//! ```

mod context;
mod engine;
mod error;
mod graph;
mod id;
mod node;

#[cfg(feature = "cpal_sink")]
mod device;

pub mod nodes;
pub mod noise;

pub use context::{Backend, ContextState, ImmediateBackend};
pub use engine::{Engine, Handle, Modulatable, Playback, SourceMessage};
pub use error::{EngineError, NoiseError};
pub use id::{IdProvider, SequentialIds, SourceId, UuidProvider};
pub use node::{AudioNode, Inputs, NodeId, Param, ProcessContext, BLOCK_SIZE};
pub use noise::{Complexity, NoiseManager, NoiseSource, Ocean, SourceKind, SourcePreset, DEFAULT_PRESETS};

#[cfg(feature = "cpal_sink")]
pub use device::CpalBackend;

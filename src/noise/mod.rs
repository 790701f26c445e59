//! Noise sources and the manager that owns them.
//!
//! A [`NoiseManager`] builds one signal path per source on an [`Engine`](crate::Engine),
//! routes every path into a shared master gain and exposes the same
//! start / stop / volume controls for simple and composite sources alike.
//!
//! ```
//! use rauschen::{Complexity, Engine, NoiseManager};
//!
//! let (engine, _output) = Engine::offline(48_000);
//! let mut manager = NoiseManager::new(engine);
//!
//! let id = manager.create_source("pink", "Pink Noise", "#ffc0cb", Complexity::Basic).unwrap();
//! futures::executor::block_on(manager.start(id.as_str()));
//! assert!(manager.source(id.as_str()).unwrap().is_playing());
//!
//! manager.stop(id.as_str());
//! assert!(!manager.source(id.as_str()).unwrap().is_playing());
//! ```

use core::time::Duration;

mod catalog;
mod manager;
mod ocean;
mod source;

pub use catalog::{SourcePreset, DEFAULT_PRESETS};
pub use manager::NoiseManager;
pub use ocean::Ocean;
pub use source::{Complexity, NoiseSource, SourceKind};

/// Length of every volume ramp
pub const GLIDE: Duration = Duration::from_millis(100);

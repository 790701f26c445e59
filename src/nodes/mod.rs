//! Built-in audio nodes.
//!
//! Nodes are organized into three categories:
//!
//! ## Sources ([`source`])
//!
//! Generate signals with no audio inputs:
//! - [`Noise`] - White, pink or brown noise; one-shot (cannot restart once stopped)
//! - [`Lfo`] - Slow sine mapped into a range, used to drive parameters
//!
//! ## Effects ([`effect`])
//!
//! Process audio (inputs → outputs):
//! - [`Gain`] - Volume control with linear ramps
//! - [`Filter`] - Biquad low-pass / high-pass with a modulatable cutoff
//! - [`Reverb`] - Feedback delay network with a decay time in seconds
//!
//! ## Sinks ([`sink`])
//!
//! Consume audio:
//! - [`Destination`] - Interleave into a ring buffer (the engine's output)
//!
//! # Message Types
//!
//! Every node has an associated message type for runtime control:
//! - [`NoiseMessage`] / [`LfoMessage`] - start and stop
//! - [`GainMessage`] - set or ramp the level
//! - [`FilterMessage`] - set the cutoff
//! - [`ReverbMessage`] - set decay and wet level
//!
//! [`Destination`] has no parameters and uses `()`.

pub mod source;
pub mod effect;
pub mod sink;

// Re-export common types at the top level for convenience
pub use source::{Lfo, LfoMessage, Noise, NoiseColor, NoiseMessage, UnknownNoiseColor};
pub use effect::{Filter, FilterKind, FilterMessage, Gain, GainMessage, GainTarget, Reverb, ReverbMessage};
pub use sink::Destination;

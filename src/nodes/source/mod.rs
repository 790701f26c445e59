//! Source nodes (generators with no audio inputs)

mod lfo;
mod noise;

pub use lfo::{Lfo, LfoMessage};
pub use noise::{Noise, NoiseColor, NoiseMessage, UnknownNoiseColor};

//! Effect nodes (audio in, audio out)

mod filter;
mod gain;
mod reverb;

pub use filter::{Filter, FilterKind, FilterMessage};
pub use gain::{Gain, GainMessage, GainTarget};
pub use reverb::{Reverb, ReverbMessage};

//! Noise generators

use core::fmt;
use core::str::FromStr;

use dasp_graph::Buffer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::SourceMessage;
use crate::node::{silence, AudioNode, Inputs, ProcessContext};

/// Spectral color of a [`Noise`] generator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoiseColor {
    /// Flat spectrum
    White,
    /// 1/f spectrum, -3dB/octave
    Pink,
    /// 1/f² spectrum, -6dB/octave
    Brown,
}

impl NoiseColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoiseColor::White => "white",
            NoiseColor::Pink => "pink",
            NoiseColor::Brown => "brown",
        }
    }
}

impl fmt::Display for NoiseColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a string that names no [`NoiseColor`]
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown noise color `{0}`")]
pub struct UnknownNoiseColor(pub String);

impl FromStr for NoiseColor {
    type Err = UnknownNoiseColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(NoiseColor::White),
            "pink" => Ok(NoiseColor::Pink),
            "brown" => Ok(NoiseColor::Brown),
            other => Err(UnknownNoiseColor(other.to_owned())),
        }
    }
}

/// Messages to control a [`Noise`] generator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoiseMessage {
    Start,
    Stop,
}

impl SourceMessage for NoiseMessage {
    const RESTARTABLE: bool = false;

    fn start() -> Self {
        NoiseMessage::Start
    }

    fn stop() -> Self {
        NoiseMessage::Stop
    }
}

const PINK_ROWS: usize = 16;

enum Shaper {
    White,
    /// Voss-McCartney: row `n` is refreshed every 2^n samples
    Pink { rows: [f32; PINK_ROWS], counter: u32 },
    /// Leaky integrator over white noise
    Brown { last: f32 },
}

/// A noise generator (mono source).
///
/// Silent until started. Once stopped it stays silent; build a new generator
/// to play again.
pub struct Noise {
    color: NoiseColor,
    shaper: Shaper,
    rng: StdRng,
    running: bool,
}

impl Noise {
    pub fn new(color: NoiseColor) -> Self {
        Self::with_rng(color, StdRng::from_entropy())
    }

    /// Create a generator with a fixed seed (for reproducible output)
    pub fn with_seed(color: NoiseColor, seed: u64) -> Self {
        Self::with_rng(color, StdRng::seed_from_u64(seed))
    }

    fn with_rng(color: NoiseColor, mut rng: StdRng) -> Self {
        let shaper = match color {
            NoiseColor::White => Shaper::White,
            NoiseColor::Pink => Shaper::Pink {
                rows: [0.0; PINK_ROWS].map(|_| rng.gen_range(-1.0..=1.0)),
                counter: 0,
            },
            NoiseColor::Brown => Shaper::Brown { last: 0.0 },
        };
        Self {
            color,
            shaper,
            rng,
            running: false,
        }
    }

    #[inline]
    pub fn color(&self) -> NoiseColor {
        self.color
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        let white: f32 = self.rng.gen_range(-1.0..1.0);
        match &mut self.shaper {
            Shaper::White => white,
            Shaper::Pink { rows, counter } => {
                *counter = counter.wrapping_add(1);
                let row = (counter.trailing_zeros() as usize).min(PINK_ROWS - 1);
                rows[row] = white;
                let sum: f32 = rows.iter().sum::<f32>() + white;
                (sum / 8.0).clamp(-1.0, 1.0)
            }
            Shaper::Brown { last } => {
                *last = (*last + 0.02 * white) / 1.02;
                (*last * 3.5).clamp(-1.0, 1.0)
            }
        }
    }
}

impl AudioNode for Noise {
    type Message = NoiseMessage;

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        messages: impl Iterator<Item = NoiseMessage>,
        _inputs: &Inputs<'_>,
        output: &mut Buffer,
    ) {
        for msg in messages {
            match msg {
                NoiseMessage::Start => self.running = true,
                NoiseMessage::Stop => self.running = false,
            }
        }

        if !self.running {
            silence(output);
            return;
        }

        for sample in output.iter_mut() {
            *sample = self.next_sample();
        }
    }
}

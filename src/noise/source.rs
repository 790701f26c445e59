//! Noise sources as the manager stores them

use core::fmt;
use core::mem;
use core::str::FromStr;
use core::time::Duration;

use tracing::warn;

use crate::engine::{Engine, Handle};
use crate::error::{EngineError, NoiseError};
use crate::id::SourceId;
use crate::nodes::{GainMessage, NoiseColor, NoiseMessage};

use super::ocean::Ocean;

/// How a source was requested: a single noise color or a designed soundscape
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Complexity {
    Basic,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Basic => "basic",
            Complexity::Complex => "complex",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Complexity {
    type Err = NoiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Complexity::Basic),
            "complex" => Ok(Complexity::Complex),
            other => Err(NoiseError::UnknownComplexity(other.to_owned())),
        }
    }
}

/// Shape of a source's signal chain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// One generator into one gain
    Simple,
    /// A multi-stage graph ([`Ocean`])
    Composite,
}

/// One independently controllable source.
///
/// Read-only from the outside; every change goes through the
/// [`NoiseManager`](super::NoiseManager).
#[derive(Debug)]
pub struct NoiseSource {
    id: SourceId,
    name: String,
    color: String,
    pub(crate) voice: Voice,
}

impl NoiseSource {
    pub(crate) fn new(id: SourceId, name: &str, color: &str, voice: Voice) -> Self {
        Self {
            id,
            name: name.to_owned(),
            color: color.to_owned(),
            voice,
        }
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display color, e.g. `#ffffff`
    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn kind(&self) -> SourceKind {
        match self.voice {
            Voice::Simple(_) => SourceKind::Simple,
            Voice::Composite(_) => SourceKind::Composite,
        }
    }

    pub fn complexity(&self) -> Complexity {
        match self.kind() {
            SourceKind::Simple => Complexity::Basic,
            SourceKind::Composite => Complexity::Complex,
        }
    }

    /// Last volume set, independent of any ramp still in progress
    pub fn volume(&self) -> f32 {
        match &self.voice {
            Voice::Simple(voice) => voice.volume,
            Voice::Composite(ocean) => ocean.volume(),
        }
    }

    pub fn is_playing(&self) -> bool {
        match &self.voice {
            Voice::Simple(voice) => voice.playing,
            Voice::Composite(ocean) => ocean.is_playing(),
        }
    }

    /// Noise color of a simple source
    pub fn noise_color(&self) -> Option<NoiseColor> {
        match &self.voice {
            Voice::Simple(voice) => Some(voice.color),
            Voice::Composite(_) => None,
        }
    }
}

/// The signal chain behind a source
#[derive(Debug)]
pub(crate) enum Voice {
    Simple(SimpleVoice),
    Composite(Ocean),
}

impl Voice {
    pub async fn start(&mut self, engine: &mut Engine) -> Result<(), EngineError> {
        match self {
            Voice::Simple(voice) => {
                engine.ensure_running().await?;
                voice.start(engine)
            }
            Voice::Composite(ocean) => ocean.start(engine).await,
        }
    }

    pub fn stop(&mut self, engine: &mut Engine) -> Result<(), EngineError> {
        match self {
            Voice::Simple(voice) => voice.stop(engine),
            Voice::Composite(ocean) => ocean.stop(engine),
        }
    }

    pub fn set_volume(&mut self, engine: &mut Engine, volume: f32) -> Result<(), EngineError> {
        match self {
            Voice::Simple(voice) => voice.set_volume(engine, volume),
            Voice::Composite(ocean) => ocean.set_volume(engine, volume),
        }
    }

    pub fn dispose(self, engine: &mut Engine) -> Result<(), EngineError> {
        match self {
            Voice::Simple(voice) => voice.dispose(engine),
            Voice::Composite(ocean) => ocean.dispose(engine),
        }
    }
}

/// A noise generator feeding its own gain
#[derive(Debug)]
pub(crate) struct SimpleVoice {
    color: NoiseColor,
    generator: Handle<NoiseMessage>,
    gain: Handle<GainMessage>,
    volume: f32,
    playing: bool,
    glide: Duration,
}

impl SimpleVoice {
    /// Build `generator -> gain -> output`
    pub fn new(
        engine: &mut Engine,
        color: NoiseColor,
        volume: f32,
        glide: Duration,
        output: &Handle<GainMessage>,
    ) -> Result<Self, EngineError> {
        let generator = engine.noise(color);
        let gain = engine.gain(volume);
        let wired = engine
            .connect(&generator, &gain)
            .and_then(|()| engine.connect(&gain, output));
        if let Err(error) = wired {
            // Leave the engine as it was
            for released in [engine.dispose(generator), engine.dispose(gain)] {
                if let Err(cleanup) = released {
                    warn!(%cleanup, "failed to release unwired node");
                }
            }
            return Err(error);
        }

        Ok(Self {
            color,
            generator,
            gain,
            volume,
            playing: false,
            glide,
        })
    }

    fn start(&mut self, engine: &mut Engine) -> Result<(), EngineError> {
        engine.start(&mut self.generator)?;
        self.playing = true;
        Ok(())
    }

    // Generators are one-shot: swap in a fresh one so the next start works
    fn stop(&mut self, engine: &mut Engine) -> Result<(), EngineError> {
        engine.stop(&mut self.generator)?;
        self.playing = false;

        let fresh = engine.noise(self.color);
        engine.connect(&fresh, &self.gain)?;
        let spent = mem::replace(&mut self.generator, fresh);
        engine.dispose(spent)
    }

    fn set_volume(&mut self, engine: &mut Engine, volume: f32) -> Result<(), EngineError> {
        self.volume = volume;
        engine.ramp_to(&mut self.gain, volume, self.glide)
    }

    fn dispose(mut self, engine: &mut Engine) -> Result<(), EngineError> {
        if self.playing {
            engine.stop(&mut self.generator)?;
        }
        engine.dispose(self.generator)?;
        engine.dispose(self.gain)
    }
}

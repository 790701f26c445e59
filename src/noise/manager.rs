//! The noise source manager

use core::time::Duration;

use hashbrown::HashMap;
use tracing::{debug, error, instrument, warn};

use crate::engine::{Engine, Handle};
use crate::error::NoiseError;
use crate::id::{IdProvider, SourceId, UuidProvider};
use crate::nodes::{GainMessage, NoiseColor};

use super::catalog::DEFAULT_PRESETS;
use super::ocean::Ocean;
use super::source::{Complexity, NoiseSource, SimpleVoice, Voice};
use super::GLIDE;

const MASTER_VOLUME: f32 = 0.7;
const SOURCE_VOLUME: f32 = 0.5;
const OCEAN: &str = "ocean";

/// Creates, plays and destroys noise sources on an [`Engine`].
///
/// Every source feeds one master gain owned by the manager. Lifecycle
/// operations are idempotent and never fail: unknown ids and redundant calls
/// do nothing, and engine errors are logged.
pub struct NoiseManager {
    engine: Engine,
    sources: HashMap<SourceId, NoiseSource>,
    master: Handle<GainMessage>,
    globally_playing: bool,

    ids: Box<dyn IdProvider>,
    glide: Duration,
    source_volume: f32,
}

impl NoiseManager {
    /// Take over `engine`, adding a master gain routed to its output
    pub fn new(mut engine: Engine) -> Self {
        let master = engine.gain(MASTER_VOLUME);
        if let Err(error) = engine.output(&master) {
            error!(%error, "failed to route master gain");
        }

        Self {
            engine,
            sources: HashMap::new(),
            master,
            globally_playing: false,
            ids: Box::new(UuidProvider),
            glide: GLIDE,
            source_volume: SOURCE_VOLUME,
        }
    }

    pub fn with_master_volume(mut self, volume: f32) -> Self {
        if let Err(error) = self.engine.ramp_to(&mut self.master, volume, Duration::ZERO) {
            error!(%error, "failed to set master volume");
        }
        self
    }

    /// Initial volume of newly created sources
    pub fn with_source_volume(mut self, volume: f32) -> Self {
        self.source_volume = volume;
        self
    }

    /// Length of volume ramps, for the master and for sources created afterwards
    pub fn with_glide(mut self, glide: Duration) -> Self {
        self.glide = glide;
        self
    }

    pub fn with_id_provider(mut self, ids: impl IdProvider + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Build a source and route it into the master gain.
    ///
    /// Basic sources take a noise color as `type_tag` (`white`, `pink`,
    /// `brown`); the only complex source is `ocean`. Unknown tags fail
    /// without touching the manager.
    #[instrument(skip(self))]
    pub fn create_source(
        &mut self,
        type_tag: &str,
        name: &str,
        color: &str,
        complexity: Complexity,
    ) -> Result<SourceId, NoiseError> {
        let unsupported = || NoiseError::UnsupportedSourceType {
            tag: type_tag.to_owned(),
            complexity,
        };

        let (id, voice) = match complexity {
            Complexity::Basic => {
                let noise_color = type_tag.parse::<NoiseColor>().map_err(|_| unsupported())?;
                let voice = SimpleVoice::new(
                    &mut self.engine,
                    noise_color,
                    self.source_volume,
                    self.glide,
                    &self.master,
                )?;
                (self.ids.next_id(), Voice::Simple(voice))
            }
            Complexity::Complex if type_tag == OCEAN => {
                let mut ocean = Ocean::new(&mut self.engine, &mut *self.ids, &self.master)?.with_glide(self.glide);
                if let Err(error) = ocean.set_volume(&mut self.engine, self.source_volume) {
                    if let Err(cleanup) = ocean.dispose(&mut self.engine) {
                        warn!(%cleanup, "failed to release ocean");
                    }
                    return Err(error.into());
                }
                (ocean.id().clone(), Voice::Composite(ocean))
            }
            Complexity::Complex => return Err(unsupported()),
        };

        debug!(%id, "created source");
        self.sources
            .insert(id.clone(), NoiseSource::new(id.clone(), name, color, voice));
        Ok(id)
    }

    /// Create one source per entry of [`DEFAULT_PRESETS`]
    pub fn create_defaults(&mut self) -> Result<Vec<SourceId>, NoiseError> {
        DEFAULT_PRESETS
            .iter()
            .map(|preset| self.create_source(preset.type_tag, preset.name, preset.color, preset.complexity))
            .collect()
    }

    /// Start a source, resuming the audio context first if needed
    #[instrument(skip(self))]
    pub async fn start(&mut self, id: &str) {
        let Some(source) = self.sources.get_mut(id) else {
            return;
        };
        if source.is_playing() {
            return;
        }
        match source.voice.start(&mut self.engine).await {
            Ok(()) => debug!("source started"),
            Err(error) => error!(%error, "failed to start source"),
        }
    }

    /// Stop a source, leaving it ready for the next start
    #[instrument(skip(self))]
    pub fn stop(&mut self, id: &str) {
        let Some(source) = self.sources.get_mut(id) else {
            return;
        };
        if !source.is_playing() {
            return;
        }
        match source.voice.stop(&mut self.engine) {
            Ok(()) => debug!("source stopped"),
            Err(error) => error!(%error, "failed to stop source"),
        }
    }

    /// Record `volume` and ramp the source towards it. Not clamped.
    pub fn set_volume(&mut self, id: &str, volume: f32) {
        let Some(source) = self.sources.get_mut(id) else {
            return;
        };
        if let Err(error) = source.voice.set_volume(&mut self.engine, volume) {
            error!(%id, %error, "failed to set volume");
        }
    }

    /// Start every source with a volume above zero.
    ///
    /// Does nothing while a previous bulk start is in effect.
    #[instrument(skip(self))]
    pub async fn start_all_active(&mut self) {
        if self.globally_playing {
            return;
        }
        if let Err(error) = self.engine.ensure_running().await {
            error!(%error, "failed to resume audio context");
            return;
        }

        for source in self.sources.values_mut() {
            if source.volume() <= 0.0 || source.is_playing() {
                continue;
            }
            if let Err(error) = source.voice.start(&mut self.engine).await {
                error!(id = %source.id(), %error, "failed to start source");
            }
        }
        self.globally_playing = true;
    }

    /// Stop every playing source. Does nothing unless a bulk start is in effect.
    #[instrument(skip(self))]
    pub fn stop_all(&mut self) {
        if !self.globally_playing {
            return;
        }

        for source in self.sources.values_mut() {
            if !source.is_playing() {
                continue;
            }
            if let Err(error) = source.voice.stop(&mut self.engine) {
                error!(id = %source.id(), %error, "failed to stop source");
            }
        }
        self.globally_playing = false;
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        if let Err(error) = self.engine.ramp_to(&mut self.master, volume, self.glide) {
            error!(%error, "failed to set master volume");
        }
    }

    pub fn source(&self, id: &str) -> Option<&NoiseSource> {
        self.sources.get(id)
    }

    /// All sources, in no particular order
    pub fn sources(&self) -> impl Iterator<Item = &NoiseSource> + '_ {
        self.sources.values()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Stop a source if needed and release all of its nodes
    #[instrument(skip(self))]
    pub fn remove_source(&mut self, id: &str) {
        let Some(source) = self.sources.remove(id) else {
            return;
        };
        match source.voice.dispose(&mut self.engine) {
            Ok(()) => debug!("source removed"),
            Err(error) => error!(%error, "failed to release source"),
        }
    }

    /// Release every source and the master gain, handing the engine back
    pub fn dispose_all(mut self) -> Engine {
        for (id, source) in self.sources.drain() {
            if let Err(error) = source.voice.dispose(&mut self.engine) {
                error!(%id, %error, "failed to release source");
            }
        }
        if let Err(error) = self.engine.dispose(self.master) {
            error!(%error, "failed to release master gain");
        }
        debug!("disposed all sources");
        self.engine
    }

    /// Whether the last bulk operation was [`start_all_active`](Self::start_all_active).
    ///
    /// Not derived from the sources: starting or stopping single sources
    /// leaves it untouched.
    pub fn is_globally_playing(&self) -> bool {
        self.globally_playing
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Direct engine access, e.g. for rendering
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Number of nodes feeding the master gain
    pub fn master_input_count(&self) -> usize {
        self.engine.input_count(&self.master)
    }
}

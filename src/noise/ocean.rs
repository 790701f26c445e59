//! Composite "ocean" soundscape
//!
//! ```text
//! brown noise -> low-pass 1200Hz ---------------------------> swell gain 0.7 -> mix 1.0 -> reverb 0.8s -> output 0.5 -> master
//! white noise -> high-pass 2000Hz -> texture gain 0.3 ----------^    ^
//!                                           swell LFO 0.2Hz 0.4..1 --'  (gain)
//!                                   sweep LFO 0.3Hz 600..1200Hz -> low-pass cutoff
//! ```
//!
//! Only the two noise layers are rebuilt after a stop; filters, gains,
//! LFOs and the reverb live as long as the `Ocean` does.

use core::mem;
use core::time::Duration;

use tracing::{debug, warn};

use crate::engine::{Engine, Handle};
use crate::error::EngineError;
use crate::id::{IdProvider, SourceId};
use crate::nodes::{
    FilterKind, FilterMessage, GainMessage, LfoMessage, NoiseColor, NoiseMessage, ReverbMessage,
};

use super::GLIDE;

const BODY_COLOR: NoiseColor = NoiseColor::Brown;
const BODY_CUTOFF: f32 = 1200.0;
const TEXTURE_COLOR: NoiseColor = NoiseColor::White;
const TEXTURE_CUTOFF: f32 = 2000.0;
const TEXTURE_LEVEL: f32 = 0.3;
const SWELL_LEVEL: f32 = 0.7;
const MIX_LEVEL: f32 = 1.0;
const REVERB_DECAY_SECS: f32 = 0.8;
const OUTPUT_LEVEL: f32 = 0.5;

/// (rate Hz, min, max)
const SWELL_LFO: (f32, f32, f32) = (0.2, 0.4, 1.0);
const SWEEP_LFO: (f32, f32, f32) = (0.3, 600.0, 1200.0);

#[derive(Debug)]
pub struct Ocean {
    id: SourceId,

    body: Handle<NoiseMessage>,
    texture: Handle<NoiseMessage>,

    body_filter: Handle<FilterMessage>,
    texture_filter: Handle<FilterMessage>,
    texture_gain: Handle<GainMessage>,
    swell: Handle<GainMessage>,
    mix: Handle<GainMessage>,
    reverb: Handle<ReverbMessage>,
    output: Handle<GainMessage>,

    swell_lfo: Handle<LfoMessage>,
    sweep_lfo: Handle<LfoMessage>,

    volume: f32,
    playing: bool,
    glide: Duration,
}

impl Ocean {
    /// Build the whole graph, feeding `master`. Nothing plays until [`start`](Self::start).
    pub fn new(
        engine: &mut Engine,
        ids: &mut dyn IdProvider,
        master: &Handle<GainMessage>,
    ) -> Result<Self, EngineError> {
        let body = engine.noise(BODY_COLOR);
        let body_filter = engine.filter(BODY_CUTOFF, FilterKind::LowPass);
        let texture = engine.noise(TEXTURE_COLOR);
        let texture_filter = engine.filter(TEXTURE_CUTOFF, FilterKind::HighPass);
        let texture_gain = engine.gain(TEXTURE_LEVEL);
        let swell = engine.gain(SWELL_LEVEL);
        let mix = engine.gain(MIX_LEVEL);
        let reverb = engine.reverb(REVERB_DECAY_SECS);
        let output = engine.gain(OUTPUT_LEVEL);

        let (rate, min, max) = SWELL_LFO;
        let swell_lfo = engine.lfo(rate, min, max);
        let (rate, min, max) = SWEEP_LFO;
        let sweep_lfo = engine.lfo(rate, min, max);

        let ocean = Self {
            id: ids.next_id(),
            body,
            texture,
            body_filter,
            texture_filter,
            texture_gain,
            swell,
            mix,
            reverb,
            output,
            swell_lfo,
            sweep_lfo,
            volume: OUTPUT_LEVEL,
            playing: false,
            glide: GLIDE,
        };

        if let Err(error) = ocean.wire(engine, master) {
            // Leave the engine as it was
            if let Err(cleanup) = ocean.release(engine) {
                warn!(%cleanup, "failed to release unwired ocean");
            }
            return Err(error);
        }
        debug!(id = %ocean.id, "built ocean graph");
        Ok(ocean)
    }

    fn wire(&self, engine: &mut Engine, master: &Handle<GainMessage>) -> Result<(), EngineError> {
        engine.connect(&self.body, &self.body_filter)?;
        engine.connect(&self.body_filter, &self.swell)?;

        engine.connect(&self.texture, &self.texture_filter)?;
        engine.connect(&self.texture_filter, &self.texture_gain)?;
        engine.connect(&self.texture_gain, &self.swell)?;

        engine.modulate(&self.swell_lfo, &self.swell)?;
        engine.modulate(&self.sweep_lfo, &self.body_filter)?;

        engine.connect(&self.swell, &self.mix)?;
        engine.connect(&self.mix, &self.reverb)?;
        engine.connect(&self.reverb, &self.output)?;
        engine.connect(&self.output, master)
    }

    /// Length of volume ramps
    pub fn with_glide(mut self, glide: Duration) -> Self {
        self.glide = glide;
        self
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Resume the context if needed, then start both layers and both LFOs
    pub async fn start(&mut self, engine: &mut Engine) -> Result<(), EngineError> {
        if self.playing {
            return Ok(());
        }
        engine.ensure_running().await?;

        engine.start(&mut self.body)?;
        engine.start(&mut self.texture)?;
        engine.start(&mut self.swell_lfo)?;
        engine.start(&mut self.sweep_lfo)?;
        self.playing = true;
        Ok(())
    }

    /// Stop, then replace both noise layers with fresh unstarted ones
    pub fn stop(&mut self, engine: &mut Engine) -> Result<(), EngineError> {
        if !self.playing {
            return Ok(());
        }
        engine.stop(&mut self.body)?;
        engine.stop(&mut self.texture)?;
        engine.stop(&mut self.swell_lfo)?;
        engine.stop(&mut self.sweep_lfo)?;
        self.playing = false;

        let body = engine.noise(BODY_COLOR);
        engine.connect(&body, &self.body_filter)?;
        engine.dispose(mem::replace(&mut self.body, body))?;

        let texture = engine.noise(TEXTURE_COLOR);
        engine.connect(&texture, &self.texture_filter)?;
        engine.dispose(mem::replace(&mut self.texture, texture))
    }

    /// Ramp the output gain. The swell gain belongs to the LFO.
    pub fn set_volume(&mut self, engine: &mut Engine, volume: f32) -> Result<(), EngineError> {
        self.volume = volume;
        engine.ramp_to(&mut self.output, volume, self.glide)
    }

    /// Stop if playing and release every node
    pub fn dispose(mut self, engine: &mut Engine) -> Result<(), EngineError> {
        self.stop(engine)?;
        self.release(engine)
    }

    fn release(self, engine: &mut Engine) -> Result<(), EngineError> {
        let Self {
            body,
            texture,
            body_filter,
            texture_filter,
            texture_gain,
            swell,
            mix,
            reverb,
            output,
            swell_lfo,
            sweep_lfo,
            ..
        } = self;

        engine.dispose(body)?;
        engine.dispose(texture)?;
        engine.dispose(body_filter)?;
        engine.dispose(texture_filter)?;
        engine.dispose(reverb)?;
        engine.dispose(texture_gain)?;
        engine.dispose(mix)?;
        engine.dispose(swell)?;
        engine.dispose(swell_lfo)?;
        engine.dispose(sweep_lfo)?;
        engine.dispose(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Playback;
    use crate::id::SequentialIds;
    use futures::executor::block_on;

    fn setup() -> (Engine, Handle<GainMessage>, Ocean) {
        let (mut engine, _) = Engine::offline(48_000);
        let master = engine.gain(1.0);
        engine.output(&master).unwrap();
        let ocean = Ocean::new(&mut engine, &mut SequentialIds::new("ocean"), &master).unwrap();
        (engine, master, ocean)
    }

    #[test]
    fn builds_eleven_nodes_feeding_master() {
        let (engine, master, ocean) = setup();
        assert_eq!(engine.node_count(), 12);
        assert_eq!(engine.input_count(&master), 1);
        assert_eq!(engine.input_count(&ocean.swell), 3);
        assert_eq!(engine.input_count(&ocean.body_filter), 2);
        assert_eq!(ocean.id().as_str(), "ocean-0");
        assert_eq!(ocean.volume(), 0.5);
    }

    #[test]
    fn start_starts_layers_and_lfos() {
        let (mut engine, _master, mut ocean) = setup();
        block_on(ocean.start(&mut engine)).unwrap();

        assert!(ocean.is_playing());
        assert_eq!(engine.playback(&ocean.body), Some(Playback::Started));
        assert_eq!(engine.playback(&ocean.texture), Some(Playback::Started));
        assert_eq!(engine.playback(&ocean.swell_lfo), Some(Playback::Started));
        assert_eq!(engine.playback(&ocean.sweep_lfo), Some(Playback::Started));
    }

    #[test]
    fn stop_rebuilds_only_the_noise_layers() {
        let (mut engine, _master, mut ocean) = setup();
        block_on(ocean.start(&mut engine)).unwrap();
        let body = ocean.body.id();
        let reverb = ocean.reverb.id();

        ocean.stop(&mut engine).unwrap();
        assert!(!ocean.is_playing());
        assert_ne!(ocean.body.id(), body);
        assert_eq!(ocean.reverb.id(), reverb);
        assert_eq!(engine.playback(&ocean.body), Some(Playback::Idle));
        assert_eq!(engine.playback(&ocean.swell_lfo), Some(Playback::Stopped));
        assert_eq!(engine.node_count(), 12);
        assert_eq!(engine.input_count(&ocean.body_filter), 2);

        block_on(ocean.start(&mut engine)).unwrap();
        assert!(ocean.is_playing());
    }

    #[test]
    fn redundant_calls_are_no_ops() {
        let (mut engine, _master, mut ocean) = setup();
        ocean.stop(&mut engine).unwrap();
        block_on(ocean.start(&mut engine)).unwrap();
        block_on(ocean.start(&mut engine)).unwrap();
        assert!(ocean.is_playing());
    }

    #[test]
    fn set_volume_targets_the_output_gain() {
        let (mut engine, _master, mut ocean) = setup();
        ocean.set_volume(&mut engine, 0.8).unwrap();
        assert_eq!(ocean.volume(), 0.8);
    }

    #[test]
    fn unwired_ocean_leaves_no_nodes_behind() {
        let (mut engine, _) = Engine::offline(48_000);
        let (mut other, _) = Engine::offline(48_000);
        for _ in 0..40 {
            other.gain(1.0);
        }
        let stranger = other.gain(1.0);

        let result = Ocean::new(&mut engine, &mut SequentialIds::new("ocean"), &stranger);
        assert_eq!(result.err(), Some(EngineError::UnknownNode(stranger.id())));
        assert_eq!(engine.node_count(), 0);
    }

    #[test]
    fn dispose_releases_every_node() {
        let (mut engine, master, mut ocean) = setup();
        block_on(ocean.start(&mut engine)).unwrap();
        ocean.dispose(&mut engine).unwrap();

        assert_eq!(engine.node_count(), 1);
        assert_eq!(engine.input_count(&master), 0);
    }
}

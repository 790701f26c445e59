mod common;

use std::time::Duration;

use futures::executor::block_on;

use rauschen::nodes::{FilterKind, FilterMessage, GainMessage, NoiseColor};
use rauschen::{ContextState, Engine, EngineError, Playback, BLOCK_SIZE};

use common::{init_tracing, render, rms, SAMPLE_RATE};

fn running_engine() -> (Engine, rtrb::Consumer<f32>) {
    init_tracing();
    let (mut engine, output) = Engine::offline(SAMPLE_RATE);
    block_on(engine.ensure_running()).unwrap();
    (engine, output)
}

#[test]
fn starts_suspended_and_renders_nothing() {
    init_tracing();
    let (mut engine, mut output) = Engine::offline(SAMPLE_RATE);
    assert_eq!(engine.state(), ContextState::Suspended);
    assert!(!engine.process());
    assert_eq!(engine.render(8), 0);
    assert_eq!(engine.blocks_processed(), 0);
    assert!(output.pop().is_err());

    block_on(engine.ensure_running()).unwrap();
    block_on(engine.ensure_running()).unwrap();
    assert_eq!(engine.state(), ContextState::Running);
    assert_eq!(engine.render(8), 8);
    assert_eq!(output.slots(), 8 * BLOCK_SIZE);

    engine.suspend();
    assert_eq!(engine.state(), ContextState::Suspended);
    assert!(!engine.process());
}

#[test]
fn unconnected_destination_outputs_silence() {
    let (mut engine, mut output) = running_engine();
    let samples = render(&mut engine, &mut output, 4);
    assert_eq!(samples.len(), 4 * BLOCK_SIZE);
    assert!(samples.iter().all(|s| *s == 0.0));
}

#[test]
fn noise_generators_are_one_shot() {
    let (mut engine, _output) = running_engine();
    let mut noise = engine.noise(NoiseColor::White);
    let id = noise.id();

    assert_eq!(engine.playback(&noise), Some(Playback::Idle));
    assert_eq!(engine.stop(&mut noise), Err(EngineError::NotStarted(id)));

    engine.start(&mut noise).unwrap();
    assert_eq!(engine.start(&mut noise), Err(EngineError::AlreadyStarted(id)));

    engine.stop(&mut noise).unwrap();
    engine.stop(&mut noise).unwrap();
    assert_eq!(engine.playback(&noise), Some(Playback::Stopped));
    assert_eq!(engine.start(&mut noise), Err(EngineError::Restart(id)));
}

#[test]
fn lfos_can_restart() {
    let (mut engine, _output) = running_engine();
    let mut lfo = engine.lfo(1.0, 0.0, 1.0);

    engine.start(&mut lfo).unwrap();
    engine.stop(&mut lfo).unwrap();
    engine.start(&mut lfo).unwrap();
    assert_eq!(engine.playback(&lfo), Some(Playback::Started));
}

#[test]
fn ramp_reaches_its_target() {
    let (mut engine, mut output) = running_engine();
    let mut noise = engine.noise(NoiseColor::White);
    let mut gain = engine.gain(1.0);
    engine.connect(&noise, &gain).unwrap();
    engine.output(&gain).unwrap();
    engine.start(&mut noise).unwrap();

    let loud = rms(&render(&mut engine, &mut output, 10));
    engine.ramp_to(&mut gain, 0.25, Duration::from_millis(50)).unwrap();
    // 50ms = 2400 samples = 37.5 blocks
    render(&mut engine, &mut output, 38);
    let quiet = rms(&render(&mut engine, &mut output, 100));

    assert!((quiet / loud - 0.25).abs() < 0.05, "ratio {}", quiet / loud);
}

#[test]
fn ramps_while_suspended_never_fill_the_queue() {
    init_tracing();
    let (engine, mut output) = Engine::offline(SAMPLE_RATE);
    let mut engine = engine.with_queue_size(4);
    let mut noise = engine.noise(NoiseColor::White);
    let mut gain = engine.gain(1.0);
    engine.connect(&noise, &gain).unwrap();
    engine.output(&gain).unwrap();
    engine.start(&mut noise).unwrap();

    for i in 0..1000 {
        engine.ramp_to(&mut gain, i as f32, Duration::from_millis(10)).unwrap();
    }
    engine.ramp_to(&mut gain, 0.0, Duration::ZERO).unwrap();

    block_on(engine.ensure_running()).unwrap();
    assert_eq!(rms(&render(&mut engine, &mut output, 4)), 0.0);
}

#[test]
fn zero_duration_ramp_is_immediate() {
    let (mut engine, mut output) = running_engine();
    let mut noise = engine.noise(NoiseColor::Pink);
    let mut gain = engine.gain(1.0);
    engine.connect(&noise, &gain).unwrap();
    engine.output(&gain).unwrap();
    engine.start(&mut noise).unwrap();
    render(&mut engine, &mut output, 2);

    engine.ramp_to(&mut gain, 0.0, Duration::ZERO).unwrap();
    assert_eq!(rms(&render(&mut engine, &mut output, 1)), 0.0);
}

#[test]
fn disconnect_and_dispose_cut_the_signal() {
    let (mut engine, mut output) = running_engine();
    let mut noise = engine.noise(NoiseColor::Brown);
    let gain = engine.gain(1.0);
    engine.connect(&noise, &gain).unwrap();
    engine.connect(&noise, &gain).unwrap();
    engine.output(&gain).unwrap();
    engine.start(&mut noise).unwrap();

    assert_eq!(engine.input_count(&gain), 1);
    assert!(rms(&render(&mut engine, &mut output, 10)) > 0.0);

    assert!(engine.disconnect(&noise, &gain));
    assert!(!engine.disconnect(&noise, &gain));
    assert_eq!(rms(&render(&mut engine, &mut output, 2)), 0.0);

    assert_eq!(engine.node_count(), 2);
    engine.dispose(noise).unwrap();
    engine.dispose(gain).unwrap();
    assert_eq!(engine.node_count(), 0);
    assert_eq!(engine.output_input_count(), 0);
}

#[test]
fn foreign_and_disposed_nodes_are_unknown() {
    let (mut engine, _output) = running_engine();
    let noise = engine.noise(NoiseColor::White);
    let disposed = noise.id();
    engine.dispose(noise).unwrap();

    // Ids are never reused
    let gain = engine.gain(1.0);
    assert_ne!(gain.id(), disposed);

    // A handle from another engine, past any id this engine has handed out
    let (mut other, _) = Engine::offline(SAMPLE_RATE);
    for _ in 0..9 {
        other.gain(1.0);
    }
    let mut stranger = other.noise(NoiseColor::White);
    let id = stranger.id();

    assert_eq!(engine.output(&stranger), Err(EngineError::UnknownNode(id)));
    assert_eq!(engine.connect(&gain, &stranger), Err(EngineError::UnknownNode(id)));
    assert_eq!(engine.start(&mut stranger), Err(EngineError::UnknownNode(id)));
    assert_eq!(engine.playback(&stranger), None);
    assert_eq!(engine.dispose(stranger), Err(EngineError::UnknownNode(id)));
    assert_eq!(engine.node_count(), 1);
}

#[test]
fn lfo_modulates_filter_cutoff() {
    let (mut engine, mut output) = running_engine();
    let mut noise = engine.noise(NoiseColor::White);
    let filter = engine.filter(18_000.0, FilterKind::LowPass);
    let mut sweep = engine.lfo(0.0, 200.0, 200.0);
    engine.connect(&noise, &filter).unwrap();
    engine.modulate(&sweep, &filter).unwrap();
    engine.output(&filter).unwrap();
    engine.start(&mut noise).unwrap();
    engine.start(&mut sweep).unwrap();
    let modulated = rms(&render(&mut engine, &mut output, 50));

    let (mut engine, mut output) = running_engine();
    let mut noise = engine.noise(NoiseColor::White);
    let filter = engine.filter(18_000.0, FilterKind::LowPass);
    engine.connect(&noise, &filter).unwrap();
    engine.output(&filter).unwrap();
    engine.start(&mut noise).unwrap();
    let open = rms(&render(&mut engine, &mut output, 50));

    assert!(modulated < open * 0.3, "modulated {modulated}, open {open}");
}

#[test]
fn parameter_messages_reach_nodes() {
    let (mut engine, mut output) = running_engine();
    let mut noise = engine.noise(NoiseColor::White);
    let mut filter = engine.filter(18_000.0, FilterKind::LowPass);
    let mut gain = engine.gain(1.0);
    engine.connect(&noise, &filter).unwrap();
    engine.connect(&filter, &gain).unwrap();
    engine.output(&gain).unwrap();
    engine.start(&mut noise).unwrap();
    let open = rms(&render(&mut engine, &mut output, 50));

    engine.send(&mut filter, FilterMessage::SetFrequency(200.0)).unwrap();
    engine.send(&mut gain, GainMessage::SetGain(1.0)).unwrap();
    render(&mut engine, &mut output, 10);
    let closed = rms(&render(&mut engine, &mut output, 50));

    assert!(closed < open * 0.3, "closed {closed}, open {open}");
}

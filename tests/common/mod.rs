#![allow(dead_code)]

use rauschen::{Engine, NoiseManager, SequentialIds, BLOCK_SIZE};
use rtrb::Consumer;

pub const SAMPLE_RATE: u32 = 48_000;

/// Blocks per second at [`SAMPLE_RATE`]
pub const BLOCKS_PER_SEC: usize = SAMPLE_RATE as usize / BLOCK_SIZE;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A manager over an offline engine, with predictable source ids
pub fn offline_manager() -> (NoiseManager, Consumer<f32>) {
    init_tracing();
    let (engine, output) = Engine::offline(SAMPLE_RATE);
    let manager = NoiseManager::new(engine).with_id_provider(SequentialIds::new("src"));
    (manager, output)
}

/// Render `blocks` blocks, draining the output as it goes.
///
/// Returns every sample that reached the output.
pub fn render(engine: &mut Engine, output: &mut Consumer<f32>, blocks: usize) -> Vec<f32> {
    let mut samples = Vec::with_capacity(blocks * BLOCK_SIZE);
    for _ in 0..blocks {
        if !engine.process() {
            break;
        }
        while let Ok(sample) = output.pop() {
            samples.push(sample);
        }
    }
    samples
}

pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

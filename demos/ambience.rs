//! Play the default noise sources: white, pink and ocean (brown muted)
//!
//! Run with: cargo run --example ambience --features cpal_sink

use std::thread::sleep;
use std::time::{Duration, Instant};

use futures::executor::block_on;

use rauschen::{Engine, NoiseManager, BLOCK_SIZE};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let engine = Engine::default_output().ok_or("No audio device")?;
    let mut manager = NoiseManager::new(engine);

    let ids = manager.create_defaults()?;
    for source in manager.sources() {
        println!("{}  {:<6} {}", source.id(), source.name(), source.color());
    }

    // defaults are white, brown, pink, ocean
    manager.set_volume(ids[0].as_str(), 0.2);
    manager.set_volume(ids[1].as_str(), 0.0);
    manager.set_volume(ids[2].as_str(), 0.3);
    manager.set_volume(ids[3].as_str(), 0.8);

    block_on(manager.start_all_active());

    println!("Playing... Ctrl+C to stop");

    let start = Instant::now();
    let rate = manager.engine().sample_rate() as f64;
    let mut blocks = 0u64;

    loop {
        let target = (start.elapsed().as_secs_f64() * rate / BLOCK_SIZE as f64) as u64 + 6; // 6 blocks buffer
        while blocks < target {
            manager.engine_mut().process();
            blocks += 1;
        }
        sleep(Duration::from_micros(500));
    }
}

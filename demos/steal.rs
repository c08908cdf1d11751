/// Voice stealing walkthrough: fill the pool, then watch the oldest binding
/// get evicted with a stop/play pair.
use std::time::{Duration, Instant};

use polyvoice::backend::Command;
use polyvoice::engine::Engine;
use polyvoice::store::SampleStore;
use polyvoice::{KEY_LOW, POLYPHONY};

fn main() {
    println!("=== Voice Stealing ===\n");

    let mut store = SampleStore::new();
    store
        .add_pcm(vec![0.5; 256])
        .expect("one sample always fits");
    let mut engine = Engine::new(Vec::<Command>::new(), store);

    let t0 = Instant::now();
    println!("Filling all {POLYPHONY} slots:");
    for i in 0..POLYPHONY as u8 {
        let key = KEY_LOW + i;
        engine.note_on(key, 100, t0 + Duration::from_millis(i as u64 * 10));
        println!("  note-on key {key}");
    }

    let next = KEY_LOW + POLYPHONY as u8;
    println!("\nPool is full. note-on key {next} must steal:");

    let before = engine.backend().len();
    engine.note_on(next, 100, t0 + Duration::from_secs(1));

    for command in &engine.backend()[before..] {
        println!("  -> {:?}", command);
    }

    let slot = engine
        .table()
        .slots()
        .iter()
        .find(|s| s.key() == Some(next))
        .expect("the new key is bound somewhere");
    println!(
        "\nSlot {} (the oldest binding, key {}) was evicted.",
        slot.index(),
        KEY_LOW
    );
}

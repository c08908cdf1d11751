/// Chord allocation walkthrough: distinct keys land on distinct slots, and
/// each carries its own key-position gain pair.
use std::time::Instant;

use polyvoice::backend::Command;
use polyvoice::engine::Engine;
use polyvoice::store::SampleStore;
use polyvoice::voice::slot::SlotState;

fn main() {
    println!("=== Chord Allocation ===\n");

    let mut store = SampleStore::new();
    store
        .add_pcm(vec![0.5; 256])
        .expect("one sample always fits");

    // A recording backend: every command the engine issues is kept.
    let mut engine = Engine::new(Vec::<Command>::new(), store);

    let chord = [48u8, 52, 55, 60];
    println!("Playing {:?}:", chord);
    let t0 = Instant::now();
    for &key in &chord {
        engine.note_on(key, 100, t0);
    }

    for slot in engine.table().slots() {
        if slot.state() == SlotState::Free {
            continue;
        }
        let (l, r) = slot.gain();
        println!(
            "  slot {:2} <- key {:?}  gain L {:.4} / R {:.4}",
            slot.index(),
            slot.key().unwrap_or_default(),
            l,
            r
        );
    }

    println!("\nCommands issued to the backend:");
    for command in engine.backend() {
        println!("  {:?}", command);
    }

    println!("\nReleasing the chord:");
    engine.note_off(52, t0);
    let releasing = engine
        .table()
        .slots()
        .iter()
        .filter(|s| s.state() == SlotState::Releasing)
        .count();
    println!("  {releasing} slot now releasing; the rest keep sounding");
}

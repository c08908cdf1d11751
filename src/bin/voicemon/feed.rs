//! Demo note feed: a scripted byte stream in the instrument's 3-byte wire
//! framing, plus a synthesized sample store so the monitor needs no assets.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use polyvoice::io::midi::{STATUS_NOTE_OFF, STATUS_NOTE_ON};
use polyvoice::store::SampleStore;
use polyvoice::{KEY_HIGH, KEY_LOW, SOURCE_RATE};

/// Build a store of three synthesized plucks split across the key range.
pub fn demo_store() -> SampleStore {
    let mut store = SampleStore::new();
    for freq in [110.0, 220.0, 440.0] {
        store
            .add_pcm(pluck(freq, 1.5))
            .expect("three samples fit any table");
    }
    store.assign(KEY_LOW, 48, 0).expect("range is valid");
    store.assign(49, 68, 1).expect("range is valid");
    store.assign(69, KEY_HIGH, 2).expect("range is valid");
    store
}

/// Exponentially decaying sine at the store's recording rate.
fn pluck(freq: f32, seconds: f32) -> Vec<f32> {
    let frames = (seconds * SOURCE_RATE as f32) as usize;
    (0..frames)
        .map(|i| {
            let t = i as f32 / SOURCE_RATE as f32;
            (t * freq * std::f32::consts::TAU).sin() * (-3.0 * t).exp() * 0.8
        })
        .collect()
}

/// Stream an endless arpeggio until `running` goes false. The receiver end
/// plugs straight into the control loop as its byte source.
pub fn spawn(running: Arc<AtomicBool>) -> (Receiver<u8>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        // Enough simultaneous notes to exercise stealing now and then.
        let pattern: &[u8] = &[29, 41, 53, 60, 64, 67, 72, 76, 79, 84, 88, 89, 45, 57];
        let mut held: Vec<u8> = Vec::new();

        'outer: while running.load(Ordering::Relaxed) {
            for &key in pattern {
                if !running.load(Ordering::Relaxed) {
                    break 'outer;
                }
                for byte in [STATUS_NOTE_ON, key, 100] {
                    if tx.send(byte).is_err() {
                        break 'outer;
                    }
                }
                held.push(key);

                // Let chords stack four deep before releasing the oldest.
                if held.len() > 4 {
                    let old = held.remove(0);
                    for byte in [STATUS_NOTE_OFF, old, 0] {
                        if tx.send(byte).is_err() {
                            break 'outer;
                        }
                    }
                }
                thread::sleep(Duration::from_millis(180));
            }
        }
    });
    (rx, handle)
}

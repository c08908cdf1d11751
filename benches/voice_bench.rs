//! Benchmarks for the control core and the software mixer.
//!
//! Run with: cargo bench
//!
//! The control path runs once per loop tick and must stay far inside the
//! tick budget; the render path has the usual block deadlines (at 48kHz,
//! 256 samples = 5.33ms). Everything here should be orders of magnitude
//! under those bounds.

use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use polyvoice::backend::{Channel, Command};
use polyvoice::render::Renderer;
use polyvoice::store::SampleStore;
use polyvoice::voice::pan::stereo_gain;
use polyvoice::voice::reaper::Reaper;
use polyvoice::voice::table::VoiceTable;
use polyvoice::{DEAD_TIME, FADE, KEY_LOW, POLYPHONY};

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn bench_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("control/allocate");
    let t0 = Instant::now();

    // Stealing path: the pool starts and stays full, so every allocation
    // scans all slots twice (free scan, then oldest scan).
    let mut table = VoiceTable::new(POLYPHONY);
    for i in 0..POLYPHONY as u8 {
        table.allocate(KEY_LOW + i, stereo_gain(KEY_LOW + i), t0);
    }

    let mut n = 0u64;
    group.bench_function("steal_oldest", |b| {
        b.iter(|| {
            n += 1;
            let now = t0 + Duration::from_micros(n);
            black_box(table.allocate(black_box(60), stereo_gain(60), now));
        })
    });

    group.finish();
}

fn bench_reaper(c: &mut Criterion) {
    let mut group = c.benchmark_group("control/reaper");
    let t0 = Instant::now();

    let mut table = VoiceTable::new(POLYPHONY);
    for i in 0..POLYPHONY as u8 {
        table.allocate(KEY_LOW + i, stereo_gain(KEY_LOW + i), t0);
    }
    let reaper = Reaper::new(DEAD_TIME, FADE);
    let mut log: Vec<Command> = Vec::new();

    // Healthy pool: the sweep inspects every slot and frees none. This is
    // the steady-state cost paid on every control tick.
    group.bench_function("sweep_full_pool", |b| {
        b.iter(|| {
            log.clear();
            reaper.sweep(black_box(&mut table), &mut log, t0 + Duration::from_millis(1));
        })
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/blocks");

    let mut store = SampleStore::new();
    store.add_pcm(vec![0.3; 4096]).unwrap();

    let mut renderer = Renderer::new(POLYPHONY, 48_000, store);
    for slot in 0..POLYPHONY {
        renderer.apply(Command::Play {
            slot,
            sample: 0,
            looped: true,
        });
        renderer.apply(Command::SetGain {
            slot,
            channel: Channel::Left,
            value: 0.1,
        });
        renderer.apply(Command::SetGain {
            slot,
            channel: Channel::Right,
            value: 0.1,
        });
    }

    for &size in BLOCK_SIZES {
        let mut out = vec![0.0f32; size * 2];
        group.bench_with_input(BenchmarkId::new("full_polyphony", size), &size, |b, _| {
            b.iter(|| {
                renderer.render_block(black_box(&mut out));
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_allocation, bench_reaper, bench_render);
criterion_main!(benches);

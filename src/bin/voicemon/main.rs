//! voicemon - terminal monitor for the voice pool
//!
//! Plays a built-in demo feed through the full stack (framing → engine →
//! command ring → software mixer → cpal) and shows every slot's state live.
//!
//! Run with: cargo run --bin voicemon

mod feed;
mod ui;

use std::fs::File;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::event::{self, Event, KeyCode};
use tracing_subscriber::EnvFilter;

use polyvoice::backend::queue::CommandQueue;
use polyvoice::engine::{ControlLoop, Engine};
use polyvoice::io::source::EventReader;
use polyvoice::render::Renderer;
use polyvoice::{MAX_BLOCK_SIZE, POLYPHONY};

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    // The terminal owns stdout, so logs go to a file.
    let log = File::create("voicemon.log").wrap_err("failed to create log file")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Arc::new(log))
        .with_ansi(false)
        .init();

    let running = Arc::new(AtomicBool::new(true));
    let store = feed::demo_store();

    // Control side commands the render side over a lock-free ring.
    let (queue, mut commands) = CommandQueue::new(256);
    let engine = Arc::new(Mutex::new(Engine::new(queue, store.clone())));

    // Audio output. The demo adopts the device's rate; the renderer still
    // plays one stored frame per output frame, exactly like the hardware.
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let supported = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;
    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;

    let mut renderer = Renderer::new(POLYPHONY, sample_rate, store);
    let mut stereo = vec![0.0f32; MAX_BLOCK_SIZE * 2];

    let stream = device.build_output_stream(
        &supported.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut written = 0;

            while written < total_frames {
                let frames = (total_frames - written).min(MAX_BLOCK_SIZE);
                let block = &mut stereo[..frames * 2];
                renderer.process_block(&mut commands, block);

                for i in 0..frames {
                    let out = &mut data[(written + i) * channels..][..channels];
                    out[0] = block[i * 2];
                    if channels > 1 {
                        out[1] = block[i * 2 + 1];
                        for extra in &mut out[2..] {
                            *extra = 0.0;
                        }
                    }
                }
                written += frames;
            }
        },
        |err| tracing::error!("audio stream error: {err}"),
        None,
    )?;
    stream.play()?;

    // Demo byte feed and the control loop, each on their own thread.
    let (bytes, feed_handle) = feed::spawn(running.clone());
    let control_handle = {
        let engine = engine.clone();
        let running = running.clone();
        thread::spawn(move || {
            let mut control = ControlLoop::new(engine, EventReader::new(bytes));
            if let Err(err) = control.run(&running) {
                tracing::info!("control loop stopped: {err}");
            }
        })
    };

    run_ui(&engine, &running)?;

    running.store(false, Ordering::Relaxed);
    let _ = feed_handle.join();
    let _ = control_handle.join();
    Ok(())
}

fn run_ui(
    engine: &Arc<Mutex<Engine<CommandQueue>>>,
    running: &Arc<AtomicBool>,
) -> EyreResult<()> {
    let mut terminal = ratatui::init();

    let result = (|| -> EyreResult<()> {
        while running.load(Ordering::Relaxed) {
            // Brief lock: copy the pool state out, then draw unlocked.
            let snapshot = engine.lock().unwrap().snapshot();
            terminal.draw(|frame| ui::draw(frame, &snapshot))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        running.store(false, Ordering::Relaxed);
                    }
                }
            }
        }
        Ok(())
    })();

    ratatui::restore();
    result
}

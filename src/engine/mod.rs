// Purpose: the control context. Dispatches note events into the voice core,
// runs the reaper once per loop iteration, and keeps every multi-field slot
// mutation inside one short critical section.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::backend::{AudioBackend, Channel};
use crate::io::midi::NoteEvent;
use crate::io::source::{ByteSource, EventReader};
use crate::store::SampleStore;
use crate::voice::pan;
use crate::voice::reaper::Reaper;
use crate::voice::release::{ReleaseController, ReleasePolicy};
use crate::voice::slot::SlotState;
use crate::voice::table::VoiceTable;
use crate::{DEAD_TIME, FADE, KEY_HIGH, KEY_LOW, POLYPHONY};

/// Control-loop iteration period: the event poll timeout, and therefore the
/// reaper's cadence.
pub const CONTROL_TICK: Duration = Duration::from_millis(2);

/// The voice core plus the collaborators it commands.
///
/// All state here belongs to the control context. The render context never
/// touches it; it sees only the command stream the backend carries.
pub struct Engine<B> {
    table: VoiceTable,
    backend: B,
    release: ReleaseController,
    reaper: Reaper,
    store: SampleStore,
}

impl<B: AudioBackend> Engine<B> {
    /// Full polyphony, fade-release policy, default timing constants.
    pub fn new(backend: B, store: SampleStore) -> Self {
        Self::with_policy(backend, store, ReleasePolicy::Fade(FADE))
    }

    pub fn with_policy(backend: B, store: SampleStore, policy: ReleasePolicy) -> Self {
        Self {
            table: VoiceTable::new(POLYPHONY),
            backend,
            release: ReleaseController::new(policy),
            reaper: Reaper::new(DEAD_TIME, FADE),
            store,
        }
    }

    /// Allocate (or steal) a voice for `key` and start its sample.
    ///
    /// Velocity is accepted for interface completeness; nothing consults it
    /// beyond the framing layer, and a zero-velocity note-on allocates like
    /// any other (see `io::midi`).
    pub fn note_on(&mut self, key: u8, _velocity: u8, now: Instant) {
        let sample = match self.store.sample_for(key) {
            Some(sample) => sample,
            None => {
                tracing::trace!(key, "note-on outside playable range, dropped");
                return;
            }
        };

        let gain = pan::stereo_gain(key);
        let alloc = self.table.allocate(key, gain, now);
        if alloc.stolen {
            // Exactly one stop, then exactly one play, for the stolen slot.
            self.backend.stop(alloc.index);
        }
        self.backend.set_gain(alloc.index, Channel::Left, gain.0);
        self.backend.set_gain(alloc.index, Channel::Right, gain.1);
        self.backend.play(alloc.index, sample, false);
    }

    /// Begin release (or stop outright, per policy) for every slot bound to
    /// `key`.
    pub fn note_off(&mut self, key: u8, now: Instant) {
        if !(KEY_LOW..=KEY_HIGH).contains(&key) {
            tracing::trace!(key, "note-off outside playable range, dropped");
            return;
        }
        self.release
            .note_off(&mut self.table, &mut self.backend, key, now);
    }

    pub fn handle_event(&mut self, event: NoteEvent, now: Instant) {
        match event {
            NoteEvent::NoteOn { key, velocity } => self.note_on(key, velocity, now),
            NoteEvent::NoteOff { key, .. } => self.note_off(key, now),
        }
    }

    /// One reaper sweep. Run once per control-loop iteration.
    pub fn tick(&mut self, now: Instant) {
        self.reaper.sweep(&mut self.table, &mut self.backend, now);
    }

    pub fn table(&self) -> &VoiceTable {
        &self.table
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Copy-out of the pool state for observers (the monitor UI). Observers
    /// hold the engine lock only for the duration of this copy.
    pub fn snapshot(&self) -> Vec<VoiceSnapshot> {
        self.table
            .slots()
            .iter()
            .map(|slot| VoiceSnapshot {
                index: slot.index(),
                key: slot.key(),
                state: slot.state(),
                gain: slot.gain(),
            })
            .collect()
    }
}

/// One slot's externally interesting state, decoupled from the live table.
#[derive(Debug, Clone, Copy)]
pub struct VoiceSnapshot {
    pub index: usize,
    pub key: Option<u8>,
    pub state: SlotState,
    pub gain: (f32, f32),
}

/// Owns the event reader and drives a shared [`Engine`].
///
/// Each iteration: poll the source (no lock held while waiting), dispatch
/// the event under a brief lock, then run the reaper under another brief
/// lock. The lock is the mutual exclusion the slot invariants rely on; hold
/// it for the mutation and nothing else.
pub struct ControlLoop<S, B> {
    engine: Arc<Mutex<Engine<B>>>,
    reader: EventReader<S>,
    tick: Duration,
}

impl<S: ByteSource, B: AudioBackend> ControlLoop<S, B> {
    pub fn new(engine: Arc<Mutex<Engine<B>>>, reader: EventReader<S>) -> Self {
        Self {
            engine,
            reader,
            tick: CONTROL_TICK,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Run until `running` goes false or the transport fails.
    pub fn run(&mut self, running: &AtomicBool) -> io::Result<()> {
        while running.load(Ordering::Relaxed) {
            self.step()?;
        }
        Ok(())
    }

    /// One loop iteration: at most one event, exactly one reaper sweep.
    pub fn step(&mut self) -> io::Result<()> {
        let event = self.reader.poll(self.tick)?;

        if let Some(event) = event {
            let now = Instant::now();
            let mut engine = self.engine.lock().unwrap();
            engine.handle_event(event, now);
        }

        let mut engine = self.engine.lock().unwrap();
        engine.tick(Instant::now());
        Ok(())
    }
}

//! Per-tick maintenance sweep.
//!
//! Two safety nets, both bounded and linear in the pool size:
//!
//! - dead-time: a sample stream that never signals completion would pin its
//!   slot forever; anything occupied longer than the ceiling is cut loose,
//!   note-off or not.
//! - fade completion: the release ramp has no completion callback, so the
//!   sweep frees Releasing slots once their fade has run its course.

use std::time::{Duration, Instant};

use crate::backend::AudioBackend;
use crate::voice::slot::SlotState;
use crate::voice::table::VoiceTable;

pub struct Reaper {
    dead_time: Duration,
    fade: Duration,
}

impl Reaper {
    pub fn new(dead_time: Duration, fade: Duration) -> Self {
        Self { dead_time, fade }
    }

    /// Run both rules over the whole pool. Called once per control-loop
    /// tick; never blocks and never allocates.
    pub fn sweep<B: AudioBackend>(&self, table: &mut VoiceTable, backend: &mut B, now: Instant) {
        for index in 0..table.len() {
            let slot = table.slot_mut(index);
            match slot.state() {
                SlotState::Free => {}
                _ if now.duration_since(slot.allocated_at()) >= self.dead_time => {
                    // Unconditional: applies to Active and Releasing alike.
                    slot.clear();
                    backend.stop(index);
                }
                SlotState::Releasing => {
                    let started = match slot.release_started_at() {
                        Some(t) => t,
                        None => continue, // unreachable per slot invariant
                    };
                    if now.duration_since(started) >= self.fade {
                        slot.clear();
                        backend.stop(index);
                        // Snap the envelope back to unity so the next
                        // occupant does not start half-faded.
                        backend.fade_in(index, Duration::ZERO);
                    }
                }
                SlotState::Active => {}
            }
        }
    }
}

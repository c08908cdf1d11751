//! Note-off handling.
//!
//! The original shipped as two near-identical programs, one fading notes out
//! and one cutting them dead. One controller with a policy knob replaces the
//! pair.

use std::time::{Duration, Instant};

use crate::backend::AudioBackend;
use crate::voice::slot::SlotState;
use crate::voice::table::VoiceTable;

/// What happens to a voice when its note ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleasePolicy {
    /// Ramp the voice down over the duration, then let the reaper free it.
    Fade(Duration),
    /// Stop and free synchronously. No Releasing state exists under this
    /// policy.
    Immediate,
}

pub struct ReleaseController {
    policy: ReleasePolicy,
}

impl ReleaseController {
    pub fn new(policy: ReleasePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ReleasePolicy {
        self.policy
    }

    /// Handle a note-off for `key`.
    ///
    /// Scans every slot rather than any per-key index: one note-off silences
    /// ALL currently-sounding instances of the key, not just the newest.
    pub fn note_off<B: AudioBackend>(
        &self,
        table: &mut VoiceTable,
        backend: &mut B,
        key: u8,
        now: Instant,
    ) {
        for index in 0..table.len() {
            let slot = table.slot_mut(index);
            if slot.key() != Some(key) {
                continue;
            }
            match self.policy {
                ReleasePolicy::Fade(duration) => {
                    // Slots already Releasing keep their original fade; a
                    // second note-off must not restart the ramp.
                    if slot.state() == SlotState::Active {
                        slot.begin_release(now);
                        backend.fade_out(index, duration);
                    }
                }
                ReleasePolicy::Immediate => {
                    slot.clear();
                    backend.stop(index);
                }
            }
        }
    }
}

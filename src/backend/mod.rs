// Purpose: the command surface the control core drives the mixer through.
// Commands are fire-and-forget: outcomes are never checked, and nothing on
// the note-handling path blocks or aborts because a command went nowhere.

#[cfg(feature = "rtrb")]
pub mod queue;

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index into the sample store's PCM table.
pub type SampleId = u8;

/// One side of a voice's stereo gain pair.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Left,
    Right,
}

/// Everything the control core may ask of the audio side.
///
/// The slot → sub-mixer → master routing is fixed at initialization; only
/// these commands flow at runtime. `play` also restarts the slot's fade
/// envelope at unity, which is why stealing a half-faded voice needs no
/// separate envelope reset.
pub trait AudioBackend: Send {
    fn play(&mut self, slot: usize, sample: SampleId, looped: bool);
    fn stop(&mut self, slot: usize);
    fn set_gain(&mut self, slot: usize, channel: Channel, value: f32);
    fn fade_out(&mut self, slot: usize, duration: Duration);
    fn fade_in(&mut self, slot: usize, duration: Duration);
}

/// Wire form of the backend calls, for queueing toward the render context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Play {
        slot: usize,
        sample: SampleId,
        looped: bool,
    },
    Stop {
        slot: usize,
    },
    SetGain {
        slot: usize,
        channel: Channel,
        value: f32,
    },
    FadeOut {
        slot: usize,
        duration: Duration,
    },
    FadeIn {
        slot: usize,
        duration: Duration,
    },
}

/// A plain `Vec<Command>` records every command it is handed. Tests assert
/// against the recorded stream directly.
impl AudioBackend for Vec<Command> {
    fn play(&mut self, slot: usize, sample: SampleId, looped: bool) {
        self.push(Command::Play {
            slot,
            sample,
            looped,
        });
    }

    fn stop(&mut self, slot: usize) {
        self.push(Command::Stop { slot });
    }

    fn set_gain(&mut self, slot: usize, channel: Channel, value: f32) {
        self.push(Command::SetGain {
            slot,
            channel,
            value,
        });
    }

    fn fade_out(&mut self, slot: usize, duration: Duration) {
        self.push(Command::FadeOut { slot, duration });
    }

    fn fade_in(&mut self, slot: usize, duration: Duration) {
        self.push(Command::FadeIn { slot, duration });
    }
}

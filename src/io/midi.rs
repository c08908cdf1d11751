//! Note events and the 3-byte wire framing that carries them.
//!
//! The control stream is a plain byte stream: a status byte, then a key
//! byte, then a velocity byte. One event per complete triple. There is no
//! running status and no channel nibble to filter on.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Status byte opening a note-on frame.
pub const STATUS_NOTE_ON: u8 = 0x90;
/// Status byte opening a note-off frame.
pub const STATUS_NOTE_OFF: u8 = 0x80;

/// A decoded control-stream event.
///
/// A note-on with velocity 0 stays a note-on. The wider protocol family
/// treats it as a note-off; this instrument's stream does not, and the
/// divergence is intentional. Velocity is otherwise only ever consulted as
/// zero vs. non-zero.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    NoteOn { key: u8, velocity: u8 },
    NoteOff { key: u8, velocity: u8 },
}

impl NoteEvent {
    pub fn key(&self) -> u8 {
        match *self {
            NoteEvent::NoteOn { key, .. } | NoteEvent::NoteOff { key, .. } => key,
        }
    }
}

/// Where we are inside the current frame.
#[derive(Debug, Clone, Copy)]
enum FrameStage {
    Status,
    Key { on: bool },
    Velocity { on: bool, key: u8 },
}

/// Incremental decoder for the 3-byte framing.
///
/// Feed it bytes as they arrive; it hands back an event once a triple
/// completes. Unrecognized status bytes are skipped. A status byte arriving
/// mid-frame abandons the partial frame and starts a new one, so the decoder
/// resynchronizes instead of pairing a stale key with fresh data.
#[derive(Debug)]
pub struct FrameDecoder {
    stage: FrameStage,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            stage: FrameStage::Status,
        }
    }

    /// Consume one byte; returns a complete event if this byte finished one.
    pub fn feed(&mut self, byte: u8) -> Option<NoteEvent> {
        if byte >= 0x80 {
            // Status bytes always restart framing, wherever we were.
            self.stage = match byte {
                STATUS_NOTE_ON => FrameStage::Key { on: true },
                STATUS_NOTE_OFF => FrameStage::Key { on: false },
                _ => FrameStage::Status,
            };
            return None;
        }

        match self.stage {
            FrameStage::Status => None, // data byte with no frame open
            FrameStage::Key { on } => {
                self.stage = FrameStage::Velocity { on, key: byte };
                None
            }
            FrameStage::Velocity { on, key } => {
                self.stage = FrameStage::Status;
                Some(if on {
                    NoteEvent::NoteOn {
                        key,
                        velocity: byte,
                    }
                } else {
                    NoteEvent::NoteOff {
                        key,
                        velocity: byte,
                    }
                })
            }
        }
    }

    /// Drop any partially assembled frame. Used when the transport times out
    /// mid-frame and the remaining bytes may never arrive.
    pub fn reset(&mut self) {
        self.stage = FrameStage::Status;
    }

    /// True while a frame has started but not yet completed.
    pub fn mid_frame(&self) -> bool {
        !matches!(self.stage, FrameStage::Status)
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

//! Lock-free command path from the control context to the render context.

use std::time::Duration;

use rtrb::{Consumer, Producer, RingBuffer};

use crate::backend::{AudioBackend, Channel, Command, SampleId};

/// Producer half of the command ring. Implements [`AudioBackend`] so the
/// engine drives it like any other backend; the render context drains the
/// consumer half at block boundaries.
pub struct CommandQueue {
    tx: Producer<Command>,
}

impl CommandQueue {
    /// Build a queue, returning the control-side backend and the
    /// render-side consumer.
    pub fn new(capacity: usize) -> (Self, Consumer<Command>) {
        let (tx, rx) = RingBuffer::new(capacity);
        (Self { tx }, rx)
    }

    fn send(&mut self, command: Command) {
        // A full ring means the render side has fallen far behind. Dropping
        // the command is the only option that never blocks note handling;
        // the reaper corrects any state this leaves stuck.
        if self.tx.push(command).is_err() {
            tracing::warn!(?command, "command ring full, dropping");
        }
    }
}

impl AudioBackend for CommandQueue {
    fn play(&mut self, slot: usize, sample: SampleId, looped: bool) {
        self.send(Command::Play {
            slot,
            sample,
            looped,
        });
    }

    fn stop(&mut self, slot: usize) {
        self.send(Command::Stop { slot });
    }

    fn set_gain(&mut self, slot: usize, channel: Channel, value: f32) {
        self.send(Command::SetGain {
            slot,
            channel,
            value,
        });
    }

    fn fade_out(&mut self, slot: usize, duration: Duration) {
        self.send(Command::FadeOut { slot, duration });
    }

    fn fade_in(&mut self, slot: usize, duration: Duration) {
        self.send(Command::FadeIn { slot, duration });
    }
}

//! Byte transport and the event reader that sits on top of it.
//!
//! The original control loop spun on "is a byte ready yet", which could
//! stall forever on a truncated frame. Here the transport is a blocking read
//! with a timeout, and the reader drops any frame whose remaining bytes do
//! not arrive within the frame timeout.

use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::io::midi::{FrameDecoder, NoteEvent};

/// How long a started frame may wait for its remaining bytes.
pub const FRAME_TIMEOUT: Duration = Duration::from_millis(20);

/// One byte at a time from the control stream.
pub trait ByteSource {
    /// Block for up to `timeout` waiting for the next byte.
    ///
    /// `Ok(None)` means the timeout elapsed with nothing to read; `Err` means
    /// the transport itself failed and no further bytes will come.
    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>>;
}

/// An in-process byte pipe is a perfectly good transport.
impl ByteSource for Receiver<u8> {
    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        match self.recv_timeout(timeout) {
            Ok(byte) => Ok(Some(byte)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "note event source disconnected",
            )),
        }
    }
}

/// Assembles [`NoteEvent`]s from a [`ByteSource`].
pub struct EventReader<S> {
    source: S,
    decoder: FrameDecoder,
    frame_timeout: Duration,
    frame_started: Option<Instant>,
}

impl<S: ByteSource> EventReader<S> {
    pub fn new(source: S) -> Self {
        Self::with_frame_timeout(source, FRAME_TIMEOUT)
    }

    pub fn with_frame_timeout(source: S, frame_timeout: Duration) -> Self {
        Self {
            source,
            decoder: FrameDecoder::new(),
            frame_timeout,
            frame_started: None,
        }
    }

    /// Wait up to `timeout` for the next complete event.
    ///
    /// Returns `Ok(None)` when the wait elapses without completing a frame.
    /// A partial frame older than the frame timeout is dropped on the way,
    /// so a truncated message can never wedge the reader.
    pub fn poll(&mut self, timeout: Duration) -> io::Result<Option<NoteEvent>> {
        let deadline = Instant::now() + timeout;

        loop {
            self.expire_partial_frame();

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let mut wait = deadline - now;
            if let Some(started) = self.frame_started {
                // Wake in time to expire the frame even if no byte arrives.
                let frame_deadline = started + self.frame_timeout;
                if frame_deadline > now {
                    wait = wait.min(frame_deadline - now);
                }
            }

            match self.source.read_byte(wait)? {
                None => continue,
                Some(byte) => {
                    let event = self.decoder.feed(byte);
                    self.frame_started = if self.decoder.mid_frame() {
                        self.frame_started.or(Some(Instant::now()))
                    } else {
                        None
                    };
                    if event.is_some() {
                        return Ok(event);
                    }
                }
            }
        }
    }

    fn expire_partial_frame(&mut self) {
        if let Some(started) = self.frame_started {
            if started.elapsed() >= self.frame_timeout && self.decoder.mid_frame() {
                tracing::debug!("dropping truncated frame after {:?}", self.frame_timeout);
                self.decoder.reset();
                self.frame_started = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted transport: a queue of byte-or-gap steps.
    struct Script {
        steps: VecDeque<Step>,
    }

    enum Step {
        Byte(u8),
        Gap(Duration),
    }

    impl Script {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: steps.into(),
            }
        }
    }

    impl ByteSource for Script {
        fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
            match self.steps.pop_front() {
                Some(Step::Byte(b)) => Ok(Some(b)),
                Some(Step::Gap(gap)) => {
                    if gap <= timeout {
                        std::thread::sleep(gap);
                        match self.steps.pop_front() {
                            Some(Step::Byte(b)) => Ok(Some(b)),
                            other => {
                                if let Some(step) = other {
                                    self.steps.push_front(step);
                                }
                                Ok(None)
                            }
                        }
                    } else {
                        std::thread::sleep(timeout);
                        self.steps.push_front(Step::Gap(gap - timeout));
                        Ok(None)
                    }
                }
                None => Ok(None),
            }
        }
    }

    #[test]
    fn assembles_event_from_contiguous_bytes() {
        let script = Script::new(vec![Step::Byte(0x90), Step::Byte(60), Step::Byte(100)]);
        let mut reader = EventReader::new(script);
        let event = reader.poll(Duration::from_millis(50)).unwrap();
        assert_eq!(
            event,
            Some(NoteEvent::NoteOn {
                key: 60,
                velocity: 100
            })
        );
    }

    #[test]
    fn poll_times_out_on_silence() {
        let mut reader = EventReader::new(Script::new(vec![]));
        let event = reader.poll(Duration::from_millis(5)).unwrap();
        assert_eq!(event, None);
    }

    #[test]
    fn truncated_frame_is_dropped_after_frame_timeout() {
        // Status + key arrive, then a long gap, then a velocity byte that
        // must NOT complete the stale frame.
        let script = Script::new(vec![
            Step::Byte(0x90),
            Step::Byte(60),
            Step::Gap(Duration::from_millis(30)),
            Step::Byte(100),
        ]);
        let mut reader = EventReader::with_frame_timeout(script, Duration::from_millis(10));
        let event = reader.poll(Duration::from_millis(80)).unwrap();
        assert_eq!(event, None);
    }

    #[test]
    fn disconnected_channel_reports_transport_error() {
        let (tx, rx) = std::sync::mpsc::channel::<u8>();
        drop(tx);
        let mut reader = EventReader::new(rx);
        let err = reader.poll(Duration::from_millis(5)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}

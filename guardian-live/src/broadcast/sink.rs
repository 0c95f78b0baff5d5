//! Destinations for live-update frames.

use std::io::{self, Write};
use std::sync::mpsc::Sender;

/// Receives encoded frames for one subscriber.
///
/// An error ends that subscriber's stream and nothing else.
pub trait LiveSink {
    /// Deliver one frame.
    ///
    /// # Errors
    ///
    /// Returns an error when the subscriber can no longer be written to.
    fn send(&mut self, frame: &str) -> io::Result<()>;
}

/// Writes frames to any [`Write`] implementation and flushes after each.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Wrap `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the wrapped writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LiveSink for WriterSink<W> {
    fn send(&mut self, frame: &str) -> io::Result<()> {
        self.writer.write_all(frame.as_bytes())?;
        self.writer.flush()
    }
}

/// Forwards frames to an in-process channel.
///
/// Sending fails with [`io::ErrorKind::BrokenPipe`] once the receiver is
/// dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<String>,
}

impl ChannelSink {
    /// Forward frames to `sender`.
    #[must_use]
    pub const fn new(sender: Sender<String>) -> Self {
        Self { sender }
    }
}

impl LiveSink for ChannelSink {
    fn send(&mut self, frame: &str) -> io::Result<()> {
        self.sender
            .send(frame.to_owned())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "subscriber channel closed"))
    }
}

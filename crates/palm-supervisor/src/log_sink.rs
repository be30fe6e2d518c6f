//! Multi-producer, single-consumer ordered text channel.

use crate::{LogLine, LogReceiver, SupervisorError, SupervisorResult};

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

struct SinkState {
    next_sequence: u64,
    tx: mpsc::UnboundedSender<LogLine>,
}

impl SinkState {
    fn enqueue(&mut self, text: String) -> SupervisorResult<()> {
        let line = LogLine {
            sequence: self.next_sequence,
            text,
        };
        self.tx
            .send(line)
            .map_err(|_| SupervisorError::sink_closed())?;
        self.next_sequence += 1;
        Ok(())
    }
}

/// Writer half of the log channel. Cheap to clone, usable from any thread.
///
/// Every enqueue happens under one mutex, so sequence numbers and queue
/// order agree and chunks are never interleaved. The queue is unbounded:
/// writers never wait for the consumer.
#[derive(Clone)]
pub struct LogSink {
    state: Arc<Mutex<SinkState>>,
}

impl LogSink {
    /// Create a sink and the receiver for its single consumer.
    pub fn channel() -> (LogSink, LogReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = LogSink {
            state: Arc::new(Mutex::new(SinkState {
                next_sequence: 0,
                tx,
            })),
        };
        (sink, LogReceiver::new(rx))
    }

    /// Enqueue a chunk verbatim. Empty chunks are dropped.
    pub fn write<S: Into<String>>(&self, chunk: S) -> SupervisorResult<()> {
        let chunk = chunk.into();
        if chunk.is_empty() {
            return Ok(());
        }
        self.lock().enqueue(chunk)
    }

    /// Enqueue a message as one newline-terminated line.
    pub fn log<S: AsRef<str>>(&self, message: S) -> SupervisorResult<()> {
        self.write(format!("{}\n", message.as_ref()))
    }

    /// Enqueue all chunks contiguously, unless `token` is already cancelled.
    ///
    /// The check and the enqueue happen under the sink lock, so once a caller
    /// has cancelled the token and written anything afterwards, no batch
    /// guarded by that token can appear behind it. Returns whether the batch
    /// was delivered.
    pub fn write_batch_unless_cancelled<I>(
        &self,
        token: &CancellationToken,
        chunks: I,
    ) -> SupervisorResult<bool>
    where
        I: IntoIterator<Item = String>,
    {
        let mut state = self.lock();
        if token.is_cancelled() {
            return Ok(false);
        }
        for chunk in chunks.into_iter().filter(|chunk| !chunk.is_empty()) {
            state.enqueue(chunk)?;
        }
        Ok(true)
    }

    /// `io::Write` adaptor; each `write` call becomes one chunk.
    pub fn writer(&self) -> LogWriter {
        LogWriter { sink: self.clone() }
    }

    /// True once the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.lock().tx.is_closed()
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Byte-oriented writer feeding a [`LogSink`].
///
/// Invalid UTF-8 is replaced, so callers should hand over whole characters.
#[derive(Clone)]
pub struct LogWriter {
    sink: LogSink,
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink
            .write(String::from_utf8_lossy(buf).into_owned())
            .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

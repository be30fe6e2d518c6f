use crate::LogReceiver;

use std::io::Write;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// The single consumer of a log channel, e.g. a UI log pane.
pub trait LogConsumer: Send + 'static {
    fn on_log_line(&mut self, text: &str);
}

impl<F> LogConsumer for F
where
    F: FnMut(&str) + Send + 'static,
{
    fn on_log_line(&mut self, text: &str) {
        self(text)
    }
}

/// Appends every line verbatim to a writer, flushing after each one.
/// Stops writing after the first failure, which is warned about once.
pub struct WriterConsumer<W> {
    writer: W,
    failed: bool,
}

impl<W: Write + Send + 'static> WriterConsumer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send + 'static> LogConsumer for WriterConsumer<W> {
    fn on_log_line(&mut self, text: &str) {
        if self.failed {
            return;
        }

        if let Err(e) = self
            .writer
            .write_all(text.as_bytes())
            .and_then(|()| self.writer.flush())
        {
            self.failed = true;
            warn!("Log consumer failed to write line, dropping further lines: {e}");
        }
    }
}

/// Drives a [`LogConsumer`] from a [`LogReceiver`] on its own task.
pub struct LogPump;

impl LogPump {
    /// Runs until every sink clone is dropped; the consumer is handed back.
    pub fn spawn<C: LogConsumer>(receiver: LogReceiver, consumer: C) -> JoinHandle<C> {
        tokio::spawn(Self::pump(receiver, consumer))
    }

    async fn pump<C: LogConsumer>(mut receiver: LogReceiver, mut consumer: C) -> C {
        let mut delivered = 0u64;
        while let Some(line) = receiver.recv().await {
            consumer.on_log_line(&line.text);
            delivered += 1;
        }
        debug!("Log pump finished after {delivered} lines");
        consumer
    }
}

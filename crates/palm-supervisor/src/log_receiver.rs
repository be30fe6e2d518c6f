use crate::LogLine;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Consumer half of the log channel.
pub struct LogReceiver {
    rx: mpsc::UnboundedReceiver<LogLine>,
}

impl LogReceiver {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<LogLine>) -> Self {
        Self { rx }
    }

    /// Next line, or `None` once every sink clone is gone and the queue is empty.
    pub async fn recv(&mut self) -> Option<LogLine> {
        self.rx.recv().await
    }

    /// Blocking variant for consumers living on a plain thread.
    pub fn blocking_recv(&mut self) -> Option<LogLine> {
        self.rx.blocking_recv()
    }

    pub fn try_recv(&mut self) -> Option<LogLine> {
        match self.rx.try_recv() {
            Ok(line) => Some(line),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Everything queued right now, in delivery order.
    pub fn drain(&mut self) -> Vec<LogLine> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

//! Process-wide stdout/stderr redirection into a [`LogSink`].
//!
//! Redirection happens at the file descriptor level, so output from
//! `println!`, the tracing fmt layer and C code alike ends up in the sink.
//! Each stream gets its own reader thread which assembles complete lines
//! before handing them to the sink, so a line shorter than the pipe buffer
//! is never split.

use crate::LogSink;

#[cfg(unix)]
pub use unix::OutputCapture;

#[cfg(not(unix))]
pub use unsupported::OutputCapture;

/// Flush Rust-side buffers so nothing written before a switch lands on the
/// wrong side of it.
fn flush_std_streams() {
    use std::io::Write;

    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();
}

#[cfg(unix)]
mod unix {
    use super::flush_std_streams;
    use crate::{LogSink, SupervisorError, SupervisorResult};

    use std::fs::File;
    use std::io::{self, BufRead, BufReader, Write};
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
    use std::sync::{Mutex, PoisonError};
    use std::thread::JoinHandle;
    use std::time::{Duration, Instant};

    use tracing::{debug, warn};

    /// How long `restore()` waits for a reader thread to drain its pipe.
    const READER_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);
    const READER_POLL: Duration = Duration::from_millis(5);

    /// Owned redirection of fds 1 and 2.
    ///
    /// `restore()` is idempotent and also runs on drop.
    pub struct OutputCapture {
        streams: Mutex<Option<[CapturedStream; 2]>>,
        original_out: OwnedFd,
        original_err: OwnedFd,
    }

    impl OutputCapture {
        /// Point stdout and stderr at the sink.
        ///
        /// On failure nothing stays redirected.
        pub fn install(sink: &LogSink) -> SupervisorResult<Self> {
            flush_std_streams();

            let original_out = dup_cloexec(libc::STDOUT_FILENO)
                .map_err(|e| SupervisorError::redirection("duplicating stdout", e))?;
            let original_err = dup_cloexec(libc::STDERR_FILENO)
                .map_err(|e| SupervisorError::redirection("duplicating stderr", e))?;

            let stdout = CapturedStream::redirect(libc::STDOUT_FILENO, "stdout", sink)?;
            let stderr = match CapturedStream::redirect(libc::STDERR_FILENO, "stderr", sink) {
                Ok(stream) => stream,
                Err(e) => {
                    if let Err(restore_err) = stdout.restore() {
                        warn!("Failed to undo stdout redirection: {restore_err}");
                    }
                    stdout.join_reader();
                    return Err(e);
                }
            };

            debug!("Output capture installed");

            Ok(Self {
                streams: Mutex::new(Some([stdout, stderr])),
                original_out,
                original_err,
            })
        }

        /// Put the pre-redirection destinations back. Later calls are no-ops.
        ///
        /// Restore failures are also reported on the original stderr.
        pub fn restore(&self) -> SupervisorResult<()> {
            let streams = self
                .streams
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();

            let Some(streams) = streams else {
                return Ok(());
            };

            flush_std_streams();

            let mut first_error = None;
            for stream in &streams {
                if let Err(e) = stream.restore() {
                    self.report(&format!("Failed to restore {}: {e}", stream.name));
                    first_error.get_or_insert(e);
                }
            }

            for stream in streams {
                stream.join_reader();
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        pub fn is_installed(&self) -> bool {
            self.streams
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some()
        }

        /// Writer onto the terminal/file stdout pointed at before `install()`.
        pub fn original_stdout(&self) -> io::Result<File> {
            Ok(File::from(self.original_out.try_clone()?))
        }

        /// Writer onto the stderr destination from before `install()`.
        pub fn original_stderr(&self) -> io::Result<File> {
            Ok(File::from(self.original_err.try_clone()?))
        }

        /// Last-resort diagnostics that must not go through the sink.
        pub fn report(&self, message: &str) {
            if let Ok(mut err) = self.original_stderr() {
                let _ = writeln!(err, "{message}");
            }
        }
    }

    impl Drop for OutputCapture {
        fn drop(&mut self) {
            let _ = self.restore();
        }
    }

    struct CapturedStream {
        name: &'static str,
        target: RawFd,
        saved: OwnedFd,
        reader: Option<JoinHandle<()>>,
    }

    impl CapturedStream {
        fn redirect(target: RawFd, name: &'static str, sink: &LogSink) -> SupervisorResult<Self> {
            let saved = dup_cloexec(target)
                .map_err(|e| SupervisorError::redirection("saving the original descriptor", e))?;
            let (read_end, write_end) =
                pipe_cloexec().map_err(|e| SupervisorError::redirection("creating a pipe", e))?;

            // SAFETY: both descriptors are open and owned by this process.
            if unsafe { libc::dup2(write_end.as_raw_fd(), target) } == -1 {
                return Err(SupervisorError::redirection(
                    "redirecting the descriptor",
                    io::Error::last_os_error(),
                ));
            }
            // `target` is now the only write end of the pipe.
            drop(write_end);

            let sink = sink.clone();
            let reader = std::thread::Builder::new()
                .name(format!("palm-capture-{name}"))
                .spawn(move || forward_lines(read_end, sink));

            let reader = match reader {
                Ok(handle) => handle,
                Err(e) => {
                    // SAFETY: `saved` is an open descriptor owned by us.
                    unsafe { libc::dup2(saved.as_raw_fd(), target) };
                    return Err(SupervisorError::redirection("spawning the reader", e));
                }
            };

            Ok(Self {
                name,
                target,
                saved,
                reader: Some(reader),
            })
        }

        fn restore(&self) -> SupervisorResult<()> {
            // SAFETY: `saved` stays open for the lifetime of `self`.
            if unsafe { libc::dup2(self.saved.as_raw_fd(), self.target) } == -1 {
                return Err(SupervisorError::redirection(
                    "restoring the descriptor",
                    io::Error::last_os_error(),
                ));
            }
            Ok(())
        }

        /// The reader sees EOF once the last write end is gone. A child
        /// process that inherited the pipe can keep it open, so give up
        /// after a bounded wait and let the thread finish on its own.
        fn join_reader(mut self) {
            let Some(reader) = self.reader.take() else {
                return;
            };

            let deadline = Instant::now() + READER_DRAIN_TIMEOUT;
            while !reader.is_finished() && Instant::now() < deadline {
                std::thread::sleep(READER_POLL);
            }

            if reader.is_finished() {
                let _ = reader.join();
            } else {
                warn!("{} reader still draining, detaching it", self.name);
            }
        }
    }

    fn forward_lines(read_end: OwnedFd, sink: LogSink) {
        let mut reader = BufReader::new(File::from(read_end));
        let mut line = Vec::new();
        let mut sink_open = true;

        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {
                    // Keep draining after the consumer is gone so writers
                    // never see a broken pipe.
                    if sink_open
                        && sink
                            .write(String::from_utf8_lossy(&line).into_owned())
                            .is_err()
                    {
                        sink_open = false;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
    }

    fn dup_cloexec(fd: RawFd) -> io::Result<OwnedFd> {
        // SAFETY: F_DUPFD_CLOEXEC only reads `fd`; a fresh descriptor is returned.
        let duplicated = unsafe { libc::fcntl(fd, libc::F_DUPFD_CLOEXEC, 0) };
        if duplicated == -1 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `duplicated` is a new descriptor nobody else owns.
        Ok(unsafe { OwnedFd::from_raw_fd(duplicated) })
    }

    fn pipe_cloexec() -> io::Result<(OwnedFd, OwnedFd)> {
        let mut fds: [libc::c_int; 2] = [0; 2];
        // SAFETY: `fds` has room for the two descriptors pipe() writes.
        if unsafe { libc::pipe(fds.as_mut_ptr()) } == -1 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: pipe() succeeded, both descriptors are fresh and ours.
        let (read_end, write_end) =
            unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };

        for fd in [&read_end, &write_end] {
            // SAFETY: setting FD_CLOEXEC on an owned, open descriptor.
            if unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC) } == -1 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok((read_end, write_end))
    }
}

#[cfg(not(unix))]
mod unsupported {
    use crate::{LogSink, SupervisorError, SupervisorResult};

    use std::fs::File;
    use std::io;
    use std::panic::Location;

    use error_location::ErrorLocation;

    /// Placeholder on platforms without POSIX descriptors.
    pub struct OutputCapture {
        _private: (),
    }

    impl OutputCapture {
        #[track_caller]
        pub fn install(_sink: &LogSink) -> SupervisorResult<Self> {
            Err(SupervisorError::RedirectionUnsupported {
                location: ErrorLocation::from(Location::caller()),
            })
        }

        pub fn restore(&self) -> SupervisorResult<()> {
            Ok(())
        }

        pub fn is_installed(&self) -> bool {
            false
        }

        pub fn original_stdout(&self) -> io::Result<File> {
            Err(io::Error::from(io::ErrorKind::Unsupported))
        }

        pub fn original_stderr(&self) -> io::Result<File> {
            Err(io::Error::from(io::ErrorKind::Unsupported))
        }

        pub fn report(&self, message: &str) {
            eprintln!("{message}");
        }
    }
}

/// Install a capture, reporting a failure on the untouched stderr.
///
/// Returns `None` when the process keeps its original destinations.
pub fn install_or_report(sink: &LogSink) -> Option<OutputCapture> {
    match OutputCapture::install(sink) {
        Ok(capture) => Some(capture),
        Err(e) => {
            report_redirection_failure(&e);
            None
        }
    }
}

fn report_redirection_failure(error: &crate::SupervisorError) {
    use std::io::Write;

    // Nothing is redirected after a failed install, so this is the original stderr.
    let _ = writeln!(std::io::stderr(), "Output capture unavailable: {error}");
}

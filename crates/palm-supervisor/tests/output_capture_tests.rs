#![cfg(unix)]

use palm_supervisor::{LogSink, OutputCapture};

use std::io::Write;

use googletest::prelude::*;
use serial_test::serial;

fn stdout_identity() -> (u64, u64) {
    // SAFETY: fstat only writes into the zeroed struct we own.
    let mut stat: libc::stat = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::fstat(libc::STDOUT_FILENO, &mut stat) };
    assert_eq!(rc, 0, "fstat(1) failed");
    (stat.st_dev as u64, stat.st_ino as u64)
}

fn write_raw(fd: libc::c_int, bytes: &[u8]) {
    // SAFETY: writing from a valid slice to an open descriptor.
    let written = unsafe { libc::write(fd, bytes.as_ptr().cast(), bytes.len()) };
    assert_eq!(written, bytes.len() as isize);
}

fn joined(receiver: &mut palm_supervisor::LogReceiver) -> String {
    receiver.drain().into_iter().map(|line| line.text).collect()
}

#[test]
#[serial]
fn given_capture_when_fd_writes_then_lines_reach_sink() {
    // Given
    let (sink, mut receiver) = LogSink::channel();
    let capture = OutputCapture::install(&sink).unwrap();

    // When
    write_raw(libc::STDOUT_FILENO, b"from stdout\n");
    write_raw(libc::STDERR_FILENO, b"from stderr\n");
    capture.restore().unwrap();

    // Then
    let lines: Vec<String> = receiver.drain().into_iter().map(|line| line.text).collect();
    assert_that!(lines, contains(eq("from stdout\n")));
    assert_that!(lines, contains(eq("from stderr\n")));
}

#[test]
#[serial]
fn given_capture_when_std_handles_write_then_whole_lines_are_forwarded() {
    // Given
    let (sink, mut receiver) = LogSink::channel();
    let capture = OutputCapture::install(&sink).unwrap();

    // When
    {
        let mut out = std::io::stdout().lock();
        write!(out, "split ").unwrap();
        out.flush().unwrap();
        writeln!(out, "line").unwrap();
        out.flush().unwrap();
    }
    capture.restore().unwrap();

    // Then
    assert_that!(joined(&mut receiver).as_str(), eq("split line\n"));
}

#[test]
#[serial]
fn given_unterminated_output_when_restored_then_tail_is_delivered() {
    let (sink, mut receiver) = LogSink::channel();
    let capture = OutputCapture::install(&sink).unwrap();

    write_raw(libc::STDOUT_FILENO, b"no newline");
    capture.restore().unwrap();

    assert_that!(joined(&mut receiver).as_str(), eq("no newline"));
}

#[test]
#[serial]
fn given_capture_when_restored_twice_then_original_stdout_is_back() {
    // Given
    let before = stdout_identity();
    let (sink, _receiver) = LogSink::channel();
    let capture = OutputCapture::install(&sink).unwrap();
    assert_that!(capture.is_installed(), eq(true));
    assert_that!(stdout_identity(), not(eq(before)));

    // When
    let first = capture.restore();
    let second = capture.restore();

    // Then
    assert_that!(first, ok(anything()));
    assert_that!(second, ok(anything()));
    assert_that!(capture.is_installed(), eq(false));
    assert_that!(stdout_identity(), eq(before));
}

#[test]
#[serial]
fn given_capture_when_dropped_then_stdout_is_restored() {
    let before = stdout_identity();
    let (sink, _receiver) = LogSink::channel();

    drop(OutputCapture::install(&sink).unwrap());

    assert_that!(stdout_identity(), eq(before));
}

#[test]
#[serial]
fn given_consumer_gone_when_output_written_then_writer_is_not_blocked() {
    // Given
    let (sink, receiver) = LogSink::channel();
    let capture = OutputCapture::install(&sink).unwrap();
    drop(receiver);

    // When
    for _ in 0..1_000 {
        write_raw(libc::STDOUT_FILENO, b"into the void, more than a pipe buffer over time\n");
    }

    // Then
    assert_that!(capture.restore(), ok(anything()));
}

#[test]
#[serial]
fn given_capture_when_original_stdout_used_then_bypasses_sink() {
    // Given
    let (sink, mut receiver) = LogSink::channel();
    let capture = OutputCapture::install(&sink).unwrap();

    // When
    let mut original = capture.original_stdout().unwrap();
    writeln!(original, "straight to the terminal").unwrap();
    capture.restore().unwrap();

    // Then
    assert_that!(joined(&mut receiver).contains("straight to the terminal"), eq(false));
}

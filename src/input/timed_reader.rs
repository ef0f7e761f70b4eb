// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words EINTR

//! Timed rune reads over a terminal file descriptor.

use super::error::InputError;
use super::rune_source::RuneSource;
use mio::{Events, Interest, Poll, Token, unix::SourceFd};
use std::io::{self, ErrorKind, Read};
use std::os::fd::AsRawFd;
use std::time::Duration;

/// Token for the single registered FD.
const INPUT_TOKEN: Token = Token(0);

/// Capacity for the [`mio::Events`] buffer; one source can only produce one
/// readiness event per wake.
const EVENTS_CAPACITY: usize = 4;

/// Read chunk size. A raw-mode TTY delivers at most a short burst (one key
/// sequence, or a slice of a paste) per read; anything larger stays in the
/// kernel buffer and is picked up by the next non-blocking read.
const READ_CHUNK_SIZE: usize = 64;

/// Reads whole UTF-8 runes from a file descriptor, with a per-call timeout.
///
/// The FD is switched to non-blocking mode on construction and driven with
/// the standard poll-then-drain pattern: try a read first, and only sleep in
/// [`Poll::poll`] (bounded by the current deadline) once the kernel buffer is
/// empty. `EINTR` is retried on both paths.
///
/// `R` must hand back exactly what the kernel delivers — `std::fs::File` on
/// the TTY, a `UnixStream`, a pipe. A userspace-buffered reader like
/// [`std::io::Stdin`] would hold bytes the poll cannot see and wedge the
/// timeout logic.
pub struct TimedRuneReader<R: Read + AsRawFd> {
    source: R,
    poll: Poll,
    events: Events,
    timeout: Option<Duration>,
    /// Bytes read but not yet decoded: UTF-8 tails, queued burst input.
    pending: Vec<u8>,
}

impl<R: Read + AsRawFd> TimedRuneReader<R> {
    /// Wrap `source`, registering its FD for readiness polling and putting it
    /// into non-blocking mode. The reader starts with no deadline (blocking).
    ///
    /// # Errors
    ///
    /// Returns an error if the FD cannot be registered or its flags cannot be
    /// changed.
    pub fn new(source: R) -> io::Result<TimedRuneReader<R>> {
        set_nonblocking(source.as_raw_fd())?;

        let poll = Poll::new()?;
        poll.registry().register(
            &mut SourceFd(&source.as_raw_fd()),
            INPUT_TOKEN,
            Interest::READABLE,
        )?;

        Ok(TimedRuneReader {
            source,
            poll,
            events: Events::with_capacity(EVENTS_CAPACITY),
            timeout: None,
            pending: Vec::new(),
        })
    }

    /// Block (up to the current deadline) until the FD is readable.
    fn wait_readable(&mut self) -> Result<(), InputError> {
        loop {
            match self.poll.poll(&mut self.events, self.timeout) {
                // EINTR: a signal landed mid-poll; retry.
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
                Ok(()) => {}
            }
            if !self.events.is_empty() {
                return Ok(());
            }
            // Empty wake: the deadline expired, or a spurious wake while
            // blocking without one.
            if self.timeout.is_some() {
                return Err(InputError::Timeout);
            }
        }
    }

    /// Pull at least one more byte into `pending`.
    fn fill(&mut self) -> Result<(), InputError> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.source.read(&mut chunk) {
                Ok(0) => {
                    return Err(io::Error::from(ErrorKind::UnexpectedEof).into());
                }
                Ok(count) => {
                    self.pending.extend_from_slice(&chunk[..count]);
                    return Ok(());
                }
                // Kernel buffer empty: sleep until readable, then retry.
                Err(err) if err.kind() == ErrorKind::WouldBlock => self.wait_readable()?,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl<R: Read + AsRawFd> RuneSource for TimedRuneReader<R> {
    fn read_rune(&mut self) -> Result<char, InputError> {
        loop {
            if let Some(lead) = self.pending.first().copied() {
                let Some(need) = utf8_sequence_len(lead) else {
                    // Skip the offending byte so a caller that keeps going
                    // resynchronizes at the next lead byte.
                    self.pending.remove(0);
                    return Err(InputError::InvalidUtf8(lead));
                };
                if self.pending.len() >= need {
                    let decoded = std::str::from_utf8(&self.pending[..need])
                        .ok()
                        .and_then(|s| s.chars().next());
                    let Some(ch) = decoded else {
                        self.pending.remove(0);
                        return Err(InputError::InvalidUtf8(lead));
                    };
                    self.pending.drain(..need);
                    return Ok(ch);
                }
            }
            self.fill()?;
        }
    }

    fn set_timeout(&mut self, timeout: Option<Duration>) { self.timeout = timeout; }
}

/// Expected byte length of a UTF-8 sequence, from its leading byte.
fn utf8_sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7f => Some(1),
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}

fn set_nonblocking(fd: std::os::fd::RawFd) -> io::Result<()> {
    // SAFETY: fcntl on a valid, owned FD; no memory is handed to the kernel.
    let res = unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL, 0);
        if flags < 0 {
            return Err(io::Error::last_os_error());
        }
        libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK)
    };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

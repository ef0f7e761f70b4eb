// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Input-side error types.

use std::io;
use thiserror::Error;

/// Errors surfaced while reading or decoding terminal input.
///
/// `Timeout` is only an error outside the ESC-disambiguation window; inside
/// it, the decoder converts the timeout into a logical key (`Ctrl+[` for a
/// bare ESC, `Alt+x` for a lone `ESC x`). Everything else propagates to the
/// outer event loop, which decides whether to log, discard, or abort.
#[derive(Debug, Error)]
pub enum InputError {
    /// No input arrived within the source's current deadline.
    #[error("timed out waiting for terminal input")]
    Timeout,

    /// A CSI or G3 escape sequence did not match the VT repertoire. Runes
    /// consumed so far are discarded, not replayed.
    #[error("malformed escape sequence from terminal")]
    BadEscSeq,

    /// The byte stream is not valid UTF-8.
    #[error("invalid UTF-8 in terminal input (leading byte 0x{0:02x})")]
    InvalidUtf8(u8),

    /// The underlying read or poll failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl InputError {
    #[must_use]
    pub fn is_timeout(&self) -> bool { matches!(self, InputError::Timeout) }
}

// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The seam between the key decoder and the terminal.

use super::error::InputError;
use std::time::Duration;

/// A source of whole UTF-8 runes with a per-call deadline.
///
/// [`TimedRuneReader`] is the production implementation over a terminal file
/// descriptor; decoder tests drive a scripted fake instead. A rune is never
/// handed out half-decoded: partial UTF-8 sequences stay buffered inside the
/// source until their continuation bytes arrive.
///
/// [`TimedRuneReader`]: crate::TimedRuneReader
pub trait RuneSource {
    /// Read the next rune.
    ///
    /// With no deadline set this blocks until a rune is available or an
    /// unrecoverable error occurs. With a deadline, [`InputError::Timeout`] is
    /// returned when no input arrives in time; input already buffered is
    /// returned without consulting the deadline at all.
    ///
    /// # Errors
    ///
    /// [`InputError::Timeout`], [`InputError::InvalidUtf8`], or
    /// [`InputError::Io`] (including EOF as `UnexpectedEof`).
    fn read_rune(&mut self) -> Result<char, InputError>;

    /// Set the deadline consulted by subsequent [`read_rune`] calls. `None`
    /// restores blocking reads. The deadline is per-operation and does not
    /// accumulate across calls.
    ///
    /// [`read_rune`]: RuneSource::read_rune
    fn set_timeout(&mut self, timeout: Option<Duration>);
}

// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Terminal size sampling and raw mode.

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use miette::IntoDiagnostic;

pub const DEFAULT_WIDTH: usize = 80;
pub const DEFAULT_HEIGHT: usize = 24;

/// Viewport dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    pub cols: usize,
    pub rows: usize,
}

/// Sample the terminal size via the winsize ioctl.
///
/// # Errors
///
/// Returns an error if the size cannot be determined (e.g. not a TTY).
pub fn get_size() -> miette::Result<TermSize> {
    let (cols, rows) = crossterm::terminal::size().into_diagnostic()?;
    Ok(TermSize { cols: usize::from(cols), rows: usize::from(rows) })
}

/// Sample the terminal size, falling back to 80×24 when sampling fails. The
/// result is authoritative for exactly one refresh; it is re-sampled every
/// time, never cached.
#[must_use]
pub fn size_or_default() -> TermSize {
    get_size().unwrap_or(TermSize { cols: DEFAULT_WIDTH, rows: DEFAULT_HEIGHT })
}

/// RAII guard over terminal raw mode.
///
/// The key decoder assumes a raw/cbreak TTY whose ESC prefixes can be told
/// apart by timing. Hold one of these for the lifetime of the editor, or
/// manage terminal modes in the outer shell.
#[derive(Debug)]
pub struct RawMode;

impl RawMode {
    /// Enable raw mode; it is disabled again when the guard drops.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal attributes cannot be changed.
    pub fn enter() -> miette::Result<RawMode> {
        enable_raw_mode().into_diagnostic()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        // Best effort; the session is usually ending anyway.
        let _unused = disable_raw_mode();
    }
}

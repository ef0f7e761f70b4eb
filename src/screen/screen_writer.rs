// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! One-way synchronization of composed frames onto the terminal.

use super::cell::{Pos, SgrParams};
use super::cell_buffer::CellBuffer;
use std::fmt::Write as _;
use std::io::{self, Write};

const CSI: &str = "\x1b[";
/// `CR` + erase from cursor to end of screen.
const CLEAR_DOWN: &str = "\r\x1b[J";
/// Reset all SGR attributes.
const SGR_RESET: &str = "\x1b[m";

/// Append the minimal cursor-motion sequence between two buffer positions:
/// only the nonzero orthogonal components, vertical before horizontal
/// (`CSI n A/B/C/D` never takes n = 0).
fn delta_pos(acc: &mut String, from: Pos, to: Pos) {
    if to.line > from.line {
        let _unused = write!(acc, "{CSI}{}B", to.line - from.line);
    } else if to.line < from.line {
        let _unused = write!(acc, "{CSI}{}A", from.line - to.line);
    }
    if to.col > from.col {
        let _unused = write!(acc, "{CSI}{}C", to.col - from.col);
    } else if to.col < from.col {
        let _unused = write!(acc, "{CSI}{}D", from.col - to.col);
    }
}

/// Row of a frame's dot within the visible window, for a frame that was
/// committed against a viewport of `height` rows.
///
/// A frame taller than the viewport is necessarily bottom-anchored: drawing it
/// scrolled the terminal and pushed its top `lines − height` rows into
/// scrollback, wherever the region started. Cursor motion must be computed
/// against the rows that are still on screen, not against buffer lines.
/// `height` 0 means the viewport is unknown and applies no clamp.
fn visible_dot_row(frame: &CellBuffer, height: usize) -> usize {
    let scrolled = scrolled_lines(frame, height);
    frame.dot().line.max(scrolled) - scrolled
}

fn scrolled_lines(frame: &CellBuffer, height: usize) -> usize {
    if height == 0 {
        0
    } else {
        frame.line_count().saturating_sub(height)
    }
}

/// Holds the most recently committed frame and writes new frames to the
/// terminal as a delta-free repaint: move to the top of the committed region,
/// erase downward, redraw, reposition on the dot.
// TODO: diff each new frame against `prev` and repaint only the lines that
// changed, instead of erasing the whole region on every commit.
#[derive(Debug)]
pub struct ScreenWriter<W: Write> {
    sink: W,
    prev: CellBuffer,
    prev_height: usize,
}

impl<W: Write> ScreenWriter<W> {
    pub fn new(sink: W) -> ScreenWriter<W> {
        ScreenWriter {
            sink,
            prev: CellBuffer::new(0),
            prev_height: 0,
        }
    }

    /// Commit `frame` to the terminal, replacing the previously committed
    /// region. `height` is the viewport row count sampled for this refresh.
    ///
    /// The byte stream is accumulated in memory and handed to the sink in one
    /// write. Attributes are switched only when a cell's attribute differs
    /// from the one in force, and always via a full reset first, since SGR
    /// parameter strings are opaque and cannot be incrementally undone.
    ///
    /// # Errors
    ///
    /// Returns the underlying write error; the previous frame is not replaced,
    /// so the caller may retry or abandon the session.
    pub fn commit(&mut self, frame: CellBuffer, height: usize) -> io::Result<()> {
        let mut acc = String::new();

        // Up from the previous dot to the first visible line of the committed
        // region, then column 0 and erase to end of screen.
        let up = visible_dot_row(&self.prev, self.prev_height);
        if up > 0 {
            let _unused = write!(acc, "{CSI}{up}A");
        }
        acc.push_str(CLEAR_DOWN);

        let mut attr = SgrParams::new();
        for (index, line) in frame.lines().iter().enumerate() {
            if index > 0 {
                acc.push('\n');
            }
            for cell in line {
                if cell.width > 0 && cell.attr != attr {
                    let _unused = write!(acc, "{SGR_RESET}{CSI}{}m", cell.attr);
                    attr = cell.attr.clone();
                }
                acc.push(cell.ch);
            }
        }
        if !attr.is_empty() {
            acc.push_str(SGR_RESET);
        }

        // Trailing cursor → dot, in visible-window rows.
        let scrolled = scrolled_lines(&frame, height);
        let cursor = frame.cursor();
        delta_pos(
            &mut acc,
            Pos::new(cursor.line - scrolled, cursor.col),
            Pos::new(visible_dot_row(&frame, height), frame.dot().col),
        );

        self.sink.write_all(acc.as_bytes())?;
        self.sink.flush()?;

        self.prev = frame;
        self.prev_height = height;
        Ok(())
    }
}

// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Per-refresh composition of the display frame.
//!
//! One refresh builds up to four sub-buffers — edit line, mode indicator,
//! tips, completion menu — at the sampled terminal width, joins them, and
//! commits the result. Composition is pure ([`compose`]); only
//! [`Renderer::refresh`] touches the terminal.

use super::cell::{SgrParams, str_width};
use super::cell_buffer::CellBuffer;
use super::screen_writer::ScreenWriter;
use crate::editor_state::{Completion, EditorState, StyleSheet};
use crate::term;
use std::io::{self, Write};

/// Columns between completion menu columns.
const COMPLETION_COL_MARGIN: usize = 2;

/// The rendering half of the editor core: composes frames from consumed
/// editor state and commits them through a [`ScreenWriter`].
#[derive(Debug)]
pub struct Renderer<W: Write> {
    writer: ScreenWriter<W>,
    styles: StyleSheet,
}

impl<W: Write> Renderer<W> {
    pub fn new(sink: W, styles: StyleSheet) -> Renderer<W> {
        Renderer { writer: ScreenWriter::new(sink), styles }
    }

    /// Redraw the editor: sample the terminal size, compose the frame, commit
    /// it. The sampled size is authoritative for exactly this one refresh.
    ///
    /// # Errors
    ///
    /// Returns the terminal write error; the previously committed frame stays
    /// in place, so the outer loop may retry or abort.
    pub fn refresh(&mut self, state: &EditorState) -> io::Result<()> {
        let size = term::size_or_default();
        let frame = compose(state, &self.styles, size.cols);
        self.writer.commit(frame, size.rows)
    }
}

/// Build the full frame for one refresh at the given width.
#[must_use]
pub fn compose(state: &EditorState, styles: &StyleSheet, width: usize) -> CellBuffer {
    let mut frame = compose_line(state, styles, width);

    if let Some(label) = state.mode.indicator() {
        let mut buf = CellBuffer::new(width);
        buf.write_str(label, &styles.mode);
        frame.extend(buf);
    }

    if !state.tips.is_empty() {
        let mut buf = CellBuffer::new(width);
        buf.write_str(&state.tips.join(", "), &styles.tip);
        frame.extend(buf);
    }

    if let Some(comp) = &state.completion {
        frame.extend(compose_completion(comp, styles, width));
    }

    frame
}

/// The edit line: prompt, tokens with the active completion spliced in, dot
/// capture, right prompt.
fn compose_line(state: &EditorState, styles: &StyleSheet, width: usize) -> CellBuffer {
    let mut buf = CellBuffer::new(width);

    buf.write_str(&state.prompt, &styles.prompt);
    // Continuation lines align under the first input column, unless the
    // prompt eats half the screen.
    if buf.col() * 2 < buf.width() {
        buf.set_indent(buf.col());
    }

    // `at` walks byte offsets through the concatenated token text. The dot is
    // captured the moment the walk reaches the cursor offset, the candidate
    // the moment it reaches the start of the replaced range.
    let mut at = 0;
    if state.cursor == 0 {
        buf.mark_dot();
    }

    let comp = state.completion.as_ref();
    let mut spliced = false;
    splice_candidate_at(&mut buf, comp, styles, at, &mut spliced);

    for token in &state.tokens {
        let attr = styles.tokens.for_kind(token.kind);
        for ch in token.text.chars() {
            if !replaced_by_candidate(comp, at) {
                buf.write_rune(ch, attr);
            }
            at += ch.len_utf8();
            splice_candidate_at(&mut buf, comp, styles, at, &mut spliced);
            if at == state.cursor {
                buf.mark_dot();
            }
        }
    }

    if !state.rprompt.is_empty() {
        // Keep clear of the last column; auto-wrap behavior there is
        // terminal-dependent.
        let room = buf.width().saturating_sub(1).saturating_sub(buf.col());
        let rprompt_width = str_width(&state.rprompt);
        if room > rprompt_width {
            buf.write_padding(room - rprompt_width, &SgrParams::new());
            buf.write_str(&state.rprompt, &styles.rprompt);
        }
    }

    buf
}

/// True when the rune at byte offset `at` is being replaced by the selected
/// completion candidate and must not be emitted.
fn replaced_by_candidate(comp: Option<&Completion>, at: usize) -> bool {
    comp.is_some_and(|c| c.current.is_some() && at >= c.start && at < c.end)
}

/// Emit the selected candidate's parts once the byte walk reaches the start
/// of the replaced range. Completed parts get the stylesheet's `completed`
/// attribute joined on, so the suggested tail reads differently from the
/// prefix the user already typed.
fn splice_candidate_at(
    buf: &mut CellBuffer,
    comp: Option<&Completion>,
    styles: &StyleSheet,
    at: usize,
    spliced: &mut bool,
) {
    if *spliced {
        return;
    }
    let Some(comp) = comp else { return };
    if at != comp.start {
        return;
    }
    let Some(candidate) = comp.current_candidate() else { return };

    for part in &candidate.parts {
        let mut attr = styles.tokens.for_kind(comp.kind).clone();
        if part.completed {
            if !attr.is_empty() && !styles.completed.is_empty() {
                attr.push(';');
            }
            attr.push_str(&styles.completed);
        }
        buf.write_str(&part.text, &attr);
    }
    *spliced = true;
}

/// The completion menu: candidates in a column-major grid. The widest
/// candidate decides the column width; index `col * rows + row` lands at
/// `(row, col)`, matching the conventional shell menu order.
fn compose_completion(comp: &Completion, styles: &StyleSheet, width: usize) -> CellBuffer {
    let mut buf = CellBuffer::new(width);
    let candidates = &comp.candidates;

    let col_width = candidates.iter().map(|c| str_width(&c.text)).max().unwrap_or(0);
    let cols = ((buf.width() + COMPLETION_COL_MARGIN) / (col_width + COMPLETION_COL_MARGIN)).max(1);
    let rows = candidates.len().div_ceil(cols);

    let unstyled = SgrParams::new();
    for row in 0..rows {
        if row > 0 {
            buf.newline();
        }
        for col in 0..cols {
            let index = col * rows + row;
            let Some(candidate) = candidates.get(index) else { continue };
            let attr = if comp.current == Some(index) {
                &styles.current_completion
            } else {
                &unstyled
            };
            buf.write_str(&candidate.text, attr);
            buf.write_padding(col_width - str_width(&candidate.text), attr);
            buf.write_padding(COMPLETION_COL_MARGIN, &unstyled);
        }
    }

    buf
}

// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Display pipeline and input decoder for an interactive Unix line editor.
//!
//! Two tightly coupled subsystems make up this crate:
//!
//! 1. **Screen model and renderer** — an in-memory reflection of the visible
//!    region ([`CellBuffer`]), composed per refresh from prompt, edited text,
//!    mode indicator, tips, and a tabular completion menu ([`compose`]), and
//!    committed to the terminal with cursor-motion and SGR control sequences
//!    ([`ScreenWriter`], driven through [`Renderer`]).
//! 2. **Input decoder** — a state machine ([`KeyDecoder`]) that turns the raw
//!    byte stream of a raw-mode TTY into logical [`Key`] events, reading
//!    whole UTF-8 runes through a [`TimedRuneReader`] and telling a lone ESC
//!    from the start of an escape sequence by a bounded wait.
//!
//! ```text
//!   TTY bytes ──▶ TimedRuneReader ──▶ KeyDecoder ──▶ Key
//!                                                     │ (outer event loop
//!                                                     ▼  mutates EditorState)
//!   TTY bytes ◀── ScreenWriter ◀── compose() ◀── EditorState
//! ```
//!
//! The outer event loop — key bindings, history, tokenization, completion
//! sources — lives elsewhere and drives these primitives: one key read, one
//! state transition, one [`Renderer::refresh`]. The core is single-threaded
//! and synchronous; its only suspension points are the blocking `poll(2)` in
//! the rune reader and the blocking `write(2)` in the screen writer.
//!
//! ## One-way synchronization
//!
//! The renderer never queries the terminal. It trusts [`rune_width`] to match
//! the terminal's own width accounting (including East Asian Wide forms) and
//! replicates the terminal's soft-wrap behavior in the [`CellBuffer`]. This
//! buys low latency and simplicity at the cost of display corruption if the
//! width tables ever disagree.
//!
//! ## Example: composing and committing a frame
//!
//! ```
//! use r3bl_line_editor::{EditorState, Renderer, StyleSheet, Token, TokenKind, compose};
//!
//! let mut state = EditorState::new("> ");
//! state.tokens = vec![Token::new("ls", TokenKind::Bareword)];
//! state.cursor = 2;
//!
//! // Pure composition at a fixed width (the renderer samples the real size).
//! let frame = compose(&state, &StyleSheet::default(), 80);
//! assert_eq!(frame.dot().col, 4);
//!
//! // Committing writes ECMA-48 bytes to any `io::Write` sink.
//! let mut renderer = Renderer::new(Vec::new(), StyleSheet::default());
//! renderer.refresh(&state).unwrap();
//! ```

// Attach sources.
pub mod editor_state;
pub mod input;
pub mod screen;
pub mod term;

// Re-export for flat public API.
pub use editor_state::*;
pub use input::*;
pub use screen::*;
pub use term::{RawMode, TermSize};

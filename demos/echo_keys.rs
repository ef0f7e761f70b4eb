// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Decode keys from the terminal and echo them through the display pipeline.
//!
//! Run with `cargo run --example echo_keys`, press keys to see them decoded
//! on the edit line, quit with `Ctrl+D`.

use miette::IntoDiagnostic;
use r3bl_line_editor::{
    EditorState, InputError, Key, KeyDecoder, RawMode, Renderer, StyleSheet,
    TimedRuneReader, Token, TokenKind, sgr,
};
use std::fs::{File, OpenOptions};

fn main() -> miette::Result<()> {
    let tty_in = File::open("/dev/tty").into_diagnostic()?;
    let tty_out = OpenOptions::new().write(true).open("/dev/tty").into_diagnostic()?;

    let _raw_mode = RawMode::enter()?;
    let mut decoder = KeyDecoder::new(TimedRuneReader::new(tty_in).into_diagnostic()?);

    let mut styles = StyleSheet::default();
    styles.prompt = sgr("1;36");
    styles.tip = sgr("2");
    styles.tokens.bareword = sgr("33");
    let mut renderer = Renderer::new(tty_out, styles);

    let mut state = EditorState::new("keys> ");
    state.tips = vec!["press any key or chord".into(), "Ctrl+D quits".into()];
    renderer.refresh(&state).into_diagnostic()?;

    loop {
        match decoder.read_key() {
            Ok(key) if key == Key::ctrl('D') => break,
            Ok(key) => {
                let label = key.to_string();
                state.cursor = label.len();
                state.tokens = vec![Token::new(label, TokenKind::Bareword)];
                renderer.refresh(&state).into_diagnostic()?;
            }
            Err(InputError::BadEscSeq) => {
                state.cursor = 0;
                state.tokens.clear();
                state.tips = vec!["unrecognized escape sequence".into()];
                renderer.refresh(&state).into_diagnostic()?;
            }
            Err(err) => return Err(err).into_diagnostic(),
        }
    }

    Ok(())
}

// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Decoding the raw rune stream into logical key events.
//!
//! A lone ESC and the start of an escape sequence are byte-identical on the
//! wire; the decoder tells them apart with a bounded wait. Only the *first*
//! rune after ESC is read under the deadline — once a sequence is committed,
//! its remaining runes are read blocking, so a slow link can never truncate a
//! sequence that has started arriving.
//!
//! Recognized input, after the ESC:
//!
//! - `[` — CSI sequences: `ESC [ params final`, e.g. `ESC [ 1 ; 5 A` for
//!   Ctrl+Up, `ESC [ 11 ~` for F1, `ESC [ 27 ; 2 ; 13 ~` for Shift+Enter.
//! - `O` — G3 function-key sequences: `ESC O P..S` for F1–F4 (xterm, libvte,
//!   tmux), `ESC O H/F` for Home/End (libvte).
//! - Anything else — an Alt chord on that rune.
//! - Silence — a bare ESC, reported as `Ctrl+[`.

use super::error::InputError;
use super::key::{Key, KeyCode, KeyModifiers};
use super::rune_source::RuneSource;
use smallvec::SmallVec;
use std::time::Duration;

/// Default bounded wait for the rune after ESC: short enough for interactive
/// humans, long enough for terminal-emitted bursts on local links.
pub const DEFAULT_ESC_TIMEOUT: Duration = Duration::from_millis(10);

/// CSI parameter list; real sequences carry at most three parameters.
type CsiParams = SmallVec<[u32; 4]>;

/// Translates the rune stream of a raw-mode terminal into [`Key`] events.
pub struct KeyDecoder<S: RuneSource> {
    source: S,
    esc_timeout: Duration,
}

impl<S: RuneSource> KeyDecoder<S> {
    pub fn new(source: S) -> KeyDecoder<S> {
        KeyDecoder { source, esc_timeout: DEFAULT_ESC_TIMEOUT }
    }

    /// Tune the ESC disambiguation window (for slow links, or tests).
    pub fn set_esc_timeout(&mut self, timeout: Duration) { self.esc_timeout = timeout; }

    /// Read one logical key event. Blocks until a key arrives.
    ///
    /// # Errors
    ///
    /// [`InputError::BadEscSeq`] for a malformed CSI/G3 sequence (the runes
    /// consumed so far are discarded), [`InputError::InvalidUtf8`] and
    /// [`InputError::Io`] from the source.
    pub fn read_key(&mut self) -> Result<Key, InputError> {
        let rune = self.source.read_rune()?;

        match rune {
            // Ctrl chords the 0x40-offset rule below would get wrong.
            '\0' => Ok(Key::ctrl('`')),    // ^@
            '\x1d' => Ok(Key::ctrl('^')),  // ^^
            '\x1f' => Ok(Key::ctrl('/')),  // ^_
            '\x7f' => Ok(Key::plain(KeyCode::Backspace)), // ^?
            '\x1b' => {
                // Bound only the next read; restore blocking on every exit
                // path, including errors.
                self.source.set_timeout(Some(self.esc_timeout));
                let result = self.read_escape();
                self.source.set_timeout(None);
                result
            }
            '\x01'..='\x1d' => {
                // Ctrl chords that agree with the keyboard: ^A .. ^].
                Ok(Key::ctrl((rune as u8 + 0x40) as char))
            }
            _ => Ok(Key::plain(KeyCode::Char(rune))),
        }
    }

    /// Everything after a received ESC. The source's deadline is armed.
    fn read_escape(&mut self) -> Result<Key, InputError> {
        let rune = match self.source.read_rune() {
            Err(InputError::Timeout) => return Ok(Key::ctrl('[')), // Bare ESC.
            Err(err) => return Err(err),
            Ok(rune) => rune,
        };

        match rune {
            '[' => self.read_csi(),
            'O' => self.read_g3(),
            other => Ok(Key::alt(other)),
        }
    }

    /// CSI sequence: numeric parameters separated by `;`, then a final rune.
    fn read_csi(&mut self) -> Result<Key, InputError> {
        let mut params = CsiParams::new();
        let final_rune = loop {
            let rune = match self.source.read_rune() {
                // Only the first read can still be under the deadline; a lone
                // `ESC [` is an Alt chord on `[`.
                Err(InputError::Timeout) => return Ok(Key::alt('[')),
                Err(err) => return Err(err),
                Ok(rune) => rune,
            };
            // The sequence is committed; never cut it off mid-way.
            self.source.set_timeout(None);

            match rune {
                ';' => {
                    if params.is_empty() {
                        params.push(0);
                    }
                    params.push(0);
                }
                '0'..='9' => {
                    if params.is_empty() {
                        params.push(0);
                    }
                    if let Some(last) = params.last_mut() {
                        // Saturate rather than overflow on absurd parameters;
                        // they fail the table lookups downstream anyway.
                        let digit = rune as u32 - '0' as u32;
                        *last = last.saturating_mul(10).saturating_add(digit);
                    }
                }
                other => break other,
            }
        };

        parse_csi(&params, final_rune)
    }

    /// G3 sequence: exactly one rune after `ESC O`.
    fn read_g3(&mut self) -> Result<Key, InputError> {
        let rune = match self.source.read_rune() {
            Err(InputError::Timeout) => return Ok(Key::alt('O')),
            Err(err) => return Err(err),
            Ok(rune) => rune,
        };

        match g3_key(rune) {
            Some(code) => Ok(Key::plain(code)),
            None => {
                tracing::debug!(
                    message = "key decoder: unrecognized G3 sequence",
                    rune = ?rune
                );
                Err(InputError::BadEscSeq)
            }
        }
    }
}

/// Log and build the error for a CSI sequence outside the VT repertoire.
fn bad_csi(params: &[u32], final_rune: char) -> InputError {
    tracing::debug!(
        message = "key decoder: unrecognized CSI sequence",
        params = ?params,
        final_rune = ?final_rune
    );
    InputError::BadEscSeq
}

fn g3_key(rune: char) -> Option<KeyCode> {
    match rune {
        'P' => Some(KeyCode::Function(1)),
        'Q' => Some(KeyCode::Function(2)),
        'R' => Some(KeyCode::Function(3)),
        'S' => Some(KeyCode::Function(4)),
        'H' => Some(KeyCode::Home),
        'F' => Some(KeyCode::End),
        _ => None,
    }
}

/// Keys addressed by the CSI final rune directly.
fn key_by_final(rune: char) -> Option<KeyCode> {
    match rune {
        'A' => Some(KeyCode::Up),
        'B' => Some(KeyCode::Down),
        'C' => Some(KeyCode::Right),
        'D' => Some(KeyCode::Left),
        'H' => Some(KeyCode::Home),
        'F' => Some(KeyCode::End),
        _ => None,
    }
}

/// Keys addressed as `CSI n ~`, with the usual gaps in the function-key
/// numbering (F1–F5: 11–15, F6–F10: 17–21, F11/F12: 23/24).
fn key_by_keypad(num: u32) -> Option<KeyCode> {
    match num {
        1 => Some(KeyCode::Home),
        2 => Some(KeyCode::Insert),
        3 => Some(KeyCode::Delete),
        4 => Some(KeyCode::End),
        5 => Some(KeyCode::PageUp),
        6 => Some(KeyCode::PageDown),
        11..=15 => Some(KeyCode::Function(num as u8 - 10)),
        17..=21 => Some(KeyCode::Function(num as u8 - 11)),
        23 => Some(KeyCode::Function(11)),
        24 => Some(KeyCode::Function(12)),
        _ => None,
    }
}

/// Keys addressed as `CSI 27 ; mod ; n ~` (xterm `modifyOtherKeys`): Tab,
/// Enter, and the ASCII punctuation and digits a PC keypad can produce.
fn key_by_modify_other(num: u32) -> Option<KeyCode> {
    match num {
        9 => Some(KeyCode::Tab),
        13 => Some(KeyCode::Enter),
        33 | 35 | 39..=41 | 43..=46 | 48..=63 => {
            char::from_u32(num).map(KeyCode::Char)
        }
        _ => None,
    }
}

/// Parse a complete CSI sequence from its parameters and final rune.
fn parse_csi(params: &[u32], final_rune: char) -> Result<Key, InputError> {
    if let Some(code) = key_by_final(final_rune) {
        return match params {
            [] => Ok(Key::plain(code)),
            [1, modifier] => xterm_modify(Key::plain(code), *modifier),
            _ => Err(bad_csi(params, final_rune)),
        };
    }

    if final_rune == '~' {
        match params {
            [num] | [num, _] => {
                if let Some(code) = key_by_keypad(*num) {
                    let key = Key::plain(code);
                    return match params {
                        [_, modifier] => xterm_modify(key, *modifier),
                        _ => Ok(key),
                    };
                }
            }
            [27, modifier, num] => {
                if let Some(code) = key_by_modify_other(*num) {
                    return xterm_modify(Key::plain(code), *modifier);
                }
            }
            _ => {}
        }
    }

    Err(bad_csi(params, final_rune))
}

/// Apply an xterm modifier code (1-origin encoding of the Shift/Alt/Ctrl
/// bitmask) to a key. Depends only on the code and the key, not on any prior
/// state.
fn xterm_modify(mut key: Key, modifier: u32) -> Result<Key, InputError> {
    let extra = match modifier {
        0 => KeyModifiers::default(),
        2 => KeyModifiers { shift: true, ..KeyModifiers::default() },
        3 => KeyModifiers { alt: true, ..KeyModifiers::default() },
        4 => KeyModifiers { shift: true, alt: true, ctrl: false },
        5 => KeyModifiers { ctrl: true, ..KeyModifiers::default() },
        6 => KeyModifiers { shift: true, alt: false, ctrl: true },
        7 => KeyModifiers { shift: false, alt: true, ctrl: true },
        8 => KeyModifiers { shift: true, alt: true, ctrl: true },
        _ => {
            tracing::debug!(
                message = "key decoder: xterm modifier code out of range",
                modifier
            );
            return Err(InputError::BadEscSeq);
        }
    };
    key.modifiers.shift |= extra.shift;
    key.modifiers.alt |= extra.alt;
    key.modifiers.ctrl |= extra.ctrl;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    /// Scripted rune source: runes interleaved with timeout markers, plus a
    /// log of every `set_timeout` call.
    #[derive(Debug, Default)]
    struct ScriptedSource {
        script: VecDeque<Result<char, InputError>>,
        timeout_log: Vec<Option<Duration>>,
    }

    impl ScriptedSource {
        fn runes(text: &str) -> ScriptedSource {
            ScriptedSource {
                script: text.chars().map(Ok).collect(),
                timeout_log: Vec::new(),
            }
        }

        fn with_timeout_after(text: &str) -> ScriptedSource {
            let mut source = ScriptedSource::runes(text);
            source.script.push_back(Err(InputError::Timeout));
            source
        }
    }

    impl RuneSource for ScriptedSource {
        fn read_rune(&mut self) -> Result<char, InputError> {
            self.script.pop_front().unwrap_or(Err(InputError::Timeout))
        }

        fn set_timeout(&mut self, timeout: Option<Duration>) {
            self.timeout_log.push(timeout);
        }
    }

    fn decode(text: &str) -> Result<Key, InputError> {
        KeyDecoder::new(ScriptedSource::runes(text)).read_key()
    }

    // ==================== Single runes ====================

    #[test]
    fn test_plain_character() {
        assert_eq!(decode("a").unwrap(), Key::plain(KeyCode::Char('a')));
        assert_eq!(decode("中").unwrap(), Key::plain(KeyCode::Char('中')));
    }

    #[test]
    fn test_explicit_single_byte_mappings() {
        assert_eq!(decode("\0").unwrap(), Key::ctrl('`'));
        assert_eq!(decode("\x1d").unwrap(), Key::ctrl('^'));
        assert_eq!(decode("\x1f").unwrap(), Key::ctrl('/'));
        assert_eq!(decode("\x7f").unwrap(), Key::plain(KeyCode::Backspace));
    }

    #[test]
    fn test_control_chars_map_to_ctrl_chords() {
        assert_eq!(decode("\x01").unwrap(), Key::ctrl('A'));
        assert_eq!(decode("\x04").unwrap(), Key::ctrl('D'));
        assert_eq!(decode("\x09").unwrap(), Key::ctrl('I')); // Tab on the wire.
        assert_eq!(decode("\x0d").unwrap(), Key::ctrl('M')); // Enter on the wire.
        assert_eq!(decode("\x1a").unwrap(), Key::ctrl('Z'));
    }

    // ==================== ESC disambiguation ====================

    #[test]
    fn test_bare_esc_followed_by_silence_is_ctrl_bracket() {
        let source = ScriptedSource::with_timeout_after("\x1b");
        let key = KeyDecoder::new(source).read_key().unwrap();
        assert_eq!(key, Key::ctrl('['));
    }

    #[test]
    fn test_esc_then_rune_is_alt_chord() {
        assert_eq!(decode("\x1bf").unwrap(), Key::alt('f'));
        assert_eq!(decode("\x1bX").unwrap(), Key::alt('X'));
    }

    #[test]
    fn test_lone_csi_introducer_is_alt_bracket() {
        let source = ScriptedSource::with_timeout_after("\x1b[");
        let key = KeyDecoder::new(source).read_key().unwrap();
        assert_eq!(key, Key::alt('['));
    }

    #[test]
    fn test_lone_g3_introducer_is_alt_o() {
        let source = ScriptedSource::with_timeout_after("\x1bO");
        let key = KeyDecoder::new(source).read_key().unwrap();
        assert_eq!(key, Key::alt('O'));
    }

    #[test]
    fn test_timeout_is_restored_to_blocking_on_every_path() {
        for script in ["\x1b[1;5A", "\x1b[@", "\x1bOZ", "\x1bq"] {
            let mut decoder = KeyDecoder::new(ScriptedSource::runes(script));
            let _result = decoder.read_key();
            assert_eq!(
                decoder.source.timeout_log.first(),
                Some(&Some(DEFAULT_ESC_TIMEOUT)),
                "script {script:?} never armed the deadline"
            );
            assert_eq!(
                decoder.source.timeout_log.last(),
                Some(&None),
                "script {script:?} left a deadline armed"
            );
        }
    }

    #[test]
    fn test_esc_timeout_is_tunable() {
        let mut decoder = KeyDecoder::new(ScriptedSource::with_timeout_after("\x1b"));
        decoder.set_esc_timeout(Duration::from_millis(50));
        let _key = decoder.read_key().unwrap();
        assert_eq!(
            decoder.source.timeout_log.first(),
            Some(&Some(Duration::from_millis(50)))
        );
    }

    // ==================== CSI sequences ====================

    #[test]
    fn test_arrow_and_home_end_finals() {
        assert_eq!(decode("\x1b[A").unwrap(), Key::plain(KeyCode::Up));
        assert_eq!(decode("\x1b[B").unwrap(), Key::plain(KeyCode::Down));
        assert_eq!(decode("\x1b[C").unwrap(), Key::plain(KeyCode::Right));
        assert_eq!(decode("\x1b[D").unwrap(), Key::plain(KeyCode::Left));
        assert_eq!(decode("\x1b[H").unwrap(), Key::plain(KeyCode::Home));
        assert_eq!(decode("\x1b[F").unwrap(), Key::plain(KeyCode::End));
    }

    #[test]
    fn test_ctrl_up() {
        let key = decode("\x1b[1;5A").unwrap();
        assert_eq!(key.code, KeyCode::Up);
        assert!(key.modifiers.ctrl);
        assert!(!key.modifiers.shift);
        assert!(!key.modifiers.alt);
    }

    #[test]
    fn test_modified_arrow_requires_base_parameter_one() {
        assert!(matches!(decode("\x1b[2;5A"), Err(InputError::BadEscSeq)));
    }

    #[test]
    fn test_keypad_keys() {
        assert_eq!(decode("\x1b[1~").unwrap(), Key::plain(KeyCode::Home));
        assert_eq!(decode("\x1b[2~").unwrap(), Key::plain(KeyCode::Insert));
        assert_eq!(decode("\x1b[3~").unwrap(), Key::plain(KeyCode::Delete));
        assert_eq!(decode("\x1b[4~").unwrap(), Key::plain(KeyCode::End));
        assert_eq!(decode("\x1b[5~").unwrap(), Key::plain(KeyCode::PageUp));
        assert_eq!(decode("\x1b[6~").unwrap(), Key::plain(KeyCode::PageDown));
    }

    #[test]
    fn test_function_keys_have_gapped_numbering() {
        assert_eq!(decode("\x1b[11~").unwrap(), Key::plain(KeyCode::Function(1)));
        assert_eq!(decode("\x1b[15~").unwrap(), Key::plain(KeyCode::Function(5)));
        assert_eq!(decode("\x1b[17~").unwrap(), Key::plain(KeyCode::Function(6)));
        assert_eq!(decode("\x1b[21~").unwrap(), Key::plain(KeyCode::Function(10)));
        assert_eq!(decode("\x1b[23~").unwrap(), Key::plain(KeyCode::Function(11)));
        assert_eq!(decode("\x1b[24~").unwrap(), Key::plain(KeyCode::Function(12)));
        assert!(matches!(decode("\x1b[16~"), Err(InputError::BadEscSeq)));
    }

    #[test]
    fn test_modified_keypad_key() {
        let key = decode("\x1b[3;2~").unwrap();
        assert_eq!(key.code, KeyCode::Delete);
        assert!(key.modifiers.shift);
    }

    #[test]
    fn test_modify_other_keys_shift_enter() {
        let key = decode("\x1b[27;2;13~").unwrap();
        assert_eq!(key.code, KeyCode::Enter);
        assert!(key.modifiers.shift);
        assert!(!key.modifiers.ctrl);
    }

    #[test]
    fn test_modify_other_keys_ctrl_tab_and_punctuation() {
        let key = decode("\x1b[27;5;9~").unwrap();
        assert_eq!(key.code, KeyCode::Tab);
        assert!(key.modifiers.ctrl);

        let key = decode("\x1b[27;5;46~").unwrap();
        assert_eq!(key.code, KeyCode::Char('.'));
        assert!(key.modifiers.ctrl);

        let key = decode("\x1b[27;3;57~").unwrap();
        assert_eq!(key.code, KeyCode::Char('9'));
        assert!(key.modifiers.alt);
    }

    #[test]
    fn test_bad_csi_sequences() {
        assert!(matches!(decode("\x1b[@"), Err(InputError::BadEscSeq)));
        assert!(matches!(decode("\x1b[99~"), Err(InputError::BadEscSeq)));
        assert!(matches!(decode("\x1b[1;2;3A"), Err(InputError::BadEscSeq)));
        assert!(matches!(decode("\x1b[27;2;200~"), Err(InputError::BadEscSeq)));
    }

    // ==================== G3 sequences ====================

    #[test]
    fn test_g3_function_keys() {
        assert_eq!(decode("\x1bOP").unwrap(), Key::plain(KeyCode::Function(1)));
        assert_eq!(decode("\x1bOQ").unwrap(), Key::plain(KeyCode::Function(2)));
        assert_eq!(decode("\x1bOR").unwrap(), Key::plain(KeyCode::Function(3)));
        assert_eq!(decode("\x1bOS").unwrap(), Key::plain(KeyCode::Function(4)));
        assert_eq!(decode("\x1bOH").unwrap(), Key::plain(KeyCode::Home));
        assert_eq!(decode("\x1bOF").unwrap(), Key::plain(KeyCode::End));
    }

    #[test]
    fn test_unknown_g3_rune_is_bad_sequence() {
        assert!(matches!(decode("\x1bOZ"), Err(InputError::BadEscSeq)));
    }

    // ==================== Modifier decoding ====================

    #[test]
    fn test_xterm_modifier_table() {
        let base = Key::plain(KeyCode::Up);
        let cases: [(u32, [bool; 3]); 7] = [
            (2, [true, false, false]),
            (3, [false, true, false]),
            (4, [true, true, false]),
            (5, [false, false, true]),
            (6, [true, false, true]),
            (7, [false, true, true]),
            (8, [true, true, true]),
        ];
        for (code, [shift, alt, ctrl]) in cases {
            let key = xterm_modify(base, code).unwrap();
            assert_eq!(key.modifiers.shift, shift, "code {code}");
            assert_eq!(key.modifiers.alt, alt, "code {code}");
            assert_eq!(key.modifiers.ctrl, ctrl, "code {code}");
        }
    }

    #[test]
    fn test_xterm_modifier_zero_is_a_no_op() {
        let key = xterm_modify(Key::plain(KeyCode::Home), 0).unwrap();
        assert_eq!(key, Key::plain(KeyCode::Home));
    }

    #[test]
    fn test_xterm_modifier_out_of_range_is_bad_sequence() {
        assert!(matches!(
            xterm_modify(Key::plain(KeyCode::Up), 1),
            Err(InputError::BadEscSeq)
        ));
        assert!(matches!(
            xterm_modify(Key::plain(KeyCode::Up), 9),
            Err(InputError::BadEscSeq)
        ));
    }
}

// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Editor state consumed by the refresh composer.
//!
//! None of this is owned by the display core: tokenization, history,
//! completion sources, and key bindings live in the outer shell. A refresh
//! reads one snapshot of this state and renders it; the core never mutates it.

use crate::screen::cell::SgrParams;

/// Syntactic token kinds assigned by the external tokenizer. The renderer maps
/// them to SGR attributes through [`StyleSheet`] and attaches no meaning
/// beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Space,
    Bareword,
    SingleQuoted,
    DoubleQuoted,
    Variable,
    Redirection,
    StatementSep,
    Error,
}

/// One token of the edited text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind) -> Token {
        Token { text: text.into(), kind }
    }
}

/// Editor mode, as far as the display cares: which indicator row to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Insert,
    Command,
    Completing,
}

impl EditorMode {
    /// The mode indicator label. Insert mode renders no mode row.
    #[must_use]
    pub fn indicator(self) -> Option<&'static str> {
        match self {
            EditorMode::Insert => None,
            EditorMode::Command => Some("-- COMMAND --"),
            EditorMode::Completing => Some("-- COMPLETING --"),
        }
    }
}

/// One piece of a completion candidate: the text, and whether the completion
/// engine produced it (`completed`) or the user had already typed it. The
/// renderer highlights completed parts; it never reconstructs the split from
/// byte ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePart {
    pub text: String,
    pub completed: bool,
}

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Full candidate text, as shown in the completion menu.
    pub text: String,
    /// The prefix/tail split spliced into the edit line in place of the
    /// replaced range.
    pub parts: Vec<CandidatePart>,
}

impl Candidate {
    /// Candidate made of a user-typed prefix and a suggested tail.
    #[must_use]
    pub fn with_suggestion(prefix: &str, tail: &str) -> Candidate {
        Candidate {
            text: format!("{prefix}{tail}"),
            parts: vec![
                CandidatePart { text: prefix.into(), completed: false },
                CandidatePart { text: tail.into(), completed: true },
            ],
        }
    }
}

/// An active completion, already resolved by an external completion source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub candidates: Vec<Candidate>,
    /// Index of the selected candidate; `None` while the menu is up but
    /// nothing is selected yet.
    pub current: Option<usize>,
    /// Byte range `[start, end)` of the edit text the candidate replaces.
    pub start: usize,
    pub end: usize,
    /// Token kind the spliced-in candidate is rendered as.
    pub kind: TokenKind,
}

impl Completion {
    #[must_use]
    pub fn current_candidate(&self) -> Option<&Candidate> {
        self.candidates.get(self.current?)
    }
}

/// Snapshot of everything the display pipeline reads during one refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    pub prompt: String,
    /// Right-aligned prompt; empty renders nothing.
    pub rprompt: String,
    pub tokens: Vec<Token>,
    /// Byte offset of the edit cursor within the concatenated token text.
    pub cursor: usize,
    pub mode: EditorMode,
    /// Joined with `", "` on the tips row; empty renders no row.
    pub tips: Vec<String>,
    pub completion: Option<Completion>,
}

impl EditorState {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> EditorState {
        EditorState {
            prompt: prompt.into(),
            rprompt: String::new(),
            tokens: Vec::new(),
            cursor: 0,
            mode: EditorMode::Insert,
            tips: Vec::new(),
            completion: None,
        }
    }
}

/// Per-token-kind SGR attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenStyles {
    pub space: SgrParams,
    pub bareword: SgrParams,
    pub single_quoted: SgrParams,
    pub double_quoted: SgrParams,
    pub variable: SgrParams,
    pub redirection: SgrParams,
    pub statement_sep: SgrParams,
    pub error: SgrParams,
}

impl TokenStyles {
    #[must_use]
    pub fn for_kind(&self, kind: TokenKind) -> &SgrParams {
        match kind {
            TokenKind::Space => &self.space,
            TokenKind::Bareword => &self.bareword,
            TokenKind::SingleQuoted => &self.single_quoted,
            TokenKind::DoubleQuoted => &self.double_quoted,
            TokenKind::Variable => &self.variable,
            TokenKind::Redirection => &self.redirection,
            TokenKind::StatementSep => &self.statement_sep,
            TokenKind::Error => &self.error,
        }
    }
}

/// SGR attributes for every part of the display. All values are opaque SGR
/// parameter strings ([`SgrParams`]); empty means unstyled. The default is
/// fully unstyled — callers override the fields they care about.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleSheet {
    pub prompt: SgrParams,
    pub rprompt: SgrParams,
    pub mode: SgrParams,
    pub tip: SgrParams,
    /// Attribute of the selected candidate in the completion menu.
    pub current_completion: SgrParams,
    /// Joined (`;`) onto a part's attribute for candidate parts marked
    /// `completed`, so the suggestion tail stands out from the typed prefix.
    pub completed: SgrParams,
    pub tokens: TokenStyles,
}

// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Terminal input decoding: timed rune reads and the key decoder state
//! machine.

pub mod error;
pub mod key;
pub mod key_decoder;
pub mod rune_source;
pub mod timed_reader;

// Re-export for flat public API.
pub use error::*;
pub use key::*;
pub use key_decoder::*;
pub use rune_source::*;
pub use timed_reader::*;

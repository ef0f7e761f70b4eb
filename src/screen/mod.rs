// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Screen model and renderer: cell buffers, the refresh composer, and the
//! one-way screen writer.

pub mod cell;
pub mod cell_buffer;
pub mod compose;
pub mod screen_writer;

// Re-export for flat public API.
pub use cell::*;
pub use cell_buffer::*;
pub use compose::*;
pub use screen_writer::*;

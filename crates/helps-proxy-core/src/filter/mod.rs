//! Baked-in filters
//!
//! Pure functions over a [`FilterConfig`]: the tool allow-list, hidden
//! parameters, and removal of book/chapter intro notes.

mod notes;
mod tools;

pub use notes::{filter_book_chapter_notes, is_intro_reference};
pub use tools::{filter_arguments, filter_schema, filter_tools};

//! Client-side view of the conversation.
//!
//! - `prompt` — remembers the last menu shown and turns typed lines into events.
//! - `render` — formats server replies for the terminal.
pub mod prompt;
pub mod render;

//! Keyboard input: the key table and the monophonic dispatcher.

pub mod dispatcher;
pub mod keymap;

pub use dispatcher::InputDispatcher;
pub use keymap::{key_for_note, note_for_key, KEY_TABLE};

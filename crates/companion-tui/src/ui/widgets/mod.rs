//! Reusable widgets for the companion TUI.

pub mod input_bar;
pub mod message_list;
pub mod status_bar;
pub mod text_input;

pub use input_bar::{InputBar, PLACEHOLDER};
pub use message_list::{MessageList, TYPING_TEXT};
pub use status_bar::{toast_text, KeyHint, StatusBar};
pub use text_input::TextInputState;

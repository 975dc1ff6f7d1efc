//! Application state and update logic for the companion TUI.

use std::cell::Cell;

use companion_engine::{Completion, Conversation, Notice, PendingReply, Reply, ReplyError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::event::Action;
use crate::ui::widgets::TextInputState;

/// Ticks a toast stays visible: about 3 seconds at the 4 Hz tick rate.
pub const NOTIFICATION_TICKS: usize = 12;

/// Lines moved by PageUp/PageDown.
const PAGE_LINES: usize = 10;

/// The current screen being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Landing,
    Chat,
}

/// What the chat input did with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key was consumed by the input.
    Handled,
    /// The key should be mapped to an [`Action`].
    Unhandled,
    /// A message was submitted; its reply must be requested.
    Submit(PendingReply),
}

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// Current screen.
    pub screen: Screen,

    /// Where replies come from, shown on the landing screen.
    pub backend_url: String,

    /// The conversation being displayed.
    pub conversation: Conversation,

    /// Text input state for the chat input.
    pub input_state: TextInputState,

    /// Tick counter for animations.
    pub tick: usize,

    /// Toast shown in the status bar.
    pub notification: Option<Notice>,

    /// Ticks remaining until notification is cleared.
    notification_ttl: usize,

    /// Lines scrolled up from the newest message.
    pub transcript_scroll: usize,

    /// Largest scroll offset seen by the last render.
    pub(crate) transcript_max_scroll: Cell<usize>,
}

impl App {
    /// Create a new app instance starting on the landing screen.
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            screen: Screen::Landing,
            backend_url: backend_url.into(),
            conversation: Conversation::new(),
            input_state: TextInputState::new(),
            tick: 0,
            notification: None,
            notification_ttl: 0,
            transcript_scroll: 0,
            transcript_max_scroll: Cell::new(0),
        }
    }

    /// Create an app pointed at a placeholder backend, for tests.
    #[cfg(test)]
    pub fn new_for_test() -> Self {
        Self::new("http://127.0.0.1:9")
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        // Global actions
        match action {
            Action::Quit => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
                return;
            }
            Action::Help => {
                self.show_help = !self.show_help;
                return;
            }
            _ => {}
        }

        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }

        match self.screen {
            Screen::Landing => self.handle_landing_action(action),
            Screen::Chat => self.handle_chat_action(action),
        }
    }

    fn handle_landing_action(&mut self, action: Action) {
        if action == Action::Select {
            self.screen = Screen::Chat;
            self.follow_newest();
        }
    }

    fn handle_chat_action(&mut self, action: Action) {
        match action {
            Action::Back => self.screen = Screen::Landing,
            Action::NewConversation => self.new_conversation(),
            Action::Up => self.scroll_up(1),
            Action::Down => self.scroll_down(1),
            Action::PageUp => self.scroll_up(PAGE_LINES),
            Action::PageDown => self.scroll_down(PAGE_LINES),
            _ => {}
        }
    }

    /// Offer a key to the chat input before it becomes an [`Action`].
    pub fn handle_chat_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if self.screen != Screen::Chat || self.show_help {
            return KeyOutcome::Unhandled;
        }

        let pending = self.conversation.is_pending();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('j') {
            if !pending {
                self.input_state.insert('\n');
            }
            return KeyOutcome::Handled;
        }
        if ctrl {
            return KeyOutcome::Unhandled;
        }

        match key.code {
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                if !pending {
                    self.input_state.insert('\n');
                }
                KeyOutcome::Handled
            }
            KeyCode::Enter => self.submit_input(),
            KeyCode::Char('?') if self.input_state.is_empty() => KeyOutcome::Unhandled,
            KeyCode::Esc
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::PageUp
            | KeyCode::PageDown => KeyOutcome::Unhandled,
            // Editing is disabled while a reply is pending
            _ if pending => KeyOutcome::Handled,
            KeyCode::Char(c) => {
                self.input_state.insert(c);
                KeyOutcome::Handled
            }
            KeyCode::Backspace => {
                self.input_state.backspace();
                KeyOutcome::Handled
            }
            KeyCode::Delete => {
                self.input_state.delete();
                KeyOutcome::Handled
            }
            KeyCode::Left => {
                self.input_state.move_left();
                KeyOutcome::Handled
            }
            KeyCode::Right => {
                self.input_state.move_right();
                KeyOutcome::Handled
            }
            KeyCode::Home => {
                self.input_state.move_home();
                KeyOutcome::Handled
            }
            KeyCode::End => {
                self.input_state.move_end();
                KeyOutcome::Handled
            }
            _ => KeyOutcome::Unhandled,
        }
    }

    /// Insert pasted text into the chat input.
    ///
    /// Newlines are kept, so a pasted paragraph is never sent piecemeal.
    pub fn handle_paste(&mut self, text: &str) {
        if self.screen == Screen::Chat && !self.show_help && !self.conversation.is_pending() {
            self.input_state.insert_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
        }
    }

    /// Submit the input text if the conversation accepts it.
    ///
    /// The input is only cleared when the message was accepted.
    fn submit_input(&mut self) -> KeyOutcome {
        match self.conversation.begin_submit(self.input_state.content()) {
            Some(request) => {
                self.input_state.clear();
                self.follow_newest();
                KeyOutcome::Submit(request)
            }
            None => KeyOutcome::Handled,
        }
    }

    /// Apply a finished reply request.
    pub fn apply_reply(
        &mut self,
        generation: u64,
        result: Result<Reply, ReplyError>,
    ) -> Completion {
        let completion = self.conversation.complete(generation, result);
        debug!(?completion, generation, "reply applied");
        if completion != Completion::Stale {
            self.follow_newest();
        }
        self.drain_notices();
        completion
    }

    /// Discard the conversation and start again from the greeting.
    pub fn new_conversation(&mut self) {
        self.conversation.reset();
        self.follow_newest();
        self.drain_notices();
    }

    fn drain_notices(&mut self) {
        for notice in self.conversation.take_notices() {
            self.set_notification(notice);
        }
    }

    /// Set a temporary notification.
    fn set_notification(&mut self, notice: Notice) {
        self.notification = Some(notice);
        self.notification_ttl = NOTIFICATION_TICKS;
    }

    /// Snap the message list back to the newest content.
    pub fn follow_newest(&mut self) {
        self.transcript_scroll = 0;
    }

    fn scroll_up(&mut self, lines: usize) {
        self.transcript_scroll = self
            .transcript_scroll
            .saturating_add(lines)
            .min(self.transcript_max_scroll.get());
    }

    fn scroll_down(&mut self, lines: usize) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(lines);
    }

    /// Increment tick counter and update time-based state.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        // Clear notification after TTL expires
        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
    }
}
